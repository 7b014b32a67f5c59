//! Commander facade
//!
//! Owns the registry, the raw argument tokens and the output sink, and runs
//! one dispatch per call to [`Commander::run`].

use crate::{
    cli::help::{self, HelpRenderer},
    config::CommanderConfig,
    core::{
        dispatcher::Dispatcher,
        handler::CancelToken,
        registry::{CategoryMut, Registry},
    },
    error::Result,
};
use std::{
    env,
    io::{self, Stdout, Write},
};
use tracing::{info, warn};

/// Command-line application: categories of commands plus a built-in `help`
#[derive(Debug)]
pub struct Commander<W: Write = Stdout> {
    registry: Registry,
    args: Vec<String>,
    output: W,
    config: CommanderConfig,
    cancel: CancelToken,
}

impl Commander<Stdout> {
    /// Commander over the process arguments, writing to stdout
    pub fn new() -> Self {
        Self::with_args(env::args())
    }

    /// Commander over `args`, writing to stdout
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_output(args, io::stdout())
    }
}

impl Default for Commander<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Commander<W> {
    /// Commander over `args` writing help and handler output to `output`.
    ///
    /// Starts from [`CommanderConfig::default`]; environment settings such as
    /// `NO_COLOR` only apply through [`Commander::with_config`].
    pub fn with_output<I, S>(args: I, output: W) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Registry::new();
        if let Err(e) = registry
            .add_category(help::HELP_CATEGORY)
            .register(help::command())
        {
            warn!("Failed to register built-in help: {}", e);
        }

        Self {
            registry,
            args: args.into_iter().map(Into::into).collect(),
            output,
            config: CommanderConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: CommanderConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Create a category; see [`Registry::add_category`]
    pub fn add_category(&mut self, name: impl Into<String>) -> CategoryMut<'_> {
        self.registry.add_category(name)
    }

    pub fn set_output(&mut self, output: W) {
        self.output = output;
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Replace the stored argument tokens
    pub fn set_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &CommanderConfig {
        &self.config
    }

    /// Token handed to every handler through its context
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Dispatch the stored argument tokens
    pub fn run(&mut self) -> Result<()> {
        let args = std::mem::take(&mut self.args);
        let result = self.dispatch(&args);
        self.args = args;
        result
    }

    /// Dispatch `tokens` instead of the stored arguments
    pub fn run_with<I, S>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.dispatch(&tokens)
    }

    /// Write the full usage to the output sink
    pub fn print_usage(&mut self) -> Result<()> {
        let program = self
            .config
            .program_name_or(self.args.first().map(String::as_str));
        HelpRenderer::new(&self.registry, &self.config, &program).write_usage(&mut self.output)?;
        Ok(())
    }

    fn dispatch(&mut self, tokens: &[String]) -> Result<()> {
        let mut dispatcher = Dispatcher::new(&self.registry, &self.config, self.cancel.clone());
        let result = dispatcher.dispatch(tokens, &mut self.output);

        if let Err(e) = &result {
            if e.is_usage_error() {
                info!("{}", e);
                let program = self
                    .config
                    .program_name_or(tokens.first().map(String::as_str));
                let renderer = HelpRenderer::new(&self.registry, &self.config, &program);
                if let Err(write_err) = renderer.write_usage(&mut self.output) {
                    warn!("Failed to write usage: {}", write_err);
                }
            }
        }

        if let Err(e) = self.output.flush() {
            warn!("Failed to flush output: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{handler::Handler, registry::Command},
        error::CommanderError,
    };

    fn commander(args: &[&str]) -> Commander<Vec<u8>> {
        Commander::with_output(args.iter().copied(), Vec::new())
            .with_config(CommanderConfig::default().with_color(false))
            .unwrap()
    }

    fn output(cmdr: &Commander<Vec<u8>>) -> String {
        String::from_utf8_lossy(cmdr.output()).into_owned()
    }

    #[test]
    fn test_help_is_registered() {
        let cmdr = commander(&["prog"]);
        let (cat, cmd) = cmdr.registry().find_command("help").unwrap();
        assert_eq!(cat.name(), "Help");
        assert_eq!(cmd.description(), "Show help information for commands");
    }

    #[test]
    fn test_no_subcommand_renders_usage() {
        let mut cmdr = commander(&["prog"]);
        let err = cmdr.run().unwrap_err();
        assert!(matches!(err, CommanderError::NoSubcommand));
        assert!(output(&cmdr).contains("Available Commands"));
    }

    #[test]
    fn test_parse_error_renders_nothing() {
        let mut cmdr = commander(&["prog", "test", "--bogus"]);
        cmdr.add_category("Test")
            .register(Command::new(
                "test",
                "Test command",
                Handler::with_schema(Vec::new(), |_, _| {}),
            ))
            .unwrap();

        let err = cmdr.run().unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
        assert!(output(&cmdr).is_empty());
    }

    #[test]
    fn test_run_keeps_args() {
        let mut cmdr = commander(&["prog", "help"]);
        cmdr.run().unwrap();
        assert_eq!(cmdr.args(), ["prog", "help"]);
    }

    #[test]
    fn test_run_with_injected_tokens() {
        let mut cmdr = commander(&["prog"]);
        cmdr.run_with(["prog", "help", "help"]).unwrap();
        let out = output(&cmdr);
        assert!(out.contains("Help for command 'help' in category 'Help':"));
        assert!(out.contains("  prog help [argument]"));
    }

    #[test]
    fn test_program_name_from_config() {
        let mut cmdr = Commander::with_output(["/opt/bin/carctl"], Vec::new())
            .with_config(
                CommanderConfig::default()
                    .with_color(false)
                    .with_program_name("cars"),
            )
            .unwrap();
        let _ = cmdr.run();
        assert!(output(&cmdr).contains("  cars <command> [flags]"));
    }

    #[test]
    fn test_default_config_ignores_environment() {
        let cmdr = Commander::with_output(["prog"], Vec::<u8>::new());
        assert_eq!(cmdr.config(), &CommanderConfig::default());
        assert!(cmdr.config().color);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Commander::with_output(["prog"], Vec::<u8>::new())
            .with_config(CommanderConfig::default().with_program_name(""));
        assert!(matches!(result, Err(CommanderError::Config { .. })));
    }

    #[test]
    fn test_print_usage() {
        let mut cmdr = commander(&["carctl"]);
        cmdr.print_usage().unwrap();
        let out = output(&cmdr);
        assert!(out.contains("📁 Help"));
        assert!(out.contains("  carctl <command> [flags]"));
    }
}
