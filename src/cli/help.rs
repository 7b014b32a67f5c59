//! Help rendering
//!
//! Formats the registry for humans: full usage lists every category with its
//! commands and their flags, and command detail describes a single command.

use crate::{
    config::CommanderConfig,
    core::{
        binder::{FieldDescriptor, Schema},
        coerce::FieldKind,
        handler::{Context, Handler},
        registry::{Command, Registry},
    },
};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use tracing::warn;

/// Category the built-in help command is registered in
pub const HELP_CATEGORY: &str = "Help";
/// Name of the built-in help command
pub const HELP_COMMAND: &str = "help";

/// The built-in help command
pub fn command() -> Command {
    Command::new(
        HELP_COMMAND,
        "Show help information for commands",
        Handler::text(help_handler),
    )
}

fn help_handler(ctx: &mut Context<'_>, name: &str) {
    let renderer = HelpRenderer::new(ctx.registry(), ctx.config(), ctx.program());
    let rendered = if name.is_empty() {
        renderer.usage()
    } else {
        renderer.command_or_usage(name)
    };

    if let Err(e) = ctx.output().write_all(rendered.as_bytes()) {
        warn!("Failed to write help output: {}", e);
    }
}

/// Applies colors when enabled
#[derive(Debug, Clone, Copy)]
struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.enabled {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Renders help text for a registry
#[derive(Debug)]
pub struct HelpRenderer<'a> {
    registry: &'a Registry,
    config: &'a CommanderConfig,
    program: &'a str,
    palette: Palette,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(registry: &'a Registry, config: &'a CommanderConfig, program: &'a str) -> Self {
        Self {
            registry,
            config,
            program,
            palette: Palette {
                enabled: config.color,
            },
        }
    }

    /// Full usage: every category, command and flag
    pub fn usage(&self) -> String {
        let p = self.palette;
        let mut out = String::new();

        out.push_str(&p.paint("🚀 Available Commands:", |s| s.bold().cyan()));
        out.push('\n');

        for category in self.registry.categories() {
            out.push('\n');
            out.push_str(&p.paint(&format!("📁 {}", category.name()), |s| s.yellow()));
            out.push('\n');

            for command in category.commands() {
                out.push_str(&format!(
                    "  {} {}\n",
                    p.paint(&format!("{:<12}", command.name()), |s| s.green()),
                    command.description()
                ));
                if let Some(schema) = command.handler().schema() {
                    self.push_flags(&mut out, schema);
                }
            }
        }

        out.push('\n');
        out.push_str(&p.paint("💡 Usage:", |s| s.bold().purple()));
        out.push('\n');
        out.push_str(&format!(
            "  {}\n",
            p.paint(&format!("{} <command> [flags]", self.program), |s| s.blue())
        ));
        out.push_str(&format!(
            "  {}\n",
            p.paint(&format!("{} help <command>", self.program), |s| s.blue())
        ));
        out
    }

    /// Detail for one command, or `None` if it is not registered
    pub fn command(&self, name: &str) -> Option<String> {
        let (category, command) = self.registry.find_command(name).ok()?;
        let p = self.palette;
        let mut out = String::new();

        out.push_str(&format!(
            "\n{} {} {}\n",
            p.paint("Help for command", |s| s.bold().cyan()),
            p.paint(&format!("'{}'", command.name()), |s| s.green()),
            p.paint(&format!("in category '{}':", category.name()), |s| s.yellow()),
        ));
        out.push_str(&format!(
            "{} {}\n",
            p.paint("Description:", |s| s.bold().purple()),
            command.description()
        ));

        let schema = command.handler().schema().filter(|s| !s.is_empty());
        if let Some(schema) = schema {
            out.push_str(&p.paint("Flags:", |s| s.bold().purple()));
            out.push('\n');
            self.push_flags(&mut out, schema);
        }

        let usage = match (command.handler(), schema) {
            (_, Some(_)) => format!("{} {} [flags]", self.program, command.name()),
            (Handler::Text(_), _) => format!("{} {} [argument]", self.program, command.name()),
            _ => format!("{} {}", self.program, command.name()),
        };
        out.push_str(&p.paint("Usage:", |s| s.bold().purple()));
        out.push('\n');
        out.push_str(&format!("  {}\n", p.paint(&usage, |s| s.blue())));
        Some(out)
    }

    /// Detail for `name`; for an unknown name, an error line followed by the
    /// full usage
    pub fn command_or_usage(&self, name: &str) -> String {
        match self.command(name) {
            Some(detail) => detail,
            None => {
                let error = format!("unknown command: {name}");
                format!("{}\n{}", self.palette.paint(&error, |s| s.red()), self.usage())
            }
        }
    }

    /// Write the full usage to `out`
    pub fn write_usage(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.usage().as_bytes())
    }

    fn push_flags(&self, out: &mut String, schema: &Schema) {
        for field in schema.fields() {
            out.push_str(&self.flag_line(field));
            out.push('\n');
        }
    }

    fn flag_line(&self, field: &FieldDescriptor) -> String {
        let p = self.palette;
        let mut line = format!("    {}", p.paint(&format!("--{}", field.flag), |s| s.cyan()));

        if field.kind != FieldKind::Bool {
            line.push_str(&format!(" <{}>", field.kind.type_hint()));
        }
        if !field.usage.is_empty() {
            line.push_str("  ");
            line.push_str(&field.usage);
        }
        if self.config.show_defaults && !field.default.is_empty() {
            line.push(' ');
            line.push_str(&p.paint(&format!("(default: {})", field.default), |s| s.yellow()));
        }
        line
    }
}
