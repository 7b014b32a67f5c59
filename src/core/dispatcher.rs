//! Command dispatch
//!
//! One dispatch walks `Idle -> CommandResolved -> ArgumentsBound -> Invoked`.
//! Any failed step moves to `Failed` and returns the error; a handler is only
//! ever called with fully bound arguments.

use crate::{
    config::CommanderConfig,
    core::{
        binder,
        handler::{CancelToken, Context, Handler},
        registry::{Command, Registry},
    },
    error::{CommanderError, Result},
};
use std::io::Write;
use tracing::{debug, instrument};

/// Progress of a single dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    CommandResolved,
    ArgumentsBound,
    Invoked,
    Failed,
}

/// Resolves, binds and invokes one command
#[derive(Debug)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    config: &'a CommanderConfig,
    cancel: CancelToken,
    state: DispatchState,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, config: &'a CommanderConfig, cancel: CancelToken) -> Self {
        Self {
            registry,
            config,
            cancel,
            state: DispatchState::Idle,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Dispatch `tokens`, where `tokens[0]` is the program name and
    /// `tokens[1]` the command
    #[instrument(skip_all, fields(command = tokens.get(1).map(String::as_str).unwrap_or_default()))]
    pub fn dispatch(&mut self, tokens: &[String], output: &mut dyn Write) -> Result<()> {
        self.state = DispatchState::Idle;
        let result = self.run(tokens, output);
        if let Err(e) = &result {
            debug!("Dispatch failed: {}", e);
            self.transition(DispatchState::Failed);
        }
        result
    }

    fn run(&mut self, tokens: &[String], output: &mut dyn Write) -> Result<()> {
        let Some(name) = tokens.get(1) else {
            return Err(CommanderError::NoSubcommand);
        };

        let registry = self.registry;
        let (category, command) = registry.find_command(name)?;
        self.transition(DispatchState::CommandResolved);

        validate_handler(command)?;

        let program = self
            .config
            .program_name_or(tokens.first().map(String::as_str));
        let tail = &tokens[2..];
        let mut ctx = Context::new(
            &program,
            command.name(),
            category.name(),
            registry,
            self.config,
            output,
            self.cancel.clone(),
        );

        match command.handler() {
            Handler::Niladic(call) => {
                self.transition(DispatchState::ArgumentsBound);
                call(&mut ctx);
            }
            Handler::Structured { schema, call } => {
                let bound = binder::bind(command.name(), schema, tail)?;
                self.transition(DispatchState::ArgumentsBound);
                call(&mut ctx, &bound);
            }
            Handler::Text(call) => {
                let arg = tail.first().map(String::as_str).unwrap_or_default();
                self.transition(DispatchState::ArgumentsBound);
                call(&mut ctx, arg);
            }
        }

        self.transition(DispatchState::Invoked);
        Ok(())
    }

    fn transition(&mut self, next: DispatchState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Check that a command's handler can be bound
pub fn validate_handler(command: &Command) -> Result<()> {
    match command.handler() {
        Handler::Structured { schema, .. } => schema.validate(command.name()),
        Handler::Niladic(_) | Handler::Text(_) => Ok(()),
    }
}
