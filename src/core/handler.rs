//! Handler calling conventions
//!
//! Handlers are classified when they are built, not when they run: every
//! handler is one of the closed [`Handler`] variants, and a structured
//! handler carries its flag schema from registration onward.

use crate::{
    config::CommanderConfig,
    core::{
        args::CommandArgs,
        binder::{BoundArgs, FieldSpec, Schema},
        registry::Registry,
    },
};
use std::{
    fmt,
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Cooperative cancellation flag shared between the embedding program and
/// running handlers. The commander never trips it on its own.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// First parameter of every handler
pub struct Context<'a> {
    program: &'a str,
    command: &'a str,
    category: &'a str,
    registry: &'a Registry,
    config: &'a CommanderConfig,
    output: &'a mut dyn Write,
    cancel: CancelToken,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        program: &'a str,
        command: &'a str,
        category: &'a str,
        registry: &'a Registry,
        config: &'a CommanderConfig,
        output: &'a mut dyn Write,
        cancel: CancelToken,
    ) -> Self {
        Self {
            program,
            command,
            category,
            registry,
            config,
            output,
            cancel,
        }
    }

    /// Program name used in usage lines
    pub fn program(&self) -> &str {
        self.program
    }

    /// Name of the command being run
    pub fn command(&self) -> &str {
        self.command
    }

    /// Category the command was found in
    pub fn category(&self) -> &str {
        self.category
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn config(&self) -> &CommanderConfig {
        self.config
    }

    /// Output sink configured on the commander
    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("program", &self.program)
            .field("command", &self.command)
            .field("category", &self.category)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

type NiladicFn = dyn Fn(&mut Context<'_>);
type StructuredFn = dyn Fn(&mut Context<'_>, &BoundArgs);
type TextFn = dyn Fn(&mut Context<'_>, &str);

/// Calling-convention class of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerShape {
    /// Context only
    Niladic,
    /// Context plus a flag-bound argument structure
    Structured,
    /// Context plus the next raw token
    Text,
}

/// A command handler
pub enum Handler {
    Niladic(Box<NiladicFn>),
    Structured {
        schema: Schema,
        call: Box<StructuredFn>,
    },
    Text(Box<TextFn>),
}

impl Handler {
    /// Handler taking only the context
    pub fn niladic(f: impl Fn(&mut Context<'_>) + 'static) -> Self {
        Self::Niladic(Box::new(f))
    }

    /// Handler taking a typed argument structure
    pub fn structured<A, F>(f: F) -> Self
    where
        A: CommandArgs + 'static,
        F: Fn(&mut Context<'_>, A) + 'static,
    {
        Self::Structured {
            schema: Schema::from_specs(A::fields()),
            call: Box::new(move |ctx: &mut Context<'_>, bound: &BoundArgs| {
                f(ctx, A::from_bound(bound))
            }),
        }
    }

    /// Handler bound through an explicit field list instead of a typed
    /// structure
    pub fn with_schema(
        fields: impl IntoIterator<Item = FieldSpec>,
        f: impl Fn(&mut Context<'_>, &BoundArgs) + 'static,
    ) -> Self {
        Self::Structured {
            schema: Schema::from_specs(fields),
            call: Box::new(f),
        }
    }

    /// Handler taking the next raw token, or "" when there is none
    pub fn text(f: impl Fn(&mut Context<'_>, &str) + 'static) -> Self {
        Self::Text(Box::new(f))
    }

    pub fn shape(&self) -> HandlerShape {
        match self {
            Self::Niladic(_) => HandlerShape::Niladic,
            Self::Structured { .. } => HandlerShape::Structured,
            Self::Text(_) => HandlerShape::Text,
        }
    }

    /// Flag schema of a structured handler
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Self::Structured { schema, .. } => Some(schema),
            _ => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured { schema, .. } => f
                .debug_struct("Structured")
                .field("schema", schema)
                .finish_non_exhaustive(),
            other => write!(f, "{:?}", other.shape()),
        }
    }
}
