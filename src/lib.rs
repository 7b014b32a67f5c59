//! # Commander
//!
//! Structured command-line dispatch: register named commands in categories,
//! each backed by a handler, and let the handler's typed argument structure
//! define the command's flags.
//!
//! ## Features
//!
//! - Categories of commands with a built-in `help` command
//! - Flags derived from argument structures declared with [`command_args!`]
//! - Lenient defaults, strict command-line values
//! - Injected argument tokens and output sink for testing
//!
//! ## Example
//!
//! ```no_run
//! use commander::{Command, Commander, Handler, command_args};
//! use std::io::Write;
//!
//! command_args! {
//!     pub struct AcArgs {
//!         pub temperature: i64 => { default: "22", usage: "Temperature in Celsius" },
//!     }
//! }
//!
//! let mut cmdr = Commander::new();
//! cmdr.add_category("Climate").register(Command::new(
//!     "ac",
//!     "Controls the air conditioning",
//!     Handler::structured(|ctx, args: AcArgs| {
//!         let _ = writeln!(ctx.output(), "Setting AC to {}°C", args.temperature);
//!     }),
//! ))?;
//! cmdr.run()?;
//! # Ok::<(), commander::CommanderError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use cli::{Commander, HelpRenderer};
pub use config::CommanderConfig;
pub use crate::core::{
    BoundArgs, CancelToken, Category, CategoryMut, Command, CommandArgs, Context, FieldDescriptor,
    FieldKind, FieldSpec, FieldType, Handler, HandlerShape, Registry, Schema, Value,
};
pub use error::{CommanderError, Result};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity.
///
/// Logs go to stderr so they never mix with command output.
pub fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
