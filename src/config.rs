//! Configuration for the commander
//!
//! Controls how help output is presented. Nothing here affects how commands
//! are resolved or bound.

use crate::error::CommanderError;
use serde::{Deserialize, Serialize};
use std::{env, path::Path};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    /// Program name shown in usage lines; derived from the first token when
    /// unset
    pub program_name: Option<String>,
    /// Style help output with ANSI colors
    pub color: bool,
    /// Show `(default: ...)` next to flags in help output
    pub show_defaults: bool,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            program_name: None,
            color: true,
            show_defaults: true,
        }
    }
}

impl CommanderConfig {
    /// Default configuration adjusted by the environment. `NO_COLOR` set to
    /// any non-empty value disables colors.
    pub fn from_env() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !no_color,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CommanderError> {
        if let Some(name) = &self.program_name {
            if name.trim().is_empty() {
                return Err(CommanderError::config("program name must not be blank"));
            }
        }
        Ok(())
    }

    /// Program name for usage lines: the configured name, else the file name
    /// of `argv0`, else "command"
    pub fn program_name_or(&self, argv0: Option<&str>) -> String {
        if let Some(name) = &self.program_name {
            return name.clone();
        }
        argv0
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "command".to_string())
    }
}
