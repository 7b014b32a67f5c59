//! Error types for command dispatch
//!
//! Every failure a dispatch can produce is returned as a typed value; nothing
//! in the dispatch path panics.

use thiserror::Error;

/// Main error type for the commander
#[derive(Error, Debug)]
pub enum CommanderError {
    /// No command token was supplied after the program name
    #[error("no subcommand provided")]
    NoSubcommand,

    /// The command token does not match any registered command
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    /// A handler does not satisfy the calling convention
    #[error("invalid handler for command '{command}': {reason}")]
    InvalidHandler { command: String, reason: String },

    /// The flag tokens do not match the command's schema
    #[error("failed to parse arguments for '{command}': {message}")]
    Parse {
        command: String,
        /// Offending token, when one could be identified
        token: Option<String>,
        message: String,
    },

    /// A command name is already registered in another category
    #[error("command '{name}' is already registered in category '{category}'")]
    DuplicateCommand { name: String, category: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Output sink failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommanderError {
    /// Create a new unknown command error
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Create a new invalid handler error
    pub fn invalid_handler(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHandler {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a new parse error
    pub fn parse(
        command: impl Into<String>,
        token: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            command: command.into(),
            token,
            message: message.into(),
        }
    }

    /// Create a new duplicate command error
    pub fn duplicate_command(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self::DuplicateCommand {
            name: name.into(),
            category: category.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the facade renders full usage before returning this error
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NoSubcommand | Self::UnknownCommand { .. })
    }

    /// Offending token of a parse error
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Parse { token, .. } => token.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CommanderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors() {
        assert!(CommanderError::NoSubcommand.is_usage_error());
        assert!(CommanderError::unknown_command("bogus").is_usage_error());
        assert!(!CommanderError::invalid_handler("x", "bad").is_usage_error());
        assert!(!CommanderError::parse("x", None, "bad").is_usage_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CommanderError::unknown_command("bogus").to_string(),
            "unknown command: bogus"
        );
        assert_eq!(
            CommanderError::NoSubcommand.to_string(),
            "no subcommand provided"
        );

        let err = CommanderError::parse("test", Some("--nope".to_string()), "unexpected argument");
        assert_eq!(err.token(), Some("--nope"));
        assert!(err.to_string().contains("'test'"));
    }
}
