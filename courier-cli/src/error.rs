//! Error types for the Courier CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error (reading the body file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Mail settings, rendering or delivery failed
    #[error("{0}")]
    Mail(#[from] courier_mail::MailError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] courier_config::ConfigError),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
