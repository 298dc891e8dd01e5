//! Mail error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// Malformed sender or recipient address, or no recipients at all.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Subject template could not be parsed or rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// The server could not be reached or the protocol dial failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A send did not finish within its bound.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Send, authentication or handshake failure reported by the transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminant of a [`MailError`], for comparing outcomes without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAddress,
    Template,
    Connection,
    Timeout,
    Transport,
    Config,
}

impl MailError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::Template(_) => ErrorKind::Template,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Re-label any error as a connection failure, keeping its message.
    pub(crate) fn into_connection(self) -> Self {
        match self {
            Self::Connection(_) => self,
            other => Self::Connection(other.to_string()),
        }
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<handlebars::RenderError> for MailError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for MailError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<courier_config::ConfigError> for MailError {
    fn from(err: courier_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
