//! Email address types.

use crate::{MailError, Result};
use lettre::message::Mailbox;
use std::fmt;
use std::str::FromStr;

/// Email address with optional display name.
///
/// Syntax checks are lettre's, so anything accepted here is accepted by the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// The email address.
    pub email: String,
    /// Optional display name.
    pub name: Option<String>,
}

impl Address {
    /// Parse an address from a string like "Name <email@example.com>" or "email@example.com".
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MailError::InvalidAddress(
                "Email cannot be empty".to_string(),
            ));
        }

        let mailbox = Mailbox::from_str(s)
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", s, e)))?;

        Ok(Self {
            email: mailbox.email.to_string(),
            name: mailbox.name.filter(|n| !n.is_empty()),
        })
    }

    /// Get the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Get the display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Convert to a lettre mailbox.
    pub(crate) fn to_mailbox(&self) -> Result<Mailbox> {
        let email = self
            .email
            .parse()
            .map_err(|_| MailError::InvalidAddress(self.email.clone()))?;
        Ok(Mailbox::new(self.name.clone(), email))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

impl FromStr for Address {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Address {
    type Error = MailError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
