//! SMTP connection settings.

use courier_config::{ConfigValidator, EnvLoader, Validate};
use lettre::message::Mailbox;
use std::fmt;
use std::time::Duration;

use crate::{MailError, Result};

/// Port on which servers expect TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Default submission port.
pub const DEFAULT_PORT: u16 = 587;

/// Environment prefix read by [`SmtpSettings::from_env`].
pub const ENV_PREFIX: &str = "SMTP";

/// Bounds applied to each network operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Send up to hand-off: dial, authentication and transmission.
    pub send: Duration,
    /// Raw TCP reachability check, also used as the socket connect timeout.
    pub connect: Duration,
    /// Protocol dial during a connectivity probe.
    pub probe: Duration,
    /// QUIT after a message was handed off. Expiry only drops the socket.
    pub close: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            send: Duration::from_secs(30),
            connect: Duration::from_secs(10),
            probe: Duration::from_secs(15),
            close: Duration::from_secs(5),
        }
    }
}

/// SMTP configuration for a single target server.
///
/// Settings are immutable once handed to a [`Mailer`](crate::Mailer).
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// SMTP server host, also the name TLS certificates are verified against.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Username for authentication. Doubles as the sender address.
    pub username: String,
    /// Password for authentication.
    pub password: String,
    /// Name announced in EHLO. Empty uses the machine hostname.
    pub local_identity: String,
    /// Explicit sender address, for servers where the username is not a mailbox.
    pub from: Option<String>,
    /// Per-operation timeouts.
    pub timeouts: Timeouts,
}

impl SmtpSettings {
    /// Create settings for an unauthenticated server.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: String::new(),
            password: String::new(),
            local_identity: String::new(),
            from: None,
            timeouts: Timeouts::default(),
        }
    }

    /// Set credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the EHLO name.
    pub fn local_identity(mut self, identity: impl Into<String>) -> Self {
        self.local_identity = identity.into();
        self
    }

    /// Send as this address instead of the username.
    pub fn from_address(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Replace all timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the overall send timeout.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.send = timeout;
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = timeout;
        self
    }

    /// Set the probe dial timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.probe = timeout;
        self
    }

    /// Set how long to wait for the server to answer QUIT.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.close = timeout;
        self
    }

    /// Authentication happens only when both username and password are set.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Whether the connection is TLS-wrapped from the start rather than upgraded.
    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }

    /// Address placed in From and MAIL FROM.
    ///
    /// Resolution order: explicit `from`, then the username, then
    /// `postmaster@<host>` for anonymous relays.
    pub fn sender(&self) -> String {
        match &self.from {
            Some(from) if !from.trim().is_empty() => from.clone(),
            _ if !self.username.is_empty() => self.username.clone(),
            _ => format!("postmaster@{}", self.host),
        }
    }

    /// Load settings from `SMTP_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self> {
        EnvLoader::load_dotenv(None)?;
        Self::from_loader(&EnvLoader::new(Some(ENV_PREFIX.to_string())))
    }

    /// Load settings through an arbitrary loader.
    ///
    /// Reads `HOST` (required), `PORT` (default 587), `USER`, `PASS`,
    /// `LOCAL_NAME`, `FROM`, `ADMIN_EMAIL` and `SENDER_NAME`. `FROM` wins
    /// over `ADMIN_EMAIL`/`SENDER_NAME`, which are combined into
    /// `Name <email>`.
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let host = loader.load_var("host")?;
        let port = loader.load_parsed_or::<u16>("port", DEFAULT_PORT)?;

        let mut settings = Self::new(host, port)
            .credentials(
                loader.load_var_or("user", "")?,
                loader.load_var_or("pass", "")?,
            )
            .local_identity(loader.load_var_or("local_name", "")?);

        let from = loader.load_optional("from")?;
        let admin_email = loader.load_optional("admin_email")?;
        let sender_name = loader.load_var_or("sender_name", "")?;

        match (from, admin_email) {
            (Some(from), _) => settings = settings.from_address(from),
            (None, Some(email)) => {
                let from = sender_address(&email, &sender_name).map_err(|e| {
                    MailError::Config(format!("{}: {}", loader.key_name("admin_email"), e))
                })?;
                settings = settings.from_address(from);
            }
            (None, None) if !sender_name.trim().is_empty() => {
                return Err(MailError::Config(format!(
                    "{} is set without {}",
                    loader.key_name("sender_name"),
                    loader.key_name("admin_email")
                )));
            }
            (None, None) => {}
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Combine a sender address and display name into `Name <email>`.
///
/// An empty name yields the bare address.
pub fn sender_address(email: &str, name: &str) -> Result<String> {
    let email = email.trim().parse()?;
    let name = Some(name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, email).to_string())
}

impl Validate for SmtpSettings {
    fn validate(&self) -> courier_config::Result<()> {
        ConfigValidator::is_host(&self.host, "host")?;
        ConfigValidator::is_port(self.port, "port")?;
        Ok(())
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("local_identity", &self.local_identity)
            .field("from", &self.from)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}
