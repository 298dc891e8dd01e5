//! Email transport implementations.

use async_trait::async_trait;
use lettre::transport::smtp::{
    authentication::{Credentials, Mechanism},
    client::{AsyncSmtpConnection, TlsParameters},
    extension::ClientId,
};
use tracing::debug;

use crate::{Envelope, MailError, Result, SmtpSettings};

/// Mechanisms offered when authenticating, in order of preference.
const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// Opens connections to an SMTP server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and complete the greeting, EHLO and TLS setup.
    async fn dial(&self, settings: &SmtpSettings) -> Result<Box<dyn Connection>>;
}

/// A single open connection.
///
/// Dropping a connection releases the socket without a QUIT.
#[async_trait]
pub trait Connection: Send {
    /// Authenticate with username and password.
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<()>;

    /// Transmit one message.
    async fn send(&mut self, envelope: &Envelope) -> Result<()>;

    /// End the session.
    async fn close(&mut self) -> Result<()>;
}

/// SMTP transport backed by lettre.
///
/// Port 465 is TLS-wrapped from the start; on any other port the session is
/// upgraded with STARTTLS when the server offers it. With credentials
/// configured the upgrade is mandatory and a server without STARTTLS is
/// refused before AUTH. Certificates are verified against the configured host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpTransport;

impl SmtpTransport {
    /// Create a new SMTP transport.
    pub fn new() -> Self {
        Self
    }

    fn client_id(settings: &SmtpSettings) -> ClientId {
        if settings.local_identity.is_empty() {
            ClientId::default()
        } else {
            ClientId::Domain(settings.local_identity.clone())
        }
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn dial(&self, settings: &SmtpSettings) -> Result<Box<dyn Connection>> {
        let hello = Self::client_id(settings);
        let implicit_tls = settings.implicit_tls();

        let wrapper = if implicit_tls {
            Some(TlsParameters::new(settings.host.clone())?)
        } else {
            None
        };

        let mut inner = AsyncSmtpConnection::connect_tokio1(
            (settings.host.clone(), settings.port),
            Some(settings.timeouts.connect),
            &hello,
            wrapper,
            None,
        )
        .await
        .map_err(|e| {
            MailError::Connection(format!("{}:{}: {}", settings.host, settings.port, e))
        })?;

        if !implicit_tls {
            if inner.can_starttls() {
                let tls = TlsParameters::new(settings.host.clone())?;
                inner.starttls(tls, &hello).await?;
            } else if settings.has_credentials() {
                // Credentials never travel over a plaintext session
                inner.abort().await;
                return Err(MailError::Transport(format!(
                    "{}:{}: server does not offer STARTTLS",
                    settings.host, settings.port
                )));
            }
        }

        debug!(
            host = %settings.host,
            port = settings.port,
            encrypted = inner.is_encrypted(),
            "SMTP session established"
        );

        Ok(Box::new(SmtpConnection { inner }))
    }
}

/// Open lettre session.
struct SmtpConnection {
    inner: AsyncSmtpConnection,
}

#[async_trait]
impl Connection for SmtpConnection {
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let credentials = Credentials::new(username.to_owned(), password.to_owned());
        self.inner.auth(AUTH_MECHANISMS, &credentials).await?;
        Ok(())
    }

    async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let message = envelope.to_message()?;
        let response = self
            .inner
            .send(message.envelope(), &message.formatted())
            .await?;

        debug!(code = %response.code(), "Message accepted");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.quit().await?;
        Ok(())
    }
}
