//! High-level mailer interface.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::{
    Connection, Envelope, MailError, MessageData, Result, SmtpSettings, SmtpTransport,
    SubjectTemplate, Transport,
};

/// Sends templated HTML mail to one configured SMTP server.
///
/// Every call dials its own connection and closes it before returning;
/// nothing is shared between calls except the settings.
#[derive(Clone)]
pub struct Mailer {
    settings: SmtpSettings,
    transport: Arc<dyn Transport>,
}

impl Mailer {
    /// Create a mailer over a custom transport.
    pub fn new(settings: SmtpSettings, transport: impl Transport + 'static) -> Self {
        Self {
            settings,
            transport: Arc::new(transport),
        }
    }

    /// Create a mailer that talks SMTP through lettre.
    pub fn smtp(settings: SmtpSettings) -> Self {
        Self::new(settings, SmtpTransport::new())
    }

    /// Create an SMTP mailer from `SMTP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::smtp(SmtpSettings::from_env()?))
    }

    /// Get the settings.
    pub fn settings(&self) -> &SmtpSettings {
        &self.settings
    }

    /// Render the subject, build the envelope and deliver it.
    ///
    /// Dial, optional authentication and transmission are bounded by the send
    /// timeout. Once the server has accepted the message the send has
    /// succeeded; QUIT runs afterwards under the close timeout and its outcome
    /// is ignored. Credentials are presented only when both username and
    /// password are set.
    pub async fn send<S: AsRef<str>>(
        &self,
        recipients: &[S],
        subject_template: &str,
        body_html: &str,
        data: &MessageData,
    ) -> Result<()> {
        let subject = SubjectTemplate::compile(subject_template)?.render(data)?;
        let envelope = Envelope::new(&self.settings.sender(), recipients, subject, body_html)?;

        let limit = self.settings.timeouts.send;
        let conn = timeout(limit, self.deliver(&envelope))
            .await
            .map_err(|_| MailError::Timeout(limit))??;
        self.finish(conn).await;

        info!(
            recipients = ?envelope.recipient_emails(),
            subject = %envelope.subject,
            host = %self.settings.host,
            port = self.settings.port,
            "Email sent"
        );
        Ok(())
    }

    /// Same contract as [`send`](Self::send).
    pub async fn send_buffered<S: AsRef<str>>(
        &self,
        recipients: &[S],
        subject_template: &str,
        body_html: &str,
        data: &MessageData,
    ) -> Result<()> {
        self.send(recipients, subject_template, body_html, data).await
    }

    /// Check that the server is reachable and answers an SMTP dial.
    ///
    /// A plain TCP connect comes first, bounded by the connect timeout; then a
    /// protocol dial (greeting, EHLO, TLS) bounded by the probe timeout. The
    /// probe message is composed but never transmitted. Every failure is
    /// reported as [`MailError::Connection`].
    pub async fn test_connection(&self) -> Result<()> {
        let host = self.settings.host.as_str();
        let port = self.settings.port;

        if port == 0 {
            return Err(MailError::Connection(
                "port 0 is outside 1-65535".to_string(),
            ));
        }

        let connect_limit = self.settings.timeouts.connect;
        match timeout(connect_limit, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => drop(stream),
            Ok(Err(e)) => {
                return Err(MailError::Connection(format!("{}:{}: {}", host, port, e)));
            }
            Err(_) => return Err(unanswered(host, port, connect_limit)),
        }
        debug!(host, port, "TCP connection succeeded");

        match Envelope::probe(&self.settings) {
            Ok(probe) => debug!(
                sender = %probe.sender,
                subject = %probe.subject,
                "Probe message composed"
            ),
            Err(e) => debug!(error = %e, "Probe message could not be composed"),
        }

        let probe_limit = self.settings.timeouts.probe;
        let conn = timeout(probe_limit, self.transport.dial(&self.settings))
            .await
            .map_err(|_| unanswered(host, port, probe_limit))?
            .map_err(MailError::into_connection)?;

        self.finish(conn).await;
        debug!(host, port, "SMTP dial succeeded");
        Ok(())
    }

    /// Dial and hand the message off, returning the still-open connection.
    ///
    /// A failed session is closed here, inside the caller's send bound.
    async fn deliver(&self, envelope: &Envelope) -> Result<Box<dyn Connection>> {
        let mut conn = self.transport.dial(&self.settings).await?;

        match self.transmit(conn.as_mut(), envelope).await {
            Ok(()) => Ok(conn),
            Err(e) => {
                if let Err(close) = conn.close().await {
                    debug!(error = %close, "SMTP session did not close cleanly");
                }
                Err(e)
            }
        }
    }

    /// Best-effort QUIT. The connection is dropped whatever the outcome.
    async fn finish(&self, mut conn: Box<dyn Connection>) {
        let limit = self.settings.timeouts.close;
        match timeout(limit, conn.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "SMTP session did not close cleanly"),
            Err(_) => debug!(?limit, "QUIT unanswered, dropping connection"),
        }
    }

    async fn transmit(&self, conn: &mut dyn Connection, envelope: &Envelope) -> Result<()> {
        if self.settings.has_credentials() {
            conn.authenticate(&self.settings.username, &self.settings.password)
                .await?;
        }
        conn.send(envelope).await
    }
}

fn unanswered(host: &str, port: u16, limit: Duration) -> MailError {
    MailError::Connection(format!("{}:{}: no answer within {:?}", host, port, limit))
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
