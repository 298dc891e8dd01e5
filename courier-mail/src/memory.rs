//! In-memory transport.
//!
//! Records every step a mailer takes instead of talking to a server. Useful
//! in tests and in environments where mail should go nowhere.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{Connection, Envelope, MailError, Result, SmtpSettings, Transport};

/// One observed transport step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A connection was opened.
    Dial { host: String, port: u16 },
    /// Credentials were presented.
    Authenticate { username: String },
    /// A message was accepted.
    Send {
        subject: String,
        recipients: Vec<String>,
    },
    /// The session was ended with a QUIT.
    Close,
}

#[derive(Debug, Default)]
struct Shared {
    events: Mutex<Vec<TransportEvent>>,
    delivered: Mutex<Vec<Envelope>>,
    open: AtomicUsize,
}

/// Transport that keeps everything in memory.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
    dial_failure: Option<String>,
    send_failure: Option<String>,
    dial_delay: Option<Duration>,
    send_delay: Option<Duration>,
    close_delay: Option<Duration>,
}

impl MemoryTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every dial with a connection error.
    pub fn fail_dial(mut self, message: impl Into<String>) -> Self {
        self.dial_failure = Some(message.into());
        self
    }

    /// Fail every send with a transport error.
    pub fn fail_send(mut self, message: impl Into<String>) -> Self {
        self.send_failure = Some(message.into());
        self
    }

    /// Wait this long before completing a dial.
    pub fn delay_dial(mut self, delay: Duration) -> Self {
        self.dial_delay = Some(delay);
        self
    }

    /// Wait this long before accepting a message.
    pub fn delay_send(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    /// Wait this long before answering QUIT.
    pub fn delay_close(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    /// Everything observed so far, in order.
    pub fn events(&self) -> Vec<TransportEvent> {
        lock(&self.shared.events).clone()
    }

    /// Messages accepted so far.
    pub fn delivered(&self) -> Vec<Envelope> {
        lock(&self.shared.delivered).clone()
    }

    /// Connections dialed and not yet dropped.
    pub fn open_connections(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }

    fn record(&self, event: TransportEvent) {
        lock(&self.shared.events).push(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn dial(&self, settings: &SmtpSettings) -> Result<Box<dyn Connection>> {
        if let Some(delay) = self.dial_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.dial_failure {
            return Err(MailError::Connection(message.clone()));
        }

        self.record(TransportEvent::Dial {
            host: settings.host.clone(),
            port: settings.port,
        });
        self.shared.open.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryConnection {
            transport: self.clone(),
        }))
    }
}

struct MemoryConnection {
    transport: MemoryTransport,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn authenticate(&mut self, username: &str, _password: &str) -> Result<()> {
        self.transport.record(TransportEvent::Authenticate {
            username: username.to_string(),
        });
        Ok(())
    }

    async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        if let Some(delay) = self.transport.send_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.transport.send_failure {
            return Err(MailError::Transport(message.clone()));
        }

        self.transport.record(TransportEvent::Send {
            subject: envelope.subject.clone(),
            recipients: envelope
                .recipient_emails()
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
        lock(&self.transport.shared.delivered).push(envelope.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(delay) = self.transport.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.transport.record(TransportEvent::Close);
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.transport.shared.open.fetch_sub(1, Ordering::SeqCst);
    }
}
