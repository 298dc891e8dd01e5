//! Message envelopes.

use lettre::message::header::ContentType;

use crate::{Address, MailError, Result, SmtpSettings};

/// Subject of the message a connectivity probe composes but never sends.
pub const PROBE_SUBJECT: &str = "Connection test";

/// A rendered message ready for hand-off: one sender, ordered recipients,
/// a subject and an HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The single sender.
    pub sender: Address,
    /// Recipients in the order they were given.
    pub recipients: Vec<Address>,
    /// Rendered subject.
    pub subject: String,
    /// HTML body, as supplied.
    pub body_html: String,
}

impl Envelope {
    /// Build an envelope, validating every address.
    pub fn new<S: AsRef<str>>(
        sender: &str,
        recipients: &[S],
        subject: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Result<Self> {
        let sender = Address::parse(sender)?;

        if recipients.is_empty() {
            return Err(MailError::InvalidAddress(
                "At least one recipient is required".to_string(),
            ));
        }
        let recipients = recipients
            .iter()
            .map(|r| Address::parse(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sender,
            recipients,
            subject: subject.into(),
            body_html: body_html.into(),
        })
    }

    /// The minimal message a probe composes: the sender writing to itself.
    pub fn probe(settings: &SmtpSettings) -> Result<Self> {
        let sender = settings.sender();
        Self::new(&sender, &[sender.as_str()], PROBE_SUBJECT, String::new())
    }

    /// Recipient addresses without display names.
    pub fn recipient_emails(&self) -> Vec<&str> {
        self.recipients.iter().map(Address::email).collect()
    }

    /// Build a lettre message.
    pub(crate) fn to_message(&self) -> Result<lettre::Message> {
        let mut builder = lettre::Message::builder()
            .from(self.sender.to_mailbox()?)
            .subject(self.subject.as_str());

        for addr in &self.recipients {
            builder = builder.to(addr.to_mailbox()?);
        }

        Ok(builder
            .header(ContentType::TEXT_HTML)
            .body(self.body_html.clone())?)
    }
}
