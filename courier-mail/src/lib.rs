//! # Courier Mail
//!
//! Templated HTML mail over SMTP, plus a connectivity probe.
//!
//! ## Features
//!
//! - **SMTP Transport**: lettre sessions with STARTTLS or implicit TLS and
//!   PLAIN/LOGIN authentication when credentials are configured
//! - **Subject Templates**: `{{.Name}}` / `{{.Content.key}}` substitution with
//!   strict lookup
//! - **Connectivity Probe**: TCP reachability followed by an SMTP dial, no mail sent
//! - **Pluggable Transport**: swap in [`MemoryTransport`] or your own [`Transport`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_mail::{Mailer, MessageData, SmtpSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = SmtpSettings::new("smtp.example.com", 587)
//!         .credentials("noreply@example.com", "password");
//!
//!     let mailer = Mailer::smtp(settings);
//!     mailer.test_connection().await?;
//!
//!     let data = MessageData::new("Ada").with("plan", "Pro");
//!     mailer
//!         .send(
//!             &["ada@example.com"],
//!             "Welcome to {{.Content.plan}}, {{.Name}}!",
//!             "<h1>Welcome!</h1>",
//!             &data,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod address;
mod envelope;
mod error;
mod mailer;
mod memory;
mod settings;
mod template;
mod transport;

pub use address::Address;
pub use envelope::{Envelope, PROBE_SUBJECT};
pub use error::{ErrorKind, MailError, Result};
pub use mailer::Mailer;
pub use memory::{MemoryTransport, TransportEvent};
pub use settings::{
    DEFAULT_PORT, ENV_PREFIX, IMPLICIT_TLS_PORT, SmtpSettings, Timeouts, sender_address,
};
pub use template::{MessageData, SubjectTemplate, render_subject};
pub use transport::{Connection, SmtpTransport, Transport};

/// Prelude for common imports.
///
/// ```
/// use courier_mail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::envelope::Envelope;
    pub use crate::error::{ErrorKind, MailError, Result};
    pub use crate::mailer::Mailer;
    pub use crate::memory::MemoryTransport;
    pub use crate::settings::{SmtpSettings, Timeouts};
    pub use crate::template::{MessageData, SubjectTemplate};
    pub use crate::transport::{Connection, SmtpTransport, Transport};
}
