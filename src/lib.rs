// Courier - a thin SMTP mail helper
//
// Renders a subject line from a template, attaches an HTML body and hands the
// message to lettre with bounded timeouts. Also checks that a server is
// reachable without sending mail.

// Re-export the mailer
pub use courier_mail::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use courier_config;
