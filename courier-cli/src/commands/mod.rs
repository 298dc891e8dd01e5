//! Command implementations.

pub mod probe;
pub mod send;

use courier_config::Validate;
use courier_mail::{SmtpSettings, sender_address};
use std::time::Duration;

use crate::ConnectionArgs;
use crate::error::{CliError, CliResult};

/// Build settings from connection flags (which already fall back to `SMTP_*`).
pub fn settings(args: &ConnectionArgs) -> CliResult<SmtpSettings> {
    let host = args
        .host
        .clone()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| CliError::InvalidArgument("--host or SMTP_HOST is required".to_string()))?;

    let mut settings = SmtpSettings::new(host, args.port)
        .credentials(
            args.user.clone().unwrap_or_default(),
            args.pass.clone().unwrap_or_default(),
        )
        .local_identity(args.local_name.clone().unwrap_or_default());

    let sender_name = args.sender_name.as_deref().unwrap_or_default();
    match (&args.from, &args.admin_email) {
        (Some(from), _) => settings = settings.from_address(from.clone()),
        (None, Some(email)) => {
            settings = settings.from_address(sender_address(email, sender_name)?);
        }
        (None, None) if !sender_name.trim().is_empty() => {
            return Err(CliError::InvalidArgument(
                "--sender-name needs --admin-email".to_string(),
            ));
        }
        (None, None) => {}
    }

    if let Some(secs) = args.timeout {
        settings = settings.send_timeout(Duration::from_secs(secs));
    }

    settings.validate()?;
    Ok(settings)
}
