//! `courier send`

use courier_mail::{Mailer, MessageData};
use serde_json::Value;
use std::path::Path;

use crate::SendArgs;
use crate::error::{CliError, CliResult};

pub async fn run(mailer: &Mailer, args: SendArgs) -> CliResult<()> {
    let body = body(args.body, args.body_file.as_deref())?;

    let mut data = MessageData::new(args.name);
    for (key, value) in args.content {
        data = data.with(key, value);
    }

    mailer.send(&args.to, &args.subject, &body, &data).await?;
    Ok(())
}

fn body(inline: Option<String>, file: Option<&Path>) -> CliResult<String> {
    match (inline, file) {
        (Some(html), None) => Ok(html),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Ok(String::new()),
        (Some(_), Some(_)) => Err(CliError::InvalidArgument(
            "--body and --body-file are mutually exclusive".to_string(),
        )),
    }
}

/// Parse `key=value`; the value is JSON when it parses as JSON, otherwise a string.
pub fn parse_content(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {:?}", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
