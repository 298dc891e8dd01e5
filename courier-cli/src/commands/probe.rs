//! `courier probe`

use colored::Colorize;
use courier_mail::Mailer;

use crate::error::CliResult;

pub async fn run(mailer: &Mailer) -> CliResult<()> {
    let settings = mailer.settings();
    mailer.test_connection().await?;

    println!(
        "  {} {}:{} accepts SMTP connections",
        "✓".green().bold(),
        settings.host,
        settings.port
    );
    Ok(())
}
