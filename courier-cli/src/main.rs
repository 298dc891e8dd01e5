//! Courier CLI - send templated mail and check SMTP connectivity.
//!
//! # Commands
//!
//! - `courier send` - Render a subject template and send an HTML message
//! - `courier probe` - Check that the SMTP server is reachable and answers a dial
//!
//! Connection flags fall back to `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`,
//! `SMTP_PASS`, `SMTP_LOCAL_NAME`, `SMTP_FROM`, `SMTP_ADMIN_EMAIL` and
//! `SMTP_SENDER_NAME`; a `.env` file in the working directory is loaded first.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;

mod commands;
mod error;

use commands::{probe, send};
use courier_config::EnvLoader;
use courier_mail::{DEFAULT_PORT, Mailer};
use error::{CliError, CliResult};

/// Courier - SMTP mail helper
#[derive(Parser)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "Send templated HTML mail and probe SMTP servers")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the subject and send an HTML message
    #[command(alias = "s")]
    Send(SendArgs),

    /// Check TCP reachability and SMTP dial without sending mail
    #[command(alias = "p", visible_alias = "test")]
    Probe,
}

/// SMTP target and credentials.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// SMTP server host
    #[arg(long, global = true, env = "SMTP_HOST")]
    pub host: Option<String>,

    /// SMTP server port
    #[arg(long, global = true, env = "SMTP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Username; also the sender address unless --from is given
    #[arg(long, global = true, env = "SMTP_USER")]
    pub user: Option<String>,

    /// Password
    #[arg(long, global = true, env = "SMTP_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Name announced in EHLO
    #[arg(long, global = true, env = "SMTP_LOCAL_NAME")]
    pub local_name: Option<String>,

    /// Sender address
    #[arg(long, global = true, env = "SMTP_FROM")]
    pub from: Option<String>,

    /// Sender address, combined with --sender-name when --from is not given
    #[arg(long, global = true, env = "SMTP_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Display name for --admin-email
    #[arg(long, global = true, env = "SMTP_SENDER_NAME")]
    pub sender_name: Option<String>,

    /// Overall send timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

/// Arguments for `courier send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address (repeatable, order is kept)
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// Subject template, e.g. "Welcome, {{.Name}}!"
    #[arg(long)]
    pub subject: String,

    /// Recipient name, available as {{.Name}}
    #[arg(long, default_value = "")]
    pub name: String,

    /// Content entry key=value, available as {{.Content.key}} (repeatable)
    #[arg(long = "content", value_parser = send::parse_content)]
    pub content: Vec<(String, Value)>,

    /// HTML body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the HTML body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mailer = Mailer::smtp(commands::settings(&cli.connection)?);

    match cli.command {
        Commands::Send(args) => send::run(&mailer, args).await,
        Commands::Probe => probe::run(&mailer).await,
    }
}

fn exit_with(e: CliError) -> ! {
    eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    // Before parsing, so .env values reach clap's `env` fallbacks
    if let Err(e) = EnvLoader::load_dotenv(None) {
        exit_with(e.into());
    }

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        exit_with(e);
    }
}
