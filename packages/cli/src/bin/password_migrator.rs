// ABOUTME: One-shot tool that encrypts plaintext passwords stored in the users table
// ABOUTME: Exits with status 1 when any row fails so deploy scripts can detect partial runs

use clap::Parser;
use colored::*;
use inquire::Confirm;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use negaihoshi_cli::{report, run_migration, KeySource, MigratorConfig};
use negaihoshi_config::constants::DEFAULT_LOG_FILTER;

#[derive(Parser)]
#[command(name = "password-migrator")]
#[command(about = "Encrypt legacy plaintext passwords in the Negaihoshi users table")]
#[command(version)]
struct Cli {
    /// Database URL (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Encryption key. Visible in the process list and shell history, so prefer
    /// setting PASSWORD_ENCRYPTION_KEY instead
    #[arg(long, value_name = "KEY")]
    encryption_key: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = MigratorConfig::from_env().with_overrides(cli.database_url, cli.encryption_key);

    if config.key_source == KeySource::BuiltIn {
        warn!("PASSWORD_ENCRYPTION_KEY is not set, using the built-in default key");
    }

    println!("{}", report::header(&config.storage.database_url));
    println!();

    if !cli.yes {
        match Confirm::new("Encrypt all plaintext passwords now?")
            .with_default(false)
            .with_help_message("Rows that already look encrypted are left untouched")
            .prompt()
        {
            Ok(true) => {}
            Ok(false) => {
                println!("{} Migration cancelled", "⚠".yellow().bold());
                return;
            }
            Err(e) => {
                eprintln!("{} Failed to read confirmation: {}", "✗".red().bold(), e);
                process::exit(1);
            }
        }
    }

    let result = run_migration(&config, |row, outcome| {
        println!("{}", report::row_line(row, outcome));
    })
    .await;

    match result {
        Ok(outcome) => {
            println!("{}", report::summary(&outcome));
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("{} Password migration failed: {:#}", "✗".red().bold(), e);
            process::exit(1);
        }
    }
}
