// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! pagefetch CLI - fetch web pages directly or through a rendering service.
//!
//! # Examples
//!
//! ```bash
//! # Fetch a page and show status, cache policy and body
//! pagefetch fetch https://example.com/
//!
//! # Submit a form
//! pagefetch fetch https://example.com/login --form 'user=a&pass=b'
//!
//! # Render through a rendering service
//! pagefetch fetch https://example.com/app --backend render --render-endpoint http://localhost:8050
//!
//! # JSON output
//! pagefetch --format json --pretty fetch https://example.com/
//!
//! # Write a default config file
//! pagefetch config init
//! ```

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pagefetch_fetch::FetchError;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config as config_cmd, fetch};
use config::Config;
use output::{JsonFormatter, TextFormatter};

// ============================================================================
// CLI Definition
// ============================================================================

/// pagefetch CLI - web page fetching.
#[derive(Parser)]
#[command(name = "pagefetch")]
#[command(about = "Fetch web pages directly or through a rendering service")]
#[command(long_about = r#"
pagefetch fetches a page with one of two backends and reports its status,
cache policy and body.

Backends:
  • direct   plain HTTP to the origin
  • render   a remote rendering service that runs the page's scripts

Examples:
  pagefetch fetch https://example.com/
  pagefetch fetch https://example.com/login --form 'user=a&pass=b'
  pagefetch fetch https://example.com/app --backend render
  pagefetch --format json fetch https://example.com/
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file to use instead of the default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, errors only through the exit code).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a page.
    #[command(visible_alias = "get")]
    Fetch(fetch::FetchArgs),

    /// Manage configuration.
    Config(config_cmd::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Any failure.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("pagefetch=debug")
    } else {
        EnvFilter::try_new(format!("pagefetch={level}"))
            .unwrap_or_else(|_| EnvFilter::new("pagefetch=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            std::process::exit(ExitCode::Error as i32);
        }
    };
    setup_logging(cli.verbose, cli.quiet, &config.general.log_level);
    debug!(
        path = %config_path.display(),
        found = config_path.exists(),
        "Configuration loaded"
    );

    let result = match &cli.command {
        Commands::Fetch(args) => fetch::run(args, &cli, &config).await,
        Commands::Config(args) => config_cmd::run(args, &cli, &config),
    };

    if let Err(e) = result {
        if !cli.quiet {
            report_error(&cli, &e);
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}

/// Prints a failure, with its error kind when it is a fetch failure.
fn report_error(cli: &Cli, error: &anyhow::Error) {
    let Some(fetch_error) = error.downcast_ref::<FetchError>() else {
        eprintln!("Error: {:#}", error);
        return;
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            eprintln!("Error: {}", formatter.format_error(fetch_error));
        }
        OutputFormat::Json => match JsonFormatter::new(cli.pretty).format_error(fetch_error) {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("Error: {}", fetch_error),
        },
    }
}
