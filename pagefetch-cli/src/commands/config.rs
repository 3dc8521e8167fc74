//! Config command - manage configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli, config: &Config) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, config),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    Config::resolve_path(cli.config.as_deref())
}

fn show_config(cli: &Cli, config: &Config) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_config(config));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(config)?);
        }
    }
    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = config_path(cli);
    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": path.display().to_string(),
                "exists": path.exists(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }
    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    if !cli.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
