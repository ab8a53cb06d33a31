//! `commission` - delivery-partner commission tooling
//!
//! Quotes trip payouts, validates rule files and manages business settings.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use delivery_commission_core_rs::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "commission", version, about)]
struct Cli {
    /// Business settings file (created with defaults when missing)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a trip against the configured commission rules
    Quote {
        /// Trip distance in kilometers
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,

        /// Rules file to use instead of the configured rules
        #[arg(long)]
        rules: Option<PathBuf>,

        #[arg(long)]
        order_id: Option<String>,
    },

    /// Commission rule file operations
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Business settings operations
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
enum RulesAction {
    /// Load a rules file and report its shape and fingerprint
    Validate { path: PathBuf },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Create the settings file with defaults if it does not exist
    Init,
    /// Print the current settings
    Show,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.settings {
        config.settings_path = path;
    }
    config.log_json |= cli.log_json;

    init_tracing(config.log_json);

    match cli.command {
        Command::Quote {
            distance,
            rules,
            order_id,
        } => {
            if let Some(path) = rules {
                config.rules_path = Some(path);
            }
            commands::quote(&config, distance, order_id)
        }
        Command::Rules {
            action: RulesAction::Validate { path },
        } => commands::validate_rules(&path),
        Command::Settings { action } => match action {
            SettingsAction::Init => commands::init_settings(&config),
            SettingsAction::Show => commands::show_settings(&config),
        },
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
