//! sitecheck CLI
//!
//! Manages the list of watched sites and runs update checks.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitecheck::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{HeadSource, IntervalCrawler},
    storage::LocalStorage,
    utils::http,
};
use tokio_util::sync::CancellationToken;

/// sitecheck - Web Page Update Checker
#[derive(Parser, Debug)]
#[command(
    name = "sitecheck",
    version,
    about = "Check updates of the registered sites"
)]
struct Cli {
    /// Path to storage directory containing config and records
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check updates of the registered sites
    Check {
        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the proxy server registered in config
        #[arg(short, long)]
        proxy: bool,
    },

    /// Manage config values
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage site urls to check
    #[command(subcommand)]
    Site(SiteCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show config values
    #[command(alias = "ls")]
    List,

    /// Set a config value (`proxy` or `interval`); an empty proxy clears it
    Set { key: String, value: String },

    /// Show the config file's path
    Path,
}

#[derive(Subcommand, Debug)]
enum SiteCommand {
    /// Show registered sites
    #[command(alias = "ls")]
    List,

    /// Register a site url
    Add { url: String },

    /// Unregister a site url
    Delete { url: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let records_path = cli.storage_dir.join("records.json");
    let mut config = Config::load_optional(&config_path)?;

    match cli.command {
        Command::Check { output, proxy } => {
            config.validate()?;
            if config.urls.is_empty() {
                log::warn!("No site url is registered. Use 'site add <url>' first.");
            }

            let client = http::create_async_client(&config.crawler, proxy)?;
            let crawler = IntervalCrawler::new(HeadSource::new(client), config.crawler.interval());
            let storage = LocalStorage::new(&records_path);

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, stopping crawl...");
                    on_signal.cancel();
                }
            });

            let outcome = pipeline::run_check(&config.urls, &crawler, &storage, &cancel).await?;

            pipeline::write_report(&mut std::io::stdout().lock(), &outcome.delta)?;
            if outcome.has_updates() {
                log::info!("Records saved to {}", records_path.display());
            }
            if let Some(path) = output {
                let mut file = File::create(&path)?;
                pipeline::write_report(&mut file, &outcome.delta)?;
                file.flush()?;
                log::info!("Report written to {}", path.display());
            }

            if let Some(failure) = outcome.failure {
                log::warn!("{}", failure);
                if failure.cancelled {
                    return Err(AppError::Cancelled);
                }
            }
        }

        Command::Config(ConfigCommand::List) => {
            println!(
                "proxy: {}",
                config.crawler.proxy.as_deref().unwrap_or_default()
            );
            println!("interval: {} sec", config.crawler.interval_secs);
        }

        Command::Config(ConfigCommand::Set { key, value }) => {
            match key.trim() {
                "proxy" => config.crawler.set_proxy(&value)?,
                "interval" => {
                    let secs: i64 = value.trim().parse().map_err(|_| {
                        AppError::validation(format!("invalid interval value: {value}"))
                    })?;
                    config.crawler.set_interval(secs)?;
                }
                other => return Err(AppError::config(format!("invalid key: {other}"))),
            }
            config.save(&config_path)?;
        }

        Command::Config(ConfigCommand::Path) => {
            println!("{}", config_path.display());
        }

        Command::Site(SiteCommand::List) => {
            if config.urls.is_empty() {
                println!("no site url is registered");
            }
            for url in &config.urls {
                println!("{url}");
            }
        }

        Command::Site(SiteCommand::Add { url }) => {
            url::Url::parse(url.trim())?;
            if config.add_url(&url) {
                config.save(&config_path)?;
                log::info!("Added {}", url.trim());
            } else {
                log::warn!("{} is already registered", url.trim());
            }
        }

        Command::Site(SiteCommand::Delete { url }) => {
            if config.remove_url(&url) {
                config.save(&config_path)?;
                log::info!("Deleted {}", url.trim());
            } else {
                log::warn!("{} is not registered", url.trim());
            }
        }
    }

    Ok(())
}
