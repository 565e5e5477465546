//! treesync - concurrent delta-aware directory synchronization
//!
//! Mirrors a source directory tree into a destination, copying only files
//! whose size or modification time changed.

mod display;
mod json_output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use display::{create_sync_spinner, display_error, display_success, display_sync_summary};
use json_output::SyncResultJson;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use treesync_config::{Config, ConfigLoader};
use treesync_sync::{SyncOptions, SyncRequest, Synchronizer};
use treesync_types::{Concurrency, RetryPolicy};

/// treesync - concurrent delta-aware directory synchronization
#[derive(Parser)]
#[command(
    name = "treesync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concurrent delta-aware directory synchronization",
    long_about = "treesync mirrors a source directory into a destination directory.\n\
                  Files are copied only when their size differs or the source is newer,\n\
                  symlinks are recreated with their literal target, and entries that only\n\
                  exist at the destination are left untouched."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a directory tree
    Sync {
        /// Source directory
        source: PathBuf,
        /// Destination directory
        destination: PathBuf,
        /// Skip entries whose name or relative path contains this substring
        #[arg(short, long)]
        exclude: Vec<String>,
        /// Maximum number of simultaneous operations
        #[arg(long)]
        concurrency: Option<usize>,
        /// Copy attempts per file before giving up
        #[arg(long)]
        retries: Option<u32>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize logging
    init_logging(&cli, &config)?;

    info!("treesync v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute command
    match cli.command {
        Commands::Sync {
            source,
            destination,
            exclude,
            concurrency,
            retries,
            json,
        } => {
            let options = build_options(&config, exclude, concurrency, retries)?;
            sync_command(source, destination, options, cli.quiet, json).await
        }
        Commands::Config { default } => {
            config_command(&config, default)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };
    Ok(config)
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    if cli.json_logs || config.logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.with_ansi(config.logging.colored_output).init();
    }

    Ok(())
}

/// Merge command line overrides into the configured options
fn build_options(
    config: &Config,
    exclude: Vec<String>,
    concurrency: Option<usize>,
    retries: Option<u32>,
) -> Result<SyncOptions> {
    let mut options = SyncOptions::from_config(config);

    options.exclude.extend(exclude);
    if let Some(limit) = concurrency {
        options.concurrency = Concurrency::new(limit).map_err(anyhow::Error::msg)?;
    }
    if let Some(attempts) = retries {
        options.retry =
            RetryPolicy::new(attempts, options.retry.base_delay).map_err(anyhow::Error::msg)?;
    }

    options.validate()?;
    Ok(options)
}

async fn sync_command(
    source: PathBuf,
    destination: PathBuf,
    options: SyncOptions,
    quiet: bool,
    json: bool,
) -> Result<ExitCode> {
    let interactive = !quiet && !json;
    if interactive {
        println!(
            "{} Synchronizing {} -> {}",
            style("⟲").blue().bold(),
            style(source.display()).cyan(),
            style(destination.display()).cyan()
        );
    }

    let spinner = create_sync_spinner(!interactive, "Synchronizing...")?;

    let request = SyncRequest::new(&source, &destination).with_options(options);
    let outcome = Synchronizer::new().sync(request).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if json {
        let output = SyncResultJson::from_outcome(&source, &destination, &outcome);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(if outcome.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    match outcome {
        Ok(report) => {
            if !quiet {
                display_success("Sync completed");
                display_sync_summary(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            display_error(&format!("Sync failed: {}", error));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn config_command(config: &Config, default: bool) -> Result<()> {
    let (title, shown) = if default {
        ("Default configuration:", Config::default())
    } else {
        ("Current configuration:", config.clone())
    };

    println!("{} {}", style("⚙").blue().bold(), title);
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}
