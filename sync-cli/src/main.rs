//! # monthsync
//!
//! Share a twelve-month calendar between devices.
//!
//! ## Commands
//!
//! - `init`: Initialize device identity
//! - `show`: Print the local calendar
//! - `set` / `clear`: Edit one month
//! - `export`: Write the calendar as a package file for another device
//! - `import`: List the changes a received package proposes
//! - `accept`: Apply some or all of those changes
//! - `status`: Show device and calendar status
//!
//! ## Example
//!
//! ```bash
//! # On the phone
//! monthsync init --name "Phone"
//! monthsync set april --day 22 --title "Earth Day" --location "Park"
//! monthsync export phone.json
//!
//! # On the laptop, after copying phone.json over
//! monthsync import phone.json
//! monthsync accept phone.json --only 1 --amend 1="Earth Day Fair"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod store;
mod transport;

use commands::accept::{parse_amendment, Selection};
use commands::{accept, edit, export, import, init, parse_month, show, status};
use config::Settings;

/// Share a twelve-month calendar between devices.
#[derive(Parser, Debug)]
#[command(name = "monthsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for device identity, calendar and settings
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize device identity
    Init {
        /// Device name shown to peers
        #[arg(long, short)]
        name: String,
    },

    /// Print the local calendar
    Show,

    /// Schedule an event in a month
    Set {
        /// Month number or name
        #[arg(value_parser = parse_month)]
        month: i32,

        /// Day of the month
        #[arg(long, short)]
        day: i32,

        /// Event title
        #[arg(long, short)]
        title: String,

        /// Event location
        #[arg(long, short, default_value = "")]
        location: String,
    },

    /// Remove the event in a month
    Clear {
        /// Month number or name
        #[arg(value_parser = parse_month)]
        month: i32,
    },

    /// Write the calendar as a package file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// List the changes a package file proposes
    Import {
        /// Received package file
        file: PathBuf,
    },

    /// Apply proposed changes from a package file
    Accept {
        /// Received package file
        file: PathBuf,

        /// Apply every proposal
        #[arg(long, conflicts_with = "only")]
        all: bool,

        /// Apply only these proposals (numbers from `import`)
        #[arg(long, num_args = 1..)]
        only: Vec<usize>,

        /// Replace a proposed value before applying, as N=VALUE
        #[arg(long, value_parser = parse_amendment)]
        amend: Vec<(usize, String)>,
    },

    /// Show device and calendar status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let created = !data_dir.exists();
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    if created {
        config::set_dir_permissions_0700(&data_dir).await?;
    }

    let settings = Settings::load(&data_dir)?;
    init_logging(&settings);
    tracing::debug!("Using data directory {}", data_dir.display());

    match cli.command {
        Commands::Init { name } => {
            init::run(&data_dir, &name).await?;
        }
        Commands::Show => {
            show::run(&data_dir).await?;
        }
        Commands::Set {
            month,
            day,
            title,
            location,
        } => {
            edit::set(&data_dir, month, day, &title, &location).await?;
        }
        Commands::Clear { month } => {
            edit::clear(&data_dir, month).await?;
        }
        Commands::Export { file } => {
            export::run(&data_dir, &settings, &file).await?;
        }
        Commands::Import { file } => {
            import::run(&data_dir, &settings, &file).await?;
        }
        Commands::Accept {
            file,
            all,
            only,
            amend,
        } => {
            let selection = if all {
                Selection::All
            } else if !only.is_empty() {
                Selection::Only(only)
            } else {
                anyhow::bail!("Must specify either --all or --only <N>...");
            };
            accept::run(&data_dir, &settings, &file, selection, amend).await?;
        }
        Commands::Status => {
            status::run(&data_dir, &settings).await?;
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for monthsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "monthsync", "monthsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
