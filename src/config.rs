use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

const APP_DIR: &str = "wondertogether";

#[derive(Parser, Debug)]
#[command(name = "wondertogether", version, about = "Shared trip and event calendar for your group")]
pub struct Cli {
    /// Planner data file (JSON)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Who is using the planner
    #[arg(long, env = "WONDERTOGETHER_USER")]
    pub user: String,

    /// Open this group instead of the most recently used one
    #[arg(long)]
    pub group: Option<String>,

    /// Theme file (TOML)
    #[arg(long)]
    pub theme: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List your groups and their join codes
    Groups,
    /// Start a new group
    Create { name: String },
    /// Join a group with its 8-character code
    Join { code: String },
    /// Leave a group and switch to your most recent remaining one
    Leave { group: String },
    /// Plan, list or remove trips for the current group
    #[command(subcommand)]
    Trip(TripCommand),
}

#[derive(Subcommand, Debug)]
pub enum TripCommand {
    /// Plan a trip; dates are YYYY-MM-DD and inclusive
    Add {
        destination: String,
        start: NaiveDate,
        end: NaiveDate,
        #[arg(long)]
        country: Option<String>,
    },
    /// List the group's trips
    List,
    /// Remove a trip by id
    Remove { id: String },
}

/// Resolved file locations.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data: PathBuf,
    pub theme: PathBuf,
    pub log: PathBuf,
}

impl Paths {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| eyre!("Could not determine a data directory"))?;
        std::fs::create_dir_all(&data_dir)?;

        let theme = match &cli.theme {
            Some(path) => path.clone(),
            None => dirs::config_dir()
                .map(|d| d.join(APP_DIR).join("theme.toml"))
                .unwrap_or_else(|| data_dir.join("theme.toml")),
        };

        Ok(Self {
            data: cli
                .data
                .clone()
                .unwrap_or_else(|| data_dir.join("planner.json")),
            theme,
            log: data_dir.join("wondertogether.log"),
        })
    }
}
