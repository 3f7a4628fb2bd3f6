// ⚙️ Configuration - command line flags with environment fallbacks

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::Storage;

pub const DEFAULT_LOG_FILE: &str = "billing_manager.log";

#[derive(Parser, Debug, Clone)]
#[command(name = "billing-manager", version, about = "Track monthly bills against a salary")]
pub struct Config {
    /// Directory holding billing_data.json and billing_data.csv
    #[arg(long, env = "BILLING_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Prefix used when showing amounts
    #[arg(long, env = "BILLING_CURRENCY", default_value = "R$")]
    pub currency: String,

    /// Log destination for the interactive UI (defaults to the data directory)
    #[arg(long, env = "BILLING_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive bill entry (default)
    Ui,
    /// Print the saved bills and totals
    Summary,
    /// Write billing_data.csv from the saved JSON
    ExportCsv,
}

impl Config {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Ui)
    }

    pub fn storage(&self) -> Storage {
        Storage::in_dir(&self.data_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_LOG_FILE))
    }
}
