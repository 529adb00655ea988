use crate::config::settings::Settings;
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dld-etl")]
#[command(about = "Fetch DLD real-estate transactions and publish them to Azure Blob Storage")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the first transaction date (YYYY-MM-DD)")]
    pub start_date: Option<NaiveDate>,

    #[arg(long, help = "Fetch and write the snapshot without uploading")]
    pub dry_run: bool,

    #[arg(long, help = "Exit with a non-zero code when fetch or publish fails")]
    pub fail_on_error: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Settings from the config file (or defaults) with command-line overrides applied.
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(start_date) = self.start_date {
            settings.source.start_date = start_date;
        }

        Ok(settings)
    }
}
