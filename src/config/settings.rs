use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://gateway.dubailand.gov.ae/open-data/transactions";

/// Non-secret job settings. Every section and field is optional in the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub snapshot: SnapshotSettings,
    pub storage: StorageSettings,
    pub notify: NotifySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub endpoint: String,
    /// First transaction date requested; the range always ends today.
    pub start_date: NaiveDate,
    pub probe_page_size: usize,
    /// Upper bound on the page size of the full pull.
    pub max_rows: usize,
    pub timeout_seconds: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            probe_page_size: 10,
            max_rows: 1_000_000,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub enabled: bool,
    pub directory: String,
    pub filename: String,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: ".".to_string(),
            filename: "results.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub endpoint_suffix: String,
    /// Full blob service URL, e.g. an Azurite emulator. Overrides `endpoint_suffix`.
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint_suffix: "core.windows.net".to_string(),
            endpoint: None,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Plain SMTP without STARTTLS is only meant for local relays such as MailHog.
    pub starttls: bool,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub timeout_seconds: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.office365.com".to_string(),
            smtp_port: 587,
            starttls: true,
            sender: "dld-etl@example.com".to_string(),
            recipient: "dld-etl@example.com".to_string(),
            subject: "Error in DLD Script".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Settings {
    /// 讀取並解析 TOML 設定檔
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| EtlError::ConfigError {
            message: format!("Failed to read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_range("source.probe_page_size", self.source.probe_page_size, 1, 1000)?;
        validation::validate_range("source.max_rows", self.source.max_rows, 1, 10_000_000)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 3600)?;

        if self.source.start_date > Local::now().date_naive() {
            return Err(EtlError::InvalidConfigValueError {
                field: "source.start_date".to_string(),
                value: self.source.start_date.to_string(),
                reason: "Start date cannot be in the future".to_string(),
            });
        }

        if self.snapshot.enabled {
            validation::validate_path("snapshot.directory", &self.snapshot.directory)?;
            validation::validate_file_name("snapshot.filename", &self.snapshot.filename)?;
        }

        match &self.storage.endpoint {
            Some(endpoint) => validation::validate_url("storage.endpoint", endpoint)?,
            None => validation::validate_non_empty_string(
                "storage.endpoint_suffix",
                &self.storage.endpoint_suffix,
            )?,
        }
        validation::validate_range(
            "storage.timeout_seconds",
            self.storage.timeout_seconds,
            1,
            3600,
        )?;

        validation::validate_non_empty_string("notify.smtp_host", &self.notify.smtp_host)?;
        validation::validate_range("notify.smtp_port", self.notify.smtp_port, 1, u16::MAX)?;
        validation::validate_email("notify.sender", &self.notify.sender)?;
        validation::validate_email("notify.recipient", &self.notify.recipient)?;
        validation::validate_non_empty_string("notify.subject", &self.notify.subject)?;
        validation::validate_range("notify.timeout_seconds", self.notify.timeout_seconds, 1, 600)?;

        tracing::debug!("✅ Settings validation passed");
        Ok(())
    }
}
