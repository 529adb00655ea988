pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{Secrets, Settings};

pub use adapters::{AzureBlobStore, LocalStorage, SmtpNotifier};
pub use crate::core::{etl::EtlEngine, pipeline::DldPipeline};
pub use domain::model::{
    FailureNotice, FetchOutcome, PublishOutcome, RunReport, RunStatus, Stage, TransactionBatch,
    TransactionRecord, COLUMN_MAPPING,
};
pub use utils::error::{EtlError, Result};
