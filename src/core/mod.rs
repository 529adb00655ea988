pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{
    FailureNotice, FetchOutcome, PublishOutcome, RawRecord, RunReport, RunStatus, Stage,
    TransactionBatch, TransactionRecord,
};
pub use crate::domain::ports::{BlobStore, Notifier, Pipeline, Storage};
pub use crate::utils::error::Result;
