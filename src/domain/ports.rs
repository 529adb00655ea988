use crate::domain::model::{FailureNotice, RawRecord, TransactionBatch};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Local file sink for the diagnostic snapshot.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Single-object upload target. Implementations must overwrite an existing object.
pub trait BlobStore: Send + Sync {
    fn upload(
        &self,
        body: Vec<u8>,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &FailureNotice)
        -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, rows: Vec<RawRecord>) -> Result<TransactionBatch>;
    async fn snapshot(&self, batch: &TransactionBatch) -> Result<Option<String>>;
    async fn load(&self, batch: &TransactionBatch) -> Result<String>;
}
