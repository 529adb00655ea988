use crate::core::{
    FailureNotice, FetchOutcome, Notifier, Pipeline, PublishOutcome, RunReport, RunStatus, Stage,
    TransactionBatch,
};
use crate::utils::error::{EtlError, Result};
use std::time::Instant;

/// Runs fetch → publish once. Stage failures are values; only a failing notifier is an `Err`.
pub struct EtlEngine<P: Pipeline, N: Notifier> {
    pipeline: P,
    notifier: N,
    dry_run: bool,
}

impl<P: Pipeline, N: Notifier> EtlEngine<P, N> {
    pub fn new(pipeline: P, notifier: N) -> Self {
        Self {
            pipeline,
            notifier,
            dry_run: false,
        }
    }

    /// Fetch and snapshot only; the publish step is skipped.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn fetch(&self) -> FetchOutcome {
        tracing::info!("📥 Data fetching started");

        let rows = match self.pipeline.extract().await {
            Ok(rows) => rows,
            Err(e) => return FetchOutcome::Failed(e),
        };
        tracing::info!("Extracted {} rows", rows.len());

        let batch = match self.pipeline.transform(rows).await {
            Ok(batch) => batch,
            Err(e) => return FetchOutcome::Failed(e),
        };

        if batch.is_empty() {
            return FetchOutcome::Empty;
        }

        match self.pipeline.snapshot(&batch).await {
            Ok(Some(path)) => tracing::info!("💾 Snapshot written to {}", path),
            Ok(None) => tracing::debug!("Snapshot disabled"),
            Err(e) => return FetchOutcome::Failed(e),
        }

        tracing::info!("📥 Data fetching finished ({} records)", batch.len());
        FetchOutcome::Batch(batch)
    }

    pub async fn publish(&self, batch: &TransactionBatch) -> PublishOutcome {
        tracing::info!("📤 Uploading to blob started");

        match self.pipeline.load(batch).await {
            Ok(location) => {
                tracing::info!("📤 Uploading to blob completed: {}", location);
                PublishOutcome::Published { location }
            }
            Err(e) => PublishOutcome::Failed(e),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("🚀 Starting DLD transaction ETL run");

        let batch = match self.fetch().await {
            FetchOutcome::Batch(batch) => batch,
            FetchOutcome::Empty => {
                tracing::info!("ℹ️ No transactions returned, nothing to publish");
                return Ok(RunReport {
                    status: RunStatus::NothingToPublish,
                    records: 0,
                    notified: false,
                    elapsed: started.elapsed(),
                });
            }
            FetchOutcome::Failed(e) => {
                tracing::error!("❌ Error in fetching DLD transactions data: {}", e);
                self.report_failure(Stage::Fetch, &e).await?;
                return Ok(RunReport {
                    status: RunStatus::FetchFailed,
                    records: 0,
                    notified: true,
                    elapsed: started.elapsed(),
                });
            }
        };

        if self.dry_run {
            tracing::info!("🔍 DRY RUN - skipping upload of {} records", batch.len());
            return Ok(RunReport {
                status: RunStatus::DryRun,
                records: batch.len(),
                notified: false,
                elapsed: started.elapsed(),
            });
        }

        let report = match self.publish(&batch).await {
            PublishOutcome::Published { .. } => RunReport {
                status: RunStatus::Published,
                records: batch.len(),
                notified: false,
                elapsed: started.elapsed(),
            },
            PublishOutcome::Failed(e) => {
                tracing::error!("❌ Error in uploading to Azure Blob: {}", e);
                self.report_failure(Stage::Publish, &e).await?;
                RunReport {
                    status: RunStatus::PublishFailed,
                    records: batch.len(),
                    notified: true,
                    elapsed: started.elapsed(),
                }
            }
        };

        Ok(report)
    }

    async fn report_failure(&self, stage: Stage, error: &EtlError) -> Result<()> {
        tracing::debug!("💡 Suggestion: {}", error.recovery_suggestion());
        let notice = FailureNotice::new(stage, error);
        self.notifier.notify(&notice).await
    }
}
