use crate::config::settings::{SnapshotSettings, SourceSettings};
use crate::core::{BlobStore, Pipeline, RawRecord, Storage, TransactionBatch};
use crate::utils::error::{EtlError, Result};
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DATE_FORMAT: &str = "%m/%d/%Y";
const SORT_ORDER: &str = "TRANSACTION_NUMBER_ASC";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Request body of the DLD open-data transactions endpoint. Empty filters are wildcards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TransactionQuery {
    pub p_from_date: String,
    pub p_to_date: String,
    pub p_group_id: String,
    pub p_is_offplan: String,
    pub p_is_free_hold: String,
    pub p_area_id: String,
    pub p_usage_id: String,
    pub p_prop_type_id: String,
    pub p_take: String,
    pub p_skip: String,
    pub p_sort: String,
}

impl TransactionQuery {
    pub fn new(from: NaiveDate, to: NaiveDate, take: usize) -> Self {
        Self {
            p_from_date: from.format(DATE_FORMAT).to_string(),
            p_to_date: to.format(DATE_FORMAT).to_string(),
            p_group_id: String::new(),
            p_is_offplan: String::new(),
            p_is_free_hold: String::new(),
            p_area_id: String::new(),
            p_usage_id: String::new(),
            p_prop_type_id: String::new(),
            p_take: take.to_string(),
            p_skip: "0".to_string(),
            p_sort: SORT_ORDER.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    response: ApiResponse,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    result: Option<Vec<RawRecord>>,
}

/// The `TOTAL` of the first row is the size of the whole result set. No rows means zero.
pub fn reported_total(rows: &[RawRecord]) -> Result<usize> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };

    let raw = first.get("TOTAL").ok_or_else(|| EtlError::ProcessingError {
        message: "TOTAL is missing from the first result row".to_string(),
    })?;

    let total = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    total.map(|n| n as usize).ok_or_else(|| EtlError::ProcessingError {
        message: format!("TOTAL is not a non-negative integer: {}", raw),
    })
}

pub struct DldPipeline<S: Storage, B: BlobStore> {
    storage: S,
    blob_store: B,
    source: SourceSettings,
    snapshot: SnapshotSettings,
    client: Client,
}

impl<S: Storage, B: BlobStore> DldPipeline<S, B> {
    pub fn new(
        storage: S,
        blob_store: B,
        source: SourceSettings,
        snapshot: SnapshotSettings,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(source.timeout_seconds))
            .build()?;

        Ok(Self {
            storage,
            blob_store,
            source,
            snapshot,
            client,
        })
    }

    async fn post(&self, query: &TransactionQuery) -> Result<Vec<RawRecord>> {
        tracing::debug!(
            "POST {} (P_TAKE={}, {} → {})",
            self.source.endpoint,
            query.p_take,
            query.p_from_date,
            query.p_to_date
        );

        let response = self
            .client
            .post(&self.source.endpoint)
            .json(query)
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        let body = response.error_for_status()?.text().await?;
        let envelope: ApiEnvelope = serde_json::from_str(&body)?;

        Ok(envelope.response.result.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl<S: Storage, B: BlobStore> Pipeline for DldPipeline<S, B> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let to_date = Local::now().date_naive();

        // 第一次請求只為取得總筆數
        let probe = TransactionQuery::new(
            self.source.start_date,
            to_date,
            self.source.probe_page_size,
        );
        let total = reported_total(&self.post(&probe).await?)?;
        tracing::info!(
            "🔎 API reports {} transactions between {} and {}",
            total,
            probe.p_from_date,
            probe.p_to_date
        );

        if total == 0 {
            return Ok(Vec::new());
        }

        let take = if total > self.source.max_rows {
            tracing::warn!(
                "⚠️ Reported total {} exceeds max_rows {}, requesting only {} rows",
                total,
                self.source.max_rows,
                self.source.max_rows
            );
            self.source.max_rows
        } else {
            total
        };

        let rows = self
            .post(&TransactionQuery::new(self.source.start_date, to_date, take))
            .await?;

        // A positive total followed by no rows is a broken response, not an empty day
        if rows.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "API reported {} transactions but the full request returned none",
                    total
                ),
            });
        }

        if rows.len() != take {
            tracing::warn!("⚠️ Requested {} rows but the API returned {}", take, rows.len());
        }

        Ok(rows)
    }

    async fn transform(&self, rows: Vec<RawRecord>) -> Result<TransactionBatch> {
        TransactionBatch::from_raw_rows(&rows)
    }

    async fn snapshot(&self, batch: &TransactionBatch) -> Result<Option<String>> {
        if !self.snapshot.enabled {
            return Ok(None);
        }

        let csv = batch.to_snapshot_csv()?;
        let path = self
            .storage
            .write_file(&self.snapshot.filename, csv.as_bytes())
            .await?;
        Ok(Some(path))
    }

    async fn load(&self, batch: &TransactionBatch) -> Result<String> {
        let csv = batch.to_csv()?;
        tracing::debug!("Uploading {} bytes of CSV", csv.len());
        self.blob_store
            .upload(csv.into_bytes(), CSV_CONTENT_TYPE)
            .await
    }
}
