#![allow(dead_code)]

use dld_etl::core::{BlobStore, Notifier};
use dld_etl::{EtlError, FailureNotice, Result, Secrets, COLUMN_MAPPING};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const API_PATH: &str = "/open-data/transactions";

/// One gateway row carrying every mapped column plus the extras the API adds.
pub fn raw_row(n: usize, total: usize) -> Value {
    let mut row = serde_json::Map::new();
    for (source, _) in COLUMN_MAPPING {
        row.insert(source.to_string(), json!(format!("{} {}", source, n)));
    }
    row.insert("TRANSACTION_NUMBER".to_string(), json!(format!("1-11-2024-{}", n)));
    row.insert("TRANS_VALUE".to_string(), json!(1_000_000 + n));
    row.insert("TOTAL_BUYER".to_string(), json!(1));
    row.insert("TOTAL".to_string(), json!(total));
    row.insert("ROW_NUM".to_string(), json!(n + 1));
    row.insert("PROCEDURE_AR".to_string(), json!("بيع"));
    Value::Object(row)
}

pub fn raw_rows(count: usize, total: usize) -> Vec<Value> {
    (0..count).map(|n| raw_row(n, total)).collect()
}

pub fn api_body(rows: Vec<Value>) -> Value {
    json!({ "response": { "result": rows } })
}

pub fn test_secrets() -> Secrets {
    Secrets {
        email_password: "smtp-secret".to_string(),
        account_name: "devstoreaccount1".to_string(),
        account_key: STANDARD.encode(b"integration-test-account-key-000"),
        blob_name: "transactions.csv".to_string(),
        container_name: "dld-data".to_string(),
    }
}

#[derive(Clone, Default)]
pub struct MockBlobStore {
    uploads: Arc<Mutex<Vec<(Vec<u8>, String)>>>,
    fail_with_status: Option<u16>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub async fn uploads(&self) -> Vec<(Vec<u8>, String)> {
        self.uploads.lock().await.clone()
    }
}

impl BlobStore for MockBlobStore {
    async fn upload(&self, body: Vec<u8>, content_type: &str) -> Result<String> {
        if let Some(status) = self.fail_with_status {
            return Err(EtlError::StorageError {
                status,
                message: "AuthenticationFailed".to_string(),
            });
        }
        self.uploads
            .lock()
            .await
            .push((body, content_type.to_string()));
        Ok("mock://dld-data/transactions.csv".to_string())
    }
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    notices: Arc<Mutex<Vec<FailureNotice>>>,
    broken: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an SMTP outage: every notification fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub async fn notices(&self) -> Vec<FailureNotice> {
        self.notices.lock().await.clone()
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, notice: &FailureNotice) -> Result<()> {
        self.notices.lock().await.push(notice.clone());
        if self.broken {
            return Err(EtlError::ConfigError {
                message: "SMTP authentication rejected".to_string(),
            });
        }
        Ok(())
    }
}
