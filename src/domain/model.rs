use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::time::Duration;

/// One row as returned by the DLD gateway, before projection.
pub type RawRecord = Map<String, Value>;

/// Source column → published label. Order is the published column order.
pub const COLUMN_MAPPING: [(&str, &str); 22] = [
    ("TRANSACTION_NUMBER", "Transaction Number"),
    ("INSTANCE_DATE", "Transaction Date"),
    ("GROUP_EN", "Transaction Type"),
    ("PROCEDURE_EN", "Transaction Sub Type"),
    ("IS_OFFPLAN_EN", "Registration Type"),
    ("IS_FREE_HOLD_EN", "Is Free Hold?"),
    ("USAGE_EN", "Usage"),
    ("AREA_EN", "Area"),
    ("PROP_TYPE_EN", "Property Type"),
    ("PROP_SB_TYPE_EN", "Property Sub Type"),
    ("TRANS_VALUE", "Amount"),
    ("PROCEDURE_AREA", "Transaction Size (sq.m)"),
    ("ACTUAL_AREA", "Property Size (sq.m)"),
    ("ROOMS_EN", "Room(s)"),
    ("PARKING", "Parking"),
    ("NEAREST_METRO_EN", "Nearest Metro"),
    ("NEAREST_MALL_EN", "Nearest Mall"),
    ("NEAREST_LANDMARK_EN", "Nearest Landmark"),
    ("TOTAL_BUYER", "No. of Buyer"),
    ("TOTAL_SELLER", "No. of Seller"),
    ("MASTER_PROJECT_EN", "Master Project"),
    ("PROJECT_EN", "Project"),
];

pub fn column_labels() -> Vec<&'static str> {
    COLUMN_MAPPING.iter().map(|(_, label)| *label).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    values: Vec<Value>,
}

impl TransactionRecord {
    /// Cells missing from this particular row become null.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let values = COLUMN_MAPPING
            .iter()
            .map(|(source, _)| raw.get(*source).cloned().unwrap_or(Value::Null))
            .collect();
        Self { values }
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        COLUMN_MAPPING
            .iter()
            .position(|(_, l)| *l == label)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionBatch {
    records: Vec<TransactionRecord>,
}

impl TransactionBatch {
    /// Projects and renames raw rows. Fails when a mapped column appears in none of the rows.
    pub fn from_raw_rows(rows: &[RawRecord]) -> Result<Self> {
        if !rows.is_empty() {
            for (source, _) in COLUMN_MAPPING.iter() {
                if !rows.iter().any(|row| row.contains_key(*source)) {
                    return Err(EtlError::MissingColumnError {
                        column: source.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            records: rows.iter().map(TransactionRecord::from_raw).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// CSV with a header row and no index column. This is the published form.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(column_labels())?;
        for record in &self.records {
            writer.write_record(record.values.iter().map(csv_cell))?;
        }
        finish_csv(writer)
    }

    /// CSV with a leading unnamed 0-based row index, used for the local snapshot.
    pub fn to_snapshot_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(std::iter::once("").chain(column_labels()))?;
        for (idx, record) in self.records.iter().enumerate() {
            writer.write_record(
                std::iter::once(idx.to_string()).chain(record.values.iter().map(csv_cell)),
            )?;
        }
        finish_csv(writer)
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        nested => nested.to_string(),
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV buffer: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Publish,
}

#[derive(Debug, Clone)]
pub struct FailureNotice {
    pub stage: Stage,
    pub error: String,
    pub occurred_at: DateTime<Local>,
}

impl FailureNotice {
    pub fn new(stage: Stage, error: &EtlError) -> Self {
        Self {
            stage,
            error: error.to_string(),
            occurred_at: Local::now(),
        }
    }

    pub fn body(&self) -> String {
        let prefix = match self.stage {
            Stage::Fetch => "Something went wrong in fetching DLD transaction data.",
            Stage::Publish => {
                "Something went wrong in uploading to Azure Blob, DLD transaction data."
            }
        };
        format!("{} Error is: {}", prefix, self.error)
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Batch(TransactionBatch),
    Empty,
    Failed(EtlError),
}

#[derive(Debug)]
pub enum PublishOutcome {
    Published { location: String },
    Failed(EtlError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Published,
    NothingToPublish,
    DryRun,
    FetchFailed,
    PublishFailed,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub records: usize,
    pub notified: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            RunStatus::FetchFailed | RunStatus::PublishFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_row(n: i64) -> RawRecord {
        let mut row = RawRecord::new();
        for (source, _) in COLUMN_MAPPING.iter() {
            row.insert(source.to_string(), json!(format!("{}-{}", source, n)));
        }
        row.insert("TRANSACTION_NUMBER".to_string(), json!(n));
        row
    }

    #[test]
    fn test_mapping_is_bijective() {
        let mut sources: Vec<_> = COLUMN_MAPPING.iter().map(|(s, _)| *s).collect();
        let mut labels = column_labels();
        sources.sort();
        sources.dedup();
        labels.sort();
        labels.dedup();
        assert_eq!(sources.len(), COLUMN_MAPPING.len());
        assert_eq!(labels.len(), COLUMN_MAPPING.len());
    }

    #[test]
    fn test_projection_drops_extra_columns() {
        let mut row = full_row(1);
        row.insert("TOTAL".to_string(), json!(1));
        row.insert("NAME_AR".to_string(), json!("ignored"));

        let batch = TransactionBatch::from_raw_rows(&[row]).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records()[0].values().len(), 22);
        assert_eq!(batch.records()[0].get("Transaction Number"), Some(&json!(1)));
        assert!(batch.records()[0].get("TOTAL").is_none());
    }

    #[test]
    fn test_column_missing_everywhere_fails() {
        let mut row = full_row(1);
        row.remove("PARKING");

        let err = TransactionBatch::from_raw_rows(&[row]).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { ref column } if column == "PARKING"));
    }

    #[test]
    fn test_cell_missing_in_one_row_becomes_empty() {
        let mut sparse = full_row(2);
        sparse.remove("ROOMS_EN");

        let batch = TransactionBatch::from_raw_rows(&[full_row(1), sparse]).unwrap();
        assert_eq!(batch.records()[1].get("Room(s)"), Some(&Value::Null));
    }

    #[test]
    fn test_to_csv_has_header_and_no_index() {
        let mut row = full_row(7);
        row.insert("TRANS_VALUE".to_string(), json!(1250000.5));
        row.insert("ROOMS_EN".to_string(), Value::Null);
        row.insert("PROJECT_EN".to_string(), json!("Marina, Tower 1"));

        let csv = TransactionBatch::from_raw_rows(&[row]).unwrap().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Transaction Number,Transaction Date,"));
        assert!(lines[0].ends_with(",Master Project,Project"));
        assert!(lines[1].starts_with("7,"));
        assert!(lines[1].contains(",1250000.5,"));
        assert!(lines[1].ends_with(",\"Marina, Tower 1\""));
    }

    #[test]
    fn test_snapshot_csv_has_index_column() {
        let batch = TransactionBatch::from_raw_rows(&[full_row(1), full_row(2)]).unwrap();
        let csv = batch.to_snapshot_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].starts_with(",Transaction Number,"));
        assert!(lines[1].starts_with("0,1,"));
        assert!(lines[2].starts_with("1,2,"));
    }

    #[test]
    fn test_failure_notice_body() {
        let err = EtlError::StorageError {
            status: 403,
            message: "AuthenticationFailed".to_string(),
        };
        let notice = FailureNotice::new(Stage::Publish, &err);
        assert_eq!(
            notice.body(),
            "Something went wrong in uploading to Azure Blob, DLD transaction data. Error is: Blob storage request failed with status 403: AuthenticationFailed"
        );
    }
}
