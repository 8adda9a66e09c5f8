// 📋 Run report - what a load run did, per table
//
// Serialized as JSON when requested and always summarised in the log.

use crate::db::WritePath;
use crate::entities::EntityKind;
use crate::optimizer::OptimizeStats;
use crate::registry::IdDomain;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum TableStatus {
    Loaded,
    SkippedExcluded,
    SkippedMissing,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub kind: EntityKind,
    pub table: &'static str,
    #[serde(flatten)]
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<&'static str>,
    pub rows_written: u64,
    pub rows_rejected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl TableOutcome {
    pub fn new(kind: EntityKind, status: TableStatus) -> Self {
        TableOutcome {
            kind,
            table: kind.table_name(),
            status,
            source: None,
            encoding: None,
            rows_written: 0,
            rows_rejected: 0,
            sha256: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub source_dir: PathBuf,
    pub backend: &'static str,
    pub write_path: WritePath,
    pub tables: Vec<TableOutcome>,
    /// Distinct natural keys seen per identifier domain
    pub identifiers: Vec<(IdDomain, usize)>,
    pub optimized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizeStats>,
}

impl LoadReport {
    pub fn start(source_dir: &Path, backend: &'static str, write_path: WritePath) -> Self {
        LoadReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            source_dir: source_dir.to_path_buf(),
            backend,
            write_path,
            tables: Vec::new(),
            identifiers: Vec::new(),
            optimized: false,
            optimizer: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn outcome(&self, kind: EntityKind) -> Option<&TableOutcome> {
        self.tables.iter().find(|t| t.kind == kind)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    pub fn failures(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| matches!(t.status, TableStatus::Failed(_)))
            .count()
    }

    /// SHA-256 over the per-file digests of every file read, in load order
    pub fn feed_fingerprint(&self) -> Option<String> {
        let mut hasher = Sha256::new();
        let mut any = false;
        for digest in self.tables.iter().filter_map(|t| t.sha256.as_deref()) {
            hasher.update(digest.as_bytes());
            any = true;
        }
        any.then(|| format!("{:x}", hasher.finalize()))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct Document<'a> {
            #[serde(flatten)]
            report: &'a LoadReport,
            feed_sha256: Option<String>,
            total_rows: u64,
        }

        let doc = Document {
            report: self,
            feed_sha256: self.feed_fingerprint(),
            total_rows: self.total_rows(),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        info!(path = %path.display(), "Report written");
        Ok(())
    }

    pub fn log_summary(&self) {
        for table in &self.tables {
            match &table.status {
                TableStatus::Loaded => info!(
                    table = table.table,
                    rows = table.rows_written,
                    rejected = table.rows_rejected,
                    "Loaded"
                ),
                TableStatus::Failed(reason) => warn!(table = table.table, %reason, "Failed"),
                _ => {}
            }
        }

        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or_default();

        info!(
            run_id = %self.run_id,
            backend = self.backend,
            rows = self.total_rows(),
            failures = self.failures(),
            elapsed_ms = elapsed,
            "Load finished"
        );
    }
}
