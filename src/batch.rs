//! Batch driver: runs the compression pipeline over many records.
//!
//! For each record identifier the driver fetches the photo from a
//! [`PhotoSource`], runs [`compress`](crate::compress::compress_with_backend),
//! and hands accepted bytes to a [`PhotoSink`]. Every record ends up as one
//! [`ItemReport`] in the returned [`BatchReport`].
//!
//! ## Failure isolation
//!
//! A failed record never aborts the batch. Fetch errors, non-`ok` pipeline
//! statuses and sink errors are all logged with the record identifier and
//! recorded in the report; the driver moves on to the next record. Nothing is
//! retried: the pipeline is deterministic, so a retry only makes sense after a
//! fresh fetch, which is a new batch.
//!
//! ## Parallel Processing
//!
//! Records are processed on a dedicated [rayon](https://docs.rs/rayon) pool
//! sized by [`effective_threads`]. Results are keyed by identifier; no
//! ordering between records is promised to event listeners.
//!
//! ## Diagnostics
//!
//! On `decode-error`, when `diagnostics.dump_undecodable` is set, the raw
//! bytes are written next to the other failures for offline inspection (see
//! [`crate::diagnostics`]).

use crate::compress::{CompressionStatus, EncodedResult, compress_with_backend};
use crate::config::{Config, effective_threads};
use crate::diagnostics::{dump_undecodable, hex_preview};
use crate::imaging::{ImageBackend, RustBackend};
use crate::sources::{PhotoSink, PhotoSource};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ItemOutcome {
    /// Compressed under the ceiling and taken by the sink.
    Accepted,
    /// The pipeline returned a non-`ok` status.
    Skipped { status: CompressionStatus },
    /// The source returned an error or an empty payload.
    FetchFailed { error: String },
    /// Compression succeeded but the sink refused the bytes.
    AcceptFailed { error: String },
}

/// Per-record entry of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub id: String,
    pub original_size: usize,
    pub compressed_size: usize,
    /// SHA-256 of the fetched bytes; lets a rerun spot unchanged sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
    /// Where the undecodable bytes were dumped, if they were.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl ItemReport {
    fn fetch_failed(id: &str, error: String) -> Self {
        Self {
            id: id.to_string(),
            original_size: 0,
            compressed_size: 0,
            source_hash: None,
            outcome: ItemOutcome::FetchFailed { error },
            artifact: None,
        }
    }

    /// Short status label: the pipeline status, or the collaborator failure.
    pub fn label(&self) -> &'static str {
        match &self.outcome {
            ItemOutcome::Accepted => CompressionStatus::Ok.as_str(),
            ItemOutcome::Skipped { status } => status.as_str(),
            ItemOutcome::FetchFailed { .. } => "fetch-failed",
            ItemOutcome::AcceptFailed { .. } => "accept-failed",
        }
    }
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize, threads: usize },
    ItemFinished(ItemReport),
}

/// Result of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn accepted(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Accepted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped { .. }))
    }

    pub fn fetch_failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::FetchFailed { .. }))
    }

    pub fn accept_failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::AcceptFailed { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    /// Number of records per [`ItemReport::label`], sorted by label.
    pub fn counts_by_label(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn find(&self, id: &str) -> Option<&ItemReport> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), BatchError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Run a batch with the production image backend.
pub fn run_batch(
    ids: &[String],
    source: &impl PhotoSource,
    sink: &impl PhotoSink,
    config: &Config,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    run_batch_with_backend(&RustBackend::new(), ids, source, sink, config, events)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_batch_with_backend<B: ImageBackend>(
    backend: &B,
    ids: &[String],
    source: &impl PhotoSource,
    sink: &impl PhotoSink,
    config: &Config,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let threads = effective_threads(&config.processing);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    info!(records = ids.len(), threads, "starting batch");
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            total: ids.len(),
            threads,
        })
        .ok();
    }

    let items: Vec<ItemReport> = pool.install(|| {
        ids.par_iter()
            .map(|id| {
                let report = process_record(backend, id, source, sink, config);
                if let Some(tx) = &events {
                    tx.send(BatchEvent::ItemFinished(report.clone())).ok();
                }
                report
            })
            .collect()
    });

    let report = BatchReport { items };
    info!(
        total = report.total(),
        accepted = report.accepted(),
        skipped = report.skipped(),
        fetch_failed = report.fetch_failed(),
        accept_failed = report.accept_failed(),
        "batch finished"
    );
    Ok(report)
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Fetch, compress and hand off one record. Never fails: every error becomes
/// part of the returned report.
fn process_record<B: ImageBackend>(
    backend: &B,
    id: &str,
    source: &impl PhotoSource,
    sink: &impl PhotoSink,
    config: &Config,
) -> ItemReport {
    let photo = match source.fetch(id) {
        Ok(photo) if photo.bytes.is_empty() => {
            warn!(id, "fetch returned an empty payload");
            return ItemReport::fetch_failed(id, "empty payload".to_string());
        }
        Ok(photo) => photo,
        Err(e) => {
            warn!(id, error = %e, "fetch failed");
            return ItemReport::fetch_failed(id, e.to_string());
        }
    };

    let result = compress_with_backend(
        backend,
        &photo.bytes,
        &photo.content_type,
        &config.compression,
    );
    let mut report = ItemReport {
        id: id.to_string(),
        original_size: result.original_size,
        compressed_size: result.compressed_size,
        source_hash: Some(sha256_hex(&photo.bytes)),
        outcome: ItemOutcome::Skipped {
            status: result.status,
        },
        artifact: None,
    };

    match result.status {
        CompressionStatus::Ok => {
            report.outcome = hand_off(id, &result, sink);
        }
        CompressionStatus::DecodeError => {
            warn!(
                id,
                content_type = %photo.content_type,
                first_bytes = %hex_preview(&photo.bytes),
                detail = result.detail.as_deref().unwrap_or(""),
                "decode failed, skipping"
            );
            if config.diagnostics.dump_undecodable {
                match dump_undecodable(&config.diagnostics.dump_dir, id, &photo.bytes) {
                    Ok(path) => {
                        debug!(id, path = %path.display(), "dumped undecodable bytes");
                        report.artifact = Some(path);
                    }
                    Err(e) => warn!(id, error = %e, "could not dump undecodable bytes"),
                }
            }
        }
        status => {
            warn!(
                id,
                %status,
                original_size = result.original_size,
                compressed_size = result.compressed_size,
                detail = result.detail.as_deref().unwrap_or(""),
                "skipping"
            );
        }
    }

    report
}

fn hand_off(id: &str, result: &EncodedResult, sink: &impl PhotoSink) -> ItemOutcome {
    match sink.accept(id, &result.bytes) {
        Ok(()) => {
            debug!(
                id,
                original_size = result.original_size,
                compressed_size = result.compressed_size,
                "accepted"
            );
            ItemOutcome::Accepted
        }
        Err(e) => {
            warn!(id, error = %e, "sink rejected photo");
            ItemOutcome::AcceptFailed {
                error: e.to_string(),
            }
        }
    }
}
