//! CLI output formatting for batch runs.
//!
//! # Record-First Display
//!
//! Every line block leads with the record identifier and its status label,
//! with sizes and failure details shown as indented context. Records finish
//! out of order on the worker pool, so the identifier is the only stable
//! handle a reader has.
//!
//! # Output Format
//!
//! ## Progress
//!
//! ```text
//! Compressing 3 records on 4 threads
//! S1001 ok
//!     Size: 1843.2 KiB → 31.7 KiB
//! S1002 decode-error
//!     Size: 12.0 KiB
//!     Artifact: failed-photos/failed_photo_S1002.bin
//! S1003 fetch-failed
//!     Error: Unknown record: S1003
//! ```
//!
//! ## Summary
//!
//! ```text
//! Processed 3 records
//!     ok: 1
//!     decode-error: 1
//!     fetch-failed: 1
//! ```
//!
//! ## Size report
//!
//! ```text
//! id,original_kb,compressed_kb,status
//! S1001,1843.2,31.7,ok
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport, ItemOutcome, ItemReport};

/// CSV header of [`format_size_report`].
pub const SIZE_REPORT_HEADER: &str = "id,original_kb,compressed_kb,status";

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bytes as KiB with one decimal.
fn format_kib(bytes: usize) -> String {
    format!("{:.1}", bytes as f64 / 1024.0)
}

/// Quote a CSV field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Format one finished record as display lines.
pub fn format_item_event(item: &ItemReport) -> Vec<String> {
    let mut lines = vec![format!("{} {}", item.id, item.label())];
    let ctx = indent(1);

    match &item.outcome {
        ItemOutcome::FetchFailed { error } => {
            lines.push(format!("{ctx}Error: {error}"));
        }
        ItemOutcome::AcceptFailed { error } => {
            lines.push(size_line(item));
            lines.push(format!("{ctx}Error: {error}"));
        }
        ItemOutcome::Accepted | ItemOutcome::Skipped { .. } => {
            lines.push(size_line(item));
        }
    }

    if let Some(artifact) = &item.artifact {
        lines.push(format!("{ctx}Artifact: {}", artifact.display()));
    }
    lines
}

fn size_line(item: &ItemReport) -> String {
    if item.compressed_size == 0 {
        format!("{}Size: {} KiB", indent(1), format_kib(item.original_size))
    } else {
        format!(
            "{}Size: {} KiB → {} KiB",
            indent(1),
            format_kib(item.original_size),
            format_kib(item.compressed_size)
        )
    }
}

/// Format a batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, threads } => {
            vec![format!(
                "Compressing {} records on {} threads",
                total, threads
            )]
        }
        BatchEvent::ItemFinished(item) => format_item_event(item),
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format end-of-batch counts, one line per status label.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!("Processed {} records", report.total())];
    for (label, count) in report.counts_by_label() {
        lines.push(format!("{}{}: {}", indent(1), label, count));
    }
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Size report
// ============================================================================

/// Format the large-photo CSV: records whose original is at least
/// `threshold_bytes`, sorted by identifier.
///
/// Fetch failures have no size and never appear.
pub fn format_size_report(report: &BatchReport, threshold_bytes: usize) -> Vec<String> {
    let mut large: Vec<&ItemReport> = report
        .items
        .iter()
        .filter(|i| !matches!(i.outcome, ItemOutcome::FetchFailed { .. }))
        .filter(|i| i.original_size >= threshold_bytes)
        .collect();
    large.sort_by(|a, b| a.id.cmp(&b.id));

    let mut lines = vec![SIZE_REPORT_HEADER.to_string()];
    lines.extend(large.into_iter().map(|item| {
        format!(
            "{},{},{},{}",
            csv_field(&item.id),
            format_kib(item.original_size),
            format_kib(item.compressed_size),
            item.label()
        )
    }));
    lines
}

pub fn print_size_report(report: &BatchReport, threshold_bytes: usize) {
    for line in format_size_report(report, threshold_bytes) {
        println!("{}", line);
    }
}
