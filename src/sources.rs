//! Fetch and accept collaborators.
//!
//! The batch driver talks to the outside world through two traits:
//!
//! - [`PhotoSource`] returns the raw bytes of a record's photo plus whatever
//!   content type the origin claimed.
//! - [`PhotoSink`] receives the final bytes for a record.
//!
//! The shipped implementations are filesystem-backed ([`DirectorySource`],
//! [`DirectorySink`]) plus a [`DryRunSink`] for reports. Remote stores plug in
//! by implementing the same traits.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Content type used when the origin gives no usable hint.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Unknown record: {0}")]
    UnknownRecord(String),
    #[error("Empty payload")]
    EmptyPayload,
}

/// Raw photo as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPhoto {
    pub bytes: Vec<u8>,
    /// Untrusted; only steers the decode order.
    pub content_type: String,
}

/// Input collaborator: retrieves the photo for a record identifier.
pub trait PhotoSource: Sync {
    fn fetch(&self, id: &str) -> Result<FetchedPhoto, SourceError>;
}

/// Output collaborator: accepts the final bytes for a record identifier.
pub trait PhotoSink: Sync {
    fn accept(&self, id: &str, bytes: &[u8]) -> Result<(), SourceError>;
}

// ============================================================================
// Directory source
// ============================================================================

/// Photos stored as files in one directory, keyed by file stem.
///
/// `content/S1234.jpg` is record `S1234`. Subdirectories and dotfiles are
/// ignored. When two files share a stem the first in name order wins.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    records: BTreeMap<String, PathBuf>,
}

impl DirectorySource {
    /// Index the files directly inside `root`.
    pub fn open(root: &Path) -> Result<Self, SourceError> {
        let mut records = BTreeMap::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.is_empty() || stem.starts_with('.') {
                continue;
            }
            records
                .entry(stem.to_string())
                .or_insert_with(|| path.to_path_buf());
        }

        debug!(root = %root.display(), records = records.len(), "indexed photo directory");
        Ok(Self {
            root: root.to_path_buf(),
            records,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record identifiers in name order.
    pub fn ids(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}

/// Guess a content type from a file extension.
///
/// As trustworthy as an HTTP header: a `.jpg` may well hold a PNG. The
/// pipeline only uses it for decode ordering.
pub fn content_type_for_path(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

impl PhotoSource for DirectorySource {
    fn fetch(&self, id: &str) -> Result<FetchedPhoto, SourceError> {
        let path = self
            .records
            .get(id)
            .ok_or_else(|| SourceError::UnknownRecord(id.to_string()))?;
        let bytes = fs::read(path)?;
        Ok(FetchedPhoto {
            bytes,
            content_type: content_type_for_path(path).to_string(),
        })
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Writes accepted photos to `<dir>/<id>.jpg`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.jpg"))
    }
}

impl PhotoSink for DirectorySink {
    fn accept(&self, id: &str, bytes: &[u8]) -> Result<(), SourceError> {
        if bytes.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(id), bytes)?;
        Ok(())
    }
}

/// Accepts everything and keeps nothing. Used for reports and `--dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl PhotoSink for DryRunSink {
    fn accept(&self, _id: &str, _bytes: &[u8]) -> Result<(), SourceError> {
        Ok(())
    }
}
