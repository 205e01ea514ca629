//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four primitives the compression
//! pipeline is built from: decode, measure, resize and encode. Everything is
//! in memory. A backend never touches the filesystem or the network.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock with scripted encode sizes, so the
//! pipeline's branch logic can be exercised without real codecs.

use super::format::SourceFormat;
use super::params::{Quality, ResizeParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Width and height of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Trait for image processing backends.
///
/// The raster type is backend-defined and never leaves a single pipeline
/// invocation. Implementations must be deterministic: the same input bytes
/// and parameters always produce the same output bytes.
pub trait ImageBackend: Sync {
    /// Decoded in-memory pixel grid.
    type Raster;

    /// Decode `bytes` as exactly `format`. No sniffing, no fallback.
    fn decode(&self, bytes: &[u8], format: SourceFormat) -> Result<Self::Raster, BackendError>;

    /// Dimensions of a decoded raster.
    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Resample to exact dimensions with a smooth (non nearest-neighbor) kernel.
    fn resize(&self, raster: &Self::Raster, params: &ResizeParams)
    -> Result<Self::Raster, BackendError>;

    /// Encode as baseline JPEG at the given quality.
    fn encode(&self, raster: &Self::Raster, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
