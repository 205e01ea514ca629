//! High-level image operations.
//!
//! These functions combine calculations with backend execution. The
//! compression pipeline is assembled from them.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_downscale_dimensions;
use super::format::SourceFormat;
use super::params::{BoundingBox, ResizeParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Decode `bytes` by trying each format in `order` until one succeeds.
///
/// Returns the raster and the format that decoded it. When every attempt
/// fails, the error lists each format with its own failure message.
pub fn decode_with_fallback<B: ImageBackend>(
    backend: &B,
    bytes: &[u8],
    order: &[SourceFormat],
) -> Result<(B::Raster, SourceFormat)> {
    let mut failures = Vec::with_capacity(order.len());

    for &format in order {
        match backend.decode(bytes, format) {
            Ok(raster) => return Ok((raster, format)),
            Err(e) => failures.push(format!("{format}: {e}")),
        }
    }

    if failures.is_empty() {
        return Err(BackendError::Decode("no decoders to try".into()));
    }
    Err(BackendError::Decode(failures.join("; ")))
}

/// Plan the downscale for a raster that encoded too large.
///
/// Returns `None` when the raster already fits the bounding box; there is
/// no valid downscale and the caller must fail rather than retry.
pub fn plan_downscale(dims: Dimensions, bounds: BoundingBox) -> Option<ResizeParams> {
    calculate_downscale_dimensions(
        (dims.width, dims.height),
        (bounds.max_width, bounds.max_height),
    )
    .map(|(width, height)| ResizeParams { width, height })
}
