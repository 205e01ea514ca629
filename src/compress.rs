//! The adaptive compression pipeline.
//!
//! Takes the raw bytes of a photo plus an untrusted content-type hint and
//! produces a JPEG no larger than a hard byte ceiling, or a terminal status
//! explaining why it couldn't.
//!
//! ## Steps
//!
//! ```text
//! hint gate ─✗→ not-image
//!   │
//! decode (hinted format first, then the other) ─✗→ decode-error
//!   │
//! encode at fixed quality ─✗→ encode-error
//!   │
//! fits ceiling? ──yes→ ok
//!   │ no
//! inside bounding box? ──yes→ too-large-after-resize (nothing to shrink)
//!   │ no
//! downscale once (Catmull-Rom) + encode ─✗→ resize-encode-error
//!   │
//! fits ceiling? ──yes→ ok
//!   │ no
//!   └→ too-large-after-resize
//! ```
//!
//! At most two encodes and one resize per call. There is deliberately no
//! quality-reduction loop: a photo that is still too big after one
//! downscale is rejected, and the caller moves on.
//!
//! ## Purity
//!
//! No I/O, no logging, no shared state. Identical bytes, hint and config
//! always produce byte-identical output and the same status, so callers may
//! run any number of invocations in parallel and never need to retry one.
//! Dumping undecodable input is the caller's job, driven by the returned
//! status (see [`crate::batch`]).

use crate::config::CompressionConfig;
use crate::imaging::{
    Dimensions, ImageBackend, RustBackend, decode_order, decode_with_fallback,
    is_image_content_type, plan_downscale,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionStatus {
    /// Output fits the ceiling.
    Ok,
    /// Content-type hint outside the `image/` family. Nothing was decoded.
    NotImage,
    /// No known decoder accepted the bytes.
    DecodeError,
    /// The first-pass encode failed.
    EncodeError,
    /// The downscale or the encode after it failed.
    ResizeEncodeError,
    /// Over the ceiling after the single permitted downscale, or over the
    /// ceiling with nothing to downscale.
    TooLargeAfterResize,
}

impl CompressionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionStatus::Ok => "ok",
            CompressionStatus::NotImage => "not-image",
            CompressionStatus::DecodeError => "decode-error",
            CompressionStatus::EncodeError => "encode-error",
            CompressionStatus::ResizeEncodeError => "resize-encode-error",
            CompressionStatus::TooLargeAfterResize => "too-large-after-resize",
        }
    }

    pub fn is_ok(self) -> bool {
        self == CompressionStatus::Ok
    }
}

impl fmt::Display for CompressionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`compress`].
///
/// `status` is [`CompressionStatus::Ok`] exactly when `bytes` is non-empty
/// and `compressed_size` is within the configured ceiling. On every other
/// status `bytes` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    /// The compressed JPEG. Empty unless `status` is `Ok`.
    pub bytes: Vec<u8>,
    /// Byte length of the input.
    pub original_size: usize,
    /// Byte length of the last encode attempted; 0 if none ran.
    pub compressed_size: usize,
    pub status: CompressionStatus,
    /// Dimensions of the raster `bytes` was encoded from (`Ok` only).
    pub output_dimensions: Option<Dimensions>,
    /// Codec error message behind a failure status, for logs.
    pub detail: Option<String>,
}

impl EncodedResult {
    fn accepted(original_size: usize, bytes: Vec<u8>, dims: Dimensions) -> Self {
        Self {
            compressed_size: bytes.len(),
            bytes,
            original_size,
            status: CompressionStatus::Ok,
            output_dimensions: Some(dims),
            detail: None,
        }
    }

    fn rejected(original_size: usize, compressed_size: usize, status: CompressionStatus) -> Self {
        Self {
            bytes: Vec::new(),
            original_size,
            compressed_size,
            status,
            output_dimensions: None,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok() && !self.bytes.is_empty()
    }
}

/// Compress a photo with the production backend.
pub fn compress(raw: &[u8], content_type: &str, config: &CompressionConfig) -> EncodedResult {
    compress_with_backend(&RustBackend::new(), raw, content_type, config)
}

/// Compress a photo using a specific backend (allows testing with mock).
pub fn compress_with_backend<B: ImageBackend>(
    backend: &B,
    raw: &[u8],
    content_type: &str,
    config: &CompressionConfig,
) -> EncodedResult {
    let original_size = raw.len();

    if !is_image_content_type(content_type) {
        return EncodedResult::rejected(original_size, 0, CompressionStatus::NotImage)
            .with_detail(format_args!("content type {content_type:?}"));
    }

    let raster = match decode_with_fallback(backend, raw, &decode_order(content_type)) {
        Ok((raster, _format)) => raster,
        Err(e) => {
            return EncodedResult::rejected(original_size, 0, CompressionStatus::DecodeError)
                .with_detail(e);
        }
    };

    let quality = config.quality();
    let ceiling = config.size_ceiling_bytes;
    let dims = backend.dimensions(&raster);

    let first = match backend.encode(&raster, quality) {
        Ok(bytes) => bytes,
        Err(e) => {
            return EncodedResult::rejected(original_size, 0, CompressionStatus::EncodeError)
                .with_detail(e);
        }
    };
    if first.is_empty() {
        return EncodedResult::rejected(original_size, 0, CompressionStatus::EncodeError)
            .with_detail("encoder produced no output");
    }
    if first.len() <= ceiling {
        return EncodedResult::accepted(original_size, first, dims);
    }

    let Some(params) = plan_downscale(dims, config.bounds()) else {
        return EncodedResult::rejected(
            original_size,
            first.len(),
            CompressionStatus::TooLargeAfterResize,
        )
        .with_detail(format_args!(
            "{}x{} already within {}x{}",
            dims.width, dims.height, config.max_width, config.max_height
        ));
    };

    let second = backend
        .resize(&raster, &params)
        .and_then(|resized| backend.encode(&resized, quality));
    let second = match second {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => {
            return EncodedResult::rejected(
                original_size,
                first.len(),
                CompressionStatus::ResizeEncodeError,
            )
            .with_detail("encoder produced no output");
        }
        Err(e) => {
            return EncodedResult::rejected(
                original_size,
                first.len(),
                CompressionStatus::ResizeEncodeError,
            )
            .with_detail(e);
        }
    };

    if second.len() <= ceiling {
        let resized = Dimensions::new(params.width, params.height);
        return EncodedResult::accepted(original_size, second, resized);
    }

    EncodedResult::rejected(
        original_size,
        second.len(),
        CompressionStatus::TooLargeAfterResize,
    )
}
