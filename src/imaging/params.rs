//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the pipeline (which decides whether to re-encode or
//! downscale) and the [`backend`](super::backend) (which does the actual
//! pixel work). The split is what lets the pipeline run against a recording
//! mock in tests.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 40). Clamped on construction.
//! - [`BoundingBox`]: Maximum width/height a downscale must fit inside.
//! - [`ResizeParams`]: Target dimensions for a single resample.

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(40)
    }
}

/// Maximum output dimensions for the downscale fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// True if a `width`×`height` raster already fits without scaling.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(400, 600)
    }
}

/// Parameters for a resample to exact dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}
