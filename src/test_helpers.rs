//! Shared test utilities for the photo-squeeze test suite.
//!
//! Builds synthetic rasters and encodes them to real JPEG/PNG bytes in
//! memory, so pipeline tests never depend on fixture files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! // Smooth content: compresses well, fits the default ceiling
//! let small = rgb_jpeg_bytes(&gradient_rgb(64, 64), 90);
//!
//! // High-entropy content: stays large at any quality
//! let heavy = rgb_jpeg_bytes(&noise_rgb(1200, 1800, 1), 95);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};

// =========================================================================
// Synthetic rasters
// =========================================================================

/// Smooth diagonal gradient. Very compressible.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Deterministic pseudo-random noise (xorshift32). Barely compressible.
pub fn noise_rgb(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    RgbImage::from_fn(width, height, |_, _| {
        let v = next();
        Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    })
}

// =========================================================================
// Encoders
// =========================================================================

/// Encode an RGB raster as JPEG bytes.
pub fn rgb_jpeg_bytes(img: &RgbImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode any raster as PNG bytes (keeps alpha when present).
pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let rgba = img.to_rgba8();
    PngEncoder::new(&mut buf)
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
        .unwrap();
    buf
}
