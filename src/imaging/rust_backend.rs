//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::load_from_memory_with_format` |
//! | Resize | `image::DynamicImage::resize_exact` with `CatmullRom` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (8-bit RGB or grayscale) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::format::SourceFormat;
use super::params::{Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

/// Resampling kernel for the downscale fallback.
///
/// Catmull-Rom is a smooth cubic: visibly sharper than bilinear at a 1/3
/// reduction without Lanczos3's ringing on hard portrait edges.
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Png => ImageFormat::Png,
    }
}

/// Encode a raster as JPEG into memory.
///
/// Grayscale rasters stay single-channel; everything else is flattened to
/// 8-bit RGB. Alpha is dropped; JPEG has no alpha channel.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);

    let result = if img.color().has_color() {
        let rgb = img.to_rgb8();
        encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
    } else {
        let luma = img.to_luma8();
        encoder.write_image(luma.as_raw(), luma.width(), luma.height(), ExtendedColorType::L8)
    };

    result.map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    type Raster = DynamicImage;

    fn decode(&self, bytes: &[u8], format: SourceFormat) -> Result<DynamicImage, BackendError> {
        if bytes.is_empty() {
            return Err(BackendError::Decode(format!("empty input as {format}")));
        }
        let img = image::load_from_memory_with_format(bytes, image_format(format))
            .map_err(|e| BackendError::Decode(format!("as {format}: {e}")))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(BackendError::Decode(format!("as {format}: zero-sized raster")));
        }
        Ok(img)
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions::new(raster.width(), raster.height())
    }

    fn resize(
        &self,
        raster: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid resize target {}x{}",
                params.width, params.height
            )));
        }
        Ok(raster.resize_exact(params.width, params.height, RESIZE_FILTER))
    }

    fn encode(&self, raster: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        // Quality is clamped to 1..=100 on construction
        encode_jpeg(raster, quality.value() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, noise_rgb, png_bytes, rgb_jpeg_bytes};
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn decode_synthetic_jpeg() {
        let bytes = rgb_jpeg_bytes(&gradient_rgb(200, 150), 90);
        let backend = RustBackend::new();

        let img = backend.decode(&bytes, SourceFormat::Jpeg).unwrap();
        assert_eq!(backend.dimensions(&img), Dimensions::new(200, 150));
    }

    #[test]
    fn decode_synthetic_png() {
        let bytes = png_bytes(&DynamicImage::ImageRgb8(gradient_rgb(64, 48)));
        let backend = RustBackend::new();

        let img = backend.decode(&bytes, SourceFormat::Png).unwrap();
        assert_eq!(backend.dimensions(&img), Dimensions::new(64, 48));
    }

    #[test]
    fn decode_with_wrong_format_errors() {
        let bytes = png_bytes(&DynamicImage::ImageRgb8(gradient_rgb(16, 16)));
        let backend = RustBackend::new();

        let result = backend.decode(&bytes, SourceFormat::Jpeg);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_empty_input_errors() {
        let backend = RustBackend::new();
        assert!(backend.decode(&[], SourceFormat::Jpeg).is_err());
        assert!(backend.decode(&[], SourceFormat::Png).is_err());
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        let garbage = b"<html><body>502 Bad Gateway</body></html>";
        assert!(backend.decode(garbage, SourceFormat::Jpeg).is_err());
        assert!(backend.decode(garbage, SourceFormat::Png).is_err());
    }

    #[test]
    fn encode_produces_decodable_jpeg() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgb8(gradient_rgb(120, 80));

        let bytes = backend.encode(&img, Quality::new(40)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
    }

    #[test]
    fn encode_lower_quality_is_smaller() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgb8(noise_rgb(128, 128, 7));

        let high = backend.encode(&img, Quality::new(95)).unwrap();
        let low = backend.encode(&img, Quality::new(20)).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn encode_is_deterministic() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgb8(noise_rgb(96, 64, 3));

        let a = backend.encode(&img, Quality::new(40)).unwrap();
        let b = backend.encode(&img, Quality::new(40)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn encode_drops_alpha() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([10, 200, 30, 0])));

        let bytes = backend.encode(&img, Quality::new(40)).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert!(decoded.color().has_color());
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn encode_keeps_grayscale_single_channel() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 30, |x, _| Luma([(x * 6) as u8])));

        let bytes = backend.encode(&img, Quality::new(40)).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert!(!decoded.color().has_color());
    }

    #[test]
    fn resize_to_exact_dimensions() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgb8(gradient_rgb(1200, 1800));

        let resized = backend
            .resize(
                &img,
                &ResizeParams {
                    width: 400,
                    height: 600,
                },
            )
            .unwrap();
        assert_eq!(backend.dimensions(&resized), Dimensions::new(400, 600));
    }

    #[test]
    fn resize_rejects_zero_target() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgb8(gradient_rgb(10, 10));

        let result = backend.resize(
            &img,
            &ResizeParams {
                width: 0,
                height: 5,
            },
        );
        assert!(result.is_err());
    }
}
