//! Source formats and content-type handling.
//!
//! The content-type hint that arrives with a photo is untrusted. It is used
//! twice, and only as a hint:
//!
//! 1. As a fast-path gate: anything outside the `image/` family is rejected
//!    before any decode work (collaborators sometimes return an HTML error
//!    page with a 200).
//! 2. To pick the *order* of decode attempts. Every known format is still
//!    tried, so a PNG served as `image/jpeg` decodes fine.
//!
//! Decode failure, not the hint, is the authoritative correctness check.

use std::fmt;

/// A raster format the pipeline knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode order when the hint is JPEG-like, ambiguous, or names an unknown subtype.
pub const JPEG_FIRST: [SourceFormat; 2] = [SourceFormat::Jpeg, SourceFormat::Png];

/// Decode order when the hint names PNG.
pub const PNG_FIRST: [SourceFormat; 2] = [SourceFormat::Png, SourceFormat::Jpeg];

/// Media-type essence of a content-type header value.
///
/// Drops parameters (`; charset=...`), trims whitespace and lowercases, so
/// `" Image/JPEG; q=1"` becomes `"image/jpeg"`.
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Whether the hint belongs to the `image/` family.
///
/// An empty hint is not an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    media_type_essence(content_type).starts_with("image/")
}

/// Ordered list of formats to try for a given content-type hint.
pub fn decode_order(content_type: &str) -> [SourceFormat; 2] {
    let essence = media_type_essence(content_type);
    let subtype = essence.strip_prefix("image/").unwrap_or("");
    match subtype {
        "png" | "x-png" | "apng" => PNG_FIRST,
        _ => JPEG_FIRST,
    }
}
