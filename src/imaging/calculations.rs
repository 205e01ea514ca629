//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of a uniform downscale into a bounding box.
///
/// The scale factor is `min(max_w / w, max_h / h)`. It never exceeds 1: an
/// image that already fits returns `None`, because there is no valid
/// downscale for it. Each resulting edge is `floor(edge · factor)`, clamped to
/// at least 1.
///
/// The comparison and the products are done in integer arithmetic so the
/// binding edge lands exactly on its bound (1200×1800 into 400×600 gives
/// 400×600, not 399×600).
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box as (max_width, max_height)
///
/// # Returns
/// * `Some((width, height))` - Downscaled dimensions, both within bounds
/// * `None` - The source already fits (or is degenerate)
///
/// # Examples
/// ```
/// # use photo_squeeze::imaging::calculations::calculate_downscale_dimensions;
/// assert_eq!(calculate_downscale_dimensions((1200, 1800), (400, 600)), Some((400, 600)));
/// assert_eq!(calculate_downscale_dimensions((300, 500), (400, 600)), None);
/// ```
pub fn calculate_downscale_dimensions(source: (u32, u32), bounds: (u32, u32)) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return None;
    }
    if src_w <= max_w && src_h <= max_h {
        return None;
    }

    let (w, h) = (u64::from(src_w), u64::from(src_h));
    let (mw, mh) = (u64::from(max_w), u64::from(max_h));

    // max_w / w <= max_h / h, cross-multiplied
    let (new_w, new_h) = if mw * h <= mh * w {
        // Width is the binding edge
        (mw, h * mw / w)
    } else {
        // Height is the binding edge
        (w * mh / h, mh)
    };

    Some((clamp_edge(new_w), clamp_edge(new_h)))
}

fn clamp_edge(edge: u64) -> u32 {
    // Never larger than the source edge it came from, so it fits in u32.
    u32::try_from(edge.max(1)).unwrap_or(u32::MAX)
}
