//! Property tests for the downscale geometry.

use photo_squeeze::imaging::calculations::calculate_downscale_dimensions;
use proptest::prelude::*;

proptest! {
    #[test]
    fn result_fits_the_bounding_box(
        w in 1u32..20_000,
        h in 1u32..20_000,
        mw in 1u32..2_000,
        mh in 1u32..2_000,
    ) {
        if let Some((nw, nh)) = calculate_downscale_dimensions((w, h), (mw, mh)) {
            prop_assert!(nw >= 1 && nh >= 1);
            prop_assert!(nw <= mw && nh <= mh);
            prop_assert!(nw <= w && nh <= h);
            // One edge is pinned to the box
            prop_assert!(nw == mw || nh == mh);
        }
    }

    #[test]
    fn only_oversized_sources_are_scaled(
        w in 1u32..5_000,
        h in 1u32..5_000,
        mw in 1u32..2_000,
        mh in 1u32..2_000,
    ) {
        let fits = w <= mw && h <= mh;
        prop_assert_eq!(calculate_downscale_dimensions((w, h), (mw, mh)).is_none(), fits);
    }

    #[test]
    fn aspect_ratio_is_kept_within_a_pixel(
        w in 1u32..20_000,
        h in 1u32..20_000,
    ) {
        if let Some((nw, nh)) = calculate_downscale_dimensions((w, h), (400, 600)) {
            // Compare nw/nh with w/h by cross-multiplying; the rounded edge
            // may be off by at most one pixel.
            let expected_h = nw as f64 * h as f64 / w as f64;
            let expected_w = nh as f64 * w as f64 / h as f64;
            let h_ok = nh == 1 || (nh as f64 - expected_h).abs() <= 1.0;
            let w_ok = nw == 1 || (nw as f64 - expected_w).abs() <= 1.0;
            prop_assert!(h_ok || w_ok, "{}x{} -> {}x{}", w, h, nw, nh);
        }
    }
}

#[test]
fn portrait_source_fills_the_box() {
    assert_eq!(
        calculate_downscale_dimensions((1200, 1800), (400, 600)),
        Some((400, 600))
    );
}
