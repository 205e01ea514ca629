//! # Photo Squeeze
//!
//! Shrinks record photos until they fit under a hard byte ceiling, or says
//! clearly why they can't.
//!
//! # Architecture: One Pass, One Fallback
//!
//! Each photo goes through a short, deterministic pipeline:
//!
//! ```text
//! content-type gate → decode (JPEG/PNG, hint picks the order)
//!     → encode at quality 40 → fits?           → ok
//!     → downscale into 400×600 → encode → fits? → ok
//!                                               → too-large-after-resize
//! ```
//!
//! There is exactly one downscale attempt and quality never changes. The
//! pipeline is a pure function of its inputs: no I/O, no logging, no retries.
//! Everything with side effects lives around it in the batch driver.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`compress`] | The pipeline: statuses, [`EncodedResult`](compress::EncodedResult), `compress` |
//! | [`imaging`] | Decode, resize and JPEG encode behind the [`ImageBackend`](imaging::ImageBackend) trait |
//! | [`batch`] | Runs the pipeline over many records on a rayon pool, collects a JSON-able report |
//! | [`sources`] | Fetch/accept collaborator traits plus directory-backed implementations |
//! | [`diagnostics`] | Raw-byte dumps and hex previews for photos nothing could decode |
//! | [`config`] | `photo-squeeze.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI output formatting: progress lines, summary, large-photo CSV |
//!
//! # Design Decisions
//!
//! ## The Content Type Is a Hint
//!
//! Upstream stores lie about content types. A `.jpg` holding a PNG is common,
//! and so is an HTML error page served with `200 OK`. The content type is used
//! twice: anything outside `image/*` is rejected before any decode work, and
//! inside `image/*` it only picks which decoder runs first. The bytes decide.
//!
//! ## Fixed Quality, Single Downscale
//!
//! Searching over quality levels or shrinking repeatedly would squeeze more
//! photos under the ceiling, but makes the output unpredictable and slow. A
//! photo that misses after one downscale is reported as
//! `too-large-after-resize` for a human to look at.
//!
//! ## Testable Backend
//!
//! Pixel work goes through [`imaging::ImageBackend`]. Production uses the
//! pure-Rust [`imaging::RustBackend`] (`image` crate, Catmull-Rom resampling);
//! tests script encoded sizes with a recording mock and assert on the exact
//! sequence of decode, resize and encode calls.
//!
//! ## Failures Stay Local
//!
//! A bad record never aborts a batch. Every record produces one report entry
//! with its status, sizes and (for decode failures) the path of the dumped
//! bytes.

pub mod batch;
pub mod compress;
pub mod config;
pub mod diagnostics;
pub mod imaging;
pub mod output;
pub mod sources;

#[cfg(test)]
pub(crate) mod test_helpers;
