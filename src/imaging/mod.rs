//! Image processing: pure Rust, in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` JPEG/PNG decoders, ordered by content-type hint |
//! | **Downscale** | `resize_exact` + Catmull-Rom |
//! | **Encode** | `image` JPEG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Format**: Content-type gate and decode ordering
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Decode fallback and downscale planning on top of a backend

pub mod backend;
pub mod calculations;
pub mod format;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use format::{SourceFormat, decode_order, is_image_content_type};
pub use operations::{decode_with_fallback, plan_downscale};
pub use params::{BoundingBox, Quality, ResizeParams};
pub use rust_backend::RustBackend;
