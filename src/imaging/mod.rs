//! Image operations.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Trim border** | pixel scan against the top-left color |
//! | **Resize** | `DynamicImage::resize_exact` with `Lanczos3` |
//! | **Encode → WebP** | `webp` (libwebp), lossy |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`Quality`] and [`BoundingBox`]
//! - **Trim / Resize**: in-memory transforms on `DynamicImage`
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod resize;
pub mod rust_backend;
pub mod trim;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{fit_within_area, fit_within_dimension};
pub use params::{BoundingBox, Quality};
pub use resize::{Downscale, limit_by_area, limit_by_dimension};
pub use rust_backend::RustBackend;
pub use trim::{find_content_bounds, trim_whitespace};
