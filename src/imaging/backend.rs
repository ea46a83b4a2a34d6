//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations that touch a codec:
//! decoding a file into a pixel buffer and encoding a buffer to WEBP at a
//! path. Trimming and resizing are pure pixel operations on
//! [`DynamicImage`] and live outside the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::Quality;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
}

/// Trait for image codec backends.
///
/// `Sync` so one backend can be shared by every rayon worker.
pub trait ImageBackend: Sync {
    /// Decode the image file at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `img` as lossy WEBP and write it to `output`.
    ///
    /// Implementations must leave either the complete file or no file at
    /// `output`; a failed encode never leaves a partial output behind.
    fn encode_webp(
        &self,
        img: &DynamicImage,
        output: &Path,
        quality: Quality,
    ) -> Result<(), BackendError>;
}
