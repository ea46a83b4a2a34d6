//! Production codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with content sniffing |
//! | Encode → WebP (lossy, quality 0–100) | `webp::Encoder` (libwebp) |
//! | Atomic write | `tempfile::NamedTempFile` in the output directory, then `persist` |
//!
//! The `image` crate's own WebP encoder only writes lossless files, so
//! encoding goes through libwebp. libwebp accepts 8-bit RGB and RGBA; other
//! color types are converted first, keeping alpha when the source has it.

use super::backend::{BackendError, ImageBackend};
use super::params::Quality;
use image::{DynamicImage, ImageReader};
#[cfg(unix)]
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Backend using the `image` crate for decoding and libwebp for encoding.
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

/// Load and decode an image from disk.
///
/// The format is sniffed from the file contents, so a mislabeled extension
/// still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Convert to a color type libwebp accepts.
fn to_webp_compatible(img: &DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img.clone(),
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Encode to lossy WebP bytes.
fn encode_webp_bytes(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, String> {
    let compatible = to_webp_compatible(img);
    let encoder = webp::Encoder::from_image(&compatible).map_err(|e| e.to_string())?;
    let memory = encoder
        .encode_simple(false, quality.as_f32())
        .map_err(|e| format!("{e:?}"))?;
    Ok(memory.to_vec())
}

/// Create the temp file that will replace `output`.
///
/// A fresh output gets the mode `fs::write` would give it (0666 minus the
/// umask). An existing output keeps its mode.
#[cfg(unix)]
fn temp_file_for(dir: &Path, output: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(output) {
        Ok(existing) => {
            let tmp = NamedTempFile::new_in(dir)?;
            tmp.as_file().set_permissions(existing.permissions())?;
            Ok(tmp)
        }
        Err(_) => tempfile::Builder::new()
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir),
    }
}

#[cfg(not(unix))]
fn temp_file_for(dir: &Path, _output: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Write `bytes` to `output` through a temp file in the same directory.
///
/// The temp file is renamed over `output` only after every byte is written
/// and flushed; on any error it is removed when dropped.
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = temp_file_for(dir, output)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn encode_webp(
        &self,
        img: &DynamicImage,
        output: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        let bytes = encode_webp_bytes(img, quality).map_err(|message| BackendError::Encode {
            path: output.display().to_string(),
            message,
        })?;
        write_atomically(output, &bytes)
    }
}
