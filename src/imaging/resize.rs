//! Size limits applied before encoding.
//!
//! Both limits shrink, never enlarge, and preserve aspect ratio. Target sizes
//! come from [`calculations`](super::calculations); resampling uses Lanczos3.

use super::calculations::{fit_within_area, fit_within_dimension};
use image::DynamicImage;
use image::imageops::FilterType;

/// A resize that was applied: `from` → `to`, both `(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downscale {
    pub from: (u32, u32),
    pub to: (u32, u32),
}

fn resample(img: DynamicImage, target: Option<(u32, u32)>) -> (DynamicImage, Option<Downscale>) {
    match target {
        Some((w, h)) => {
            let from = (img.width(), img.height());
            let resized = img.resize_exact(w, h, FilterType::Lanczos3);
            (resized, Some(Downscale { from, to: (w, h) }))
        }
        None => (img, None),
    }
}

/// Shrink `img` so its larger side is at most `max_dimension`.
///
/// No-op when `max_dimension` is 0 or the image already fits.
pub fn limit_by_dimension(img: DynamicImage, max_dimension: u32) -> (DynamicImage, Option<Downscale>) {
    let target = fit_within_dimension(img.width(), img.height(), max_dimension);
    resample(img, target)
}

/// Shrink `img` so `width × height` is at most `max_pixels`.
pub fn limit_by_area(img: DynamicImage, max_pixels: u64) -> (DynamicImage, Option<Downscale>) {
    let target = fit_within_area(img.width(), img.height(), max_pixels);
    resample(img, target)
}
