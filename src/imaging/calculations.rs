//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images. Each
//! returns `None` when the image is already within its bound, so callers can
//! skip resampling entirely.

/// Target size when the larger side exceeds `max_dimension`.
///
/// Both sides are multiplied by `max_dimension / max(width, height)` and
/// floored, so the larger side lands exactly on the bound. A bound of 0
/// disables the check. Neither side drops below 1px.
///
/// ```text
/// 4000×3000, bound 2000  →  2000×1500
/// 1200×800,  bound 2000  →  None
/// ```
pub fn fit_within_dimension(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if max_dimension == 0 {
        return None;
    }
    let largest = width.max(height);
    if largest <= max_dimension {
        return None;
    }
    let factor = f64::from(max_dimension) / f64::from(largest);
    let (w, h) = scale(width, height, factor);
    // The larger side is pinned to the bound so float error cannot floor it
    // to bound - 1.
    if width >= height {
        Some((max_dimension, h))
    } else {
        Some((w, max_dimension))
    }
}

/// Target size when `width × height` exceeds `max_pixels`.
///
/// Both sides are multiplied by `sqrt(max_pixels / area)` and floored, which
/// keeps the aspect ratio and lands the area at or just under the bound.
///
/// For extreme aspect ratios the short side is held at 1px; the long side is
/// then cut to `max_pixels` so the area still fits.
///
/// ```text
/// 8000×8000,    bound 16_000_000  →  4000×4000
/// 3_000_000×1,  bound 1_000_000   →  1_000_000×1
/// ```
pub fn fit_within_area(width: u32, height: u32, max_pixels: u64) -> Option<(u32, u32)> {
    let total = u64::from(width) * u64::from(height);
    if total <= max_pixels {
        return None;
    }
    let factor = (max_pixels as f64 / total as f64).sqrt();
    let (w, h) = scale(width, height, factor);
    let w = w.min(side_limit(max_pixels, h));
    let h = h.min(side_limit(max_pixels, w));
    Some((w, h))
}

/// Longest side that keeps `side × other <= max_pixels`, never below 1px.
fn side_limit(max_pixels: u64, other: u32) -> u32 {
    let limit = max_pixels / u64::from(other.max(1));
    u32::try_from(limit).unwrap_or(u32::MAX).max(1)
}

fn scale(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = (f64::from(width) * factor).floor() as u32;
    let h = (f64::from(height) * factor).floor() as u32;
    (w.max(1), h.max(1))
}
