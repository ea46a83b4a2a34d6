//! Uniform border ("whitespace") trimming.
//!
//! This is a heuristic, not exact background detection:
//!
//! 1. The pixel at (0, 0) is taken as the background color.
//! 2. Every pixel is compared to it channel by channel (absolute difference).
//! 3. The difference is amplified as `2·d − 100`, clamped to `0..=255`, so
//!    channels within 50 levels of the background count as background. Faint
//!    anti-aliasing and compression noise along edges do not block a trim.
//! 4. The bounding box of all pixels with any non-zero amplified channel is
//!    the content. The image is cropped to it.
//!
//! Uniform images and images whose every pixel is close to the corner color
//! have no content box and are returned unchanged. A border in a color that
//! differs from the top-left pixel is not detected.

use super::params::BoundingBox;
use image::{DynamicImage, GenericImageView, Rgba};

const AMPLIFY_SCALE: i32 = 2;
const AMPLIFY_OFFSET: i32 = 100;

/// Amplified per-channel difference, clamped to the valid 8-bit range.
fn amplified_difference(a: u8, b: u8) -> u8 {
    let diff = (i32::from(a) - i32::from(b)).abs();
    (diff * AMPLIFY_SCALE - AMPLIFY_OFFSET).clamp(0, 255) as u8
}

fn differs_from(pixel: &Rgba<u8>, background: &Rgba<u8>) -> bool {
    pixel
        .0
        .iter()
        .zip(background.0.iter())
        .any(|(&p, &b)| amplified_difference(p, b) > 0)
}

/// Bounding box of everything that is not background, or `None` when the
/// whole image is background (or has no pixels).
pub fn find_content_bounds(img: &DynamicImage) -> Option<BoundingBox> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let background = img.get_pixel(0, 0);

    let mut bounds: Option<BoundingBox> = None;
    for (x, y, pixel) in img.pixels() {
        if !differs_from(&pixel, &background) {
            continue;
        }
        bounds = Some(match bounds {
            None => BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => BoundingBox {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }
    bounds.filter(|b| !b.is_empty())
}

/// Crop a uniform border from `img`.
///
/// Returns the (possibly) cropped image and the box it was cropped to. The
/// box is `None` when nothing was removed, either because the image has no
/// content box or because the content already touches every edge.
pub fn trim_whitespace(img: DynamicImage) -> (DynamicImage, Option<BoundingBox>) {
    let (width, height) = img.dimensions();
    match find_content_bounds(&img) {
        Some(bbox) if !bbox.covers(width, height) => {
            let cropped = img.crop_imm(bbox.left, bbox.top, bbox.width(), bbox.height());
            (cropped, Some(bbox))
        }
        _ => (img, None),
    }
}
