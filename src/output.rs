//! CLI output formatting.
//!
//! Every progress line carries the `[i of total]` prefix of its task, since
//! parallel workers interleave their output:
//!
//! ```text
//! [2 of 5] Processing image: photo.jpg
//! [2 of 5] Found whitespace, trimmed to 3012x2008
//! [2 of 5] Over the 2000px dimension limit, scaled 3012x2008 → 2000x1333
//! [2 of 5] Within the 64 MP area limit
//! [2 of 5] Saving as photo.webp
//! [2 of 5] Removing original
//! ```
//!
//! Format functions are pure (no I/O, no side effects) and return lines
//! for testability; `print_*` wrappers write them to stdout.

use crate::batch::BatchSummary;
use crate::imaging::Downscale;
use crate::pipeline::{EventKind, ProcessEvent};

fn prefix(index: usize, total: usize) -> String {
    format!("[{} of {}]", index, total)
}

fn size(dims: (u32, u32)) -> String {
    format!("{}x{}", dims.0, dims.1)
}

fn scaled(d: &Downscale) -> String {
    format!("scaled {} → {}", size(d.from), size(d.to))
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    let text = match &event.kind {
        EventKind::Started { filename } => format!("Processing image: {}", filename),
        EventKind::TrimChecked { cropped: Some(b) } => {
            format!("Found whitespace, trimmed to {}", size((b.width(), b.height())))
        }
        EventKind::TrimChecked { cropped: None } => "No whitespace to trim".to_string(),
        EventKind::DimensionChecked {
            limit,
            resized: Some(d),
        } => format!("Over the {}px dimension limit, {}", limit, scaled(d)),
        EventKind::DimensionChecked {
            limit,
            resized: None,
        } => format!("Within the {}px dimension limit", limit),
        EventKind::AreaChecked {
            limit_mp,
            resized: Some(d),
        } => format!("Over the {} MP area limit, {}", limit_mp, scaled(d)),
        EventKind::AreaChecked {
            limit_mp,
            resized: None,
        } => format!("Within the {} MP area limit", limit_mp),
        EventKind::Saving { output } => format!("Saving as {}", output),
        EventKind::RemovingOriginal => "Removing original".to_string(),
        EventKind::Warning { message } => format!("Warning: {}", message),
        EventKind::Failed { error } => format!("Failed: {}", error),
    };
    vec![format!("{} {}", prefix(event.index, event.total), text)]
}

/// Format the end-of-run summary.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    if summary.is_empty() {
        return vec!["no image files found".to_string()];
    }

    let mut lines = Vec::new();
    let mut headline = format!(
        "all done! {} of {} converted",
        summary.converted.len(),
        summary.total
    );
    let removed = summary.originals_removed();
    if removed > 0 {
        headline.push_str(&format!(", {} originals removed", removed));
    }
    lines.push(headline);

    if !summary.failed.is_empty() {
        lines.push(format!("{} failed:", summary.failed.len()));
        for failure in &summary.failed {
            lines.push(format!("    {}: {}", failure.path.display(), failure.error));
        }
    }
    lines
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
