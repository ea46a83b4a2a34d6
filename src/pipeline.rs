//! Per-image conversion pipeline.
//!
//! Each [`FileTask`] runs through a fixed sequence:
//!
//! ```text
//! decode → trim border? → dimension limit? → area limit → name output
//!        → encode WEBP → retention (keep or delete the input)
//! ```
//!
//! - Trimming runs unless `trim_whitespace` is off.
//! - The dimension limit runs only when `max_dimension > 0`.
//! - The area limit always runs; it is a no-op for images already under it.
//!
//! ## Output naming
//!
//! The output is the input's stem plus `.webp`, in the input's directory.
//! With `keep_original` on, the name is collision-resolved (`photo (1).webp`)
//! so nothing is overwritten; this matters when the input is itself a `.webp`.
//! With it off, an existing file of that name is overwritten.
//!
//! ## Retention
//!
//! With `keep_original` on, the input is never touched. Otherwise it is
//! deleted after a successful encode, unless its extension is `webp` (any
//! case): such an input shares its name with the output it was just
//! replaced by. A failed delete is reported as a warning; the conversion
//! itself already succeeded.
//!
//! The decoded image is owned by the task and dropped on every exit path.

use crate::config::ConvertConfig;
use crate::imaging::{
    BackendError, BoundingBox, Downscale, ImageBackend, Quality, limit_by_area,
    limit_by_dimension, trim_whitespace,
};
use crate::naming::{OutputReservations, is_webp, webp_filename};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Cannot derive an output name from {0}")]
    InvalidFileName(PathBuf),
}

/// One input file of a batch. Created by the batch runner, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    /// 1-based position in the batch.
    pub index: usize,
    pub total: usize,
}

impl FileTask {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Where a task writes its output and whether the input goes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlacement {
    pub path: PathBuf,
    pub delete_original: bool,
}

/// Result of a successful task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Dimensions of the encoded image.
    pub dimensions: (u32, u32),
    pub original_removed: bool,
}

/// Progress report from a running task.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEvent {
    pub index: usize,
    pub total: usize,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Started { filename: String },
    TrimChecked { cropped: Option<BoundingBox> },
    DimensionChecked { limit: u32, resized: Option<Downscale> },
    AreaChecked { limit_mp: u32, resized: Option<Downscale> },
    Saving { output: String },
    RemovingOriginal,
    Warning { message: String },
    Failed { error: String },
}

/// Sends events for one task. A missing channel or a hung-up receiver
/// silently drops them; progress output never fails a conversion.
pub(crate) struct Progress<'a> {
    index: usize,
    total: usize,
    tx: Option<&'a Sender<ProcessEvent>>,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(task: &FileTask, tx: Option<&'a Sender<ProcessEvent>>) -> Self {
        Self {
            index: task.index,
            total: task.total,
            tx,
        }
    }

    pub(crate) fn emit(&self, kind: EventKind) {
        if let Some(tx) = self.tx {
            tx.send(ProcessEvent {
                index: self.index,
                total: self.total,
                kind,
            })
            .ok();
        }
    }
}

/// Claim on a collision-resolved output name, released on drop.
struct Claim<'a> {
    reservations: &'a OutputReservations,
    path: Option<PathBuf>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if let Some(path) = &self.path {
            self.reservations.release(path);
        }
    }
}

/// Decide where the output of `task` goes.
///
/// With `keep_original` on, the name is collision-resolved and reserved in
/// `reservations`; the caller must release it when the task ends.
pub fn plan_output(
    task: &FileTask,
    config: &ConvertConfig,
    reservations: &OutputReservations,
) -> Result<OutputPlacement, ProcessError> {
    let dir = task.path.parent().unwrap_or_else(|| Path::new(""));
    let base = webp_filename(&task.path)
        .ok_or_else(|| ProcessError::InvalidFileName(task.path.clone()))?;

    if config.keep_original {
        let name = reservations.reserve_unoccupied(dir, &base);
        Ok(OutputPlacement {
            path: dir.join(name),
            delete_original: false,
        })
    } else {
        Ok(OutputPlacement {
            path: dir.join(base),
            delete_original: !is_webp(&task.path),
        })
    }
}

/// Delete the input after a successful conversion.
///
/// Returns whether it was removed. A failure is logged, reported as a
/// warning event, and otherwise ignored.
fn remove_original(input: &Path, progress: &Progress<'_>) -> bool {
    progress.emit(EventKind::RemovingOriginal);
    match std::fs::remove_file(input) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %input.display(), error = %e, "could not remove original");
            progress.emit(EventKind::Warning {
                message: format!("Could not remove original: {e}"),
            });
            false
        }
    }
}

/// Convert one file.
///
/// Errors abort this task only. On error no output file is left behind (the
/// backend writes atomically) and the input is untouched.
pub fn process_image(
    backend: &impl ImageBackend,
    task: &FileTask,
    config: &ConvertConfig,
    reservations: &OutputReservations,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<TaskOutcome, ProcessError> {
    let progress = Progress::new(task, events);
    progress.emit(EventKind::Started {
        filename: task.filename(),
    });

    let mut img = backend.decode(&task.path)?;
    debug!(path = %task.path.display(), width = img.width(), height = img.height(), "decoded");

    if config.trim_whitespace {
        let (trimmed, cropped) = trim_whitespace(img);
        img = trimmed;
        progress.emit(EventKind::TrimChecked { cropped });
    }

    if config.max_dimension > 0 {
        let (resized, applied) = limit_by_dimension(img, config.max_dimension);
        img = resized;
        progress.emit(EventKind::DimensionChecked {
            limit: config.max_dimension,
            resized: applied,
        });
    }

    let (img, applied) = limit_by_area(img, config.max_pixels());
    progress.emit(EventKind::AreaChecked {
        limit_mp: config.max_megapixels,
        resized: applied,
    });

    let placement = plan_output(task, config, reservations)?;
    let _claim = Claim {
        reservations,
        path: config.keep_original.then(|| placement.path.clone()),
    };

    let output_name = placement
        .path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    progress.emit(EventKind::Saving {
        output: output_name,
    });
    backend.encode_webp(&img, &placement.path, Quality::new(config.quality))?;
    let dimensions = (img.width(), img.height());
    drop(img);

    let original_removed = placement.delete_original && remove_original(&task.path, &progress);

    Ok(TaskOutcome {
        input: task.path.clone(),
        output: placement.path,
        dimensions,
        original_removed,
    })
}
