//! Batch runner: list the images directory and convert every file in it.
//!
//! ## Candidates
//!
//! Every regular file directly inside `images_dir` is a candidate, except the
//! one reserved `ignore_file` (`.gitignore` by default, so the directory can
//! be checked into git empty). Symlinks to files count as files;
//! subdirectories are skipped. Files that turn out not to be images fail
//! their own task and nothing else.
//!
//! Candidates are sorted by file name and numbered from 1, so the
//! `[i of total]` progress prefix is stable across runs.
//!
//! ## Parallel Processing
//!
//! Tasks run on a dedicated [rayon](https://docs.rs/rayon) pool sized by
//! [`ConvertConfig::effective_threads`]. Tasks share nothing mutable except
//! the [`OutputReservations`] registry; completion order is unspecified, and
//! one task's failure neither stops nor hides the others. All failures are
//! collected into the [`BatchSummary`].

use crate::config::ConvertConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::OutputReservations;
use crate::pipeline::{EventKind, FileTask, ProcessEvent, Progress, TaskOutcome, process_image};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Cannot read images directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A task that did not produce an output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of candidate files found. 0 means nothing was done.
    pub total: usize,
    pub converted: Vec<TaskOutcome>,
    pub failed: Vec<TaskFailure>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn originals_removed(&self) -> usize {
        self.converted.iter().filter(|o| o.original_removed).count()
    }
}

/// List candidate files in `dir` and number them.
pub fn collect_tasks(dir: &Path, ignore_file: &str) -> Result<Vec<FileTask>, BatchError> {
    let io_err = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok())
        // Follows symlinks, so a linked image is converted like any other.
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name() != ignore_file)
        .map(|entry| entry.path())
        .collect();
    files.sort();

    let total = files.len();
    Ok(files
        .into_iter()
        .enumerate()
        .map(|(i, path)| FileTask {
            path,
            index: i + 1,
            total,
        })
        .collect())
}

/// Convert every image in `config.images_dir` with the production backend.
pub fn run(
    config: &ConvertConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchSummary, BatchError> {
    run_with_backend(&RustBackend::new(), config, events)
}

/// Convert every image using a specific backend (allows testing with mock).
///
/// An empty directory is not an error: the summary has `total == 0`.
pub fn run_with_backend(
    backend: &impl ImageBackend,
    config: &ConvertConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchSummary, BatchError> {
    let tasks = collect_tasks(&config.images_dir, &config.ignore_file)?;
    if tasks.is_empty() {
        debug!(dir = %config.images_dir.display(), "no image files found");
        return Ok(BatchSummary::default());
    }

    let threads = config.effective_threads();
    debug!(tasks = tasks.len(), threads, "starting batch");
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let reservations = OutputReservations::new();
    let events = events.as_ref();

    let results: Vec<_> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let result = process_image(backend, task, config, &reservations, events);
                if let Err(e) = &result {
                    error!(path = %task.path.display(), error = %e, "conversion failed");
                    Progress::new(task, events).emit(EventKind::Failed {
                        error: e.to_string(),
                    });
                }
                (task, result)
            })
            .collect()
    });

    let mut summary = BatchSummary {
        total: tasks.len(),
        ..BatchSummary::default()
    };
    for (task, result) in results {
        match result {
            Ok(outcome) => summary.converted.push(outcome),
            Err(e) => summary.failed.push(TaskFailure {
                path: task.path.clone(),
                error: e.to_string(),
            }),
        }
    }
    Ok(summary)
}
