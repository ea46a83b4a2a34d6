//! Output file naming and collision resolution.
//!
//! Every input `name.ext` becomes `name.webp` in the same directory. When
//! originals are kept, an existing file must never be overwritten, so the
//! name is suffixed before the extension:
//!
//! ```text
//! photo.webp  →  photo (1).webp  →  photo (2).webp  → ...
//! ```
//!
//! The counter starts at 1 and increases by one until a free name is found.
//!
//! ## Parallel workers
//!
//! Checking the filesystem and later writing the file is not atomic. Workers
//! share an [`OutputReservations`] registry so two in-flight tasks can never
//! pick the same name: a name counts as taken if it exists on disk *or* is
//! reserved. Writers outside this process are not covered.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Output file name for an input: the input's stem with a `.webp` extension.
///
/// Only the last extension is replaced (`archive.tar.png` → `archive.tar.webp`).
/// Returns `None` when the path has no file stem.
pub fn webp_filename(input: &Path) -> Option<String> {
    let stem = input.file_stem()?.to_str()?;
    Some(format!("{stem}.webp"))
}

/// Whether a path has a `webp` extension, ignoring case.
pub fn is_webp(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("webp"))
}

/// Split `photo.webp` into (`photo`, `.webp`). Names without an extension
/// (or dotfiles like `.hidden`) keep an empty extension.
fn split_name(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename.split_at(pos),
        _ => (filename, ""),
    }
}

/// `{stem} ({counter}){extension}`.
fn numbered_variant(filename: &str, counter: u32) -> String {
    let (stem, ext) = split_name(filename);
    format!("{stem} ({counter}){ext}")
}

/// Return a filename that does not exist in `dir`.
///
/// If `filename` is free it is returned unchanged. Otherwise `" (N)"` is
/// inserted before the extension, trying N = 1, 2, 3, ... in order.
pub fn unoccupied_filename(dir: &Path, filename: &str) -> String {
    first_free(filename, |candidate| dir.join(candidate).exists())
}

fn first_free(filename: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    if !taken(filename) {
        return filename.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = numbered_variant(filename, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Output paths claimed by in-flight tasks.
///
/// Shared by every worker of a batch (it is `Sync`). Claims are released
/// when the owning task finishes, whether the output was written or not.
#[derive(Debug, Default)]
pub struct OutputReservations {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl OutputReservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collision-resolve `filename` in `dir` and reserve the result.
    ///
    /// Checking and claiming happen under one lock, so concurrent callers
    /// asking for the same name get distinct results.
    pub fn reserve_unoccupied(&self, dir: &Path, filename: &str) -> String {
        let mut claimed = self.lock();
        let name = first_free(filename, |candidate| {
            let path = dir.join(candidate);
            claimed.contains(&path) || path.exists()
        });
        claimed.insert(dir.join(&name));
        name
    }

    /// Drop the claim on `path`.
    pub fn release(&self, path: &Path) {
        self.lock().remove(path);
    }

    pub fn is_reserved(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        // Each critical section is one set operation, so a poisoned set is
        // still consistent.
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn webp_filename_replaces_extension() {
        assert_eq!(
            webp_filename(Path::new("images/photo.jpg")).as_deref(),
            Some("photo.webp")
        );
    }

    #[test]
    fn webp_filename_keeps_inner_dots() {
        assert_eq!(
            webp_filename(Path::new("scan.2024.png")).as_deref(),
            Some("scan.2024.webp")
        );
    }

    #[test]
    fn webp_filename_without_extension() {
        assert_eq!(webp_filename(Path::new("README")).as_deref(), Some("README.webp"));
    }

    #[test]
    fn webp_filename_of_webp_is_same_name() {
        assert_eq!(
            webp_filename(Path::new("photo.webp")).as_deref(),
            Some("photo.webp")
        );
    }

    #[test]
    fn is_webp_ignores_case() {
        assert!(is_webp(Path::new("a.webp")));
        assert!(is_webp(Path::new("a.WebP")));
        assert!(!is_webp(Path::new("a.png")));
        assert!(!is_webp(Path::new("webp")));
    }

    #[test]
    fn numbered_variant_inserts_before_extension() {
        assert_eq!(numbered_variant("photo.webp", 1), "photo (1).webp");
        assert_eq!(numbered_variant("photo", 3), "photo (3)");
        assert_eq!(numbered_variant("a.b.webp", 2), "a.b (2).webp");
    }

    #[test]
    fn free_name_returned_unchanged() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(unoccupied_filename(tmp.path(), "photo.webp"), "photo.webp");
    }

    #[test]
    fn taken_name_gets_first_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("photo.webp"), "").unwrap();
        assert_eq!(
            unoccupied_filename(tmp.path(), "photo.webp"),
            "photo (1).webp"
        );
    }

    #[test]
    fn counter_is_gapless_and_monotonic() {
        let tmp = TempDir::new().unwrap();
        let mut names = Vec::new();
        for _ in 0..4 {
            let name = unoccupied_filename(tmp.path(), "photo.webp");
            fs::write(tmp.path().join(&name), "").unwrap();
            names.push(name);
        }
        assert_eq!(
            names,
            vec![
                "photo.webp",
                "photo (1).webp",
                "photo (2).webp",
                "photo (3).webp"
            ]
        );
    }

    #[test]
    fn counter_fills_first_gap() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("photo.webp"), "").unwrap();
        fs::write(tmp.path().join("photo (2).webp"), "").unwrap();
        assert_eq!(
            unoccupied_filename(tmp.path(), "photo.webp"),
            "photo (1).webp"
        );
    }

    #[test]
    fn reservations_make_concurrent_claims_distinct() {
        let tmp = TempDir::new().unwrap();
        let reservations = OutputReservations::new();

        let first = reservations.reserve_unoccupied(tmp.path(), "photo.webp");
        let second = reservations.reserve_unoccupied(tmp.path(), "photo.webp");

        assert_eq!(first, "photo.webp");
        assert_eq!(second, "photo (1).webp");
        assert!(reservations.is_reserved(&tmp.path().join("photo.webp")));
    }

    #[test]
    fn reservations_respect_existing_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("photo.webp"), "").unwrap();
        let reservations = OutputReservations::new();
        assert_eq!(
            reservations.reserve_unoccupied(tmp.path(), "photo.webp"),
            "photo (1).webp"
        );
    }

    #[test]
    fn released_name_can_be_claimed_again() {
        let tmp = TempDir::new().unwrap();
        let reservations = OutputReservations::new();
        let name = reservations.reserve_unoccupied(tmp.path(), "photo.webp");
        reservations.release(&tmp.path().join(&name));
        assert_eq!(
            reservations.reserve_unoccupied(tmp.path(), "photo.webp"),
            "photo.webp"
        );
    }

    #[test]
    fn reservations_across_threads_never_collide() {
        let tmp = TempDir::new().unwrap();
        let reservations = OutputReservations::new();
        let names: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| reservations.reserve_unoccupied(tmp.path(), "photo.webp")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 8);
    }
}
