//! # webpify
//!
//! Batch-converts a directory of raster images to WEBP. Before encoding, each
//! image can have a uniform border trimmed and is shrunk if it exceeds a
//! side-length or megapixel bound.
//!
//! # Pipeline
//!
//! ```text
//! images/  →  list files  →  per image (in parallel):
//!     decode → trim border → dimension limit → area limit
//!            → name output → encode WEBP → keep or delete the input
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `ConvertConfig`: defaults, optional TOML file, CLI overrides, validation |
//! | [`batch`] | Lists the images directory, numbers tasks, runs them on a rayon pool |
//! | [`pipeline`] | The fixed per-image sequence, output placement and retention policy |
//! | [`naming`] | `.webp` output names and `name (N).webp` collision resolution |
//! | [`imaging`] | Trim, resize, and the codec backend (`image` decode, libwebp encode) |
//! | [`output`] | `[i of total]` progress lines and the end-of-run summary |
//!
//! # Design Decisions
//!
//! ## Explicit Configuration
//!
//! The configuration is parsed once and passed by reference into the batch
//! runner and every task. There is no global state, so tests can run batches
//! with different settings side by side.
//!
//! ## Originals Are Kept by Default
//!
//! Deleting inputs is opt-in (`--remove-originals`). When originals are kept,
//! outputs never overwrite anything: `photo.webp` converts to
//! `photo (1).webp`.
//!
//! ## Lossy WEBP via libwebp
//!
//! The `image` crate decodes every input format but only writes lossless
//! WebP. Quality-controlled lossy output goes through the `webp` crate.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
