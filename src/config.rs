//! Conversion configuration.
//!
//! A single [`ConvertConfig`] value is built once per run and passed
//! explicitly into the batch runner and the per-image pipeline. Nothing reads
//! configuration from ambient state.
//!
//! ## Layering
//!
//! ```text
//! stock defaults  →  --config <file>.toml  →  command-line flags
//! ```
//!
//! The TOML file is optional and sparse: override just the values you want.
//! Unknown keys are rejected to catch typos early. Nothing is ever written
//! back, so every run starts from the same defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! images_dir = "images"     # Directory converted in place
//! ignore_file = ".gitignore" # The one entry in it that is never converted
//! quality = 90              # WEBP quality (0-100)
//! max_dimension = 0         # Largest allowed side in px (0 = no limit)
//! max_megapixels = 64       # Largest allowed area in megapixels
//! trim_whitespace = true    # Crop uniform borders before resizing
//! keep_original = true      # false = delete inputs after conversion
//! threads = 4               # Parallel workers (omit for auto = CPU cores)
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings for one conversion run.
///
/// All fields have sensible defaults. Config files need only specify the
/// values they want to override.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Directory whose files are converted. Outputs are written next to them.
    pub images_dir: PathBuf,
    /// Reserved file name inside `images_dir` that is never treated as an image.
    pub ignore_file: String,
    /// WEBP encoding quality (0 = smallest, 100 = best).
    pub quality: u32,
    /// Upper bound for the larger of width/height, in pixels. 0 disables the check.
    pub max_dimension: u32,
    /// Upper bound for width × height, in decimal megapixels. Always active.
    pub max_megapixels: u32,
    /// Crop a uniform-color border before resizing.
    pub trim_whitespace: bool,
    /// Keep input files after conversion. When set, output names are
    /// collision-resolved instead of overwriting.
    pub keep_original: bool,
    /// Number of parallel workers. `None` uses every available core.
    pub threads: Option<usize>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            ignore_file: ".gitignore".to_string(),
            quality: 90,
            max_dimension: 0,
            max_megapixels: 64,
            trim_whitespace: true,
            keep_original: true,
            threads: None,
        }
    }
}

impl ConvertConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 0-100".into()));
        }
        if self.max_megapixels == 0 {
            return Err(ConfigError::Validation(
                "max_megapixels must be greater than 0".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Validation(
                "threads must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Area bound in pixels.
    pub fn max_pixels(&self) -> u64 {
        u64::from(self.max_megapixels) * 1_000_000
    }

    /// Resolve the worker count.
    ///
    /// - `None` → use all available cores
    /// - `Some(n)` → exactly `n`; workers mostly wait on codec work, so
    ///   asking for more than the core count is allowed
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Command-line overrides. `None` / `false` leaves the lower layer untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub images_dir: Option<PathBuf>,
    pub quality: Option<u32>,
    pub max_dimension: Option<u32>,
    pub max_megapixels: Option<u32>,
    pub keep_whitespace: bool,
    pub remove_originals: bool,
    pub threads: Option<usize>,
}

impl ConfigOverrides {
    /// Layer these overrides on top of `config`.
    pub fn apply(&self, mut config: ConvertConfig) -> ConvertConfig {
        if let Some(dir) = &self.images_dir {
            config.images_dir = dir.clone();
        }
        if let Some(q) = self.quality {
            config.quality = q;
        }
        if let Some(d) = self.max_dimension {
            config.max_dimension = d;
        }
        if let Some(mp) = self.max_megapixels {
            config.max_megapixels = mp;
        }
        if self.keep_whitespace {
            config.trim_whitespace = false;
        }
        if self.remove_originals {
            config.keep_original = false;
        }
        if let Some(t) = self.threads {
            config.threads = Some(t);
        }
        config
    }
}

/// Parse a sparse TOML config. Missing keys take their stock defaults.
pub fn parse_config(content: &str) -> Result<ConvertConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Build the effective config for a run: stock defaults, then the optional
/// config file, then command-line overrides. The result is validated.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ConvertConfig, ConfigError> {
    let base = match path {
        Some(p) => parse_config(&fs::read_to_string(p)?)?,
        None => ConvertConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate()?;
    Ok(config)
}

/// Stock config file with every option documented.
pub fn stock_config_toml() -> &'static str {
    r#"# webpify configuration
# Pass with: webpify --config webpify.toml
# Command-line flags override values set here.

# Directory converted in place. Outputs are written next to the inputs.
images_dir = "images"

# The one file inside images_dir that is never treated as an image.
ignore_file = ".gitignore"

# WEBP quality, from 0 (smallest) to 100 (best).
quality = 90

# Upper bound for the larger side in pixels. Images above it are shrunk
# preserving aspect ratio. 0 disables the check.
max_dimension = 0

# Upper bound for image area in megapixels (width x height / 1,000,000).
# Always active.
max_megapixels = 64

# Crop a uniform-color border (sampled from the top-left pixel) before resizing.
trim_whitespace = true

# Keep input files after conversion. When true, an output that would clash
# with an existing file gets a " (N)" suffix instead.
# When false, inputs are deleted after conversion (existing .webp inputs are
# overwritten in place and never deleted).
keep_original = true

# Parallel workers. Omit to use every CPU core.
# threads = 4
"#
}
