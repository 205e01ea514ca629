//! Configuration module.
//!
//! Handles loading, validating, and merging the `photo-squeeze.toml` file.
//! Stock defaults are the base layer; a user file overrides only the keys it
//! names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! quality = 40                 # JPEG quality for both passes (1-100)
//! size_ceiling_bytes = 37500   # Hard limit on the encoded output
//! max_width = 400              # Bounding box for the downscale fallback
//! max_height = 600
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//!
//! [diagnostics]
//! dump_undecodable = true      # Keep bytes that no decoder accepted
//! dump_dir = "failed-photos"
//!
//! [report]
//! large_photo_threshold_bytes = 153600
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [compression]
//! size_ceiling_bytes = 50000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::imaging::{BoundingBox, Quality};

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "photo-squeeze.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pipeline parameters (quality, ceiling, bounding box).
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// What to keep when a photo cannot be decoded.
    pub diagnostics: DiagnosticsConfig,
    /// Large-photo report settings.
    pub report: ReportConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.compression;
        if c.quality == 0 || c.quality > 100 {
            return Err(ConfigError::Validation(
                "compression.quality must be 1-100".into(),
            ));
        }
        if c.size_ceiling_bytes == 0 {
            return Err(ConfigError::Validation(
                "compression.size_ceiling_bytes must be non-zero".into(),
            ));
        }
        if c.max_width == 0 || c.max_height == 0 {
            return Err(ConfigError::Validation(
                "compression.max_width and max_height must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the compression pipeline.
///
/// Defaults are the values the roster system has always used: quality 40,
/// a 37,500 byte ceiling, and a 400×600 portrait bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// JPEG quality used for both the first and the post-resize encode.
    pub quality: u32,
    /// Maximum accepted size of the encoded output, in bytes.
    pub size_ceiling_bytes: usize,
    /// Bounding box width for the downscale fallback.
    pub max_width: u32,
    /// Bounding box height for the downscale fallback.
    pub max_height: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            quality: 40,
            size_ceiling_bytes: 37_500,
            max_width: 400,
            max_height: 600,
        }
    }
}

impl CompressionConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.max_width, self.max_height)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Handling of photos no decoder accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Write the raw bytes of undecodable photos for offline inspection.
    pub dump_undecodable: bool,
    /// Directory the raw bytes are written to.
    pub dump_dir: PathBuf,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            dump_undecodable: true,
            dump_dir: PathBuf::from("failed-photos"),
        }
    }
}

/// Large-photo report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Only photos at least this large (original bytes) appear in the report.
    pub large_photo_threshold_bytes: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            large_photo_threshold_bytes: 150 * 1024,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// A missing file yields the stock defaults. Otherwise user values are merged
/// on top of the defaults, unknown keys are rejected, and the result is
/// validated.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-squeeze configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression pipeline
# ---------------------------------------------------------------------------
[compression]
# JPEG quality for the first encode and for the re-encode after downscaling.
# Never adapted per photo.
quality = 40

# Hard limit on the encoded output, in bytes. Photos that still exceed it
# after one downscale are rejected, not re-tried.
size_ceiling_bytes = 37500

# Bounding box for the single downscale attempt. Photos already inside it
# are never upscaled or re-sampled.
max_width = 400
max_height = 600

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Diagnostics
# ---------------------------------------------------------------------------
[diagnostics]
# Save the raw bytes of photos no decoder accepts, as
# <dump_dir>/failed_photo_<id>.bin
dump_undecodable = true
dump_dir = "failed-photos"

# ---------------------------------------------------------------------------
# Large-photo report
# ---------------------------------------------------------------------------
[report]
# Originals at least this large (bytes) are listed by the `report` command.
large_photo_threshold_bytes = 153600
"##
}
