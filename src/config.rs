//! Compression configuration.
//!
//! Handles loading, validating, and merging `config.toml`. A user file is
//! merged on top of stock defaults, so it only needs the keys it changes.
//! Command-line flags are applied last by the binary and win over both.
//!
//! ## Config File Location
//!
//! `--config <path>` names the file explicitly. Without it, `./config.toml` is
//! used when present; otherwise the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! level = "medium"          # low | medium | high
//!
//! [resize]
//! scale = 100               # Uniform scale percentage (1-100)
//! # width = 800             # Explicit target width
//! # height = 800            # Explicit target height
//!
//! [output]
//! dir = "compressed"
//! prefix = "compressed_"
//! archive_name = "MidiaResolve_Processed_Images.zip"
//!
//! [metadata]
//! preserve = true           # Re-attach EXIF to JPEG output
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::DEFAULT_ARCHIVE_NAME;
use crate::imaging::{CompressionLevel, TransformRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressConfig {
    /// Compression tier.
    pub compression: CompressionConfig,
    /// Scale percentage or explicit target size.
    pub resize: ResizeConfig,
    /// Where and under which names results are written.
    pub output: OutputConfig,
    /// EXIF handling.
    pub metadata: MetadataConfig,
}

impl CompressConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.resize.scale) {
            return Err(ConfigError::Validation(format!(
                "resize.scale must be 1-100, got {}",
                self.resize.scale
            )));
        }
        if self.resize.width == Some(0) || self.resize.height == Some(0) {
            return Err(ConfigError::Validation(
                "resize.width and resize.height must be non-zero".into(),
            ));
        }
        if self.output.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "output.prefix must not be empty".into(),
            ));
        }
        if self.output.archive_name.is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The transform request this config describes.
    pub fn transform_request(&self) -> TransformRequest {
        TransformRequest {
            level: self.compression.level,
            scale: self.resize.scale,
            width: self.resize.width,
            height: self.resize.height,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub level: CompressionLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub scale: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            scale: 100,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory results are written to.
    pub dir: String,
    /// Prefix prepended to every output name.
    pub prefix: String,
    /// File name of the `--zip` archive.
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "compressed".to_string(),
            prefix: crate::naming::DEFAULT_PREFIX.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub preserve: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { preserve: true }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CompressConfig::default())?)
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

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
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
) -> Result<CompressConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CompressConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<CompressConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(path = %path.display(), ?config, "config resolved");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Midia Resolve Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# low = JPEG quality 0.9, medium = 0.7, high = 0.5.
# PNG input stays PNG only at "low" with no resize or crop.
level = "medium"

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Uniform scale percentage (1-100). Used when no explicit size is given.
scale = 100

# Explicit target size in pixels. Both must be set to take effect.
# A different aspect ratio than the source center-crops to fit.
# width = 800
# height = 800

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory results and report.json are written to.
dir = "compressed"

# Prepended to every output file name.
prefix = "compressed_"

# File name used by --zip.
archive_name = "MidiaResolve_Processed_Images.zip"

# ---------------------------------------------------------------------------
# Metadata
# ---------------------------------------------------------------------------
[metadata]
# Copy camera EXIF into JPEG output. Orientation and pixel dimensions are
# always dropped since the output is already upright and resized.
preserve = true
"##
}
