//! Converter configuration.
//!
//! Handles loading, validating, and merging `insta-hugo.toml`. User files are
//! sparse: stock defaults are serialized to a TOML table and the user's values
//! are merged on top before deserializing, so a file only needs the keys it
//! wants to change.
//!
//! ## Config File Location
//!
//! `convert` looks for `insta-hugo.toml` in the output (Hugo site) root,
//! `check` looks in the source directory. `--config <FILE>` overrides both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [media]
//! image_extensions = ["jpg", "jpeg", "png", "webp"]
//! video_extensions = ["mp4", "mov", "webm"]
//!
//! [front_matter]
//! tags = ["instagram"]
//! post_url_base = "https://www.instagram.com/p/"
//! title_max_chars = 60
//! description_max_chars = 160
//!
//! [metadata]
//! skip_invalid = false      # true = warn and skip posts with broken sidecars
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the site or source root.
pub const CONFIG_FILENAME: &str = "insta-hugo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `insta-hugo.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Which file extensions count as post media.
    pub media: MediaConfig,
    /// Front-matter values and limits.
    pub front_matter: FrontMatterConfig,
    /// Sidecar error policy.
    pub metadata: MetadataConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.media.image_extensions.is_empty() && self.media.video_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "media.image_extensions and media.video_extensions must not both be empty".into(),
            ));
        }
        if self
            .media
            .image_extensions
            .iter()
            .chain(&self.media.video_extensions)
            .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::Validation(
                "media extensions must be non-empty and given without a leading dot".into(),
            ));
        }
        if self.front_matter.title_max_chars == 0 {
            return Err(ConfigError::Validation(
                "front_matter.title_max_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Media classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Image extensions, compared case-insensitively, without the dot.
    pub image_extensions: Vec<String>,
    /// Video extensions, compared case-insensitively, without the dot.
    pub video_extensions: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_extensions: ["jpg", "jpeg", "png", "webp"].map(String::from).to_vec(),
            video_extensions: ["mp4", "mov", "webm"].map(String::from).to_vec(),
        }
    }
}

impl MediaConfig {
    pub fn is_image(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_video(&self, ext: &str) -> bool {
        self.video_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Values written into every post's front matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatterConfig {
    /// Tags attached to every post.
    pub tags: Vec<String>,
    /// Prefix of the link back to the original post; the shortcode and a
    /// trailing `/` are appended.
    pub post_url_base: String,
    /// Maximum title length in characters.
    pub title_max_chars: usize,
    /// Maximum description length in characters. `0` disables descriptions.
    pub description_max_chars: usize,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            tags: vec!["instagram".to_string()],
            post_url_base: "https://www.instagram.com/p/".to_string(),
            title_max_chars: 60,
            description_max_chars: 160,
        }
    }
}

/// What to do with a sidecar that can't be read or parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// `false` aborts the run on the first broken sidecar; `true` logs a
    /// warning and skips that post.
    pub skip_invalid: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `insta-hugo.toml` from a directory, falling back to stock defaults
/// when the file does not exist.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `insta-hugo.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# insta-hugo Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the Hugo site (the --out directory), or
# pass --config <FILE>. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Media files
# ---------------------------------------------------------------------------
[media]
# Extensions (case-insensitive, no dot) copied to static/media/ and listed
# under `images:` in the post front matter.
image_extensions = ["jpg", "jpeg", "png", "webp"]
video_extensions = ["mp4", "mov", "webm"]

# ---------------------------------------------------------------------------
# Front matter
# ---------------------------------------------------------------------------
[front_matter]
# Tags attached to every generated post.
tags = ["instagram"]

# Link back to the original post: <post_url_base><shortcode>/
post_url_base = "https://www.instagram.com/p/"

# Titles come from the first caption line, cut to this many characters.
title_max_chars = 60

# Descriptions come from the cleaned caption, cut to this many characters.
# Set to 0 to leave descriptions out.
description_max_chars = 160

# ---------------------------------------------------------------------------
# Metadata sidecars
# ---------------------------------------------------------------------------
[metadata]
# A sidecar that can't be decompressed or parsed aborts the run.
# Set to true to log a warning and skip that post instead.
skip_invalid = false
"##
}
