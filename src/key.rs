//! Post keys: the timestamp token Instaloader embeds in every file name.
//!
//! Instaloader names everything belonging to one post after the post's UTC
//! creation time:
//!
//! ```text
//! 2024-03-05_08-00-00_UTC.json.xz     # metadata sidecar (compressed)
//! 2024-03-05_08-00-00_UTC.txt         # caption
//! 2024-03-05_08-00-00_UTC_1.jpg       # carousel item 1
//! 2024-03-05_08-00-00_UTC_2.mp4       # carousel item 2
//! 2024-03-05_08-00-00_UTC_comments.json
//! ```
//!
//! The `YYYY-MM-DD_HH-MM-SS_UTC` token is the [`PostKey`]. Everything after it
//! (carousel index, extension, `_comments`) is ignored, so all of the files
//! above resolve to the same key.

use chrono::NaiveDateTime;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}_UTC").expect("key pattern is valid")
});

const KEY_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const UTC_MARKER: &str = "_UTC";

/// Double-layered sidecar suffixes, longest first.
const SIDECAR_SUFFIXES: &[&str] = &[".json.xz", ".json"];

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Post key {key} is not a valid date-time: {source}")]
    InvalidDateTime {
        key: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Timestamp token identifying one post, e.g. `2024-03-05_08-00-00_UTC`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostKey(String);

impl PostKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the key into the (naive, UTC) creation time of the post.
    pub fn datetime(&self) -> Result<NaiveDateTime, KeyError> {
        let raw = self.0.replacen(UTC_MARKER, "", 1);
        NaiveDateTime::parse_from_str(&raw, KEY_FORMAT).map_err(|source| {
            KeyError::InvalidDateTime {
                key: self.0.clone(),
                source,
            }
        })
    }

    /// `YYYY-MM-DDTHH:MM:SS`, the form Hugo expects in `date:`.
    pub fn iso_date(&self) -> Result<String, KeyError> {
        Ok(self.datetime()?.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    /// `YYYYMMDD`, used as the identifier prefix.
    pub fn compact_date(&self) -> Result<String, KeyError> {
        Ok(self.datetime()?.format("%Y%m%d").to_string())
    }
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonical stem of a file name.
///
/// Sidecars carry two suffixes (`.json.xz`) that must be removed together;
/// every other file loses only its last extension.
///
/// - `2025-09-01_12-00-00_UTC.json.xz` → `2025-09-01_12-00-00_UTC`
/// - `2025-09-01_12-00-00_UTC.json` → `2025-09-01_12-00-00_UTC`
/// - `2025-09-01_12-00-00_UTC_1.jpg` → `2025-09-01_12-00-00_UTC_1`
pub fn strip_sidecar_suffixes(name: &str) -> &str {
    for suffix in SIDECAR_SUFFIXES {
        if let Some(stem) = name.strip_suffix(suffix) {
            return stem;
        }
    }
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Extract the post key from a file name, or `None` if it carries no
/// timestamp token.
pub fn key_from_name(name: &str) -> Option<PostKey> {
    let stem = strip_sidecar_suffixes(name);
    KEY_PATTERN
        .find(stem)
        .map(|m| PostKey(m.as_str().to_string()))
}

#[cfg(test)]
pub(crate) fn key(raw: &str) -> PostKey {
    PostKey(raw.to_string())
}
