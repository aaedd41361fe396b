//! Source directory scanning and post grouping.
//!
//! Instaloader writes a profile as one flat directory. Files are bucketed by
//! their [`PostKey`]; each bucket becomes a [`PostGroup`] holding at most one
//! metadata sidecar and any number of media files.
//!
//! ## Directory Structure
//!
//! ```text
//! profile/
//! ├── 2024-06-01_10-00-00_UTC.json.xz      # sidecar       ─┐
//! ├── 2024-06-01_10-00-00_UTC.txt          # caption        │ one post
//! ├── 2024-06-01_10-00-00_UTC_1.jpg        # carousel item  │
//! ├── 2024-06-01_10-00-00_UTC_2.mp4        # carousel item ─┘
//! ├── 2024-01-01_10-00-00_UTC.json         # sidecar with no media: dropped later
//! ├── 2024-01-01_10-00-00_UTC_comments.json  # never a sidecar
//! └── id                                   # no key: ignored
//! ```
//!
//! ## Classification
//!
//! - **Metadata**: name ends in `.json` or `.json.xz`, but not in
//!   `_comments.json` / `_comments.json.xz`.
//! - **Media**: extension is a configured image or video type (case-insensitive).
//! - **Other**: anything else with a key. It still opens the key's bucket but
//!   contributes nothing.
//!
//! Only regular files directly inside the source directory are considered.

use crate::config::MediaConfig;
use crate::key::{self, KeyError, PostKey};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Key(#[from] KeyError),
}

const METADATA_SUFFIXES: &[&str] = &[".json", ".json.xz"];
const COMMENTS_SUFFIXES: &[&str] = &["_comments.json", "_comments.json.xz"];

/// All files belonging to one post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostGroup {
    /// Metadata sidecar, if any. Last one seen wins on duplicates.
    pub meta: Option<PathBuf>,
    /// Media files, ascending by file name.
    pub media: Vec<PathBuf>,
}

impl PostGroup {
    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// What a keyed file contributes to its post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Metadata,
    Media(MediaKind),
    Other,
}

/// Classify a file by name.
pub fn classify(name: &str, media: &MediaConfig) -> FileKind {
    let is_sidecar = METADATA_SUFFIXES.iter().any(|s| name.ends_with(s));
    let is_comments = COMMENTS_SUFFIXES.iter().any(|s| name.ends_with(s));
    if is_sidecar && !is_comments {
        return FileKind::Metadata;
    }

    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy())
        .unwrap_or_default();
    if media.is_image(&ext) {
        FileKind::Media(MediaKind::Image)
    } else if media.is_video(&ext) {
        FileKind::Media(MediaKind::Video)
    } else {
        FileKind::Other
    }
}

/// Group the files in `src` into posts, newest first.
///
/// Groups without media are kept here; the converter drops them.
pub fn find_posts(src: &Path, media: &MediaConfig) -> Result<Vec<(PostKey, PostGroup)>, ScanError> {
    let mut groups: BTreeMap<PostKey, PostGroup> = BTreeMap::new();

    for path in collect_files(src)? {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(key) = key::key_from_name(&name) else {
            debug!(file = %name, "no post key, ignoring");
            continue;
        };

        let kind = classify(&name, media);
        debug!(file = %name, key = %key, ?kind, "classified");

        let group = groups.entry(key).or_default();
        match kind {
            FileKind::Metadata => group.meta = Some(path),
            FileKind::Media(_) => group.media.push(path),
            FileKind::Other => {}
        }
    }

    let mut dated = Vec::with_capacity(groups.len());
    for (key, mut group) in groups {
        let dt = key.datetime()?;
        group.media.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        dated.push((dt, key, group));
    }

    // Stable: equal timestamps keep key order.
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(dated.into_iter().map(|(_, key, group)| (key, group)).collect())
}

/// Regular files directly inside `dir`, sorted by path.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();

    files.sort();
    Ok(files)
}
