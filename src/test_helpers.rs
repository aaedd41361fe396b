//! Shared test utilities for the insta-hugo test suite.
//!
//! Provides fixture writers that lay out an Instaloader-style profile in a
//! temp directory, plus lookup helpers for scan and convert results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = TempDir::new().unwrap();
//! write_media(src.path(), "2024-03-05_08-00-00_UTC_1.jpg");
//! write_json_xz(src.path(), "2024-03-05_08-00-00_UTC.json.xz", r#"{"node": {}}"#);
//!
//! let posts = find_posts(src.path(), &MediaConfig::default()).unwrap();
//! assert_eq!(post_keys(&posts), vec!["2024-03-05_08-00-00_UTC"]);
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use xz2::write::XzEncoder;

use crate::convert::{ConvertReport, WrittenPost};
use crate::key::PostKey;
use crate::scan::PostGroup;

// =========================================================================
// Fixture writers
// =========================================================================

/// Write a placeholder media file (scan only checks the extension).
pub fn write_media(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("fake media {name}")).unwrap();
    path
}

/// Write a plain JSON sidecar.
pub fn write_json(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).unwrap();
    path
}

/// Write an xz-compressed JSON sidecar, as `instaloader` does by default.
pub fn write_json_xz(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    let mut encoder = XzEncoder::new(file, 6);
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Write a text file (captions, unrelated files).
pub fn write_text(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Node-wrapped sidecar JSON carrying the common fields.
pub fn node_sidecar(caption: &str, shortcode: &str, timestamp: i64) -> String {
    serde_json::json!({
        "node": {
            "edge_media_to_caption": { "edges": [ { "node": { "text": caption } } ] },
            "shortcode": shortcode,
            "taken_at_timestamp": timestamp,
        },
        "instaloader": { "node_type": "Post" },
    })
    .to_string()
}

// =========================================================================
// Extractors and lookups
// =========================================================================

/// File names of a path list, in order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Keys of scanned posts, in order.
pub fn post_keys(posts: &[(PostKey, PostGroup)]) -> Vec<&str> {
    posts.iter().map(|(k, _)| k.as_str()).collect()
}

/// Find a written post by key. Panics if not found.
pub fn find_written<'a>(report: &'a ConvertReport, key: &str) -> &'a WrittenPost {
    report
        .written
        .iter()
        .find(|p| p.key.as_str() == key)
        .unwrap_or_else(|| {
            let keys: Vec<&str> = report.written.iter().map(|p| p.key.as_str()).collect();
            panic!("post '{key}' not written. Available: {keys:?}")
        })
}

/// Read a generated post document by identifier.
pub fn read_post(out: &Path, identifier: &str) -> String {
    let path = out.join("content/posts").join(format!("{identifier}.md"));
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("could not read {}: {e}", path.display()))
}
