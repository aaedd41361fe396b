//! Sidecar metadata extraction.
//!
//! Instaloader stores each post's metadata as JSON next to the media, either
//! plain (`<key>.json`) or xz-compressed (`<key>.json.xz`). Different
//! Instaloader versions and export paths produce different layouts, so the
//! document is first classified into a known shape and fields are then probed
//! in a fixed order.
//!
//! ## Document shapes
//!
//! ```text
//! {"node": {...}, "instaloader": {...}}   Record → NodeWrapped   (current Instaloader)
//! {"caption": "...", "shortcode": "..."}  Record → Flat          (flattened exports)
//! {"edge_media_to_caption": {...}}        Record → Flat          (legacy GraphQL dump)
//! [{...}, ...]                            List   → first object element
//! 42 / "text" / null                      Unrecognized → empty metadata
//! ```
//!
//! ## Resolution priority
//!
//! Each field is resolved independently; the first non-empty value wins.
//!
//! - **Caption**: `node.edge_media_to_caption.edges[0].node.text` → `caption`
//!   → `edge_media_to_caption.edges[0].node.text` → sibling `.txt` file
//! - **External id**: `node.shortcode` → `shortcode`
//! - **Timestamp**: `taken_at_timestamp` → `node.taken_at_timestamp`
//! - **Location**: `location.name` → `node.location.name`

use crate::key::strip_sidecar_suffixes;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xz2::read::XzDecoder;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unusable taken_at_timestamp {value} in {path}")]
    InvalidTimestamp { path: PathBuf, value: String },
}

/// Fields extracted from a post's sidecar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostMetadata {
    /// Raw caption text, possibly empty.
    pub caption: String,
    /// Epoch seconds the post was taken at.
    pub timestamp: Option<i64>,
    /// Human-readable location name.
    pub location: Option<String>,
    /// Platform shortcode (the `XYZ` in `/p/XYZ/`).
    pub external_id: Option<String>,
}

/// Top-level layout of a parsed sidecar.
#[derive(Debug, PartialEq)]
pub enum SidecarDocument {
    Record(Map<String, Value>),
    List(Vec<Value>),
    Unrecognized,
}

impl SidecarDocument {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => SidecarDocument::Record(map),
            Value::Array(items) => SidecarDocument::List(items),
            _ => SidecarDocument::Unrecognized,
        }
    }

    /// The record fields are read from: the object itself, or the first
    /// object in a list.
    pub fn into_record(self) -> Option<Map<String, Value>> {
        match self {
            SidecarDocument::Record(map) => Some(map),
            SidecarDocument::List(items) => items.into_iter().find_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            }),
            SidecarDocument::Unrecognized => None,
        }
    }
}

/// Layout of a single metadata record.
#[derive(Debug, Clone, Copy)]
pub enum RecordShape<'a> {
    /// Instaloader's `{"node": {...}}` wrapper. Top-level fields may still
    /// be present alongside the node.
    NodeWrapped {
        record: &'a Map<String, Value>,
        node: &'a Map<String, Value>,
    },
    /// Everything at the top level.
    Flat { record: &'a Map<String, Value> },
}

impl<'a> RecordShape<'a> {
    pub fn of(record: &'a Map<String, Value>) -> Self {
        match record.get("node") {
            Some(Value::Object(node)) if !node.is_empty() => {
                RecordShape::NodeWrapped { record, node }
            }
            _ => RecordShape::Flat { record },
        }
    }

    fn record(&self) -> &'a Map<String, Value> {
        match *self {
            RecordShape::NodeWrapped { record, .. } | RecordShape::Flat { record } => record,
        }
    }

    fn node(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            RecordShape::NodeWrapped { node, .. } => Some(node),
            RecordShape::Flat { .. } => None,
        }
    }

    /// Caption from the JSON alone; the `.txt` fallback is applied by
    /// [`read_sidecar`].
    pub fn caption(&self) -> Option<&'a str> {
        self.node()
            .and_then(edge_caption)
            .or_else(|| non_empty_str(self.record().get("caption")))
            .or_else(|| edge_caption(self.record()))
    }

    pub fn external_id(&self) -> Option<&'a str> {
        self.node()
            .and_then(|node| non_empty_str(node.get("shortcode")))
            .or_else(|| non_empty_str(self.record().get("shortcode")))
    }

    /// The raw timestamp value, before integer coercion.
    pub fn timestamp_value(&self) -> Option<&'a Value> {
        truthy(self.record().get("taken_at_timestamp"))
            .or_else(|| self.node().and_then(|node| truthy(node.get("taken_at_timestamp"))))
    }

    pub fn location_name(&self) -> Option<&'a str> {
        let location = truthy(self.record().get("location"))
            .or_else(|| self.node().and_then(|node| truthy(node.get("location"))))?;
        non_empty_str(location.as_object()?.get("name"))
    }
}

/// `edge_media_to_caption.edges[0].node.text` of a record.
fn edge_caption(record: &Map<String, Value>) -> Option<&str> {
    let text = record
        .get("edge_media_to_caption")?
        .get("edges")?
        .get(0)?
        .get("node")?
        .get("text");
    non_empty_str(text)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Treat JSON-falsy values (null, false, 0, "", [], {}) as absent.
fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// Coerce a timestamp value to whole epoch seconds.
fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read and extract a post's sidecar.
///
/// Returns empty metadata if `meta` is `None` or the file doesn't exist.
/// Files ending in `.xz` are decompressed transparently. If the JSON carries
/// no caption, the sibling `.txt` (same stem, suffixes stripped) is used.
pub fn read_sidecar(meta: Option<&Path>) -> Result<PostMetadata, MetadataError> {
    let Some(path) = meta.filter(|p| p.exists()) else {
        return Ok(PostMetadata::default());
    };

    let value = load_json(path)?;
    let Some(record) = SidecarDocument::from_value(value).into_record() else {
        return Ok(PostMetadata::default());
    };
    let shape = RecordShape::of(&record);

    let caption = match shape.caption() {
        Some(text) => text.to_string(),
        None => read_text_fallback(&caption_sibling(path))?.unwrap_or_default(),
    };

    let timestamp = match shape.timestamp_value() {
        Some(value) => Some(coerce_timestamp(value).ok_or_else(|| {
            MetadataError::InvalidTimestamp {
                path: path.to_path_buf(),
                value: value.to_string(),
            }
        })?),
        None => None,
    };

    Ok(PostMetadata {
        caption,
        timestamp,
        location: shape.location_name().map(String::from),
        external_id: shape.external_id().map(String::from),
    })
}

/// Read a caption text file in full, or `None` if it doesn't exist.
///
/// Invalid UTF-8 sequences are dropped rather than rejected; captions are
/// free text.
pub fn read_text_fallback(path: &Path) -> Result<Option<String>, MetadataError> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    Ok(Some(text))
}

/// `2024-01-01_10-00-00_UTC.json.xz` → `2024-01-01_10-00-00_UTC.txt`
fn caption_sibling(meta: &Path) -> PathBuf {
    let name = meta
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    meta.with_file_name(format!("{}.txt", strip_sidecar_suffixes(&name)))
}

fn load_json(path: &Path) -> Result<Value, MetadataError> {
    let io_err = |source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    if path.extension().is_some_and(|e| e == "xz") {
        XzDecoder::new(file).read_to_end(&mut bytes).map_err(io_err)?;
    } else {
        io::BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
    }

    serde_json::from_slice(&bytes).map_err(|source| MetadataError::Json {
        path: path.to_path_buf(),
        source,
    })
}
