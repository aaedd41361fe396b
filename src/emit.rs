//! Hugo output: post documents and media files.
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── content/posts/
//! │   └── 20240305-sunset-at-the-pier-1f3a9c0d.md
//! └── static/media/
//!     ├── 2024-03-05_08-00-00_UTC_1.jpg
//!     └── 2024-03-05_08-00-00_UTC_2.mp4
//! ```
//!
//! ## Document Format
//!
//! ```text
//! ---
//! title: "Sunset at the pier"
//! date: "2024-03-05T08:00:00"
//! draft: "False"
//! images:
//!   - "/media/2024-03-05_08-00-00_UTC_1.jpg"
//! tags:
//!   - "instagram"
//! instagram_url: "https://www.instagram.com/p/CxYz123/"
//! ---
//! Sunset at the pier #sea #summer #light
//! ```
//!
//! Every value is a double-quoted YAML string. Documents are rewritten on
//! every run; media files are copied only when the destination is missing.

use crate::types::RenderedPost;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const POSTS_DIR: &str = "content/posts";
pub const MEDIA_DIR: &str = "static/media";
/// Site-relative URL prefix of [`MEDIA_DIR`].
pub const MEDIA_URL_PREFIX: &str = "/media/";

const DELIMITER: &str = "---";

/// A front-matter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Ordered front-matter fields. Absent values are skipped on insert.
#[derive(Debug, Default)]
pub struct FrontMatter {
    fields: Vec<(&'static str, FieldValue)>,
}

impl FrontMatter {
    pub fn text(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.fields.push((key, FieldValue::Text(value.into())));
        self
    }

    pub fn optional(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.text(key, v);
        }
        self
    }

    pub fn list(&mut self, key: &'static str, values: &[String]) -> &mut Self {
        self.fields.push((key, FieldValue::List(values.to_vec())));
        self
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    /// Render as a delimited YAML block, including both `---` lines and a
    /// trailing newline.
    pub fn render(&self) -> String {
        let mut lines = vec![DELIMITER.to_string()];
        for (key, value) in &self.fields {
            match value {
                FieldValue::Text(text) => lines.push(format!("{key}: \"{}\"", yaml_escape(text))),
                FieldValue::List(items) => {
                    lines.push(format!("{key}:"));
                    lines.extend(items.iter().map(|it| format!("  - \"{}\"", yaml_escape(it))));
                }
            }
        }
        lines.push(DELIMITER.to_string());
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl From<&RenderedPost> for FrontMatter {
    fn from(post: &RenderedPost) -> Self {
        let mut fm = FrontMatter::default();
        fm.text("title", post.title.as_str())
            .text("date", post.date.as_str())
            .text("draft", bool_text(post.draft))
            .list("images", &post.images)
            .list("tags", &post.tags)
            .optional("author", post.author.as_deref())
            .optional("description", post.description.as_deref())
            .optional("location", post.location.as_deref())
            .optional("instagram_url", post.instagram_url.as_deref());
        fm
    }
}

/// `"True"` / `"False"`. Hugo parses either spelling of a quoted boolean.
fn bool_text(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Escape a string for a double-quoted YAML scalar.
pub fn yaml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Full document text: front matter, then the body and a newline if the
/// body is non-empty.
pub fn render_document(post: &RenderedPost) -> String {
    let mut doc = FrontMatter::from(post).render();
    if !post.body.is_empty() {
        doc.push_str(&post.body);
        doc.push('\n');
    }
    doc
}

/// Write `content/posts/<identifier>.md`, replacing any existing file.
pub fn write_post(out_dir: &Path, post: &RenderedPost) -> io::Result<PathBuf> {
    let posts_dir = out_dir.join(POSTS_DIR);
    fs::create_dir_all(&posts_dir)?;
    let path = posts_dir.join(format!("{}.md", post.identifier));
    fs::write(&path, render_document(post))?;
    Ok(path)
}

/// Result of copying one post's media.
#[derive(Debug, Default, PartialEq)]
pub struct MediaCopy {
    /// `/media/<file name>` for every file, in input order
    pub urls: Vec<String>,
    pub copied: usize,
    /// Destinations that already existed and were left alone
    pub skipped: usize,
}

/// Copy media into `static/media/`, skipping files already present.
pub fn copy_media(media: &[PathBuf], out_dir: &Path) -> io::Result<MediaCopy> {
    let media_dir = out_dir.join(MEDIA_DIR);
    fs::create_dir_all(&media_dir)?;

    let mut result = MediaCopy::default();
    for src in media {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = media_dir.join(name);
        if dest.exists() {
            result.skipped += 1;
        } else {
            fs::copy(src, &dest)?;
            result.copied += 1;
        }
        result
            .urls
            .push(format!("{MEDIA_URL_PREFIX}{}", name.to_string_lossy()));
    }
    Ok(result)
}
