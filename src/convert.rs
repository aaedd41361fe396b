//! The conversion pipeline.
//!
//! Runs once over the whole source directory, one post at a time, newest
//! first:
//!
//! ```text
//! find_posts ──► per group: read_sidecar ──► derive_title / post_identifier
//!                          ──► copy_media ──► clean_caption ──► write_post
//! ```
//!
//! [`plan`] stops before anything is written and backs the `check` command.
//!
//! ## Failure policy
//!
//! Groups without media are dropped silently. A sidecar that can't be read
//! aborts the run unless `metadata.skip_invalid` is set, in which case the
//! post is skipped and reported.

use crate::caption::{clean_caption, truncate_chars};
use crate::config::Config;
use crate::emit::{self, MediaCopy};
use crate::key::{KeyError, PostKey};
use crate::metadata::{self, MetadataError, PostMetadata};
use crate::scan::{self, PostGroup, ScanError};
use crate::slug;
use crate::types::RenderedPost;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Per-run settings that don't belong in the config file.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Written as `author:` when non-empty.
    pub author: Option<String>,
}

/// Why a group produced no document.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoMedia,
    InvalidMetadata(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGroup {
    pub key: PostKey,
    pub reason: SkipReason,
}

/// A post with everything resolved except its output files.
#[derive(Debug, Clone)]
pub struct PlannedPost {
    pub key: PostKey,
    pub identifier: String,
    pub title: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub date: String,
    pub meta_file: Option<PathBuf>,
    pub media: Vec<PathBuf>,
    pub metadata: PostMetadata,
    /// Raw caption: the sidecar's, or the key-named `.txt` file's.
    pub caption: String,
}

/// Outcome of planning one group.
#[derive(Debug)]
pub enum Planned {
    Post(Box<PlannedPost>),
    Skipped(SkippedGroup),
}

#[derive(Debug, Default)]
pub struct Plan {
    pub posts: Vec<PlannedPost>,
    pub skipped: Vec<SkippedGroup>,
}

/// One document written by [`convert`].
#[derive(Debug, Clone)]
pub struct WrittenPost {
    pub key: PostKey,
    pub identifier: String,
    pub title: String,
    pub path: PathBuf,
    pub images: Vec<String>,
    pub media_copied: usize,
    pub media_skipped: usize,
}

#[derive(Debug, Default)]
pub struct ConvertReport {
    pub written: Vec<WrittenPost>,
    pub skipped: Vec<SkippedGroup>,
}

impl ConvertReport {
    /// Documents generated or updated.
    pub fn count(&self) -> usize {
        self.written.len()
    }

    pub fn media_copied(&self) -> usize {
        self.written.iter().map(|p| p.media_copied).sum()
    }

    pub fn media_skipped(&self) -> usize {
        self.written.iter().map(|p| p.media_skipped).sum()
    }
}

/// Resolve every post in `src` without writing anything.
pub fn plan(src: &Path, config: &Config) -> Result<Plan, ConvertError> {
    let mut result = Plan::default();
    for (key, group) in scan::find_posts(src, &config.media)? {
        match plan_post(src, key, group, config)? {
            Planned::Post(post) => result.posts.push(*post),
            Planned::Skipped(skipped) => result.skipped.push(skipped),
        }
    }
    Ok(result)
}

/// Convert `src` into a Hugo content tree under `out`.
pub fn convert(
    src: &Path,
    out: &Path,
    options: &ConvertOptions,
    config: &Config,
) -> Result<ConvertReport, ConvertError> {
    let mut report = ConvertReport::default();

    for (key, group) in scan::find_posts(src, &config.media)? {
        let post = match plan_post(src, key, group, config)? {
            Planned::Post(post) => post,
            Planned::Skipped(skipped) => {
                report.skipped.push(skipped);
                continue;
            }
        };

        let copy = emit::copy_media(&post.media, out)?;
        let rendered = render_post(&post, &copy, options, config);
        let path = emit::write_post(out, &rendered)?;
        info!(
            identifier = %rendered.identifier,
            media = rendered.images.len(),
            copied = copy.copied,
            "wrote post"
        );

        report.written.push(WrittenPost {
            key: post.key,
            identifier: rendered.identifier,
            title: rendered.title,
            path,
            images: rendered.images,
            media_copied: copy.copied,
            media_skipped: copy.skipped,
        });
    }

    Ok(report)
}

/// Read, title and name one group.
pub fn plan_post(
    src: &Path,
    key: PostKey,
    group: PostGroup,
    config: &Config,
) -> Result<Planned, ConvertError> {
    if !group.has_media() {
        debug!(key = %key, "no media, dropping group");
        return Ok(Planned::Skipped(SkippedGroup {
            key,
            reason: SkipReason::NoMedia,
        }));
    }

    let metadata = match metadata::read_sidecar(group.meta.as_deref()) {
        Ok(m) => m,
        Err(e) if config.metadata.skip_invalid => {
            warn!(key = %key, error = %e, "skipping post with unreadable metadata");
            return Ok(Planned::Skipped(SkippedGroup {
                key,
                reason: SkipReason::InvalidMetadata(e.to_string()),
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let key_text = metadata::read_text_fallback(&src.join(format!("{key}.txt")))?;

    let title = slug::derive_title(
        &metadata.caption,
        key_text.as_deref(),
        &key,
        config.front_matter.title_max_chars,
    );
    let identifier = slug::post_identifier(&key, &title)?;
    let date = key.iso_date()?;

    let caption = if metadata.caption.is_empty() {
        key_text.unwrap_or_default()
    } else {
        metadata.caption.clone()
    };

    Ok(Planned::Post(Box::new(PlannedPost {
        key,
        identifier,
        title,
        date,
        meta_file: group.meta,
        media: group.media,
        metadata,
        caption,
    })))
}

/// Build the emitter payload. Title comes from the raw caption; body and
/// description from the cleaned one.
pub fn render_post(
    post: &PlannedPost,
    copy: &MediaCopy,
    options: &ConvertOptions,
    config: &Config,
) -> RenderedPost {
    let fm = &config.front_matter;
    let body = clean_caption(&post.caption);
    let description = truncate_chars(&body, fm.description_max_chars);

    RenderedPost {
        identifier: post.identifier.clone(),
        title: post.title.clone(),
        date: post.date.clone(),
        draft: false,
        images: copy.urls.clone(),
        tags: fm.tags.clone(),
        author: options.author.clone().filter(|a| !a.is_empty()),
        description: (!description.is_empty()).then(|| description.to_string()),
        location: post.metadata.location.clone(),
        instagram_url: post
            .metadata
            .external_id
            .as_ref()
            .map(|id| format!("{}{}/", fm.post_url_base, id)),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    const NEW: &str = "2024-06-01_10-00-00_UTC";
    const OLD: &str = "2024-01-01_10-00-00_UTC";

    fn run(src: &Path, out: &Path) -> ConvertReport {
        convert(src, out, &ConvertOptions::default(), &Config::default()).unwrap()
    }

    // =========================================================================
    // Ordering and dropping
    // =========================================================================

    #[test]
    fn posts_written_newest_first() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{OLD}.jpg"));
        write_media(src.path(), &format!("{NEW}.jpg"));

        let report = run(src.path(), out.path());
        let keys: Vec<&str> = report.written.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec![NEW, OLD]);
    }

    #[test]
    fn metadata_only_group_not_emitted() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(src.path(), &format!("{OLD}.json"), &node_sidecar("Lonely", "L1", 1));

        let report = run(src.path(), out.path());
        assert_eq!(report.count(), 1);
        assert_eq!(
            report.skipped,
            vec![SkippedGroup {
                key: crate::key::key(OLD),
                reason: SkipReason::NoMedia
            }]
        );
        let docs = fs::read_dir(out.path().join("content/posts")).unwrap().count();
        assert_eq!(docs, 1);
    }

    // =========================================================================
    // Titles, captions and fallbacks
    // =========================================================================

    #[test]
    fn metadata_free_carousel_titled_by_key() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let key = "2024-03-05_08-00-00_UTC";
        write_media(src.path(), &format!("{key}_2.jpg"));
        write_media(src.path(), &format!("{key}_1.jpg"));

        let report = run(src.path(), out.path());
        let post = find_written(&report, key);

        assert_eq!(post.title, key);
        assert!(post.identifier.starts_with("20240305-2024-03-05_08-00-00_utc-"));
        assert_eq!(
            post.images,
            vec![
                format!("/media/{key}_1.jpg"),
                format!("/media/{key}_2.jpg"),
            ]
        );
    }

    #[test]
    fn key_named_text_file_supplies_title_and_body() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_text(src.path(), &format!("{NEW}.txt"), "Morning swim\nCold water @coach\n");

        let report = run(src.path(), out.path());
        let post = find_written(&report, NEW);
        assert_eq!(post.title, "Morning swim");

        let doc = read_post(out.path(), &post.identifier);
        assert!(doc.ends_with("---\nMorning swim\nCold water\n"));
        assert!(doc.contains("description: \"Morning swim\\nCold water\"\n"));
    }

    #[test]
    fn title_raw_body_cleaned() {
        let src = TempDir::new().unwrap();
        let config = Config::default();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(
            src.path(),
            &format!("{NEW}.json"),
            &node_sidecar("Beach day #a #b #c #d @me", "SC1", 1),
        );

        let plan = plan(src.path(), &config).unwrap();
        let post = &plan.posts[0];
        assert_eq!(post.title, "Beach day #a #b #c #d @me");

        let opts = ConvertOptions::default();
        let rendered = render_post(post, &MediaCopy::default(), &opts, &config);
        assert_eq!(rendered.body, "Beach day @me #a #b #c");
        assert_eq!(rendered.description.as_deref(), Some("Beach day @me #a #b #c"));
        assert_eq!(
            rendered.instagram_url.as_deref(),
            Some("https://www.instagram.com/p/SC1/")
        );
    }

    #[test]
    fn description_truncated_and_absent_when_empty() {
        let src = TempDir::new().unwrap();
        let config = Config::default();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(src.path(), &format!("{NEW}.json"), &node_sidecar(&"x".repeat(500), "A", 1));
        write_media(src.path(), &format!("{OLD}.jpg"));

        let plan = plan(src.path(), &config).unwrap();
        let opts = ConvertOptions::default();

        let long = render_post(&plan.posts[0], &MediaCopy::default(), &opts, &config);
        assert_eq!(long.description.unwrap().chars().count(), 160);

        let empty = render_post(&plan.posts[1], &MediaCopy::default(), &opts, &config);
        assert_eq!(empty.description, None);
        assert_eq!(empty.instagram_url, None);
        assert_eq!(empty.body, "");
    }

    #[test]
    fn empty_author_omitted() {
        let post = PlannedPost {
            key: crate::key::key(NEW),
            identifier: "id".into(),
            title: "t".into(),
            date: "d".into(),
            meta_file: None,
            media: vec![],
            metadata: PostMetadata::default(),
            caption: String::new(),
        };
        let config = Config::default();
        let copy = MediaCopy::default();

        let blank = ConvertOptions {
            author: Some(String::new()),
        };
        assert_eq!(render_post(&post, &copy, &blank, &config).author, None);

        let named = ConvertOptions {
            author: Some("Dmitrii".into()),
        };
        assert_eq!(
            render_post(&post, &copy, &named, &config).author.as_deref(),
            Some("Dmitrii")
        );
    }

    // =========================================================================
    // Failure policy
    // =========================================================================

    #[test]
    fn invalid_metadata_aborts_by_default() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(src.path(), &format!("{NEW}.json"), "{broken");

        let opts = ConvertOptions::default();
        let result = convert(src.path(), out.path(), &opts, &Config::default());
        assert!(matches!(
            result,
            Err(ConvertError::Metadata(MetadataError::Json { .. }))
        ));
    }

    #[test]
    fn invalid_metadata_skipped_when_configured() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(src.path(), &format!("{NEW}.json"), "{broken");
        write_media(src.path(), &format!("{OLD}.jpg"));

        let mut config = Config::default();
        config.metadata.skip_invalid = true;

        let opts = ConvertOptions::default();
        let report = convert(src.path(), out.path(), &opts, &config).unwrap();
        assert_eq!(report.count(), 1);
        assert_eq!(report.written[0].key.as_str(), OLD);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::InvalidMetadata(_)
        ));
    }

    // =========================================================================
    // Re-runs
    // =========================================================================

    #[test]
    fn rerun_skips_existing_media() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}_1.jpg"));
        write_media(src.path(), &format!("{NEW}_2.jpg"));

        let first = run(src.path(), out.path());
        assert_eq!(first.media_copied(), 2);
        assert_eq!(first.media_skipped(), 0);

        let second = run(src.path(), out.path());
        assert_eq!(second.media_copied(), 0);
        assert_eq!(second.media_skipped(), 2);
        assert_eq!(first.written[0].identifier, second.written[0].identifier);
    }

    #[test]
    fn rerun_reproduces_document_bytes() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_media(src.path(), &format!("{NEW}.jpg"));
        write_json(
            src.path(),
            &format!("{NEW}.json"),
            &node_sidecar("Line one\nline #a #b #c #d @x", "SC", 1),
        );
        write_media(src.path(), &format!("{OLD}.jpg"));

        let first = run(src.path(), out.path());
        let before: Vec<String> = first
            .written
            .iter()
            .map(|p| read_post(out.path(), &p.identifier))
            .collect();

        let second = run(src.path(), out.path());
        let after: Vec<String> = second
            .written
            .iter()
            .map(|p| read_post(out.path(), &p.identifier))
            .collect();
        assert_eq!(before, after);
    }
}
