//! CLI output formatting for `convert` and `check`.
//!
//! Output is **post-centric**: every post leads with its position and title,
//! with identifiers and source files shown as indented context lines.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! 001 Sunset at the pier → content/posts/20240305-sunset-at-the-pier-1f3a9c0d.md
//!     2 media (1 copied, 1 already present)
//! 002 2024-01-01_10-00-00_UTC → content/posts/20240101-2024-01-01_10-00-00_utc-9b2e41aa.md
//!     1 media (1 copied)
//!
//! Skipped
//!     2023-12-31_09-00-00_UTC: unreadable metadata (...)
//!
//! Done. Generated/updated 2 posts.
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 Sunset at the pier (2 media)
//!     Identifier: 20240305-sunset-at-the-pier-1f3a9c0d
//!     Date: 2024-03-05T08:00:00
//!     Metadata: 2024-03-05_08-00-00_UTC.json.xz
//!     Media: 2024-03-05_08-00-00_UTC_1.jpg (image)
//!     Media: 2024-03-05_08-00-00_UTC_2.mp4 (video)
//!     Caption: Sunset at the pier #sea #summer #light
//!
//! Skipped
//!     2024-01-01_10-00-00_UTC: no media
//!
//! 1 post would be written, 1 group skipped
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::config::MediaConfig;
use crate::convert::{ConvertReport, Plan, SkipReason, SkippedGroup};
use crate::emit::POSTS_DIR;
use crate::scan::{self, FileKind};
use std::path::Path;

/// Caption preview length in `check` output.
const CAPTION_PREVIEW_CHARS: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a post header: positional index + title, with optional media count.
fn post_header(index: usize, title: &str, media: Option<usize>) -> String {
    match media {
        Some(n) => format!("{} {} ({} media)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

/// First line of `text`, cut to `max` characters with `...` appended if cut.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    match line.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `name.jpg (image)`; the kind is left off if the name no longer classifies
/// as media under `media`.
fn media_line(path: &Path, media: &MediaConfig) -> String {
    let name = file_name(path);
    match scan::classify(&name, media) {
        FileKind::Media(kind) => format!("{} ({})", name, kind.label()),
        _ => name,
    }
}

fn skip_line(skipped: &SkippedGroup) -> String {
    let reason = match &skipped.reason {
        SkipReason::NoMedia => "no media".to_string(),
        SkipReason::InvalidMetadata(err) => format!("unreadable metadata ({err})"),
    };
    format!("{}{}: {}", indent(1), skipped.key, reason)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the result of a conversion run.
///
/// Groups dropped for lacking media are not listed; only groups skipped for
/// unreadable metadata are.
pub fn format_convert_output(report: &ConvertReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, post) in report.written.iter().enumerate() {
        lines.push(format!(
            "{} → {}/{}.md",
            post_header(i + 1, &post.title, None),
            POSTS_DIR,
            post.identifier
        ));
        let media = post.images.len();
        let detail = match (post.media_copied, post.media_skipped) {
            (c, 0) => format!("{} ({} copied)", media_count(media), c),
            (0, s) => format!("{} ({} already present)", media_count(media), s),
            (c, s) => format!("{} ({} copied, {} already present)", media_count(media), c, s),
        };
        lines.push(format!("{}{}", indent(1), detail));
    }

    let invalid: Vec<&SkippedGroup> = report
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::InvalidMetadata(_)))
        .collect();
    if !invalid.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        lines.extend(invalid.into_iter().map(skip_line));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Done. Generated/updated {} posts.", report.count()));
    lines
}

fn media_count(n: usize) -> String {
    format!("{n} media")
}

pub fn print_convert_output(report: &ConvertReport) {
    for line in format_convert_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a dry-run plan: what `convert` would write, and what it would skip.
pub fn format_check_output(plan: &Plan, media: &MediaConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, post) in plan.posts.iter().enumerate() {
        lines.push(post_header(i + 1, &post.title, Some(post.media.len())));
        lines.push(format!("{}Identifier: {}", indent(1), post.identifier));
        lines.push(format!("{}Date: {}", indent(1), post.date));
        if let Some(meta) = &post.meta_file {
            lines.push(format!("{}Metadata: {}", indent(1), file_name(meta)));
        }
        for path in &post.media {
            lines.push(format!("{}Media: {}", indent(1), media_line(path, media)));
        }
        if !post.caption.trim().is_empty() {
            lines.push(format!(
                "{}Caption: {}",
                indent(1),
                preview(&post.caption, CAPTION_PREVIEW_CHARS)
            ));
        }
    }

    if !plan.skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Skipped".to_string());
        lines.extend(plan.skipped.iter().map(skip_line));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let verb = if plan.posts.len() == 1 {
        "post would be"
    } else {
        "posts would be"
    };
    lines.push(format!(
        "{} {} written, {} skipped",
        plan.posts.len(),
        verb,
        plural(plan.skipped.len(), "group")
    ));
    lines
}

pub fn print_check_output(plan: &Plan, media: &MediaConfig) {
    for line in format_check_output(plan, media) {
        println!("{}", line);
    }
}
