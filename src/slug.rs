//! Post titles and identifiers.
//!
//! Every post gets an identifier that is readable, filesystem-safe, and
//! stable across runs:
//!
//! ```text
//! 20240305-sunset-at-the-pier-1f3a9c0d
//! ^^^^^^^^ ^^^^^^^^^^^^^^^^^^ ^^^^^^^^
//! date     title slug         SHA-256(key)[..8]
//! ```
//!
//! The fingerprint depends on the post key alone, so two posts whose titles
//! reduce to the same slug (both untitled, say) still get distinct
//! identifiers, and re-running the converter reproduces the same names.

use crate::caption::truncate_chars;
use crate::key::{KeyError, PostKey};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Slug used when nothing of the title survives.
const EMPTY_SLUG: &str = "post";

/// Hex characters of the key digest kept in the identifier.
const FINGERPRINT_LEN: usize = 8;

/// Display title for a post.
///
/// Takes the first line of the raw caption, or of `fallback` when that line
/// is empty, trims it and cuts it to `max_chars` characters. Falls back to the
/// key itself when nothing is left.
pub fn derive_title(
    caption: &str,
    fallback: Option<&str>,
    key: &PostKey,
    max_chars: usize,
) -> String {
    let mut source = first_line(caption);
    if source.is_empty() {
        source = fallback.map(first_line).unwrap_or_default();
    }

    let title = truncate_chars(source.trim(), max_chars);
    if title.is_empty() {
        key.as_str().to_string()
    } else {
        title.to_string()
    }
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

/// URL-safe slug of a title.
///
/// Drops emoji and other non-letter symbols, transliterates the rest to
/// ASCII, lowercases, keeps only `[a-z0-9-_ .]`, turns whitespace runs into
/// single dashes, then trims dashes and dots from both ends. An empty result
/// becomes `post`.
pub fn slugify(title: &str) -> String {
    // deunicode spells pictographs out as words ("🌅" -> "sunrise")
    let letters: String = title
        .chars()
        .filter(|c| c.is_ascii() || c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let ascii = deunicode::deunicode_with_tofu(&letters, "").to_lowercase();
    let kept: String = ascii.chars().filter(|c| is_slug_char(*c)).collect();

    let dashed = WHITESPACE_RUN.replace_all(&kept, "-");
    let slug = dashed.trim_matches('-').trim_matches('.');

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | ' ' | '.')
}

/// First eight hex characters of SHA-256 over the key's bytes.
pub fn fingerprint(key: &PostKey) -> String {
    let digest = Sha256::digest(key.as_str().as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// `<YYYYMMDD>-<slug>-<fingerprint>`
pub fn post_identifier(key: &PostKey, title: &str) -> Result<String, KeyError> {
    Ok(format!(
        "{}-{}-{}",
        key.compact_date()?,
        slugify(title),
        fingerprint(key)
    ))
}
