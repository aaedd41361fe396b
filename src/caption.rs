//! Caption cleanup for post bodies and descriptions.
//!
//! Instagram captions tend to end in walls of hashtags and a credit handle.
//! Each line is cleaned independently:
//!
//! ```text
//! hello #a #b #c #d #e world   →  hello world #a #b #c
//! great day @someuser          →  great day
//! #a #b #c #d                  →  #a #b #c
//! (blank line)                 →  (dropped)
//! ```
//!
//! Cleaning is idempotent: a cleaned caption passes through unchanged.

use regex::Regex;
use std::sync::LazyLock;

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"));

static TRAILING_MENTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s*@\w+)+\s*$").expect("mention pattern is valid"));

/// Hashtags kept on a line that has more than this many.
pub const MAX_HASHTAGS: usize = 3;

/// Clean a caption line by line. Blank results are dropped and the survivors
/// joined with `\n`.
pub fn clean_caption(caption: &str) -> String {
    caption
        .lines()
        .filter_map(clean_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let line = thin_hashtags(line);
    let line = TRAILING_MENTIONS.replace(&line, "");

    if line.is_empty() {
        None
    } else {
        Some(line.into_owned())
    }
}

/// Keep the first [`MAX_HASHTAGS`] hashtags of an over-tagged line and move
/// them after the remaining text. Lines at or under the limit are untouched.
fn thin_hashtags(line: &str) -> String {
    let tags: Vec<&str> = HASHTAG.find_iter(line).map(|m| m.as_str()).collect();
    if tags.len() <= MAX_HASHTAGS {
        return line.to_string();
    }

    let rest = HASHTAG.replace_all(line, "");
    let words: Vec<&str> = rest.split_whitespace().collect();

    words
        .into_iter()
        .chain(tags.into_iter().take(MAX_HASHTAGS))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
