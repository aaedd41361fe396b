//! # insta-hugo
//!
//! Converts an Instaloader profile download into a Hugo content tree. The
//! download directory is the data source: files sharing a timestamp key form
//! one post, the post's JSON sidecar supplies caption and link, and every post
//! becomes a Markdown document with YAML front matter.
//!
//! # Pipeline
//!
//! One pass, one post at a time, newest first:
//!
//! ```text
//! src/                                 out/
//! 2024-03-05_08-00-00_UTC.json.xz ┐
//! 2024-03-05_08-00-00_UTC_1.jpg   ├─►  content/posts/20240305-sunset-1f3a9c0d.md
//! 2024-03-05_08-00-00_UTC_2.mp4   ┘    static/media/2024-03-05_08-00-00_UTC_{1,2}.*
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`key`] | Timestamp keys: recognition in file names, date formats |
//! | [`scan`] | Groups the source directory's files into posts, newest first |
//! | [`metadata`] | Reads plain or xz-compressed sidecars of any known shape |
//! | [`caption`] | Caption cleanup: hashtag thinning, trailing mention removal |
//! | [`slug`] | Titles, slugs and collision-free post identifiers |
//! | [`emit`] | Front matter rendering, document writing, media copying |
//! | [`convert`] | Drives the pipeline; dry-run planning for `check` |
//! | [`config`] | `insta-hugo.toml` loading, merging, and validation |
//! | [`types`] | The rendered post handed from [`convert`] to [`emit`] |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Stable Identifiers
//!
//! A post's file name is `<date>-<slug>-<fingerprint>`, where the fingerprint
//! is a hash of the timestamp key. Untitled posts and posts with identical
//! titles never collide, and re-running the converter rewrites the same files
//! instead of adding new ones.
//!
//! ## Documents Rewritten, Media Kept
//!
//! Documents are regenerated on every run so caption cleanup changes take
//! effect. Media files are copied only when missing; an existing file under
//! `static/media/` is never touched.
//!
//! ## Sidecar Shapes
//!
//! Instaloader has written sidecars with the post under a `node` key and
//! flat, and as single objects or lists. [`metadata`] normalizes all of them
//! to one [`metadata::PostMetadata`].

pub mod caption;
pub mod config;
pub mod convert;
pub mod emit;
pub mod key;
pub mod metadata;
pub mod output;
pub mod scan;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
