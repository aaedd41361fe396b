//! Payload handed from the converter to the emitter.

/// Everything needed to write one post document.
///
/// Optional fields that are `None` are left out of the front matter rather
/// than written as empty values.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPost {
    /// File stem of the document: `<YYYYMMDD>-<slug>-<fingerprint>`
    pub identifier: String,
    /// First caption line, or the post key
    pub title: String,
    /// `YYYY-MM-DDTHH:MM:SS`, from the post key
    pub date: String,
    pub draft: bool,
    /// Site-relative media paths (`/media/<file name>`), in file name order
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    /// Cleaned caption, cut to the configured length
    pub description: Option<String>,
    pub location: Option<String>,
    /// Link back to the original post
    pub instagram_url: Option<String>,
    /// Cleaned caption
    pub body: String,
}
