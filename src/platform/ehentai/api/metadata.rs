//! `gdata` responses, used to refresh listings with authoritative metadata.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    platform::ehentai::{
        errors::{Error, PageKind, Within},
        meta::Category,
        parser::Parser,
    },
    stdx::{
        serde::{u32_from_string, u64_from_string},
        text,
    },
};

/// Authoritative metadata for one gallery, to be laid over a parsed summary with
/// [`GallerySummary::patched`](crate::platform::ehentai::gallery::GallerySummary::patched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataPatch {
    #[allow(missing_docs)]
    pub gid: u64,
    #[allow(missing_docs)]
    pub title: String,
    #[allow(missing_docs)]
    pub title_jpn: Option<String>,
    #[allow(missing_docs)]
    pub category: Category,
    /// Thumbnail, with the configured resolution applied.
    pub thumb: String,
    #[allow(missing_docs)]
    pub uploader: String,
    /// Upload time, formatted with the configured date policy.
    pub posted: Option<String>,
    /// `None` when the API rating is not a number.
    pub rating: Option<f32>,
    /// `namespace:tag` pairs, in API order.
    pub simple_tags: Vec<String>,
    #[allow(missing_docs)]
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
struct Response {
    gmetadata: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(deserialize_with = "u64_from_string")]
    gid: u64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_jpn: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    thumb: String,
    #[serde(default)]
    uploader: String,
    #[serde(default)]
    posted: String,
    #[serde(default, deserialize_with = "u32_from_string")]
    filecount: u32,
    #[serde(default)]
    rating: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Patches for every entry that is not an error entry, in response order.
pub(crate) fn parse(parser: &Parser, body: &str) -> Result<Vec<MetadataPatch>, Error> {
    let response = serde_json::from_str::<Response>(body).within(PageKind::GalleryMetadataApi, body)?;

    let patches = response
        .gmetadata
        .into_iter()
        .filter_map(|entry| {
            if let Some(error) = entry.error {
                debug!(gid = entry.gid, error = %error, "skipping metadata error entry");
                return None;
            }

            let posted = text::trim(&entry.posted)
                .parse::<i64>()
                .ok()
                .and_then(|seconds| parser.date_policy().format_posted(seconds));

            Some(MetadataPatch {
                gid: entry.gid,
                title: text::trim(&entry.title),
                title_jpn: Some(text::trim(&entry.title_jpn)).filter(|title| !title.is_empty()),
                category: Category::resolve(&entry.category),
                thumb: parser.thumb(&entry.thumb),
                uploader: entry.uploader,
                posted,
                rating: text::trim(&entry.rating).parse().ok(),
                simple_tags: entry.tags,
                pages: entry.filecount,
            })
        })
        .collect();

    Ok(patches)
}
