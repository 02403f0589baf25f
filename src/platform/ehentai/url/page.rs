use serde::{Deserialize, Serialize};

use crate::stdx::lazy::regex;

/// An image viewer link, `/s/<page token>/<gid>-<page>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryPageUrl {
    #[allow(missing_docs)]
    pub gid: u64,
    /// Token of this page, not of the gallery.
    pub page_token: String,
    /// Zero-based page index.
    pub page: u32,
}

impl GalleryPageUrl {
    /// Finds an image viewer link in `url`.
    #[must_use]
    pub fn parse(url: &str, strict: bool) -> Option<Self> {
        let captures = if strict {
            regex!(r"https?://(?:exhentai\.org|e-hentai\.org|lofi\.e-hentai\.org)/s/([0-9a-f]{10})/(\d+)-(\d+)")
                .captures(url)?
        } else {
            regex!(r"([0-9a-f]{10})/(\d+)-(\d+)").captures(url)?
        };

        let page = captures[3].parse::<u32>().ok()?.checked_sub(1)?;

        Some(Self {
            gid: captures[2].parse().ok()?,
            page_token: captures[1].to_owned(),
            page,
        })
    }
}
