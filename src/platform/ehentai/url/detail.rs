use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stdx::lazy::regex;

/// A gallery's `(gid, token)` pair, as found in `/g/<gid>/<token>/` links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryDetailUrl {
    #[allow(missing_docs)]
    pub gid: u64,
    #[allow(missing_docs)]
    pub token: String,
}

impl GalleryDetailUrl {
    /// Finds a gallery link in `url`.
    ///
    /// ```
    /// # use ehparse::platform::ehentai::url::GalleryDetailUrl;
    /// let url = GalleryDetailUrl::parse("https://exhentai.org/g/530350/8b3c7e4a21/", true);
    /// assert_eq!(Some(530_350), url.map(|url| url.gid));
    ///
    /// assert!(GalleryDetailUrl::parse("530350/8b3c7e4a21", true).is_none());
    /// assert!(GalleryDetailUrl::parse("530350/8b3c7e4a21", false).is_some());
    /// ```
    #[must_use]
    pub fn parse(url: &str, strict: bool) -> Option<Self> {
        let captures = if strict {
            regex!(r"https?://(?:exhentai\.org|e-hentai\.org|lofi\.e-hentai\.org)/(?:g|mpv)/(\d+)/([0-9a-f]{10})")
                .captures(url)?
        } else {
            regex!(r"(\d+)/([0-9a-f]{10})(?:[^0-9a-f]|$)").captures(url)?
        };

        Some(Self {
            gid: captures[1].parse().ok()?,
            token: captures[2].to_owned(),
        })
    }
}

/// The canonical detail page link.
impl fmt::Display for GalleryDetailUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://e-hentai.org/g/{}/{}/", self.gid, self.token)
    }
}
