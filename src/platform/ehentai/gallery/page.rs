//! The image viewer page, `/s/<page token>/<gid>-<page>`.

use serde::{Deserialize, Serialize};

use crate::{
    platform::ehentai::errors::{Error, PageKind, Within},
    stdx::{
        error::{Assume, Assumption},
        lazy::regex,
        text,
    },
};

/// What the viewer needs to show one page and to move on from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPage {
    /// The image as served to this viewer.
    pub image_url: String,
    /// Key for asking for this image from another H@H node.
    pub skip_hath_key: Option<String>,
    /// Link to the original file, when the resampled image is not the original.
    pub original_image_url: Option<String>,
    /// Key for the `showpage` API. Only the HTML page carries it.
    pub show_key: Option<String>,
}

pub(crate) fn parse(body: &str) -> Result<GalleryPage, Error> {
    from_body(body).within(PageKind::GalleryPage, body)
}

fn from_body(body: &str) -> Result<GalleryPage, Assumption> {
    let image_url = image_url(body)
        .filter(|url| !url.is_empty())
        .assumption("no `<img .. style>` image on viewer page")?;

    let show_key = regex!(r#"var showkey="([0-9a-z]+)";"#)
        .captures(body)
        .map(|captures| captures[1].to_owned())
        .assumption("no `showkey` script variable on viewer page")?;

    Ok(GalleryPage {
        image_url,
        skip_hath_key: skip_hath_key(body),
        original_image_url: original_image_url(body),
        show_key: Some(show_key),
    })
}

pub(crate) fn image_url(markup: &str) -> Option<String> {
    regex!(r#"<img[^>]*src="([^"]+)" style"#)
        .captures(markup)
        .map(|captures| text::trim(&captures[1]))
}

pub(crate) fn skip_hath_key(markup: &str) -> Option<String> {
    regex!(r#"onclick="return nl\('([^)]+)'\)"#)
        .captures(markup)
        .map(|captures| text::trim(&captures[1]))
}

pub(crate) fn original_image_url(markup: &str) -> Option<String> {
    regex!(r#"<a href="([^"]+)fullimg\.php([^"]+)">"#)
        .captures(markup)
        .map(|captures| {
            format!(
                "{}fullimg.php{}",
                html_escape::decode_html_entities(&captures[1]),
                html_escape::decode_html_entities(&captures[2])
            )
        })
}
