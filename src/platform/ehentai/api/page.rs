//! `showpage` responses: the viewer page, as markup fragments in JSON.

use serde::Deserialize;

use crate::{
    platform::ehentai::{
        errors::{Error, PageKind, Within},
        gallery::{GalleryPage, page},
    },
    stdx::error::Assume,
};

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    error: Option<String>,
    /// Image block.
    #[serde(default)]
    i3: String,
    /// Reload link, carrying the skip key.
    #[serde(default)]
    i6: String,
    /// Original download link.
    #[serde(default)]
    i7: String,
}

pub(crate) fn parse(body: &str) -> Result<GalleryPage, Error> {
    let raw = serde_json::from_str::<RawPage>(body).within(PageKind::GalleryPageApi, body)?;

    if let Some(error) = raw.error {
        return Err(Error::ServerReportedError(error));
    }

    let image_url = page::image_url(&raw.i3)
        .filter(|url| !url.is_empty())
        .assumption("no `<img .. style>` image in `i3`")
        .within(PageKind::GalleryPageApi, body)?;

    Ok(GalleryPage {
        image_url,
        skip_hath_key: page::skip_hath_key(&raw.i6),
        original_image_url: page::original_image_url(&raw.i7),
        show_key: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_showpage_response() {
        let body = r##"{"p":2,"s":"s\/0123456789\/530350-2","n":"","i":"","k":"0123456789","i3":"<a onclick=\"return load_image(3, 'abcdef0123')\" href=\"https:\/\/e-hentai.org\/s\/abcdef0123\/530350-3\"><img id=\"img\" src=\"https:\/\/x.hath.network\/h\/a\/002.jpg\" style=\"height:1807px;width:1280px\" onerror=\"this.onerror=null; nl('1-2')\" \/><\/a>","i6":" &nbsp; <img src=\"https:\/\/ehgt.org\/g\/mr.gif\" class=\"mr\" \/> <a href=\"#\" id=\"loadfail\" onclick=\"return nl('27435-430638')\">Reload broken image<\/a>","i7":"","si":12345,"x":"1280","y":"1807"}"##;

        assert_eq!(
            Ok(GalleryPage {
                image_url: "https://x.hath.network/h/a/002.jpg".to_string(),
                skip_hath_key: Some("27435-430638".to_string()),
                original_image_url: None,
                show_key: None,
            }),
            parse(body)
        );
    }

    #[test]
    fn should_surface_error_field() {
        assert_eq!(
            Err(Error::ServerReportedError("Key mismatch".to_string())),
            parse(r#"{"error":"Key mismatch"}"#)
        );
    }

    #[test]
    fn should_require_image() {
        assert!(matches!(parse(r#"{"i3":"<a></a>"}"#), Err(Error::ParseFailure(_))));
        assert!(matches!(parse("not json"), Err(Error::ParseFailure(_))));
    }
}
