//! The archive download popup, `/archiver.php`, and the pages it leads to.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::Document;
use crate::stdx::{
    dom,
    error::{Assume, Assumption},
    fallback::BestEffort,
    lazy::{regex, selector},
    text,
};

/// An H@H download option: a resolution code (`780`, `1280`, ..., or `org`) and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOption {
    #[allow(missing_docs)]
    pub resolution: String,
    #[allow(missing_docs)]
    pub name: String,
}

/// The H@H download form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveForm {
    /// The `or` parameter the form posts back; empty when the form is missing.
    pub or: String,
    #[allow(missing_docs)]
    pub options: Vec<ArchiveOption>,
}

/// Costs of the two archive flavors and where to request them.
///
/// Read on a best-effort basis: fields the page does not have stay empty.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archiver {
    pub funds: String,
    pub original_cost: String,
    pub original_size: String,
    pub original_url: String,
    pub resample_cost: String,
    pub resample_size: String,
    pub resample_url: String,
}

pub(crate) fn parse_form(body: &str) -> ArchiveForm {
    let Some(captures) =
        regex!(r#"<form id="hathdl_form" action="[^"]*?or=([^="]*?)" method="post">"#).captures(body)
    else {
        debug!("no `hathdl_form` on archive page");
        return ArchiveForm::default();
    };

    let options = regex!(r#"<a href="[^"]*" onclick="return do_hathdl\('([0-9]+|org)'\)">([^<]+)</a>"#)
        .captures_iter(body)
        .map(|option| ArchiveOption {
            resolution: text::trim(&option[1]),
            name: text::trim(&option[2]),
        })
        .collect();

    ArchiveForm {
        or: captures[1].to_owned(),
        options,
    }
}

pub(crate) fn parse_archiver(body: &str) -> Archiver {
    let document = Document::new(body);
    archiver(document.html().root_element()).or_default_for("archiver")
}

/// The first block of the page body holds the funds line, then the two flavors side by side.
fn archiver(root: ElementRef<'_>) -> Result<Archiver, Assumption> {
    let block = root
        .select(selector!("body"))
        .next()
        .and_then(|body| dom::child(body, 0))
        .assumption("archiver page body is empty")?;

    let funds = dom::child(block, 2).assumption("archiver page has no funds line")?;
    let flavors = dom::child(block, 3).assumption("archiver page has no flavors")?;
    let original = dom::child(flavors, 0).assumption("archiver page has no original flavor")?;
    let resample = dom::child(flavors, 1).assumption("archiver page has no resample flavor")?;

    let (original_cost, original_size, original_url) = flavor(original)?;
    let (resample_cost, resample_size, resample_url) = flavor(resample)?;

    Ok(Archiver {
        funds: dom::text(funds),
        original_cost,
        original_size,
        original_url,
        resample_cost,
        resample_size,
        resample_url,
    })
}

/// Cost, then the request form, then the size.
fn flavor(element: ElementRef<'_>) -> Result<(String, String, String), Assumption> {
    let cost = dom::child(element, 0)
        .and_then(|cost| dom::child(cost, 0))
        .assumption("archive flavor has no cost")?;
    let form = dom::child(element, 1).assumption("archive flavor has no form")?;
    let size = dom::child(element, 2)
        .and_then(|size| dom::child(size, 0))
        .assumption("archive flavor has no size")?;

    Ok((
        dom::text(cost),
        dom::text(size),
        dom::attr(form, "action").unwrap_or_default().to_owned(),
    ))
}

pub(crate) fn parse_download_url(body: &str) -> Option<String> {
    regex!(r#"href="(.*)">Click Here To Start Downloading"#)
        .captures(body)
        .map(|captures| html_escape::decode_html_entities(&captures[1]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_form_options() {
        let body = r##"<form id="hathdl_form" action="https://e-hentai.org/archiver.php?gid=530350&amp;token=8b3c7e4a21&amp;or=441151--0f4f5bd05e3b" method="post"><input type="hidden" name="hathdl_xres" value="" /></form><table><tr><td><p><a href="#" onclick="return do_hathdl('780')">780x</a></p></td><td><p><a href="#" onclick="return do_hathdl('org')">Original</a></p></td></tr></table>"##;

        assert_eq!(
            ArchiveForm {
                or: "441151--0f4f5bd05e3b".to_string(),
                options: vec![
                    ArchiveOption {
                        resolution: "780".to_string(),
                        name: "780x".to_string(),
                    },
                    ArchiveOption {
                        resolution: "org".to_string(),
                        name: "Original".to_string(),
                    },
                ],
            },
            parse_form(body)
        );
        assert_eq!(ArchiveForm::default(), parse_form("<p>no form</p>"));
    }

    #[test]
    fn should_parse_archiver_page() {
        let body = r#"<html><head></head><body><div id="db"><h1>Archive Download</h1><div>Select an archive.</div><p>Your funds: 1,234 GP</p><div><div style="float:left"><div><strong>Download Cost: 50 GP</strong></div><form action="https://e-hentai.org/archiver.php?gid=1&amp;token=2&amp;or=3" method="post"><input type="hidden" name="dltype" value="org" /></form><p>Estimated Size: <strong>41.22 MiB</strong></p></div><div style="float:right"><div><strong>Download Cost: Free!</strong></div><form action="https://e-hentai.org/archiver.php?gid=1&amp;token=2&amp;or=4" method="post"><input type="hidden" name="dltype" value="res" /></form><p>Estimated Size: <strong>12.01 MiB</strong></p></div></div></div></body></html>"#;

        assert_eq!(
            Archiver {
                funds: "Your funds: 1,234 GP".to_string(),
                original_cost: "Download Cost: 50 GP".to_string(),
                original_size: "41.22 MiB".to_string(),
                original_url: "https://e-hentai.org/archiver.php?gid=1&token=2&or=3".to_string(),
                resample_cost: "Download Cost: Free!".to_string(),
                resample_size: "12.01 MiB".to_string(),
                resample_url: "https://e-hentai.org/archiver.php?gid=1&token=2&or=4".to_string(),
            },
            parse_archiver(body)
        );
    }

    #[test]
    fn should_default_unreadable_archiver_page() {
        assert_eq!(Archiver::default(), parse_archiver("<html><body><p>Insufficient funds.</p></body></html>"));
    }

    #[test]
    fn should_find_download_url() {
        assert_eq!(
            Some("https://abc.hath.network/archive/1/2/3/4?start=1".to_string()),
            parse_download_url(r#"<p id="continue"><a href="https://abc.hath.network/archive/1/2/3/4?start=1">Click Here To Start Downloading</a></p>"#)
        );
        assert_eq!(None, parse_download_url("<p>Please wait...</p>"));
    }
}
