//! Preview thumbnails of a gallery's first preview page.
//!
//! The site serves either one thumbnail per page, or sprite sheets that the renderer
//! crops. Both come out as an index-addressable [`PreviewSet`].

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::{
    platform::ehentai::{
        errors::{Error, PageKind, Within},
        parser::{DomExtractor, Document, PageExtractor, Parser, RegexExtractor},
    },
    stdx::{
        dom,
        error::{Assume, Assumption, assumption},
        lazy::{regex, selector},
        text,
    },
};

/// A thumbnail cropped out of a shared sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetPreview {
    /// Zero-based page index.
    pub index: u32,
    /// The sprite sheet.
    pub image_url: String,
    /// Horizontal offset of the crop into the sheet.
    pub crop_x: u32,
    /// Vertical offset of the crop into the sheet.
    pub crop_y: u32,
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
    /// The page viewer URL.
    pub link_url: String,
}

/// A thumbnail with an image of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectPreview {
    /// Zero-based page index.
    pub index: u32,
    #[allow(missing_docs)]
    pub image_url: String,
    /// The page viewer URL.
    pub link_url: String,
}

/// Previews in one of the two encodings, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewSet {
    /// Cropped out of sprite sheets.
    Sheet(Vec<SheetPreview>),
    /// One image per preview.
    Direct(Vec<DirectPreview>),
}

impl Default for PreviewSet {
    fn default() -> Self {
        Self::Direct(Vec::new())
    }
}

/// A borrowed view of either preview encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview<'a> {
    #[allow(missing_docs)]
    Sheet(&'a SheetPreview),
    #[allow(missing_docs)]
    Direct(&'a DirectPreview),
}

impl Preview<'_> {
    /// Zero-based page index.
    #[must_use]
    pub fn index(&self) -> u32 {
        match self {
            Self::Sheet(preview) => preview.index,
            Self::Direct(preview) => preview.index,
        }
    }

    /// The image to load, a sprite sheet in case of [`Preview::Sheet`].
    #[must_use]
    pub fn image_url(&self) -> &str {
        match self {
            Self::Sheet(preview) => &preview.image_url,
            Self::Direct(preview) => &preview.image_url,
        }
    }

    /// The page viewer URL.
    #[must_use]
    pub fn link_url(&self) -> &str {
        match self {
            Self::Sheet(preview) => &preview.link_url,
            Self::Direct(preview) => &preview.link_url,
        }
    }
}

impl PreviewSet {
    #[allow(missing_docs)]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Sheet(previews) => previews.len(),
            Self::Direct(previews) => previews.len(),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `position`th preview in page order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<Preview<'_>> {
        match self {
            Self::Sheet(previews) => previews.get(position).map(Preview::Sheet),
            Self::Direct(previews) => previews.get(position).map(Preview::Direct),
        }
    }

    #[allow(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = Preview<'_>> {
        (0..self.len()).filter_map(|position| self.get(position))
    }
}

/// Keeps the first preview seen per index.
struct Indexed<T> {
    items: Vec<T>,
    seen: HashSet<u32>,
}

impl<T> Indexed<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// `label` is the one-based page number printed in the `alt` attribute.
    fn push(&mut self, label: &str, item: impl FnOnce(u32) -> T) {
        let index = text::parse_long(label, 0) - 1;
        let Ok(index) = u32::try_from(index) else {
            debug!(label, "skipping preview with unusable index");
            return;
        };

        if !self.seen.insert(index) {
            debug!(index, "skipping preview with duplicate index");
            return;
        }

        self.items.push(item(index));
    }

    fn finish(self, layout: &str) -> Result<Vec<T>, Assumption> {
        assumption!(!self.items.is_empty(), "no {layout} previews found");
        Ok(self.items)
    }
}

/// How many preview pages a gallery has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewPages(pub u32);

impl PageExtractor<PreviewSet> for DomExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<PreviewSet, Error> {
        let html = document.html();
        large_from_html(parser, html)
            .map(PreviewSet::Direct)
            .or_else(|_| sheet_from_html(html).map(PreviewSet::Sheet))
            .within(PageKind::Previews, document.body())
    }
}

impl PageExtractor<PreviewSet> for RegexExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<PreviewSet, Error> {
        let body = document.body();
        large_from_body(parser, body)
            .map(PreviewSet::Direct)
            .or_else(|_| sheet_from_body(body).map(PreviewSet::Sheet))
            .within(PageKind::Previews, body)
    }
}

impl PageExtractor<PreviewPages> for DomExtractor {
    fn extract(&self, _: &Parser, document: &Document<'_>) -> Result<PreviewPages, Error> {
        pages_from_html(document.html())
            .map(PreviewPages)
            .within(PageKind::Previews, document.body())
    }
}

impl PageExtractor<PreviewPages> for RegexExtractor {
    fn extract(&self, _: &Parser, document: &Document<'_>) -> Result<PreviewPages, Error> {
        pages_from_body(document.body())
            .map(PreviewPages)
            .within(PageKind::Previews, document.body())
    }
}

fn large_from_html(parser: &Parser, html: &Html) -> Result<Vec<DirectPreview>, Assumption> {
    let mut previews = Indexed::new();

    for cell in html.select(selector!("#gdt .gdtl")) {
        let Some((link, img)) = link_and_image(cell) else {
            debug!("skipping large preview without link and image");
            continue;
        };

        let (Some(link_url), Some(image_url), Some(label)) = (
            dom::attr(link, "href"),
            dom::attr(img, "src"),
            dom::attr(img, "alt"),
        ) else {
            continue;
        };

        previews.push(label, |index| DirectPreview {
            index,
            image_url: parser.preview_thumb(&text::trim(image_url)),
            link_url: text::trim(link_url),
        });
    }

    previews.finish("large")
}

fn link_and_image(cell: ElementRef<'_>) -> Option<(ElementRef<'_>, ElementRef<'_>)> {
    let link = dom::child(cell, 0)?;
    let img = dom::child(link, 0)?;
    Some((link, img))
}

fn large_from_body(parser: &Parser, body: &str) -> Result<Vec<DirectPreview>, Assumption> {
    let mut previews = Indexed::new();

    for captures in
        regex!(r#"(?s)<div class="gdtl".+?<a href="(.+?)"><img alt="([\d,]+)".+?src="(.+?)""#)
            .captures_iter(body)
    {
        previews.push(&captures[2], |index| DirectPreview {
            index,
            image_url: parser.preview_thumb(&text::trim(&captures[3])),
            link_url: text::trim(&captures[1]),
        });
    }

    previews.finish("large")
}

/// The sprite sheet style, such as
/// `width:100px; height:144px; background:transparent url(..) -100px 0 no-repeat`.
struct SheetStyle {
    width: u32,
    height: u32,
    image_url: String,
    crop_x: u32,
    crop_y: u32,
}

fn sheet_style(style: &str) -> Option<SheetStyle> {
    let captures = regex!(
        r"width:\s*(\d+)(?:px)?;?.*?height:\s*(\d+)(?:px)?.*?\((.+?)\)\s*(?:-(\d+)px|0(?:px)?)(?:\s+(?:-(\d+)px|0(?:px)?))?"
    )
    .captures(style)?;

    let offset = |group: usize| {
        captures
            .get(group)
            .map_or(0, |offset| text::parse_count(offset.as_str(), 0))
    };

    Some(SheetStyle {
        width: text::parse_count(&captures[1], 0),
        height: text::parse_count(&captures[2], 0),
        image_url: text::trim(&captures[3]),
        crop_x: offset(4),
        crop_y: offset(5),
    })
}

fn push_sheet(previews: &mut Indexed<SheetPreview>, style: SheetStyle, link_url: &str, label: &str) {
    if style.width == 0 || style.height == 0 {
        debug!(
            width = style.width,
            height = style.height,
            "skipping sheet preview without area"
        );
        return;
    }

    previews.push(label, |index| SheetPreview {
        index,
        image_url: style.image_url,
        crop_x: style.crop_x,
        crop_y: style.crop_y,
        width: style.width,
        height: style.height,
        link_url: text::trim(link_url),
    });
}

fn sheet_from_html(html: &Html) -> Result<Vec<SheetPreview>, Assumption> {
    let mut previews = Indexed::new();

    for cell in html.select(selector!("#gdt .gdtm")) {
        let Some(sprite) = dom::child(cell, 0) else {
            continue;
        };
        let Some((link, img)) = link_and_image(sprite) else {
            continue;
        };
        let Some(style) = dom::attr(sprite, "style").and_then(sheet_style) else {
            debug!("skipping sheet preview with unreadable style");
            continue;
        };
        let (Some(link_url), Some(label)) = (dom::attr(link, "href"), dom::attr(img, "alt")) else {
            continue;
        };

        push_sheet(&mut previews, style, link_url, label);
    }

    previews.finish("sheet")
}

fn sheet_from_body(body: &str) -> Result<Vec<SheetPreview>, Assumption> {
    let mut previews = Indexed::new();

    for captures in regex!(
        r#"<div class="gdtm"[^<>]*><div([^<>]*)><a[^<>]*href="(.+?)"[^<>]*><img alt="([\d,]+)""#
    )
    .captures_iter(body)
    {
        let Some(style) = sheet_style(&captures[1]) else {
            debug!("skipping sheet preview with unreadable style");
            continue;
        };

        push_sheet(&mut previews, style, &captures[2], &captures[3]);
    }

    previews.finish("sheet")
}

/// The second to last pagination cell holds the last preview page number.
fn pages_from_html(html: &Html) -> Result<u32, Assumption> {
    let ptt = html
        .select(selector!(".ptt"))
        .next()
        .assumption("no `.ptt` pagination table on detail page")?;

    let cells: Vec<ElementRef<'_>> = ptt.select(selector!("td")).collect();
    let [.., last_page, _next] = cells.as_slice() else {
        assumption!("`.ptt` pagination table has fewer than two cells");
    };

    let pages = text::parse_count(&dom::text(*last_page), 0);
    assumption!(pages > 0, "last preview page cell should hold a positive number");
    Ok(pages)
}

fn pages_from_body(body: &str) -> Result<u32, Assumption> {
    let captures = regex!(
        r"<td[^>]+><a[^>]+>([\d,]+)</a></td><td[^>]+>(?:<a[^>]+>)?&gt;(?:</a>)?</td>"
    )
    .captures(body)
    .assumption("no pagination cells before `&gt;` on detail page")?;

    let pages = text::parse_count(&captures[1], 0);
    assumption!(pages > 0, "last preview page cell should hold a positive number");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ehentai::parser::ParserBuilder;
    use pretty_assertions::assert_eq;

    const LARGE: &str = r#"<div id="gdt"><div class="gdtl" style="height:320px"><a href="https://e-hentai.org/s/7b87643838/530350-1"><img alt="01" title="Page 1: 001.jpg" src="https://ul.ehgt.org/31/7a/317a1a254cd9-260198-640-480-png_l.jpg" /></a></div><div class="gdtl" style="height:320px"><a href="https://e-hentai.org/s/0123456789/530350-2"><img alt="02" title="Page 2: 002.jpg" src="https://ul.ehgt.org/aa/bb/aabb12-260198-640-480-png_l.jpg" /></a></div><div class="gdtl" style="height:320px"><a href="https://e-hentai.org/s/0123456789/530350-2"><img alt="02" title="Page 2: 002.jpg" src="https://ul.ehgt.org/aa/bb/dup.jpg" /></a></div><div class="c"></div></div>"#;

    const SHEET: &str = r#"<div id="gdt"><div class="gdtm" style="height:170px"><div style="margin:1px auto 0; width:100px; height:144px; background:transparent url(https://ehgt.org/m/000530/530350-00.jpg) 0 0 no-repeat"><a href="https://e-hentai.org/s/7b87643838/530350-1"><img alt="01" title="Page 1: 001.jpg" src="https://ehgt.org/g/blank.gif" style="width:100px; height:143px; margin:-1px 0 0 -1px" /></a></div></div><div class="gdtm" style="height:170px"><div style="margin:1px auto 0; width:100px; height:141px; background:transparent url(https://ehgt.org/m/000530/530350-00.jpg) -100px 0 no-repeat"><a href="https://e-hentai.org/s/0123456789/530350-2"><img alt="02" title="Page 2: 002.jpg" src="https://ehgt.org/g/blank.gif" style="width:100px; height:140px; margin:-1px 0 0 -1px" /></a></div></div><div class="gdtm" style="height:170px"><div style="margin:1px auto 0; width:0px; height:141px; background:transparent url(https://ehgt.org/m/000530/530350-00.jpg) -200px 0 no-repeat"><a href="https://e-hentai.org/s/0123456789/530350-3"><img alt="03" title="Page 3: 003.jpg" src="https://ehgt.org/g/blank.gif" /></a></div></div></div>"#;

    const PTT: &str = r#"<table class="ptt"><tr><td onclick="document.location=this.firstChild.href" class="ptds"><a href="https://e-hentai.org/g/530350/8b3c7e4a21/" onclick="return false">&lt;</a></td><td class="ptds"><a href="https://e-hentai.org/g/530350/8b3c7e4a21/" onclick="return false">1</a></td><td onclick="document.location=this.firstChild.href"><a href="https://e-hentai.org/g/530350/8b3c7e4a21/?p=1" onclick="return false">2</a></td><td onclick="document.location=this.firstChild.href"><a href="https://e-hentai.org/g/530350/8b3c7e4a21/?p=1" onclick="return false">&gt;</a></td></tr></table>"#;

    fn sheet_expected() -> Vec<SheetPreview> {
        vec![
            SheetPreview {
                index: 0,
                image_url: "https://ehgt.org/m/000530/530350-00.jpg".to_string(),
                crop_x: 0,
                crop_y: 0,
                width: 100,
                height: 144,
                link_url: "https://e-hentai.org/s/7b87643838/530350-1".to_string(),
            },
            SheetPreview {
                index: 1,
                image_url: "https://ehgt.org/m/000530/530350-00.jpg".to_string(),
                crop_x: 100,
                crop_y: 0,
                width: 100,
                height: 141,
                link_url: "https://e-hentai.org/s/0123456789/530350-2".to_string(),
            },
        ]
    }

    #[test]
    fn should_parse_large_previews_and_skip_duplicates() {
        let parser = Parser::new();
        let html = Html::parse_document(LARGE);

        let previews = large_from_html(&parser, &html).unwrap();
        assert_eq!(2, previews.len());
        assert_eq!(0, previews[0].index);
        assert_eq!("https://e-hentai.org/s/7b87643838/530350-1", previews[0].link_url);
        assert_eq!(
            "https://ul.ehgt.org/aa/bb/aabb12-260198-640-480-png_l.jpg",
            previews[1].image_url
        );

        assert_eq!(previews, large_from_body(&parser, LARGE).unwrap());
    }

    #[test]
    fn should_fix_large_preview_urls_when_asked() {
        let parser = ParserBuilder::new().fix_preview_thumb_url(true).build();
        let previews = large_from_body(&parser, LARGE).unwrap();

        assert_eq!(
            "https://ehgt.org/31/7a/317a1a254cd9-260198-640-480-png_l.jpg",
            previews[0].image_url
        );
        assert_eq!(
            "https://ehgt.org/aa/bb/aabb12-260198-640-480-png_l.jpg",
            previews[1].image_url
        );
    }

    #[test]
    fn should_parse_sheet_previews_and_skip_empty_area() {
        let html = Html::parse_document(SHEET);
        assert_eq!(sheet_expected(), sheet_from_html(&html).unwrap());
        assert_eq!(sheet_expected(), sheet_from_body(SHEET).unwrap());
    }

    #[test]
    fn should_fall_back_from_large_to_sheet() {
        let parser = Parser::new();
        let document = Document::new(SHEET);

        let dom: PreviewSet = DomExtractor.extract(&parser, &document).unwrap();
        let regex: PreviewSet = RegexExtractor.extract(&parser, &document).unwrap();

        assert_eq!(PreviewSet::Sheet(sheet_expected()), dom);
        assert_eq!(dom, regex);
        assert_eq!(Some(1), dom.get(1).map(|preview| preview.index()));
        assert_eq!(2, dom.iter().count());
    }

    #[test]
    fn should_fail_without_previews() {
        let parser = Parser::new();
        let document = Document::new("<div id=\"gdt\"></div>");

        let result: Result<PreviewSet, Error> = DomExtractor.extract(&parser, &document);
        assert!(matches!(result, Err(Error::ParseFailure(failure)) if failure.kind == PageKind::Previews));
    }

    #[test]
    fn should_parse_preview_pages() {
        let html = Html::parse_document(PTT);
        assert_eq!(Ok(2), pages_from_html(&html));
        assert_eq!(Ok(2), pages_from_body(PTT));
    }

    #[test]
    fn should_reject_missing_preview_pages() {
        let html = Html::parse_document("<div></div>");
        assert!(pages_from_html(&html).is_err());
        assert!(pages_from_body("<div></div>").is_err());
    }
}
