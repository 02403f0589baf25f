//! The gallery detail page, `/g/<gid>/<token>/`.

use scraper::ElementRef;
use tracing::debug;

use super::{
    CommentList, GalleryDetail, GallerySummary, comments,
    previews::{PreviewPages, PreviewSet},
    tags::{self, TagGroup},
};
use crate::{
    platform::ehentai::{
        errors::{self, Error, PageKind, Within},
        meta::Category,
        parser::{DomExtractor, Document, PageExtractor, Parser, RegexExtractor},
    },
    stdx::{
        dom,
        error::{Assume, AssumeFor, Assumption},
        fallback::BestEffort,
        lazy::{regex, selector},
        text,
    },
};

const NOT_YET_RATED: &str = "Not Yet Rated";
const ADD_TO_FAVORITES: &str = "Add to Favorites";

impl PageExtractor<GalleryDetail> for DomExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<GalleryDetail, Error> {
        let body = document.body();
        let mut detail = head(body)?;

        let html = document.html();
        match html.select(selector!(".gm")).next() {
            Some(gm) => info_from_html(parser, &mut detail, gm),
            None => debug!("no `.gm` block, keeping default detail fields"),
        }

        detail.tags = tags::from_html(html);
        detail.comments = comments::from_html(parser.date_policy(), html).or_default_for("comments");

        detail.preview_pages = PageExtractor::<PreviewPages>::extract(self, parser, document)?.0;
        detail.preview_set = PageExtractor::<PreviewSet>::extract(self, parser, document)?;

        Ok(finish(detail))
    }
}

impl PageExtractor<GalleryDetail> for RegexExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<GalleryDetail, Error> {
        let body = document.body();
        let mut detail = head(body)?;

        info_from_body(parser, &mut detail, body);

        detail.tags = tags::from_body(body);
        detail.comments = comments::from_body(parser.date_policy(), body);

        detail.preview_pages = PageExtractor::<PreviewPages>::extract(self, parser, document)?.0;
        detail.preview_set = PageExtractor::<PreviewSet>::extract(self, parser, document)?;

        Ok(finish(detail))
    }
}

/// Reads the total page count off the `Length` row.
pub(crate) fn parse_pages(body: &str) -> Result<u32, Error> {
    regex!(r"<tr><td[^<>]*>Length:</td><td[^<>]*>([\d,]+) pages</td></tr>")
        .captures(body)
        .assumption("no `Length` row with a page count")
        .map(|captures| text::parse_count(&captures[1], 0))
        .within(PageKind::GalleryDetail, body)
}

/// Banners, identity, and the torrent and archive links. Shared by both strategies.
fn head(body: &str) -> Result<GalleryDetail, Error> {
    errors::check_banners(body)?;

    let mut detail = identity(body).within(PageKind::GalleryDetail, body)?;

    if let Some(captures) = regex!(
        r#"<a[^<>]*onclick="return popUp\('([^']+)'[^)]+\)">Torrent Download \( (\d+) \)</a>"#
    )
    .captures(body)
    {
        detail.torrent_url = text::trim(&captures[1]);
        detail.torrent_count = text::parse_count(&captures[2], 0);
    }

    if let Some(captures) =
        regex!(r#"<a[^<>]*onclick="return popUp\('([^']+)'[^)]+\)">Archive Download</a>"#)
            .captures(body)
    {
        detail.archive_url = text::trim(&captures[1]);
    }

    Ok(detail)
}

/// The page script declares `gid`, `token`, `apiuid` and `apikey`.
fn identity(body: &str) -> Result<GalleryDetail, Assumption> {
    let captures = regex!(
        r#"(?s)var gid = (\d+);.+?var token = "([a-f0-9]+)";.+?var apiuid = ([\-\d]+);.+?var apikey = "([a-f0-9]+)";"#
    )
    .captures(body)
    .assumption("no `gid`, `token`, `apiuid` and `apikey` script variables")?;

    let gid = captures[1]
        .parse::<u64>()
        .assumption_for(|err| format!("script `gid` `{}` is not an id: {err}", &captures[1]))?;

    Ok(GalleryDetail {
        summary: GallerySummary::new(gid, &captures[2]),
        api_uid: text::parse_long(&captures[3], -1),
        api_key: captures[4].to_owned(),
        torrent_url: String::new(),
        torrent_count: 0,
        archive_url: String::new(),
        language: String::new(),
        size: String::new(),
        parent: String::new(),
        visible: String::new(),
        favorite_count: 0,
        is_favorited: false,
        favorite_name: None,
        rating_count: 0,
        tags: Vec::new(),
        comments: CommentList::default(),
        preview_pages: 0,
        preview_set: PreviewSet::default(),
    })
}

fn info_from_html(parser: &Parser, detail: &mut GalleryDetail, gm: ElementRef<'_>) {
    let summary = &mut detail.summary;

    if let Some(style) = dom::by_id(gm, "gd1")
        .and_then(|gd1| dom::child(gd1, 0))
        .and_then(|cover| dom::attr(cover, "style"))
    {
        cover(parser, summary, style);
    }

    summary.title = dom::by_id(gm, "gn").map(dom::text).unwrap_or_default();
    summary.title_jpn = dom::by_id(gm, "gj").map(dom::text).filter(|title| !title.is_empty());

    summary.category = dom::by_id(gm, "gdc")
        .and_then(|gdc| {
            gdc.select(selector!(".cn"))
                .next()
                .or_else(|| gdc.select(selector!(".cs")).next())
        })
        .map(|label| Category::resolve(&dom::text(label)))
        .or_fallback("category", Category::Unknown);

    summary.uploader = dom::by_id(gm, "gdn").map(dom::text).filter(|name| !name.is_empty());

    if let Some(gdd) = dom::by_id(gm, "gdd") {
        for row in gdd.select(selector!("tr")) {
            let cells: Vec<ElementRef<'_>> = dom::children(row).collect();
            let [key, value, ..] = cells.as_slice() else {
                continue;
            };

            let parent = dom::child(*value, 0)
                .and_then(|anchor| dom::attr(anchor, "href"))
                .map(str::to_owned);

            detail_row(detail, &dom::text(*key), dom::own_text(*value), parent);
        }
    }

    rating(
        detail,
        dom::by_id(gm, "rating_count").map(dom::text),
        dom::by_id(gm, "rating_label").map(dom::text),
    );

    favorite(detail, dom::by_id(gm, "gdf").map(dom::text));
}

fn info_from_body(parser: &Parser, detail: &mut GalleryDetail, body: &str) {
    let summary = &mut detail.summary;

    if let Some(captures) = regex!(r#"<div id="gd1"><div style="([^"]+)""#).captures(body) {
        cover(parser, summary, &captures[1]);
    }

    summary.title = regex!(r#"<h1 id="gn">([^<]*)</h1>"#)
        .captures(body)
        .map(|captures| text::markup_text(&captures[1]))
        .unwrap_or_default();

    summary.title_jpn = regex!(r#"<h1 id="gj">([^<]*)</h1>"#)
        .captures(body)
        .map(|captures| text::markup_text(&captures[1]))
        .filter(|title| !title.is_empty());

    summary.category = regex!(r#"<div id="gdc"><div class="c[ns][^"]*"[^>]*>([^<]+)</div>"#)
        .captures(body)
        .map(|captures| Category::resolve(&text::markup_text(&captures[1])))
        .or_fallback("category", Category::Unknown);

    summary.uploader = regex!(r#"(?s)<div id="gdn">(.*?)</div>"#)
        .captures(body)
        .map(|captures| text::markup_text(&captures[1]))
        .filter(|name| !name.is_empty());

    for captures in regex!(r#"(?s)<tr><td class="gdt1">([^<]*)</td><td class="gdt2">(.*?)</td></tr>"#)
        .captures_iter(body)
    {
        let parent = regex!(r#"^\s*<a[^>]*href="([^"]+)""#)
            .captures(&captures[2])
            .map(|href| html_escape::decode_html_entities(&href[1]).into_owned());

        detail_row(
            detail,
            &text::markup_text(&captures[1]),
            text::markup_own_text(&captures[2]),
            parent,
        );
    }

    rating(
        detail,
        regex!(r#"<span id="rating_count">([^<]*)</span>"#)
            .captures(body)
            .map(|captures| text::markup_text(&captures[1])),
        regex!(r#"<td id="rating_label"[^>]*>([^<]*)</td>"#)
            .captures(body)
            .map(|captures| text::markup_text(&captures[1])),
    );

    favorite(
        detail,
        regex!(r#"(?s)<div id="gdf">(?:<div[^>]*></div>)?(.*?)</div>"#)
            .captures(body)
            .map(|captures| text::markup_text(&captures[1])),
    );
}

/// The cover is drawn as a background: `width:Wpx; height:Hpx; ... url(URL)`.
fn cover(parser: &Parser, summary: &mut GallerySummary, style: &str) {
    let Some(captures) = regex!(r"width:(\d+)px; height:(\d+)px.+?url\((.+?)\)").captures(style)
    else {
        debug!(style, "unreadable cover style");
        return;
    };

    summary.thumb_width = text::parse_count(&captures[1], 0);
    summary.thumb_height = text::parse_count(&captures[2], 0);
    summary.thumb = Some(parser.thumb(&text::trim(&captures[3])));
}

/// Matches a `#gdd` row label by prefix, as the labels carry a trailing colon.
fn detail_row(detail: &mut GalleryDetail, key: &str, value: String, parent: Option<String>) {
    if key.starts_with("Posted") {
        detail.summary.posted = Some(value).filter(|posted| !posted.is_empty());
    } else if key.starts_with("Parent") {
        if let Some(parent) = parent {
            detail.parent = parent;
        }
    } else if key.starts_with("Visible") {
        detail.visible = value;
    } else if key.starts_with("Language") {
        detail.language = value;
    } else if key.starts_with("File Size") {
        detail.size = value;
    } else if key.starts_with("Length") {
        detail.summary.pages = match value.split_once(' ') {
            Some((pages, _)) => text::parse_count(pages, 1),
            None => 1,
        };
    } else if key.starts_with("Favorited") {
        detail.favorite_count = match value.as_str() {
            "Never" => 0,
            "Once" => 1,
            _ => match value.split_once(' ') {
                Some((count, _)) => text::parse_count(count, 0),
                None => 0,
            },
        };
    }
}

/// `Average: 4.52`, or the unrated label.
fn rating(detail: &mut GalleryDetail, count: Option<String>, label: Option<String>) {
    detail.rating_count = count
        .map(|count| text::parse_count(&count, 0))
        .or_default_for("rating_count");

    detail.summary.rating = match label {
        None => None,
        Some(label) if label == NOT_YET_RATED => None,
        Some(label) => match label.split_once(' ') {
            Some((_, rating)) => Some(text::parse_float(rating, 0.0)),
            None => Some(0.0),
        },
    };
}

fn favorite(detail: &mut GalleryDetail, label: Option<String>) {
    detail.favorite_name = label.filter(|label| !label.is_empty() && label != ADD_TO_FAVORITES);
    detail.is_favorited = detail.favorite_name.is_some();
}

fn finish(mut detail: GalleryDetail) -> GalleryDetail {
    detail.summary.simple_tags = detail.tags.iter().flat_map(TagGroup::simple_tags).collect();
    detail.summary.detect_language();
    detail
}
