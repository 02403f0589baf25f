//! Gallery listings: search results, watched, popular, and the favorites page.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{GallerySummary, tags};
use crate::{
    platform::ehentai::{
        errors::{Error, PageKind, Within},
        meta::{Category, FavoriteSlot},
        parser::{Document, Parser},
        url::GalleryDetailUrl,
    },
    stdx::{
        dom,
        error::{Assume, Assumption, assumption},
        lazy::{regex, selector},
        text,
    },
};

const NO_HITS: &str = "No hits found</p>";
const NO_WATCHED_TAGS: &str = "<p>You do not have any watched tags";

/// The favorite colors, by slot.
const FAVORITE_PALETTE: [[&str; 3]; 10] = [
    ["0", "0", "0"],
    ["240", "0", "0"],
    ["240", "160", "0"],
    ["208", "208", "0"],
    ["0", "128", "0"],
    ["144", "240", "64"],
    ["64", "176", "240"],
    ["0", "0", "240"],
    ["80", "0", "128"],
    ["224", "128", "224"],
];

/// How many pages a listing has, as far as the page lets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pages {
    /// The pagination control printed the last page number.
    Known(u32),
    /// The search matched nothing.
    NoHits,
    /// There is no pagination control, so this is the only page.
    Single,
    /// There is a pagination control but it could not be read. Keep requesting
    /// forward until a page comes back empty.
    Unbounded,
}

impl Pages {
    /// The page count, with [`Pages::Unbounded`] as `u32::MAX`.
    #[must_use]
    pub fn count(self) -> u32 {
        match self {
            Self::Known(pages) => pages,
            Self::NoHits => 0,
            Self::Single => 1,
            Self::Unbounded => u32::MAX,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    /// Galleries with a usable id and token, in page order.
    pub galleries: Vec<GallerySummary>,
    #[allow(missing_docs)]
    pub pages: Pages,
    /// The page index, or cursor on newer listings, to request next.
    pub next_page: Option<u64>,
    /// Whether the watched listing says no tags are watched.
    pub no_watched_tags: bool,
}

pub(crate) fn parse(parser: &Parser, document: &Document<'_>) -> Result<ListPage, Error> {
    let html = document.html();
    let body = document.body();
    let root = html.root_element();

    let mut page = ListPage {
        galleries: Vec::new(),
        pages: Pages::Single,
        next_page: None,
        no_watched_tags: false,
    };

    match pagination(root) {
        Ok((pages, next_page)) => {
            page.pages = Pages::Known(pages);
            page.next_page = next_page;
        }
        Err(err) => {
            debug!(error = %err, "no readable pagination");
            page.no_watched_tags = body.contains(NO_WATCHED_TAGS);

            if body.contains(NO_HITS) {
                page.pages = Pages::NoHits;
                return Ok(page);
            }

            page.pages = if root.select(selector!(".ptt")).next().is_some() || cursor(root).is_some()
            {
                Pages::Unbounded
            } else {
                Pages::Single
            };
        }
    }

    if let Some(next) = cursor(root) {
        page.next_page = Some(next);
    }

    page.galleries = galleries(parser, root).within(PageKind::GalleryList, body)?;
    Ok(page)
}

/// Total pages from the second to last `.ptt` cell, and the next page from the last.
fn pagination(root: ElementRef<'_>) -> Result<(u32, Option<u64>), Assumption> {
    let ptt = root
        .select(selector!(".ptt"))
        .next()
        .assumption("no `.ptt` pagination table")?;

    let row = ptt
        .select(selector!("tr"))
        .next()
        .assumption("`.ptt` pagination table has no row")?;

    let cells: Vec<ElementRef<'_>> = dom::children(row).collect();
    let [.., last_page, next] = cells.as_slice() else {
        assumption!("`.ptt` pagination row has fewer than two cells");
    };

    let last_page = dom::text(*last_page);
    let pages = last_page
        .trim()
        .parse::<u32>()
        .assumption(format!("last page cell `{last_page}` should be a number"))?;

    let next_page = dom::child(*next, 0)
        .and_then(|link| dom::attr(link, "href"))
        .and_then(|href| regex!(r"page=(\d+)").captures(href))
        .and_then(|captures| captures[1].parse::<u64>().ok());

    Ok((pages, next_page))
}

/// Newer listings page with a `next=<gid>` cursor instead of page numbers.
fn cursor(root: ElementRef<'_>) -> Option<u64> {
    let next = dom::by_id(root, "unext")?;
    let href = dom::attr(next, "href")?;
    let captures = regex!(r"next=(\d+)").captures(href)?;
    captures[1].parse().ok()
}

fn galleries(parser: &Parser, root: ElementRef<'_>) -> Result<Vec<GallerySummary>, Assumption> {
    let itg = root
        .select(selector!(".itg"))
        .next()
        .assumption("no `.itg` gallery container")?;

    // Table layouts hold their rows in the implied `tbody`.
    let container = if itg.value().name().eq_ignore_ascii_case("table") {
        dom::child(itg, 0).assumption("`.itg` table has no body")?
    } else {
        itg
    };

    let galleries: Vec<GallerySummary> = dom::children(container)
        .filter_map(|row| summary(parser, row))
        .collect();

    assumption!(
        !galleries.is_empty(),
        "`.itg` gallery container had no row with a gallery id and token"
    );

    Ok(galleries)
}

pub(crate) fn summary(parser: &Parser, row: ElementRef<'_>) -> Option<GallerySummary> {
    let Some(glname) = row.select(selector!(".glname")).next() else {
        trace!("skipping row without `.glname`, such as the table header");
        return None;
    };

    let link = glname
        .select(selector!("a"))
        .next()
        .or_else(|| dom::parent(glname).filter(|parent| parent.value().name() == "a"));

    let Some(url) = link
        .and_then(|link| dom::attr(link, "href"))
        .and_then(|href| GalleryDetailUrl::parse(href, true))
    else {
        debug!("dropping row without a gallery id and token");
        return None;
    };

    let mut gallery = GallerySummary::new(url.gid, &url.token);
    gallery.title = dom::text(leaf(glname));

    gallery.simple_tags = match glname.select(selector!("tbody")).next() {
        Some(tbody) => tags::from_rows(dom::children(tbody))
            .iter()
            .flat_map(tags::TagGroup::simple_tags)
            .collect(),
        None => row
            .select(selector!("div.gt[title], div.gtl[title]"))
            .filter_map(|tag| dom::attr(tag, "title"))
            .map(text::trim)
            .collect(),
    };

    gallery.category = row
        .select(selector!(".cn"))
        .next()
        .or_else(|| row.select(selector!(".cs")).next())
        .map_or(Category::Unknown, |label| Category::resolve(&dom::text(label)));

    thumbnail(parser, row, &mut gallery);

    let posted = dom::by_id(row, &format!("posted_{}", gallery.gid));
    gallery.posted = posted.map(|posted| dom::text(posted).trim().to_owned());
    gallery.favorite_slot = match posted
        .and_then(|posted| dom::attr(posted, "style"))
        .and_then(favorite_slot)
    {
        Some(slot) => FavoriteSlot::Remote(slot),
        None if parser.is_local_favorite(gallery.gid) => FavoriteSlot::Local,
        None => FavoriteSlot::None,
    };

    if let Some(ir) = row.select(selector!(".ir")).next() {
        gallery.rating = dom::attr(ir, "style").and_then(rating);
        gallery.rated = ["irr", "irg", "irb"]
            .into_iter()
            .any(|class| dom::has_class(ir, class));
    }

    uploader_and_pages(row, &mut gallery);

    gallery.detect_language();
    Some(gallery)
}

/// Follows first children down to the innermost element, where the title text sits.
fn leaf(element: ElementRef<'_>) -> ElementRef<'_> {
    let mut leaf = element;
    while let Some(child) = dom::child(leaf, 0) {
        leaf = child;
    }
    leaf
}

fn thumbnail(parser: &Parser, row: ElementRef<'_>, gallery: &mut GallerySummary) {
    if let Some(glthumb) = row.select(selector!(".glthumb")).next() {
        if let Some(img) = glthumb.select(selector!("div:nth-child(1) > img")).next() {
            (gallery.thumb_width, gallery.thumb_height) = thumb_size(img);
            gallery.thumb = dom::attr(img, "data-src")
                .filter(|url| !url.is_empty())
                .or_else(|| dom::attr(img, "src"))
                .filter(|url| !url.is_empty())
                .map(|url| parser.thumb(url));
        }

        if let Some(pages) = glthumb
            .select(selector!("div:nth-child(2) > div:nth-child(2) > div:nth-child(2)"))
            .next()
            .and_then(|div| page_count(&dom::text(div)))
        {
            gallery.pages = pages;
        }
    }

    // Extended and thumbnail layouts
    if gallery.thumb.is_none() {
        let img = row
            .select(selector!(".gl1e"))
            .next()
            .or_else(|| row.select(selector!(".gl3t")).next())
            .and_then(|gl| gl.select(selector!("img")).next());

        if let Some(img) = img {
            (gallery.thumb_width, gallery.thumb_height) = thumb_size(img);
            gallery.thumb = dom::attr(img, "src").map(|url| parser.thumb(url));
        }
    }
}

fn thumb_size(img: ElementRef<'_>) -> (u32, u32) {
    let style = dom::attr(img, "style").unwrap_or_default();
    match regex!(r"height:(\d+)px;width:(\d+)px").captures(style) {
        Some(captures) => (
            text::parse_count(&captures[2], 0),
            text::parse_count(&captures[1], 0),
        ),
        None => {
            warn!(style, "unreadable thumbnail size");
            (0, 0)
        }
    }
}

fn uploader_and_pages(row: ElementRef<'_>, gallery: &mut GallerySummary) {
    let block = match row.select(selector!(".glhide")).next() {
        Some(glhide) => Some((glhide, 0, 1)),
        None => row.select(selector!(".gl3e")).next().map(|gl3e| (gl3e, 3, 4)),
    };

    if let Some((block, uploader, pages)) = block {
        let children: Vec<ElementRef<'_>> = dom::children(block).collect();

        if let Some(name) = children
            .get(uploader)
            .and_then(|cell| dom::child(*cell, 0))
        {
            gallery.uploader = Some(dom::text(name).trim().to_owned());
        }

        if let Some(pages) = children
            .get(pages)
            .and_then(|cell| page_count(&dom::text(*cell)))
        {
            gallery.pages = pages;
        }
    }

    // Thumbnail layout
    if let Some(pages) = row
        .select(selector!(".gl5t"))
        .next()
        .and_then(|gl5t| {
            gl5t.select(selector!("div:nth-child(2) > div:nth-child(2)"))
                .next()
        })
        .and_then(|div| page_count(&dom::text(div)))
    {
        gallery.pages = pages;
    }
}

fn page_count(text: &str) -> Option<u32> {
    let captures = regex!(r"(\d+) page").captures(text)?;
    Some(text::parse_count(&captures[1], 0))
}

/// Two sprite offsets, such as `background-position:-16px -21px`. Each 16px of the
/// first is a star off five, and a second offset of 21px takes off another half.
/// Offsets past the empty end of the sprite read as 0.0.
pub(crate) fn rating(style: &str) -> Option<f32> {
    let mut offsets = regex!(r"(\d+)px")
        .captures_iter(style)
        .map(|captures| captures[1].parse::<i32>().ok());

    let first = offsets.next().flatten()?;
    let second = offsets.next().flatten()?;

    let stars = 5 - first / 16;
    #[allow(clippy::cast_precision_loss)]
    let rating = if second == 21 {
        (stars - 1) as f32 + 0.5
    } else {
        stars as f32
    };

    Some(rating.clamp(0.0, 5.0))
}

/// Exact match of the `background-color` triple against the palette.
pub(crate) fn favorite_slot(style: &str) -> Option<u8> {
    let captures = regex!(r"background-color:rgba\((\d+),(\d+),(\d+),").captures(style)?;
    let rgb = [&captures[1], &captures[2], &captures[3]];

    FAVORITE_PALETTE
        .iter()
        .position(|color| *color == rgb)
        .and_then(|slot| u8::try_from(slot).ok())
}
