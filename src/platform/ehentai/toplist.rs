//! The top lists page, `/toplist.php`.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use super::{
    errors::{self, Error, PageKind, Within},
    parser::Document,
};
use crate::stdx::{
    dom,
    error::{Assume, Assumption},
    lazy::selector,
};

/// An entry of a ranking: a gallery, uploader or tagger, and where it links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopListItem {
    #[allow(missing_docs)]
    pub value: String,
    #[allow(missing_docs)]
    pub href: String,
}

/// One ranking, over the four periods the site keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopListSection {
    #[allow(missing_docs)]
    pub all_time: Vec<TopListItem>,
    #[allow(missing_docs)]
    pub past_year: Vec<TopListItem>,
    #[allow(missing_docs)]
    pub past_month: Vec<TopListItem>,
    #[allow(missing_docs)]
    pub yesterday: Vec<TopListItem>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopList {
    pub title: String,
    pub galleries: TopListSection,
    pub uploaders: TopListSection,
    pub tagging: TopListSection,
    pub hentai_at_home: TopListSection,
    pub ehtracker: TopListSection,
    pub cleanup: TopListSection,
    pub rating_and_reviewing: TopListSection,
}

pub(crate) fn parse(body: &str) -> Result<TopList, Error> {
    errors::check_banners(body)?;

    let document = Document::new(body);
    from_html(document.html().root_element()).within(PageKind::TopList, body)
}

/// The `.ido` block holds the title, then each section followed by a spacer.
fn from_html(root: ElementRef<'_>) -> Result<TopList, Assumption> {
    let ido = root
        .select(selector!(".ido"))
        .next()
        .assumption("no `.ido` block on top list page")?;

    let blocks: Vec<ElementRef<'_>> = dom::children(ido).collect();
    let block = |index: usize| {
        blocks
            .get(index)
            .copied()
            .assumption(format!("top list has no block {index}"))
    };

    Ok(TopList {
        title: dom::text(block(0)?),
        galleries: section(block(1)?)?,
        uploaders: section(block(3)?)?,
        tagging: section(block(5)?)?,
        hentai_at_home: section(block(7)?)?,
        ehtracker: section(block(9)?)?,
        cleanup: section(block(11)?)?,
        rating_and_reviewing: section(block(13)?)?,
    })
}

/// A heading, then the four period tables.
fn section(block: ElementRef<'_>) -> Result<TopListSection, Assumption> {
    let periods: Vec<ElementRef<'_>> = dom::children(block).collect();
    let period = |index: usize| -> Result<Vec<TopListItem>, Assumption> {
        let table = periods
            .get(index)
            .and_then(|period| dom::child(*period, 1))
            .and_then(|wrapper| dom::child(wrapper, 0))
            .assumption(format!("top list section has no period table {index}"))?;

        Ok(table
            .select(selector!(".tun"))
            .filter_map(|cell| dom::child(cell, 0))
            .map(|anchor| TopListItem {
                value: dom::text(anchor),
                href: dom::attr(anchor, "href").unwrap_or_default().to_owned(),
            })
            .collect())
    };

    Ok(TopListSection {
        all_time: period(1)?,
        past_year: period(2)?,
        past_month: period(3)?,
        yesterday: period(4)?,
    })
}
