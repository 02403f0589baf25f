//! Namespaced tag groups, such as `parody: original`.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    platform::ehentai::{
        errors::Error,
        parser::{DomExtractor, Document, PageExtractor, Parser, RegexExtractor},
    },
    stdx::{
        dom,
        lazy::{regex, selector},
        text,
    },
};

/// Tags sharing a namespace, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    /// Such as `parody` or `female`.
    pub namespace: String,
    #[allow(missing_docs)]
    pub tags: Vec<String>,
}

impl TagGroup {
    /// Tags as `namespace:tag`.
    pub fn simple_tags(&self) -> impl Iterator<Item = String> + '_ {
        self.tags
            .iter()
            .map(|tag| format!("{}:{tag}", self.namespace))
    }
}

impl PageExtractor<Vec<TagGroup>> for DomExtractor {
    fn extract(&self, _: &Parser, document: &Document<'_>) -> Result<Vec<TagGroup>, Error> {
        Ok(from_html(document.html()))
    }
}

impl PageExtractor<Vec<TagGroup>> for RegexExtractor {
    fn extract(&self, _: &Parser, document: &Document<'_>) -> Result<Vec<TagGroup>, Error> {
        Ok(from_body(document.body()))
    }
}

/// Tag groups of the `#taglist` table; empty when it is missing.
pub(crate) fn from_html(html: &Html) -> Vec<TagGroup> {
    let rows = html.select(selector!("#taglist tr"));
    from_rows(rows)
}

/// Groups from table rows, dropping rows that do not read as a group.
pub(crate) fn from_rows<'a>(rows: impl Iterator<Item = ElementRef<'a>>) -> Vec<TagGroup> {
    rows.filter_map(group).collect()
}

fn group(row: ElementRef<'_>) -> Option<TagGroup> {
    let Some(label) = dom::child(row, 0) else {
        debug!("tag row has no namespace cell");
        return None;
    };
    let Some(cell) = dom::child(row, 1) else {
        debug!("tag row has no tag cell");
        return None;
    };

    let label = dom::text(label);
    let namespace = label.strip_suffix(':').unwrap_or(&label).trim().to_owned();

    let tags: Vec<String> = dom::children(cell)
        .map(|tag| without_gloss(&dom::text(tag)))
        .filter(|tag| !tag.is_empty())
        .collect();

    if tags.is_empty() {
        return None;
    }

    Some(TagGroup { namespace, tags })
}

/// Tag groups matched straight from markup.
pub(crate) fn from_body(body: &str) -> Vec<TagGroup> {
    let row = regex!(
        r"<tr><td[^<>]+>([^<>]+):</td><td>(?:<div[^<>]+><a[^<>]+>[^<>]+</a></div>)+</td></tr>"
    );
    let tag = regex!(r"<div[^<>]+><a[^<>]+>([^<>]+)</a></div>");

    row.captures_iter(body)
        .filter_map(|captures| {
            let namespace = text::trim(&captures[1]);
            let tags: Vec<String> = tag
                .captures_iter(&captures[0])
                .map(|tag| without_gloss(&text::trim(&tag[1])))
                .filter(|tag| !tag.is_empty())
                .collect();

            (!tags.is_empty()).then_some(TagGroup { namespace, tags })
        })
        .collect()
}

/// Foreign tags read `original | gloss`; only the original is kept.
fn without_gloss(tag: &str) -> String {
    match tag.split_once('|') {
        Some((tag, _gloss)) => tag.trim().to_owned(),
        None => tag.trim().to_owned(),
    }
}
