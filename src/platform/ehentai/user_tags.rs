//! The `My Tags` page, `/mytags`.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    errors::{self, Error},
    parser::Document,
};
use crate::stdx::{dom, lazy::selector, text};

/// A watched or hidden tag, with how it is highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTag {
    /// Id used when editing or deleting the tag.
    pub id: u64,
    /// The `namespace:tag` pair.
    pub tag: String,
    #[allow(missing_docs)]
    pub watched: bool,
    #[allow(missing_docs)]
    pub hidden: bool,
    /// Highlight color, such as `#ff0000`.
    pub color: Option<String>,
    /// Weight added to a gallery's score for having the tag.
    pub weight: i32,
}

/// A named set of user tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    #[allow(missing_docs)]
    pub id: u32,
    #[allow(missing_docs)]
    pub name: String,
}

/// The tags of the selected set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTagList {
    /// All sets the viewer has.
    pub tag_sets: Vec<TagSet>,
    /// The set the tags below belong to.
    pub selected_tag_set: Option<u32>,
    #[allow(missing_docs)]
    pub tags: Vec<UserTag>,
}

pub(crate) fn parse(body: &str) -> Result<UserTagList, Error> {
    errors::check_error_banner(body)?;

    let document = Document::new(body);
    let html = document.html();

    let mut list = UserTagList::default();

    if let Some(select) = html.select(selector!(r#"select[name="tagset"]"#)).next() {
        for option in select.select(selector!("option")) {
            let Some(id) = dom::attr(option, "value").and_then(|value| value.trim().parse().ok()) else {
                continue;
            };

            if dom::attr(option, "selected").is_some() {
                list.selected_tag_set = Some(id);
            }

            list.tag_sets.push(TagSet {
                id,
                name: dom::text(option),
            });
        }
    }

    list.tags = html
        .select(selector!(r#"div[id^="usertag_"]"#))
        .filter_map(|row| {
            let tag = user_tag(row);
            if tag.is_none() {
                debug!(id = ?dom::attr(row, "id"), "skipping unreadable user tag row");
            }
            tag
        })
        .collect();

    Ok(list)
}

fn user_tag(row: ElementRef<'_>) -> Option<UserTag> {
    let id = row.value().id()?.strip_prefix("usertag_")?;
    let numeric = id.parse::<u64>().ok()?;

    let field = |prefix: &str| dom::by_id(row, &format!("{prefix}{id}"));

    let tag = field("tagpreview_")
        .and_then(|preview| dom::attr(preview, "title"))
        .map(text::trim)
        .filter(|tag| !tag.is_empty())?;

    let checked = |prefix: &str| field(prefix).is_some_and(|input| dom::attr(input, "checked").is_some());
    let value = |prefix: &str| {
        field(prefix)
            .and_then(|input| dom::attr(input, "value"))
            .map(text::trim)
            .filter(|value| !value.is_empty())
    };

    Some(UserTag {
        id: numeric,
        tag,
        watched: checked("tagwatch_"),
        hidden: checked("taghide_"),
        color: value("tagcolor_"),
        weight: value("tagweight_").map_or(0, |weight| text::parse_int(&weight, 0)),
    })
}
