//! The comment thread under a gallery.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    platform::ehentai::{
        errors::{Error, PageKind, Within},
        parser::{DatePolicy, DomExtractor, Document, PageExtractor, Parser, RegexExtractor},
    },
    stdx::{
        dom,
        error::{Assume, Assumption},
        lazy::{regex, selector},
        text,
    },
};

const HAS_MORE: &str = "click to show all";

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment id; `0` for the uploader comment and when read with patterns.
    pub id: u64,
    pub posted: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
    pub author: String,
    /// Body markup, as the page has it.
    pub body_html: String,
    pub score: i32,
    /// Breakdown of the score, such as `Base +3, x +9`. May be empty.
    pub vote_state: String,
    pub vote_up_allowed: bool,
    pub vote_up_voted: bool,
    pub vote_down_allowed: bool,
    pub vote_down_voted: bool,
    pub editable: bool,
}

/// The comments a page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentList {
    #[allow(missing_docs)]
    pub comments: Vec<Comment>,
    /// Whether more comments are hidden below the viewing threshold.
    pub has_more: bool,
}

impl PageExtractor<CommentList> for DomExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<CommentList, Error> {
        from_html(parser.date_policy(), document.html())
            .within(PageKind::Comments, document.body())
    }
}

impl PageExtractor<CommentList> for RegexExtractor {
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<CommentList, Error> {
        Ok(from_body(parser.date_policy(), document.body()))
    }
}

/// The response to posting a comment is the detail page, with the rejection reason
/// right after `#chd`.
pub(crate) fn check_posted(document: &Document<'_>) -> Result<(), Error> {
    if let Some(reason) = document.html().select(selector!("#chd + p")).next() {
        return Err(Error::ServerReportedError(dom::text(reason)));
    }

    Ok(())
}

pub(crate) fn from_html(policy: &DatePolicy, html: &Html) -> Result<CommentList, Assumption> {
    let cdiv = html
        .select(selector!("#cdiv"))
        .next()
        .assumption("no `#cdiv` comment container")?;

    let comments = cdiv
        .select(selector!(".c1"))
        .filter_map(|element| match comment(policy, element) {
            Ok(comment) => Some(comment),
            Err(err) => {
                debug!(error = %err, "dropping unreadable comment");
                None
            }
        })
        .collect();

    let has_more = dom::by_id(cdiv, "chd").is_some_and(|chd| {
        chd.descendants()
            .filter_map(ElementRef::wrap)
            .any(|element| dom::text(element) == HAS_MORE)
    });

    Ok(CommentList { comments, has_more })
}

fn comment(policy: &DatePolicy, element: ElementRef<'_>) -> Result<Comment, Assumption> {
    let name = dom::previous_element(element)
        .and_then(|anchor| dom::attr(anchor, "name"))
        .assumption("comment should be preceded by a named anchor")?;

    let id = name
        .trim()
        .get(1..)
        .and_then(|id| id.parse::<u64>().ok())
        .assumption(format!("comment anchor `{name}` should be `c<id>`"))?;

    let mut comment = Comment {
        id,
        posted: DateTime::<Utc>::UNIX_EPOCH,
        last_edited: None,
        author: String::new(),
        body_html: String::new(),
        score: 0,
        vote_state: String::new(),
        vote_up_allowed: false,
        vote_up_voted: false,
        vote_down_allowed: false,
        vote_down_voted: false,
        editable: false,
    };

    if let Some(c4) = element.select(selector!(".c4")).next() {
        for affordance in dom::children(c4) {
            let voted = dom::attr(affordance, "style").is_some_and(|style| !style.trim().is_empty());
            match dom::text(affordance).as_str() {
                "Vote+" => {
                    comment.vote_up_allowed = true;
                    comment.vote_up_voted = voted;
                }
                "Vote-" => {
                    comment.vote_down_allowed = true;
                    comment.vote_down_voted = voted;
                }
                "Edit" => comment.editable = true,
                _ => {}
            }
        }
    }

    if let Some(c7) = element.select(selector!(".c7")).next() {
        comment.vote_state = dom::text(c7);
    }

    if let Some(score) = element
        .select(selector!(".c5"))
        .next()
        .and_then(|c5| dom::child(c5, 0))
    {
        comment.score = text::parse_int(&dom::text(score), 0);
    }

    let c3 = element
        .select(selector!(".c3"))
        .next()
        .assumption("comment has no `.c3` header")?;

    let header = dom::own_text(c3);
    let date = header
        .strip_prefix("Posted on ")
        .and_then(|rest| rest.strip_suffix("by:"))
        .map(str::trim)
        .assumption(format!("comment header `{header}` should be `Posted on .. by:`"))?;

    comment.posted = policy
        .parse_comment_date(date)
        .assumption(format!("comment date `{date}` should be `DD Month YYYY, HH:MM`"))?;

    comment.author = dom::child(c3, 0)
        .map(dom::text)
        .assumption("comment header has no author")?;

    comment.body_html = element
        .select(selector!(".c6"))
        .next()
        .map(|c6| c6.inner_html())
        .assumption("comment has no `.c6` body")?;

    comment.last_edited = element
        .select(selector!(".c8"))
        .next()
        .and_then(|c8| dom::child(c8, 0))
        .and_then(|date| policy.parse_comment_date(&dom::text(date)));

    Ok(comment)
}

/// Comments matched straight from markup. Ids, votes and edits are not available.
pub(crate) fn from_body(policy: &DatePolicy, body: &str) -> CommentList {
    let comments = regex!(
        r#"(?s)<div class="c3">Posted on ([^<>]+) by: &nbsp; <a[^<>]+>([^<>]+)</a>.+?<div class="c6"[^>]*>(.+?)</div><div class="c[78]""#
    )
    .captures_iter(body)
    .map(|captures| {
        let date = text::trim(&captures[1]);
        Comment {
            id: 0,
            posted: policy.parse_comment_date(&date).unwrap_or_else(|| {
                debug!(date = %date, "unreadable comment date, using the epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }),
            last_edited: None,
            author: text::trim(&captures[2]),
            body_html: captures[3].to_owned(),
            score: 0,
            vote_state: String::new(),
            vote_up_allowed: false,
            vote_up_voted: false,
            vote_down_allowed: false,
            vote_down_voted: false,
            editable: false,
        }
    })
    .collect();

    CommentList {
        comments,
        has_more: body.contains(HAS_MORE),
    }
}
