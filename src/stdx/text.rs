use std::str::FromStr;

use super::lazy::regex;

/// Unescapes entities then trims surrounding whitespace.
#[inline]
pub(crate) fn trim(text: &str) -> String {
    html_escape::decode_html_entities(text).trim().to_owned()
}

fn parse_number<T: FromStr>(text: &str, default: T) -> T {
    trim(text).replace(',', "").parse::<T>().unwrap_or(default)
}

pub(crate) fn parse_int(text: &str, default: i32) -> i32 {
    parse_number(text, default)
}

pub(crate) fn parse_long(text: &str, default: i64) -> i64 {
    parse_number(text, default)
}

pub(crate) fn parse_float(text: &str, default: f32) -> f32 {
    parse_number(text, default)
}

/// Counts are never negative on the site, so a negative reading is as bad as garbage.
pub(crate) fn parse_count(text: &str, default: u32) -> u32 {
    parse_number(text, default)
}

/// Text of a markup fragment with its tags removed, whitespace collapsed the way
/// [`dom::text`](super::dom::text) does.
pub(crate) fn markup_text(html: &str) -> String {
    collapse(&regex!(r"<[^>]*>").replace_all(html, ""))
}

/// Approximates [`dom::own_text`](super::dom::own_text) on flat markup: elements
/// without nested children are removed along with their content.
pub(crate) fn markup_own_text(html: &str) -> String {
    let without_children = regex!(r"(?s)<[a-zA-Z][^>]*>[^<]*</[^>]+>").replace_all(html, "");
    markup_text(&without_children)
}

fn collapse(text: &str) -> String {
    html_escape::decode_html_entities(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
