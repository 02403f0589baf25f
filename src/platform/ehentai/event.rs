//! The event pane that `news.php` shows for daily rewards and encounters.

use crate::{platform::ehentai::parser::Document, stdx::lazy::selector};

/// Inner markup of `#eventpane`, if the page has one.
pub(crate) fn parse(body: &str) -> Option<String> {
    Document::new(body)
        .html()
        .select(selector!("#eventpane"))
        .next()
        .map(|pane| pane.inner_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_return_event_markup() {
        let body = r#"<div id="newsouter"><div id="newsinner"><div id="eventpane" style="width:720px"><p>It is the dawn of a new day!</p><p>You gain <strong>35</strong> EXP!</p></div></div></div>"#;
        assert_eq!(
            Some("<p>It is the dawn of a new day!</p><p>You gain <strong>35</strong> EXP!</p>".to_string()),
            parse(body)
        );
    }

    #[test]
    fn should_be_none_without_event() {
        assert_eq!(None, parse("<div id=\"newsouter\"></div>"));
    }
}
