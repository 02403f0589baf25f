use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Listing and API timestamps are rendered this way.
pub(crate) const POSTED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Comment headers read like `Posted on 16 February 2019, 04:25 by:`.
pub(crate) const COMMENT_FORMAT: &str = "%d %B %Y, %H:%M";

/// Formats unix seconds in the given offset.
pub(crate) fn format_posted(seconds: i64, offset: FixedOffset) -> Option<String> {
    let date = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    Some(date.with_timezone(&offset).format(POSTED_FORMAT).to_string())
}

/// Parses a comment header date, interpreted in the given offset.
///
/// Month names are always English, whatever the host environment says.
pub(crate) fn parse_comment_date(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), COMMENT_FORMAT).ok()?;
    let local = offset.from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}
