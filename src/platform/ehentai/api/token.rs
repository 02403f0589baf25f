//! `gtoken` responses, resolving a page token to its gallery token.

use serde::Deserialize;

use crate::{
    platform::ehentai::errors::{Error, PageKind, ParseFailure, Within},
    stdx::error::Assume,
};

#[derive(Debug, Deserialize)]
struct Response {
    tokenlist: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The token of the first gallery in the list.
pub(crate) fn parse(body: &str) -> Result<String, Error> {
    let response = serde_json::from_str::<Response>(body).within(PageKind::GalleryTokenApi, body)?;

    let first = response
        .tokenlist
        .into_iter()
        .next()
        .assumption("`tokenlist` is empty")
        .within(PageKind::GalleryTokenApi, body)?;

    match first {
        RawToken { token: Some(token), .. } => Ok(token),
        RawToken { error: Some(error), .. } => Err(Error::ServerReportedError(error)),
        RawToken { .. } => Err(ParseFailure::new(
            PageKind::GalleryTokenApi,
            "`tokenlist` entry has neither `token` nor `error`",
            body,
        )
        .into()),
    }
}
