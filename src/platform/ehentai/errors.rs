//! Errors that can happen when parsing pages from `e-hentai.org` and `exhentai.org`.

use std::fmt;
use thiserror::Error;

use crate::stdx::{error::Assumption, lazy::regex};

/// Largest number of body bytes a [`ParseFailure`] keeps for diagnostics.
pub const EXCERPT_LIMIT: usize = 1024;

const OFFENSIVE: &str = "<p>(And if you choose to ignore this warning, you lose all rights to complain about it in the future.)</p>";
const PINING: &str = "<p>This gallery is pining for the fjords.</p>";
const NEED_SIGN_IN: &str = "This page requires you to log on.</p>";

/// The closed set of outcomes a parser can signal instead of a record.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The page is behind the log-on wall.
    #[error("this page requires signing in")]
    NeedSignIn,
    /// The gallery is behind a content warning that must be acknowledged first.
    #[error("the gallery requires acknowledging a content warning")]
    OffensiveContent,
    /// The gallery was removed, or this is a placeholder for it.
    #[error("the gallery has been removed or is a placeholder")]
    RemovedOrPlaceholder,
    /// The site returned an error banner; the message is verbatim.
    #[error("the server reported an error: {0}")]
    ServerReportedError(String),
    /// The page did not have the shape the parser expected.
    #[error(transparent)]
    ParseFailure(#[from] ParseFailure),
}

/// A structural failure with enough context to diagnose the markup change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse {kind} page: {reason}")]
pub struct ParseFailure {
    /// Which parser gave up.
    pub kind: PageKind,
    /// What it was looking for.
    pub reason: String,
    /// Leading part of the body, cut to at most [`EXCERPT_LIMIT`] bytes.
    pub excerpt: String,
    /// Length of the full body in bytes.
    pub body_len: usize,
}

impl ParseFailure {
    /// Builds a failure for `body`, keeping only a bounded excerpt of it.
    pub fn new(kind: PageKind, reason: impl Into<String>, body: &str) -> Self {
        Self {
            kind,
            reason: reason.into(),
            excerpt: excerpt(body).to_owned(),
            body_len: body.len(),
        }
    }
}

fn excerpt(body: &str) -> &str {
    if body.len() <= EXCERPT_LIMIT {
        return body;
    }

    let mut end = EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Every page or response this crate knows how to parse.
#[allow(missing_docs)]
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    GalleryList,
    GalleryDetail,
    GalleryPage,
    GalleryPageApi,
    GalleryMetadataApi,
    GalleryTokenApi,
    RateGalleryApi,
    VoteCommentApi,
    Favorites,
    TopList,
    Torrents,
    Archive,
    SignIn,
    Forums,
    Profile,
    Home,
    UserTags,
    Comments,
    TagGroups,
    Previews,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GalleryList => "gallery list",
            Self::GalleryDetail => "gallery detail",
            Self::GalleryPage => "gallery page",
            Self::GalleryPageApi => "gallery page api",
            Self::GalleryMetadataApi => "gallery metadata api",
            Self::GalleryTokenApi => "gallery token api",
            Self::RateGalleryApi => "rate gallery api",
            Self::VoteCommentApi => "vote comment api",
            Self::Favorites => "favorites",
            Self::TopList => "top list",
            Self::Torrents => "torrents",
            Self::Archive => "archive",
            Self::SignIn => "sign in",
            Self::Forums => "forums",
            Self::Profile => "profile",
            Self::Home => "home",
            Self::UserTags => "user tags",
            Self::Comments => "comments",
            Self::TagGroups => "tag groups",
            Self::Previews => "previews",
        };

        f.write_str(name)
    }
}

/// Attaches the page kind and body to an internal failure.
pub(crate) trait Within<T> {
    fn within(self, kind: PageKind, body: &str) -> Result<T, Error>;
}

impl<T> Within<T> for Result<T, Assumption> {
    #[inline]
    fn within(self, kind: PageKind, body: &str) -> Result<T, Error> {
        self.map_err(|err| ParseFailure::new(kind, err.message(), body).into())
    }
}

impl<T> Within<T> for Result<T, serde_json::Error> {
    #[inline]
    fn within(self, kind: PageKind, body: &str) -> Result<T, Error> {
        self.map_err(|err| ParseFailure::new(kind, err.to_string(), body).into())
    }
}

/// Banners shared by the gallery pages, checked against the raw body.
///
/// The content warning wins over everything else on the page.
pub(crate) fn check_banners(body: &str) -> Result<(), Error> {
    if body.contains(OFFENSIVE) {
        return Err(Error::OffensiveContent);
    }

    if body.contains(PINING) {
        return Err(Error::RemovedOrPlaceholder);
    }

    check_error_banner(body)
}

/// The generic `<div class="d"><p>..</p>` error banner.
pub(crate) fn check_error_banner(body: &str) -> Result<(), Error> {
    if let Some(captures) = regex!(r#"<div class="d">\n?<p>([^<]+)</p>"#).captures(body) {
        return Err(Error::ServerReportedError(crate::stdx::text::trim(&captures[1])));
    }

    Ok(())
}

pub(crate) fn check_sign_in(body: &str) -> Result<(), Error> {
    if body.contains(NEED_SIGN_IN) {
        return Err(Error::NeedSignIn);
    }

    Ok(())
}
