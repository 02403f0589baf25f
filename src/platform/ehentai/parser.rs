//! Represents a configurable parser for `e-hentai.org` pages.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::{
    cell::OnceCell,
    collections::{BTreeSet, HashSet},
    fmt,
    sync::Arc,
};
use tracing::{debug, instrument};

use super::{
    account::{self, Home, Profile},
    api::{
        metadata::{self, MetadataPatch},
        page::{self as page_api},
        rate::{self, RatingResult},
        token,
        vote::{self, CommentVote},
    },
    archive::{self, ArchiveForm, Archiver},
    errors::Error,
    event,
    favorites::{self, FavoritesPage},
    gallery::{
        GalleryDetail,
        comments::{self, CommentList},
        detail, list,
        list::ListPage,
        page::{self, GalleryPage},
        previews::{self, PreviewSet},
        tags::TagGroup,
    },
    toplist::{self, TopList},
    torrent::{self, Torrent},
    user_tags::{self, UserTagList},
};
use crate::stdx::time;

/// Thumbnail size to request from the image servers.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ThumbResolution {
    /// Leave URLs as the page printed them.
    #[default]
    Auto,
    /// Rewrite to the 250px variant.
    Px250,
    /// Rewrite to the 300px variant.
    Px300,
}

impl ThumbResolution {
    /// Replaces the size between the last `_` and the last `.` of a thumbnail URL.
    ///
    /// ```
    /// # use ehparse::platform::ehentai::ThumbResolution;
    /// assert_eq!(
    ///     "https://ehgt.org/t/ab/cd/abcd-1000-640-480-jpg_300.jpg",
    ///     ThumbResolution::Px300.rewrite("https://ehgt.org/t/ab/cd/abcd-1000-640-480-jpg_250.jpg")
    /// );
    /// ```
    #[must_use]
    pub fn rewrite(self, url: &str) -> String {
        let size = match self {
            Self::Auto => return url.to_owned(),
            Self::Px250 => "250",
            Self::Px300 => "300",
        };

        match (url.rfind('_'), url.rfind('.')) {
            (Some(underscore), Some(dot)) if underscore < dot => {
                format!("{}{size}{}", &url[..=underscore], &url[dot..])
            }
            _ => url.to_owned(),
        }
    }
}

/// How dates printed by the site are read and how API timestamps are rendered.
///
/// The month names are always English. Only the offset is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePolicy {
    offset: FixedOffset,
}

impl Default for DatePolicy {
    #[inline]
    fn default() -> Self {
        Self::utc()
    }
}

impl DatePolicy {
    /// Dates in UTC, which is what the site prints.
    #[inline]
    #[must_use]
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Dates in a fixed offset.
    #[inline]
    #[must_use]
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// The offset in use.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub(crate) fn format_posted(&self, seconds: i64) -> Option<String> {
        time::format_posted(seconds, self.offset)
    }

    pub(crate) fn parse_comment_date(&self, text: &str) -> Option<DateTime<Utc>> {
        time::parse_comment_date(text, self.offset)
    }
}

/// Answers whether a gallery is saved by the host application.
///
/// Consulted only when a listing row carries no remote favorite color.
pub trait LocalFavorites: Send + Sync {
    /// Whether `gid` is saved locally.
    fn contains(&self, gid: u64) -> bool;
}

impl LocalFavorites for HashSet<u64> {
    #[inline]
    fn contains(&self, gid: u64) -> bool {
        HashSet::contains(self, &gid)
    }
}

impl LocalFavorites for BTreeSet<u64> {
    #[inline]
    fn contains(&self, gid: u64) -> bool {
        BTreeSet::contains(self, &gid)
    }
}

impl<F> LocalFavorites for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    #[inline]
    fn contains(&self, gid: u64) -> bool {
        self(gid)
    }
}

/// Which extraction strategy to use for pages that have two.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Walk the element tree, and retry with patterns on a structural failure.
    #[default]
    DomThenRegex,
    /// Walk the element tree only.
    Dom,
    /// Match patterns against the raw body only.
    Regex,
}

/// A response body, with its element tree built on first use.
pub struct Document<'a> {
    body: &'a str,
    html: OnceCell<Html>,
}

impl<'a> Document<'a> {
    /// Wraps a body without parsing it yet.
    #[inline]
    #[must_use]
    pub fn new(body: &'a str) -> Self {
        Self {
            body,
            html: OnceCell::new(),
        }
    }

    /// The raw body.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// The element tree, parsed once.
    #[inline]
    pub fn html(&self) -> &Html {
        self.html.get_or_init(|| Html::parse_document(self.body))
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("body_len", &self.body.len())
            .field("parsed", &self.html.get().is_some())
            .finish()
    }
}

/// One way of turning a page into a `T`.
pub trait PageExtractor<T> {
    /// Extracts a `T` from the document.
    ///
    /// # Errors
    ///
    /// Returns the banner [`Error`] the page carries, or [`Error::ParseFailure`] when the
    /// page does not have the expected shape.
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<T, Error>;
}

/// Extraction by walking the element tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomExtractor;

/// Extraction by matching patterns against the raw body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl<T> PageExtractor<T> for Strategy
where
    DomExtractor: PageExtractor<T>,
    RegexExtractor: PageExtractor<T>,
{
    fn extract(&self, parser: &Parser, document: &Document<'_>) -> Result<T, Error> {
        match self {
            Self::Dom => DomExtractor.extract(parser, document),
            Self::Regex => RegexExtractor.extract(parser, document),
            Self::DomThenRegex => match DomExtractor.extract(parser, document) {
                Err(Error::ParseFailure(failure)) => {
                    debug!(
                        kind = %failure.kind,
                        reason = %failure.reason,
                        "element tree extraction failed, retrying with patterns"
                    );
                    RegexExtractor.extract(parser, document)
                }
                result => result,
            },
        }
    }
}

struct Config {
    thumb_resolution: ThumbResolution,
    fix_preview_thumb_url: bool,
    thumb_prefix: String,
    date_policy: DatePolicy,
    local_favorites: Option<Arc<dyn LocalFavorites>>,
    strategy: Strategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thumb_resolution: ThumbResolution::Auto,
            fix_preview_thumb_url: false,
            thumb_prefix: ParserBuilder::DEFAULT_THUMB_PREFIX.to_owned(),
            date_policy: DatePolicy::utc(),
            local_favorites: None,
            strategy: Strategy::DomThenRegex,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("thumb_resolution", &self.thumb_resolution)
            .field("fix_preview_thumb_url", &self.fix_preview_thumb_url)
            .field("thumb_prefix", &self.thumb_prefix)
            .field("date_policy", &self.date_policy)
            .field("local_favorites", &self.local_favorites.is_some())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// A builder for configuring and creating instances of [`Parser`] with custom settings.
///
/// # Example
///
/// ```
/// # use ehparse::platform::ehentai::{ParserBuilder, Strategy, ThumbResolution};
/// # use std::collections::HashSet;
/// let parser = ParserBuilder::new()
///     .thumb_resolution(ThumbResolution::Px300)
///     .local_favorites(HashSet::from([530_350_u64]))
///     .strategy(Strategy::Dom)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ParserBuilder {
    config: Config,
}

impl ParserBuilder {
    /// Where fixed large-preview thumbnails are rebuilt onto by default.
    pub const DEFAULT_THUMB_PREFIX: &'static str = "https://ehgt.org/";

    /// Creates a new `ParserBuilder` with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites listing and cover thumbnails to the given size.
    #[inline]
    #[must_use]
    pub fn thumb_resolution(mut self, resolution: ThumbResolution) -> Self {
        self.config.thumb_resolution = resolution;
        self
    }

    /// Rebuilds large-preview thumbnail URLs onto the thumbnail prefix.
    #[inline]
    #[must_use]
    pub fn fix_preview_thumb_url(mut self, fix: bool) -> Self {
        self.config.fix_preview_thumb_url = fix;
        self
    }

    /// Sets the prefix used by [`fix_preview_thumb_url`](Self::fix_preview_thumb_url).
    #[inline]
    #[must_use]
    pub fn thumb_prefix(mut self, prefix: &str) -> Self {
        self.config.thumb_prefix = prefix.to_owned();
        self
    }

    /// Sets the offset dates are read and rendered in.
    #[inline]
    #[must_use]
    pub fn date_policy(mut self, policy: DatePolicy) -> Self {
        self.config.date_policy = policy;
        self
    }

    /// Sets the lookup used to tell local-only favorites from non-favorites.
    #[inline]
    #[must_use]
    pub fn local_favorites<L>(mut self, local_favorites: L) -> Self
    where
        L: LocalFavorites + 'static,
    {
        self.config.local_favorites = Some(Arc::new(local_favorites));
        self
    }

    /// Sets the strategy for pages that can be read two ways.
    #[inline]
    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Consumes the `ParserBuilder` and returns a [`Parser`].
    #[inline]
    #[must_use]
    pub fn build(self) -> Parser {
        Parser {
            config: Arc::new(self.config),
        }
    }
}

/// Turns response bodies from `e-hentai.org` into typed records.
///
/// Parsing is pure and synchronous. A `Parser` is cheap to clone and can be shared
/// across threads.
///
/// # Example
///
/// ```
/// # use ehparse::platform::ehentai::{Parser, errors::Error, gallery::Pages};
/// let parser = Parser::new();
/// let page = parser.gallery_list("<div class=\"d\"><p>No hits found</p></div>")?;
///
/// assert_eq!(Pages::NoHits, page.pages);
/// assert!(page.galleries.is_empty());
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: Arc<Config>,
}

// Creation impls
impl Parser {
    /// Instantiates a new [`Parser`] with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a [`ParserBuilder`] for creating a custom-configured `Parser`.
    #[inline]
    #[must_use]
    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }
}

// Configuration accessors used by the page modules
impl Parser {
    #[inline]
    pub(crate) fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    #[inline]
    pub(crate) fn date_policy(&self) -> &DatePolicy {
        &self.config.date_policy
    }

    #[inline]
    pub(crate) fn thumb(&self, url: &str) -> String {
        self.config.thumb_resolution.rewrite(url)
    }

    #[inline]
    pub(crate) fn is_local_favorite(&self, gid: u64) -> bool {
        self.config
            .local_favorites
            .as_ref()
            .is_some_and(|favorites| favorites.contains(gid))
    }

    /// Large-preview thumbnails live at `.../aa/bb/aabb...`. When the last three path
    /// segments have that shape they are rebuilt onto the configured prefix.
    pub(crate) fn preview_thumb(&self, url: &str) -> String {
        if !self.config.fix_preview_thumb_url {
            return url.to_owned();
        }

        let Ok(parsed) = url::Url::parse(url) else {
            return url.to_owned();
        };

        let Some(segments) = parsed.path_segments() else {
            return url.to_owned();
        };

        let segments: Vec<&str> = segments.collect();
        let [.., third, second, last] = segments.as_slice() else {
            return url.to_owned();
        };

        let prefix_matches = last
            .strip_prefix(third)
            .is_some_and(|rest| rest.starts_with(second));

        if prefix_matches {
            format!("{}{third}/{second}/{last}", self.config.thumb_prefix)
        } else {
            url.to_owned()
        }
    }
}

// Public facing impls
impl Parser {
    /// Parses a gallery listing page: search results, watched, popular and so on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the page has no gallery container, or a
    /// non-empty one in which no row had a usable gallery id and token.
    #[instrument(name = "parsing gallery list", skip_all)]
    pub fn gallery_list(&self, body: &str) -> Result<ListPage, Error> {
        list::parse(self, &Document::new(body))
    }

    /// Parses a gallery detail page with the configured [`Strategy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OffensiveContent`], [`Error::RemovedOrPlaceholder`] or
    /// [`Error::ServerReportedError`] for the matching banners, and
    /// [`Error::ParseFailure`] when the identity variables, the preview page count or
    /// the preview set are missing.
    #[instrument(name = "parsing gallery detail", skip_all)]
    pub fn gallery_detail(&self, body: &str) -> Result<GalleryDetail, Error> {
        self.with_strategy(body)
    }

    /// Parses only the tag groups of a detail page. Never fails on a missing table.
    ///
    /// # Errors
    ///
    /// Kept fallible so every page parser shares one signature.
    pub fn tag_groups(&self, body: &str) -> Result<Vec<TagGroup>, Error> {
        self.with_strategy(body)
    }

    /// Parses the comment thread of a detail page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] under [`Strategy::Dom`] when the page has no
    /// `#cdiv` thread container. The pattern strategy yields an empty list instead.
    pub fn comments(&self, body: &str) -> Result<CommentList, Error> {
        self.with_strategy(body)
    }

    /// Parses the page returned after posting a comment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] when the site rejected the comment.
    #[instrument(name = "parsing posted comment", skip_all)]
    pub fn posted_comment(&self, body: &str) -> Result<CommentList, Error> {
        let document = Document::new(body);
        comments::check_posted(&document)?;
        self.strategy().extract(self, &document)
    }

    /// Parses the preview thumbnails of a detail page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when neither preview layout is present.
    pub fn preview_set(&self, body: &str) -> Result<PreviewSet, Error> {
        self.with_strategy(body)
    }

    /// Parses how many preview pages a detail page has.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when there is no readable, positive count.
    pub fn preview_pages(&self, body: &str) -> Result<u32, Error> {
        self.with_strategy::<previews::PreviewPages>(body)
            .map(|pages| pages.0)
    }

    /// Parses a gallery's page count from the `Length` row of its detail page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the row is missing.
    pub fn gallery_pages(&self, body: &str) -> Result<u32, Error> {
        detail::parse_pages(body)
    }

    /// Parses an image viewer page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the image URL or show key is missing.
    pub fn gallery_page(&self, body: &str) -> Result<GalleryPage, Error> {
        page::parse(body)
    }

    /// Parses a `showpage` API response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an `error` field, and
    /// [`Error::ParseFailure`] when the image URL is missing.
    pub fn gallery_page_api(&self, body: &str) -> Result<GalleryPage, Error> {
        page_api::parse(body)
    }

    /// Parses a `gdata` metadata API response into patches for existing summaries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the body is not a `gmetadata` object.
    pub fn gallery_metadata_api(&self, body: &str) -> Result<Vec<MetadataPatch>, Error> {
        metadata::parse(self, body)
    }

    /// Parses the favorites page: slot names and counts plus the listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NeedSignIn`] behind the log-on wall, and [`Error::ParseFailure`]
    /// when the slot buttons or the listing cannot be read.
    pub fn favorites(&self, body: &str) -> Result<FavoritesPage, Error> {
        favorites::parse(self, body)
    }

    /// Parses a `gtoken` API response into the first gallery token it lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an entry `error`, and
    /// [`Error::ParseFailure`] for an empty or malformed `tokenlist`.
    pub fn gallery_token_api(&self, body: &str) -> Result<String, Error> {
        token::parse(body)
    }

    /// Parses a `rategallery` API response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an `error` field, and
    /// [`Error::ParseFailure`] for anything that is not a rating object.
    pub fn rate_gallery_api(&self, body: &str) -> Result<RatingResult, Error> {
        rate::parse(body)
    }

    /// Parses a `votecomment` API response. `expected_vote` is the vote that was sent,
    /// and comes back unchanged in the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an `error` field, and
    /// [`Error::ParseFailure`] for anything that is not a vote object.
    pub fn vote_comment_api(&self, body: &str, expected_vote: i32) -> Result<CommentVote, Error> {
        vote::parse(body, expected_vote)
    }

    /// Parses the top lists page.
    ///
    /// # Errors
    ///
    /// Returns the banner errors, and [`Error::ParseFailure`] when a section is missing.
    #[instrument(name = "parsing top list", skip_all)]
    pub fn top_list(&self, body: &str) -> Result<TopList, Error> {
        toplist::parse(body)
    }

    /// Parses the torrent list of a gallery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an error banner.
    pub fn torrents(&self, body: &str) -> Result<Vec<Torrent>, Error> {
        torrent::parse(body)
    }

    /// Parses the H@H download form of the archive popup. A page without the form
    /// yields an empty `or` and no options.
    #[must_use]
    pub fn archive_form(&self, body: &str) -> ArchiveForm {
        archive::parse_form(body)
    }

    /// Parses the archiver page. Fields the page does not have stay empty.
    #[must_use]
    pub fn archiver(&self, body: &str) -> Archiver {
        archive::parse_archiver(body)
    }

    /// Finds the link on the page shown once an archive is ready.
    #[must_use]
    pub fn archiver_download_url(&self, body: &str) -> Option<String> {
        archive::parse_download_url(body)
    }

    /// Parses the forums' response to logging on into the display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] with the forums' message when logging on
    /// failed, and [`Error::ParseFailure`] when the page has neither.
    #[instrument(name = "parsing sign in", skip_all)]
    pub fn sign_in(&self, body: &str) -> Result<String, Error> {
        account::parse_sign_in(body)
    }

    /// Parses the forums index into the viewer's profile link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the user bar is missing.
    pub fn forums(&self, body: &str) -> Result<String, Error> {
        account::parse_forums(body)
    }

    /// Parses a forum profile page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] when the display name is missing.
    pub fn profile(&self, body: &str) -> Result<Profile, Error> {
        account::parse_profile(body)
    }

    /// Parses the `home.php` overview. Unreadable figures are left empty.
    #[must_use]
    pub fn home(&self, body: &str) -> Home {
        account::parse_home(body)
    }

    /// Parses the `My Tags` page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerReportedError`] for an error banner.
    pub fn user_tags(&self, body: &str) -> Result<UserTagList, Error> {
        user_tags::parse(body)
    }

    /// Reads the event pane of `news.php`, as markup.
    #[must_use]
    pub fn event(&self, body: &str) -> Option<String> {
        event::parse(body)
    }

    fn with_strategy<T>(&self, body: &str) -> Result<T, Error>
    where
        DomExtractor: PageExtractor<T>,
        RegexExtractor: PageExtractor<T>,
    {
        self.strategy().extract(self, &Document::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_rewrite_thumb_resolution() {
        let url = "https://ehgt.org/t/58/7f/587f-1-640-480-jpg_l.jpg";
        assert_eq!(url, ThumbResolution::Auto.rewrite(url));
        assert_eq!(
            "https://ehgt.org/t/58/7f/587f-1-640-480-jpg_250.jpg",
            ThumbResolution::Px250.rewrite(url)
        );
        assert_eq!("no-suffix.jpg", ThumbResolution::Px300.rewrite("no-suffix.jpg"));
    }

    #[test]
    fn should_fix_preview_thumb_url_onto_prefix() {
        let parser = ParserBuilder::new()
            .fix_preview_thumb_url(true)
            .thumb_prefix("https://thumbs.example/")
            .build();

        assert_eq!(
            "https://thumbs.example/31/7a/317a1a254cd9-260198-640-480-png_250.jpg",
            parser.preview_thumb("https://ul.ehgt.org/31/7a/317a1a254cd9-260198-640-480-png_250.jpg")
        );

        let unrelated = "https://ul.ehgt.org/aa/bb/317a1a254cd9-260198-640-480-png_250.jpg";
        assert_eq!(unrelated, parser.preview_thumb(unrelated));
    }

    #[test]
    fn should_leave_preview_thumb_url_when_disabled() {
        let url = "https://ul.ehgt.org/31/7a/317a1a254cd9-260198-640-480-png_250.jpg";
        assert_eq!(url, Parser::new().preview_thumb(url));
    }

    #[test]
    fn should_consult_local_favorites() {
        let parser = ParserBuilder::new()
            .local_favorites(|gid: u64| gid == 7)
            .build();

        assert!(parser.is_local_favorite(7));
        assert!(!parser.is_local_favorite(8));
        assert!(!Parser::new().is_local_favorite(7));
    }

    #[test]
    fn should_dispatch_on_configured_strategy() {
        let body = "<div class=\"gm\"><p>No comments yet.</p></div>";

        assert_eq!(Strategy::DomThenRegex, Parser::new().strategy());
        assert!(Parser::new().comments(body).is_ok_and(|list| list.comments.is_empty()));

        let dom = ParserBuilder::new().strategy(Strategy::Dom).build();
        assert_eq!(Strategy::Dom, dom.clone().strategy());
        assert!(matches!(dom.comments(body), Err(Error::ParseFailure(_))));

        let regex = ParserBuilder::new().strategy(Strategy::Regex).build();
        assert_eq!(Strategy::Regex, regex.strategy());
        assert!(regex.comments(body).is_ok_and(|list| list.comments.is_empty()));
    }

    #[test]
    fn should_build_document_lazily() {
        let document = Document::new("<p id=\"x\">y</p>");
        assert_eq!("<p id=\"x\">y</p>", document.body());
        assert_eq!(1, document.html().select(crate::stdx::lazy::selector!("#x")).count());
    }
}
