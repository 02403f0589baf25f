//! Parsers for the HTML and JSON responses of `e-hentai.org` and `exhentai.org`.
//!
//! Nothing here makes requests. Hand a response body to a [`Parser`] method and get a
//! typed record or a typed [`Error`] back.

pub mod errors;
pub mod meta;
pub mod parser;

pub mod api;
pub mod gallery;
pub mod url;

pub mod account;
pub mod archive;
pub mod event;
pub mod favorites;
pub mod toplist;
pub mod torrent;
pub mod user_tags;

pub use errors::{Error, PageKind, ParseFailure};

pub use meta::{Category, FavoriteSlot, Language};

pub use parser::{
    DatePolicy, Document, DomExtractor, LocalFavorites, PageExtractor, Parser, ParserBuilder,
    RegexExtractor, Strategy, ThumbResolution,
};

pub use gallery::{GalleryDetail, GallerySummary, SharedGalleries, apply_patches};

pub use self::url::{GalleryDetailUrl, GalleryPageUrl, ListUrl};
