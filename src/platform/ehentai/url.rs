//! Recovers identifiers from links to `e-hentai.org`, without fetching anything.
//!
//! Every parser takes a `strict` flag. Strict parsing wants a full URL on one of the
//! known [`HOSTS`](super::meta::HOSTS); loose parsing finds the identifiers anywhere in
//! the text, which suits pasted links and shared text.

mod detail;
mod list;
mod page;

pub use detail::GalleryDetailUrl;
pub use list::{AdvancedSearch, ListMode, ListUrl};
pub use page::GalleryPageUrl;
