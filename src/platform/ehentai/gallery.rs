//! Gallery records and the parsers for the pages that produce them.

pub mod comments;
pub mod detail;
pub mod list;
pub mod page;
pub mod previews;
pub mod tags;

pub use comments::{Comment, CommentList};
pub use list::{ListPage, Pages};
pub use page::GalleryPage;
pub use previews::{DirectPreview, Preview, PreviewSet, SheetPreview};
pub use tags::TagGroup;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    api::metadata::MetadataPatch,
    meta::{Category, FavoriteSlot, Language},
};

/// A gallery as it appears in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GallerySummary {
    /// Numeric gallery id.
    pub gid: u64,
    /// Ten character hex token paired with the id.
    pub token: String,
    #[allow(missing_docs)]
    pub title: String,
    /// Japanese title, when the page carries one.
    pub title_jpn: Option<String>,
    #[allow(missing_docs)]
    pub category: Category,
    #[allow(missing_docs)]
    pub thumb: Option<String>,
    #[allow(missing_docs)]
    pub thumb_width: u32,
    #[allow(missing_docs)]
    pub thumb_height: u32,
    #[allow(missing_docs)]
    pub uploader: Option<String>,
    /// Posted date as printed, `YYYY-MM-DD HH:MM`.
    pub posted: Option<String>,
    #[allow(missing_docs)]
    pub pages: u32,
    /// `0.0..=5.0` in half steps; `None` when unrated or unreadable.
    pub rating: Option<f32>,
    /// Whether the viewer rated it.
    pub rated: bool,
    /// Tags flattened to `namespace:tag`, in page order.
    pub simple_tags: Vec<String>,
    #[allow(missing_docs)]
    pub favorite_slot: FavoriteSlot,
    /// Language recognized from tags or title.
    pub simple_language: Option<Language>,
}

impl GallerySummary {
    /// A summary carrying only identity.
    #[must_use]
    pub fn new(gid: u64, token: &str) -> Self {
        Self {
            gid,
            token: token.to_owned(),
            title: String::new(),
            title_jpn: None,
            category: Category::Unknown,
            thumb: None,
            thumb_width: 0,
            thumb_height: 0,
            uploader: None,
            posted: None,
            pages: 0,
            rating: None,
            rated: false,
            simple_tags: Vec::new(),
            favorite_slot: FavoriteSlot::None,
            simple_language: None,
        }
    }

    /// Returns a copy with the patch's fields overwritten.
    ///
    /// Identity, thumbnail size, viewer state and favorite slot are kept; the
    /// language is recomputed from the new tags and title.
    #[must_use]
    pub fn patched(&self, patch: &MetadataPatch) -> Self {
        let mut patched = Self {
            title: patch.title.clone(),
            title_jpn: patch.title_jpn.clone(),
            category: patch.category,
            thumb: Some(patch.thumb.clone()),
            uploader: Some(patch.uploader.clone()),
            posted: patch.posted.clone(),
            rating: patch.rating,
            simple_tags: patch.simple_tags.clone(),
            pages: patch.pages,
            ..self.clone()
        };
        patched.detect_language();
        patched
    }

    pub(crate) fn detect_language(&mut self) {
        self.simple_language = Language::detect(&self.simple_tags, &self.title);
    }
}

/// Replaces every summary a patch matches by `gid`. Patches without a match are ignored.
///
/// Returns how many summaries were replaced.
pub fn apply_patches(galleries: &mut [GallerySummary], patches: &[MetadataPatch]) -> usize {
    let mut applied = 0;
    for patch in patches {
        if let Some(gallery) = galleries.iter_mut().find(|gallery| gallery.gid == patch.gid) {
            *gallery = gallery.patched(patch);
            applied += 1;
        }
    }
    applied
}

/// A listing shared between readers and the one writer applying metadata patches.
///
/// Readers take owned snapshots, so a patch never changes a record someone is holding.
#[derive(Debug, Clone, Default)]
pub struct SharedGalleries(Arc<RwLock<Vec<GallerySummary>>>);

impl SharedGalleries {
    #[allow(missing_docs)]
    #[inline]
    #[must_use]
    pub fn new(galleries: Vec<GallerySummary>) -> Self {
        Self(Arc::new(RwLock::new(galleries)))
    }

    /// Replaces the whole listing, such as when the next page is appended by the caller.
    #[inline]
    pub fn replace(&self, galleries: Vec<GallerySummary>) {
        *self.0.write() = galleries;
    }

    /// Appends a page of galleries.
    #[inline]
    pub fn extend(&self, galleries: impl IntoIterator<Item = GallerySummary>) {
        self.0.write().extend(galleries);
    }

    /// Applies the patches under the write lock. See [`apply_patches`].
    #[inline]
    pub fn apply(&self, patches: &[MetadataPatch]) -> usize {
        apply_patches(&mut self.0.write(), patches)
    }

    /// An owned copy of the listing.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Vec<GallerySummary> {
        self.0.read().clone()
    }

    /// An owned copy of one gallery.
    #[inline]
    #[must_use]
    pub fn get(&self, gid: u64) -> Option<GallerySummary> {
        self.0.read().iter().find(|gallery| gallery.gid == gid).cloned()
    }

    #[allow(missing_docs)]
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    #[allow(missing_docs)]
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

/// Everything the detail page says about a gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryDetail {
    /// Fields shared with listings.
    pub summary: GallerySummary,
    /// Viewer id the API calls are authorized with; `-1` for guests.
    pub api_uid: i64,
    /// Key the API calls are authorized with.
    pub api_key: String,
    /// Empty when the page has no torrent link.
    pub torrent_url: String,
    #[allow(missing_docs)]
    pub torrent_count: u32,
    /// Empty when the page has no archive link.
    pub archive_url: String,
    #[allow(missing_docs)]
    pub language: String,
    /// File size as printed, such as `45.27 MiB`.
    pub size: String,
    /// Parent gallery URL, empty when there is none.
    pub parent: String,
    /// Visibility as printed, such as `Yes`.
    pub visible: String,
    #[allow(missing_docs)]
    pub favorite_count: u32,
    #[allow(missing_docs)]
    pub is_favorited: bool,
    /// The favorite slot name, when favorited.
    pub favorite_name: Option<String>,
    #[allow(missing_docs)]
    pub rating_count: u32,
    #[allow(missing_docs)]
    pub tags: Vec<TagGroup>,
    #[allow(missing_docs)]
    pub comments: CommentList,
    /// How many preview pages the gallery has.
    pub preview_pages: u32,
    /// Previews of the first preview page.
    pub preview_set: PreviewSet,
}
