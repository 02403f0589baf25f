//! The favorites page, `/favorites.php`.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use super::{
    errors::{self, Error, PageKind, Within},
    gallery::{ListPage, list},
    meta::FavoriteSlot,
    parser::{Document, Parser},
};
use crate::stdx::{
    dom,
    error::{Assume, Assumption, assumption},
    lazy::selector,
    text,
};

/// One of the ten remote favorite folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteFolder {
    /// Name the viewer gave the folder.
    pub name: String,
    /// Galleries filed there.
    pub count: u32,
}

/// The favorites page: the folder buttons and the listing below them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesPage {
    /// Indexed by remote slot, `0..10`.
    pub folders: Vec<FavoriteFolder>,
    /// The listing, with pagination.
    pub list: ListPage,
}

impl FavoritesPage {
    /// The folder a remote slot refers to.
    #[must_use]
    pub fn folder(&self, slot: FavoriteSlot) -> Option<&FavoriteFolder> {
        match slot {
            FavoriteSlot::Remote(slot) => self.folders.get(usize::from(slot)),
            FavoriteSlot::None | FavoriteSlot::Local => None,
        }
    }
}

pub(crate) fn parse(parser: &Parser, body: &str) -> Result<FavoritesPage, Error> {
    errors::check_sign_in(body)?;

    let document = Document::new(body);
    let folders = folders(document.html().root_element()).within(PageKind::Favorites, body)?;
    let list = list::parse(parser, &document)?;

    Ok(FavoritesPage { folders, list })
}

/// Ten folder buttons and the trailing "show all" button, all `.fp` under `.ido`.
fn folders(root: ElementRef<'_>) -> Result<Vec<FavoriteFolder>, Assumption> {
    let ido = root
        .select(selector!(".ido"))
        .next()
        .assumption("no `.ido` block on favorites page")?;

    let buttons: Vec<ElementRef<'_>> = ido.select(selector!(".fp")).collect();
    if buttons.len() != usize::from(FavoriteSlot::REMOTE_SLOTS) + 1 {
        assumption!(
            "expected {} `.fp` folder buttons, found {}",
            FavoriteSlot::REMOTE_SLOTS + 1,
            buttons.len()
        );
    }

    buttons
        .iter()
        .take(usize::from(FavoriteSlot::REMOTE_SLOTS))
        .map(|button| {
            let count = dom::child(*button, 0).assumption("`.fp` button has no count")?;
            let name = dom::child(*button, 2).assumption("`.fp` button has no name")?;

            Ok(FavoriteFolder {
                name: dom::text(name),
                count: text::parse_count(&dom::text(count), 0),
            })
        })
        .collect()
}
