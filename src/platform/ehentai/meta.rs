//! Contains metadata implementations for `e-hentai.org`.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::stdx::lazy::regex;

/// Hosts a gallery or page URL may point at.
pub const HOSTS: [&str; 3] = ["exhentai.org", "e-hentai.org", "lofi.e-hentai.org"];

/// Base of the forums, where relative avatar paths resolve against.
pub const FORUMS_URL: &str = "https://forums.e-hentai.org/";

/// An error that can occur when parsing a category name.
#[derive(Debug, Error)]
#[error("failed to parse `{0}` into `Category`")]
pub struct ParseCategoryError(String);

/// Represents the categories a gallery can be filed under.
#[derive(
    Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Category {
    #[allow(missing_docs)]
    Misc,
    #[allow(missing_docs)]
    Doujinshi,
    #[allow(missing_docs)]
    Manga,
    #[allow(missing_docs)]
    ArtistCg,
    #[allow(missing_docs)]
    GameCg,
    #[allow(missing_docs)]
    ImageSet,
    #[allow(missing_docs)]
    Cosplay,
    #[allow(missing_docs)]
    AsianPorn,
    #[allow(missing_docs)]
    NonH,
    #[allow(missing_docs)]
    Western,
    /// Anything the site labels in a way this crate does not know.
    #[default]
    Unknown,
}

impl Category {
    /// Every known category, in bit order.
    pub const ALL: [Self; 10] = [
        Self::Misc,
        Self::Doujinshi,
        Self::Manga,
        Self::ArtistCg,
        Self::GameCg,
        Self::ImageSet,
        Self::Cosplay,
        Self::AsianPorn,
        Self::NonH,
        Self::Western,
    ];

    /// Mask covering every known category.
    pub const MASK: u32 = 0x3ff;

    /// The bit this category occupies in search masks.
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::Misc => 0x1,
            Self::Doujinshi => 0x2,
            Self::Manga => 0x4,
            Self::ArtistCg => 0x8,
            Self::GameCg => 0x10,
            Self::ImageSet => 0x20,
            Self::Cosplay => 0x40,
            Self::AsianPorn => 0x80,
            Self::NonH => 0x100,
            Self::Western => 0x200,
            Self::Unknown => 0x400,
        }
    }

    /// The slug used in list URL paths, such as `/artistcg`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Misc => "misc",
            Self::Doujinshi => "doujinshi",
            Self::Manga => "manga",
            Self::ArtistCg => "artistcg",
            Self::GameCg => "gamecg",
            Self::ImageSet => "imageset",
            Self::Cosplay => "cosplay",
            Self::AsianPorn => "asianporn",
            Self::NonH => "non-h",
            Self::Western => "western",
            Self::Unknown => "unknown",
        }
    }

    /// Resolves a label as printed anywhere on the site, falling back to
    /// [`Category::Unknown`] rather than failing.
    #[must_use]
    pub fn resolve(label: &str) -> Self {
        label.parse().unwrap_or(Self::Unknown)
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();

        let category = match label.as_str() {
            "misc" => Self::Misc,
            "doujinshi" => Self::Doujinshi,
            "manga" => Self::Manga,
            "artistcg" | "artist cg sets" | "artist cg" => Self::ArtistCg,
            "gamecg" | "game cg sets" | "game cg" => Self::GameCg,
            "imageset" | "image sets" | "image set" => Self::ImageSet,
            "cosplay" => Self::Cosplay,
            "asianporn" | "asian porn" => Self::AsianPorn,
            "non-h" => Self::NonH,
            "western" => Self::Western,
            _ => return Err(ParseCategoryError(s.to_owned())),
        };

        Ok(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Where a gallery is filed as a favorite.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum FavoriteSlot {
    /// Not a favorite, or not known to be one.
    #[default]
    None,
    /// Saved by the host application only.
    Local,
    /// One of the ten remote slots, `0..=9`.
    Remote(u8),
}

impl FavoriteSlot {
    /// Number of remote slots an account has.
    pub const REMOTE_SLOTS: u8 = 10;

    /// The integer the site and most clients use: `-2` none, `-1` local, `0..=9` remote.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::None => -2,
            Self::Local => -1,
            Self::Remote(slot) => i32::from(slot),
        }
    }
}

/// Languages a gallery can be recognized as from its tags or title.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    English,
    Chinese,
    Spanish,
    Korean,
    Russian,
    French,
    Portuguese,
    Thai,
    German,
    Italian,
    Vietnamese,
    Polish,
    Hungarian,
    Dutch,
}

impl Language {
    const ALL: [Self; 14] = [
        Self::English,
        Self::Chinese,
        Self::Spanish,
        Self::Korean,
        Self::Russian,
        Self::French,
        Self::Portuguese,
        Self::Thai,
        Self::German,
        Self::Italian,
        Self::Vietnamese,
        Self::Polish,
        Self::Hungarian,
        Self::Dutch,
    ];

    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Chinese => "zh",
            Self::Spanish => "es",
            Self::Korean => "ko",
            Self::Russian => "ru",
            Self::French => "fr",
            Self::Portuguese => "pt",
            Self::Thai => "th",
            Self::German => "de",
            Self::Italian => "it",
            Self::Vietnamese => "vi",
            Self::Polish => "pl",
            Self::Hungarian => "hu",
            Self::Dutch => "nl",
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::English => "language:english",
            Self::Chinese => "language:chinese",
            Self::Spanish => "language:spanish",
            Self::Korean => "language:korean",
            Self::Russian => "language:russian",
            Self::French => "language:french",
            Self::Portuguese => "language:portuguese",
            Self::Thai => "language:thai",
            Self::German => "language:german",
            Self::Italian => "language:italian",
            Self::Vietnamese => "language:vietnamese",
            Self::Polish => "language:polish",
            Self::Hungarian => "language:hungarian",
            Self::Dutch => "language:dutch",
        }
    }

    fn matches_title(self, title: &str) -> bool {
        let regex = match self {
            Self::English => regex!(r"(?i)[(\[]eng(?:lish)?[)\]]|英訳"),
            Self::Chinese => {
                regex!(r"(?i)[(（\[]ch(?:inese)?[)）\]]|[汉漢]化|中[国國][语語]|中文|中国翻訳")
            }
            Self::Spanish => regex!(r"(?i)[(\[]spanish[)\]]|[(\[]Español[)\]]|スペイン翻訳"),
            Self::Korean => regex!(r"(?i)[(\[]korean?[)\]]|韓国翻訳"),
            Self::Russian => regex!(r"(?i)[(\[]rus(?:sian)?[)\]]|ロシア翻訳"),
            Self::French => regex!(r"(?i)[(\[]fr(?:ench)?[)\]]|フランス翻訳"),
            Self::Portuguese => regex!(r"(?i)[(\[]portuguese|ポルトガル翻訳"),
            Self::Thai => regex!(r"(?i)[(\[]thai(?: ภาษาไทย)?[)\]]|แปลไทย|タイ翻訳"),
            Self::German => regex!(r"(?i)[(\[]german[)\]]|ドイツ翻訳"),
            Self::Italian => regex!(r"(?i)[(\[]italiano?[)\]]|イタリア翻訳"),
            Self::Vietnamese => regex!(r"(?i)[(\[]vietnamese(?: Tiếng Việt)?[)\]]|ベトナム翻訳"),
            Self::Polish => regex!(r"(?i)[(\[]polish[)\]]|ポーランド翻訳"),
            Self::Hungarian => regex!(r"(?i)[(\[]hun(?:garian)?[)\]]|ハンガリー翻訳"),
            Self::Dutch => regex!(r"(?i)[(\[]dutch[)\]]|オランダ翻訳"),
        };

        regex.is_match(title)
    }

    /// Detects a language from `language:*` simple tags first, then from the title.
    #[must_use]
    pub fn detect(simple_tags: &[String], title: &str) -> Option<Self> {
        for tag in simple_tags {
            if let Some(language) = Self::ALL.into_iter().find(|language| language.tag() == tag) {
                return Some(language);
            }
        }

        Self::ALL
            .into_iter()
            .find(|language| language.matches_title(title))
    }
}
