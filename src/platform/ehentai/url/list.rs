use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use crate::platform::ehentai::meta::{Category, HOSTS};

/// What a gallery list link lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListMode {
    /// Front page or search results.
    #[default]
    Normal,
    /// `/uploader/NAME`; the keyword is the uploader name.
    Uploader,
    /// `/tag/NAME`; the keyword is the tag.
    Tag,
}

/// Options behind the "Show Advanced Options" panel of the search form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvancedSearch {
    /// Bit set of [`AdvancedSearch::SEARCH_NAME`] and friends.
    pub flags: u32,
    /// Minimum rating, when `f_sr` is on.
    pub min_rating: Option<i32>,
    /// First and last page count, when `f_sp` is on.
    pub page_range: Option<(Option<u32>, Option<u32>)>,
}

#[allow(missing_docs)]
impl AdvancedSearch {
    pub const SEARCH_NAME: u32 = 0x1;
    pub const SEARCH_TAGS: u32 = 0x2;
    pub const SEARCH_DESCRIPTION: u32 = 0x4;
    pub const SEARCH_TORRENT_FILENAMES: u32 = 0x8;
    pub const ONLY_WITH_TORRENTS: u32 = 0x10;
    pub const SEARCH_LOW_POWER_TAGS: u32 = 0x20;
    pub const SEARCH_DOWNVOTED_TAGS: u32 = 0x40;
    pub const SHOW_EXPUNGED: u32 = 0x80;
    pub const DISABLE_LANGUAGE_FILTER: u32 = 0x100;
    pub const DISABLE_UPLOADER_FILTER: u32 = 0x200;
    pub const DISABLE_TAGS_FILTER: u32 = 0x400;

    const KEYS: [(&'static str, u32); 11] = [
        ("f_sname", Self::SEARCH_NAME),
        ("f_stags", Self::SEARCH_TAGS),
        ("f_sdesc", Self::SEARCH_DESCRIPTION),
        ("f_storr", Self::SEARCH_TORRENT_FILENAMES),
        ("f_sto", Self::ONLY_WITH_TORRENTS),
        ("f_sdt1", Self::SEARCH_LOW_POWER_TAGS),
        ("f_sdt2", Self::SEARCH_DOWNVOTED_TAGS),
        ("f_sh", Self::SHOW_EXPUNGED),
        ("f_sfl", Self::DISABLE_LANGUAGE_FILTER),
        ("f_sfu", Self::DISABLE_UPLOADER_FILTER),
        ("f_sft", Self::DISABLE_TAGS_FILTER),
    ];
}

/// The search parameters encoded in a gallery list link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListUrl {
    #[allow(missing_docs)]
    pub mode: ListMode,
    /// Mask of [`Category::bit`] values; `0` means no category filter.
    pub category: u32,
    /// Search text, uploader name or tag, depending on [`ListUrl::mode`].
    pub keyword: Option<String>,
    /// Present only when the link enables advanced search.
    pub advanced: Option<AdvancedSearch>,
}

impl ListUrl {
    /// Reads the list parameters out of `url`.
    ///
    /// Strict parsing takes only absolute links to the known hosts. Loose parsing
    /// accepts any host, or none at all, as in `/tag/artist:foo` or `?f_search=x`.
    ///
    /// ```
    /// # use ehparse::platform::ehentai::url::{ListMode, ListUrl};
    /// let url = ListUrl::parse("https://e-hentai.org/tag/female%3Aglasses", true).unwrap();
    /// assert_eq!(ListMode::Tag, url.mode);
    /// assert_eq!(Some("female:glasses"), url.keyword.as_deref());
    /// ```
    #[must_use]
    pub fn parse(url: &str, strict: bool) -> Option<Self> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) if !strict => {
                Url::parse("https://e-hentai.org/").ok()?.join(url).ok()?
            }
            Err(_) => return None,
        };

        if strict && !url.host_str().is_some_and(|host| HOSTS.contains(&host)) {
            return None;
        }

        let path = url.path();

        if path.is_empty() || path == "/" {
            return Some(Self::from_query(url.query().unwrap_or_default()));
        }

        if let Some(name) = path.strip_prefix("/uploader/") {
            return Self::keyword(ListMode::Uploader, name);
        }

        if let Some(name) = path.strip_prefix("/tag/") {
            return Self::keyword(ListMode::Tag, name);
        }

        let segment = path.trim_start_matches('/');

        if segment.contains('/') {
            return None;
        }

        let category = match segment.parse::<u32>() {
            Ok(mask) => mask,
            Err(_) => segment.parse::<Category>().ok()?.bit(),
        };

        let mut list = Self::from_query(url.query().unwrap_or_default());
        list.category = category;
        Some(list)
    }

    fn keyword(mode: ListMode, segment: &str) -> Option<Self> {
        let segment = segment.split('/').next().unwrap_or_default();
        let keyword = urlencoding::decode(segment).ok()?;

        if keyword.is_empty() {
            return None;
        }

        Some(Self {
            mode,
            keyword: Some(keyword.into_owned()),
            ..Self::default()
        })
    }

    fn from_query(query: &str) -> Self {
        let mut category = 0;
        let mut keyword = None;
        let mut enabled = false;
        let mut advanced = AdvancedSearch::default();
        let mut min_rating = None;
        let mut rating_enabled = false;
        let mut page_from = None;
        let mut page_to = None;
        let mut pages_enabled = false;

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };

            if let Some(bit) = Self::category_key(key) {
                if value == "1" {
                    category |= bit;
                }
                continue;
            }

            if let Some(&(_, flag)) = AdvancedSearch::KEYS.iter().find(|(name, _)| *name == key) {
                if value == "on" {
                    advanced.flags |= flag;
                }
                continue;
            }

            match key {
                "f_cats" => {
                    let excluded = value.parse::<u32>().unwrap_or(Category::MASK);
                    category |= !excluded & Category::MASK;
                }
                "f_search" => {
                    let value = value.replace('+', " ");
                    if let Ok(text) = urlencoding::decode(&value) {
                        keyword = Some(text.into_owned());
                    }
                }
                "advsearch" => enabled = value == "1",
                "f_sr" => rating_enabled = value == "on",
                "f_srdd" => min_rating = Some(value.parse().unwrap_or(-1)),
                "f_sp" => pages_enabled = value == "on",
                "f_spf" => page_from = value.parse().ok(),
                "f_spt" => page_to = value.parse().ok(),
                _ => {}
            }
        }

        let advanced = enabled.then(|| {
            if rating_enabled {
                advanced.min_rating = Some(min_rating.unwrap_or(-1));
            }
            if pages_enabled {
                advanced.page_range = Some((page_from, page_to));
            }
            advanced
        });

        Self {
            mode: ListMode::Normal,
            category,
            keyword,
            advanced,
        }
    }

    fn category_key(key: &str) -> Option<u32> {
        let category = match key {
            "f_doujinshi" => Category::Doujinshi,
            "f_manga" => Category::Manga,
            "f_artistcg" => Category::ArtistCg,
            "f_gamecg" => Category::GameCg,
            "f_western" => Category::Western,
            "f_non-h" => Category::NonH,
            "f_imageset" => Category::ImageSet,
            "f_cosplay" => Category::Cosplay,
            "f_asianporn" => Category::AsianPorn,
            "f_misc" => Category::Misc,
            _ => return None,
        };

        Some(category.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_front_page() {
        assert_eq!(Some(ListUrl::default()), ListUrl::parse("https://e-hentai.org/", true));
        assert_eq!(Some(ListUrl::default()), ListUrl::parse("https://exhentai.org", true));
    }

    #[test]
    fn should_reject_unknown_host_when_strict() {
        assert_eq!(None, ListUrl::parse("https://example.org/", true));
        assert!(ListUrl::parse("https://example.org/", false).is_some());
        assert_eq!(None, ListUrl::parse("not a url", false));
    }

    #[test]
    fn should_accept_host_less_input_when_loose() {
        let tag = ListUrl::parse("/tag/artist:foo", false).unwrap();
        assert_eq!(ListMode::Tag, tag.mode);
        assert_eq!(Some("artist:foo"), tag.keyword.as_deref());

        let search = ListUrl::parse("?f_search=x", false).unwrap();
        assert_eq!(ListMode::Normal, search.mode);
        assert_eq!(Some("x"), search.keyword.as_deref());

        let category = ListUrl::parse("manga?f_search=y", false).unwrap();
        assert_eq!(Category::Manga.bit(), category.category);

        assert_eq!(None, ListUrl::parse("/tag/artist:foo", true));
        assert_eq!(None, ListUrl::parse("?f_search=x", true));
    }

    #[test]
    fn should_parse_search_query() {
        let url = ListUrl::parse(
            "https://e-hentai.org/?f_doujinshi=1&f_manga=1&f_search=touhou+project%21&f_apply=Apply+Filter",
            true,
        )
        .unwrap();

        assert_eq!(ListMode::Normal, url.mode);
        assert_eq!(Category::Doujinshi.bit() | Category::Manga.bit(), url.category);
        assert_eq!(Some("touhou project!"), url.keyword.as_deref());
        assert_eq!(None, url.advanced);
    }

    #[test]
    fn should_invert_f_cats() {
        // Everything but Doujinshi and Manga is excluded.
        let url = ListUrl::parse("https://e-hentai.org/?f_cats=1017", true).unwrap();
        assert_eq!(Category::Doujinshi.bit() | Category::Manga.bit(), url.category);
    }

    #[test]
    fn should_parse_advanced_search() {
        let url = ListUrl::parse(
            "https://e-hentai.org/?f_search=a&advsearch=1&f_sname=on&f_stags=on&f_sh=on&f_sr=on&f_srdd=4&f_sp=on&f_spf=10&f_spt=",
            true,
        )
        .unwrap();

        assert_eq!(
            Some(AdvancedSearch {
                flags: AdvancedSearch::SEARCH_NAME | AdvancedSearch::SEARCH_TAGS | AdvancedSearch::SHOW_EXPUNGED,
                min_rating: Some(4),
                page_range: Some((Some(10), None)),
            }),
            url.advanced
        );
    }

    #[test]
    fn should_ignore_advanced_fields_without_advsearch() {
        let url = ListUrl::parse("https://e-hentai.org/?f_sname=on&f_sr=on&f_srdd=4", true).unwrap();
        assert_eq!(None, url.advanced);
    }

    #[test]
    fn should_parse_uploader_and_tag_paths() {
        let url = ListUrl::parse("https://e-hentai.org/uploader/some%20one/2", true).unwrap();
        assert_eq!(ListMode::Uploader, url.mode);
        assert_eq!(Some("some one"), url.keyword.as_deref());

        let url = ListUrl::parse("https://e-hentai.org/tag/artist:foo", true).unwrap();
        assert_eq!(ListMode::Tag, url.mode);
        assert_eq!(Some("artist:foo"), url.keyword.as_deref());

        assert_eq!(None, ListUrl::parse("https://e-hentai.org/tag/", true));
    }

    #[test]
    fn should_parse_category_path() {
        let url = ListUrl::parse("https://e-hentai.org/2?f_search=x", true).unwrap();
        assert_eq!(2, url.category);
        assert_eq!(Some("x"), url.keyword.as_deref());

        let url = ListUrl::parse("https://e-hentai.org/doujinshi", true).unwrap();
        assert_eq!(Category::Doujinshi.bit(), url.category);

        assert_eq!(None, ListUrl::parse("https://e-hentai.org/watched", true));
        assert_eq!(None, ListUrl::parse("https://e-hentai.org/g/1/0123456789/", true));
    }
}
