use chrono::{TimeZone, Utc};
use ehparse::platform::ehentai::{
    Category, Error, FavoriteSlot, GalleryDetail, GalleryDetailUrl, Language, PageKind, Parser,
    SharedGalleries, Strategy, ThumbResolution,
    gallery::{Pages, Preview, PreviewSet},
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

const EXTENDED: &str = include_str!("fixtures/list_extended.html");
const THUMBNAIL: &str = include_str!("fixtures/list_thumbnail.html");
const DETAIL: &str = include_str!("fixtures/gallery_detail.html");
const FAVORITES: &str = include_str!("fixtures/favorites.html");

const OFFENSIVE: &str = "<p>(And if you choose to ignore this warning, you lose all rights to complain about it in the future.)</p>";

fn with_strategy(strategy: Strategy) -> Parser {
    Parser::builder().strategy(strategy).build()
}

#[test]
fn extended_list() -> anyhow::Result<()> {
    let page = Parser::new().gallery_list(EXTENDED)?;

    assert_eq!(Pages::Unbounded, page.pages);
    assert_eq!(Some(2_801_004), page.next_page);
    assert_eq!(2, page.galleries.len());

    let first = &page.galleries[0];
    assert_eq!(2_801_010, first.gid);
    assert_eq!("5c1a9e0f3b", first.token);
    assert_eq!("[Circle] Glasses Girl [English]", first.title);
    assert_eq!(Category::Manga, first.category);
    assert_eq!((250, 354), (first.thumb_width, first.thumb_height));
    assert_eq!(Some("2024-01-21 11:40"), first.posted.as_deref());
    assert_eq!(FavoriteSlot::Remote(4), first.favorite_slot);
    assert_eq!(Some(4.5), first.rating);
    assert!(!first.rated);
    assert_eq!(Some("translator"), first.uploader.as_deref());
    assert_eq!(32, first.pages);
    assert_eq!(
        vec![
            "language:english",
            "language:translated",
            "female:glasses",
            "female:schoolgirl uniform",
        ],
        first.simple_tags
    );
    assert_eq!(Some(Language::English), first.simple_language);

    let second = &page.galleries[1];
    assert_eq!(Category::NonH, second.category);
    assert_eq!(FavoriteSlot::None, second.favorite_slot);
    assert_eq!(Some(3.0), second.rating);
    assert_eq!(1, second.pages);
    assert_eq!(Some(Language::Chinese), second.simple_language);

    Ok(())
}

#[test]
fn thumbnail_list() -> anyhow::Result<()> {
    let page = Parser::new().gallery_list(THUMBNAIL)?;

    assert_eq!(Pages::Known(5), page.pages);
    assert_eq!(Some(1), page.next_page);

    // The expunged tile without a link is dropped.
    assert_eq!(2, page.galleries.len());

    let first = &page.galleries[0];
    assert_eq!(1_893_250, first.gid);
    assert_eq!("[Artist] Sketchbook Vol. 2", first.title);
    assert_eq!(Category::ArtistCg, first.category);
    assert_eq!(
        Some("https://ehgt.org/w/01/230/53451-4k0bb1wq.jpg"),
        first.thumb.as_deref()
    );
    assert_eq!((240, 340), (first.thumb_width, first.thumb_height));
    assert_eq!(FavoriteSlot::Remote(1), first.favorite_slot);
    assert_eq!(Some(4.0), first.rating);
    assert!(first.rated);
    assert_eq!(148, first.pages);
    assert_eq!(None, first.uploader);
    assert_eq!(vec!["artist:someone", "other:full color"], first.simple_tags);

    let second = &page.galleries[1];
    assert_eq!(Category::Cosplay, second.category);
    assert_eq!(Some(5.0), second.rating);
    assert_eq!(60, second.pages);
    assert!(second.simple_tags.is_empty());

    Ok(())
}

#[test]
fn local_favorites_fill_unmarked_rows() -> anyhow::Result<()> {
    let parser = Parser::builder()
        .local_favorites(HashSet::from([1_893_001_u64, 1_893_250]))
        .build();

    let page = parser.gallery_list(THUMBNAIL)?;

    assert_eq!(FavoriteSlot::Remote(1), page.galleries[0].favorite_slot);
    assert_eq!(FavoriteSlot::Local, page.galleries[1].favorite_slot);

    Ok(())
}

#[test]
fn gallery_detail() -> anyhow::Result<()> {
    let detail = Parser::new().gallery_detail(DETAIL)?;

    assert_eq!(2_801_010, detail.summary.gid);
    assert_eq!("5c1a9e0f3b", detail.summary.token);
    assert_eq!(-1, detail.api_uid);
    assert_eq!("0a1b2c3d4e5f60718293", detail.api_key);
    assert_eq!(
        "https://e-hentai.org/gallerytorrents.php?gid=2801010&t=5c1a9e0f3b",
        detail.torrent_url
    );
    assert_eq!(1, detail.torrent_count);
    assert_eq!(
        "https://e-hentai.org/archiver.php?gid=2801010&token=5c1a9e0f3b",
        detail.archive_url
    );

    assert_eq!("[Circle (Artist)] Summer Notes [English]", detail.summary.title);
    assert_eq!(
        Some("[サークル (作者)] 夏のノート [英訳]"),
        detail.summary.title_jpn.as_deref()
    );
    assert_eq!(Category::Manga, detail.summary.category);
    assert_eq!(Some("translator"), detail.summary.uploader.as_deref());
    assert_eq!((250, 353), (detail.summary.thumb_width, detail.summary.thumb_height));

    assert_eq!(Some("2024-01-21 11:40"), detail.summary.posted.as_deref());
    assert_eq!("", detail.parent);
    assert_eq!("Yes", detail.visible);
    assert_eq!("English", detail.language);
    assert_eq!("45.27 MiB", detail.size);
    assert_eq!(32, detail.summary.pages);
    assert_eq!(1, detail.favorite_count);

    assert_eq!(Some(4.43), detail.summary.rating);
    assert_eq!(87, detail.rating_count);
    assert!(detail.is_favorited);
    assert_eq!(Some("To Read"), detail.favorite_name.as_deref());

    assert_eq!(
        vec![
            "language:english",
            "language:translated",
            "group:circle",
            "female:glasses",
            "female:swimsuit",
        ],
        detail.summary.simple_tags
    );
    assert_eq!(Some(Language::English), detail.summary.simple_language);

    assert_eq!(2, detail.preview_pages);
    let PreviewSet::Sheet(ref sheets) = detail.preview_set else {
        panic!("expected sprite sheet previews, got {:?}", detail.preview_set);
    };
    assert_eq!(2, sheets.len());
    assert_eq!((1, 100, 0), (sheets[1].index, sheets[1].crop_x, sheets[1].crop_y));
    assert_eq!(
        Some("https://e-hentai.org/s/77a0b1c2d3/2801010-2"),
        detail.preview_set.get(1).as_ref().map(Preview::link_url)
    );

    Ok(())
}

#[test]
fn gallery_detail_comments() -> anyhow::Result<()> {
    let comments = with_strategy(Strategy::Dom).comments(DETAIL)?;

    assert_eq!(2, comments.comments.len());
    assert!(!comments.has_more);

    let uploader = &comments.comments[0];
    assert_eq!(0, uploader.id);
    assert_eq!("translator", uploader.author);
    assert!(!uploader.vote_up_allowed);

    let reader = &comments.comments[1];
    assert_eq!(4_519_230, reader.id);
    assert_eq!("reader", reader.author);
    assert_eq!(Utc.with_ymd_and_hms(2024, 1, 22, 8, 15, 0).unwrap(), reader.posted);
    assert_eq!(12, reader.score);
    assert_eq!("Base +3, someone +9", reader.vote_state);
    assert_eq!("Great translation", reader.body_html);
    assert!(reader.vote_up_allowed && reader.vote_up_voted);
    assert!(reader.vote_down_allowed && !reader.vote_down_voted);
    assert!(!reader.editable);

    let patterns = with_strategy(Strategy::Regex).comments(DETAIL)?;
    assert_eq!(
        vec!["translator", "reader"],
        patterns
            .comments
            .iter()
            .map(|comment| comment.author.as_str())
            .collect::<Vec<_>>()
    );

    Ok(())
}

#[test]
fn gallery_detail_strategies_agree() -> anyhow::Result<()> {
    let without_comments = |mut detail: GalleryDetail| {
        detail.comments = Default::default();
        detail
    };

    let dom = without_comments(with_strategy(Strategy::Dom).gallery_detail(DETAIL)?);
    let regex = without_comments(with_strategy(Strategy::Regex).gallery_detail(DETAIL)?);

    assert_eq!(dom, regex);

    Ok(())
}

#[test]
fn gallery_detail_falls_back_to_patterns() -> anyhow::Result<()> {
    // Without the `#cdiv` container the tree walk fails on comments alone.
    let body = DETAIL.replace(r#"<div id="cdiv" class="gm">"#, r#"<div class="gm">"#);

    assert!(matches!(
        with_strategy(Strategy::Dom).comments(&body),
        Err(Error::ParseFailure(failure)) if failure.kind == PageKind::Comments
    ));

    let comments = Parser::new().comments(&body)?;
    assert_eq!(2, comments.comments.len());

    Ok(())
}

#[test]
fn gallery_detail_resolution_and_pages() -> anyhow::Result<()> {
    let parser = Parser::builder()
        .thumb_resolution(ThumbResolution::Px300)
        .build();

    let detail = parser.gallery_detail(DETAIL)?;
    assert_eq!(
        Some("https://ehgt.org/3f/0a/3f0a9f7c1f2d-1200-1697-jpg_300.jpg"),
        detail.summary.thumb.as_deref()
    );

    assert_eq!(32, parser.gallery_pages(DETAIL)?);
    assert_eq!(2, parser.preview_pages(DETAIL)?);
    assert_eq!(3, parser.tag_groups(DETAIL)?.len());

    Ok(())
}

#[test]
fn banners_win_over_content() {
    let parser = Parser::new();

    let offensive = DETAIL.replace("<body>", &format!("<body>{OFFENSIVE}"));
    assert_eq!(Err(Error::OffensiveContent), parser.gallery_detail(&offensive));

    let pining = DETAIL.replace("<body>", "<body><p>This gallery is pining for the fjords.</p>");
    assert_eq!(Err(Error::RemovedOrPlaceholder), parser.gallery_detail(&pining));

    let both = DETAIL.replace(
        "<body>",
        &format!("<body><p>This gallery is pining for the fjords.</p>{OFFENSIVE}"),
    );
    for strategy in [Strategy::Dom, Strategy::Regex, Strategy::DomThenRegex] {
        assert_eq!(
            Err(Error::OffensiveContent),
            with_strategy(strategy).gallery_detail(&both)
        );
    }

    let removed = "<div class=\"d\">\n<p>This gallery has been removed or is unavailable.</p></div>";
    assert_eq!(
        Err(Error::ServerReportedError(
            "This gallery has been removed or is unavailable.".to_string()
        )),
        parser.gallery_detail(removed)
    );
}

#[test]
fn favorites() -> anyhow::Result<()> {
    let favorites = Parser::new().favorites(FAVORITES)?;

    assert_eq!(10, favorites.folders.len());
    assert_eq!("To Read", favorites.folders[0].name);
    assert_eq!(1_024, favorites.folders[0].count);
    assert_eq!(
        Some(57),
        favorites
            .folder(FavoriteSlot::Remote(2))
            .map(|folder| folder.count)
    );
    assert_eq!("Archive", favorites.folders[9].name);

    assert_eq!(Pages::Known(1), favorites.list.pages);
    assert_eq!(None, favorites.list.next_page);

    let gallery = &favorites.list.galleries[0];
    assert_eq!(FavoriteSlot::Remote(0), gallery.favorite_slot);
    assert_eq!(
        Some("To Read"),
        favorites
            .folder(gallery.favorite_slot)
            .map(|folder| folder.name.as_str())
    );
    assert_eq!(Some(3.5), gallery.rating);
    assert_eq!(32, gallery.pages);

    Ok(())
}

#[test]
fn favorites_require_sign_in() {
    let body = "<div class=\"d\"><p>This page requires you to log on.</p></div>";
    assert_eq!(Err(Error::NeedSignIn), Parser::new().favorites(body).map(|_| ()));
}

#[test]
fn metadata_patches_refresh_a_shared_listing() -> anyhow::Result<()> {
    let parser = Parser::new();
    let page = parser.gallery_list(EXTENDED)?;
    let shared = SharedGalleries::new(page.galleries);
    let before = shared.snapshot();

    let gdata = r#"{"gmetadata":[{"gid":2801004,"token":"0e0d5a1c77","title":"(Comic) [Artist] Glasses [English]","title_jpn":"(コミック) [作者] 眼鏡 [英訳]","category":"Doujinshi","thumb":"https://ehgt.org/9b/21/9b21c0a1e0d4-991-1371-jpg_l.jpg","uploader":"artist","posted":"1705834920","filecount":"2","filesize":1048576,"expunged":false,"rating":"4.12","torrentcount":"0","tags":["language:english","female:glasses"]},{"gid":99,"error":"Key missing, or incorrect key provided."}]}"#;

    let patches = parser.gallery_metadata_api(gdata)?;
    assert_eq!(1, patches.len());
    assert_eq!(1, shared.apply(&patches));

    let patched = shared.get(2_801_004).expect("gallery is still listed");
    assert_eq!("(Comic) [Artist] Glasses [English]", patched.title);
    assert_eq!(Category::Doujinshi, patched.category);
    assert_eq!(Some("2024-01-21 11:02"), patched.posted.as_deref());
    assert_eq!(Some(4.12), patched.rating);
    assert_eq!(2, patched.pages);
    assert_eq!(Some(Language::English), patched.simple_language);
    assert_eq!((250, 345), (patched.thumb_width, patched.thumb_height));

    // Snapshots taken before the patch keep their values.
    assert_eq!(Category::NonH, before[1].category);
    assert_eq!(Some(Language::Chinese), before[1].simple_language);

    Ok(())
}

#[test]
fn listing_links_round_trip() -> anyhow::Result<()> {
    let page = Parser::new().gallery_list(EXTENDED)?;

    for gallery in &page.galleries {
        let url = GalleryDetailUrl {
            gid: gallery.gid,
            token: gallery.token.clone(),
        };
        assert_eq!(Some(url.clone()), GalleryDetailUrl::parse(&url.to_string(), true));
    }

    Ok(())
}
