//! Pages about the signed-in account: the forums log-on flow, the forum profile, and
//! the `home.php` overview.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{
    errors::{Error, PageKind, ParseFailure, Within},
    meta::FORUMS_URL,
    parser::Document,
};
use crate::stdx::{
    dom,
    error::{Assume, Assumption},
    lazy::{regex, selector},
    text,
};

/// The forum profile's display name and avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[allow(missing_docs)]
    pub display_name: String,
    /// Absolute avatar URL; relative ones are resolved against the forums.
    pub avatar: Option<String>,
}

/// The `home.php` overview. Every figure is optional, as the page layout is read by
/// position.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Home {
    /// Images viewed towards the limit.
    pub images_used: Option<u64>,
    pub image_limit: Option<u64>,
    /// GP it costs to reset the image limit.
    pub reset_cost: Option<u64>,
    pub gp_from_gallery_visits: Option<u64>,
    pub gp_from_torrent_completions: Option<u64>,
    pub gp_from_archive_downloads: Option<u64>,
    pub gp_from_hentai_at_home: Option<u64>,
    pub moderation_power: Option<u64>,
}

/// The display name the forums greet with after logging on.
pub(crate) fn parse_sign_in(body: &str) -> Result<String, Error> {
    if let Some(captures) = regex!(r"<p>You are now logged in as: (.+?)<").captures(body) {
        return Ok(text::trim(&captures[1]));
    }

    if let Some(captures) = regex!(
        r#"(?s)(?:<h4>The error returned was:</h4>\s*<p>(.+?)</p>)|(?:<span class="postcolor">(.+?)</span>)"#
    )
    .captures(body)
    {
        let message = captures.get(1).or_else(|| captures.get(2)).map_or("", |m| m.as_str());
        return Err(Error::ServerReportedError(text::trim(message)));
    }

    Err(ParseFailure::new(PageKind::SignIn, "no greeting and no error message", body).into())
}

/// The profile link in the forums' user bar.
pub(crate) fn parse_forums(body: &str) -> Result<String, Error> {
    let document = Document::new(body);
    profile_link(document.html().root_element()).within(PageKind::Forums, body)
}

fn profile_link(root: ElementRef<'_>) -> Result<String, Assumption> {
    let userlinks = dom::by_id(root, "userlinks").assumption("no `#userlinks` bar on forums page")?;

    let anchor = dom::child(userlinks, 0)
        .and_then(|list| dom::child(list, 0))
        .and_then(|item| dom::child(item, 0))
        .assumption("`#userlinks` bar has no leading link")?;

    dom::attr(anchor, "href")
        .map(str::to_owned)
        .assumption("`#userlinks` leading link has no `href`")
}

pub(crate) fn parse_profile(body: &str) -> Result<Profile, Error> {
    let document = Document::new(body);
    profile(document.html().root_element()).within(PageKind::Profile, body)
}

fn profile(root: ElementRef<'_>) -> Result<Profile, Assumption> {
    let profilename = dom::by_id(root, "profilename").assumption("no `#profilename` on profile page")?;

    let display_name = dom::child(profilename, 0)
        .map(dom::text)
        .assumption("`#profilename` is empty")?;

    let avatar = dom::next_element(profilename)
        .and_then(dom::next_element)
        .and_then(|block| dom::child(block, 0))
        .and_then(|image| dom::attr(image, "src"))
        .filter(|src| !src.is_empty())
        .and_then(|src| {
            if src.starts_with("http") {
                return Some(src.to_owned());
            }
            Url::parse(FORUMS_URL)
                .and_then(|forums| forums.join(src))
                .map(String::from)
                .ok()
        });

    if avatar.is_none() {
        debug!("profile has no avatar");
    }

    Ok(Profile { display_name, avatar })
}

pub(crate) fn parse_home(body: &str) -> Home {
    let document = Document::new(body);
    let boxes: Vec<ElementRef<'_>> = document.html().select(selector!(".homebox")).collect();

    let mut home = Home::default();

    if let Some(limits) = boxes.first() {
        image_limits(&mut home, *limits);
    }

    match boxes.get(2).map(|gained| gp_gained(&mut home, *gained)) {
        Some(Ok(())) => {}
        Some(Err(err)) => debug!(error = %err, "unreadable GP gained box"),
        None => debug!("no GP gained box"),
    }

    home.moderation_power = boxes.get(4).and_then(|power| moderation_power(*power));
    home
}

fn image_limits(home: &mut Home, limits: ElementRef<'_>) {
    let markup = limits.inner_html();
    let Some(captures) = regex!(
        r"(?s)<p>You are currently at <strong>(\d+)</strong> towards a limit of <strong>(\d+)</strong>.</p>.+?<p>Reset Cost: <strong>(\d+)</strong> GP</p>"
    )
    .captures(&markup) else {
        debug!("no image limits in first home box");
        return;
    };

    home.images_used = captures[1].parse().ok();
    home.image_limit = captures[2].parse().ok();
    home.reset_cost = captures[3].parse().ok();
}

/// A table of four rows, each leading with its figure.
fn gp_gained(home: &mut Home, gained: ElementRef<'_>) -> Result<(), Assumption> {
    let rows = dom::child(gained, 0)
        .and_then(|table| dom::child(table, 0))
        .assumption("GP gained box has no table")?;

    let figure = |index: usize| {
        dom::child(rows, index)
            .and_then(|row| dom::child(row, 0))
            .and_then(|cell| count(&dom::text(cell)))
    };

    home.gp_from_gallery_visits = figure(0);
    home.gp_from_torrent_completions = figure(1);
    home.gp_from_archive_downloads = figure(2);
    home.gp_from_hentai_at_home = figure(3);
    Ok(())
}

fn moderation_power(power: ElementRef<'_>) -> Option<u64> {
    let cell = dom::child(power, 0)
        .and_then(|table| dom::child(table, 0))
        .and_then(|rows| dom::child(rows, 0))
        .and_then(|row| dom::child(row, 0))
        .and_then(|cell| dom::child(cell, 1))?;

    count(&dom::text(cell))
}

fn count(figure: &str) -> Option<u64> {
    figure.replace(',', "").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_read_sign_in_name() {
        assert_eq!(
            Ok("someone".to_string()),
            parse_sign_in("<p>You are now logged in as: someone<br />")
        );
    }

    #[test]
    fn should_surface_sign_in_errors() {
        assert_eq!(
            Err(Error::ServerReportedError("Username or password incorrect".to_string())),
            parse_sign_in("<h4>The error returned was:</h4>\n<p>Username or password incorrect</p>")
        );
        assert_eq!(
            Err(Error::ServerReportedError("Too many attempts.".to_string())),
            parse_sign_in(r#"<span class="postcolor">Too many attempts.</span>"#)
        );
        assert!(matches!(parse_sign_in("<p>Hello</p>"), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn should_find_profile_link() {
        let body = r#"<div id="userlinks"><p class="home"><b>Logged in as: <a href="https://forums.e-hentai.org/index.php?showuser=1363542">someone</a></b></p></div>"#;
        assert_eq!(
            Ok("https://forums.e-hentai.org/index.php?showuser=1363542".to_string()),
            parse_forums(body)
        );
        assert!(matches!(parse_forums("<div></div>"), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn should_resolve_relative_avatar() {
        let body = r#"<div id="profilename"><span>someone</span></div><div>Member</div><div><img src="style_images/ambience/profile/av-1363542.jpg" /></div>"#;
        assert_eq!(
            Ok(Profile {
                display_name: "someone".to_string(),
                avatar: Some("https://forums.e-hentai.org/style_images/ambience/profile/av-1363542.jpg".to_string()),
            }),
            parse_profile(body)
        );
    }

    #[test]
    fn should_allow_missing_avatar() {
        let body = r#"<div id="profilename"><span>someone</span></div>"#;
        assert_eq!(None, parse_profile(body).unwrap().avatar);
    }

    #[test]
    fn should_read_home_boxes() {
        let body = r#"<div class="homebox"><p>You are currently at <strong>120</strong> towards a limit of <strong>5000</strong>.</p><p>This regenerates at a rate of 3 per minute.</p><p>Reset Cost: <strong>12</strong> GP</p></div><div class="homebox"></div><div class="homebox"><table><tr><td>1,204</td><td>GP from gallery visits</td></tr><tr><td>0</td><td>GP from torrent completions</td></tr><tr><td>35</td><td>GP from archive downloads</td></tr><tr><td>2,000</td><td>GP from Hentai@Home</td></tr></table></div><div class="homebox"></div><div class="homebox"><table><tr><td><span>Current Moderation Power</span><strong>1,234</strong></td></tr></table></div>"#;

        assert_eq!(
            Home {
                images_used: Some(120),
                image_limit: Some(5000),
                reset_cost: Some(12),
                gp_from_gallery_visits: Some(1204),
                gp_from_torrent_completions: Some(0),
                gp_from_archive_downloads: Some(35),
                gp_from_hentai_at_home: Some(2000),
                moderation_power: Some(1234),
            },
            parse_home(body)
        );
    }

    #[test]
    fn should_default_home_without_boxes() {
        assert_eq!(Home::default(), parse_home("<p>Not logged in</p>"));
    }
}
