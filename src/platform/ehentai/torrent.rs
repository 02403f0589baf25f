//! The torrent list popup, `/gallerytorrents.php`.

use serde::{Deserialize, Serialize};

use super::errors::{self, Error};
use crate::stdx::{lazy::regex, text};

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    /// Download link with the personalized `?p=` suffix removed, so it can be shared.
    pub url: String,
    pub name: String,
}

pub(crate) fn parse(body: &str) -> Result<Vec<Torrent>, Error> {
    errors::check_error_banner(body)?;

    let torrents = regex!(r#"<td colspan="5"> &nbsp; <a href="([^"]+)"[^<]+>([^<]+)</a></td>"#)
        .captures_iter(body)
        .map(|captures| {
            let mut url = text::trim(&captures[1]);
            if let Some(index) = url.find("?p=") {
                url.truncate(index);
            }

            Torrent {
                url,
                name: text::trim(&captures[2]),
            }
        })
        .collect();

    Ok(torrents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_strip_personal_suffix() {
        let body = r#"<table><tr><td colspan="5"> &nbsp; <a href="https://ehtracker.org/get/530350/0123456789abcdef.torrent?p=abcdef" onclick="document.location='x'; return false">[Group] Some Title [English].zip</a></td></tr><tr><td colspan="5"> &nbsp; <a href="https://ehtracker.org/get/530350/fedcba.torrent" onclick="return false">Other &amp; Title</a></td></tr></table>"#;

        assert_eq!(
            vec![
                Torrent {
                    url: "https://ehtracker.org/get/530350/0123456789abcdef.torrent".to_string(),
                    name: "[Group] Some Title [English].zip".to_string(),
                },
                Torrent {
                    url: "https://ehtracker.org/get/530350/fedcba.torrent".to_string(),
                    name: "Other & Title".to_string(),
                },
            ],
            parse(body).unwrap()
        );
    }

    #[test]
    fn should_be_empty_without_torrents() {
        assert_eq!(Vec::<Torrent>::new(), parse("<p>There are no torrents for this gallery.</p>").unwrap());
    }
}
