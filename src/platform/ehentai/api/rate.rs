//! `rategallery` responses.

use serde::{Deserialize, Serialize};

use crate::{
    platform::ehentai::errors::{Error, PageKind, Within},
    stdx::serde::{f32_from_string, u32_from_string},
};

/// The gallery's rating after the viewer's vote was counted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    /// Average, `0.0..=5.0`.
    pub rating: f32,
    #[allow(missing_docs)]
    pub rating_count: u32,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "f32_from_string")]
    rating_avg: f32,
    #[serde(default, deserialize_with = "u32_from_string")]
    rating_cnt: u32,
}

pub(crate) fn parse(body: &str) -> Result<RatingResult, Error> {
    let raw = serde_json::from_str::<RawRating>(body).within(PageKind::RateGalleryApi, body)?;

    if let Some(error) = raw.error {
        return Err(Error::ServerReportedError(error));
    }

    Ok(RatingResult {
        rating: raw.rating_avg,
        rating_count: raw.rating_cnt,
    })
}
