//! `votecomment` responses.

use serde::{Deserialize, Serialize};

use crate::platform::ehentai::errors::{Error, PageKind, Within};

/// A comment's score after a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentVote {
    /// Comment id.
    pub id: u64,
    /// Score after the vote.
    pub score: i32,
    /// The viewer's standing vote: `1`, `-1`, or `0` once withdrawn.
    pub vote: i32,
    /// The vote the caller sent, to tell a withdrawal from a new vote.
    pub expected_vote: i32,
}

#[derive(Debug, Deserialize)]
struct RawVote {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    comment_id: u64,
    #[serde(default)]
    comment_score: i32,
    #[serde(default)]
    comment_vote: i32,
}

pub(crate) fn parse(body: &str, expected_vote: i32) -> Result<CommentVote, Error> {
    let raw = serde_json::from_str::<RawVote>(body).within(PageKind::VoteCommentApi, body)?;

    if let Some(error) = raw.error {
        return Err(Error::ServerReportedError(error));
    }

    Ok(CommentVote {
        id: raw.comment_id,
        score: raw.comment_score,
        vote: raw.comment_vote,
        expected_vote,
    })
}
