//! JSON responses of `api.php` and of the endpoints answering script requests.
//!
//! Every response may carry an `error` field instead of its payload; that message is
//! surfaced verbatim as [`Error::ServerReportedError`](super::errors::Error::ServerReportedError).

pub mod metadata;
pub mod page;
pub mod rate;
pub mod token;
pub mod vote;

pub use metadata::MetadataPatch;
pub use rate::RatingResult;
pub use vote::CommentVote;
