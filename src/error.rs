use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// An empty transcript is not an error; it is reported as
/// [`Reply::NoCaptions`](crate::Reply::NoCaptions). Batch items fail inline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("too many requests, try again in {}s", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error("could not retrieve data for {id}: it may be private, deleted or unavailable")]
    UpstreamUnavailable { id: String },

    #[error("video {video_id} is not playable ({status}): {reason}")]
    VideoUnplayable {
        video_id: String,
        status: String,
        reason: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Soft failures of a single outbound call. These never leave the strategy
/// chain or the batch item that produced them.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unparsable response: {0}")]
    Parse(String),

    #[error("refusing to fetch from untrusted host: {0}")]
    UntrustedHost(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}
