//! Error types for channel resolution and catalog fetching.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Everything that can go wrong between receiving a request and producing a catalog.
///
/// The gateway is the only place these get translated into an HTTP status; everything below it
/// just propagates them with `?`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The caller left out something required, or sent something unparseable.
    #[error("{0}")]
    Validation(String),

    /// The channel reference did not lead to a channel ID.
    #[error("could not determine channel identity: {0}")]
    Resolution(String),

    /// A channel ID resolved, but the channels resource has nothing for it.
    #[error("could not fetch channel details for channelId={0}")]
    ChannelNotFound(String),

    /// The channel exists but exposes no uploads playlist in its content details.
    #[error("could not find uploads playlist for channelId={0}")]
    MissingUploadsPlaylist(String),

    /// YouTube answered with a non-2xx status.
    #[error("YouTube API error ({status}): {message}")]
    Upstream {
        /// HTTP status returned by the API.
        status: u16,
        /// `error.message` from the response body, or the raw body if it wasn't JSON.
        message: String,
    },

    /// The request never got a response.
    #[error("request to YouTube API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response came back 2xx but didn't have the shape we expected.
    #[error("unexpected YouTube API response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Whether the failure is the caller's to fix (bad input or a reference that names nothing).
    ///
    /// Client errors are not worth retrying as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Resolution(_))
    }

    /// The status the gateway answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
