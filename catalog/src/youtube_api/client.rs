//! Core YouTube API client functionality.

use crate::error::{CatalogError, Result};
use crate::youtube_api::{
    channels::ChannelListResponse,
    playlist_items::{PlaylistItem, PlaylistItemListResponse},
    search::{SearchListResponse, SearchResult},
    types::{ErrorResponse, PagedStream},
    videos::{Video, VideoListResponse},
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The largest `maxResults` any list endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 50;

/// Client for the read-only parts of the YouTube Data API v3.
///
/// All requests are authenticated with an API key passed as the `key` query parameter, so the
/// client only ever sees public data. Cloning is cheap: the underlying [`reqwest::Client`] is
/// reference counted and pools connections across clones.
#[derive(Clone)]
pub struct YouTubeClient {
    /// API key appended to every request
    api_key: String,
    /// Base URL without a trailing slash, e.g. [`DEFAULT_API_BASE_URL`]
    base_url: Arc<str>,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the key is a credential, keep it out of logs
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a client talking to [`DEFAULT_API_BASE_URL`] with the given API key.
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Arc::from(DEFAULT_API_BASE_URL),
            client,
        }
    }

    /// Points the client at a different API root.
    ///
    /// Mostly useful for talking to a local stand-in of the API.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Arc::from(base_url.trim_end_matches('/'));
        self
    }

    /// Makes a GET request against `endpoint` and decodes the JSON body.
    ///
    /// Any non-2xx status becomes [`CatalogError::Upstream`], carrying the status and the
    /// `error.message` YouTube puts in its error bodies (or the raw body if it isn't one).
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query_params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(query_params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|source| CatalogError::Decode { endpoint, source })
    }

    /// Looks up channels by `@handle` (given without the `@`).
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list> (`forHandle`)
    #[instrument(skip(self))]
    pub async fn channels_for_handle(&self, handle: &str) -> Result<ChannelListResponse> {
        let channels: ChannelListResponse = self
            .get("channels", &[("part", "id"), ("forHandle", handle)])
            .await?;
        tracing::debug!(
            returned_items = channels.items.len(),
            "looked up channel by handle"
        );
        Ok(channels)
    }

    /// Looks up channels by legacy username (the `/user/<name>` kind).
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list> (`forUsername`)
    #[instrument(skip(self))]
    pub async fn channels_for_username(&self, username: &str) -> Result<ChannelListResponse> {
        let channels: ChannelListResponse = self
            .get("channels", &[("part", "id"), ("forUsername", username)])
            .await?;
        tracing::debug!(
            returned_items = channels.items.len(),
            "looked up channel by username"
        );
        Ok(channels)
    }

    /// Fetches the given `part`s of a single channel by ID.
    ///
    /// # Arguments
    ///
    /// * `channel_id` - The canonical channel ID
    /// * `part` - Comma-separated resource parts, e.g. `snippet,statistics` or `contentDetails`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn list_channel(&self, channel_id: &str, part: &str) -> Result<ChannelListResponse> {
        let channels: ChannelListResponse = self
            .get("channels", &[("part", part), ("id", channel_id)])
            .await?;
        tracing::debug!(returned_items = channels.items.len(), "fetched channel");
        Ok(channels)
    }

    /// Free-text channel search, returning at most the best match.
    ///
    /// This costs 100 quota units, so it is only used as a last resort.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search_channels(&self, query: &str) -> Result<SearchListResponse> {
        let results: SearchListResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", query),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        tracing::debug!(returned_items = results.items.len(), "searched for channel");
        Ok(results)
    }

    /// Fetches a single video's snippet, or `None` if no such (public) video exists.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let videos: VideoListResponse = self
            .get("videos", &[("part", "snippet"), ("id", video_id)])
            .await?;
        tracing::debug!(returned_items = videos.items.len(), "fetched video");
        Ok(videos.items.into_iter().next())
    }

    /// Returns a paginated stream over the items of a playlist, in playlist order.
    ///
    /// For a channel's uploads playlist that order is newest first. Every page asks for
    /// `page_size` items (clamped to `1..=50`); pages are only fetched as the stream is consumed.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    pub fn list_playlist_items<'a>(
        &'a self,
        playlist_id: &'a str,
        page_size: usize,
    ) -> impl Stream<Item = Result<PlaylistItem>> + 'a {
        PagedStream::new(move |page_token| async move {
            let response = self
                .list_playlist_items_page(playlist_id, page_size, page_token)
                .await?;
            Ok((response.items, response.next_page_token))
        })
    }

    /// Returns a paginated stream over a channel's videos, newest first, using `search.list`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    pub fn search_channel_videos<'a>(
        &'a self,
        channel_id: &'a str,
        page_size: usize,
    ) -> impl Stream<Item = Result<SearchResult>> + 'a {
        PagedStream::new(move |page_token| async move {
            let response = self
                .search_channel_videos_page(channel_id, page_size, page_token)
                .await?;
            Ok((response.items, response.next_page_token))
        })
    }

    /// Fetches one page of `playlistItems.list`.
    #[instrument(skip(self))]
    async fn list_playlist_items_page(
        &self,
        playlist_id: &str,
        page_size: usize,
        page_token: Option<String>,
    ) -> Result<PlaylistItemListResponse> {
        let max_results_string = page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut query_params = vec![
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results_string.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let items: PlaylistItemListResponse = self.get("playlistItems", &query_params).await?;

        tracing::debug!(
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            has_next_page = items.next_page_token.is_some(),
            "fetched playlist items"
        );

        Ok(items)
    }

    /// Fetches one page of `search.list` restricted to a channel's videos.
    #[instrument(skip(self))]
    async fn search_channel_videos_page(
        &self,
        channel_id: &str,
        page_size: usize,
        page_token: Option<String>,
    ) -> Result<SearchListResponse> {
        let max_results_string = page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut query_params = vec![
            ("part", "snippet"),
            ("channelId", channel_id),
            ("order", "date"),
            ("type", "video"),
            ("maxResults", max_results_string.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let results: SearchListResponse = self.get("search", &query_params).await?;

        tracing::debug!(
            total_results = results.page_info.total_results,
            returned_items = results.items.len(),
            has_next_page = results.next_page_token.is_some(),
            "fetched channel videos from search"
        );

        Ok(results)
    }
}

/// Builds the error for a non-2xx response, preferring the message in Google's error envelope.
fn upstream_error(status: reqwest::StatusCode, body: &str) -> CatalogError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "YouTube API request failed");
    CatalogError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockUpstream;
    use serde_json::json;
    use tokio_stream::StreamExt;

    #[test]
    fn upstream_error_prefers_google_message() {
        let body = json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{ "reason": "quotaExceeded", "domain": "youtube.quota" }]
            }
        })
        .to_string();
        let err = upstream_error(reqwest::StatusCode::FORBIDDEN, &body);
        let CatalogError::Upstream { status, ref message } = err else {
            panic!("{err:?}");
        };
        assert_eq!(status, 403);
        assert!(message.contains("exceeded your quota"), "{message}");
    }

    #[test]
    fn upstream_error_falls_back_to_raw_body_then_reason() {
        let err = upstream_error(reqwest::StatusCode::BAD_GATEWAY, "  upstream hiccup \n");
        assert!(matches!(
            err,
            CatalogError::Upstream { status: 502, ref message } if message == "upstream hiccup"
        ));

        let err = upstream_error(reqwest::StatusCode::NOT_FOUND, "");
        assert!(matches!(
            err,
            CatalogError::Upstream { status: 404, ref message } if message == "Not Found"
        ));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let yt = YouTubeClient::new("super-secret", reqwest::Client::new());
        let debug = format!("{yt:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(DEFAULT_API_BASE_URL));
    }

    #[tokio::test]
    async fn every_request_carries_the_key() {
        let upstream = MockUpstream::start(|_| (200, json!({ "items": [] }))).await;
        let yt = upstream.client("k-123");

        let channels = yt.channels_for_handle("somebody").await.unwrap();
        assert!(channels.items.is_empty());

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/channels");
        assert_eq!(requests[0].param("key"), Some("k-123"));
        assert_eq!(requests[0].param("forHandle"), Some("somebody"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let upstream =
            MockUpstream::start_raw(|_| (200, "<html>captive portal</html>".into())).await;
        let err = upstream.client("k").get_video("abc").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode { endpoint: "videos", .. }));
    }

    #[tokio::test]
    async fn page_size_is_clamped_to_api_limit() {
        let upstream = MockUpstream::start(|_| (200, json!({ "items": [] }))).await;
        let yt = upstream.client("k");
        let stream = yt.list_playlist_items("UUabc", 500);
        let items: Vec<_> = stream.collect().await;
        assert!(items.is_empty());
        assert_eq!(upstream.requests()[0].param("maxResults"), Some("50"));
    }
}
