//! YouTube Search API types.
//!
//! Search results are a different shape from the resources they point at: the ID is an object
//! whose populated field depends on the result `kind`.

use crate::youtube_api::types::{PageInfo, Thumbnails};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: VecDeque<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Option<SearchResultSnippet>,
}

/// Identifies the resource a search result points at.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchResultId {
    /// `youtube#video`, `youtube#channel` or `youtube#playlist`.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
    #[serde(rename = "channelId", default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchResultSnippet {
    /// The channel that published the resource (for channel results, the channel itself).
    #[serde(rename = "channelId", default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

impl SearchResult {
    /// The channel this result belongs to.
    ///
    /// For `type=channel` searches the ID object carries it; the snippet carries it for every
    /// result kind, so that is the fallback.
    pub fn channel_id(&self) -> Option<&str> {
        self.id
            .channel_id
            .as_deref()
            .or_else(|| self.snippet.as_ref()?.channel_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}
