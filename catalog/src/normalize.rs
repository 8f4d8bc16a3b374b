//! Local video and channel representations, and the mappings into them.
//!
//! YouTube describes the same video differently depending on which resource it came from (a
//! search result, a playlist item, a video), so there is one mapping function per upstream shape
//! and they all land on [`VideoSummary`]. Every nested field upstream is treated as optional:
//! a missing thumbnail or statistic leaves a hole in the summary, it never fails the record.

use crate::youtube_api::{
    channels::Channel, playlist_items::PlaylistItem, search::SearchResult, types::Thumbnails,
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Prefix of the canonical watch URL; the video ID is appended.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A video as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Best available thumbnail, or an empty string if the video has none.
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    /// Canonical watch URL, see [`watch_url`].
    #[serde(alias = "videoUrl")]
    pub url: String,
}

/// A channel as handed to callers.
///
/// The counters are `None` when YouTube did not report them, which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub thumbnails: ChannelThumbnails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

/// Channel avatar URLs by size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelThumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
}

/// The canonical watch URL of a video.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// Picks `high`, then `medium`, then `default`; empty string if none is there.
pub fn best_thumbnail(thumbnails: Option<&Thumbnails>) -> String {
    thumbnails
        .and_then(|t| t.high.as_ref().or(t.medium.as_ref()).or(t.default.as_ref()))
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

/// Parses one of YouTube's stringly-typed `uint64` counters.
///
/// Missing and garbage both come out as `None`.
pub fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse().ok()
}

/// Maps a `channels.list` item to a [`ChannelSummary`]. A hidden subscriber count becomes `None`.
pub fn channel_summary(channel: Channel) -> ChannelSummary {
    let snippet = channel.snippet.unwrap_or_default();
    let statistics = channel.statistics.unwrap_or_default();
    let thumbnails = snippet.thumbnails.unwrap_or_default();

    let subscriber_count = if statistics.hidden_subscriber_count == Some(true) {
        None
    } else {
        parse_count(statistics.subscriber_count.as_deref())
    };

    ChannelSummary {
        id: channel.id,
        title: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        custom_url: snippet.custom_url.filter(|url| !url.is_empty()),
        thumbnails: ChannelThumbnails {
            default: thumbnails.default.map(|t| t.url),
            medium: thumbnails.medium.map(|t| t.url),
            high: thumbnails.high.map(|t| t.url),
        },
        published_at: snippet.published_at,
        subscriber_count,
        video_count: parse_count(statistics.video_count.as_deref()),
        view_count: parse_count(statistics.view_count.as_deref()),
    }
}

/// Maps an uploads-playlist entry. Entries without a video ID are not videos we can link to and
/// map to `None`.
///
/// The publish time is the video's own (`videoPublishedAt`) when present, and the time the item
/// was added to the playlist otherwise.
pub fn video_from_playlist_item(item: PlaylistItem) -> Option<VideoSummary> {
    let details = item.content_details.unwrap_or_default();
    let id = details.video_id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet.unwrap_or_default();

    Some(VideoSummary {
        url: watch_url(&id),
        thumbnail_url: best_thumbnail(snippet.thumbnails.as_ref()),
        title: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        published_at: details.video_published_at.or(snippet.published_at),
        id,
    })
}

/// Maps a `type=video` search hit. Hits that aren't videos map to `None`.
pub fn video_from_search_result(result: SearchResult) -> Option<VideoSummary> {
    let id = result.id.video_id.filter(|id| !id.is_empty())?;
    let snippet = result.snippet.unwrap_or_default();

    Some(VideoSummary {
        url: watch_url(&id),
        thumbnail_url: best_thumbnail(snippet.thumbnails.as_ref()),
        title: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        published_at: snippet.published_at,
        id,
    })
}
