//! Fetching a channel's details and videos once its ID is known.

use crate::error::{CatalogError, Result};
use crate::normalize::{
    ChannelSummary, VideoSummary, channel_summary, video_from_playlist_item,
    video_from_search_result,
};
use crate::reference::ChannelReference;
use crate::resolver::{self, ChannelId};
use crate::youtube_api::YouTubeClient;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::instrument;

/// How many videos a video listing returns when the caller doesn't say.
pub const DEFAULT_VIDEO_LIMIT: usize = 50;

/// How many recent videos come with a channel's details when the caller doesn't say.
pub const DEFAULT_CHANNEL_VIDEO_LIMIT: usize = 20;

/// A channel together with its most recent videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWithVideos {
    pub channel: ChannelSummary,
    pub videos: Vec<VideoSummary>,
}

/// Fetches a channel's snippet and statistics.
#[instrument(skip(yt))]
pub async fn fetch_channel_details(
    yt: &YouTubeClient,
    channel_id: &ChannelId,
) -> Result<ChannelSummary> {
    let mut channels = yt
        .list_channel(channel_id.as_str(), "snippet,statistics")
        .await?;
    let channel = channels
        .items
        .pop_front()
        .ok_or_else(|| CatalogError::ChannelNotFound(channel_id.to_string()))?;
    Ok(channel_summary(channel))
}

/// Looks up the ID of the playlist holding every public upload of a channel.
#[instrument(skip(yt))]
pub async fn uploads_playlist_id(yt: &YouTubeClient, channel_id: &ChannelId) -> Result<String> {
    let mut channels = yt
        .list_channel(channel_id.as_str(), "contentDetails")
        .await?;
    let channel = channels
        .items
        .pop_front()
        .ok_or_else(|| CatalogError::ChannelNotFound(channel_id.to_string()))?;
    channel
        .uploads_playlist_id()
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| CatalogError::MissingUploadsPlaylist(channel_id.to_string()))
}

/// Lists up to `max_results` of a channel's uploads, newest first, by walking its uploads
/// playlist.
///
/// Playlist entries that don't point at a video are skipped and don't count towards the limit.
#[instrument(skip(yt))]
pub async fn fetch_uploads(
    yt: &YouTubeClient,
    channel_id: &ChannelId,
    max_results: usize,
) -> Result<Vec<VideoSummary>> {
    let playlist_id = uploads_playlist_id(yt, channel_id).await?;
    let videos: Vec<VideoSummary> = yt
        .list_playlist_items(&playlist_id, max_results)
        .filter_map(|item| item.map(video_from_playlist_item).transpose())
        .take(max_results)
        .collect::<Result<_>>()
        .await?;
    warn_if_empty(channel_id, &videos);
    Ok(videos)
}

/// Lists up to `max_results` of a channel's videos, newest first, through search.
///
/// Search is more expensive in quota than [`fetch_uploads`] but needs no playlist lookup first,
/// so it can run alongside [`fetch_channel_details`]. An unknown channel ID is not an error here
/// and gives an empty list.
#[instrument(skip(yt))]
pub async fn fetch_recent_videos(
    yt: &YouTubeClient,
    channel_id: &ChannelId,
    max_results: usize,
) -> Result<Vec<VideoSummary>> {
    let videos: Vec<VideoSummary> = yt
        .search_channel_videos(channel_id.as_str(), max_results)
        .filter_map(|result| result.map(video_from_search_result).transpose())
        .take(max_results)
        .collect::<Result<_>>()
        .await?;
    tracing::debug!(%channel_id, videos = videos.len(), "searched recent videos");
    Ok(videos)
}

/// Only call this once the channel is known to exist.
fn warn_if_empty(channel_id: &ChannelId, videos: &[VideoSummary]) {
    if videos.is_empty() {
        tracing::warn!(%channel_id, "channel exists but has no public uploads");
    } else {
        tracing::debug!(%channel_id, videos = videos.len(), "fetched videos");
    }
}

/// Resolves `reference` and lists up to `max_results` of that channel's uploads.
#[instrument(skip_all, fields(%reference, max_results = max_results))]
pub async fn fetch_videos(
    yt: &YouTubeClient,
    reference: &ChannelReference,
    max_results: usize,
) -> Result<Vec<VideoSummary>> {
    let channel_id = resolver::resolve(yt, reference).await?;
    fetch_uploads(yt, &channel_id, max_results).await
}

/// Resolves `reference` and fetches the channel's details and its most recent videos.
///
/// The two fetches don't depend on each other and run concurrently; if either fails, so does
/// the whole operation. An empty channel is only reported once the details confirm it exists.
#[instrument(skip_all, fields(%reference, max_results = max_results))]
pub async fn fetch_channel_with_videos(
    yt: &YouTubeClient,
    reference: &ChannelReference,
    max_results: usize,
) -> Result<ChannelWithVideos> {
    let channel_id = resolver::resolve(yt, reference).await?;
    let (channel, videos) = tokio::try_join!(
        fetch_channel_details(yt, &channel_id),
        fetch_recent_videos(yt, &channel_id, max_results),
    )?;
    warn_if_empty(&channel_id, &videos);
    Ok(ChannelWithVideos { channel, videos })
}
