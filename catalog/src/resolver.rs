//! Channel reference → channel ID resolution.

use crate::error::{CatalogError, Result};
use crate::reference::{
    ChannelReference, ChannelUrlTarget, extract_video_id, parse_channel_url, strip_handle_prefix,
};
use crate::youtube_api::YouTubeClient;
use std::fmt;
use tracing::instrument;

/// A canonical, YouTube-assigned channel ID.
///
/// Only produced by [`resolve`], so holding one means the reference it came from named exactly
/// one channel (or was already an ID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// The raw `UC…` ID as YouTube returns it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a channel reference to the ID of the channel it names.
///
/// In order:
/// 1. a channel ID is passed through without any request;
/// 2. a handle is looked up with `channels?forHandle`, a username additionally with the legacy
///    `channels?forUsername`, and if neither finds anything the first channel search hit is used;
/// 3. a channel URL is taken apart into one of the above;
/// 4. a video URL is reduced to its video ID and the video's owning channel is looked up.
///
/// A reference that names nothing is a [`CatalogError::Resolution`]. Failed requests along the
/// way are returned as they are, not retried and not papered over.
#[instrument(skip_all, fields(%reference))]
pub async fn resolve(yt: &YouTubeClient, reference: &ChannelReference) -> Result<ChannelId> {
    let resolved = match reference {
        ChannelReference::ChannelId(id) => {
            let id = id.trim();
            (!id.is_empty()).then(|| ChannelId(id.to_string()))
        }
        ChannelReference::Handle(handle) => resolve_name(yt, handle, false).await?,
        ChannelReference::Username(name) => resolve_name(yt, name, true).await?,
        ChannelReference::ChannelUrl(url) => match parse_channel_url(url) {
            Some(ChannelUrlTarget::Id(id)) => Some(ChannelId(id)),
            Some(ChannelUrlTarget::Handle(handle)) => resolve_name(yt, &handle, false).await?,
            Some(ChannelUrlTarget::Username(name)) => resolve_name(yt, &name, true).await?,
            None => {
                return Err(CatalogError::Resolution(format!(
                    "{url} is not a recognizable YouTube channel URL"
                )));
            }
        },
        ChannelReference::VideoUrl(url) => {
            let Some(video_id) = extract_video_id(url) else {
                return Err(CatalogError::Resolution(format!(
                    "{url} is not a recognizable YouTube video URL"
                )));
            };
            channel_of_video(yt, &video_id).await?
        }
    };

    match resolved {
        Some(id) => {
            tracing::debug!(channel_id = %id, "resolved channel reference");
            Ok(id)
        }
        None => Err(CatalogError::Resolution(format!("no channel found for {reference}"))),
    }
}

/// Handle or username lookup, falling back to search.
async fn resolve_name(
    yt: &YouTubeClient,
    name: &str,
    try_username: bool,
) -> Result<Option<ChannelId>> {
    let name = strip_handle_prefix(name);
    if name.is_empty() {
        return Ok(None);
    }

    if let Some(channel) = yt.channels_for_handle(name).await?.items.pop_front() {
        return Ok(Some(ChannelId(channel.id)));
    }

    if try_username {
        if let Some(channel) = yt.channels_for_username(name).await?.items.pop_front() {
            return Ok(Some(ChannelId(channel.id)));
        }
    }

    tracing::debug!(name, "no exact channel match, falling back to search");
    let hits = yt.search_channels(name).await?;
    Ok(hits
        .items
        .iter()
        .find_map(|hit| hit.channel_id())
        .map(|id| ChannelId(id.to_string())))
}

async fn channel_of_video(yt: &YouTubeClient, video_id: &str) -> Result<Option<ChannelId>> {
    let Some(video) = yt.get_video(video_id).await? else {
        tracing::debug!(video_id, "video not found");
        return Ok(None);
    };
    Ok(video
        .snippet
        .and_then(|s| s.channel_id)
        .filter(|id| !id.is_empty())
        .map(ChannelId))
}
