//! Loosely specified channel references and the URL parsing behind them.

use reqwest::Url;
use std::fmt;

/// Something a caller gave us to name a channel.
///
/// Only [`ChannelReference::ChannelId`] can be used without talking to YouTube; every other
/// form goes through [`crate::resolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelReference {
    /// An `@handle`, with or without the `@`.
    Handle(String),
    /// A legacy username or custom name, as in `/user/<name>` and `/c/<name>` URLs.
    Username(String),
    /// A canonical channel ID (`UC...`).
    ChannelId(String),
    /// Any channel page URL.
    ChannelUrl(String),
    /// Any URL of a video uploaded by the channel.
    VideoUrl(String),
}

impl ChannelReference {
    /// Picks a reference out of the optional inputs of a video listing request.
    ///
    /// Blank values count as absent. When several are given, the channel ID wins, then the
    /// username, then the channel URL, then the video URL.
    pub fn from_parts(
        channel_id: Option<&str>,
        channel_username: Option<&str>,
        channel_url: Option<&str>,
        video_url: Option<&str>,
    ) -> Option<Self> {
        fn given(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        }

        given(channel_id)
            .map(Self::ChannelId)
            .or_else(|| given(channel_username).map(Self::Username))
            .or_else(|| given(channel_url).map(Self::ChannelUrl))
            .or_else(|| given(video_url).map(Self::VideoUrl))
    }
}

impl fmt::Display for ChannelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) => write!(f, "handle {handle}"),
            Self::Username(name) => write!(f, "username {name}"),
            Self::ChannelId(id) => write!(f, "channel ID {id}"),
            Self::ChannelUrl(url) => write!(f, "channel URL {url}"),
            Self::VideoUrl(url) => write!(f, "video URL {url}"),
        }
    }
}

/// What a channel page URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUrlTarget {
    /// `/channel/<id>`
    Id(String),
    /// `/@<handle>`
    Handle(String),
    /// `/c/<name>` or `/user/<name>`
    Username(String),
}

/// Strips one leading `@`, if there is one.
pub fn strip_handle_prefix(handle: &str) -> &str {
    let handle = handle.trim();
    handle.strip_prefix('@').unwrap_or(handle)
}

/// Parses a URL that may or may not carry a scheme (`youtube.com/@x` is fine).
fn parse_lenient(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) if url.has_host() => Some(url),
        _ => Url::parse(&format!("https://{raw}")).ok(),
    }
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);
    let host = host.strip_prefix("music.").unwrap_or(host);
    host == "youtube.com" || host == "youtube-nocookie.com"
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

/// Works out what a channel page URL names.
///
/// Anything after the first meaningful segment (`/videos`, `/featured`, ...) is ignored.
pub fn parse_channel_url(raw: &str) -> Option<ChannelUrlTarget> {
    let url = parse_lenient(raw)?;
    if !is_youtube_host(url.host_str()?) {
        return None;
    }

    match segments(&url).as_slice() {
        ["channel", id, ..] => Some(ChannelUrlTarget::Id((*id).to_string())),
        ["c" | "user", name, ..] => Some(ChannelUrlTarget::Username((*name).to_string())),
        [first, ..] => {
            let handle = first.strip_prefix('@')?;
            (!handle.is_empty()).then(|| ChannelUrlTarget::Handle(handle.to_string()))
        }
        [] => None,
    }
}

/// Pulls the video ID out of the common video URL shapes:
/// `youtube.com/watch?v=<id>` (with `v` anywhere in the query), `youtu.be/<id>`,
/// `youtube.com/embed/<id>`, `youtube.com/shorts/<id>` and `youtube.com/live/<id>`.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let url = parse_lenient(raw)?;
    let host = url.host_str()?;

    let id = if host == "youtu.be" || host == "www.youtu.be" {
        segments(&url).first().map(|id| (*id).to_string())
    } else if is_youtube_host(host) {
        match segments(&url).as_slice() {
            ["watch", ..] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            ["embed" | "shorts" | "live" | "v", id, ..] => Some((*id).to_string()),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}
