//! Resolves loosely specified YouTube channel references and serves the channel's public
//! metadata and uploads in a stable JSON shape.
//!
//! The pieces, leaf to root:
//!
//! - [`youtube_api`]: a thin client over the YouTube Data API v3 resources used here
//! - [`reference`] and [`resolver`]: from a handle, username, ID or URL to a [`ChannelId`]
//! - [`catalog`]: channel details and video listings for a resolved channel
//! - [`normalize`]: upstream resources mapped to [`VideoSummary`] and [`ChannelSummary`]
//! - [`gateway`]: the HTTP server in front of all of it
//! - [`config`]: where the server gets its API key and address from

pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod reference;
pub mod resolver;
pub mod youtube_api;

#[cfg(test)]
mod mock;

pub use catalog::{
    ChannelWithVideos, fetch_channel_with_videos, fetch_recent_videos, fetch_uploads, fetch_videos,
};
pub use config::Config;
pub use error::{CatalogError, Result};
pub use gateway::{Envelope, Gateway, serve};
pub use normalize::{ChannelSummary, VideoSummary};
pub use reference::ChannelReference;
pub use resolver::{ChannelId, resolve};
