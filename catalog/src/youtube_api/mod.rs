//! Client for the read-only, API-key side of the YouTube Data API v3.
//!
//! Only four resources are used, and only for public data:
//!
//! - [`channels`]: channel lookup by handle, legacy username or ID, plus the channel's
//!   snippet, statistics and uploads playlist
//! - [`search`]: free-text channel search (the last resort when resolving a name) and a
//!   channel's videos ordered by date
//! - [`playlist_items`]: the entries of a playlist, in particular a channel's uploads
//! - [`videos`]: which channel a video belongs to
//!
//! List endpoints that page are exposed as lazy streams built on [`PagedStream`], so callers
//! that only need the first `n` items never pay for more pages than that.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use youtube_catalog::youtube_api::YouTubeClient;
//!
//! # async fn example() -> youtube_catalog::Result<()> {
//! let client = YouTubeClient::new("my-api-key", reqwest::Client::new());
//! let mut uploads = client.list_playlist_items("UUuAXFkgsw1L7xaCfnd5JJOw", 50).take(10);
//! while let Some(item) = uploads.next().await {
//!     let item = item?;
//!     println!("{:?}", item.content_details.and_then(|d| d.video_id));
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod search;
pub mod types;
pub mod videos;

pub use client::{DEFAULT_API_BASE_URL, MAX_PAGE_SIZE, YouTubeClient};
pub use types::{PageInfo, PagedStream, Thumbnail, Thumbnails};

pub use channels::{Channel, ChannelSnippet, ChannelStatistics};
pub use playlist_items::PlaylistItem;
pub use search::SearchResult;
pub use videos::Video;
