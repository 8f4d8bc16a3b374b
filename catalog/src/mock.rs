//! Local stand-in for the YouTube Data API, for tests.
//!
//! [`MockUpstream`] is a real HTTP server on a random localhost port, so requests go through the
//! same reqwest code path as in production. It records every request it sees and the peak number
//! of requests it was serving at once, and hands each request to a responder closure.
//! [`FakeChannel`] is a ready-made responder that behaves like YouTube for a single channel.

use crate::youtube_api::YouTubeClient;
use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use jiff::Timestamp;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub(crate) fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

struct State {
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
    responder: Box<Responder>,
}

impl State {
    async fn respond(&self, req: Request<body::Incoming>) -> Response<Full<Bytes>> {
        let recorded = RecordedRequest {
            path: req.uri().path().to_string(),
            query: form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
                .into_owned()
                .collect(),
        };
        self.requests.lock().unwrap().push(recorded.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (status, body) = (self.responder)(&recorded);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Response::builder()
            .status(status)
            .header("content-type", "application/json; charset=UTF-8")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }
}

pub(crate) struct MockUpstream {
    addr: SocketAddr,
    state: Arc<State>,
}

impl MockUpstream {
    /// Starts a mock whose responder produces JSON bodies.
    pub(crate) async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        Self::with_latency(Duration::ZERO, responder).await
    }

    /// Like [`Self::start`], but every response is held back for `latency`.
    pub(crate) async fn with_latency<F>(latency: Duration, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        Self::launch(
            latency,
            Box::new(move |req| {
                let (status, body) = responder(req);
                (status, body.to_string())
            }),
        )
        .await
    }

    /// Starts a mock whose responder produces raw bodies.
    pub(crate) async fn start_raw<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        Self::launch(Duration::ZERO, Box::new(responder)).await
    }

    async fn launch(latency: Duration, responder: Box<Responder>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State {
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            latency,
            responder,
        });

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((conn, _)) = listener.accept().await {
                let state = Arc::clone(&server_state);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<body::Incoming>| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(state.respond(req).await) }
                    });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(hyper_util::rt::TokioIo::new(conn), service)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at this mock.
    pub(crate) fn client(&self, api_key: &str) -> YouTubeClient {
        YouTubeClient::new(api_key, http_client()).with_base_url(&self.base_url())
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// The most requests the mock was ever serving at the same time.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

/// An HTTP client that never goes through a proxy, so it can reach the mock on localhost.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Behaves like YouTube for one channel with a configurable number of uploads.
///
/// Upload `i` (0-based) has ID `vid00i` and was published `i` hours before a fixed instant, so
/// the uploads come back newest first. Page tokens are plain offsets.
#[derive(Debug, Clone)]
pub(crate) struct FakeChannel {
    pub(crate) id: String,
    pub(crate) handle: String,
    pub(crate) title: String,
    pub(crate) username: Option<String>,
    pub(crate) video: Option<String>,
    pub(crate) uploads: usize,
}

impl FakeChannel {
    pub(crate) fn new(id: &str, handle: &str) -> Self {
        Self {
            id: id.to_string(),
            handle: handle.to_string(),
            title: handle.to_string(),
            username: None,
            video: None,
            uploads: 0,
        }
    }

    pub(crate) fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub(crate) fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// A video (besides the uploads) that `videos.list` attributes to this channel.
    pub(crate) fn with_video(mut self, video_id: &str) -> Self {
        self.video = Some(video_id.to_string());
        self
    }

    pub(crate) fn with_uploads(mut self, uploads: usize) -> Self {
        self.uploads = uploads;
        self
    }

    pub(crate) fn uploads_playlist(&self) -> String {
        format!("UU{}", self.id.trim_start_matches("UC"))
    }

    pub(crate) fn video_id(i: usize) -> String {
        format!("vid{i:03}")
    }

    fn published_at(i: usize) -> String {
        Timestamp::from_second(1_700_000_000 - 3600 * i as i64)
            .unwrap()
            .to_string()
    }

    pub(crate) fn respond(&self, req: &RecordedRequest) -> (u16, Value) {
        if req.param("key").unwrap_or("").is_empty() {
            return error(400, "API key required");
        }

        match req.path.as_str() {
            "/channels" => self.channels(req),
            "/search" if req.param("type") == Some("channel") => self.search_channels(req),
            "/search" => self.search_videos(req),
            "/playlistItems" => self.playlist_items(req),
            "/videos" => self.videos(req),
            _ => error(404, "Not Found"),
        }
    }

    fn channels(&self, req: &RecordedRequest) -> (u16, Value) {
        let matches = if let Some(handle) = req.param("forHandle") {
            handle.eq_ignore_ascii_case(&self.handle)
        } else if let Some(username) = req.param("forUsername") {
            self.username.as_deref() == Some(username)
        } else {
            req.param("id") == Some(self.id.as_str())
        };
        if !matches {
            // YouTube leaves out `items` entirely when nothing matches
            return (
                200,
                json!({
                    "kind": "youtube#channelListResponse",
                    "pageInfo": { "totalResults": 0, "resultsPerPage": 5 }
                }),
            );
        }

        let part = req.param("part").unwrap_or("");
        let mut item = json!({ "kind": "youtube#channel", "id": self.id });
        if part.contains("snippet") {
            item["snippet"] = json!({
                "title": self.title,
                "description": format!("The {} channel.", self.title),
                "customUrl": format!("@{}", self.handle.to_lowercase()),
                "publishedAt": "2015-03-01T10:00:00Z",
                "thumbnails": {
                    "default": avatar(88),
                    "medium": avatar(240),
                    "high": avatar(800)
                }
            });
        }
        if part.contains("statistics") {
            item["statistics"] = json!({
                "viewCount": "123456",
                "hiddenSubscriberCount": false,
                "videoCount": self.uploads.to_string()
            });
        }
        if part.contains("contentDetails") {
            item["contentDetails"] = json!({
                "relatedPlaylists": { "likes": "", "uploads": self.uploads_playlist() }
            });
        }
        (
            200,
            json!({ "items": [item], "pageInfo": { "totalResults": 1, "resultsPerPage": 5 } }),
        )
    }

    fn search_channels(&self, req: &RecordedRequest) -> (u16, Value) {
        let q = req.param("q").unwrap_or("").to_lowercase();
        let hit = !q.is_empty()
            && (q == self.handle.to_lowercase() || self.title.to_lowercase().contains(&q));
        let items = if hit {
            vec![json!({
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#channel", "channelId": self.id },
                "snippet": { "channelId": self.id, "title": self.title }
            })]
        } else {
            vec![]
        };
        let total = items.len();
        (
            200,
            json!({ "items": items, "pageInfo": { "totalResults": total, "resultsPerPage": 1 } }),
        )
    }

    /// Pages through `0..self.uploads`, producing one item per index with `make`.
    fn page(&self, req: &RecordedRequest, make: impl Fn(usize) -> Value) -> (u16, Value) {
        let offset: usize = req.param("pageToken").map_or(0, |t| t.parse().unwrap());
        let size: usize = req.param("maxResults").map_or(5, |m| m.parse().unwrap());
        let end = (offset + size).min(self.uploads);
        let items: Vec<Value> = (offset..end).map(make).collect();
        let mut body = json!({
            "items": items,
            "pageInfo": { "totalResults": self.uploads, "resultsPerPage": size }
        });
        if end < self.uploads {
            body["nextPageToken"] = json!(end.to_string());
        }
        (200, body)
    }

    fn search_videos(&self, req: &RecordedRequest) -> (u16, Value) {
        if req.param("channelId") != Some(self.id.as_str()) {
            return (
                200,
                json!({ "items": [], "pageInfo": { "totalResults": 0, "resultsPerPage": 0 } }),
            );
        }
        self.page(req, |i| {
            let video_id = Self::video_id(i);
            json!({
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": video_id },
                "snippet": {
                    "channelId": self.id,
                    "title": format!("Video {i}"),
                    "description": format!("Description {i}"),
                    "publishedAt": Self::published_at(i),
                    "thumbnails": {
                        "default": thumbnail(&video_id, "default"),
                        "high": thumbnail(&video_id, "hqdefault")
                    }
                }
            })
        })
    }

    fn playlist_items(&self, req: &RecordedRequest) -> (u16, Value) {
        if req.param("playlistId") != Some(self.uploads_playlist().as_str()) {
            return error(
                404,
                "The playlist identified with the request's playlistId parameter cannot be found.",
            );
        }
        self.page(req, |i| {
            let video_id = Self::video_id(i);
            json!({
                "kind": "youtube#playlistItem",
                "snippet": {
                    "title": format!("Video {i}"),
                    "description": format!("Description {i}"),
                    "publishedAt": Self::published_at(i),
                    "thumbnails": {
                        "default": thumbnail(&video_id, "default")
                    }
                },
                "contentDetails": {
                    "videoId": video_id,
                    "videoPublishedAt": Self::published_at(i)
                }
            })
        })
    }

    fn videos(&self, req: &RecordedRequest) -> (u16, Value) {
        let id = req.param("id").unwrap_or("");
        let known = self.video.as_deref() == Some(id)
            || (0..self.uploads).any(|i| Self::video_id(i) == id);
        let items = if known {
            vec![json!({
                "kind": "youtube#video",
                "id": id,
                "snippet": {
                    "channelId": self.id,
                    "title": "A video",
                    "publishedAt": "2024-05-05T05:05:05Z"
                }
            })]
        } else {
            vec![]
        };
        let total = items.len();
        (
            200,
            json!({
                "items": items,
                "pageInfo": { "totalResults": total, "resultsPerPage": total }
            }),
        )
    }
}

fn thumbnail(video_id: &str, name: &str) -> Value {
    json!({ "url": format!("https://i.ytimg.com/vi/{video_id}/{name}.jpg") })
}

fn avatar(size: u32) -> Value {
    json!({ "url": format!("https://yt3.ggpht.com/avatar=s{size}"), "width": size, "height": size })
}

pub(crate) fn error(status: u16, message: &str) -> (u16, Value) {
    (
        status,
        json!({
            "error": {
                "code": status,
                "message": message,
                "errors": [{ "message": message, "domain": "global", "reason": "badRequest" }]
            }
        }),
    )
}
