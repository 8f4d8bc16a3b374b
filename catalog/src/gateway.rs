//! The HTTP face of the catalog.
//!
//! Two read-only endpoints, each also reachable under the path the portfolio site has always
//! called:
//!
//! - `GET /videos` (`/api/youtube-videos`): a channel's uploads. Takes `apiKey`, one of
//!   `channelId`, `channelUsername`, `channelUrl` or `videoUrl`, and `maxResults`.
//! - `GET /channel` (`/api/youtube/channel`): a channel's details plus its most recent videos.
//!   Takes `apiKey`, `handle` and `maxResults`.
//!
//! Every response, including failures, is a JSON [`Envelope`]. This is the only place where a
//! [`CatalogError`] turns into an HTTP status.

use crate::catalog::{self, DEFAULT_CHANNEL_VIDEO_LIMIT, DEFAULT_VIDEO_LIMIT};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::normalize::VideoSummary;
use crate::reference::ChannelReference;
use crate::youtube_api::YouTubeClient;
use bytes::Bytes;
use eyre::Context;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::service::service_fn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::instrument;

pub const MISSING_API_KEY: &str = concat!(
    "YOUTUBE_API_KEY is required. ",
    "Provide it as a query parameter or set it as an environment variable."
);
pub const MISSING_REFERENCE: &str =
    "Please provide one of: channelUrl, videoUrl, channelId, or channelUsername";
pub const MISSING_HANDLE: &str = "Please provide a channel handle via the handle query param.";
pub const INVALID_MAX_RESULTS: &str = "maxResults must be a positive integer.";

/// The body of every response.
///
/// Exactly one of `error` and `data` is non-null, and `success` says which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub error: Option<String>,
    pub success: bool,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            error: None,
            success: true,
            data: Some(data),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            success: false,
            data: None,
        }
    }
}

/// Query string parameters, first occurrence wins. Blank values count as absent.
#[derive(Debug, Default)]
struct QueryParams(HashMap<String, String>);

impl QueryParams {
    fn parse(query: Option<&str>) -> Self {
        let mut params = HashMap::new();
        for (k, v) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            params
                .entry(k.into_owned())
                .or_insert_with(|| v.into_owned());
        }
        Self(params)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Parses `maxResults`, which must be a positive integer when given.
fn parse_max_results(raw: Option<&str>, default: usize) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CatalogError::Validation(INVALID_MAX_RESULTS.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Videos,
    Channel,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/videos" | "/api/youtube-videos" => Some(Self::Videos),
            "/channel" | "/api/youtube/channel" => Some(Self::Channel),
            _ => None,
        }
    }
}

/// Request handling, shared by every connection.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    api_base_url: Arc<str>,
    /// Used when a request has no `apiKey` of its own.
    default_api_key: Option<String>,
}

impl Gateway {
    pub fn new(http: reqwest::Client, api_base_url: &str, default_api_key: Option<String>) -> Self {
        Self {
            http,
            api_base_url: Arc::from(api_base_url),
            default_api_key,
        }
    }

    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;
        Ok(Self::new(http, &config.api_base_url, config.api_key.clone()))
    }

    /// Answers one request. Never fails: every error ends up as an error envelope.
    #[instrument(skip_all, fields(method = %req.method(), path = req.uri().path()))]
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let Some(route) = Route::from_path(req.uri().path()) else {
            tracing::debug!("no such route");
            return json_response(
                StatusCode::NOT_FOUND,
                &Envelope::<()>::err(format!("no such endpoint: {}", req.uri().path())),
            );
        };
        if req.method() != Method::GET {
            let mut response = json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &Envelope::<()>::err(format!("method {} is not allowed", req.method())),
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let query = QueryParams::parse(req.uri().query());
        let response = match route {
            Route::Videos => respond(self.videos(&query).await),
            Route::Channel => respond(self.channel(&query).await),
        };
        tracing::info!(status = response.status().as_u16(), "handled request");
        response
    }

    /// The client to use for this request, with the caller's key or the default one.
    fn client_for(&self, query: &QueryParams) -> Result<YouTubeClient> {
        let api_key = query
            .get("apiKey")
            .or(self.default_api_key.as_deref())
            .ok_or_else(|| CatalogError::Validation(MISSING_API_KEY.to_string()))?;
        Ok(YouTubeClient::new(api_key, self.http.clone()).with_base_url(&self.api_base_url))
    }

    async fn videos(&self, query: &QueryParams) -> Result<Vec<VideoSummary>> {
        let yt = self.client_for(query)?;
        let reference = ChannelReference::from_parts(
            query.get("channelId"),
            query.get("channelUsername"),
            query.get("channelUrl"),
            query.get("videoUrl"),
        )
        .ok_or_else(|| CatalogError::Validation(MISSING_REFERENCE.to_string()))?;
        let max_results = parse_max_results(query.get("maxResults"), DEFAULT_VIDEO_LIMIT)?;
        catalog::fetch_videos(&yt, &reference, max_results).await
    }

    async fn channel(&self, query: &QueryParams) -> Result<catalog::ChannelWithVideos> {
        let yt = self.client_for(query)?;
        let handle = query
            .get("handle")
            .ok_or_else(|| CatalogError::Validation(MISSING_HANDLE.to_string()))?;
        let max_results =
            parse_max_results(query.get("maxResults"), DEFAULT_CHANNEL_VIDEO_LIMIT)?;
        catalog::fetch_channel_with_videos(
            &yt,
            &ChannelReference::Handle(handle.to_string()),
            max_results,
        )
        .await
    }
}

fn respond<T: Serialize>(result: Result<T>) -> Response<Full<Bytes>> {
    match result {
        Ok(data) => json_response(StatusCode::OK, &Envelope::ok(data)),
        Err(e) => {
            if e.is_client_error() {
                tracing::warn!(error = %e, "request failed");
            } else {
                tracing::error!(error = %e, "request failed");
            }
            json_response(e.status_code(), &Envelope::<()>::err(e.to_string()))
        }
    }
}

fn json_response<T: Serialize>(
    status: StatusCode,
    envelope: &Envelope<T>,
) -> Response<Full<Bytes>> {
    let (status, body) = match serde_json::to_vec(envelope) {
        Ok(body) => (status, body),
        Err(e) => {
            tracing::error!(error = %e, "could not serialize response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"could not serialize response","success":false,"data":null}"#.to_vec(),
            )
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Serves HTTP/1 on `listener` until `shutdown` resolves.
///
/// Every connection gets its own task. Connections that are still open when `shutdown`
/// resolves are left to finish on their own.
pub async fn serve(
    listener: TcpListener,
    gateway: Gateway,
    shutdown: impl Future<Output = ()>,
) -> eyre::Result<()> {
    let gateway = Arc::new(gateway);
    let mut shutdown = std::pin::pin!(shutdown);
    tracing::info!(
        addr = %listener.local_addr().context("get local address")?,
        "listening"
    );

    loop {
        let (conn, peer) = tokio::select! {
            () = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };

        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let gateway = Arc::clone(&gateway);
                async move { Ok::<_, Infallible>(gateway.handle(req).await) }
            });
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(hyper_util::rt::TokioIo::new(conn), service)
                .await
            {
                tracing::debug!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}
