use clap::{ArgGroup, Args, Parser, Subcommand};
use eyre::{Context, OptionExt};
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_catalog::catalog::{DEFAULT_CHANNEL_VIDEO_LIMIT, DEFAULT_VIDEO_LIMIT};
use youtube_catalog::gateway::MISSING_API_KEY;
use youtube_catalog::youtube_api::YouTubeClient;
use youtube_catalog::{CatalogError, ChannelReference, Config};

/// A public video that is always there, for checking whether a key works.
const KNOWN_VIDEO_ID: &str = "dQw4w9WgXcQ";

const API_CONSOLE_URL: &str =
    "https://console.developers.google.com/apis/api/youtube.googleapis.com/overview";

/// One-shot YouTube channel lookups, printed as JSON.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// YouTube Data API key [default: $YOUTUBE_API_KEY, then .env.local]
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List a channel's uploads, newest first
    Videos {
        #[command(flatten)]
        reference: ReferenceArgs,

        /// How many videos to list at most
        #[arg(long, default_value_t = DEFAULT_VIDEO_LIMIT, value_parser = positive_count)]
        max: usize,
    },
    /// Show a channel's details and its most recent videos
    Channel {
        /// The channel's handle, with or without the leading @
        #[arg(long)]
        handle: String,

        /// How many recent videos to include at most
        #[arg(long, default_value_t = DEFAULT_CHANNEL_VIDEO_LIMIT, value_parser = positive_count)]
        max: usize,
    },
    /// Check that the API key works
    CheckKey,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("reference").required(true)))]
struct ReferenceArgs {
    #[arg(long, group = "reference")]
    channel_id: Option<String>,
    /// Legacy username or custom name
    #[arg(long, group = "reference")]
    channel_username: Option<String>,
    /// Any channel page URL
    #[arg(long, group = "reference")]
    channel_url: Option<String>,
    /// Any URL of a video on the channel
    #[arg(long, group = "reference")]
    video_url: Option<String>,
}

fn positive_count(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("`{raw}` is not a positive integer")),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // stdout is for the JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("load configuration")?;
    let api_key = cli.api_key.or(config.api_key).ok_or_eyre(MISSING_API_KEY)?;
    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")?;
    let yt = YouTubeClient::new(api_key, http).with_base_url(&config.api_base_url);

    match cli.command {
        Command::Videos { reference, max } => {
            let reference = ChannelReference::from_parts(
                reference.channel_id.as_deref(),
                reference.channel_username.as_deref(),
                reference.channel_url.as_deref(),
                reference.video_url.as_deref(),
            )
            .ok_or_eyre("the channel reference must not be blank")?;
            let videos = youtube_catalog::fetch_videos(&yt, &reference, max)
                .await
                .with_context(|| format!("fetch videos for {reference}"))?;
            print_json(&videos)
        }
        Command::Channel { handle, max } => {
            let reference = ChannelReference::Handle(handle);
            let channel = youtube_catalog::fetch_channel_with_videos(&yt, &reference, max)
                .await
                .with_context(|| format!("fetch channel for {reference}"))?;
            print_json(&channel)
        }
        Command::CheckKey => check_key(&yt).await,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> eyre::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

async fn check_key(yt: &YouTubeClient) -> eyre::Result<()> {
    match yt.get_video(KNOWN_VIDEO_ID).await {
        Ok(_) => {
            eprintln!("API key is valid and the YouTube Data API v3 is enabled for its project.");
            Ok(())
        }
        Err(CatalogError::Upstream { status, message }) => {
            eprintln!("API key was rejected ({status}): {message}");
            if let Some(project) = project_number(&message) {
                eprintln!("Project: {project}");
                eprintln!("Enable the API at {API_CONSOLE_URL}?project={project}");
            }
            eprintln!(
                "Make sure the key's Google Cloud project has the YouTube Data API v3 enabled."
            );
            eyre::bail!("API key check failed");
        }
        Err(e) => Err(e).context("check API key"),
    }
}

/// Finds the Google Cloud project number in messages like
/// "YouTube Data API v3 has not been used in project 123456 before or it is disabled."
fn project_number(message: &str) -> Option<&str> {
    message.match_indices("project ").find_map(|(i, m)| {
        let rest = &message[i + m.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}
