use clap::Parser;
use eyre::Context;
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_catalog::config::DEFAULT_ENV_FILE;
use youtube_catalog::{Config, Gateway};

/// Serves YouTube channel details and video listings as JSON.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Address to listen on [default: $YOUTUBE_CATALOG_ADDR, then 127.0.0.1:3000]
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// File to read settings from when they aren't in the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let args = Args::parse();
    let mut config = Config::load_from(&args.env_file).context("load configuration")?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    tracing::debug!(?config, "loaded configuration");
    if config.api_key.is_none() {
        tracing::warn!("no default YOUTUBE_API_KEY set, every request must bring an apiKey");
    }

    let gateway = Gateway::from_config(&config)?;
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind to {}", config.addr))?;

    youtube_catalog::serve(listener, gateway, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await
}
