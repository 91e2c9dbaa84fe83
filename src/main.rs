use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

use tweetclip::cli::{Cli, Commands};
use tweetclip::core::{config, init_logger};
use tweetclip::dispatch::{self, upstream::ExtractorApi};
use tweetclip::widget::{
    tweet_summary, AjaxClient, ChannelSink, RenditionCard, StatusKind, WidgetEvent, WidgetSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Commands::Serve { port } => run_server(port).await,
        Commands::Formats { url } => run_formats(&url).await,
        Commands::Grab {
            url,
            quality,
            video,
            out,
        } => run_grab(&url, quality.as_deref(), video, out.as_deref()).await,
    }
}

async fn run_server(port: u16) -> Result<()> {
    let api = ExtractorApi::from_env();
    let public_url = config::PUBLIC_URL
        .clone()
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", port));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Extraction API: {}", config::API_BASE_URL.as_str());
    dispatch::serve(addr, api, public_url).await
}

/// Fetches the widget bootstrap from the dispatcher and builds the
/// transport client with it, exactly as an embedding page would.
async fn bootstrap_client() -> Result<AjaxClient> {
    let base = config::DISPATCHER_URL.trim_end_matches('/').to_string();
    let bootstrap: Value = reqwest::Client::new()
        .get(format!("{}/widget/config", base))
        .send()
        .await
        .with_context(|| format!("dispatcher unreachable at {}", base))?
        .json()
        .await
        .context("widget bootstrap was not valid JSON")?;

    let dispatch_url = match bootstrap.get("dispatch_url").and_then(Value::as_str) {
        Some(url) => url.to_string(),
        None => format!("{}/dispatch", base),
    };
    let nonce = bootstrap
        .get("nonce")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(AjaxClient::new(dispatch_url, nonce))
}

/// Forwards workflow events to the terminal while a command runs.
fn spawn_event_printer() -> Arc<ChannelSink> {
    let (sink, mut events) = ChannelSink::new();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                WidgetEvent::LoadingStarted => log::info!("Fetching video information..."),
                WidgetEvent::DownloadStarted => {
                    log::info!("Download in progress, this can take a while...")
                }
                WidgetEvent::Status { kind: StatusKind::Error, text } => log::error!("{}", text),
                WidgetEvent::Status { kind: StatusKind::Success, text } => log::info!("{}", text),
                WidgetEvent::LoadingFinished | WidgetEvent::DownloadFinished => {}
            }
        }
    });
    Arc::new(sink)
}

async fn run_formats(url: &str) -> Result<()> {
    let client = bootstrap_client().await?;
    let mut session = WidgetSession::new(client, spawn_event_printer());
    session.load(url).await?;

    if let Some(extraction) = session.extraction() {
        println!("{}", tweet_summary(extraction));
    }
    if session.catalog().is_empty() {
        println!("No video formats available");
        return Ok(());
    }
    for (position, card) in session.catalog().iter().enumerate() {
        let format_tag = card.format_tag.as_deref().unwrap_or("-");
        let size_label = card.size_label.as_deref().unwrap_or("-");
        println!(
            "{:>3}. video {} | {:<20} {:<6} {}",
            position + 1,
            card.video_index,
            card.quality_label,
            format_tag,
            size_label
        );
    }
    Ok(())
}

fn pick_card<'a>(
    catalog: &'a [RenditionCard],
    quality: Option<&str>,
    video: usize,
) -> Option<&'a RenditionCard> {
    let mut of_video = catalog.iter().filter(|card| card.video_index == video);
    match quality {
        Some(wanted) => of_video.find(|card| card.quality_token() == wanted),
        None => of_video.next(),
    }
}

async fn run_grab(url: &str, quality: Option<&str>, video: usize, out: Option<&str>) -> Result<()> {
    let client = bootstrap_client().await?;
    let mut session = WidgetSession::new(client, spawn_event_printer());
    if let Some(dir) = out {
        session = session.with_download_dir(dir);
    }

    session.load(url).await?;
    let card = pick_card(session.catalog(), quality, video)
        .cloned()
        .ok_or_else(|| match quality {
            Some(wanted) => anyhow!("no rendition {:?} for video {}", wanted, video),
            None => anyhow!("no renditions for video {}", video),
        })?;

    log::info!("Selected {} (video {})", card.quality_label, card.video_index);
    let saved = session.grab(&card).await?;
    println!("Saved {} ({} bytes)", saved.path.display(), saved.bytes_written);
    Ok(())
}
