//! Rhythm Game Backdrop
//!
//! Background video layer for the rhythm game: plays a video behind the
//! stage with frame-accurate timing and adjustable transparency.
//! Runs as a standalone viewer or headless.

mod app;
mod config;
mod render;
mod utils;
mod video;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::headless::{self, HeadlessOptions};
use app::{BackdropApp, BackdropSession};
use config::BackdropConfig;
use video::{FfmpegDecoder, VideoPlayer};

/// Rhythm Game Backdrop
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Video file to play (overrides the config's video)
    video: Option<PathBuf>,

    /// Path to a backdrop JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Play without a window
    #[arg(long)]
    headless: bool,

    /// Stop headless playback after this many seconds
    #[arg(long)]
    max_seconds: Option<f64>,

    /// Save the final stage as PNG (headless only)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Layer transparency, 0 (invisible) to 255 (opaque)
    #[arg(short, long)]
    transparency: Option<i32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug
    let level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Rhythm backdrop starting...");

    let (mut config, base_dir) = match &args.config {
        Some(path) => {
            info!("Loading config from: {:?}", path);
            let config = BackdropConfig::load_from_file(path)?;
            let base_dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            (config, base_dir)
        }
        None => (BackdropConfig::default(), PathBuf::from(".")),
    };

    if let Some(transparency) = args.transparency {
        config.layer.transparency = transparency;
    }

    let video_path = match &args.video {
        Some(path) => path.clone(),
        None if !config.video.is_empty() => config.resolve_video_path(&base_dir),
        None => anyhow::bail!("No video given; pass a path or a config with \"video\""),
    };
    info!("Video: {}", video_path.display());

    let session = VideoPlayer::open(&video_path)
        .map(|player| BackdropSession::new(player, &config));

    if args.headless {
        let mut session =
            session.with_context(|| format!("Failed to open {}", video_path.display()))?;
        let options = HeadlessOptions {
            max_duration: args.max_seconds.map(Duration::from_secs_f64),
            snapshot: args.snapshot,
        };
        headless::run(&mut session, config.tick_interval(), &options)?;
        return Ok(());
    }

    run_viewer(session.map_err(|e| e.to_string()), &config)
}

fn run_viewer(
    session: Result<BackdropSession<FfmpegDecoder>, String>,
    config: &BackdropConfig,
) -> Result<()> {
    if let Err(ref e) = session {
        warn!("Background video not available: {}", e);
    }

    let (width, height) = config.stage_size();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32 * 0.5 + 240.0, height as f32 * 0.5 + 80.0])
            .with_title("Rhythm Backdrop"),
        ..Default::default()
    };

    let transparency = config.layer.transparency;
    let volume = config.layer.volume;
    eframe::run_native(
        "Rhythm Backdrop",
        native_options,
        Box::new(move |cc| Ok(Box::new(BackdropApp::new(cc, session, transparency, volume)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
