//! Binary entrypoint for the media display.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use media_display::announcements;
use media_display::config::Configuration;
use media_display::platform::video_player::CommandPlayer;
use media_display::render::canvas::CanvasSurface;
use media_display::render::framebuffer::{FrameSink, Framebuffer, PngSnapshot};
use media_display::render::text::FontFace;
use media_display::tasks::files;
use media_display::tasks::manager::{Odds, Slideshow, simulate};

#[derive(Debug, Parser)]
#[command(
    name = "media-display",
    version,
    about = "Photo, video and announcement slideshow"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG", default_value = "config.yaml")]
    config: PathBuf,
    /// Deterministic RNG seed for announcement and video draws
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Evaluate announcement dates against this day (uses the configured date-format)
    #[arg(long, value_name = "DATE")]
    today: Option<String>,
    /// Print the planned photo/announcement/video sequence without displaying anything
    #[arg(long = "dry-run", value_name = "STEPS")]
    dry_run: Option<usize>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("media_display={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Args {
        config,
        seed,
        today,
        dry_run,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let cfg = Configuration::from_yaml_file(&config)
        .and_then(Configuration::validated)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?;
    info!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let today = match today {
        Some(raw) => Some(cfg.parse_date(&raw).context("failed to parse --today")?),
        None => None,
    };
    let draws = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    if let Some(steps) = dry_run {
        return run_dry_run(&cfg, steps, today, seed, draws);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    if sigterm.recv().await.is_some() {
                        info!("SIGTERM received; initiating shutdown");
                        cancel.cancel();
                    }
                }
                Err(err) => warn!("failed to register SIGTERM handler: {err}"),
            }
        });
    }

    if cfg.display.fullscreen {
        let sink = Framebuffer::open(&cfg.display.framebuffer, cfg.display.pixel_format)
            .with_context(|| {
                format!(
                    "failed to open framebuffer {}",
                    cfg.display.framebuffer.display()
                )
            })?;
        run_show(cfg, sink, draws, today, cancel).await
    } else {
        let path = cfg
            .display
            .snapshot_path
            .clone()
            .context("display.snapshot-path is required when fullscreen is false")?;
        info!(path = %path.display(), "windowed mode: writing frames to snapshot file");
        run_show(cfg, PngSnapshot::new(path), draws, today, cancel).await
    }
}

async fn run_show<K: FrameSink>(
    cfg: Configuration,
    sink: K,
    draws: StdRng,
    today: Option<NaiveDate>,
    cancel: CancellationToken,
) -> Result<()> {
    let font = FontFace::load(&cfg.announcements.font).context("failed to load announcement font")?;
    let (width, height) = cfg.display.size();
    let surface = CanvasSurface::new(width, height, sink).with_font(font);
    let player = CommandPlayer::from_config(&cfg.videos).context("invalid video player")?;

    let mut show = Slideshow::new(cfg, surface, player, draws);
    if let Some(today) = today {
        show = show.with_today(today);
    }
    show.run(cancel).await.context("slideshow failed")
}

fn run_dry_run(
    cfg: &Configuration,
    steps: usize,
    today: Option<NaiveDate>,
    seed: Option<u64>,
    mut draws: StdRng,
) -> Result<()> {
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let files::Catalog { photos, videos } = files::scan_catalog(&cfg.photos, &cfg.videos);
    let active = announcements::load_active(&cfg.announcements.file, &cfg.date_format, today)
        .context("failed to load announcements")?;

    println!(
        "# schedule dry run\n# photos: {}\n# videos: {}\n# announcements: {}\n# today: {}\n# seed: {}\n# photo time: {}\n",
        photos.len(),
        videos.len(),
        active.len(),
        today,
        seed.map_or_else(|| "(random)".to_string(), |s| s.to_string()),
        humantime::format_duration(cfg.photos.time),
    );

    if photos.is_empty() {
        println!("(no photos discovered under {})", cfg.photos.path.display());
        return Ok(());
    }

    let plan = simulate(
        &photos,
        active.len(),
        &videos,
        steps,
        Odds::from_config(cfg),
        &mut draws,
    );
    for (idx, step) in plan.iter().enumerate() {
        let announcement = step
            .announcement
            .map_or_else(|| "-".to_string(), |a| format!("#{}", a + 1));
        let video = step
            .video
            .as_ref()
            .map_or_else(|| "-".to_string(), |v| v.display().to_string());
        println!(
            "  {:>4}: {}  announcement={}  video={}",
            idx + 1,
            step.photo.display(),
            announcement,
            video
        );
    }

    Ok(())
}
