use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use rand::Rng;
use rand::rngs::StdRng;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::announcements::{self, Announcement};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::events::StepDecision;
use crate::platform::video_player::VideoPlayer;
use crate::tasks::files;
use crate::tasks::viewer::{self, FontMetrics, Surface};

/// Source of the scheduler's random decisions.
pub trait Draws {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;
    /// Uniform index in `0..len`; `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

impl Draws for StdRng {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Per-step chances of interleaving an announcement and a video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Odds {
    pub announcement: f64,
    pub video: f64,
}

impl Odds {
    pub fn from_config(cfg: &Configuration) -> Self {
        Self {
            announcement: cfg.announcements.probability,
            video: cfg.videos.probability,
        }
    }
}

/// Decides what follows `photo`.
///
/// Always takes two independent unit draws, announcement first then video, so
/// the draw sequence does not depend on which catalogs are empty. A pick from
/// a catalog consumes one extra index draw right after its unit draw.
pub fn plan_step<D>(
    draws: &mut D,
    photo: &Path,
    announcement_count: usize,
    videos: &[PathBuf],
    odds: Odds,
) -> StepDecision
where
    D: Draws + ?Sized,
{
    let roll = draws.unit();
    let announcement = if roll <= odds.announcement && announcement_count > 0 {
        Some(draws.index(announcement_count))
    } else {
        None
    };

    let roll = draws.unit();
    let video = if roll <= odds.video && !videos.is_empty() {
        Some(videos[draws.index(videos.len())].clone())
    } else {
        None
    };

    StepDecision {
        photo: photo.to_path_buf(),
        announcement,
        video,
    }
}

/// Plans `steps` consecutive steps, wrapping around `photos` as successive
/// cycles would. Nothing is displayed.
pub fn simulate<D>(
    photos: &[PathBuf],
    announcement_count: usize,
    videos: &[PathBuf],
    steps: usize,
    odds: Odds,
    draws: &mut D,
) -> Vec<StepDecision>
where
    D: Draws + ?Sized,
{
    if photos.is_empty() {
        return Vec::new();
    }
    photos
        .iter()
        .cycle()
        .take(steps)
        .map(|photo| plan_step(draws, photo, announcement_count, videos, odds))
        .collect()
}

/// Result of one pass over the photo catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub today: NaiveDate,
    pub photos: usize,
    pub videos: usize,
    pub announcements: usize,
    /// One entry per photo actually shown, in display order.
    pub decisions: Vec<StepDecision>,
    /// Photos skipped because they could not be decoded or placed.
    pub skipped: Vec<PathBuf>,
    pub cancelled: bool,
}

/// The slideshow loop: photos in name order, with announcements and videos
/// interleaved at random after each photo.
pub struct Slideshow<S, P, D> {
    cfg: Configuration,
    surface: S,
    player: P,
    draws: D,
    today: Option<NaiveDate>,
}

impl<S, P, D> Slideshow<S, P, D>
where
    S: Surface + FontMetrics,
    P: VideoPlayer,
    D: Draws,
{
    pub fn new(cfg: Configuration, surface: S, player: P, draws: D) -> Self {
        Self {
            cfg,
            surface,
            player,
            draws,
            today: None,
        }
    }

    /// Pins the date used for announcement eligibility instead of the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Runs cycles until `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        while !cancel.is_cancelled() {
            let report = self.run_cycle(&cancel).await?;
            if report.cancelled {
                break;
            }
            if report.decisions.is_empty() {
                warn!(
                    path = %self.cfg.photos.path.display(),
                    idle = %humantime::format_duration(self.cfg.idle_delay),
                    "no photos to show; waiting before rescanning"
                );
                if !pause(&cancel, self.cfg.idle_delay).await {
                    break;
                }
            }
        }
        info!("slideshow stopped");
        Ok(())
    }

    /// Rescans the catalogs and shows every photo once.
    #[instrument(skip_all)]
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> Result<CycleReport> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let files::Catalog { photos, videos } =
            files::scan_catalog(&self.cfg.photos, &self.cfg.videos);
        let announcements = match announcements::load_active(
            &self.cfg.announcements.file,
            &self.cfg.date_format,
            today,
        ) {
            Ok(list) => list,
            Err(err) => {
                warn!("announcements unavailable this cycle: {err}");
                Vec::new()
            }
        };
        info!(
            %today,
            photos = photos.len(),
            videos = videos.len(),
            announcements = announcements.len(),
            "starting cycle"
        );

        let mut report = CycleReport {
            today,
            photos: photos.len(),
            videos: videos.len(),
            announcements: announcements.len(),
            decisions: Vec::with_capacity(photos.len()),
            skipped: Vec::new(),
            cancelled: false,
        };

        let odds = Odds::from_config(&self.cfg);
        for photo in &photos {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if !self.step(photo, &announcements, &videos, odds, cancel, &mut report).await? {
                report.cancelled = true;
                break;
            }
        }
        Ok(report)
    }

    /// Shows one photo and whatever the draws add after it. Returns `false`
    /// when cancelled part way through.
    async fn step(
        &mut self,
        photo: &Path,
        announcements: &[Announcement],
        videos: &[PathBuf],
        odds: Odds,
        cancel: &CancellationToken,
        report: &mut CycleReport,
    ) -> Result<bool> {
        match viewer::show_photo(&mut self.surface, photo) {
            Ok(_) => debug!(path = %photo.display(), "photo shown"),
            Err(Error::InvalidMedia(reason)) => {
                warn!(path = %photo.display(), "skipping photo: {reason}");
                report.skipped.push(photo.to_path_buf());
                return Ok(true);
            }
            Err(err) => return Err(err),
        }
        if !pause(cancel, self.cfg.photos.time).await {
            return Ok(false);
        }

        let decision = plan_step(&mut self.draws, photo, announcements.len(), videos, odds);
        debug!(
            announcement = ?decision.announcement,
            video = ?decision.video,
            "step decision"
        );
        report.decisions.push(decision.clone());

        if let Some(idx) = decision.announcement {
            viewer::show_announcement(
                &mut self.surface,
                &announcements[idx],
                self.cfg.announcements.spacing,
            )?;
            if !pause(cancel, self.cfg.announcements.time).await {
                return Ok(false);
            }
        }

        if let Some(video) = decision.video {
            viewer::blank(&mut self.surface)?;
            select! {
                _ = cancel.cancelled() => return Ok(false),
                played = self.player.play(&video) => {
                    if let Err(err) = played {
                        warn!(path = %video.display(), "video playback failed: {err}");
                    }
                }
            }
        }

        Ok(true)
    }
}

/// Sleeps for `duration` unless cancelled first. Returns `false` on cancel.
async fn pause(cancel: &CancellationToken, duration: Duration) -> bool {
    select! {
        _ = cancel.cancelled() => false,
        _ = sleep(duration) => true,
    }
}
