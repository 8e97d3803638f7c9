use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// strftime-style format used for announcement `start_date`/`end_date`.
    pub date_format: String,
    /// Pause before rescanning when the photo catalog comes back empty.
    #[serde(
        default = "Configuration::default_idle_delay",
        with = "humantime_serde"
    )]
    pub idle_delay: Duration,
    pub display: DisplayConfig,
    pub photos: PhotoConfig,
    pub videos: VideoConfig,
    pub announcements: AnnouncementConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Full-screen output goes to the framebuffer; otherwise frames are
    /// written to `snapshot-path`.
    pub fullscreen: bool,
    #[serde(default = "DisplayConfig::default_framebuffer")]
    pub framebuffer: PathBuf,
    #[serde(default)]
    pub pixel_format: PixelFormat,
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelFormat {
    #[default]
    Bgra8888,
    Rgb565,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PhotoConfig {
    pub path: PathBuf,
    /// Filename wildcards, e.g. `*.jpg`.
    pub files: Vec<String>,
    /// How long each photo stays on screen.
    #[serde(with = "humantime_serde")]
    pub time: Duration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VideoConfig {
    pub path: PathBuf,
    pub files: Vec<String>,
    /// Chance of playing a video after each photo.
    pub probability: f64,
    /// Player program and leading arguments; the video path is appended.
    #[serde(default = "VideoConfig::default_player")]
    pub player: Vec<String>,
    /// Command run after every playback to reap stray player processes.
    #[serde(default)]
    pub cleanup: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnnouncementConfig {
    pub file: PathBuf,
    /// TrueType/OpenType font used for every announcement line.
    pub font: PathBuf,
    #[serde(with = "humantime_serde")]
    pub time: Duration,
    /// Chance of showing an announcement after each photo.
    pub probability: f64,
    /// Pixels added below every text line.
    pub spacing: u32,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|err| {
            Error::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_yaml_str(&s)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde alone.
    pub fn validated(self) -> Result<Self> {
        ensure(self.display.width > 0, "display.width must be greater than zero")?;
        ensure(
            self.display.height > 0,
            "display.height must be greater than zero",
        )?;
        ensure(
            self.display.fullscreen || self.display.snapshot_path.is_some(),
            "display.snapshot-path is required when display.fullscreen is false",
        )?;
        ensure(
            !self.photos.files.is_empty(),
            "photos.files must list at least one wildcard",
        )?;
        ensure(!self.photos.time.is_zero(), "photos.time must be greater than zero")?;
        ensure(
            !self.videos.files.is_empty(),
            "videos.files must list at least one wildcard",
        )?;
        ensure_probability(self.videos.probability, "videos.probability")?;
        ensure(
            self.videos.player.first().is_some_and(|p| !p.trim().is_empty()),
            "videos.player must name a program",
        )?;
        if let Some(cleanup) = &self.videos.cleanup {
            ensure(
                cleanup.first().is_some_and(|p| !p.trim().is_empty()),
                "videos.cleanup must name a program when present",
            )?;
        }
        ensure_probability(
            self.announcements.probability,
            "announcements.probability",
        )?;
        validate_date_format(&self.date_format)?;
        Ok(self)
    }

    /// Parses a calendar date using the configured `date-format`.
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate> {
        parse_date(raw, &self.date_format)
    }

    fn default_idle_delay() -> Duration {
        Duration::from_secs(10)
    }
}

impl DisplayConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn default_framebuffer() -> PathBuf {
        PathBuf::from("/dev/fb0")
    }
}

impl VideoConfig {
    fn default_player() -> Vec<String> {
        vec![
            "/usr/bin/omxplayer".to_string(),
            "-o".to_string(),
            "hdmi".to_string(),
        ]
    }
}

pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).map_err(|err| {
        Error::Config(format!(
            "date '{raw}' does not match format '{format}': {err}"
        ))
    })
}

/// A usable date format must render a date that parses back to itself.
fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!(
            "date-format '{format}' contains an invalid specifier"
        )));
    }
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 2, 29) else {
        return Ok(());
    };
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(format)).map_err(|_| {
        Error::Config(format!("date-format '{format}' cannot render a calendar date"))
    })?;
    match NaiveDate::parse_from_str(&rendered, format) {
        Ok(parsed) if parsed == sample => Ok(()),
        _ => Err(Error::Config(format!(
            "date-format '{format}' does not identify a unique calendar date"
        ))),
    }
}

fn ensure_probability(value: f64, label: &str) -> Result<()> {
    ensure(
        (0.0..=1.0).contains(&value),
        &format!("{label} must be between 0 and 1 (got {value})"),
    )
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Config(message.to_string()))
    }
}
