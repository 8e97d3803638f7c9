//! Announcement records and the per-cycle announcement catalog.
//!
//! The source document is YAML (JSON is accepted as well):
//!
//! ```yaml
//! announcements:
//!   - start_date: "2024-01-01"
//!     end_date: "2024-01-31"
//!     lines:
//!       - { text: "Bake sale", size: 72, color: "#FFCC00", center: true }
//!       - { hspace: 40 }
//! ```
//!
//! Loading is all-or-nothing: a single malformed entry rejects the document.
//! An entry whose `start_date` falls after its `end_date` is kept but is
//! never eligible.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::parse_date;
use crate::error::{Error, Result};

/// One row of an announcement, drawn top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementLine {
    Text {
        text: String,
        size: u32,
        color: [u8; 3],
        center: bool,
    },
    /// Blank vertical gap of `size` pixels.
    Spacer { size: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lines: Vec<AnnouncementLine>,
}

impl Announcement {
    /// Both ends of the date range are inclusive.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnouncementDocument {
    #[serde(default)]
    announcements: Vec<RawAnnouncement>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnnouncement {
    start_date: String,
    end_date: String,
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLine {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default)]
    color: Option<RawColor>,
    #[serde(default)]
    center: Option<bool>,
    #[serde(default)]
    hspace: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColor {
    Hex(String),
    Rgb([u8; 3]),
}

/// Parses every announcement in `document`, without date filtering.
pub fn parse(document: &str, date_format: &str) -> Result<Vec<Announcement>> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: AnnouncementDocument = serde_yaml::from_str(document)?;
    doc.announcements
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            raw.into_announcement(date_format)
                .map_err(|err| Error::Config(format!("announcement #{}: {err}", idx + 1)))
        })
        .collect()
}

pub fn load(path: impl AsRef<Path>, date_format: &str) -> Result<Vec<Announcement>> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path).map_err(|err| {
        Error::Config(format!(
            "cannot read announcements from {}: {err}",
            path.display()
        ))
    })?;
    parse(&document, date_format).map_err(|err| match err {
        Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Loads the announcement source and keeps the entries eligible on `today`.
pub fn load_active(
    path: impl AsRef<Path>,
    date_format: &str,
    today: NaiveDate,
) -> Result<Vec<Announcement>> {
    let all = load(path, date_format)?;
    let total = all.len();
    let active = active_on(all, today);
    debug!(total, eligible = active.len(), %today, "announcements loaded");
    Ok(active)
}

pub fn active_on(announcements: Vec<Announcement>, today: NaiveDate) -> Vec<Announcement> {
    announcements
        .into_iter()
        .filter(|a| a.is_active_on(today))
        .collect()
}

impl RawAnnouncement {
    fn into_announcement(self, date_format: &str) -> Result<Announcement, String> {
        let start_date = date_field("start_date", &self.start_date, date_format)?;
        let end_date = date_field("end_date", &self.end_date, date_format)?;
        if start_date > end_date {
            warn!(
                %start_date,
                %end_date,
                "announcement date range is inverted; it will never be shown"
            );
        }
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| line.into_line().map_err(|err| format!("line #{}: {err}", idx + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Announcement {
            start_date,
            end_date,
            lines,
        })
    }
}

fn date_field(label: &str, raw: &str, date_format: &str) -> Result<NaiveDate, String> {
    parse_date(raw, date_format).map_err(|err| match err {
        Error::Config(msg) => format!("{label}: {msg}"),
        other => format!("{label}: {other}"),
    })
}

impl RawLine {
    fn into_line(self) -> Result<AnnouncementLine, String> {
        if let Some(size) = self.hspace {
            if self.text.is_some() || self.size.is_some() || self.color.is_some() || self.center.is_some()
            {
                return Err("hspace cannot be combined with text fields".to_string());
            }
            return Ok(AnnouncementLine::Spacer { size });
        }

        let size = self.size.ok_or("missing size")?;
        let text = match self.text {
            Some(text) if !text.trim().is_empty() => text,
            // blank text keeps its size as vertical gap
            _ => return Ok(AnnouncementLine::Spacer { size }),
        };
        let color = match self.color.ok_or("missing color")? {
            RawColor::Hex(raw) => parse_hex_color(&raw)?,
            RawColor::Rgb(rgb) => rgb,
        };
        let center = self.center.ok_or("missing center")?;
        Ok(AnnouncementLine::Text {
            text,
            size,
            color,
            center,
        })
    }
}

/// Accepts `#RRGGBB` or the short `#RGB` form, with or without `#`.
pub fn parse_hex_color(raw: &str) -> Result<[u8; 3], String> {
    let hex = raw.trim().trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| format!("invalid color '{raw}'"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{raw}'"));
    }
    match hex.len() {
        6 => Ok([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let v = channel(&digit.to_string())?;
                *slot = v * 17;
            }
            Ok(rgb)
        }
        _ => Err(format!("invalid color '{raw}'")),
    }
}
