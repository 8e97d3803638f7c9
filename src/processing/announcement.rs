use crate::announcements::AnnouncementLine;
use crate::tasks::viewer::FontMetrics;

/// A text line positioned on the surface. `x` goes negative when a centered
/// line is wider than the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine<'a> {
    pub text: &'a str,
    pub size: u32,
    pub color: [u8; 3],
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementLayout<'a> {
    /// Height of the whole block including per-line spacing.
    pub total_height: u32,
    /// First line's top edge; zero when the block overflows the surface.
    pub start_y: i32,
    /// Text lines in input order. Spacers only move the cursor.
    pub lines: Vec<PlacedLine<'a>>,
}

/// Lays out an announcement as one vertically centered block.
///
/// Every text line contributes its measured height plus `spacing`; spacers
/// contribute exactly their size.
pub fn layout<'a, M>(
    lines: &'a [AnnouncementLine],
    metrics: &M,
    spacing: u32,
    surface: (u32, u32),
) -> AnnouncementLayout<'a>
where
    M: FontMetrics + ?Sized,
{
    let (surface_w, surface_h) = surface;

    let measured: Vec<Option<(u32, u32)>> = lines
        .iter()
        .map(|line| match line {
            AnnouncementLine::Text { text, size, .. } => {
                let extent = metrics.measure(text, *size);
                Some((extent.width, extent.height))
            }
            AnnouncementLine::Spacer { .. } => None,
        })
        .collect();

    let total_height: u64 = lines
        .iter()
        .zip(&measured)
        .map(|(line, extent)| match (line, extent) {
            (AnnouncementLine::Text { .. }, Some((_, h))) => u64::from(*h) + u64::from(spacing),
            (AnnouncementLine::Spacer { size }, _) => u64::from(*size),
            _ => 0,
        })
        .sum();
    let total_height = u32::try_from(total_height).unwrap_or(u32::MAX);

    let start_y = (i64::from(surface_h) - i64::from(total_height)).max(0) / 2;
    let mut cursor = start_y;
    let mut placed = Vec::new();
    for (line, extent) in lines.iter().zip(&measured) {
        match (line, extent) {
            (
                AnnouncementLine::Text {
                    text,
                    size,
                    color,
                    center,
                },
                Some((w, h)),
            ) => {
                let x = if *center {
                    (i64::from(surface_w) - i64::from(*w)).div_euclid(2)
                } else {
                    0
                };
                placed.push(PlacedLine {
                    text: text.as_str(),
                    size: *size,
                    color: *color,
                    x: saturate(x),
                    y: saturate(cursor),
                });
                cursor += i64::from(*h) + i64::from(spacing);
            }
            (AnnouncementLine::Spacer { size }, _) => cursor += i64::from(*size),
            _ => {}
        }
    }

    AnnouncementLayout {
        total_height,
        start_y: saturate(start_y),
        lines: placed,
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
