use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::announcements::Announcement;
use crate::error::{Error, Result};
use crate::processing::announcement::layout;
use crate::processing::layout::{Placement, fit_to_surface};

/// Rendered size of a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

pub trait FontMetrics {
    fn measure(&self, text: &str, size: u32) -> TextExtent;
}

/// Drawing target for the slideshow. Nothing is visible until `present`.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self) -> Result<()>;
    /// Draws `image` scaled to `placement.width` x `placement.height` at its offset.
    fn draw_image(&mut self, image: &RgbaImage, placement: Placement) -> Result<()>;
    fn draw_text(&mut self, text: &str, size: u32, color: [u8; 3], x: i32, y: i32) -> Result<()>;
    fn present(&mut self) -> Result<()>;
}

/// Decodes a photo and shows it scaled and centered on a cleared surface.
pub fn show_photo<S>(surface: &mut S, path: &Path) -> Result<Placement>
where
    S: Surface + ?Sized,
{
    let image = decode_rgba8_apply_exif(path)?;
    let (w, h) = image.dimensions();
    let (sw, sh) = surface.size();
    let placement = fit_to_surface(w, h, sw, sh).map_err(|err| match err {
        Error::InvalidMedia(msg) => Error::InvalidMedia(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    debug!(
        path = %path.display(),
        src_w = w,
        src_h = h,
        x = placement.x,
        y = placement.y,
        width = placement.width,
        height = placement.height,
        "photo placement"
    );
    surface.clear()?;
    surface.draw_image(&image, placement)?;
    surface.present()?;
    Ok(placement)
}

/// Renders an announcement as a vertically centered block of lines.
pub fn show_announcement<S>(surface: &mut S, announcement: &Announcement, spacing: u32) -> Result<()>
where
    S: Surface + FontMetrics + ?Sized,
{
    let size = surface.size();
    let block = layout(&announcement.lines, &*surface, spacing, size);
    debug!(
        lines = block.lines.len(),
        total_height = block.total_height,
        start_y = block.start_y,
        "announcement layout"
    );
    surface.clear()?;
    for line in &block.lines {
        surface.draw_text(line.text, line.size, line.color, line.x, line.y)?;
    }
    surface.present()
}

/// Clears the screen, e.g. before handing it to the video player.
pub fn blank<S>(surface: &mut S) -> Result<()>
where
    S: Surface + ?Sized,
{
    surface.clear()?;
    surface.present()
}

// Decodes an image to RGBA8 and applies EXIF orientation if available.
// Orientation handling is best-effort; without metadata the image is kept as stored.
pub fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage> {
    let invalid = |err: String| Error::InvalidMedia(format!("{}: {err}", path.display()));
    let img = image::ImageReader::open(path)
        .map_err(|e| invalid(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?
        .decode()
        .map_err(|e| invalid(e.to_string()))?;

    let mut img = img.to_rgba8();

    let orientation: u16 = read_orientation(path).unwrap_or(1);
    match orientation {
        1 => {}
        2 => img = image::imageops::flip_horizontal(&img),
        3 => img = image::imageops::rotate180(&img),
        4 => img = image::imageops::flip_vertical(&img),
        5 => {
            // transpose
            img = image::imageops::rotate90(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        6 => img = image::imageops::rotate90(&img),
        7 => {
            // transverse
            img = image::imageops::rotate270(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        8 => img = image::imageops::rotate270(&img),
        _ => {}
    }

    Ok(img)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = field.value.get_uint(0)? as u16;
    debug!("exif orientation {} for {}", o, path.display());
    Some(o)
}
