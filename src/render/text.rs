use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::tasks::viewer::TextExtent;

/// A loaded font face; `size` arguments are pixel heights.
pub struct FontFace {
    font: FontVec,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            Error::Config(format!("cannot read font {}: {err}", path.display()))
        })?;
        Self::from_bytes(bytes)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|err| Error::Config(format!("invalid font data: {err}")))?;
        Ok(Self { font })
    }

    pub fn measure(&self, text: &str, size: u32) -> TextExtent {
        let scaled = self.font.as_scaled(PxScale::from(size as f32));
        let mut caret = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        TextExtent {
            width: caret.max(0.0).ceil() as u32,
            height: scaled.height().max(0.0).ceil() as u32,
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`, clipped to `canvas`.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, size: u32, color: [u8; 3], x: i32, y: i32) {
        let scale = PxScale::from(size as f32);
        let scaled = self.font.as_scaled(scale);
        let baseline = y as f32 + scaled.ascent();
        let (cw, ch) = canvas.dimensions();

        let mut caret = x as f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= i64::from(cw) || py >= i64::from(ch) {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                blend(pixel, color, coverage.clamp(0.0, 1.0));
            });
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], coverage: f32) {
    for (dst, src) in pixel.0.iter_mut().zip(color) {
        let mixed = f32::from(*dst) * (1.0 - coverage) + f32::from(src) * coverage;
        *dst = mixed.round() as u8;
    }
    pixel.0[3] = 255;
}
