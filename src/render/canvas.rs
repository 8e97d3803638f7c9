use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::processing::layout::Placement;
use crate::render::framebuffer::FrameSink;
use crate::render::text::FontFace;
use crate::tasks::viewer::{FontMetrics, Surface, TextExtent};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Software surface: composes into an RGBA canvas and hands finished frames
/// to a [`FrameSink`] on `present`.
#[derive(Debug)]
pub struct CanvasSurface<K> {
    canvas: RgbaImage,
    font: Option<FontFace>,
    sink: K,
}

impl<K: FrameSink> CanvasSurface<K> {
    pub fn new(width: u32, height: u32, sink: K) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, BACKGROUND),
            font: None,
            sink,
        }
    }

    pub fn with_font(mut self, font: FontFace) -> Self {
        self.font = Some(font);
        self
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
}

impl<K: FrameSink> Surface for CanvasSurface<K> {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) -> Result<()> {
        for px in self.canvas.pixels_mut() {
            *px = BACKGROUND;
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, placement: Placement) -> Result<()> {
        let (w, h) = image.dimensions();
        let x = i64::from(placement.x);
        let y = i64::from(placement.y);
        if placement.is_identity(w, h) {
            imageops::overlay(&mut self.canvas, image, x, y);
        } else {
            let scaled = imageops::resize(
                image,
                placement.width,
                placement.height,
                FilterType::CatmullRom,
            );
            imageops::overlay(&mut self.canvas, &scaled, x, y);
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, size: u32, color: [u8; 3], x: i32, y: i32) -> Result<()> {
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| Error::Config("no font loaded for announcement text".to_string()))?;
        font.draw(&mut self.canvas, text, size, color, x, y);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.sink.flush(&self.canvas)
    }
}

impl<K> FontMetrics for CanvasSurface<K> {
    fn measure(&self, text: &str, size: u32) -> TextExtent {
        match &self.font {
            Some(font) => font.measure(text, size),
            None => TextExtent {
                width: 0,
                height: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::layout::fit_to_surface;

    #[derive(Default)]
    struct Frames(Vec<RgbaImage>);

    impl FrameSink for Frames {
        fn flush(&mut self, frame: &RgbaImage) -> Result<()> {
            self.0.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn letterboxed_photo_leaves_black_bars() {
        let mut surface = CanvasSurface::new(40, 20, Frames::default());
        let photo = RgbaImage::from_pixel(10, 10, Rgba([200, 100, 50, 255]));
        let placement = fit_to_surface(10, 10, 40, 20).unwrap();
        assert_eq!(placement, Placement { x: 10, y: 0, width: 20, height: 20 });

        surface.clear().unwrap();
        surface.draw_image(&photo, placement).unwrap();
        surface.present().unwrap();

        let frame = &surface.sink.0[0];
        assert_eq!(frame.get_pixel(0, 10), &BACKGROUND);
        assert_eq!(frame.get_pixel(39, 10), &BACKGROUND);
        let inside = frame.get_pixel(20, 10).0;
        for (got, want) in inside.iter().zip([200u8, 100, 50, 255]) {
            assert!(got.abs_diff(want) <= 1, "pixel {inside:?}");
        }
    }

    #[test]
    fn clear_resets_previous_frame() {
        let mut surface = CanvasSurface::new(4, 4, Frames::default());
        let photo = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        surface
            .draw_image(&photo, fit_to_surface(4, 4, 4, 4).unwrap())
            .unwrap();
        surface.clear().unwrap();
        assert!(surface.canvas().pixels().all(|px| *px == BACKGROUND));
    }

    #[test]
    fn text_without_font_is_rejected() {
        let mut surface = CanvasSurface::new(4, 4, Frames::default());
        assert!(surface.draw_text("hi", 12, [255, 255, 255], 0, 0).is_err());
        assert_eq!(surface.measure("hi", 12), TextExtent { width: 0, height: 0 });
    }
}
