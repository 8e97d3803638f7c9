use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::config::PixelFormat;
use crate::error::{Error, Result};

/// Destination for finished frames.
pub trait FrameSink {
    fn flush(&mut self, frame: &RgbaImage) -> Result<()>;
}

/// Writes frames straight into a Linux framebuffer device such as `/dev/fb0`.
///
/// The configured display size must match the framebuffer's visible
/// resolution and line length.
#[derive(Debug)]
pub struct Framebuffer {
    path: PathBuf,
    format: PixelFormat,
    device: File,
    scratch: Vec<u8>,
}

impl Framebuffer {
    pub fn open(path: &Path, format: PixelFormat) -> Result<Self> {
        let device = OpenOptions::new().write(true).open(path)?;
        info!(device = %path.display(), ?format, "framebuffer opened");
        Ok(Self {
            path: path.to_path_buf(),
            format,
            device,
            scratch: Vec::new(),
        })
    }
}

impl FrameSink for Framebuffer {
    fn flush(&mut self, frame: &RgbaImage) -> Result<()> {
        encode_pixels(frame, self.format, &mut self.scratch);
        self.device.seek(SeekFrom::Start(0))?;
        self.device.write_all(&self.scratch)?;
        self.device.flush()?;
        debug!(device = %self.path.display(), bytes = self.scratch.len(), "frame flushed");
        Ok(())
    }
}

/// Converts RGBA pixels into the framebuffer's native layout.
pub fn encode_pixels(frame: &RgbaImage, format: PixelFormat, out: &mut Vec<u8>) {
    out.clear();
    match format {
        PixelFormat::Bgra8888 => {
            out.reserve(frame.as_raw().len());
            for px in frame.pixels() {
                let [r, g, b, _] = px.0;
                out.extend_from_slice(&[b, g, r, 0xff]);
            }
        }
        PixelFormat::Rgb565 => {
            out.reserve(frame.as_raw().len() / 2);
            for px in frame.pixels() {
                let [r, g, b, _] = px.0;
                let packed =
                    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out.extend_from_slice(&packed.to_le_bytes());
            }
        }
    }
}

/// Saves every presented frame as a PNG, replacing the previous one.
#[derive(Debug, Clone)]
pub struct PngSnapshot {
    path: PathBuf,
}

impl PngSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for PngSnapshot {
    fn flush(&mut self, frame: &RgbaImage) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        frame
            .save_with_format(&tmp, ImageFormat::Png)
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }
}
