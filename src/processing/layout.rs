use crate::error::{Error, Result};

/// Scaled size and top-left offset of an image on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// True when the image is drawn at its own size and needs no resampling,
    /// wherever it is offset.
    pub fn is_identity(&self, src_w: u32, src_h: u32) -> bool {
        self.width == src_w && self.height == src_h
    }
}

/// Scales `src` to fill as much of `dst` as possible without cropping and
/// centers it on the axis that has slack.
///
/// Width is filled first; if the resulting height would overflow, height is
/// filled instead.
pub fn fit_to_surface(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Result<Placement> {
    if src_w == 0 || src_h == 0 {
        return Err(Error::InvalidMedia(format!(
            "source has zero dimension ({src_w}x{src_h})"
        )));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(Error::InvalidMedia(format!(
            "surface has zero dimension ({dst_w}x{dst_h})"
        )));
    }

    if src_w == dst_w && src_h == dst_h {
        return Ok(Placement {
            x: 0,
            y: 0,
            width: dst_w,
            height: dst_h,
        });
    }

    let candidate_h = scale_round(dst_w, src_w, src_h);
    let (width, height) = if candidate_h <= u64::from(dst_h) {
        (dst_w, candidate_h as u32)
    } else {
        let scaled_w = scale_round(dst_h, src_h, src_w).min(u64::from(dst_w));
        (scaled_w as u32, dst_h)
    };
    // extreme aspect ratios can round a side to zero
    let (width, height) = (width.max(1), height.max(1));

    let (x, y) = center_offset(width, height, dst_w, dst_h);
    Ok(Placement {
        x,
        y,
        width,
        height,
    })
}

/// `round(target / along * other)` in floating point, as a non-negative integer.
fn scale_round(target: u32, along: u32, other: u32) -> u64 {
    let scaled = f64::from(target) / f64::from(along) * f64::from(other);
    scaled.round().max(0.0) as u64
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}
