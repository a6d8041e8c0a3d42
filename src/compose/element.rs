use std::path::PathBuf;

use crate::{
    foundation::core::{Position, TimeFragment},
    foundation::error::{SubcastError, SubcastResult},
    foundation::math::mul_div255_u16,
    render::renderer::RenderedImage,
};

/// Packed RGB24 frame: 3 bytes per pixel, rows without padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// Black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Wrap an existing buffer, checking its length.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> SubcastResult<Self> {
        if data.len() != Self::byte_len(width, height) {
            return Err(SubcastError::validation(format!(
                "rgb24 frame buffer is {} bytes, expected {} for {width}x{height}",
                data.len(),
                Self::byte_len(width, height)
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer length of a `width` x `height` RGB24 frame.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// A time-bounded visual overlay the compositor stamps onto source frames.
///
/// Implementations must be shareable across chunk workers.
pub trait MediaElement: Send + Sync {
    /// Interval, in source seconds, during which the element is visible.
    fn time(&self) -> TimeFragment;

    /// Composite onto `frame`; `t_rel` is seconds since `time().start`.
    fn render(&self, frame: &mut FrameRgb, t_rel: f64) -> SubcastResult<()>;
}

/// A positioned straight-alpha image shown for a time window.
#[derive(Clone, Debug)]
pub struct ImageElement {
    image: RenderedImage,
    position: Position,
    time: TimeFragment,
    opacity: f32,
}

impl ImageElement {
    /// Show `image` at `position` during `time`.
    pub fn new(image: RenderedImage, position: Position, time: TimeFragment) -> Self {
        Self {
            image,
            position,
            time,
            opacity: 1.0,
        }
    }

    /// Multiply the image alpha by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Top-left corner in frame pixels.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl MediaElement for ImageElement {
    fn time(&self) -> TimeFragment {
        self.time
    }

    fn render(&self, frame: &mut FrameRgb, _t_rel: f64) -> SubcastResult<()> {
        if frame.data.len() != FrameRgb::byte_len(frame.width, frame.height) {
            return Err(SubcastError::validation(
                "frame buffer size does not match its dimensions",
            ));
        }
        let opacity = (self.opacity * 255.0).round() as u16;
        if opacity == 0 {
            return Ok(());
        }
        let src = self.image.pixels();
        let (fw, fh) = (i64::from(frame.width), i64::from(frame.height));
        let (ox, oy) = (i64::from(self.position.x), i64::from(self.position.y));

        // Clip the image rectangle to the frame.
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + i64::from(src.width())).min(fw);
        let y1 = (oy + i64::from(src.height())).min(fh);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        for y in y0..y1 {
            let sy = (y - oy) as u32;
            let row = (y * fw) as usize * 3;
            for x in x0..x1 {
                let sx = (x - ox) as u32;
                let px = src.get_pixel(sx, sy).0;
                let a = mul_div255_u16(u16::from(px[3]), opacity);
                if a == 0 {
                    continue;
                }
                let i = row + x as usize * 3;
                let dst = &mut frame.data[i..i + 3];
                if a == 255 {
                    dst.copy_from_slice(&px[..3]);
                    continue;
                }
                let inv = 255 - a;
                for c in 0..3 {
                    let v = mul_div255_u16(u16::from(px[c]), a)
                        + mul_div255_u16(u16::from(dst[c]), inv);
                    dst[c] = v.min(255) as u8;
                }
            }
        }
        Ok(())
    }
}

/// A sound effect mixed into the final audio track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioElement {
    /// Audio file path.
    pub path: PathBuf,
    /// Start time in source seconds.
    pub start: f64,
    /// Linear gain; `<= 0` is silent.
    #[serde(default = "default_gain")]
    pub gain: f32,
}

fn default_gain() -> f32 {
    1.0
}

impl AudioElement {
    /// Effect at `start` seconds with unit gain.
    pub fn new(path: impl Into<PathBuf>, start: f64) -> Self {
        Self {
            path: path.into(),
            start,
            gain: 1.0,
        }
    }

    /// Set the linear gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/element.rs"]
mod tests;
