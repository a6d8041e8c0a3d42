use crate::foundation::error::{SubcastError, SubcastResult};

/// Half-open time interval `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeFragment {
    /// Inclusive start in seconds.
    pub start: f64,
    /// Exclusive end in seconds.
    pub end: f64,
}

impl TimeFragment {
    /// Create a validated fragment with finite bounds and `start <= end`.
    pub fn new(start: f64, end: f64) -> SubcastResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SubcastError::validation(
                "TimeFragment bounds must be finite",
            ));
        }
        if end < start {
            return Err(SubcastError::validation(format!(
                "TimeFragment end ({end}) must be >= start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Length in seconds (zero for degenerate fragments).
    pub fn duration(self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Return `true` when the fragment covers no time (`end <= start`).
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Return `true` when `other` lies entirely within this fragment.
    pub fn covers(self, other: TimeFragment) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Return `true` when both fragments share some time.
    pub fn overlaps(self, other: TimeFragment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Top-left pixel position. Signed: an overflowing line may start left of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Size) -> Size {
        Size {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// Position + size of a laid out element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElementLayout {
    /// Top-left corner.
    pub position: Position,
    /// Extent.
    pub size: Size,
}

impl ElementLayout {
    /// Center point, rounded toward the top-left.
    pub fn center(self) -> Position {
        Position {
            x: self.position.x + (self.size.width / 2) as i32,
            y: self.position.y + (self.size.height / 2) as i32,
        }
    }
}

/// Absolute 0-based frame index in source video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SubcastResult<Self> {
        if start.0 > end.0 {
            return Err(SubcastError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SubcastResult<Self> {
        if den == 0 {
            return Err(SubcastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SubcastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse ffprobe-style rates such as `30000/1001`, `25/1` or `24`.
    pub fn parse_ratio(s: &str) -> SubcastResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|_| SubcastError::validation(format!("invalid frame rate '{s}'")))?;
        let den = den
            .parse::<u32>()
            .map_err(|_| SubcastError::validation(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame index to its presentation timestamp in seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64() + 1e-9).floor().max(0.0) as u64
    }

    /// Render as `num/den` for ffmpeg arguments.
    pub fn to_ffmpeg_arg(self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
