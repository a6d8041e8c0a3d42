use crate::foundation::error::{SubcastError, SubcastResult};

/// Anchor edge for the caption block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignmentType {
    /// Anchor to the top edge.
    Top,
    /// Anchor to the vertical center.
    Center,
    /// Anchor to the bottom edge.
    Bottom,
}

/// Vertical placement policy: an anchor plus a signed offset fraction of the frame height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerticalAlignment {
    /// Anchor edge.
    pub align: VerticalAlignmentType,
    /// Offset in `[-1, 1]`, as a fraction of the frame height.
    #[serde(default)]
    pub offset: f64,
}

impl VerticalAlignment {
    /// Bottom anchored with a 5% margin.
    pub fn bottom() -> Self {
        Self {
            align: VerticalAlignmentType::Bottom,
            offset: -0.05,
        }
    }

    /// Top anchored, no offset.
    pub fn top() -> Self {
        Self {
            align: VerticalAlignmentType::Top,
            offset: 0.0,
        }
    }

    /// Centered, no offset.
    pub fn center() -> Self {
        Self {
            align: VerticalAlignmentType::Center,
            offset: 0.0,
        }
    }

    /// Y coordinate of a block of height `block_height` inside a frame of height
    /// `frame_height`, clamped to be non-negative.
    pub fn block_y(self, frame_height: u32, block_height: u32) -> i32 {
        let h_frame = f64::from(frame_height);
        let h = f64::from(block_height);
        let y = match self.align {
            VerticalAlignmentType::Top => h_frame * self.offset,
            VerticalAlignmentType::Center => (h_frame - h) * (self.offset + 0.5),
            VerticalAlignmentType::Bottom => h_frame * (1.0 + self.offset) - h,
        };
        crate::foundation::math::round_px(y).max(0)
    }
}

impl Default for VerticalAlignment {
    fn default() -> Self {
        Self::bottom()
    }
}

/// What the splitter does when words do not fit in the allowed number of lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOverflowStrategy {
    /// Keep wrapping; the segment may end up with more lines than allowed.
    #[default]
    ExceedMaxNumberOfLines,
    /// Stop wrapping at the last allowed line and let it grow past the width limit.
    ExceedMaxWidthRatioInLastLine,
}

/// Line wrapping and placement settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Horizontal gap between words, in pixels.
    pub word_spacing: u32,
    /// Maximum line width as a fraction of the frame width.
    pub max_width_ratio: f64,
    /// Preferred upper bound on lines per segment.
    pub max_number_of_lines: u32,
    /// Lower bound on lines per segment, reached by bisecting the widest line.
    pub min_number_of_lines: u32,
    /// Overflow policy.
    pub on_text_overflow_strategy: TextOverflowStrategy,
    /// Vertical placement of the caption block.
    pub vertical_align: VerticalAlignment,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            word_spacing: 0,
            max_width_ratio: 0.8,
            max_number_of_lines: 2,
            min_number_of_lines: 1,
            on_text_overflow_strategy: TextOverflowStrategy::default(),
            vertical_align: VerticalAlignment::default(),
        }
    }
}

impl LayoutOptions {
    /// Reject settings the layout stages cannot honor.
    pub fn validate(&self) -> SubcastResult<()> {
        if !self.max_width_ratio.is_finite()
            || self.max_width_ratio <= 0.0
            || self.max_width_ratio > 1.0
        {
            return Err(SubcastError::validation(format!(
                "max_width_ratio must be in (0, 1], got {}",
                self.max_width_ratio
            )));
        }
        if self.min_number_of_lines == 0 {
            return Err(SubcastError::validation(
                "min_number_of_lines must be >= 1",
            ));
        }
        if self.min_number_of_lines > self.max_number_of_lines {
            return Err(SubcastError::validation(format!(
                "min_number_of_lines ({}) must not exceed max_number_of_lines ({})",
                self.min_number_of_lines, self.max_number_of_lines
            )));
        }
        let offset = self.vertical_align.offset;
        if !offset.is_finite() || !(-1.0..=1.0).contains(&offset) {
            return Err(SubcastError::validation(format!(
                "vertical_align.offset must be in [-1, 1], got {offset}"
            )));
        }
        Ok(())
    }

    /// Maximum line width in pixels for a frame `video_width` pixels wide.
    pub fn max_line_width(&self, video_width: u32) -> u32 {
        let w = f64::from(video_width) * self.max_width_ratio;
        w.floor().max(0.0) as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/options.rs"]
mod tests;
