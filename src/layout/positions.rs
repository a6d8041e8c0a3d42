//! Pixel placement of lines, words and per-state clips.

use crate::{
    document::model::{Document, LineId, SegmentId},
    document::state::ElementState,
    foundation::core::{ElementLayout, Position, Size},
    layout::options::LayoutOptions,
};

/// Places every line block vertically and every clip horizontally, per line state.
///
/// Within a line, all clips that share a line state are shown together, so slots are computed
/// per line-state group: each word's slot is the widest of its clips in that group, the slots
/// are centered as one block, and each clip is centered in its slot. `Word::max_layout` keeps
/// the baseline placement; only clip layouts receive state-specific positions.
#[derive(Clone, Debug)]
pub struct PositionsCalculator {
    options: LayoutOptions,
}

impl PositionsCalculator {
    /// Create a calculator.
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Position every segment for a `video_width` x `video_height` frame.
    #[tracing::instrument(skip(self, doc))]
    pub fn calculate(&self, doc: &mut Document, video_width: u32, video_height: u32) {
        for segment in doc.segment_ids().to_vec() {
            self.calculate_segment(doc, segment, video_width, video_height);
        }
        tracing::info!(clips = doc.clip_ids().len(), "positioned word clips");
    }

    /// Position one segment.
    pub fn calculate_segment(
        &self,
        doc: &mut Document,
        segment: SegmentId,
        video_width: u32,
        video_height: u32,
    ) {
        let lines = doc.segment(segment).lines().to_vec();
        let block_height: u32 = lines
            .iter()
            .map(|&l| doc.line(l).max_layout.size.height)
            .sum();
        let top = self
            .options
            .vertical_align
            .block_y(video_height, block_height);

        let mut y = i64::from(top);
        let mut left = i64::MAX;
        let mut width = 0u32;
        for &line in &lines {
            let line_x = self.place_baseline(doc, line, video_width, y);
            for state in ElementState::LINE_STATES {
                self.place_state(doc, line, state, video_width, y);
            }
            let size = doc.line(line).max_layout.size;
            left = left.min(line_x);
            width = width.max(size.width);
            y += i64::from(size.height);
        }

        let seg = doc.segment_mut(segment);
        seg.max_layout = ElementLayout {
            position: Position::new(if lines.is_empty() { 0 } else { px(left) }, top),
            size: Size::new(width, block_height),
        };
    }

    /// Word-level placement from slot sizes; returns the line's left edge.
    fn place_baseline(&self, doc: &mut Document, line: LineId, video_width: u32, y: i64) -> i64 {
        let spacing = i64::from(self.options.word_spacing);
        let size = doc.line(line).max_layout.size;
        let line_x = centered(video_width, i64::from(size.width));
        let line_h = i64::from(size.height);

        let mut x = line_x;
        for word in doc.line(line).words().to_vec() {
            let w = doc.word_mut(word);
            let wh = i64::from(w.max_layout.size.height);
            w.max_layout.position = Position::new(px(x), px(y + (line_h - wh).div_euclid(2)));
            x += i64::from(w.max_layout.size.width) + spacing;
        }
        doc.line_mut(line).max_layout.position = Position::new(px(line_x), px(y));
        line_x
    }

    fn place_state(
        &self,
        doc: &mut Document,
        line: LineId,
        state: ElementState,
        video_width: u32,
        y: i64,
    ) {
        let spacing = i64::from(self.options.word_spacing);
        let line_h = i64::from(doc.line(line).max_layout.size.height);
        let words = doc.line(line).words().to_vec();

        let slots: Vec<i64> = words
            .iter()
            .map(|&w| {
                doc.word(w)
                    .clips()
                    .iter()
                    .map(|&c| doc.clip(c))
                    .filter(|c| c.states().line() == state)
                    .map(|c| i64::from(c.layout.size.width))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let line_w =
            slots.iter().sum::<i64>() + spacing * (slots.len().saturating_sub(1) as i64);

        let mut slot_x = centered(video_width, line_w);
        for (word, slot) in words.into_iter().zip(slots) {
            for clip in doc.word(word).clips().to_vec() {
                let c = doc.clip_mut(clip);
                if c.states().line() != state {
                    continue;
                }
                let cw = i64::from(c.layout.size.width);
                let ch = i64::from(c.layout.size.height);
                c.layout.position = Position::new(
                    px(slot_x + (slot - cw).div_euclid(2)),
                    px(y + (line_h - ch).div_euclid(2)),
                );
            }
            slot_x += slot + spacing;
        }
    }
}

fn centered(video_width: u32, width: i64) -> i64 {
    (i64::from(video_width) - width).div_euclid(2)
}

fn px(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
#[path = "../../tests/unit/layout/positions.rs"]
mod tests;
