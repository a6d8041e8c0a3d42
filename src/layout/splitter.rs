//! Greedy line wrapping with min/max line-count enforcement.

use std::ops::Range;

use crate::{
    document::model::{Document, SegmentId, WordId},
    foundation::core::Size,
    foundation::error::SubcastResult,
    layout::options::{LayoutOptions, TextOverflowStrategy},
};

/// Wraps the words of each segment into lines using their `max_layout` widths.
#[derive(Clone, Debug)]
pub struct LineSplitter {
    options: LayoutOptions,
}

impl LineSplitter {
    /// Create a splitter; `options` are validated.
    pub fn new(options: LayoutOptions) -> SubcastResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Re-wrap every segment. Returns the segments whose line grouping changed.
    #[tracing::instrument(skip(self, doc))]
    pub fn split(&self, doc: &mut Document, video_width: u32) -> SubcastResult<Vec<SegmentId>> {
        let mut changed = Vec::new();
        for segment in doc.segment_ids().to_vec() {
            if self.split_segment(doc, segment, video_width)? {
                changed.push(segment);
            }
        }
        tracing::info!(
            segments = doc.segment_ids().len(),
            changed = changed.len(),
            lines = doc.line_ids().len(),
            "split segments into lines"
        );
        Ok(changed)
    }

    /// Re-wrap one segment and refresh its line sizes. Returns `true` if the grouping changed.
    pub fn split_segment(
        &self,
        doc: &mut Document,
        segment: SegmentId,
        video_width: u32,
    ) -> SubcastResult<bool> {
        let words = doc.segment_words(segment);
        if words.is_empty() {
            return Ok(false);
        }
        let widths: Vec<u32> = words
            .iter()
            .map(|&w| doc.word(w).max_layout.size.width)
            .collect();
        let ranges = self.split_widths(&widths, video_width);

        let groups: Vec<Vec<WordId>> = ranges.into_iter().map(|r| words[r].to_vec()).collect();
        let current: Vec<Vec<WordId>> = doc
            .segment(segment)
            .lines()
            .iter()
            .map(|&l| doc.line(l).words().to_vec())
            .collect();
        let changed = current != groups;
        if changed {
            doc.replace_lines(segment, groups)?;
        }
        for line in doc.segment(segment).lines().to_vec() {
            let size = line_extent(doc, doc.line(line).words(), self.options.word_spacing);
            doc.line_mut(line).max_layout.size = size;
        }
        Ok(changed)
    }

    /// Wrap a sequence of word widths into index ranges, one per line.
    ///
    /// Every range is non-empty and the ranges cover `0..widths.len()` in order.
    pub fn split_widths(&self, widths: &[u32], video_width: u32) -> Vec<Range<usize>> {
        let max_width = u64::from(self.options.max_line_width(video_width));
        let spacing = u64::from(self.options.word_spacing);
        let exceed_last_line = self.options.on_text_overflow_strategy
            == TextOverflowStrategy::ExceedMaxWidthRatioInLastLine;
        let last_line_index = self.options.max_number_of_lines.saturating_sub(1) as usize;

        let mut lines: Vec<Range<usize>> = Vec::new();
        let mut start = 0usize;
        let mut current = 0u64;
        for (i, &w) in widths.iter().enumerate() {
            let w = u64::from(w);
            if i == start {
                current = w;
                continue;
            }
            let candidate = current + spacing + w;
            let forced = exceed_last_line && lines.len() >= last_line_index;
            if forced || candidate <= max_width {
                current = candidate;
            } else {
                lines.push(start..i);
                start = i;
                current = w;
            }
        }
        if start < widths.len() {
            lines.push(start..widths.len());
        }

        self.enforce_min_lines(&mut lines, widths);
        lines
    }

    /// Bisect the widest splittable line until the minimum line count is met.
    fn enforce_min_lines(&self, lines: &mut Vec<Range<usize>>, widths: &[u32]) {
        let min = self.options.min_number_of_lines as usize;
        let spacing = u64::from(self.options.word_spacing);
        let range_width = |r: &Range<usize>| -> u64 {
            widths[r.clone()].iter().map(|&w| u64::from(w)).sum::<u64>()
                + spacing * (r.len().saturating_sub(1) as u64)
        };

        while lines.len() < min {
            let mut widest: Option<(usize, u64)> = None;
            for (idx, r) in lines.iter().enumerate() {
                if r.len() < 2 {
                    continue;
                }
                let w = range_width(r);
                if widest.is_none_or(|(_, best)| w > best) {
                    widest = Some((idx, w));
                }
            }
            let Some((idx, _)) = widest else {
                break;
            };
            let r = lines[idx].clone();
            let mid = r.start + r.len() / 2;
            lines[idx] = r.start..mid;
            lines.insert(idx + 1, mid..r.end);
        }
    }
}

/// Width `Σ widths + (n - 1) * spacing` and height `max heights` of a run of words.
pub(crate) fn line_extent(doc: &Document, words: &[WordId], spacing: u32) -> Size {
    let mut width = 0u32;
    let mut height = 0u32;
    for (i, &w) in words.iter().enumerate() {
        let size = doc.word(w).max_layout.size;
        if i > 0 {
            width = width.saturating_add(spacing);
        }
        width = width.saturating_add(size.width);
        height = height.max(size.height);
    }
    Size::new(width, height)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/splitter.rs"]
mod tests;
