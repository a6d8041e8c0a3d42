use crate::{
    clips::generator::ClipGenerator,
    document::model::{Document, SegmentId},
    document::structure::assign_structural_tags,
    foundation::core::Size,
    foundation::error::SubcastResult,
    layout::options::LayoutOptions,
    layout::splitter::{LineSplitter, line_extent},
    render::renderer::WordRenderer,
};

const MAX_PASSES: usize = 16;

/// Outcome of [`LayoutUpdater::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutUpdate {
    /// Segments whose line grouping changed and whose clips were regenerated.
    pub rewrapped: Vec<SegmentId>,
    /// Clips created during regeneration.
    pub regenerated_clips: usize,
}

/// Brings layout in line with measured clip sizes after clip generation.
///
/// Word slot sizes are replaced by the largest clip of each word, segments are wrapped again,
/// and segments whose lines changed get their clips regenerated (clip windows depend on line
/// boundaries). A new grouping can surface renderings the old one skipped, so slots only grow
/// from then on and wrapping repeats until no slot grows. Line and segment extents are
/// refreshed last.
#[derive(Clone, Debug)]
pub struct LayoutUpdater {
    splitter: LineSplitter,
    word_spacing: u32,
}

impl LayoutUpdater {
    /// Create an updater; `options` are validated.
    pub fn new(options: LayoutOptions) -> SubcastResult<Self> {
        let word_spacing = options.word_spacing;
        Ok(Self {
            splitter: LineSplitter::new(options)?,
            word_spacing,
        })
    }

    /// Refresh sizes, re-wrap and regenerate where needed.
    #[tracing::instrument(skip(self, doc, generator, renderer))]
    pub fn update<R>(
        &self,
        doc: &mut Document,
        generator: &mut ClipGenerator,
        renderer: &mut R,
        video_width: u32,
    ) -> SubcastResult<LayoutUpdate>
    where
        R: WordRenderer + ?Sized,
    {
        refresh_word_sizes(doc);
        let mut rewrapped: Vec<SegmentId> = Vec::new();
        let mut regenerated_clips = 0;
        let mut passes = 0;
        loop {
            passes += 1;
            let changed = self.splitter.split(doc, video_width)?;
            if !changed.is_empty() {
                assign_structural_tags(doc)?;
            }
            for &segment in &changed {
                doc.clear_clips(segment);
                regenerated_clips += generator.generate_segment(doc, segment, renderer)?;
                if !rewrapped.contains(&segment) {
                    rewrapped.push(segment);
                }
            }
            // Regenerated clips may show renderings the previous grouping skipped; grow the
            // slots and wrap again until every slot covers its clips.
            if !grow_word_sizes(doc) {
                break;
            }
            if passes >= MAX_PASSES {
                tracing::warn!(passes, "layout did not settle; keeping the last grouping");
                break;
            }
        }
        rewrapped.sort();
        self.refresh_line_and_segment_sizes(doc);
        generator.reset_reposition();

        tracing::info!(
            rewrapped = rewrapped.len(),
            regenerated_clips,
            passes,
            "updated layout from measured clip sizes"
        );
        Ok(LayoutUpdate {
            rewrapped,
            regenerated_clips,
        })
    }

    /// Line: `Σ word widths + (n - 1) * spacing` by max word height.
    /// Segment: max line width by `Σ` line heights.
    pub fn refresh_line_and_segment_sizes(&self, doc: &mut Document) {
        for segment in doc.segment_ids().to_vec() {
            let mut seg_size = Size::default();
            for line in doc.segment(segment).lines().to_vec() {
                let size = line_extent(doc, doc.line(line).words(), self.word_spacing);
                doc.line_mut(line).max_layout.size = size;
                seg_size.width = seg_size.width.max(size.width);
                seg_size.height = seg_size.height.saturating_add(size.height);
            }
            doc.segment_mut(segment).max_layout.size = seg_size;
        }
    }
}

/// Replace each word's slot size with the largest of its clips.
pub fn refresh_word_sizes(doc: &mut Document) {
    for word in doc.word_ids() {
        let size = doc
            .word(word)
            .clips()
            .iter()
            .map(|&c| doc.clip(c).layout.size)
            .fold(Size::default(), Size::max);
        doc.word_mut(word).max_layout.size = size;
    }
}

/// Grow each word's slot to cover all of its clips. Returns `true` if any slot grew.
pub fn grow_word_sizes(doc: &mut Document) -> bool {
    let mut grew = false;
    for word in doc.word_ids() {
        let current = doc.word(word).max_layout.size;
        let size = doc
            .word(word)
            .clips()
            .iter()
            .map(|&c| doc.clip(c).layout.size)
            .fold(current, Size::max);
        if size != current {
            doc.word_mut(word).max_layout.size = size;
            grew = true;
        }
    }
    grew
}

#[cfg(test)]
#[path = "../../tests/unit/layout/updater.rs"]
mod tests;
