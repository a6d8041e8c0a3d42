use crate::{
    document::model::{Document, SegmentId, WordId},
    document::state::StateCombination,
    foundation::error::SubcastResult,
    render::renderer::{RenderedImage, WordRenderer, WordRequest},
};

/// Creates one [`WordClip`](crate::document::model::WordClip) per visible, non-empty narration
/// window of every word.
///
/// While generating, it records whether any rendering came back at a size different from the
/// size the word was laid out with. Layout consults that flag to decide whether wrapping has to
/// be redone with measured sizes.
#[derive(Clone, Debug, Default)]
pub struct ClipGenerator {
    reposition_needed: bool,
    generated: usize,
    hidden: usize,
}

impl ClipGenerator {
    /// Create a generator with a cleared reposition flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some clip's measured size differs from its word's assumed size.
    pub fn reposition_needed(&self) -> bool {
        self.reposition_needed
    }

    /// Clear the reposition flag (after layout has been refreshed).
    pub fn reset_reposition(&mut self) {
        self.reposition_needed = false;
    }

    /// Clips created so far.
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// Windows skipped because the renderer reported the word as not visible.
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// Generate clips for every segment. Renderer failures abort immediately.
    #[tracing::instrument(skip_all)]
    pub fn generate<R>(&mut self, doc: &mut Document, renderer: &mut R) -> SubcastResult<usize>
    where
        R: WordRenderer + ?Sized,
    {
        let mut total = 0;
        for segment in doc.segment_ids().to_vec() {
            total += self.generate_segment(doc, segment, renderer)?;
        }
        tracing::info!(
            clips = total,
            hidden = self.hidden,
            reposition_needed = self.reposition_needed,
            "generated word clips"
        );
        Ok(total)
    }

    /// Generate clips for the words of one segment.
    pub fn generate_segment<R>(
        &mut self,
        doc: &mut Document,
        segment: SegmentId,
        renderer: &mut R,
    ) -> SubcastResult<usize>
    where
        R: WordRenderer + ?Sized,
    {
        let mut created = 0;
        for word in doc.segment_words(segment) {
            let rendered = self.render_word(doc, word, renderer)?;
            let assumed = doc.word(word).max_layout.size;
            for (states, image) in rendered {
                if image.size() != assumed {
                    self.reposition_needed = true;
                }
                doc.add_clip(word, states, image)?;
                created += 1;
            }
        }
        self.generated += created;
        Ok(created)
    }

    fn render_word<R>(
        &mut self,
        doc: &Document,
        word: WordId,
        renderer: &mut R,
    ) -> SubcastResult<Vec<(StateCombination, RenderedImage)>>
    where
        R: WordRenderer + ?Sized,
    {
        let w = doc.word(word);
        let request = WordRequest {
            text: &w.text,
            tags: &w.tags,
            registry: doc.tags(),
        };
        let mut out = Vec::with_capacity(StateCombination::ALL.len());
        for (states, _window) in doc.narration_bounds(word).windows() {
            match renderer.render(&request, states)? {
                Some(image) => out.push((states, image)),
                None => self.hidden += 1,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clips/generator.rs"]
mod tests;
