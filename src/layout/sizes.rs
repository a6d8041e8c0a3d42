use crate::{
    document::model::{Document, WordId},
    document::state::StateCombination,
    foundation::core::Size,
    foundation::error::SubcastResult,
    render::renderer::{WordRenderer, WordRequest},
};

/// Pre-render slot size estimate used for the first wrapping pass.
///
/// A word's slot is the per-axis maximum over its visible renderings in every valid
/// combination. A word that is never visible measures zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordSizeCalculator;

impl WordSizeCalculator {
    /// Create a calculator.
    pub fn new() -> Self {
        Self
    }

    /// Write the estimate into every word's `max_layout.size`.
    #[tracing::instrument(skip_all)]
    pub fn calculate<R>(&self, doc: &mut Document, renderer: &mut R) -> SubcastResult<()>
    where
        R: WordRenderer + ?Sized,
    {
        let words = doc.word_ids();
        let mut invisible = 0usize;
        for &word in &words {
            let size = self.measure(doc, word, renderer)?;
            if size == Size::default() {
                invisible += 1;
            }
            doc.word_mut(word).max_layout.size = size;
        }
        tracing::info!(words = words.len(), invisible, "estimated word sizes");
        Ok(())
    }

    /// Largest visible rendering of `word` across all combinations.
    pub fn measure<R>(&self, doc: &Document, word: WordId, renderer: &mut R) -> SubcastResult<Size>
    where
        R: WordRenderer + ?Sized,
    {
        let w = doc.word(word);
        let request = WordRequest {
            text: &w.text,
            tags: &w.tags,
            registry: doc.tags(),
        };
        let mut size = Size::default();
        for states in StateCombination::ALL {
            if let Some(image) = renderer.render(&request, states)? {
                size = size.max(image.size());
            }
        }
        Ok(size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/sizes.rs"]
mod tests;
