use std::collections::{BTreeSet, HashSet};

use image::{Rgba, RgbaImage};

use crate::{
    document::state::StateCombination,
    foundation::error::{SubcastError, SubcastResult},
    render::renderer::{RenderedImage, WordRenderer, WordRequest},
};

/// In-memory renderer producing solid blocks sized from the text length.
///
/// White blocks for dry-run layouts and tests: width is `chars * char_width` (scaled per
/// combination), height is fixed. Combinations can be hidden, and words can be made to fail.
#[derive(Clone, Debug)]
pub struct FixedSizeRenderer {
    char_width: u32,
    height: u32,
    scale_percent: [u32; 5],
    hidden: HashSet<StateCombination>,
    hidden_tags: BTreeSet<String>,
    failing_words: BTreeSet<String>,
    calls: u64,
}

impl FixedSizeRenderer {
    /// Blocks of `char_width` pixels per character and `height` pixels tall.
    pub fn new(char_width: u32, height: u32) -> Self {
        Self {
            char_width,
            height,
            scale_percent: [100; 5],
            hidden: HashSet::new(),
            hidden_tags: BTreeSet::new(),
            failing_words: BTreeSet::new(),
            calls: 0,
        }
    }

    /// Scale the width of renderings for `states` (e.g. 120 widens the active word by 20%).
    pub fn with_scale(mut self, states: StateCombination, percent: u32) -> Self {
        self.scale_percent[states.index()] = percent;
        self
    }

    /// Report `states` as not visible.
    pub fn with_hidden(mut self, states: StateCombination) -> Self {
        self.hidden.insert(states);
        self
    }

    /// Report words carrying `tag` as not visible in every state.
    pub fn with_hidden_tag(mut self, tag: impl Into<String>) -> Self {
        self.hidden_tags.insert(tag.into());
        self
    }

    /// Fail whenever `text` is rendered.
    pub fn with_failure(mut self, text: impl Into<String>) -> Self {
        self.failing_words.insert(text.into());
        self
    }

    /// Number of render calls received.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl WordRenderer for FixedSizeRenderer {
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>> {
        self.calls += 1;
        if self.failing_words.contains(word.text) {
            return Err(SubcastError::render(format!(
                "renderer failed for '{}' ({}, {})",
                word.text,
                states.line().as_str(),
                states.word().as_str()
            )));
        }
        if self.hidden.contains(&states)
            || word
                .tag_names()
                .iter()
                .any(|t| self.hidden_tags.contains(*t))
        {
            return Ok(None);
        }

        let chars = word.text.chars().count() as u32;
        let base = chars.max(1) * self.char_width;
        let width = (base * self.scale_percent[states.index()] / 100).max(1);
        let height = self.height.max(1);
        Ok(Some(RenderedImage::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 255, 255, 255]),
        ))))
    }
}
