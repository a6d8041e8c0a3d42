use std::collections::HashMap;

use crate::{
    document::state::StateCombination,
    document::tags::TagSet,
    foundation::error::SubcastResult,
    render::renderer::{RenderedImage, WordRenderer, WordRequest},
};

type CacheKey = (String, TagSet, StateCombination);

/// Memoizing decorator around a [`WordRenderer`].
///
/// A cached `None` is a valid hit: the word is hidden in that state and the inner renderer is
/// not asked again. Errors are never cached.
#[derive(Debug)]
pub struct CachingRenderer<R> {
    inner: R,
    entries: HashMap<CacheKey, Option<RenderedImage>>,
    hits: u64,
    misses: u64,
}

impl<R: WordRenderer> CachingRenderer<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Number of requests answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of requests forwarded to the inner renderer.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unwrap the inner renderer.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: WordRenderer> WordRenderer for CachingRenderer<R> {
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>> {
        let key = (word.text.to_owned(), word.tags.clone(), states);
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(cached.clone());
        }
        self.misses += 1;
        let rendered = self.inner.render(word, states)?;
        self.entries.insert(key, rendered.clone());
        Ok(rendered)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
