use std::sync::Arc;

use image::RgbaImage;

use crate::{
    document::state::StateCombination,
    document::tags::{TagRegistry, TagSet},
    foundation::core::Size,
    foundation::error::SubcastResult,
};

/// Straight-alpha RGBA rendering of a word, shared between clips and overlay elements.
#[derive(Clone, Debug)]
pub struct RenderedImage(Arc<RgbaImage>);

impl RenderedImage {
    /// Wrap an image buffer.
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Extent in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Borrow the pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

/// What a renderer needs to know about a word.
#[derive(Clone, Copy, Debug)]
pub struct WordRequest<'a> {
    /// Display text.
    pub text: &'a str,
    /// Style/selection labels.
    pub tags: &'a TagSet,
    /// Registry resolving tag ids to names.
    pub registry: &'a TagRegistry,
}

impl<'a> WordRequest<'a> {
    /// Resolved tag names, in id order.
    pub fn tag_names(&self) -> Vec<&'a str> {
        let registry: &'a TagRegistry = self.registry;
        self.tags.iter().filter_map(|id| registry.name(id)).collect()
    }
}

/// Capability interface of the external word renderer.
///
/// `render` is a pure function of word text, tags and state: `Ok(None)` means the word is not
/// visible in that state; `Err` aborts the pipeline.
pub trait WordRenderer {
    /// Render `word` styled for `states`.
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>>;
}

impl<R: WordRenderer + ?Sized> WordRenderer for &mut R {
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>> {
        (**self).render(word, states)
    }
}

impl<R: WordRenderer + ?Sized> WordRenderer for Box<R> {
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>> {
        (**self).render(word, states)
    }
}
