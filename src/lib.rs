//! Subcast renders word-by-word narrated captions onto video.
//!
//! A transcript with per-word timing becomes a [`Document`]. Each word is rendered once per
//! narration state, wrapped into lines and placed in pixels; the resulting clips are composited
//! onto the source video by a parallel, chunked ffmpeg pipeline:
//!
//! - Load a [`Transcript`] and build a [`Document`]
//! - Lay it out with a [`CaptionPipeline`] around any [`WordRenderer`]
//! - Composite with a [`VideoComposer`], optionally mixing sound effects
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Word clip generation.
pub mod clips;
/// Parallel chunked video compositor.
pub mod compose;
/// Caption document model.
pub mod document;
/// Line wrapping and placement.
pub mod layout;
/// End-to-end caption pipeline.
pub mod pipeline;
/// Word renderers.
pub mod render;

pub use crate::foundation::core::{
    ElementLayout, Fps, FrameIndex, FrameRange, Position, Size, TimeFragment,
};
pub use crate::foundation::error::{SubcastError, SubcastResult};
pub use crate::foundation::math::{db_to_linear, gain_to_db};

pub use crate::clips::generator::ClipGenerator;
pub use crate::compose::composer::{ComposeOptions, RenderStats, VideoComposer};
pub use crate::compose::element::{AudioElement, FrameRgb, ImageElement, MediaElement};
pub use crate::compose::format::VideoQuality;
pub use crate::document::model::{ClipId, Document, LineId, SegmentId, WordId};
pub use crate::document::segmenter::Segmenter;
pub use crate::document::state::{ElementState, StateCombination};
pub use crate::document::structure::StructuralTag;
pub use crate::document::transcript::Transcript;
pub use crate::layout::options::{
    LayoutOptions, TextOverflowStrategy, VerticalAlignment, VerticalAlignmentType,
};
pub use crate::pipeline::{CaptionPipeline, LayoutSnapshot, PipelineConfig};
pub use crate::render::fixed::FixedSizeRenderer;
pub use crate::render::renderer::{RenderedImage, WordRenderer};
pub use crate::render::svg::{StyleSheet, SvgWordRenderer};
