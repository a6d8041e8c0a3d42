//! Caption document tree, narration states and tag interning.

/// Arena document model.
pub mod model;
/// Transcript re-segmentation.
pub mod segmenter;
/// Narration state machine.
pub mod state;
/// Tags derived from tree position.
pub mod structure;
/// Interned word tags.
pub mod tags;
/// Transcript input format.
pub mod transcript;
