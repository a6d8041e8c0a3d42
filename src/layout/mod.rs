//! Line wrapping, size estimation and pixel placement.

/// Layout configuration.
pub mod options;
/// Per-state clip placement.
pub mod positions;
/// Pre-render word size estimate.
pub mod sizes;
/// Greedy line wrapping.
pub mod splitter;
/// Post-render layout refresh.
pub mod updater;
