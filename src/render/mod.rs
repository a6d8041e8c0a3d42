//! Word rendering: the renderer capability, a memoizing decorator and two implementations.

/// Memoizing renderer decorator.
pub mod cache;
/// Deterministic block renderer for dry runs and tests.
pub mod fixed;
/// Renderer trait and image handle.
pub mod renderer;
/// SVG text renderer with style sheets.
pub mod svg;
