//! Word clip generation.

/// Per-state clip generation with the reposition flag.
pub mod generator;
