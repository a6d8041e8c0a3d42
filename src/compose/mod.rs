//! Parallel chunked video compositor over ffmpeg subprocesses.
//!
//! The source is split into contiguous frame ranges. Each range is decoded, overlaid and
//! re-encoded by its own worker; parts are concatenated and the audio is optionally remixed
//! with sound effects before the final remux.

/// Sound-effect decoding, mixing and normalization.
pub mod audio;
/// Frame range partitioning.
pub mod chunk;
/// Render coordinator.
pub mod composer;
/// Overlay elements and the RGB frame buffer.
pub mod element;
/// Per-chunk decoder/encoder pair.
pub mod encoder;
/// Output container and codec selection.
pub mod format;
/// Source probing.
pub mod probe;
/// Frame source and sink seams.
pub mod sink;
