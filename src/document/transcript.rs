use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    compose::element::AudioElement,
    document::model::Document,
    document::tags::TagSet,
    foundation::core::TimeFragment,
    foundation::error::{SubcastError, SubcastResult},
};

/// Word with timing as produced by an external transcriber.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptWord {
    /// Display text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Optional style/selection labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Segment of a transcript.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Words in narration order.
    pub words: Vec<TranscriptWord>,
}

/// JSON transcript input.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transcript {
    /// Segments in narration order.
    pub segments: Vec<TranscriptSegment>,
    /// Sound effects to mix into the final audio.
    #[serde(default)]
    pub sound_effects: Vec<AudioElement>,
}

impl Transcript {
    /// Read and parse a transcript JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SubcastResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open transcript '{}'", path.display()))?;
        let transcript: Transcript = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(transcript)
    }

    /// Resolve relative sound-effect paths against `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        for sfx in &mut self.sound_effects {
            if sfx.path.is_relative() {
                sfx.path = root.join(&sfx.path);
            }
        }
    }
}

impl Document {
    /// Build the document tree: one initial line per segment holding all of its words.
    ///
    /// Segments without words are dropped.
    pub fn from_transcript(transcript: &Transcript) -> SubcastResult<Self> {
        let mut doc = Document::new();
        for (seg_idx, seg) in transcript.segments.iter().enumerate() {
            if seg.words.is_empty() {
                continue;
            }
            let time = TimeFragment::new(seg.start, seg.end)
                .map_err(|e| in_context(format!("segment {seg_idx}"), e))?;
            let segment = doc.add_segment(time)?;
            let line = doc.add_line(segment)?;
            for (word_idx, w) in seg.words.iter().enumerate() {
                let mut tags = TagSet::new();
                for name in &w.tags {
                    tags.insert(doc.tags_mut().intern(name)?);
                }
                let time = TimeFragment::new(w.start, w.end)
                    .map_err(|e| in_context(format!("segment {seg_idx} word {word_idx}"), e))?;
                doc.add_word(line, w.text.clone(), time, tags).map_err(|e| {
                    in_context(format!("segment {seg_idx} word {word_idx} ('{}')", w.text), e)
                })?;
            }
        }
        for sfx in &transcript.sound_effects {
            doc.add_sound_effect(sfx.clone());
        }
        Ok(doc)
    }
}

/// Prefix a validation message with where in the transcript it happened.
fn in_context(location: String, err: SubcastError) -> SubcastError {
    match err {
        SubcastError::Validation(msg) => SubcastError::validation(format!("{location}: {msg}")),
        other => other,
    }
}

/// Directory used to resolve paths relative to a transcript file.
pub fn transcript_root(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "../../tests/unit/document/transcript.rs"]
mod tests;
