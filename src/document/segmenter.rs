//! Transcript re-segmentation applied before the document is built.

use crate::{
    document::transcript::{Transcript, TranscriptSegment, TranscriptWord},
    foundation::error::{SubcastError, SubcastResult},
};

/// Splits long transcript segments into shorter ones.
///
/// Chunks never span two input segments. Each produced segment covers exactly its words:
/// it starts at the first word's start and ends at the last word's end.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segmenter {
    /// At most `limit` words per segment.
    LimitByWords {
        /// Words per segment, at least 1.
        limit: usize,
    },
    /// At most `max_chars` characters (spaces not counted) per segment. A tail shorter than
    /// `min_chars` stays with the previous chunk even if that exceeds `max_chars`. A single word
    /// longer than `max_chars` forms a segment of its own.
    LimitByChars {
        /// Character budget per segment, at least 1.
        max_chars: usize,
        /// Minimum characters of a trailing chunk.
        #[serde(default)]
        min_chars: usize,
    },
}

impl Segmenter {
    /// Reject limits that cannot make progress.
    pub fn validate(&self) -> SubcastResult<()> {
        match *self {
            Self::LimitByWords { limit: 0 } => {
                Err(SubcastError::validation("segmenter word limit must be >= 1"))
            }
            Self::LimitByChars { max_chars: 0, .. } => Err(SubcastError::validation(
                "segmenter max_chars must be >= 1",
            )),
            _ => Ok(()),
        }
    }

    /// Re-segment `transcript`; sound effects are kept as they are.
    #[tracing::instrument(skip(transcript), fields(segments = transcript.segments.len()))]
    pub fn apply(&self, transcript: &Transcript) -> SubcastResult<Transcript> {
        self.validate()?;
        let mut segments = Vec::new();
        for segment in &transcript.segments {
            let mut rest = segment.words.as_slice();
            while !rest.is_empty() {
                let take = self.chunk_len(rest);
                let (chunk, tail) = rest.split_at(take);
                segments.push(segment_of(chunk));
                rest = tail;
            }
        }
        tracing::info!(resegmented = segments.len(), "applied transcript segmenter");
        Ok(Transcript {
            segments,
            sound_effects: transcript.sound_effects.clone(),
        })
    }

    /// Number of leading `words` that form the next segment; always in `1..=words.len()`.
    fn chunk_len(&self, words: &[TranscriptWord]) -> usize {
        match *self {
            Self::LimitByWords { limit } => limit.clamp(1, words.len()),
            Self::LimitByChars {
                max_chars,
                min_chars,
            } => {
                let mut chars = 0usize;
                let mut take = 0usize;
                for word in words {
                    let n = word.text.chars().count();
                    if take > 0 && chars + n > max_chars {
                        break;
                    }
                    chars += n;
                    take += 1;
                }
                let remaining: usize = words[take..].iter().map(|w| w.text.chars().count()).sum();
                if remaining < min_chars {
                    words.len()
                } else {
                    take
                }
            }
        }
    }
}

fn segment_of(words: &[TranscriptWord]) -> TranscriptSegment {
    let start = words.first().map_or(0.0, |w| w.start);
    let end = words.last().map_or(start, |w| w.end);
    TranscriptSegment {
        start,
        end,
        words: words.to_vec(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/segmenter.rs"]
mod tests;
