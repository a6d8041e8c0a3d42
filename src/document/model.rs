//! Arena-backed caption document: `Document -> Segment -> Line -> Word -> WordClip`.
//!
//! Parents own their children through index handles; every child stores the handle of its
//! parent, so upward traversal is O(1) without reference cycles. Handles are only minted by the
//! owning [`Document`] and stay valid for its whole lifetime (nodes are never freed).

use crate::{
    compose::element::AudioElement,
    document::state::{NarrationBounds, StateCombination},
    document::tags::{TagRegistry, TagSet},
    foundation::core::{ElementLayout, TimeFragment},
    foundation::error::{SubcastError, SubcastResult},
    render::renderer::RenderedImage,
};

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Arena index of the node.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            fn from_len(len: usize) -> SubcastResult<Self> {
                u32::try_from(len)
                    .map(Self)
                    .map_err(|_| SubcastError::validation("document arena is full"))
            }
        }
    };
}

node_id!(
    /// Handle to a [`Segment`].
    SegmentId
);
node_id!(
    /// Handle to a [`Line`].
    LineId
);
node_id!(
    /// Handle to a [`Word`].
    WordId
);
node_id!(
    /// Handle to a [`WordClip`].
    ClipId
);

/// A spoken phrase: one or more wrapped lines.
#[derive(Debug, Clone)]
pub struct Segment {
    lines: Vec<LineId>,
    /// Bounding layout of all lines.
    pub max_layout: ElementLayout,
    /// Narration interval.
    pub time: TimeFragment,
}

impl Segment {
    /// Lines in reading order.
    pub fn lines(&self) -> &[LineId] {
        &self.lines
    }
}

/// A visually wrapped row of words.
#[derive(Debug, Clone)]
pub struct Line {
    words: Vec<WordId>,
    /// Layout of the largest rendering across its words.
    pub max_layout: ElementLayout,
    /// Narration interval, from the first word start to the last word end.
    pub time: TimeFragment,
    segment: SegmentId,
}

impl Line {
    /// Words in reading order.
    pub fn words(&self) -> &[WordId] {
        &self.words
    }

    /// Owning segment.
    pub fn segment(&self) -> SegmentId {
        self.segment
    }
}

/// A single narrated word.
#[derive(Debug, Clone)]
pub struct Word {
    /// Display text.
    pub text: String,
    /// Style/selection labels.
    pub tags: TagSet,
    /// Narration interval.
    pub time: TimeFragment,
    /// Slot layout: size is the largest rendering of the word, position the baseline placement.
    pub max_layout: ElementLayout,
    line: LineId,
    clips: Vec<ClipId>,
}

impl Word {
    /// Owning line.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// State-specific renderings.
    pub fn clips(&self) -> &[ClipId] {
        &self.clips
    }
}

/// One time-bounded, state-specific rendering of a word.
#[derive(Debug, Clone)]
pub struct WordClip {
    states: StateCombination,
    image: RenderedImage,
    /// Pixel placement for this state.
    pub layout: ElementLayout,
    word: WordId,
}

impl WordClip {
    /// The (line, word) state pair this clip renders.
    pub fn states(&self) -> StateCombination {
        self.states
    }

    /// Cached rendered image.
    pub fn image(&self) -> &RenderedImage {
        &self.image
    }

    /// Owning word.
    pub fn word(&self) -> WordId {
        self.word
    }
}

/// Root of the caption tree plus the independent sound-effect track list.
#[derive(Debug, Clone, Default)]
pub struct Document {
    segment_order: Vec<SegmentId>,
    segments: Vec<Segment>,
    lines: Vec<Line>,
    words: Vec<Word>,
    clips: Vec<WordClip>,
    tags: TagRegistry,
    sound_effects: Vec<AudioElement>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Segments must be added in narration order.
    pub fn add_segment(&mut self, time: TimeFragment) -> SubcastResult<SegmentId> {
        let time = TimeFragment::new(time.start, time.end)?;
        if let Some(prev) = self.segment_order.last()
            && self.segments[prev.index()].time.end > time.start
        {
            return Err(SubcastError::validation(
                "segments must not overlap and must be added in time order",
            ));
        }
        let id = SegmentId::from_len(self.segments.len())?;
        self.segments.push(Segment {
            lines: Vec::new(),
            max_layout: ElementLayout::default(),
            time,
        });
        self.segment_order.push(id);
        Ok(id)
    }

    /// Append an empty line to `segment`; its time grows as words are added.
    pub fn add_line(&mut self, segment: SegmentId) -> SubcastResult<LineId> {
        let id = LineId::from_len(self.lines.len())?;
        let start = self.segments[segment.index()].time.start;
        self.lines.push(Line {
            words: Vec::new(),
            max_layout: ElementLayout::default(),
            time: TimeFragment { start, end: start },
            segment,
        });
        self.segments[segment.index()].lines.push(id);
        Ok(id)
    }

    /// Append a word to `line`, keeping `word ⊆ line ⊆ segment` and word order.
    pub fn add_word(
        &mut self,
        line: LineId,
        text: impl Into<String>,
        time: TimeFragment,
        tags: TagSet,
    ) -> SubcastResult<WordId> {
        let time = TimeFragment::new(time.start, time.end)?;
        let segment_time = self.segments[self.lines[line.index()].segment.index()].time;
        if !segment_time.covers(time) {
            return Err(SubcastError::validation(format!(
                "word [{}, {}) is outside its segment [{}, {})",
                time.start, time.end, segment_time.start, segment_time.end
            )));
        }
        if let Some(prev) = self.lines[line.index()].words.last()
            && self.words[prev.index()].time.end > time.start
        {
            return Err(SubcastError::validation(
                "words must not overlap and must be added in time order",
            ));
        }

        let id = WordId::from_len(self.words.len())?;
        self.words.push(Word {
            text: text.into(),
            tags,
            time,
            max_layout: ElementLayout::default(),
            line,
            clips: Vec::new(),
        });
        let l = &mut self.lines[line.index()];
        if l.words.is_empty() {
            l.time = time;
        } else {
            l.time.end = time.end;
        }
        l.words.push(id);
        Ok(id)
    }

    /// Attach a rendering of `word` for `states`.
    pub fn add_clip(
        &mut self,
        word: WordId,
        states: StateCombination,
        image: RenderedImage,
    ) -> SubcastResult<ClipId> {
        let id = ClipId::from_len(self.clips.len())?;
        let layout = ElementLayout {
            size: image.size(),
            ..ElementLayout::default()
        };
        self.clips.push(WordClip {
            states,
            image,
            layout,
            word,
        });
        self.words[word.index()].clips.push(id);
        Ok(id)
    }

    /// Detach every clip of every word in `segment` (used before regenerating it).
    pub fn clear_clips(&mut self, segment: SegmentId) {
        for word in self.segment_words(segment) {
            self.words[word.index()].clips.clear();
        }
    }

    /// Regroup the words of `segment` into new lines.
    ///
    /// `groups` must list every word of the segment exactly once, in reading order. Existing line
    /// slots are reused in order; surplus lines are detached from the segment. Line times are
    /// recomputed and line layouts reset.
    pub fn replace_lines(
        &mut self,
        segment: SegmentId,
        groups: Vec<Vec<WordId>>,
    ) -> SubcastResult<Vec<LineId>> {
        let current = self.segment_words(segment);
        let flattened: Vec<WordId> = groups.iter().flatten().copied().collect();
        if flattened != current {
            return Err(SubcastError::validation(
                "line groups must contain every segment word exactly once, in order",
            ));
        }
        if groups.iter().any(Vec::is_empty) {
            return Err(SubcastError::validation("line groups must not be empty"));
        }

        let mut slots = std::mem::take(&mut self.segments[segment.index()].lines).into_iter();
        let mut new_lines = Vec::with_capacity(groups.len());
        for group in groups {
            let id = match slots.next() {
                Some(id) => id,
                None => {
                    let id = LineId::from_len(self.lines.len())?;
                    self.lines.push(Line {
                        words: Vec::new(),
                        max_layout: ElementLayout::default(),
                        time: TimeFragment::default(),
                        segment,
                    });
                    id
                }
            };
            for &w in &group {
                self.words[w.index()].line = id;
            }
            let start = self.words[group[0].index()].time.start;
            let end = self.words[group[group.len() - 1].index()].time.end;
            let line = &mut self.lines[id.index()];
            line.time = TimeFragment { start, end };
            line.max_layout = ElementLayout::default();
            line.words = group;
            new_lines.push(id);
        }
        for detached in slots {
            self.lines[detached.index()].words.clear();
        }
        self.segments[segment.index()].lines = new_lines.clone();
        Ok(new_lines)
    }

    /// Segment, line and word times for narration window derivation.
    pub fn narration_bounds(&self, word: WordId) -> NarrationBounds {
        let w = &self.words[word.index()];
        let line = &self.lines[w.line.index()];
        let segment = &self.segments[line.segment.index()];
        NarrationBounds {
            segment: segment.time,
            line: line.time,
            word: w.time,
        }
    }

    /// Time window during which `clip` is shown.
    pub fn clip_window(&self, clip: ClipId) -> TimeFragment {
        let c = &self.clips[clip.index()];
        c.states.window(&self.narration_bounds(c.word))
    }

    /// Segment handles in narration order.
    pub fn segment_ids(&self) -> &[SegmentId] {
        &self.segment_order
    }

    /// All words of `segment` in reading order.
    pub fn segment_words(&self, segment: SegmentId) -> Vec<WordId> {
        self.segments[segment.index()]
            .lines
            .iter()
            .flat_map(|l| self.lines[l.index()].words.iter().copied())
            .collect()
    }

    /// All attached lines in reading order.
    pub fn line_ids(&self) -> Vec<LineId> {
        self.segment_order
            .iter()
            .flat_map(|s| self.segments[s.index()].lines.iter().copied())
            .collect()
    }

    /// All attached words in reading order.
    pub fn word_ids(&self) -> Vec<WordId> {
        self.line_ids()
            .into_iter()
            .flat_map(|l| self.lines[l.index()].words.iter().copied())
            .collect()
    }

    /// All attached clips in document order.
    pub fn clip_ids(&self) -> Vec<ClipId> {
        self.word_ids()
            .into_iter()
            .flat_map(|w| self.words[w.index()].clips.iter().copied())
            .collect()
    }

    /// Borrow a segment.
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    /// Mutably borrow a segment.
    pub fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.index()]
    }

    /// Borrow a line.
    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.index()]
    }

    /// Mutably borrow a line.
    pub fn line_mut(&mut self, id: LineId) -> &mut Line {
        &mut self.lines[id.index()]
    }

    /// Borrow a word.
    pub fn word(&self, id: WordId) -> &Word {
        &self.words[id.index()]
    }

    /// Mutably borrow a word.
    pub fn word_mut(&mut self, id: WordId) -> &mut Word {
        &mut self.words[id.index()]
    }

    /// Borrow a clip.
    pub fn clip(&self, id: ClipId) -> &WordClip {
        &self.clips[id.index()]
    }

    /// Mutably borrow a clip.
    pub fn clip_mut(&mut self, id: ClipId) -> &mut WordClip {
        &mut self.clips[id.index()]
    }

    /// Tag name registry.
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Mutable tag name registry.
    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    /// Schedule a sound effect.
    pub fn add_sound_effect(&mut self, effect: AudioElement) {
        self.sound_effects.push(effect);
    }

    /// Scheduled sound effects.
    pub fn sound_effects(&self) -> &[AudioElement] {
        &self.sound_effects
    }

    /// Space-joined text of a segment.
    pub fn segment_text(&self, segment: SegmentId) -> String {
        self.segment_words(segment)
            .into_iter()
            .map(|w| self.words[w.index()].text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
