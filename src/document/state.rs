use crate::foundation::core::TimeFragment;

/// Narration progress of a word or of its enclosing line.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ElementState {
    /// The word has not started being narrated.
    WordNotNarratedYet,
    /// The word is being narrated right now.
    WordBeingNarrated,
    /// The word has already been narrated.
    WordAlreadyNarrated,
    /// No word of the line has been narrated yet.
    LineNotNarratedYet,
    /// Some word of the line is being narrated.
    LineBeingNarrated,
    /// Every word of the line has been narrated.
    LineAlreadyNarrated,
}

impl ElementState {
    /// The three line-scoped states in narration order.
    pub const LINE_STATES: [ElementState; 3] = [
        ElementState::LineNotNarratedYet,
        ElementState::LineBeingNarrated,
        ElementState::LineAlreadyNarrated,
    ];

    /// Return `true` for the word-scoped family.
    pub fn is_word_state(self) -> bool {
        matches!(
            self,
            Self::WordNotNarratedYet | Self::WordBeingNarrated | Self::WordAlreadyNarrated
        )
    }

    /// Return `true` for the line-scoped family.
    pub fn is_line_state(self) -> bool {
        !self.is_word_state()
    }

    /// Stable style-class name (`word-being-narrated`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WordNotNarratedYet => "word-not-narrated-yet",
            Self::WordBeingNarrated => "word-being-narrated",
            Self::WordAlreadyNarrated => "word-already-narrated",
            Self::LineNotNarratedYet => "line-not-narrated-yet",
            Self::LineBeingNarrated => "line-being-narrated",
            Self::LineAlreadyNarrated => "line-already-narrated",
        }
    }
}

/// One of the five reachable (line-state, word-state) pairs.
///
/// Values can only be obtained from [`StateCombination::ALL`], so an unreachable pair such as
/// (line not narrated, word already narrated) cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct StateCombination {
    line: ElementState,
    word: ElementState,
}

impl StateCombination {
    /// Every valid combination, ordered by when it becomes visible during a segment.
    pub const ALL: [StateCombination; 5] = [
        StateCombination {
            line: ElementState::LineNotNarratedYet,
            word: ElementState::WordNotNarratedYet,
        },
        StateCombination {
            line: ElementState::LineBeingNarrated,
            word: ElementState::WordNotNarratedYet,
        },
        StateCombination {
            line: ElementState::LineBeingNarrated,
            word: ElementState::WordBeingNarrated,
        },
        StateCombination {
            line: ElementState::LineBeingNarrated,
            word: ElementState::WordAlreadyNarrated,
        },
        StateCombination {
            line: ElementState::LineAlreadyNarrated,
            word: ElementState::WordAlreadyNarrated,
        },
    ];

    /// Look up the valid combination for a pair, if it is reachable.
    pub fn from_states(line: ElementState, word: ElementState) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.line == line && c.word == word)
    }

    /// Line-scoped half of the pair.
    pub fn line(self) -> ElementState {
        self.line
    }

    /// Word-scoped half of the pair.
    pub fn word(self) -> ElementState {
        self.word
    }

    /// Return `true` when either half equals `state`.
    pub fn has_state(self, state: ElementState) -> bool {
        self.line == state || self.word == state
    }

    /// Position in [`StateCombination::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Time window during which a word shows this rendering.
    ///
    /// Each window spans two consecutive boundaries of
    /// `segment.start <= line.start <= word.start <= word.end <= line.end <= segment.end`.
    pub fn window(self, bounds: &NarrationBounds) -> TimeFragment {
        let (start, end) = match (self.line, self.word) {
            (ElementState::LineNotNarratedYet, _) => (bounds.segment.start, bounds.line.start),
            (ElementState::LineBeingNarrated, ElementState::WordNotNarratedYet) => {
                (bounds.line.start, bounds.word.start)
            }
            (ElementState::LineBeingNarrated, ElementState::WordBeingNarrated) => {
                (bounds.word.start, bounds.word.end)
            }
            (ElementState::LineBeingNarrated, _) => (bounds.word.end, bounds.line.end),
            _ => (bounds.line.end, bounds.segment.end),
        };
        TimeFragment { start, end }
    }
}

/// The six timestamps that bound every narration window of one word.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NarrationBounds {
    /// Enclosing segment time.
    pub segment: TimeFragment,
    /// Enclosing line time.
    pub line: TimeFragment,
    /// Word time.
    pub word: TimeFragment,
}

impl NarrationBounds {
    /// Non-empty windows in combination order. Windows with `end <= start` are skipped.
    pub fn windows(&self) -> impl Iterator<Item = (StateCombination, TimeFragment)> + '_ {
        StateCombination::ALL
            .into_iter()
            .map(|c| (c, c.window(self)))
            .filter(|(_, w)| !w.is_empty())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/state.rs"]
mod tests;
