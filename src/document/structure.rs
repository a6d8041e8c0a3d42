use crate::{
    document::model::{Document, LineId, WordId},
    document::tags::TagId,
    foundation::error::SubcastResult,
};

/// Tags the layout assigns from a word's position in the document tree.
///
/// Line and segment tags mark every word of that line or segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralTag {
    /// `first-word-in-document`
    FirstWordInDocument,
    /// `first-word-in-segment`
    FirstWordInSegment,
    /// `first-word-in-line`
    FirstWordInLine,
    /// `last-word-in-document`
    LastWordInDocument,
    /// `last-word-in-segment`
    LastWordInSegment,
    /// `last-word-in-line`
    LastWordInLine,
    /// `first-line-in-document`
    FirstLineInDocument,
    /// `first-line-in-segment`
    FirstLineInSegment,
    /// `last-line-in-document`
    LastLineInDocument,
    /// `last-line-in-segment`
    LastLineInSegment,
    /// `first-segment-in-document`
    FirstSegmentInDocument,
    /// `last-segment-in-document`
    LastSegmentInDocument,
}

impl StructuralTag {
    /// Every structural tag.
    pub const ALL: [StructuralTag; 12] = [
        Self::FirstWordInDocument,
        Self::FirstWordInSegment,
        Self::FirstWordInLine,
        Self::LastWordInDocument,
        Self::LastWordInSegment,
        Self::LastWordInLine,
        Self::FirstLineInDocument,
        Self::FirstLineInSegment,
        Self::LastLineInDocument,
        Self::LastLineInSegment,
        Self::FirstSegmentInDocument,
        Self::LastSegmentInDocument,
    ];

    /// Tag name as used in style rules.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstWordInDocument => "first-word-in-document",
            Self::FirstWordInSegment => "first-word-in-segment",
            Self::FirstWordInLine => "first-word-in-line",
            Self::LastWordInDocument => "last-word-in-document",
            Self::LastWordInSegment => "last-word-in-segment",
            Self::LastWordInLine => "last-word-in-line",
            Self::FirstLineInDocument => "first-line-in-document",
            Self::FirstLineInSegment => "first-line-in-segment",
            Self::LastLineInDocument => "last-line-in-document",
            Self::LastLineInSegment => "last-line-in-segment",
            Self::FirstSegmentInDocument => "first-segment-in-document",
            Self::LastSegmentInDocument => "last-segment-in-document",
        }
    }
}

/// Re-derive structural tags for every word from the current line grouping.
///
/// Previously assigned structural tags are removed first, so this is safe to call after every
/// re-wrap. User tags are untouched.
pub fn assign_structural_tags(doc: &mut Document) -> SubcastResult<()> {
    let ids = StructuralTag::ALL
        .iter()
        .map(|tag| doc.tags_mut().intern(tag.as_str()))
        .collect::<SubcastResult<Vec<TagId>>>()?;

    let mut assigned: Vec<(WordId, StructuralTag)> = Vec::new();
    let segments = doc.segment_ids().to_vec();
    let tag_line = |line: LineId, tag: StructuralTag, out: &mut Vec<(WordId, StructuralTag)>| {
        out.extend(doc.line(line).words().iter().map(|&w| (w, tag)));
    };
    for (si, &segment) in segments.iter().enumerate() {
        let lines = doc.segment(segment).lines();
        for (li, &line) in lines.iter().enumerate() {
            let words = doc.line(line).words();
            if let (Some(&first), Some(&last)) = (words.first(), words.last()) {
                assigned.push((first, StructuralTag::FirstWordInLine));
                assigned.push((last, StructuralTag::LastWordInLine));
                if li == 0 {
                    assigned.push((first, StructuralTag::FirstWordInSegment));
                }
                if li + 1 == lines.len() {
                    assigned.push((last, StructuralTag::LastWordInSegment));
                }
            }
            if li == 0 {
                tag_line(line, StructuralTag::FirstLineInSegment, &mut assigned);
                if si == 0 {
                    tag_line(line, StructuralTag::FirstLineInDocument, &mut assigned);
                }
            }
            if li + 1 == lines.len() {
                tag_line(line, StructuralTag::LastLineInSegment, &mut assigned);
                if si + 1 == segments.len() {
                    tag_line(line, StructuralTag::LastLineInDocument, &mut assigned);
                }
            }
            if si == 0 {
                tag_line(line, StructuralTag::FirstSegmentInDocument, &mut assigned);
            }
            if si + 1 == segments.len() {
                tag_line(line, StructuralTag::LastSegmentInDocument, &mut assigned);
            }
        }
    }
    let words = doc.word_ids();
    if let (Some(&first), Some(&last)) = (words.first(), words.last()) {
        assigned.push((first, StructuralTag::FirstWordInDocument));
        assigned.push((last, StructuralTag::LastWordInDocument));
    }

    for &word in &words {
        let tags = &mut doc.word_mut(word).tags;
        for &tag in &ids {
            tags.remove(tag);
        }
    }
    for (word, tag) in assigned {
        doc.word_mut(word).tags.insert(ids[tag as usize]);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/document/structure.rs"]
mod tests;
