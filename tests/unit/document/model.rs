use super::*;

use image::RgbaImage;

fn tf(start: f64, end: f64) -> TimeFragment {
    TimeFragment::new(start, end).unwrap()
}

fn doc_with_words(words: &[(f64, f64)]) -> (Document, SegmentId, Vec<WordId>) {
    let mut doc = Document::new();
    let seg = doc.add_segment(tf(0.0, 10.0)).unwrap();
    let line = doc.add_line(seg).unwrap();
    let ids = words
        .iter()
        .enumerate()
        .map(|(i, &(s, e))| {
            doc.add_word(line, format!("w{i}"), tf(s, e), TagSet::new())
                .unwrap()
        })
        .collect();
    (doc, seg, ids)
}

#[test]
fn line_time_tracks_its_words() {
    let (doc, seg, words) = doc_with_words(&[(1.0, 2.0), (2.5, 4.0)]);
    let line = doc.segment(seg).lines()[0];
    assert_eq!(doc.line(line).time, tf(1.0, 4.0));
    assert_eq!(doc.word(words[1]).line(), line);
    assert_eq!(doc.line(line).segment(), seg);
}

#[test]
fn words_outside_segment_are_rejected() {
    let mut doc = Document::new();
    let seg = doc.add_segment(tf(0.0, 2.0)).unwrap();
    let line = doc.add_line(seg).unwrap();
    assert!(doc.add_word(line, "late", tf(1.5, 2.5), TagSet::new()).is_err());
}

#[test]
fn overlapping_words_are_rejected() {
    let (mut doc, seg, _) = doc_with_words(&[(1.0, 3.0)]);
    let line = doc.segment(seg).lines()[0];
    assert!(doc.add_word(line, "x", tf(2.0, 4.0), TagSet::new()).is_err());
}

#[test]
fn overlapping_segments_are_rejected() {
    let mut doc = Document::new();
    doc.add_segment(tf(0.0, 5.0)).unwrap();
    assert!(doc.add_segment(tf(4.0, 6.0)).is_err());
    assert!(doc.add_segment(tf(5.0, 6.0)).is_ok());
}

#[test]
fn replace_lines_regroups_words_and_recomputes_times() {
    let (mut doc, seg, w) = doc_with_words(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
    let lines = doc
        .replace_lines(seg, vec![vec![w[0], w[1]], vec![w[2]]])
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(doc.segment(seg).lines(), lines.as_slice());
    assert_eq!(doc.line(lines[0]).time, tf(0.0, 2.0));
    assert_eq!(doc.line(lines[1]).time, tf(2.0, 3.0));
    assert_eq!(doc.word(w[2]).line(), lines[1]);
    assert_eq!(doc.segment_words(seg), w);

    // Back to one line: the surplus line is detached.
    let lines = doc.replace_lines(seg, vec![w.clone()]).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(doc.line_ids(), lines);
}

#[test]
fn replace_lines_rejects_reordering() {
    let (mut doc, seg, w) = doc_with_words(&[(0.0, 1.0), (1.0, 2.0)]);
    assert!(doc.replace_lines(seg, vec![vec![w[1], w[0]]]).is_err());
    assert!(doc.replace_lines(seg, vec![vec![w[0]]]).is_err());
    assert!(doc.replace_lines(seg, vec![vec![w[0], w[1]], vec![]]).is_err());
}

#[test]
fn clips_inherit_image_size_and_window() {
    let (mut doc, seg, w) = doc_with_words(&[(2.0, 4.0)]);
    let img = RenderedImage::new(RgbaImage::new(30, 12));
    let clip = doc.add_clip(w[0], StateCombination::ALL[2], img).unwrap();
    assert_eq!(doc.clip(clip).layout.size.width, 30);
    assert_eq!(doc.clip(clip).layout.size.height, 12);
    assert_eq!(doc.clip_window(clip), tf(2.0, 4.0));
    assert_eq!(doc.clip_ids(), vec![clip]);

    doc.clear_clips(seg);
    assert!(doc.word(w[0]).clips().is_empty());
    assert!(doc.clip_ids().is_empty());
}

#[test]
fn segment_text_joins_words() {
    let (doc, seg, _) = doc_with_words(&[(0.0, 1.0), (1.0, 2.0)]);
    assert_eq!(doc.segment_text(seg), "w0 w1");
}
