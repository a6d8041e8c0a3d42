use super::*;

use crate::document::tags::TagSet;
use crate::foundation::core::TimeFragment;

fn splitter(f: impl FnOnce(&mut LayoutOptions)) -> LineSplitter {
    let mut opts = LayoutOptions::default();
    f(&mut opts);
    LineSplitter::new(opts).unwrap()
}

fn lens(ranges: &[Range<usize>]) -> Vec<usize> {
    ranges.iter().map(|r| r.len()).collect()
}

#[test]
fn greedy_wrap_breaks_before_overflow() {
    let s = splitter(|_| {});
    let lines = s.split_widths(&[300, 300, 300], 1000);
    assert_eq!(lines, vec![0..2, 2..3]);
}

#[test]
fn spacing_counts_toward_width() {
    let s = splitter(|o| o.word_spacing = 10);
    assert_eq!(s.split_widths(&[390, 400], 1000).len(), 1);
    let s = splitter(|o| o.word_spacing = 11);
    assert_eq!(s.split_widths(&[390, 400], 1000).len(), 2);
}

#[test]
fn lines_never_exceed_max_width_by_default() {
    let s = splitter(|o| o.word_spacing = 7);
    let widths = [120, 340, 80, 260, 410, 90, 95, 300, 30, 220, 180, 60];
    let max = s.options.max_line_width(1000) as usize;
    for r in s.split_widths(&widths, 1000) {
        let w: usize =
            widths[r.clone()].iter().map(|&w| w as usize).sum::<usize>() + 7 * (r.len() - 1);
        assert!(w <= max || r.len() == 1, "line {r:?} is {w}px");
    }
}

#[test]
fn oversized_word_gets_its_own_line() {
    let s = splitter(|_| {});
    assert_eq!(s.split_widths(&[900, 100], 1000), vec![0..1, 1..2]);
}

#[test]
fn last_line_absorbs_overflow_when_allowed() {
    let widths = [500, 500, 500, 500];
    let keep_wrapping = splitter(|_| {});
    assert_eq!(lens(&keep_wrapping.split_widths(&widths, 1000)), vec![1, 1, 1, 1]);

    let exceed = splitter(|o| {
        o.on_text_overflow_strategy = TextOverflowStrategy::ExceedMaxWidthRatioInLastLine;
    });
    assert_eq!(exceed.split_widths(&widths, 1000), vec![0..1, 1..4]);
}

#[test]
fn min_lines_bisects_widest_line() {
    let s = splitter(|o| {
        o.min_number_of_lines = 3;
        o.max_number_of_lines = 3;
    });
    let lines = s.split_widths(&[100, 100, 100, 100], 1000);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|r| !r.is_empty()));
    assert_eq!(lines.first().map(|r| r.start), Some(0));
    assert_eq!(lines.last().map(|r| r.end), Some(4));
    for pair in lines.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn bisection_stops_when_nothing_is_splittable() {
    let s = splitter(|o| {
        o.min_number_of_lines = 3;
        o.max_number_of_lines = 3;
    });
    assert_eq!(s.split_widths(&[100, 100], 1000), vec![0..1, 1..2]);
}

#[test]
fn invalid_options_are_rejected() {
    let mut o = LayoutOptions::default();
    o.min_number_of_lines = 3;
    assert!(LineSplitter::new(o).is_err());
    let o = LayoutOptions {
        max_width_ratio: 1.5,
        ..LayoutOptions::default()
    };
    assert!(LineSplitter::new(o).is_err());
}

#[test]
fn split_segment_regroups_document_lines() {
    let mut doc = Document::new();
    let seg = doc.add_segment(TimeFragment::new(0.0, 3.0).unwrap()).unwrap();
    let line = doc.add_line(seg).unwrap();
    for i in 0..3 {
        let t = TimeFragment::new(f64::from(i), f64::from(i + 1)).unwrap();
        let w = doc.add_word(line, format!("w{i}"), t, TagSet::new()).unwrap();
        doc.word_mut(w).max_layout.size = Size::new(300, 40 + i as u32);
    }

    let s = splitter(|_| {});
    assert!(s.split_segment(&mut doc, seg, 1000).unwrap());
    let lines = doc.segment(seg).lines().to_vec();
    assert_eq!(lines.len(), 2);
    assert_eq!(doc.line(lines[0]).max_layout.size, Size::new(600, 41));
    assert_eq!(doc.line(lines[1]).max_layout.size, Size::new(300, 42));
    assert_eq!(doc.line(lines[1]).time, TimeFragment::new(2.0, 3.0).unwrap());

    // Same widths again: grouping is stable.
    assert!(!s.split_segment(&mut doc, seg, 1000).unwrap());
}
