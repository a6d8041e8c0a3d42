use super::*;

use crate::document::state::ElementState;
use crate::document::tags::TagSet;
use crate::foundation::core::{Size, TimeFragment};
use crate::render::fixed::FixedSizeRenderer;

fn doc(segment: (f64, f64), words: &[(f64, f64)]) -> Document {
    let mut doc = Document::new();
    let seg = doc
        .add_segment(TimeFragment::new(segment.0, segment.1).unwrap())
        .unwrap();
    let line = doc.add_line(seg).unwrap();
    for (i, &(s, e)) in words.iter().enumerate() {
        doc.add_word(
            line,
            format!("word{i}"),
            TimeFragment::new(s, e).unwrap(),
            TagSet::new(),
        )
        .unwrap();
    }
    doc
}

fn assume_base_sizes(doc: &mut Document, char_width: u32, height: u32) {
    for w in doc.word_ids() {
        let chars = doc.word(w).text.chars().count() as u32;
        doc.word_mut(w).max_layout.size = Size::new(chars * char_width, height);
    }
}

#[test]
fn boundary_windows_are_skipped() {
    let mut d = doc((0.0, 10.0), &[(0.0, 3.0), (3.0, 6.0), (6.0, 10.0)]);
    let mut renderer = FixedSizeRenderer::new(10, 20);
    let n = ClipGenerator::new().generate(&mut d, &mut renderer).unwrap();
    assert_eq!(n, 7);
    assert_eq!(d.clip_ids().len(), 7);

    let first = d.word_ids()[0];
    let first_states: Vec<_> = d
        .word(first)
        .clips()
        .iter()
        .map(|&c| d.clip(c).states())
        .collect();
    assert!(!first_states.iter().any(|s| {
        s.line() == ElementState::LineBeingNarrated && s.word() == ElementState::WordNotNarratedYet
    }));
}

#[test]
fn clip_windows_tile_the_segment_per_word() {
    let mut d = doc((0.0, 12.0), &[(1.0, 3.0), (3.0, 6.0), (6.0, 10.0)]);
    let mut renderer = FixedSizeRenderer::new(10, 20);
    let n = ClipGenerator::new().generate(&mut d, &mut renderer).unwrap();
    assert_eq!(n, 13);

    for w in d.word_ids() {
        let total: f64 = d
            .word(w)
            .clips()
            .iter()
            .map(|&c| d.clip_window(c).duration())
            .sum();
        assert!((total - 12.0).abs() < 1e-9);
    }
}

#[test]
fn invisible_renderings_produce_no_clip() {
    let mut d = doc((0.0, 10.0), &[(0.0, 3.0), (3.0, 6.0), (6.0, 10.0)]);
    let being = StateCombination::ALL[2];
    let mut renderer = FixedSizeRenderer::new(10, 20).with_hidden(being);
    let mut generator = ClipGenerator::new();
    let n = generator.generate(&mut d, &mut renderer).unwrap();
    assert_eq!(n, 4);
    assert_eq!(generator.hidden(), 3);
    assert!(d.clip_ids().iter().all(|&c| d.clip(c).states() != being));
}

#[test]
fn renderer_failure_is_fatal() {
    let mut d = doc((0.0, 10.0), &[(0.0, 3.0), (3.0, 6.0)]);
    let mut renderer = FixedSizeRenderer::new(10, 20).with_failure("word1");
    let err = ClipGenerator::new()
        .generate(&mut d, &mut renderer)
        .unwrap_err();
    assert!(err.to_string().starts_with("render error:"), "{err}");
}

#[test]
fn reposition_flag_tracks_size_changes() {
    let mut d = doc((0.0, 10.0), &[(0.0, 3.0), (3.0, 6.0)]);
    assume_base_sizes(&mut d, 10, 20);
    let mut generator = ClipGenerator::new();
    generator
        .generate(&mut d, &mut FixedSizeRenderer::new(10, 20))
        .unwrap();
    assert!(!generator.reposition_needed());

    let mut d = doc((0.0, 10.0), &[(0.0, 3.0), (3.0, 6.0)]);
    assume_base_sizes(&mut d, 10, 20);
    let mut renderer = FixedSizeRenderer::new(10, 20).with_scale(StateCombination::ALL[2], 150);
    let mut generator = ClipGenerator::new();
    generator.generate(&mut d, &mut renderer).unwrap();
    assert!(generator.reposition_needed());
    generator.reset_reposition();
    assert!(!generator.reposition_needed());
}

#[test]
fn clip_layout_carries_measured_size() {
    let mut d = doc((0.0, 10.0), &[(0.0, 10.0)]);
    let mut renderer = FixedSizeRenderer::new(7, 11);
    ClipGenerator::new().generate(&mut d, &mut renderer).unwrap();
    let clip = d.clip_ids()[0];
    assert_eq!(d.clip(clip).layout.size, Size::new(35, 11));
}
