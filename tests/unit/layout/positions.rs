use super::*;

use crate::clips::generator::ClipGenerator;
use crate::document::state::StateCombination;
use crate::document::tags::TagSet;
use crate::foundation::core::TimeFragment;
use crate::layout::sizes::WordSizeCalculator;
use crate::layout::splitter::LineSplitter;
use crate::render::fixed::FixedSizeRenderer;

const W: u32 = 1000;
const H: u32 = 500;

fn laid_out(mut renderer: FixedSizeRenderer) -> Document {
    let mut doc = Document::new();
    let seg = doc.add_segment(TimeFragment::new(0.0, 12.0).unwrap()).unwrap();
    let line = doc.add_line(seg).unwrap();
    for (text, s, e) in [("aaa", 1.0, 3.0), ("bbbb", 3.0, 6.0), ("ccccc", 6.0, 10.0)] {
        doc.add_word(line, text, TimeFragment::new(s, e).unwrap(), TagSet::new())
            .unwrap();
    }
    let opts = LayoutOptions::default();
    WordSizeCalculator::new()
        .calculate(&mut doc, &mut renderer)
        .unwrap();
    LineSplitter::new(opts.clone())
        .unwrap()
        .split(&mut doc, W)
        .unwrap();
    ClipGenerator::new().generate(&mut doc, &mut renderer).unwrap();
    PositionsCalculator::new(opts).calculate(&mut doc, W, H);
    doc
}

fn clip_x(doc: &Document, word: usize, states: StateCombination) -> i32 {
    let w = doc.word_ids()[word];
    let clip = doc
        .word(w)
        .clips()
        .iter()
        .copied()
        .find(|&c| doc.clip(c).states() == states)
        .unwrap();
    doc.clip(clip).layout.position.x
}

#[test]
fn uniform_sizes_center_the_block() {
    let doc = laid_out(FixedSizeRenderer::new(10, 20));
    // Line is 30 + 40 + 50 = 120px wide.
    let first = doc.word_ids()[0];
    assert_eq!(doc.word(first).clips().len(), 4);
    for &clip in doc.word(first).clips() {
        assert_eq!(doc.clip(clip).layout.position.x, 440);
    }
    assert_eq!(clip_x(&doc, 1, StateCombination::ALL[2]), 470);
    assert_eq!(clip_x(&doc, 2, StateCombination::ALL[0]), 510);

    // Bottom aligned with a 5% margin: 500 * 0.95 - 20.
    for clip in doc.clip_ids() {
        assert_eq!(doc.clip(clip).layout.position.y, 455);
    }
    let seg = doc.segment_ids()[0];
    assert_eq!(doc.segment(seg).max_layout.position, Position::new(440, 455));
    assert_eq!(doc.segment(seg).max_layout.size, Size::new(120, 20));
}

#[test]
fn wider_active_word_shifts_only_its_line_state_group() {
    let being = StateCombination::ALL[2];
    let doc = laid_out(FixedSizeRenderer::new(10, 20).with_scale(being, 200));

    // Line-not-narrated group still uses the plain widths.
    assert_eq!(clip_x(&doc, 1, StateCombination::ALL[0]), 470);
    // Line-being group uses doubled slots: 60 + 80 + 100 = 240px block starting at 380.
    assert_eq!(clip_x(&doc, 1, being), 440);
    assert_eq!(clip_x(&doc, 1, StateCombination::ALL[1]), 460);
    assert_eq!(clip_x(&doc, 1, StateCombination::ALL[3]), 460);

    // Baseline word placement is not touched by per-state placement.
    let w1 = doc.word_ids()[1];
    assert_eq!(doc.word(w1).max_layout.position.x, 440);
    assert_eq!(doc.word(w1).max_layout.size.width, 80);
}

#[test]
fn clips_are_vertically_centered_in_the_line() {
    let mut doc = Document::new();
    let seg = doc.add_segment(TimeFragment::new(0.0, 2.0).unwrap()).unwrap();
    let line = doc.add_line(seg).unwrap();
    let w = doc
        .add_word(line, "x", TimeFragment::new(0.0, 2.0).unwrap(), TagSet::new())
        .unwrap();
    let img = crate::render::renderer::RenderedImage::new(image::RgbaImage::new(10, 10));
    doc.add_clip(w, StateCombination::ALL[2], img).unwrap();
    doc.word_mut(w).max_layout.size = Size::new(10, 30);
    doc.line_mut(line).max_layout.size = Size::new(10, 30);

    let opts = LayoutOptions {
        vertical_align: crate::layout::options::VerticalAlignment::top(),
        ..LayoutOptions::default()
    };
    PositionsCalculator::new(opts).calculate(&mut doc, 100, 100);
    let clip = doc.word(w).clips()[0];
    assert_eq!(doc.clip(clip).layout.position, Position::new(45, 10));
}
