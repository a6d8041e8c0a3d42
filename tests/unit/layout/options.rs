use super::*;

#[test]
fn defaults_match_documented_values() {
    let o = LayoutOptions::default();
    assert_eq!(o.word_spacing, 0);
    assert_eq!(o.max_width_ratio, 0.8);
    assert_eq!((o.min_number_of_lines, o.max_number_of_lines), (1, 2));
    assert_eq!(o.on_text_overflow_strategy, TextOverflowStrategy::ExceedMaxNumberOfLines);
    assert_eq!(o.vertical_align, VerticalAlignment::bottom());
    assert!(o.validate().is_ok());
    assert_eq!(o.max_line_width(1000), 800);
}

#[test]
fn alignment_formulas() {
    let top = VerticalAlignment {
        align: VerticalAlignmentType::Top,
        offset: 0.1,
    };
    assert_eq!(top.block_y(1000, 100), 100);
    assert_eq!(VerticalAlignment::center().block_y(1000, 100), 450);
    let bottom = VerticalAlignment {
        align: VerticalAlignmentType::Bottom,
        offset: 0.0,
    };
    assert_eq!(bottom.block_y(1000, 100), 900);
    assert_eq!(VerticalAlignment::bottom().block_y(1000, 100), 850);
}

#[test]
fn alignment_is_clamped_to_frame_top() {
    let up = VerticalAlignment {
        align: VerticalAlignmentType::Top,
        offset: -0.5,
    };
    assert_eq!(up.block_y(1000, 100), 0);
    assert_eq!(VerticalAlignment::bottom().block_y(100, 400), 0);
}

#[test]
fn validation_rejects_out_of_range_values() {
    let bad = [
        LayoutOptions {
            max_width_ratio: 0.0,
            ..LayoutOptions::default()
        },
        LayoutOptions {
            min_number_of_lines: 0,
            ..LayoutOptions::default()
        },
        LayoutOptions {
            vertical_align: VerticalAlignment {
                align: VerticalAlignmentType::Center,
                offset: 1.5,
            },
            ..LayoutOptions::default()
        },
    ];
    for o in bad {
        assert!(o.validate().is_err(), "{o:?}");
    }
}

#[test]
fn partial_json_uses_defaults() {
    let o: LayoutOptions = serde_json::from_str(
        r#"{"max_number_of_lines": 3, "vertical_align": {"align": "top"},
            "on_text_overflow_strategy": "exceed_max_width_ratio_in_last_line"}"#,
    )
    .unwrap();
    assert_eq!(o.max_number_of_lines, 3);
    assert_eq!(o.vertical_align, VerticalAlignment::top());
    assert_eq!(
        o.on_text_overflow_strategy,
        TextOverflowStrategy::ExceedMaxWidthRatioInLastLine
    );
    assert_eq!(o.max_width_ratio, 0.8);
}
