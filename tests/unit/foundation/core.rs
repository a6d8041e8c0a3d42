use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_parses_ffprobe_ratios() {
    assert_eq!(Fps::parse_ratio("30000/1001").unwrap(), Fps { num: 30000, den: 1001 });
    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn time_fragment_validation_and_queries() {
    assert!(TimeFragment::new(2.0, 1.0).is_err());
    assert!(TimeFragment::new(f64::NAN, 1.0).is_err());

    let t = TimeFragment::new(1.0, 3.0).unwrap();
    assert!(t.contains(1.0));
    assert!(!t.contains(3.0));
    assert!(t.covers(TimeFragment::new(1.5, 3.0).unwrap()));
    assert!(!t.covers(TimeFragment::new(0.5, 2.0).unwrap()));
    assert!(t.overlaps(TimeFragment::new(2.9, 4.0).unwrap()));
    assert!(!t.overlaps(TimeFragment::new(3.0, 4.0).unwrap()));
    assert!((t.duration() - 2.0).abs() < 1e-12);
    assert!(TimeFragment { start: 2.0, end: 2.0 }.is_empty());
}

#[test]
fn layout_center_uses_half_size() {
    let l = ElementLayout {
        position: Position::new(10, 20),
        size: Size::new(30, 11),
    };
    assert_eq!(l.center(), Position::new(25, 25));
}
