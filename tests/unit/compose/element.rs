use super::*;
use image::{Rgba, RgbaImage};

fn solid(w: u32, h: u32, px: [u8; 4]) -> RenderedImage {
    RenderedImage::new(RgbaImage::from_pixel(w, h, Rgba(px)))
}

fn always() -> TimeFragment {
    TimeFragment::new(0.0, 10.0).unwrap()
}

#[test]
fn frame_buffer_length_is_checked() {
    assert!(FrameRgb::from_bytes(2, 2, vec![0; 12]).is_ok());
    assert!(FrameRgb::from_bytes(2, 2, vec![0; 11]).is_err());
    assert_eq!(FrameRgb::new(4, 3).data.len(), 36);
}

#[test]
fn opaque_pixels_replace_frame() {
    let mut frame = FrameRgb::new(4, 4);
    let el = ImageElement::new(solid(2, 2, [10, 20, 30, 255]), Position::new(1, 1), always());
    el.render(&mut frame, 0.0).unwrap();
    assert_eq!(frame.pixel(1, 1), [10, 20, 30]);
    assert_eq!(frame.pixel(2, 2), [10, 20, 30]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
    assert_eq!(frame.pixel(3, 3), [0, 0, 0]);
}

#[test]
fn translucent_pixels_blend_straight_alpha() {
    let mut frame = FrameRgb::from_bytes(1, 1, vec![100, 100, 100]).unwrap();
    let el = ImageElement::new(solid(1, 1, [200, 0, 100, 128]), Position::new(0, 0), always());
    el.render(&mut frame, 0.0).unwrap();
    // 200*128/255 + 100*127/255 = 100 + 50
    assert_eq!(frame.pixel(0, 0), [150, 50, 100]);
}

#[test]
fn image_is_clipped_to_frame_edges() {
    let mut frame = FrameRgb::new(3, 3);
    let el = ImageElement::new(solid(4, 4, [255, 255, 255, 255]), Position::new(-2, 1), always());
    el.render(&mut frame, 0.0).unwrap();
    assert_eq!(frame.pixel(0, 1), [255, 255, 255]);
    assert_eq!(frame.pixel(1, 2), [255, 255, 255]);
    assert_eq!(frame.pixel(2, 1), [0, 0, 0]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0]);

    let mut untouched = FrameRgb::new(3, 3);
    ImageElement::new(solid(2, 2, [255; 4]), Position::new(5, 5), always())
        .render(&mut untouched, 0.0)
        .unwrap();
    assert!(untouched.data.iter().all(|b| *b == 0));
}

#[test]
fn opacity_scales_alpha() {
    let mut frame = FrameRgb::new(1, 1);
    ImageElement::new(solid(1, 1, [255, 255, 255, 255]), Position::new(0, 0), always())
        .with_opacity(0.0)
        .render(&mut frame, 0.0)
        .unwrap();
    assert_eq!(frame.pixel(0, 0), [0, 0, 0]);

    ImageElement::new(solid(1, 1, [255, 255, 255, 255]), Position::new(0, 0), always())
        .with_opacity(2.0)
        .render(&mut frame, 0.0)
        .unwrap();
    assert_eq!(frame.pixel(0, 0), [255, 255, 255]);
}

#[test]
fn audio_element_gain_defaults_to_unity() {
    let el: AudioElement = serde_json::from_str(r#"{"path":"ding.wav","start":2.5}"#).unwrap();
    assert_eq!(el, AudioElement::new("ding.wav", 2.5));
    assert_eq!(el.with_gain(0.5).gain, 0.5);
}
