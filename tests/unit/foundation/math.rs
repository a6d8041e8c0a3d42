use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn gain_db_conversion() {
    assert!(gain_to_db(1.0).abs() < 1e-12);
    assert!((gain_to_db(0.5) + 6.0206).abs() < 1e-3);
    assert_eq!(gain_to_db(0.0), SILENT_DB);
    assert_eq!(gain_to_db(-2.0), SILENT_DB);
    assert!((db_to_linear(gain_to_db(0.25)) - 0.25).abs() < 1e-9);
}

#[test]
fn round_px_saturates() {
    assert_eq!(round_px(2.5), 3);
    assert_eq!(round_px(-2.4), -2);
    assert_eq!(round_px(f64::NAN), 0);
    assert_eq!(round_px(1e20), i32::MAX);
}
