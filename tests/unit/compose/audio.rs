use super::*;

fn tone(frames: usize, amplitude: f32) -> AudioPcm {
    AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: vec![amplitude; frames * 2],
    }
}

fn window_peak(pcm: &AudioPcm, from_sec: f64, to_sec: f64) -> f32 {
    let a = (from_sec * f64::from(pcm.sample_rate)) as usize * 2;
    let b = (to_sec * f64::from(pcm.sample_rate)) as usize * 2;
    pcm.interleaved_f32[a..b]
        .iter()
        .fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn silence_has_requested_length() {
    let s = AudioPcm::silence(1.5, MIX_SAMPLE_RATE);
    assert_eq!(s.frames(), 72_000);
    assert!((s.duration_sec() - 1.5).abs() < 1e-9);
    assert_eq!(s.peak(), 0.0);
}

#[test]
fn overlapping_effects_both_contribute() {
    let effect = tone(MIX_SAMPLE_RATE as usize / 2, 0.2);

    let mut solo = AudioPcm::silence(4.0, MIX_SAMPLE_RATE);
    overlay(&mut solo, &effect, 2.0, 1.0).unwrap();

    let mut both = AudioPcm::silence(4.0, MIX_SAMPLE_RATE);
    overlay(&mut both, &effect, 2.0, 1.0).unwrap();
    overlay(&mut both, &effect, 2.0, 0.5).unwrap();

    assert_eq!(window_peak(&both, 0.0, 2.0), 0.0);
    let solo_peak = window_peak(&solo, 2.0, 2.5);
    let mixed_peak = window_peak(&both, 2.0, 2.5);
    assert!((solo_peak - 0.2).abs() < 1e-6);
    assert!(mixed_peak > solo_peak);
    assert!((mixed_peak - 0.3).abs() < 1e-4);
    assert_eq!(window_peak(&both, 2.6, 4.0), 0.0);
}

#[test]
fn non_positive_gain_is_near_silent() {
    let mut base = AudioPcm::silence(1.0, MIX_SAMPLE_RATE);
    overlay(&mut base, &tone(100, 1.0), 0.0, 0.0).unwrap();
    assert!(base.peak() > 0.0);
    assert!(base.peak() < 1e-4);
}

#[test]
fn negative_offset_trims_head_and_tail_is_dropped() {
    let mut base = AudioPcm::silence(1.0, MIX_SAMPLE_RATE);
    let mut effect = tone(MIX_SAMPLE_RATE as usize, 0.0);
    // Mark the second half of the effect.
    let half = effect.interleaved_f32.len() / 2;
    effect.interleaved_f32[half..].fill(0.5);
    overlay(&mut base, &effect, -0.5, 1.0).unwrap();
    assert!((window_peak(&base, 0.0, 0.49) - 0.5).abs() < 1e-6);
    assert_eq!(window_peak(&base, 0.51, 1.0), 0.0);

    let mut short = AudioPcm::silence(0.1, MIX_SAMPLE_RATE);
    overlay(&mut short, &tone(48_000, 0.3), 0.05, 1.0).unwrap();
    assert_eq!(short.frames(), 4_800);
}

#[test]
fn mismatched_formats_are_rejected() {
    let mut base = AudioPcm::silence(1.0, MIX_SAMPLE_RATE);
    let other = AudioPcm {
        sample_rate: 44_100,
        channels: 2,
        interleaved_f32: vec![0.1; 10],
    };
    assert!(overlay(&mut base, &other, 0.0, 1.0).is_err());
}

#[test]
fn normalization_targets_headroom() {
    let mut pcm = tone(10, 0.25);
    pcm.interleaved_f32[3] = -0.5;
    normalize_peak(&mut pcm, NORMALIZE_HEADROOM_DB);
    let target = db_to_linear(NORMALIZE_HEADROOM_DB) as f32;
    assert!((pcm.peak() - target).abs() < 1e-6);
    assert!((pcm.interleaved_f32[0] - target / 2.0).abs() < 1e-6);

    let mut quiet = AudioPcm::silence(0.01, MIX_SAMPLE_RATE);
    normalize_peak(&mut quiet, NORMALIZE_HEADROOM_DB);
    assert_eq!(quiet.peak(), 0.0);
}

#[test]
fn missing_effect_is_skipped() {
    let base = tone(100, 0.5);
    let effects = [AudioElement::new("/nonexistent/subcast/ding.wav", 0.0)];
    let mixed = mix_sound_effects(base, &effects, 0.0);
    let target = db_to_linear(NORMALIZE_HEADROOM_DB) as f32;
    assert!((mixed.peak() - target).abs() < 1e-6);
}

#[test]
fn f32le_file_is_little_endian() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mix.f32le");
    let pcm = AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: vec![1.0, -0.5],
    };
    write_f32le_file(&pcm, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..], &(-0.5f32).to_le_bytes());
}

#[test]
fn slice_cuts_and_pads_with_silence() {
    let mut pcm = AudioPcm::silence(2.0, MIX_SAMPLE_RATE);
    let half = pcm.interleaved_f32.len() / 2;
    pcm.interleaved_f32[half..].fill(0.5);

    let middle = pcm.slice(0.5, 1.0);
    assert_eq!(middle.frames(), 48_000);
    assert_eq!(window_peak(&middle, 0.0, 0.49), 0.0);
    assert_eq!(window_peak(&middle, 0.51, 1.0), 0.5);

    let tail = pcm.slice(1.5, 1.0);
    assert_eq!(tail.frames(), 48_000);
    assert_eq!(window_peak(&tail, 0.0, 0.5), 0.5);
    assert_eq!(window_peak(&tail, 0.5, 1.0), 0.0);
}
