use std::path::Path;

use crate::{
    compose::element::AudioElement,
    foundation::error::{SubcastError, SubcastResult},
    foundation::math::{db_to_linear, gain_to_db},
};

/// Sample rate used for the sound-effect mix.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Peak level the final mix is normalized to, in dBFS.
pub const NORMALIZE_HEADROOM_DB: f64 = -0.1;

/// Interleaved stereo `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Always 2 for decoded audio.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Stereo silence lasting `duration_sec`.
    pub fn silence(duration_sec: f64, sample_rate: u32) -> Self {
        let frames = (duration_sec.max(0.0) * f64::from(sample_rate)).round() as usize;
        Self {
            sample_rate,
            channels: 2,
            interleaved_f32: vec![0.0; frames * 2],
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Length in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.max(1))
    }

    /// Copy of `[start_sec, start_sec + duration_sec)`, padded with silence where the source
    /// runs short.
    pub fn slice(&self, start_sec: f64, duration_sec: f64) -> Self {
        let rate = f64::from(self.sample_rate);
        let channels = usize::from(self.channels.max(1));
        let first = (start_sec.max(0.0) * rate).round() as usize * channels;
        let len = (duration_sec.max(0.0) * rate).round() as usize * channels;
        let mut interleaved_f32 = vec![0.0; len];
        if first < self.interleaved_f32.len() {
            let available = &self.interleaved_f32[first..];
            let n = available.len().min(len);
            interleaved_f32[..n].copy_from_slice(&available[..n]);
        }
        Self {
            sample_rate: self.sample_rate,
            channels: self.channels,
            interleaved_f32,
        }
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.interleaved_f32
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

/// Decode the audio of `path` to stereo `f32` PCM at `sample_rate`.
///
/// A file without audio streams decodes to empty PCM.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> SubcastResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-nostdin", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| SubcastError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(SubcastError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    if out.stdout.len() % 4 != 0 {
        return Err(SubcastError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

/// Add `effect` into `base` starting at `offset_sec`, scaled by the linear `gain`.
///
/// The gain goes through its decibel form, so `gain <= 0` attenuates to -100 dB instead of
/// cancelling. A negative offset trims the head of the effect; samples past the end of `base`
/// are dropped. Both buffers must share sample rate and channel count.
pub fn overlay(
    base: &mut AudioPcm,
    effect: &AudioPcm,
    offset_sec: f64,
    gain: f32,
) -> SubcastResult<()> {
    if base.sample_rate != effect.sample_rate || base.channels != effect.channels {
        return Err(SubcastError::validation(format!(
            "cannot overlay {} Hz/{}ch audio onto {} Hz/{}ch",
            effect.sample_rate, effect.channels, base.sample_rate, base.channels
        )));
    }
    let amp = db_to_linear(gain_to_db(f64::from(gain))) as f32;
    let channels = usize::from(base.channels.max(1));
    let shift = (offset_sec * f64::from(base.sample_rate)).round() as i64;

    let (dst_start, src_start) = if shift >= 0 {
        (shift as usize * channels, 0)
    } else {
        (0, shift.unsigned_abs() as usize * channels)
    };
    if dst_start >= base.interleaved_f32.len() || src_start >= effect.interleaved_f32.len() {
        return Ok(());
    }
    for (dst, src) in base.interleaved_f32[dst_start..]
        .iter_mut()
        .zip(&effect.interleaved_f32[src_start..])
    {
        *dst += src * amp;
    }
    Ok(())
}

/// Scale `pcm` so its peak sits at `headroom_db` dBFS. Silence is left untouched.
pub fn normalize_peak(pcm: &mut AudioPcm, headroom_db: f64) {
    let peak = pcm.peak();
    if peak <= f32::EPSILON || !peak.is_finite() {
        return;
    }
    let scale = (db_to_linear(headroom_db) as f32) / peak;
    for s in &mut pcm.interleaved_f32 {
        *s *= scale;
    }
}

/// Overlay every effect onto `base` and normalize the result.
///
/// Effect start times are shifted back by `time_shift_sec` (the start of a cut). An effect that
/// fails to decode is logged and skipped.
#[tracing::instrument(skip(base, effects), fields(effects = effects.len()))]
pub fn mix_sound_effects(
    mut base: AudioPcm,
    effects: &[AudioElement],
    time_shift_sec: f64,
) -> AudioPcm {
    let mut mixed = 0usize;
    for effect in effects {
        let pcm = match decode_audio_f32_stereo(&effect.path, base.sample_rate) {
            Ok(pcm) => pcm,
            Err(e) => {
                tracing::warn!(path = %effect.path.display(), error = %e, "skipping sound effect");
                continue;
            }
        };
        match overlay(&mut base, &pcm, effect.start - time_shift_sec, effect.gain) {
            Ok(()) => mixed += 1,
            Err(e) => {
                tracing::warn!(path = %effect.path.display(), error = %e, "skipping sound effect")
            }
        }
    }
    normalize_peak(&mut base, NORMALIZE_HEADROOM_DB);
    tracing::info!(mixed, skipped = effects.len() - mixed, "mixed sound effects");
    base
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(pcm: &AudioPcm, out_path: &Path) -> SubcastResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SubcastError::media(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    let mut bytes = Vec::<u8>::with_capacity(pcm.interleaved_f32.len() * 4);
    for &sample in &pcm.interleaved_f32 {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        SubcastError::media(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/audio.rs"]
mod tests;
