use std::path::{Path, PathBuf};

use crate::{
    foundation::core::Fps,
    foundation::error::{SubcastError, SubcastResult},
};

/// Stream facts the compositor needs about its source video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Probed file.
    pub path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate.
    pub fps: Fps,
    /// Number of video frames.
    pub total_frames: u64,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
    /// Codec of the first audio stream, as ffprobe names it (`aac`, `vorbis`, ...).
    pub audio_codec: Option<String>,
    /// Container duration in seconds (0 when unknown).
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    /// Duration implied by the frame count.
    pub fn frames_duration_sec(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be spawned.
pub fn is_ffmpeg_on_path() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Probe `path` with `ffprobe`. Fails if fps, size or frame count is not positive.
#[tracing::instrument]
pub fn probe_video(path: &Path) -> SubcastResult<VideoSourceInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-count_packets",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| SubcastError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SubcastError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let info = parse_probe_json(path, &out.stdout)?;
    tracing::info!(
        width = info.width,
        height = info.height,
        fps = %info.fps.to_ffmpeg_arg(),
        frames = info.total_frames,
        audio_codec = info.audio_codec.as_deref().unwrap_or("none"),
        "probed source video"
    );
    Ok(info)
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Interpret `ffprobe -print_format json` output.
///
/// Frame count preference: `nb_frames`, then `nb_read_packets`, then `duration * fps`.
pub fn parse_probe_json(path: &Path, json: &[u8]) -> SubcastResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| SubcastError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            SubcastError::media(format!("no video stream found in '{}'", path.display()))
        })?;

    let width = video.width.unwrap_or(0);
    let height = video.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(SubcastError::media(format!(
            "source '{}' reports invalid frame size {width}x{height}",
            path.display()
        )));
    }

    let fps = [video.r_frame_rate.as_deref(), video.avg_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| {
            SubcastError::media(format!(
                "source '{}' reports a non-positive frame rate",
                path.display()
            ))
        })?;

    let parse_u64 = |s: &Option<String>| s.as_deref().and_then(|v| v.parse::<u64>().ok());
    let parse_f64 = |s: &Option<String>| s.as_deref().and_then(|v| v.parse::<f64>().ok());
    let format_duration = parsed.format.as_ref().and_then(|f| parse_f64(&f.duration));
    let duration_sec = format_duration
        .or_else(|| parse_f64(&video.duration))
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    let total_frames = parse_u64(&video.nb_frames)
        .filter(|n| *n > 0)
        .or_else(|| parse_u64(&video.nb_read_packets).filter(|n| *n > 0))
        .unwrap_or_else(|| fps.secs_to_frames_floor(duration_sec));
    if total_frames == 0 {
        return Err(SubcastError::media(format!(
            "source '{}' reports no video frames",
            path.display()
        )));
    }

    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps,
        total_frames,
        has_audio: audio.is_some(),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        duration_sec,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/probe.rs"]
mod tests;
