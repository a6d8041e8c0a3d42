use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::mpsc,
};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    compose::audio::{
        AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo, mix_sound_effects, write_f32le_file,
    },
    compose::chunk::{partition_frames, worker_count},
    compose::element::{AudioElement, MediaElement},
    compose::encoder::{
        ChunkEvent, ChunkJob, ChunkStats, EncoderSettings, render_chunk, seconds_arg,
    },
    compose::format::{OutputFormat, VideoQuality},
    compose::probe::{VideoSourceInfo, is_ffmpeg_on_path, probe_video},
    foundation::core::{Fps, FrameIndex, FrameRange, TimeFragment},
    foundation::error::{SubcastError, SubcastResult},
};

/// Compositor settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Parallel chunk workers; `None` uses available parallelism.
    pub workers: Option<usize>,
    /// Encoder preset.
    pub quality: VideoQuality,
    /// Resize the output to this height, keeping aspect ratio.
    pub target_height: Option<u32>,
    /// Only render `[start, end)` seconds of the source.
    pub cut: Option<TimeFragment>,
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Fail when a chunk decodes fewer frames than assigned.
    pub strict_frame_count: bool,
    /// Audio bitrate passed to the audio encoder.
    pub audio_bitrate: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            workers: None,
            quality: VideoQuality::Middle,
            target_height: None,
            cut: None,
            overwrite: true,
            strict_frame_count: false,
            audio_bitrate: "192k".to_owned(),
        }
    }
}

impl ComposeOptions {
    /// Reject settings ffmpeg would choke on.
    pub fn validate(&self) -> SubcastResult<()> {
        if self.workers == Some(0) {
            return Err(SubcastError::validation("workers must be >= 1 when set"));
        }
        if self.target_height == Some(0) {
            return Err(SubcastError::validation("target_height must be >= 1 when set"));
        }
        if self.audio_bitrate.trim().is_empty() {
            return Err(SubcastError::validation("audio_bitrate must not be empty"));
        }
        if let Some(cut) = self.cut
            && !TimeFragment::new(cut.start, cut.end).is_ok_and(|c| !c.is_empty())
        {
            return Err(SubcastError::validation(format!(
                "cut must satisfy start < end, got [{}, {})",
                cut.start, cut.end
            )));
        }
        Ok(())
    }
}

/// Summary of a finished render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStats {
    /// Final file.
    pub output: PathBuf,
    /// Probed source facts.
    pub source: VideoSourceInfo,
    /// Rendered source frames.
    pub range: FrameRange,
    /// Per-chunk results in merge order.
    pub chunks: Vec<ChunkStats>,
    /// Sum of frames written by all chunks.
    pub frames_written: u64,
    /// Whether a sound-effect mix replaced the audio track.
    pub audio_mixed: bool,
}

/// Parallel chunked compositor: overlays visual elements onto a source video and mixes sound
/// effects into its audio.
#[derive(Clone, Debug, Default)]
pub struct VideoComposer {
    options: ComposeOptions,
}

impl VideoComposer {
    /// Validate `options` and build a composer.
    pub fn new(options: ComposeOptions) -> SubcastResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Active options.
    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Render `source` with `elements` stamped on top into `output`.
    ///
    /// All intermediate files live in one temporary directory that is removed on return.
    pub fn render(
        &self,
        source: &Path,
        elements: &[Box<dyn MediaElement>],
        sound_effects: &[AudioElement],
        output: &Path,
    ) -> SubcastResult<RenderStats> {
        self.preflight(output)?;
        let info = probe_video(source)?;
        self.compose(info, elements, sound_effects, output)
    }

    /// Like [`VideoComposer::render`] for a source that was already probed.
    pub fn render_probed(
        &self,
        info: VideoSourceInfo,
        elements: &[Box<dyn MediaElement>],
        sound_effects: &[AudioElement],
        output: &Path,
    ) -> SubcastResult<RenderStats> {
        self.preflight(output)?;
        self.compose(info, elements, sound_effects, output)
    }

    fn preflight(&self, output: &Path) -> SubcastResult<()> {
        if !self.options.overwrite && output.exists() {
            return Err(SubcastError::validation(format!(
                "output '{}' already exists and overwrite is disabled",
                output.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(SubcastError::media(
                "ffmpeg and ffprobe are required for video composition; install them and make sure they are on PATH",
            ));
        }
        Ok(())
    }

    #[tracing::instrument(
        skip(self, info, elements, sound_effects),
        fields(
            source = %info.path.display(),
            elements = elements.len(),
            sound_effects = sound_effects.len()
        )
    )]
    fn compose(
        &self,
        info: VideoSourceInfo,
        elements: &[Box<dyn MediaElement>],
        sound_effects: &[AudioElement],
        output: &Path,
    ) -> SubcastResult<RenderStats> {
        let range = frame_range_for_cut(&info, self.options.cut)?;
        let workers = worker_count(self.options.workers)?;
        let ranges = partition_frames(range, workers)?;
        tracing::info!(
            frames = range.len_frames(),
            chunks = ranges.len(),
            workers,
            "partitioned frames"
        );

        let format = OutputFormat::for_path(output);
        let settings = EncoderSettings {
            format,
            quality: self.options.quality,
            target_height: self.options.target_height,
        };

        let work_dir = tempfile::Builder::new()
            .prefix("subcast-")
            .tempdir()
            .context("failed to create temporary render directory")?;

        let jobs: Vec<ChunkJob<'_>> = ranges
            .iter()
            .enumerate()
            .map(|(index, &range)| ChunkJob {
                index,
                range,
                source: &info,
                elements,
                settings: &settings,
                output: work_dir
                    .path()
                    .join(format!("part_{index:04}.{}", format.extension)),
            })
            .collect();

        let chunks = self.render_chunks(&jobs, ranges.len())?;
        let frames_written = chunks.iter().map(|c| c.frames_written).sum();

        let merged = work_dir.path().join(format!("merged.{}", format.extension));
        concat_parts(&jobs, work_dir.path(), &merged)?;
        tracing::info!(parts = jobs.len(), "merged chunk files");

        ensure_parent_dir(output)?;
        let span = TimeFragment {
            start: info.fps.frames_to_secs(range.start.0),
            end: info.fps.frames_to_secs(range.end.0),
        };
        let whole_source = range.start.0 == 0 && range.end.0 == info.total_frames;
        let final_mux = FinalMux {
            merged: &merged,
            output,
            format,
            audio_bitrate: &self.options.audio_bitrate,
            overwrite: self.options.overwrite,
        };
        let audio_mixed = if sound_effects.is_empty() {
            final_mux.with_source_audio(&info, (!whole_source).then_some(span))?;
            false
        } else {
            let merged_duration = info.fps.frames_to_secs(frames_written);
            let base = if info.has_audio {
                decode_audio_f32_stereo(&info.path, MIX_SAMPLE_RATE)?
                    .slice(span.start, merged_duration)
            } else {
                AudioPcm::silence(merged_duration, MIX_SAMPLE_RATE)
            };
            let mix = mix_sound_effects(base, sound_effects, span.start);
            let mix_path = work_dir.path().join("mix.f32le");
            write_f32le_file(&mix, &mix_path)?;
            final_mux.with_mix(&mix_path)?;
            true
        };
        tracing::info!(output = %output.display(), frames_written, audio_mixed, "render finished");

        Ok(RenderStats {
            output: output.to_path_buf(),
            source: info,
            range,
            chunks,
            frames_written,
            audio_mixed,
        })
    }

    fn render_chunks(
        &self,
        jobs: &[ChunkJob<'_>],
        threads: usize,
    ) -> SubcastResult<Vec<ChunkStats>> {
        let pool = build_thread_pool(threads)?;
        let (tx, rx) = mpsc::channel::<ChunkEvent>();

        let results = std::thread::scope(|s| {
            s.spawn(move || {
                for event in rx {
                    match event {
                        ChunkEvent::Started { index, range } => tracing::info!(
                            chunk = index,
                            start = range.start.0,
                            end = range.end.0,
                            "chunk started"
                        ),
                        ChunkEvent::Progress {
                            index,
                            frames_written,
                        } => tracing::debug!(chunk = index, frames_written, "chunk progress"),
                        ChunkEvent::Finished(stats) => tracing::info!(
                            chunk = stats.index,
                            frames_written = stats.frames_written,
                            "chunk finished"
                        ),
                    }
                }
            });
            let results = pool.install(|| {
                jobs.par_iter()
                    .map(|job| render_chunk(job, Some(&tx)))
                    .collect::<Vec<_>>()
            });
            drop(tx);
            results
        });

        let mut chunks = Vec::with_capacity(results.len());
        for item in results {
            chunks.push(item?);
        }
        for stats in chunks.iter().filter(|c| c.is_short()) {
            if self.options.strict_frame_count {
                return Err(SubcastError::media(format!(
                    "chunk {} decoded {} of {} frames",
                    stats.index,
                    stats.frames_written,
                    stats.range.len_frames()
                )));
            }
            tracing::warn!(
                chunk = stats.index,
                frames_written = stats.frames_written,
                expected = stats.range.len_frames(),
                "chunk decoded fewer frames than assigned"
            );
        }
        Ok(chunks)
    }
}

fn build_thread_pool(threads: usize) -> SubcastResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(SubcastError::validation("worker count must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("subcast-chunk-{i}"))
        .build()
        .map_err(|e| SubcastError::media(format!("failed to build rayon thread pool: {e}")))
}

/// First frame whose timestamp is `>= secs`.
fn frame_at_or_after(fps: Fps, secs: f64) -> u64 {
    let floor = fps.secs_to_frames_floor(secs);
    if fps.frames_to_secs(floor) + 1e-9 < secs {
        floor + 1
    } else {
        floor
    }
}

/// Frames of `info` covered by `cut`, or the whole file.
pub fn frame_range_for_cut(
    info: &VideoSourceInfo,
    cut: Option<TimeFragment>,
) -> SubcastResult<FrameRange> {
    let total = info.total_frames;
    let Some(cut) = cut else {
        return FrameRange::new(FrameIndex(0), FrameIndex(total));
    };
    let start = frame_at_or_after(info.fps, cut.start.max(0.0));
    let end = frame_at_or_after(info.fps, cut.end).min(total);
    if start >= end {
        return Err(SubcastError::validation(format!(
            "cut [{}, {}) selects no frames of a {total}-frame source",
            cut.start, cut.end
        )));
    }
    FrameRange::new(FrameIndex(start), FrameIndex(end))
}

fn ensure_parent_dir(path: &Path) -> SubcastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn run_ffmpeg(mut cmd: Command, what: &str) -> SubcastResult<()> {
    tracing::debug!(?cmd, "running {what}");
    let out = cmd
        .output()
        .map_err(|e| SubcastError::media(format!("failed to run ffmpeg for {what}: {e}")))?;
    if !out.status.success() {
        return Err(SubcastError::media(format!(
            "ffmpeg {what} exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// One `file '<path>'` line per part; single quotes are escaped for the concat demuxer.
pub fn concat_manifest(parts: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for part in parts {
        let escaped = part.to_string_lossy().replace('\'', r"'\''");
        manifest.push_str(&format!("file '{escaped}'\n"));
    }
    manifest
}

fn concat_parts(jobs: &[ChunkJob<'_>], dir: &Path, merged: &Path) -> SubcastResult<()> {
    let mut parts = Vec::with_capacity(jobs.len());
    for job in jobs {
        let abs = std::fs::canonicalize(&job.output).with_context(|| {
            format!("chunk {} output '{}' is missing", job.index, job.output.display())
        })?;
        parts.push(abs);
    }
    let manifest_path = dir.join("parts.txt");
    std::fs::write(&manifest_path, concat_manifest(&parts))
        .with_context(|| format!("failed to write '{}'", manifest_path.display()))?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-loglevel", "error", "-nostdin", "-f", "concat", "-safe", "0", "-i"])
        .arg(&manifest_path)
        .args(["-c", "copy"])
        .arg(merged);
    run_ffmpeg(cmd, "concat")
}

fn overwrite_flag(overwrite: bool) -> &'static str {
    if overwrite { "-y" } else { "-n" }
}

/// Last step: the merged video-only file plus an audio track.
struct FinalMux<'a> {
    merged: &'a Path,
    output: &'a Path,
    format: OutputFormat,
    audio_bitrate: &'a str,
    overwrite: bool,
}

impl FinalMux<'_> {
    fn command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args([overwrite_flag(self.overwrite), "-loglevel", "error", "-nostdin", "-i"])
            .arg(self.merged);
        cmd
    }

    fn encode_audio_args(&self) -> [&str; 4] {
        ["-c:a", self.format.audio_codec, "-b:a", self.audio_bitrate]
    }

    /// Attach the source's own audio track for `span` (the whole track when `None`). The
    /// track is stream-copied when the container accepts its codec.
    fn with_source_audio(
        &self,
        info: &VideoSourceInfo,
        span: Option<TimeFragment>,
    ) -> SubcastResult<()> {
        let mut cmd = self.command();
        if info.has_audio {
            if let Some(span) = span {
                cmd.args(["-ss", &seconds_arg(span.start), "-t", &seconds_arg(span.duration())]);
            }
            cmd.arg("-i")
                .arg(&info.path)
                .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"]);
            match info.audio_codec.as_deref() {
                Some(codec) if self.format.can_copy_audio(codec) => {
                    cmd.args(["-c:a", "copy"]);
                }
                codec => {
                    tracing::info!(
                        codec = codec.unwrap_or("unknown"),
                        container = self.format.extension,
                        "re-encoding source audio for the output container"
                    );
                    cmd.args(self.encode_audio_args());
                }
            }
        } else {
            cmd.args(["-map", "0:v:0", "-c", "copy"]);
        }
        cmd.args(self.format.container_args()).arg(self.output);
        run_ffmpeg(cmd, "final remux")
    }

    /// Attach a raw stereo `f32le` mix at [`MIX_SAMPLE_RATE`].
    fn with_mix(&self, mix: &Path) -> SubcastResult<()> {
        let mut cmd = self.command();
        cmd.args([
            "-f",
            "f32le",
            "-ar",
            &MIX_SAMPLE_RATE.to_string(),
            "-ac",
            "2",
            "-i",
        ])
        .arg(mix)
        .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"])
        .args(self.encode_audio_args())
        .arg("-shortest")
        .args(self.format.container_args())
        .arg(self.output);
        run_ffmpeg(cmd, "final mux")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
