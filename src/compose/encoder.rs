//! Per-chunk ffmpeg subprocess pair: a decoder streaming raw RGB24 frames out of the source and
//! an encoder reading composited frames from its stdin.

use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    sync::mpsc::Sender,
    thread::JoinHandle,
};

use crate::{
    compose::element::{FrameRgb, MediaElement},
    compose::format::{OutputFormat, VideoQuality},
    compose::probe::VideoSourceInfo,
    compose::sink::{FrameSink, FrameSource},
    foundation::core::{Fps, FrameIndex, FrameRange, TimeFragment},
    foundation::error::{SubcastError, SubcastResult},
};

type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

fn spawn_stderr_drain(child: &mut Child) -> SubcastResult<StderrDrain> {
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| SubcastError::media("failed to open ffmpeg stderr (unexpected)"))?;
    Ok(std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok(bytes)
    }))
}

fn join_stderr(drain: Option<StderrDrain>) -> String {
    match drain.map(JoinHandle::join) {
        Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
        Some(Ok(Err(e))) => format!("<stderr read failed: {e}>"),
        Some(Err(_)) => "<stderr drain thread panicked>".to_owned(),
        None => String::new(),
    }
}

/// Wait for `child` and turn a non-zero exit into a media error carrying its stderr.
fn wait_checked(mut child: Child, drain: Option<StderrDrain>, what: &str) -> SubcastResult<()> {
    let status = child
        .wait()
        .map_err(|e| SubcastError::media(format!("failed to wait for {what}: {e}")))?;
    let stderr = join_stderr(drain);
    if !status.success() {
        return Err(SubcastError::media(format!(
            "{what} exited with status {status}: {stderr}"
        )));
    }
    Ok(())
}

pub(crate) fn seconds_arg(secs: f64) -> String {
    format!("{:.6}", secs.max(0.0))
}

/// Input seek target for the first frame of a chunk: half a frame before its timestamp, so
/// rounding the argument can neither keep the previous frame nor drop this one.
pub fn seek_secs(fps: Fps, frame: u64) -> f64 {
    if frame == 0 {
        return 0.0;
    }
    (frame as f64 - 0.5) * fps.frame_duration_secs()
}

/// Reads decoded source frames starting at a given frame.
pub struct FrameDecoder {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<StderrDrain>,
    width: u32,
    height: u32,
}

impl FrameDecoder {
    /// Spawn `ffmpeg` decoding `range` of `source` to RGB24 on stdout.
    pub fn spawn(source: &VideoSourceInfo, range: FrameRange) -> SubcastResult<Self> {
        let start = seek_secs(source.fps, range.start.0);
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(["-v", "error", "-nostdin", "-ss", &seconds_arg(start), "-i"])
            .arg(&source.path)
            .args([
                "-map",
                "0:v:0",
                "-frames:v",
                &range.len_frames().to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ]);
        tracing::debug!(?cmd, "spawning decoder");

        let mut child = cmd.spawn().map_err(|e| {
            SubcastError::media(format!(
                "failed to spawn ffmpeg decoder (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SubcastError::media("failed to open decoder stdout (unexpected)"))?;
        let stderr_drain = spawn_stderr_drain(&mut child)?;
        Ok(Self {
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            width: source.width,
            height: source.height,
        })
    }
}

impl FrameSource for FrameDecoder {
    fn read_frame(&mut self, frame: &mut FrameRgb) -> SubcastResult<bool> {
        let expected = FrameRgb::byte_len(self.width, self.height);
        if frame.width != self.width || frame.height != self.height || frame.data.len() != expected
        {
            return Err(SubcastError::validation(format!(
                "decoder frame buffer must be {}x{} rgb24",
                self.width, self.height
            )));
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(false);
        };

        let mut filled = 0;
        while filled < expected {
            match stdout.read(&mut frame.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SubcastError::media(format!(
                        "failed to read decoded frame: {e}"
                    )));
                }
            }
        }
        match filled {
            0 => {
                self.stdout = None;
                Ok(false)
            }
            n if n == expected => Ok(true),
            n => Err(SubcastError::media(format!(
                "decoder produced a truncated frame ({n} of {expected} bytes)"
            ))),
        }
    }

    /// Wait for the decoder to exit successfully.
    fn finish(&mut self) -> SubcastResult<()> {
        drop(self.stdout.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| SubcastError::media("decoder already finished"))?;
        wait_checked(child, self.stderr_drain.take(), "ffmpeg decoder")
    }
}

impl Drop for FrameDecoder {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Everything a chunk encoder needs besides frames.
#[derive(Clone, Debug)]
pub struct EncoderSettings {
    /// Codec selection.
    pub format: OutputFormat,
    /// Rate control preset.
    pub quality: VideoQuality,
    /// Resize to this height, preserving aspect ratio.
    pub target_height: Option<u32>,
}

/// Encodes raw RGB24 frames from its stdin into a video-only partial file.
pub struct ChunkEncoder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,
    width: u32,
    height: u32,
}

impl ChunkEncoder {
    /// Spawn `ffmpeg` encoding frames of `source`'s size and rate into `output`.
    pub fn spawn(
        source: &VideoSourceInfo,
        settings: &EncoderSettings,
        output: &Path,
    ) -> SubcastResult<Self> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", source.width, source.height),
                "-r",
                &source.fps.to_ffmpeg_arg(),
                "-i",
                "pipe:0",
                "-map",
                "0:v:0",
            ]);
        if let Some(h) = settings.target_height {
            cmd.args(["-vf", &format!("scale=-2:{h}")]);
        }
        cmd.args(settings.format.video_args(settings.quality))
            .arg("-an")
            .args(settings.format.container_args())
            .arg(output);
        tracing::debug!(?cmd, "spawning chunk encoder");

        let mut child = cmd.spawn().map_err(|e| {
            SubcastError::media(format!(
                "failed to spawn ffmpeg encoder (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SubcastError::media("failed to open encoder stdin (unexpected)"))?;
        let stderr_drain = spawn_stderr_drain(&mut child)?;
        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            width: source.width,
            height: source.height,
        })
    }
}

impl FrameSink for ChunkEncoder {
    /// Write one frame; blocks while the encoder is busy.
    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRgb) -> SubcastResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(SubcastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SubcastError::media("chunk encoder is already finalized"));
        };
        if let Err(e) = stdin.write_all(&frame.data) {
            drop(self.stdin.take());
            let stderr = match self.child.take() {
                Some(mut child) => {
                    let _ = child.wait();
                    join_stderr(self.stderr_drain.take())
                }
                None => String::new(),
            };
            return Err(SubcastError::media(format!(
                "failed to write frame to ffmpeg encoder: {e}: {stderr}"
            )));
        }
        Ok(())
    }

    /// Close stdin and wait for the encoder to exit successfully.
    fn finish(&mut self) -> SubcastResult<()> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| SubcastError::media("chunk encoder already finished"))?;
        wait_checked(child, self.stderr_drain.take(), "ffmpeg chunk encoder")
    }
}

impl Drop for ChunkEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Result of rendering one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkStats {
    /// Chunk position in the partition.
    pub index: usize,
    /// Assigned frames.
    pub range: FrameRange,
    /// Frames actually decoded, composited and encoded.
    pub frames_written: u64,
}

impl ChunkStats {
    /// Whether the decoder ran out before the assigned range was covered.
    pub fn is_short(&self) -> bool {
        self.frames_written < self.range.len_frames()
    }
}

/// Progress messages sent from workers to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A worker began its chunk.
    Started {
        /// Chunk index.
        index: usize,
        /// Assigned frames.
        range: FrameRange,
    },
    /// Periodic frame counter.
    Progress {
        /// Chunk index.
        index: usize,
        /// Frames written so far.
        frames_written: u64,
    },
    /// A worker finished its chunk.
    Finished(ChunkStats),
}

/// One unit of work for a compositor worker.
pub struct ChunkJob<'a> {
    /// Chunk index (also orders the merge).
    pub index: usize,
    /// Frames to render.
    pub range: FrameRange,
    /// Probed source.
    pub source: &'a VideoSourceInfo,
    /// Overlays in compositing order.
    pub elements: &'a [Box<dyn MediaElement>],
    /// Encoder settings.
    pub settings: &'a EncoderSettings,
    /// Partial output file.
    pub output: PathBuf,
}

const PROGRESS_EVERY: u64 = 100;

/// Decode, composite and encode one chunk through ffmpeg.
pub fn render_chunk(
    job: &ChunkJob<'_>,
    events: Option<&Sender<ChunkEvent>>,
) -> SubcastResult<ChunkStats> {
    let mut decoder = FrameDecoder::spawn(job.source, job.range)?;
    let mut encoder = ChunkEncoder::spawn(job.source, job.settings, &job.output)?;
    composite_chunk(job, &mut decoder, &mut encoder, events)
}

/// Composite the frames of one chunk from `frames` into `sink`.
///
/// Frame `f` is shown at `f / fps` seconds in source time. Overlays are applied in slice order,
/// so later elements land on top. Sink failures are fatal; a source that runs out early is
/// reported through [`ChunkStats::frames_written`].
pub fn composite_chunk(
    job: &ChunkJob<'_>,
    frames: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    events: Option<&Sender<ChunkEvent>>,
) -> SubcastResult<ChunkStats> {
    let send = |ev: ChunkEvent| {
        if let Some(tx) = events {
            let _ = tx.send(ev);
        }
    };
    send(ChunkEvent::Started {
        index: job.index,
        range: job.range,
    });

    let fps = job.source.fps;
    let chunk_time = TimeFragment {
        start: fps.frames_to_secs(job.range.start.0),
        end: fps.frames_to_secs(job.range.end.0),
    };
    let active: Vec<&dyn MediaElement> = job
        .elements
        .iter()
        .map(Box::as_ref)
        .filter(|e| e.time().overlaps(chunk_time))
        .collect();

    let mut frame = FrameRgb::new(job.source.width, job.source.height);
    let mut written = 0u64;
    for f in job.range.start.0..job.range.end.0 {
        if !frames.read_frame(&mut frame)? {
            break;
        }
        let t = fps.frames_to_secs(f);
        for element in &active {
            let time = element.time();
            if time.contains(t) {
                element.render(&mut frame, t - time.start)?;
            }
        }
        sink.push_frame(FrameIndex(f), &frame)?;
        written += 1;
        if written % PROGRESS_EVERY == 0 {
            send(ChunkEvent::Progress {
                index: job.index,
                frames_written: written,
            });
        }
    }

    frames.finish()?;
    sink.finish()?;

    let stats = ChunkStats {
        index: job.index,
        range: job.range,
        frames_written: written,
    };
    send(ChunkEvent::Finished(stats.clone()));
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/encoder.rs"]
mod tests;
