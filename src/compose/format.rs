use std::path::Path;

/// Encoder speed/quality trade-off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    /// ultrafast, crf 23.
    Low,
    /// veryfast, crf 21.
    #[default]
    Middle,
    /// fast, crf 19.
    High,
    /// slow, crf 17.
    VeryHigh,
}

impl VideoQuality {
    /// x264 preset name.
    pub fn x264_preset(self) -> &'static str {
        match self {
            Self::Low => "ultrafast",
            Self::Middle => "veryfast",
            Self::High => "fast",
            Self::VeryHigh => "slow",
        }
    }

    /// x264 constant rate factor.
    pub fn crf(self) -> u32 {
        match self {
            Self::Low => 23,
            Self::Middle => 21,
            Self::High => 19,
            Self::VeryHigh => 17,
        }
    }

    /// `-q:v` scale for encoders without crf (mpeg4, theora); lower is better for mpeg4.
    fn qscale(self, codec: &str) -> u32 {
        let step = match self {
            Self::Low => 0,
            Self::Middle => 1,
            Self::High => 2,
            Self::VeryHigh => 3,
        };
        if codec == "libtheora" {
            // Theora: 0..10, higher is better.
            6 + step
        } else {
            8 - 2 * step
        }
    }
}

/// Container-specific codec pair selected from the output extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    /// File extension without dot, used for partial files too.
    pub extension: &'static str,
    /// ffmpeg video encoder.
    pub video_codec: &'static str,
    /// ffmpeg audio encoder.
    pub audio_codec: &'static str,
    /// Move the moov atom to the front.
    pub faststart: bool,
}

const MP4: OutputFormat = OutputFormat {
    extension: "mp4",
    video_codec: "libx264",
    audio_codec: "aac",
    faststart: true,
};

impl OutputFormat {
    /// Codec table lookup; unknown extensions fall back to mp4.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" => MP4,
            "mov" => OutputFormat {
                extension: "mov",
                ..MP4
            },
            "mkv" => OutputFormat {
                extension: "mkv",
                faststart: false,
                ..MP4
            },
            "webm" => OutputFormat {
                extension: "webm",
                video_codec: "libvpx-vp9",
                audio_codec: "libvorbis",
                faststart: false,
            },
            "avi" => OutputFormat {
                extension: "avi",
                video_codec: "mpeg4",
                audio_codec: "libmp3lame",
                faststart: false,
            },
            "ogv" => OutputFormat {
                extension: "ogv",
                video_codec: "libtheora",
                audio_codec: "libvorbis",
                faststart: false,
            },
            _ => MP4,
        }
    }

    /// Video encoder arguments, including rate control for `quality`.
    pub fn video_args(&self, quality: VideoQuality) -> Vec<String> {
        let mut args = vec!["-c:v".to_owned(), self.video_codec.to_owned()];
        match self.video_codec {
            "libx264" => args.extend([
                "-preset".to_owned(),
                quality.x264_preset().to_owned(),
                "-crf".to_owned(),
                quality.crf().to_string(),
            ]),
            "libvpx-vp9" => args.extend([
                "-b:v".to_owned(),
                "0".to_owned(),
                "-crf".to_owned(),
                (quality.crf() + 12).to_string(),
            ]),
            codec => args.extend(["-q:v".to_owned(), quality.qscale(codec).to_string()]),
        }
        args.extend(["-pix_fmt".to_owned(), "yuv420p".to_owned()]);
        args
    }

    /// Whether an audio stream of `codec` (ffprobe codec name) can be stream-copied into this
    /// container.
    pub fn can_copy_audio(&self, codec: &str) -> bool {
        let accepted: &[&str] = match self.extension {
            "mkv" => return true,
            "mp4" | "mov" => &["aac", "mp3", "alac", "ac3", "eac3", "opus"],
            "webm" => &["vorbis", "opus"],
            "avi" => &["mp3", "aac", "ac3", "pcm_s16le"],
            "ogv" => &["vorbis", "opus", "flac"],
            _ => &[],
        };
        accepted.contains(&codec)
    }

    /// Container flags appended before the output path.
    pub fn container_args(&self) -> Vec<String> {
        if self.faststart {
            vec!["-movflags".to_owned(), "+faststart".to_owned()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/format.rs"]
mod tests;
