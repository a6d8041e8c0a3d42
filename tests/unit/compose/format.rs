use super::*;

#[test]
fn codec_table_by_extension() {
    let f = |p: &str| OutputFormat::for_path(Path::new(p));
    assert_eq!(f("out.mp4"), MP4);
    assert_eq!(f("OUT.MOV").video_codec, "libx264");
    assert!(f("a.mov").faststart);
    assert!(!f("a.mkv").faststart);
    assert_eq!(f("a.mkv").audio_codec, "aac");
    assert_eq!((f("a.webm").video_codec, f("a.webm").audio_codec), ("libvpx-vp9", "libvorbis"));
    assert_eq!((f("a.avi").video_codec, f("a.avi").audio_codec), ("mpeg4", "libmp3lame"));
    assert_eq!((f("a.ogv").video_codec, f("a.ogv").audio_codec), ("libtheora", "libvorbis"));
    assert_eq!(f("a.gif"), MP4);
    assert_eq!(f("no_extension"), MP4);
}

#[test]
fn x264_args_follow_quality_preset() {
    let args = MP4.video_args(VideoQuality::High);
    assert_eq!(
        args,
        vec!["-c:v", "libx264", "-preset", "fast", "-crf", "19", "-pix_fmt", "yuv420p"]
    );
    assert_eq!(VideoQuality::default(), VideoQuality::Middle);
    assert_eq!(VideoQuality::Low.x264_preset(), "ultrafast");
    assert_eq!(VideoQuality::VeryHigh.crf(), 17);
}

#[test]
fn non_x264_rate_control() {
    let vp9 = OutputFormat::for_path(Path::new("a.webm")).video_args(VideoQuality::Middle);
    assert!(vp9.windows(2).any(|w| w == ["-b:v", "0"]));
    assert!(vp9.windows(2).any(|w| w == ["-crf", "33"]));

    let avi = OutputFormat::for_path(Path::new("a.avi")).video_args(VideoQuality::VeryHigh);
    assert!(avi.windows(2).any(|w| w == ["-q:v", "2"]));

    let ogv = OutputFormat::for_path(Path::new("a.ogv")).video_args(VideoQuality::Low);
    assert!(ogv.windows(2).any(|w| w == ["-q:v", "6"]));
}

#[test]
fn faststart_only_for_mp4_family() {
    assert_eq!(MP4.container_args(), vec!["-movflags", "+faststart"]);
    assert!(OutputFormat::for_path(Path::new("a.webm")).container_args().is_empty());
}

#[test]
fn audio_copy_follows_container_support() {
    let mp4 = OutputFormat::for_path(Path::new("a.mp4"));
    assert!(mp4.can_copy_audio("aac"));
    assert!(!mp4.can_copy_audio("vorbis"));

    let webm = OutputFormat::for_path(Path::new("a.webm"));
    assert!(webm.can_copy_audio("opus"));
    assert!(!webm.can_copy_audio("aac"));

    assert!(OutputFormat::for_path(Path::new("a.mkv")).can_copy_audio("pcm_f32le"));
}
