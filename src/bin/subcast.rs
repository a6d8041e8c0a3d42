use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use subcast::{
    CaptionPipeline, Document, FixedSizeRenderer, LayoutSnapshot, PipelineConfig, SvgWordRenderer,
    TimeFragment, Transcript, VideoQuality, document::transcript::transcript_root,
};

#[derive(Parser, Debug)]
#[command(name = "subcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite captions onto a video (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Lay out captions for a frame size and print the placement as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Transcript JSON with per-word timing.
    #[arg(long)]
    transcript: PathBuf,

    /// Source video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video; the extension selects the codecs.
    #[arg(long)]
    out: PathBuf,

    /// Pipeline config JSON (layout, compose, styles).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with extra font files.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Override the number of parallel chunk workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Override the encoder quality preset.
    #[arg(long, value_enum)]
    quality: Option<QualityArg>,

    /// Resize output to this height.
    #[arg(long)]
    height: Option<u32>,

    /// Render only from this second of the source.
    #[arg(long, requires = "cut_end")]
    cut_start: Option<f64>,

    /// Render only up to this second of the source.
    #[arg(long, requires = "cut_start")]
    cut_end: Option<f64>,

    /// Fail if any chunk decodes fewer frames than assigned.
    #[arg(long, default_value_t = false)]
    strict_frame_count: bool,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Transcript JSON with per-word timing.
    #[arg(long)]
    transcript: PathBuf,

    /// Frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    height: u32,

    /// Pipeline config JSON (segmenter, layout and styles are used).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with extra font files.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Use fixed-size blocks (pixels per character) instead of rasterizing text.
    #[arg(long)]
    block_char_width: Option<u32>,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityArg {
    Low,
    Middle,
    High,
    VeryHigh,
}

impl From<QualityArg> for VideoQuality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Low => VideoQuality::Low,
            QualityArg::Middle => VideoQuality::Middle,
            QualityArg::High => VideoQuality::High,
            QualityArg::VeryHigh => VideoQuality::VeryHigh,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => {
            PipelineConfig::from_path(p).with_context(|| format!("load config '{}'", p.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn load_document(path: &PathBuf, config: &PipelineConfig) -> anyhow::Result<Document> {
    let mut transcript = Transcript::from_path(path)
        .with_context(|| format!("load transcript '{}'", path.display()))?;
    transcript.resolve_paths(&transcript_root(path));
    if let Some(segmenter) = &config.segmenter {
        transcript = segmenter.apply(&transcript)?;
    }
    Document::from_transcript(&transcript)
        .with_context(|| format!("build document from '{}'", path.display()))
}

fn svg_renderer(
    config: &PipelineConfig,
    font_dir: Option<&PathBuf>,
) -> anyhow::Result<SvgWordRenderer> {
    let renderer = SvgWordRenderer::new(config.styles.clone())?;
    Ok(match font_dir {
        Some(dir) => renderer.with_font_dir(dir),
        None => renderer,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let mut doc = load_document(&args.transcript, &config)?;

    let mut compose = config.compose.clone();
    if args.workers.is_some() {
        compose.workers = args.workers;
    }
    if let Some(q) = args.quality {
        compose.quality = q.into();
    }
    if args.height.is_some() {
        compose.target_height = args.height;
    }
    if let (Some(start), Some(end)) = (args.cut_start, args.cut_end) {
        compose.cut = Some(TimeFragment::new(start, end)?);
    }
    compose.strict_frame_count |= args.strict_frame_count;

    let renderer = svg_renderer(&config, args.font_dir.as_ref())?;
    let mut pipeline = CaptionPipeline::new(config.layout.clone(), renderer)?;
    let stats = pipeline
        .render(&mut doc, &args.in_path, &args.out, compose)
        .with_context(|| format!("render '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} chunks)",
        stats.output.display(),
        stats.frames_written,
        stats.chunks.len()
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let mut doc = load_document(&args.transcript, &config)?;

    match args.block_char_width {
        Some(cw) => {
            let renderer = FixedSizeRenderer::new(cw, cw.saturating_mul(2).max(1));
            CaptionPipeline::new(config.layout.clone(), renderer)?.prepare(
                &mut doc,
                args.width,
                args.height,
            )?;
        }
        None => {
            let renderer = svg_renderer(&config, args.font_dir.as_ref())?;
            CaptionPipeline::new(config.layout.clone(), renderer)?.prepare(
                &mut doc,
                args.width,
                args.height,
            )?;
        }
    }

    let json = serde_json::to_string_pretty(&LayoutSnapshot::capture(&doc))?;
    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
