//! End-to-end flow: transcript document -> layout -> clips -> compositor.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    clips::generator::ClipGenerator,
    compose::composer::{ComposeOptions, RenderStats, VideoComposer},
    compose::element::{ImageElement, MediaElement},
    compose::probe::probe_video,
    document::model::{Document, SegmentId},
    document::segmenter::Segmenter,
    document::structure::assign_structural_tags,
    document::state::StateCombination,
    foundation::core::{ElementLayout, TimeFragment},
    foundation::error::SubcastResult,
    layout::options::LayoutOptions,
    layout::positions::PositionsCalculator,
    layout::sizes::WordSizeCalculator,
    layout::splitter::LineSplitter,
    layout::updater::LayoutUpdater,
    render::cache::CachingRenderer,
    render::renderer::WordRenderer,
    render::svg::StyleSheet,
};

/// Everything the CLI reads from one JSON config file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wrapping and placement.
    pub layout: LayoutOptions,
    /// Compositor settings.
    pub compose: ComposeOptions,
    /// Word styles for the SVG renderer.
    pub styles: StyleSheet,
    /// Optional transcript re-segmentation.
    pub segmenter: Option<Segmenter>,
}

impl PipelineConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> SubcastResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        let config: PipelineConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> SubcastResult<()> {
        self.layout.validate()?;
        self.compose.validate()?;
        if let Some(segmenter) = &self.segmenter {
            segmenter.validate()?;
        }
        self.styles.validate()
    }
}

/// Counters from [`CaptionPipeline::prepare`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// Clips in the document after layout.
    pub clips: usize,
    /// Windows the renderer reported as not visible.
    pub hidden: usize,
    /// Segments wrapped again after measuring clips.
    pub rewrapped: Vec<SegmentId>,
    /// Renderer cache hits.
    pub cache_hits: u64,
    /// Renderer cache misses (actual renders).
    pub cache_misses: u64,
}

/// Drives the layout stages over a document with one renderer.
///
/// Renders are memoized for the pipeline's lifetime, so size estimation and clip generation
/// rasterize each (word, tags, state) only once.
#[derive(Debug)]
pub struct CaptionPipeline<R> {
    options: LayoutOptions,
    renderer: CachingRenderer<R>,
}

impl<R: WordRenderer> CaptionPipeline<R> {
    /// Validate `options` and wrap `renderer` in a cache.
    pub fn new(options: LayoutOptions, renderer: R) -> SubcastResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            renderer: CachingRenderer::new(renderer),
        })
    }

    /// The memoizing renderer.
    pub fn renderer(&self) -> &CachingRenderer<R> {
        &self.renderer
    }

    /// Estimate sizes, wrap lines, tag words by position, generate clips, refresh layout when
    /// measured sizes differ, then compute pixel positions for a `video_width` x
    /// `video_height` frame.
    #[tracing::instrument(skip(self, doc))]
    pub fn prepare(
        &mut self,
        doc: &mut Document,
        video_width: u32,
        video_height: u32,
    ) -> SubcastResult<PrepareReport> {
        assign_structural_tags(doc)?;
        WordSizeCalculator::new().calculate(doc, &mut self.renderer)?;
        LineSplitter::new(self.options.clone())?.split(doc, video_width)?;
        assign_structural_tags(doc)?;

        let mut generator = ClipGenerator::new();
        generator.generate(doc, &mut self.renderer)?;
        let rewrapped = if generator.reposition_needed() {
            LayoutUpdater::new(self.options.clone())?
                .update(doc, &mut generator, &mut self.renderer, video_width)?
                .rewrapped
        } else {
            Vec::new()
        };

        PositionsCalculator::new(self.options.clone()).calculate(doc, video_width, video_height);

        let report = PrepareReport {
            clips: doc.clip_ids().len(),
            hidden: generator.hidden(),
            rewrapped,
            cache_hits: self.renderer.hits(),
            cache_misses: self.renderer.misses(),
        };
        tracing::info!(
            clips = report.clips,
            hidden = report.hidden,
            rewrapped = report.rewrapped.len(),
            cache_hits = report.cache_hits,
            cache_misses = report.cache_misses,
            "captions prepared"
        );
        Ok(report)
    }

    /// Lay out `doc` for `source` and composite it into `output`.
    pub fn render(
        &mut self,
        doc: &mut Document,
        source: &Path,
        output: &Path,
        compose: ComposeOptions,
    ) -> SubcastResult<RenderStats> {
        let composer = VideoComposer::new(compose)?;
        let info = probe_video(source)?;
        self.prepare(doc, info.width, info.height)?;
        let elements = overlay_elements(doc);
        composer.render_probed(info, &elements, doc.sound_effects(), output)
    }
}

/// Flatten every clip into an image overlay shown during its narration window.
///
/// Order follows the document (segment, line, word, clip), which is also compositing order.
pub fn overlay_elements(doc: &Document) -> Vec<Box<dyn MediaElement>> {
    let mut out: Vec<Box<dyn MediaElement>> = Vec::new();
    for &segment in doc.segment_ids() {
        for &line in doc.segment(segment).lines() {
            for &word in doc.line(line).words() {
                for &clip in doc.word(word).clips() {
                    let c = doc.clip(clip);
                    out.push(Box::new(ImageElement::new(
                        c.image().clone(),
                        c.layout.position,
                        doc.clip_window(clip),
                    )));
                }
            }
        }
    }
    out
}

/// Serializable view of a laid out document.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayoutSnapshot {
    /// Segments in order.
    pub segments: Vec<SegmentSnapshot>,
}

/// Laid out segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SegmentSnapshot {
    /// Narration interval.
    pub time: TimeFragment,
    /// Bounding box of all lines.
    pub layout: ElementLayout,
    /// Wrapped lines.
    pub lines: Vec<LineSnapshot>,
}

/// Laid out line.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LineSnapshot {
    /// Narration interval.
    pub time: TimeFragment,
    /// Line box.
    pub layout: ElementLayout,
    /// Words in the line.
    pub words: Vec<WordSnapshot>,
}

/// Laid out word.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct WordSnapshot {
    /// Display text.
    pub text: String,
    /// Narration interval.
    pub time: TimeFragment,
    /// Baseline slot.
    pub layout: ElementLayout,
    /// State-specific renderings.
    pub clips: Vec<ClipSnapshot>,
}

/// Placed clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipSnapshot {
    /// State pair.
    pub states: StateCombination,
    /// Visibility window.
    pub window: TimeFragment,
    /// Pixel placement.
    pub layout: ElementLayout,
}

impl LayoutSnapshot {
    /// Capture the current layout of `doc`.
    pub fn capture(doc: &Document) -> Self {
        let segments = doc
            .segment_ids()
            .iter()
            .map(|&s| {
                let seg = doc.segment(s);
                SegmentSnapshot {
                    time: seg.time,
                    layout: seg.max_layout,
                    lines: seg
                        .lines()
                        .iter()
                        .map(|&l| {
                            let line = doc.line(l);
                            LineSnapshot {
                                time: line.time,
                                layout: line.max_layout,
                                words: line
                                    .words()
                                    .iter()
                                    .map(|&w| {
                                        let word = doc.word(w);
                                        WordSnapshot {
                                            text: word.text.clone(),
                                            time: word.time,
                                            layout: word.max_layout,
                                            clips: word
                                                .clips()
                                                .iter()
                                                .map(|&c| ClipSnapshot {
                                                    states: doc.clip(c).states(),
                                                    window: doc.clip_window(c),
                                                    layout: doc.clip(c).layout,
                                                })
                                                .collect(),
                                        }
                                    })
                                    .collect(),
                            }
                        })
                        .collect(),
                }
            })
            .collect();
        Self { segments }
    }
}
