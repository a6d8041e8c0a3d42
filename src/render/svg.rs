//! Built-in word renderer: styles resolved from a [`StyleSheet`], text rasterized through
//! `usvg`/`resvg`, output cropped to the painted pixels.

use std::{path::Path, sync::Arc};

use image::{Rgba, RgbaImage};

use crate::{
    document::state::{ElementState, StateCombination},
    foundation::error::{SubcastError, SubcastResult},
    render::renderer::{RenderedImage, WordRenderer, WordRequest},
};

/// Fully resolved visual style of one word rendering.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WordStyle {
    /// CSS font family list.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill paint (any SVG color).
    pub fill: String,
    /// Optional outline paint.
    pub stroke: Option<String>,
    /// Outline width in pixels.
    pub stroke_width: f32,
    /// Transparent border kept around the painted pixels.
    pub padding: u32,
    /// Report the word as not visible.
    pub hidden: bool,
}

impl Default for WordStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_owned(),
            font_size: 48.0,
            fill: "#ffffff".to_owned(),
            stroke: Some("#000000".to_owned()),
            stroke_width: 3.0,
            padding: 2,
            hidden: false,
        }
    }
}

/// Partial style applied on top of the base style when a rule matches.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StylePatch {
    /// Override font family.
    pub font_family: Option<String>,
    /// Override font size.
    pub font_size: Option<f32>,
    /// Override fill.
    pub fill: Option<String>,
    /// Override stroke.
    pub stroke: Option<String>,
    /// Override stroke width.
    pub stroke_width: Option<f32>,
    /// Override padding.
    pub padding: Option<u32>,
    /// Override visibility.
    pub hidden: Option<bool>,
}

impl StylePatch {
    fn apply(&self, style: &mut WordStyle) {
        if let Some(v) = &self.font_family {
            style.font_family.clone_from(v);
        }
        if let Some(v) = self.font_size {
            style.font_size = v;
        }
        if let Some(v) = &self.fill {
            style.fill.clone_from(v);
        }
        if let Some(v) = &self.stroke {
            style.stroke = Some(v.clone());
        }
        if let Some(v) = self.stroke_width {
            style.stroke_width = v;
        }
        if let Some(v) = self.padding {
            style.padding = v;
        }
        if let Some(v) = self.hidden {
            style.hidden = v;
        }
    }
}

/// Conditions a rule requires. Unset fields match anything.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleSelector {
    /// Required line state.
    pub line_state: Option<ElementState>,
    /// Required word state.
    pub word_state: Option<ElementState>,
    /// Required tag name.
    pub tag: Option<String>,
}

impl StyleSelector {
    fn matches(&self, tags: &[&str], states: StateCombination) -> bool {
        self.line_state.is_none_or(|s| states.line() == s)
            && self.word_state.is_none_or(|s| states.word() == s)
            && self.tag.as_deref().is_none_or(|t| tags.contains(&t))
    }
}

/// One conditional style override.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyleRule {
    /// When the rule applies.
    #[serde(default)]
    pub when: StyleSelector,
    /// What it changes.
    pub style: StylePatch,
}

/// Base style plus ordered rules; later matching rules win.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Style every rendering starts from.
    pub base: WordStyle,
    /// Overrides applied in order.
    pub rules: Vec<StyleRule>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            base: WordStyle::default(),
            rules: vec![StyleRule {
                when: StyleSelector {
                    word_state: Some(ElementState::WordBeingNarrated),
                    ..StyleSelector::default()
                },
                style: StylePatch {
                    fill: Some("#ffd400".to_owned()),
                    ..StylePatch::default()
                },
            }],
        }
    }
}

impl StyleSheet {
    /// Resolve the style for a word carrying `tags` in `states`.
    pub fn resolve(&self, tags: &[&str], states: StateCombination) -> WordStyle {
        let mut style = self.base.clone();
        for rule in &self.rules {
            if rule.when.matches(tags, states) {
                rule.style.apply(&mut style);
            }
        }
        style
    }

    /// Reject styles that cannot be rasterized.
    pub fn validate(&self) -> SubcastResult<()> {
        let sizes = std::iter::once(Some(self.base.font_size))
            .chain(self.rules.iter().map(|r| r.style.font_size))
            .flatten();
        for size in sizes {
            if !size.is_finite() || size <= 0.0 {
                return Err(SubcastError::validation(format!(
                    "font_size must be finite and > 0, got {size}"
                )));
            }
        }
        Ok(())
    }
}

/// Rasterizes words as SVG text with system fonts.
pub struct SvgWordRenderer {
    sheet: StyleSheet,
    options: usvg::Options<'static>,
}

impl std::fmt::Debug for SvgWordRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgWordRenderer")
            .field("sheet", &self.sheet)
            .field("faces", &self.options.fontdb.len())
            .finish()
    }
}

impl SvgWordRenderer {
    /// Create a renderer using system fonts.
    pub fn new(sheet: StyleSheet) -> SubcastResult<Self> {
        sheet.validate()?;
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let options = usvg::Options {
            fontdb: Arc::new(db),
            ..Default::default()
        };
        Ok(Self { sheet, options })
    }

    /// Additionally load every `.ttf`/`.otf`/`.ttc` file found in `dir`.
    pub fn with_font_dir(mut self, dir: &Path) -> Self {
        let db = Arc::make_mut(&mut self.options.fontdb);
        let Ok(rd) = std::fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "font directory is not readable");
            return self;
        };
        for entry in rd.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
                .unwrap_or(false);
            if is_font && db.load_font_file(&path).is_err() {
                tracing::warn!(path = %path.display(), "failed to load font");
            }
        }
        self
    }

    /// The active style sheet.
    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }
}

impl WordRenderer for SvgWordRenderer {
    fn render(
        &mut self,
        word: &WordRequest<'_>,
        states: StateCombination,
    ) -> SubcastResult<Option<RenderedImage>> {
        let tags = word.tag_names();
        let style = self.sheet.resolve(&tags, states);
        if style.hidden || word.text.trim().is_empty() {
            return Ok(None);
        }

        let svg = word_svg(word.text, &style);
        let tree = usvg::Tree::from_str(&svg.markup, &self.options).map_err(|e| {
            SubcastError::render(format!("failed to build svg for '{}': {e}", word.text))
        })?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(svg.width, svg.height).ok_or_else(|| {
            SubcastError::render(format!(
                "failed to allocate {}x{} pixmap for '{}'",
                svg.width, svg.height, word.text
            ))
        })?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );

        let cropped = crop_to_content(pixmap.data(), svg.width, svg.height, style.padding);
        Ok(cropped.map(RenderedImage::new))
    }
}

struct WordSvg {
    markup: String,
    width: u32,
    height: u32,
}

/// Canvas generous enough for any glyph run of `text`; cropping trims it afterwards.
fn word_svg(text: &str, style: &WordStyle) -> WordSvg {
    let size = style.font_size;
    let stroke = style.stroke.as_ref().map_or(0.0, |_| style.stroke_width.max(0.0));
    let chars = text.chars().count().max(1) as f32;
    let margin = size * 0.5 + stroke;
    let width = (chars * size * 1.2 + 2.0 * margin).ceil().max(1.0) as u32;
    let height = (size * 1.8 + 2.0 * stroke).ceil().max(1.0) as u32;
    let baseline = size * 1.3 + stroke;

    let stroke_attrs = match &style.stroke {
        Some(paint) if stroke > 0.0 => format!(
            r#" stroke="{}" stroke-width="{stroke}" stroke-linejoin="round" paint-order="stroke""#,
            xml_escape(paint)
        ),
        _ => String::new(),
    };
    let markup = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{margin}" y="{baseline}" font-family="{}" font-size="{size}" fill="{}"{stroke_attrs} xml:space="preserve">{}</text></svg>"#,
        xml_escape(&style.font_family),
        xml_escape(&style.fill),
        xml_escape(text),
    );
    WordSvg {
        markup,
        width,
        height,
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Crop premultiplied RGBA8 to its painted bounds plus `padding`, converting to straight alpha.
///
/// Returns `None` when no pixel is painted.
fn crop_to_content(premul: &[u8], width: u32, height: u32, padding: u32) -> Option<RgbaImage> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    for y in 0..height {
        for x in 0..width {
            let a = premul[((y * width + x) * 4 + 3) as usize];
            if a != 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }
    if min_x == u32::MAX {
        return None;
    }

    let out_w = max_x - min_x + 1 + 2 * padding;
    let out_h = max_y - min_y + 1 + 2 * padding;
    let mut out = RgbaImage::new(out_w, out_h);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let i = ((y * width + x) * 4) as usize;
            let px = &premul[i..i + 4];
            out.put_pixel(
                x - min_x + padding,
                y - min_y + padding,
                Rgba(demultiply([px[0], px[1], px[2], px[3]])),
            );
        }
    }
    Some(out)
}

fn demultiply(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u16::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
