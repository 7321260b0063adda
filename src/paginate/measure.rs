//! Block height measurement.
//!
//! Measuring a block means rendering it at page width and reading its
//! height. The engine only depends on [`HeightMeasurer`]; a real renderer,
//! a fixture table in tests, or the headless [`TextMetricsMeasurer`] can
//! stand behind it.

use crate::error::{Error, Result};
use crate::parser::tokenizer::{self, TokenKind};

use super::segment::split_blocks;
use super::PageSize;

/// Capability that measures the rendered height of one block.
pub trait HeightMeasurer: Send + Sync {
    /// Rendered height of `block` in pixels.
    ///
    /// Fails with [`Error::MeasurementUnavailable`] when the block cannot be
    /// measured.
    fn measure(&self, block: &str) -> Result<f32>;
}

impl<F> HeightMeasurer for F
where
    F: Fn(&str) -> Option<f32> + Send + Sync,
{
    fn measure(&self, block: &str) -> Result<f32> {
        self(block).ok_or_else(|| {
            Error::MeasurementUnavailable(format!("no height for block of {} bytes", block.len()))
        })
    }
}

/// Measure a block and reject heights that cannot take part in layout.
pub(crate) fn measure_checked(measurer: &dyn HeightMeasurer, block: &str) -> Result<f32> {
    let height = measurer.measure(block)?;
    if !height.is_finite() || height < 0.0 {
        return Err(Error::MeasurementUnavailable(format!(
            "invalid height {}",
            height
        )));
    }
    Ok(height)
}

/// Typographic metrics for one kind of block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    /// Font size in pixels
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    /// Vertical margin added once per block
    pub margin: f32,
    /// Average glyph width as a multiple of the font size
    pub glyph_width: f32,
}

impl BlockMetrics {
    const fn new(font_size: f32, line_height: f32, margin: f32, glyph_width: f32) -> Self {
        Self {
            font_size,
            line_height,
            margin,
            glyph_width,
        }
    }

    fn line_px(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// Headless height estimator based on character counts.
///
/// Text is wrapped at the number of average glyphs that fit the content
/// width; each kind of block has its own font metrics. Containers are
/// measured as the sum of their children.
#[derive(Debug, Clone)]
pub struct TextMetricsMeasurer {
    content_width: f32,
    body: BlockMetrics,
    headings: [BlockMetrics; 6],
    code: BlockMetrics,
    rule_height: f32,
    container_margin: f32,
}

impl TextMetricsMeasurer {
    /// Create a measurer for a content area `content_width` pixels wide.
    pub fn new(content_width: f32) -> Self {
        Self {
            content_width: content_width.max(1.0),
            body: BlockMetrics::new(16.0, 1.5, 16.0, 0.5),
            headings: [
                BlockMetrics::new(32.0, 1.2, 21.0, 0.55),
                BlockMetrics::new(24.0, 1.25, 20.0, 0.55),
                BlockMetrics::new(18.7, 1.3, 18.0, 0.55),
                BlockMetrics::new(16.0, 1.4, 21.0, 0.55),
                BlockMetrics::new(13.3, 1.4, 22.0, 0.55),
                BlockMetrics::new(10.7, 1.4, 25.0, 0.55),
            ],
            code: BlockMetrics::new(14.0, 1.4, 16.0, 0.6),
            rule_height: 18.0,
            container_margin: 16.0,
        }
    }

    /// Create a measurer for the content area of a page.
    pub fn for_page(page_size: &PageSize) -> Self {
        Self::new(page_size.content_width())
    }

    /// Override the body text metrics.
    pub fn with_body_metrics(mut self, metrics: BlockMetrics) -> Self {
        self.body = metrics;
        self
    }

    /// Height of `text` wrapped with `metrics`, without margins.
    fn text_height(&self, text: &str, metrics: &BlockMetrics) -> f32 {
        let per_line = (self.content_width / (metrics.font_size * metrics.glyph_width))
            .floor()
            .max(1.0) as usize;
        let lines: usize = text
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum();
        lines as f32 * metrics.line_px()
    }

    fn estimate(&self, block: &str) -> f32 {
        let tag = first_tag(block);
        match tag.as_deref() {
            Some(name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let metrics = self.headings[level.clamp(1, 6) - 1];
                self.text_height(&visible_text(block), &metrics) + metrics.margin
            }
            Some("pre") => {
                self.text_height(&visible_text(block), &self.code) + self.code.margin
            }
            Some("hr") => self.rule_height,
            Some("ul" | "ol" | "blockquote" | "li" | "div" | "section") => {
                let inner = inner_html(block);
                let children = split_blocks(inner);
                let has_blocks = children.iter().any(|c| first_tag(c).is_some_and(|t| is_block_tag(&t)));
                if has_blocks {
                    let sum: f32 = children.iter().map(|c| self.estimate(c)).sum();
                    sum + self.container_margin
                } else {
                    self.text_height(&visible_text(inner), &self.body) + self.body.margin
                }
            }
            _ => {
                let text = visible_text(block);
                if text.trim().is_empty() && tag.is_none() {
                    return 0.0;
                }
                self.text_height(&text, &self.body) + self.body.margin
            }
        }
    }
}

impl Default for TextMetricsMeasurer {
    fn default() -> Self {
        Self::for_page(&PageSize::A4)
    }
}

impl HeightMeasurer for TextMetricsMeasurer {
    fn measure(&self, block: &str) -> Result<f32> {
        Ok(self.estimate(block))
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "pre"
            | "hr"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "div"
            | "section"
    )
}

/// Name of the first opening tag of a block.
fn first_tag(block: &str) -> Option<String> {
    tokenizer::tokenize(block)
        .into_iter()
        .find_map(|token| match token.kind {
            TokenKind::Open { name, .. } => Some(name),
            _ => None,
        })
}

/// Content between the first opening tag and the last closing tag.
fn inner_html(block: &str) -> &str {
    let tokens = tokenizer::tokenize(block);
    let open = tokens
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Open { .. }));
    let close = tokens
        .iter()
        .rev()
        .find(|t| matches!(t.kind, TokenKind::Close { .. }));
    match (open, close) {
        (Some(open), Some(close)) if open.end <= close.start => &block[open.end..close.start],
        (Some(open), _) => &block[open.end..],
        _ => block,
    }
}

/// Text a reader would see, with `<br>` as line breaks.
fn visible_text(block: &str) -> String {
    let mut text = String::new();
    for token in tokenizer::tokenize(block) {
        match &token.kind {
            TokenKind::Text => text.push_str(&tokenizer::decode_entities(token.source(block))),
            TokenKind::Open { name, .. } if name == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}
