//! Page export.
//!
//! Exporters receive an ordered sequence of rendered page surfaces and
//! encode them into a portable file. They must keep page order and never
//! drop pages, so [`export_pages`] checks the sequence before handing it
//! over.
//!
//! # Example
//!
//! ```
//! use folio::export::{export_pages, HtmlBookExporter, PageSurface};
//! use folio::paginate::PageSize;
//! use folio::Page;
//!
//! let pages = vec![Page::new(1, 0, "<p>One</p>"), Page::new(2, 1, "<p>Two</p>")];
//! let surfaces = PageSurface::from_pages(&pages, &PageSize::A4, "Lease");
//!
//! let mut out = Vec::new();
//! let written = export_pages(&mut HtmlBookExporter::new(), &surfaces, &mut out).unwrap();
//! assert_eq!(written, 2);
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Page;
use crate::paginate::PageSize;
use crate::render::escape_html;

/// A rendered page ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSurface {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in pixels
    pub width: f32,

    /// Page height in pixels
    pub height: f32,

    /// Header text
    pub header: String,

    /// Footer text
    pub footer: String,

    /// Page body as HTML
    pub body: String,
}

impl PageSurface {
    /// Build a surface for one page.
    pub fn new(page: &Page, size: &PageSize, title: &str) -> Self {
        Self {
            number: page.number,
            width: size.width,
            height: size.height,
            header: title.to_string(),
            footer: format!("Page {}", page.number),
            body: page.content.clone(),
        }
    }

    /// Build surfaces for all pages with the same geometry and title.
    pub fn from_pages(pages: &[Page], size: &PageSize, title: &str) -> Vec<Self> {
        pages.iter().map(|p| Self::new(p, size, title)).collect()
    }
}

/// Collaborator that encodes page surfaces into a file.
pub trait PageExporter {
    /// Name of the exporter.
    fn name(&self) -> &str;

    /// File extension of the output, without the dot.
    fn extension(&self) -> &str;

    /// Called once before the first page with the whole sequence.
    fn begin(&mut self, _surfaces: &[PageSurface], _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    /// Encode one page.
    fn write_page(&mut self, surface: &PageSurface, out: &mut dyn Write) -> Result<()>;

    /// Called once after the last page.
    fn finish(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

/// Check that surfaces are numbered `1..=n` in order.
pub fn validate_order(surfaces: &[PageSurface]) -> Result<()> {
    for (i, surface) in surfaces.iter().enumerate() {
        let expected = i as u32 + 1;
        if surface.number != expected {
            return Err(Error::Render(format!(
                "page {} found where page {} was expected",
                surface.number, expected
            )));
        }
    }
    Ok(())
}

/// Export surfaces in order; returns the number of pages written.
pub fn export_pages<E>(exporter: &mut E, surfaces: &[PageSurface], out: &mut dyn Write) -> Result<usize>
where
    E: PageExporter + ?Sized,
{
    export_pages_with_progress(exporter, surfaces, out, |_| {})
}

/// Export surfaces in order, calling `progress` after every page.
pub fn export_pages_with_progress<E, F>(
    exporter: &mut E,
    surfaces: &[PageSurface],
    out: &mut dyn Write,
    mut progress: F,
) -> Result<usize>
where
    E: PageExporter + ?Sized,
    F: FnMut(&PageSurface),
{
    validate_order(surfaces)?;

    exporter.begin(surfaces, out)?;
    for surface in surfaces {
        exporter.write_page(surface, out)?;
        progress(surface);
    }
    exporter.finish(out)?;
    out.flush()?;

    log::debug!(
        "Exported {} pages with {}",
        surfaces.len(),
        exporter.name()
    );
    Ok(surfaces.len())
}

const BOOK_STYLE: &str = "body{margin:0;background:#e5e7eb}\
.page{box-sizing:border-box;margin:16px auto;background:#fff;display:flex;flex-direction:column;overflow:hidden}\
.page-header,.page-footer{flex:none;text-align:center;font-size:14px;color:#4b5563}\
.page-body{flex:1}\
.page-break{display:none}";

/// Exporter writing one standalone HTML file with fixed-size pages.
#[derive(Debug, Clone)]
pub struct HtmlBookExporter {
    stylesheet: String,
    title: Option<String>,
}

impl HtmlBookExporter {
    /// Create an exporter with the default stylesheet.
    pub fn new() -> Self {
        Self {
            stylesheet: BOOK_STYLE.to_string(),
            title: None,
        }
    }

    /// Append extra CSS to the stylesheet.
    pub fn with_extra_css(mut self, css: &str) -> Self {
        self.stylesheet.push_str(css);
        self
    }

    /// Set the document title; defaults to the first page header.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Default for HtmlBookExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExporter for HtmlBookExporter {
    fn name(&self) -> &str {
        "html-book"
    }

    fn extension(&self) -> &str {
        "html"
    }

    fn begin(&mut self, surfaces: &[PageSurface], out: &mut dyn Write) -> Result<()> {
        let title = self
            .title
            .as_deref()
            .or_else(|| surfaces.first().map(|s| s.header.as_str()))
            .unwrap_or("Document");
        write!(
            out,
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
            escape_html(title),
            self.stylesheet
        )?;
        Ok(())
    }

    fn write_page(&mut self, surface: &PageSurface, out: &mut dyn Write) -> Result<()> {
        write!(
            out,
            "<section class=\"page\" data-page=\"{n}\" style=\"width:{w}px;height:{h}px\">\
             <header class=\"page-header\">{header}</header>\
             <div class=\"page-body\">{body}</div>\
             <footer class=\"page-footer\">{footer}</footer></section>",
            n = surface.number,
            w = surface.width,
            h = surface.height,
            header = escape_html(&surface.header),
            body = surface.body,
            footer = escape_html(&surface.footer),
        )?;
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<()> {
        out.write_all(b"</body></html>")?;
        Ok(())
    }
}
