//! Page geometry and pagination options.

use serde::{Deserialize, Serialize};

/// Physical page geometry in CSS pixels (96 dpi).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width
    pub width: f32,

    /// Page height
    pub height: f32,

    /// Padding on every side of the page
    pub padding: f32,

    /// Height reserved for the page header
    pub header_height: f32,

    /// Height reserved for the page footer
    pub footer_height: f32,
}

impl PageSize {
    /// A4 portrait at 96 dpi.
    pub const A4: PageSize = PageSize {
        width: 794.0,
        height: 1122.0,
        padding: 32.0,
        header_height: 36.0,
        footer_height: 36.0,
    };

    /// US Letter portrait at 96 dpi.
    pub const LETTER: PageSize = PageSize {
        width: 816.0,
        height: 1056.0,
        padding: 32.0,
        header_height: 36.0,
        footer_height: 36.0,
    };

    /// Create a page size without padding, header or footer.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            padding: 0.0,
            header_height: 0.0,
            footer_height: 0.0,
        }
    }

    /// Set the padding.
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Set header and footer heights.
    pub fn with_chrome(mut self, header_height: f32, footer_height: f32) -> Self {
        self.header_height = header_height.max(0.0);
        self.footer_height = footer_height.max(0.0);
        self
    }

    /// Height available for content.
    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.padding - self.header_height - self.footer_height).max(0.0)
    }

    /// Width available for content.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.padding).max(0.0)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Options for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginateOptions {
    /// Page geometry
    pub page_size: PageSize,

    /// Content capacity override; defaults to the page's content height
    pub capacity: Option<f32>,

    /// Measure blocks in parallel
    pub parallel: bool,
}

impl PaginateOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page geometry.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the content capacity of a page.
    pub fn with_capacity(mut self, capacity: f32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Enable or disable parallel measurement.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Effective content capacity of one page.
    pub fn capacity(&self) -> f32 {
        self.capacity
            .unwrap_or_else(|| self.page_size.content_height())
    }
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            capacity: None,
            parallel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_capacity() {
        let size = PageSize::A4;
        assert_eq!(size.content_height(), 986.0);
        assert_eq!(size.content_width(), 730.0);
    }

    #[test]
    fn test_capacity_override() {
        let options = PaginateOptions::new();
        assert_eq!(options.capacity(), 986.0);

        let options = options.with_capacity(1050.0).with_parallel(true);
        assert_eq!(options.capacity(), 1050.0);
        assert!(options.parallel);
    }

    #[test]
    fn test_custom_page_size() {
        let size = PageSize::new(500.0, 700.0).with_padding(50.0).with_chrome(20.0, 30.0);
        assert_eq!(size.content_height(), 550.0);
        assert_eq!(size.content_width(), 400.0);
    }
}
