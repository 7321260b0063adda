//! Rendering options and configuration.

use super::CleanupOptions;

/// Options for HTML serialization.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Emit `id` attributes on outline headings
    pub anchors: bool,

    /// Deepest heading level that receives an anchor
    pub anchor_max_level: u8,
}

impl HtmlOptions {
    /// Create new HTML options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable heading anchors.
    pub fn with_anchors(mut self, anchors: bool) -> Self {
        self.anchors = anchors;
        self
    }

    /// Set the deepest anchored heading level.
    pub fn with_anchor_max_level(mut self, level: u8) -> Self {
        self.anchor_max_level = level.clamp(1, 6);
        self
    }
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            anchors: false,
            anchor_max_level: 3,
        }
    }
}

/// Options for plain-text rendering.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,
}

impl TextOptions {
    /// Create new text options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CleanupPreset;

    #[test]
    fn test_html_options_builder() {
        let options = HtmlOptions::new().with_anchors(true).with_anchor_max_level(9);
        assert!(options.anchors);
        assert_eq!(options.anchor_max_level, 6);
    }

    #[test]
    fn test_text_options_preset() {
        let options = TextOptions::new().with_cleanup_preset(CleanupPreset::Minimal);
        let cleanup = options.cleanup.unwrap();
        assert!(cleanup.normalize_unicode);
        assert!(!cleanup.normalize_whitespace);
    }
}
