//! Text measurement backed by real font metrics.
//!
//! Shape `bounds()` implementations need accurate label sizes before any
//! rendering happens. [`TextMeasurer`] wraps a `cosmic-text` font system and
//! is passed by reference into every pipeline stage; there is deliberately no
//! global instance so independent compiles stay isolated.

use std::sync::Mutex;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::geometry::Size;

/// Measures text using font shaping.
///
/// The wrapped [`FontSystem`] is expensive to construct, so one measurer
/// should be created at startup and shared (`&TextMeasurer` is `Sync`).
pub struct TextMeasurer {
    font_system: Mutex<FontSystem>,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer {
    pub fn new() -> Self {
        info!("Initializing font system for text measurement");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Calculates the rendered size of `text` in pixels.
    ///
    /// Multi-line text (embedded `\n`) measures the widest line and sums the
    /// line heights. Empty text measures zero width and one line height, so
    /// labels always reserve vertical space.
    pub fn measure(&self, text: &str, font_size: u16, font_family: &str) -> Size {
        let mut font_system = self
            .font_system
            .lock()
            .expect("font system lock poisoned");

        // Points to pixels at standard DPI.
        let font_size_px = f32::from(font_size) * 1.33;
        let line_height = font_size_px * 1.2;
        let metrics = Metrics::new(font_size_px, line_height);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(Family::Name(font_family));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if layout_runs.is_empty() {
            // No shaped runs (e.g. no fonts available): estimate from
            // character count so layout still produces usable boxes.
            max_width = text.chars().count() as f32 * (font_size_px * 0.6);
            total_height = metrics.line_height;
        } else {
            for run in &layout_runs {
                if let Some(last) = run.glyphs.last() {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        }

        Size::new(max_width, total_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_text_is_wider() {
        let measurer = TextMeasurer::new();
        let short = measurer.measure("ab", 14, "sans-serif");
        let long = measurer.measure("abcdefghijklmnop", 14, "sans-serif");
        assert!(long.width() > short.width());
    }

    #[test]
    fn empty_text_reserves_line_height() {
        let measurer = TextMeasurer::new();
        let size = measurer.measure("", 14, "sans-serif");
        assert!(size.height() > 0.0);
    }

    #[test]
    fn multiline_text_is_taller() {
        let measurer = TextMeasurer::new();
        let one = measurer.measure("line", 14, "sans-serif");
        let two = measurer.measure("line\nline", 14, "sans-serif");
        assert!(two.height() > one.height());
    }

    #[test]
    fn larger_font_measures_larger() {
        let measurer = TextMeasurer::new();
        let small = measurer.measure("label", 10, "sans-serif");
        let big = measurer.measure("label", 24, "sans-serif");
        assert!(big.height() > small.height());
    }
}
