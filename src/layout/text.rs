use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::text_metrics::TextMeasurer;

/// Text measurement scoped to one layout call. Widths are memoized per
/// distinct display string and the font database dies with the context.
pub(crate) struct MeasureContext<'c> {
    config: &'c LayoutConfig,
    measurer: Option<TextMeasurer>,
    widths: HashMap<String, f32>,
}

impl<'c> MeasureContext<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self {
            config,
            measurer: None,
            widths: HashMap::new(),
        }
    }

    /// Box width for a display name: measured text plus padding, floored.
    pub fn node_width(&mut self, name: &str) -> f32 {
        let text = self.text_width(name);
        (text + self.config.node_padding_x * 2.0).max(self.config.node_min_width)
    }

    pub fn text_width(&mut self, text: &str) -> f32 {
        if let Some(width) = self.widths.get(text) {
            return *width;
        }
        let font_size = self.config.font_size;
        let width = if self.config.fast_text_metrics {
            fallback_text_width(text, font_size)
        } else {
            self.measurer
                .get_or_insert_with(TextMeasurer::new)
                .measure(text, font_size, &self.config.font_family)
                .unwrap_or_else(|| fallback_text_width(text, font_size))
        };
        self.widths.insert(text.to_string(), width);
        width
    }
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Em-relative advance, calibrated against common sans-serif faces.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        '.' | ',' | ':' | ';' | '\'' | '|' | '!' | '(' | ')' | '[' | ']' => 0.32,
        'i' | 'j' | 'l' | 'I' => 0.25,
        'f' | 'r' | 't' | '1' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' => 0.88,
        '@' | '#' | '%' | '&' => 0.95,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.60,
        'a'..='z' => 0.57,
        // CJK, Hangul and other full-width scripts.
        '\u{2E80}'..='\u{9FFF}' | '\u{AC00}'..='\u{D7AF}' | '\u{FF00}'..='\u{FFEF}' => 1.0,
        _ => 0.6,
    }
}
