use prochart_core::layout::FontStyle;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<u16>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 12.0,
            font_weight: None,
        }
    }
}

impl From<&FontStyle> for TextStyle {
    fn from(font: &FontStyle) -> Self {
        Self {
            font_family: Some(font.family.clone()),
            font_size: font.size,
            font_weight: Some(font.weight),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-independent measurer: every terminal column is a fixed fraction of the font size.
///
/// East Asian wide characters occupy two columns, so product names like `小米 4 Pro` measure
/// close to what a browser would lay out.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub column_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn normalized_text_lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let column_width_factor = if self.column_width_factor == 0.0 {
            0.55
        } else {
            self.column_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let bold = style.font_weight.is_some_and(|w| w >= 600);

        let lines = Self::normalized_text_lines(text);
        let font_size = style.font_size.max(1.0);
        let max_columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        let mut width = max_columns as f64 * font_size * column_width_factor;
        if bold {
            width *= 1.05;
        }
        let height = lines.len() as f64 * font_size * line_height_factor;
        TextMetrics {
            width,
            height,
            line_count: lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_take_two_columns() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let ascii = m.measure("ab", &style);
        let cjk = m.measure("价格", &style);
        assert!((ascii.width - 11.0).abs() < 1e-9);
        assert!((cjk.width - 22.0).abs() < 1e-9);
        assert_eq!(cjk.line_count, 1);
    }

    #[test]
    fn multiline_text_grows_in_height() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("Dyson\nTP07", &TextStyle::default());
        assert_eq!(metrics.line_count, 2);
        assert!((metrics.height - 28.8).abs() < 1e-9);
    }
}
