//! Canvas frame, title and legend placement shared by every archetype.

use crate::geom::{self, Rect};
use crate::model::{Anchor, BodyLayout, ChartLayout, LegendItemLayout, TextLayout};
use crate::text::{TextMeasurer, TextStyle};
use prochart_core::layout::{Alignment, ChartHeight, LayoutOptions};
use prochart_core::{ChartBody, ChartSpec};

const SECTION_GAP: f64 = 8.0;
const LEGEND_SWATCH_GAP: f64 = 6.0;
const LEGEND_ITEM_GAP: f64 = 16.0;
const LEGEND_ROW_GAP: f64 = 4.0;

pub(crate) struct Header {
    pub content_x: f64,
    pub content_y: f64,
    pub content_width: f64,
    /// Title plus legend, including the gap below them.
    pub height: f64,
    pub title: Option<TextLayout>,
    pub legend: Vec<LegendItemLayout>,
}

fn aligned_x(alignment: Alignment, x: f64, available: f64, used: f64) -> f64 {
    match alignment {
        Alignment::Left => x,
        Alignment::Center => x + ((available - used) / 2.0).max(0.0),
        Alignment::Right => x + (available - used).max(0.0),
    }
}

fn legend_colors(spec: &ChartSpec) -> Vec<String> {
    let from_body: Vec<String> = match &spec.body {
        ChartBody::Cartesian(c) => c.series.iter().map(|s| s.color.clone()).collect(),
        ChartBody::Pie(p) => p.slices.iter().map(|s| s.color.clone()).collect(),
        ChartBody::Radar(r) => r.polygons.iter().map(|s| s.color.clone()).collect(),
        ChartBody::Table(_) => Vec::new(),
    };
    (0..spec.legend.len())
        .map(|i| {
            from_body
                .get(i)
                .cloned()
                .unwrap_or_else(|| spec.theme.color(i).to_string())
        })
        .collect()
}

pub(crate) fn layout_header(
    spec: &ChartSpec,
    options: &LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> Header {
    let content_x = options.margin.left + options.padding.left;
    let content_y = options.margin.top + options.padding.top;
    let content_width = (options.width - options.margin.horizontal() - options.padding.horizontal()).max(0.0);
    let mut y = content_y;

    let title = (!spec.title.is_empty()).then(|| {
        let size = options.title_font.size;
        let (x, anchor) = match options.alignment {
            Alignment::Left => (content_x, Anchor::Start),
            Alignment::Center => (content_x + content_width / 2.0, Anchor::Middle),
            Alignment::Right => (content_x + content_width, Anchor::End),
        };
        let t = TextLayout {
            text: spec.title.clone(),
            x,
            y: y + size,
            anchor,
        };
        y += size * 1.2 + SECTION_GAP;
        t
    });

    let mut legend = Vec::new();
    if options.show_legend && !spec.legend.is_empty() {
        let style = TextStyle::from(&options.label_font);
        let swatch = options.label_font.size.max(6.0);
        let row_height = swatch.max(options.label_font.size * 1.2);
        let colors = legend_colors(spec);

        // Greedy row wrapping; each row is then aligned on its own.
        let mut rows: Vec<Vec<(usize, f64, f64)>> = Vec::new();
        let mut current: Vec<(usize, f64, f64)> = Vec::new();
        let mut cursor = 0.0;
        for (i, label) in spec.legend.iter().enumerate() {
            let w = swatch + LEGEND_SWATCH_GAP + measurer.measure(label, &style).width;
            if !current.is_empty() && cursor + LEGEND_ITEM_GAP + w > content_width {
                rows.push(std::mem::take(&mut current));
            }
            let start = if current.is_empty() { 0.0 } else { cursor + LEGEND_ITEM_GAP };
            current.push((i, start, w));
            cursor = start + w;
        }
        rows.push(current);

        for row in &rows {
            let used = row.last().map(|&(_, start, w)| start + w).unwrap_or(0.0);
            let x0 = aligned_x(options.alignment, content_x, content_width, used);
            for &(i, start, _) in row {
                legend.push(LegendItemLayout {
                    label: spec.legend[i].clone(),
                    color: colors[i].clone(),
                    x: x0 + start,
                    y: y + (row_height - swatch) / 2.0,
                    swatch,
                });
            }
            y += row_height + LEGEND_ROW_GAP;
        }
        y += SECTION_GAP - LEGEND_ROW_GAP;
    }

    Header {
        content_x,
        content_y,
        content_width,
        height: y - content_y,
        title,
        legend,
    }
}

impl Header {
    pub fn body_origin(&self) -> (f64, f64) {
        (self.content_x, self.content_y + self.height)
    }

    /// Body area for a fixed-height canvas, and that height.
    pub fn fixed_body_area(&self, options: &LayoutOptions) -> (Rect, f64) {
        let height = match options.height {
            ChartHeight::Px(px) => px,
            ChartHeight::Auto => prochart_core::layout::MIN_HEIGHT,
        };
        let (x, y) = self.body_origin();
        let bottom = height - options.margin.bottom - options.padding.bottom;
        (geom::rect(x, y, self.content_width, bottom - y), height)
    }

    /// Canvas height that fits a body of `body_height` exactly.
    pub fn auto_height(&self, options: &LayoutOptions, body_height: f64) -> f64 {
        let (_, y) = self.body_origin();
        y + body_height + options.padding.bottom + options.margin.bottom
    }

    pub fn finish(
        self,
        spec: &ChartSpec,
        options: LayoutOptions,
        height: f64,
        body: BodyLayout,
    ) -> ChartLayout {
        let width = options.width;
        let frame = geom::inset(
            &geom::rect(0.0, 0.0, width, height),
            &geom::offsets(&options.margin),
        );
        let content = geom::inset(&frame, &geom::offsets(&options.padding));
        ChartLayout {
            archetype: spec.archetype,
            theme: spec.theme,
            options,
            width,
            height,
            frame,
            content,
            title: self.title,
            legend: self.legend,
            body,
        }
    }
}
