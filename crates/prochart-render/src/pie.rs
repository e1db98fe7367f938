use crate::geom::{self, Rect};
use crate::model::{Anchor, PieLayout, PieSliceLayout, TextLayout};
use prochart_core::compile::PieBody;
use prochart_core::layout::LayoutOptions;
use prochart_core::Theme;

pub const EMPTY_LABEL: &str = "暂无数据";

/// Slice labels sit at this share of the radius.
const LABEL_RADIUS_RATIO: f64 = 0.65;

/// "12 o'clock is zero", clockwise, with y increasing downwards.
pub fn polar_xy(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

pub fn layout_pie(body: &PieBody, area: Rect, options: &LayoutOptions, theme: Theme) -> PieLayout {
    let center = geom::point(
        area.origin.x + area.size.width / 2.0,
        area.origin.y + area.size.height / 2.0,
    );
    let radius = (area.size.width.min(area.size.height) / 2.0 - 4.0).max(0.0);
    let label_radius = radius * LABEL_RADIUS_RATIO;

    let positive: Vec<(usize, &prochart_core::compile::PieSlice)> = body
        .slices
        .iter()
        .enumerate()
        .filter(|(_, s)| s.value.is_finite() && s.value > 0.0)
        .collect();
    let total: f64 = positive.iter().map(|(_, s)| s.value).sum();
    let fill = |i: usize, color: &str| {
        if color.is_empty() {
            theme.color(i).to_string()
        } else {
            color.to_string()
        }
    };

    let mut slices = Vec::new();
    if positive.len() == 1 {
        let (i, s) = positive[0];
        let (tx, ty) = polar_xy(label_radius, std::f64::consts::PI);
        slices.push(PieSliceLayout {
            label: s.name.clone(),
            value: s.value,
            start_angle: 0.0,
            end_angle: std::f64::consts::TAU,
            is_full_circle: true,
            percent: 100,
            text_x: center.x + tx,
            text_y: center.y + ty,
            fill: fill(i, &s.color),
        });
    } else if total.is_finite() && total > 0.0 {
        let mut start = 0.0;
        for (i, s) in positive {
            let frac = s.value / total;
            let end = start + frac * std::f64::consts::TAU;
            let (tx, ty) = polar_xy(label_radius, (start + end) / 2.0);
            slices.push(PieSliceLayout {
                label: s.name.clone(),
                value: s.value,
                start_angle: start,
                end_angle: end,
                is_full_circle: false,
                percent: (100.0 * frac).round() as i64,
                text_x: center.x + tx,
                text_y: center.y + ty,
                fill: fill(i, &s.color),
            });
            start = end;
        }
    }

    let empty_label = slices.is_empty().then(|| TextLayout {
        text: EMPTY_LABEL.to_string(),
        x: center.x,
        y: center.y + options.label_font.size * 0.35,
        anchor: Anchor::Middle,
    });

    PieLayout {
        center,
        radius,
        slices,
        empty_label,
    }
}
