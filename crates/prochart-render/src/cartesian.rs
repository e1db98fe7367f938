use crate::geom::{self, Rect};
use crate::model::{AxisTickLayout, BarLayout, CartesianLayout, CategoryLabelLayout, LineSeriesLayout};
use crate::text::{TextMeasurer, TextStyle};
use prochart_core::compile::{CartesianBody, SeriesKind};
use prochart_core::layout::LayoutOptions;
use prochart_core::product::fmt_number;

const TICK_COUNT: usize = 5;
const AXIS_GAP: f64 = 8.0;
/// Share of a category band taken by its bar group.
const BAR_GROUP_RATIO: f64 = 0.7;

/// A "nice" step (1, 2 or 5 × 10ⁿ) close to `range / count`.
fn nice_step(range: f64, count: usize) -> f64 {
    let raw = range / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Ticks covering `[min, max]`, extended outwards to whole steps.
///
/// Spans too large for whole steps (near `f64::MAX`) fall back to `count` even divisions of the
/// raw domain, so the result always has at most `count * 4 + 1` entries.
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let count = count.max(1);
    let (lo, mut hi) = if min <= max { (min, max) } else { (max, min) };
    if !lo.is_finite() || !hi.is_finite() {
        return vec![0.0, 1.0];
    }
    if hi - lo < f64::EPSILON {
        hi = lo + 1.0;
    }
    let step = nice_step(hi - lo, count);
    let nice_lo = (lo / step).floor() * step;
    let nice_hi = (hi / step).ceil() * step;
    let steps = (nice_hi - nice_lo) / step;
    if nice_lo.is_finite() && nice_hi.is_finite() && steps.is_finite() && steps <= (count * 4) as f64 {
        let n = steps.round() as usize;
        return (0..=n).map(|i| nice_lo + i as f64 * step).collect();
    }

    (0..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect()
}

pub fn layout_cartesian(
    body: &CartesianBody,
    area: Rect,
    options: &LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> CartesianLayout {
    let label_style = TextStyle::from(&options.label_font);
    let font = options.label_font.size;

    let values = body
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite());
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let ticks = nice_ticks(min, max, TICK_COUNT);
    let domain_lo = ticks.first().copied().unwrap_or(0.0);
    let domain_hi = ticks.last().copied().unwrap_or(1.0);

    let tick_labels: Vec<String> = ticks.iter().map(|t| fmt_number(*t)).collect();
    let axis_width = tick_labels
        .iter()
        .map(|l| measurer.measure(l, &label_style).width)
        .fold(0.0, f64::max)
        + AXIS_GAP;

    let rotation = body.label_rotation;
    let widest_category = body
        .categories
        .iter()
        .map(|c| measurer.measure(c, &label_style).width)
        .fold(0.0, f64::max);
    let line_height = font * 1.2;
    let label_height = if rotation > 0.0 {
        let r = rotation.to_radians();
        widest_category * r.sin() + line_height * r.cos()
    } else {
        line_height
    };

    let top_room = line_height / 2.0;
    let plot = geom::rect(
        area.origin.x + axis_width,
        area.origin.y + top_room,
        area.size.width - axis_width,
        area.size.height - top_room - label_height - AXIS_GAP,
    );
    let plot_bottom = plot.origin.y + plot.size.height;
    // Halved so extreme domains do not overflow the subtraction.
    let half_span = (domain_hi / 2.0 - domain_lo / 2.0).max(f64::EPSILON);
    let scale_y = |v: f64| {
        let v = if v.is_finite() { v } else { 0.0 };
        plot_bottom - (v / 2.0 - domain_lo / 2.0) / half_span * plot.size.height
    };
    let baseline_y = scale_y(0.0);

    let y_ticks = ticks
        .iter()
        .zip(tick_labels)
        .map(|(value, label)| AxisTickLayout {
            value: *value,
            label,
            y: scale_y(*value),
        })
        .collect();

    let n = body.categories.len().max(1);
    let band = plot.size.width / n as f64;
    let band_center = |c: usize| plot.origin.x + (c as f64 + 0.5) * band;

    let x_labels = body
        .categories
        .iter()
        .enumerate()
        .map(|(c, text)| CategoryLabelLayout {
            text: text.clone(),
            x: band_center(c),
            y: if rotation > 0.0 {
                plot_bottom + AXIS_GAP + font * 0.6
            } else {
                plot_bottom + AXIS_GAP + font
            },
            rotation,
        })
        .collect();

    let mut bars = Vec::new();
    let mut lines = Vec::new();
    match body.series_kind {
        SeriesKind::Bar => {
            let group = band * BAR_GROUP_RATIO;
            let bar_width = group / body.series.len().max(1) as f64;
            for (s, series) in body.series.iter().enumerate() {
                for (c, value) in series.values.iter().enumerate().take(body.categories.len()) {
                    let x = plot.origin.x + c as f64 * band + (band - group) / 2.0 + s as f64 * bar_width;
                    let y = scale_y(*value);
                    bars.push(BarLayout {
                        series: s,
                        category: c,
                        value: *value,
                        rect: geom::rect(x, y.min(baseline_y), bar_width, (y - baseline_y).abs()),
                        fill: series.color.clone(),
                    });
                }
            }
        }
        SeriesKind::Line => {
            for (s, series) in body.series.iter().enumerate() {
                let points = series
                    .values
                    .iter()
                    .enumerate()
                    .take(body.categories.len())
                    .map(|(c, v)| geom::point(band_center(c), scale_y(*v)))
                    .collect();
                lines.push(LineSeriesLayout {
                    series: s,
                    color: series.color.clone(),
                    points,
                });
            }
        }
    }

    CartesianLayout {
        plot,
        baseline_y,
        y_ticks,
        x_labels,
        bars,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_nice_and_cover_the_data() {
        assert_eq!(nice_ticks(0.0, 4290.0, 5), vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0]);
        assert_eq!(nice_ticks(0.0, 45.0, 5), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);

        let flat = nice_ticks(0.0, 0.0, 5);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat.first(), Some(&0.0));
        assert!((flat[5] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn extreme_magnitudes_fall_back_to_even_divisions() {
        let ticks = nice_ticks(0.0, 1.7e308, 5);
        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().all(|t| t.is_finite()));
        assert_eq!(ticks.first(), Some(&0.0));
        assert!(*ticks.last().unwrap() >= 1.7e308 * (1.0 - 1e-9));

        let ticks = nice_ticks(-f64::MAX, f64::MAX, 5);
        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn negative_values_extend_the_domain_below_zero() {
        let ticks = nice_ticks(-12.0, 30.0, 5);
        assert_eq!(ticks.first(), Some(&-20.0));
        assert_eq!(ticks.last(), Some(&30.0));
    }
}
