use crate::geom::{self, Point, Rect};
use crate::model::{Anchor, RadarAxisLayout, RadarLayout, RadarPolygonLayout, TextLayout};
use crate::text::{TextMeasurer, TextStyle};
use prochart_core::compile::RadarBody;
use prochart_core::layout::LayoutOptions;

pub const GRATICULE_RINGS: usize = 5;
const LABEL_GAP: f64 = 8.0;
const MIN_RADIUS: f64 = 10.0;

/// Angle of axis `i` out of `count`; the first axis points up.
pub fn axis_angle(i: usize, count: usize) -> f64 {
    -std::f64::consts::FRAC_PI_2 + (i as f64) * (std::f64::consts::TAU / count.max(1) as f64)
}

fn label_anchor(angle: f64) -> Anchor {
    let c = angle.cos();
    if c > 0.1 {
        Anchor::Start
    } else if c < -0.1 {
        Anchor::End
    } else {
        Anchor::Middle
    }
}

pub fn layout_radar(
    body: &RadarBody,
    area: Rect,
    options: &LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> RadarLayout {
    let style = TextStyle::from(&options.label_font);
    let font = options.label_font.size;
    let center = geom::point(
        area.origin.x + area.size.width / 2.0,
        area.origin.y + area.size.height / 2.0,
    );
    let widest = body
        .indicators
        .iter()
        .map(|a| measurer.measure(&a.name, &style).width)
        .fold(0.0, f64::max);
    let radius = (area.size.width / 2.0 - widest - LABEL_GAP)
        .min(area.size.height / 2.0 - font * 1.2 - LABEL_GAP)
        .max(MIN_RADIUS)
        .min(area.size.width.min(area.size.height) / 2.0);
    let radius = radius.max(0.0);

    let n = body.indicators.len();
    let axes = body
        .indicators
        .iter()
        .enumerate()
        .map(|(i, indicator)| {
            let angle = axis_angle(i, n);
            let at = geom::polar(center, radius + LABEL_GAP, angle);
            let s = angle.sin();
            let y = if s > 0.1 {
                at.y + font
            } else if s < -0.1 {
                at.y
            } else {
                at.y + font * 0.35
            };
            RadarAxisLayout {
                label: indicator.name.clone(),
                angle,
                end: geom::polar(center, radius, angle),
                label_at: TextLayout {
                    text: indicator.name.clone(),
                    x: at.x,
                    y,
                    anchor: label_anchor(angle),
                },
            }
        })
        .collect();

    let graticule = if n == 0 {
        Vec::new()
    } else {
        (1..=GRATICULE_RINGS)
            .map(|k| {
                let r = radius * k as f64 / GRATICULE_RINGS as f64;
                (0..n).map(|i| geom::polar(center, r, axis_angle(i, n))).collect()
            })
            .collect()
    };

    let polygons = body
        .polygons
        .iter()
        .map(|series| {
            let points: Vec<Point> = body
                .indicators
                .iter()
                .enumerate()
                .map(|(i, indicator)| {
                    let value = series.values.get(i).copied().unwrap_or(0.0);
                    let ratio = if indicator.max > 0.0 && value.is_finite() {
                        (value / indicator.max).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    geom::polar(center, radius * ratio, axis_angle(i, n))
                })
                .collect();
            RadarPolygonLayout {
                name: series.name.clone(),
                color: series.color.clone(),
                points,
            }
        })
        .collect();

    RadarLayout {
        center,
        radius,
        axes,
        graticule,
        polygons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prochart_core::compile::{RadarIndicator, Series};

    #[test]
    fn values_scale_against_the_axis_max() {
        let body = RadarBody {
            indicators: (0..4)
                .map(|i| RadarIndicator {
                    name: format!("a{i}"),
                    max: 10.0,
                })
                .collect(),
            polygons: vec![Series {
                name: "p".to_string(),
                values: vec![10.0, 5.0, 0.0, 50.0],
                color: "#000".to_string(),
            }],
        };
        let area = geom::rect(0.0, 0.0, 400.0, 400.0);
        let layout = layout_radar(&body, area, &LayoutOptions::default(), &crate::text::DeterministicTextMeasurer::default());
        let c = layout.center;
        let r = layout.radius;
        let dist = |p: &Point| ((p.x - c.x).powi(2) + (p.y - c.y).powi(2)).sqrt();
        let pts = &layout.polygons[0].points;
        assert!((dist(&pts[0]) - r).abs() < 1e-9);
        assert!((dist(&pts[1]) - r / 2.0).abs() < 1e-9);
        assert!(dist(&pts[2]) < 1e-9);
        // Values above the max are clamped to the rim.
        assert!((dist(&pts[3]) - r).abs() < 1e-9);
        // First axis points straight up.
        assert!((pts[0].x - c.x).abs() < 1e-9);
        assert!(pts[0].y < c.y);
        assert_eq!(layout.graticule.len(), GRATICULE_RINGS);
        assert_eq!(layout.axes[1].label_at.anchor, Anchor::Start);
        assert_eq!(layout.axes[3].label_at.anchor, Anchor::End);
    }
}
