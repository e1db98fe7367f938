use crate::RenderOptions;
use crate::model::{
    BodyLayout, CartesianLayout, ChartLayout, PieLayout, RadarLayout, TableLayout, TextLayout,
};
use crate::pie::polar_xy;
use prochart_core::compile::CellKind;
use prochart_core::layout::FontStyle;
use std::fmt::Write as _;

const MISSING_COLOR: &str = "#909399";
const FEATURE_COLOR: &str = "#67c23a";

pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

/// Path coordinates keep three fractional digits.
fn fmt_path(v: f64) -> String {
    if !v.is_finite() || v.abs() < 0.0005 {
        return "0".to_string();
    }
    let r = (v * 1000.0).round() / 1000.0;
    fmt(r)
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

struct Palette<'a> {
    foreground: &'a str,
    grid: &'a str,
}

fn font_attrs(font: &FontStyle, fallback_color: &str) -> String {
    format!(
        r#"font-family="{family}" font-size="{size}" font-weight="{weight}" fill="{fill}""#,
        family = escape_xml(&font.family),
        size = fmt(font.size),
        weight = font.weight,
        fill = escape_xml(font.color.as_deref().unwrap_or(fallback_color)),
    )
}

fn write_text(out: &mut String, t: &TextLayout, attrs: &str, extra: &str) {
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" text-anchor="{anchor}" {attrs}{extra}>{text}</text>"#,
        x = fmt(t.x),
        y = fmt(t.y),
        anchor = t.anchor.as_svg(),
        text = escape_xml(&t.text),
    );
}

fn points_path(points: &[crate::geom::Point], close: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let _ = write!(
            &mut d,
            "{}{},{}",
            if i == 0 { "M" } else { "L" },
            fmt_path(p.x),
            fmt_path(p.y)
        );
    }
    if close && !d.is_empty() {
        d.push('Z');
    }
    d
}

/// Serializes a positioned chart. The output is deterministic for a given layout.
pub fn render_layout_svg(layout: &ChartLayout, options: &RenderOptions) -> String {
    let o = &layout.options;
    let theme = layout.theme;
    let diagram_id = options.diagram_id.as_deref().unwrap_or("prochart");
    let id = escape_xml(diagram_id);
    let palette = Palette {
        foreground: theme.foreground(),
        grid: theme.grid(),
    };

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-roledescription="{kind}""#,
        w = fmt(layout.width),
        h = fmt(layout.height),
        kind = layout.archetype.as_str(),
    );
    if layout.title.is_some() {
        let _ = write!(&mut out, r#" aria-labelledby="{id}-title""#);
    }
    out.push('>');
    if let Some(t) = &layout.title {
        let _ = write!(
            &mut out,
            r#"<title id="{id}-title">{}</title>"#,
            escape_xml(&t.text)
        );
    }

    // Frame: background first, border on top of it without insetting the content.
    let frame = &layout.frame;
    let background = o.background.as_deref().unwrap_or(theme.background());
    let _ = write!(
        &mut out,
        r#"<rect class="chart-background" x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}"/>"#,
        x = fmt(frame.origin.x),
        y = fmt(frame.origin.y),
        w = fmt(frame.size.width),
        h = fmt(frame.size.height),
        r = fmt(o.border.radius),
        fill = escape_xml(background),
    );

    if let Some(t) = &layout.title {
        write_text(&mut out, t, &font_attrs(&o.title_font, palette.foreground), r#" class="chart-title""#);
    }

    if !layout.legend.is_empty() {
        let attrs = font_attrs(&o.label_font, palette.foreground);
        out.push_str(r#"<g class="legend">"#);
        for item in &layout.legend {
            let _ = write!(
                &mut out,
                r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" rx="2" fill="{fill}"/>"#,
                x = fmt(item.x),
                y = fmt(item.y),
                s = fmt(item.swatch),
                fill = escape_xml(&item.color),
            );
            let _ = write!(
                &mut out,
                r#"<text x="{x}" y="{y}" text-anchor="start" {attrs}>{text}</text>"#,
                x = fmt(item.x + item.swatch + 6.0),
                y = fmt(item.y + item.swatch * 0.85),
                text = escape_xml(&item.label),
            );
        }
        out.push_str("</g>");
    }

    match &layout.body {
        BodyLayout::Cartesian(c) => render_cartesian(&mut out, c, layout, &palette),
        BodyLayout::Pie(p) => render_pie(&mut out, p, layout, &palette),
        BodyLayout::Radar(r) => render_radar(&mut out, r, layout, &palette),
        BodyLayout::Table(t) => render_table(&mut out, t, layout, &palette),
    }

    if o.border.is_visible() {
        let dash = o
            .border
            .style
            .dash_array(o.border.width)
            .map(|d| format!(r#" stroke-dasharray="{d}""#))
            .unwrap_or_default();
        let _ = write!(
            &mut out,
            r#"<rect class="chart-border" x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="none" stroke="{stroke}" stroke-width="{sw}"{dash}/>"#,
            x = fmt(frame.origin.x),
            y = fmt(frame.origin.y),
            w = fmt(frame.size.width),
            h = fmt(frame.size.height),
            r = fmt(o.border.radius),
            stroke = escape_xml(&o.border.color),
            sw = fmt(o.border.width),
        );
    }

    out.push_str("</svg>\n");
    out
}

fn render_cartesian(out: &mut String, c: &CartesianLayout, layout: &ChartLayout, palette: &Palette<'_>) {
    let o = &layout.options;
    let label_attrs = font_attrs(&o.label_font, palette.foreground);
    let plot = &c.plot;
    let left = plot.origin.x;
    let right = plot.origin.x + plot.size.width;
    let bottom = plot.origin.y + plot.size.height;

    out.push_str(r#"<g class="axis axis-y">"#);
    for tick in &c.y_ticks {
        let _ = write!(
            out,
            r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{grid}" stroke-width="1"/>"#,
            x1 = fmt(left),
            x2 = fmt(right),
            y = fmt(tick.y),
            grid = palette.grid,
        );
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="end" {label_attrs}>{text}</text>"#,
            x = fmt(left - 8.0),
            y = fmt(tick.y + o.label_font.size * 0.35),
            text = escape_xml(&tick.label),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="axis axis-x">"#);
    let _ = write!(
        out,
        r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{fg}" stroke-width="1"/>"#,
        x1 = fmt(left),
        x2 = fmt(right),
        y = fmt(bottom),
        fg = palette.foreground,
    );
    for label in &c.x_labels {
        if label.rotation > 0.0 {
            let _ = write!(
                out,
                r#"<text x="{x}" y="{y}" text-anchor="end" transform="rotate({r} {x} {y})" {label_attrs}>{text}</text>"#,
                x = fmt(label.x),
                y = fmt(label.y),
                r = fmt(-label.rotation),
                text = escape_xml(&label.text),
            );
        } else {
            let _ = write!(
                out,
                r#"<text x="{x}" y="{y}" text-anchor="middle" {label_attrs}>{text}</text>"#,
                x = fmt(label.x),
                y = fmt(label.y),
                text = escape_xml(&label.text),
            );
        }
    }
    out.push_str("</g>");

    if !c.bars.is_empty() {
        out.push_str(r#"<g class="bars">"#);
        for bar in &c.bars {
            let _ = write!(
                out,
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"/>"#,
                x = fmt_path(bar.rect.origin.x),
                y = fmt_path(bar.rect.origin.y),
                w = fmt_path(bar.rect.size.width),
                h = fmt_path(bar.rect.size.height),
                fill = escape_xml(&bar.fill),
            );
        }
        out.push_str("</g>");
    }

    for line in &c.lines {
        let color = escape_xml(&line.color);
        let _ = write!(
            out,
            r#"<g class="line-series"><path d="{d}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            d = points_path(&line.points, false),
        );
        for p in &line.points {
            let _ = write!(
                out,
                r#"<circle cx="{x}" cy="{y}" r="3" fill="{color}"/>"#,
                x = fmt_path(p.x),
                y = fmt_path(p.y),
            );
        }
        out.push_str("</g>");
    }
}

fn render_pie(out: &mut String, p: &PieLayout, layout: &ChartLayout, palette: &Palette<'_>) {
    let o = &layout.options;
    let cx = p.center.x;
    let cy = p.center.y;
    let r = p.radius;
    let background = o.background.as_deref().unwrap_or(layout.theme.background());

    let _ = write!(
        out,
        r#"<g class="pie"><circle cx="{cx}" cy="{cy}" r="{r}" fill="none" stroke="{grid}" stroke-width="1"/>"#,
        cx = fmt(cx),
        cy = fmt(cy),
        r = fmt(r),
        grid = palette.grid,
    );
    for slice in &p.slices {
        let d = if slice.is_full_circle {
            format!(
                "M{x},{top}A{r},{r},0,1,1,{x},{bottom}A{r},{r},0,1,1,{x},{top}Z",
                x = fmt_path(cx),
                top = fmt_path(cy - r),
                bottom = fmt_path(cy + r),
                r = fmt_path(r),
            )
        } else {
            let (x0, y0) = polar_xy(r, slice.start_angle);
            let (x1, y1) = polar_xy(r, slice.end_angle);
            let large = if slice.end_angle - slice.start_angle > std::f64::consts::PI {
                1
            } else {
                0
            };
            format!(
                "M{x0},{y0}A{r},{r},0,{large},1,{x1},{y1}L{cx},{cy}Z",
                x0 = fmt_path(cx + x0),
                y0 = fmt_path(cy + y0),
                x1 = fmt_path(cx + x1),
                y1 = fmt_path(cy + y1),
                r = fmt_path(r),
                cx = fmt_path(cx),
                cy = fmt_path(cy),
            )
        };
        let _ = write!(
            out,
            r#"<path d="{d}" fill="{fill}" stroke="{stroke}" stroke-width="1"/>"#,
            fill = escape_xml(&slice.fill),
            stroke = escape_xml(background),
        );
    }

    let mut label_font = o.label_font.clone();
    label_font.weight = 700;
    let attrs = font_attrs(&label_font, "#ffffff");
    for slice in &p.slices {
        let _ = write!(
            out,
            r#"<text x="{x}" y="{y}" text-anchor="middle" {attrs}>{text}%</text>"#,
            x = fmt(slice.text_x),
            y = fmt(slice.text_y + o.label_font.size * 0.35),
            text = slice.percent,
        );
    }
    if let Some(t) = &p.empty_label {
        write_text(out, t, &font_attrs(&o.label_font, palette.foreground), "");
    }
    out.push_str("</g>");
}

fn render_radar(out: &mut String, r: &RadarLayout, layout: &ChartLayout, palette: &Palette<'_>) {
    let o = &layout.options;
    out.push_str(r#"<g class="radar">"#);
    for ring in &r.graticule {
        let _ = write!(
            out,
            r#"<path d="{d}" fill="none" stroke="{grid}" stroke-width="1"/>"#,
            d = points_path(ring, true),
            grid = palette.grid,
        );
    }
    let attrs = font_attrs(&o.label_font, palette.foreground);
    for axis in &r.axes {
        let _ = write!(
            out,
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{grid}" stroke-width="1"/>"#,
            x1 = fmt_path(r.center.x),
            y1 = fmt_path(r.center.y),
            x2 = fmt_path(axis.end.x),
            y2 = fmt_path(axis.end.y),
            grid = palette.grid,
        );
        write_text(out, &axis.label_at, &attrs, "");
    }
    for polygon in &r.polygons {
        let color = escape_xml(&polygon.color);
        let _ = write!(
            out,
            r#"<path d="{d}" fill="{color}" fill-opacity="0.2" stroke="{color}" stroke-width="2"/>"#,
            d = points_path(&polygon.points, true),
        );
    }
    out.push_str("</g>");
}

fn render_table(out: &mut String, t: &TableLayout, layout: &ChartLayout, palette: &Palette<'_>) {
    let style = &layout.options.table;
    let border = escape_xml(&style.border_color);
    let bw = fmt(style.border_width);
    let header_attrs = font_attrs(&style.header_font, palette.foreground);
    let mut secondary_font = style.cell_font.clone();
    secondary_font.weight = 400;
    let secondary_attrs = font_attrs(&secondary_font, MISSING_COLOR);
    let cell_attrs = font_attrs(&style.cell_font, palette.foreground);
    let missing_attrs = font_attrs(
        &FontStyle {
            color: Some(MISSING_COLOR.to_string()),
            ..style.cell_font.clone()
        },
        MISSING_COLOR,
    );
    let feature_attrs = font_attrs(
        &FontStyle {
            color: Some(FEATURE_COLOR.to_string()),
            weight: 700,
            ..style.cell_font.clone()
        },
        FEATURE_COLOR,
    );

    let cell_rect = |out: &mut String, rect: &crate::geom::Rect, fill: &str| {
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}" stroke="{border}" stroke-width="{bw}"/>"#,
            x = fmt_path(rect.origin.x),
            y = fmt_path(rect.origin.y),
            w = fmt_path(rect.size.width),
            h = fmt_path(rect.size.height),
            fill = escape_xml(fill),
        );
    };

    out.push_str(r#"<g class="table">"#);
    out.push_str(r#"<g class="table-header">"#);
    cell_rect(out, &t.corner.rect, &style.header_background);
    write_text(out, &t.corner.text, &header_attrs, "");
    for header in &t.headers {
        cell_rect(out, &header.rect, &style.header_background);
        write_text(out, &header.brand, &header_attrs, "");
        if let Some(model) = &header.model {
            write_text(out, model, &secondary_attrs, "");
        }
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="table-body">"#);
    let plain = layout
        .options
        .background
        .clone()
        .unwrap_or_else(|| layout.theme.background().to_string());
    for (r, row) in t.rows.iter().enumerate() {
        let fill = match &style.stripe_background {
            Some(stripe) if t.striped_rows.contains(&r) => stripe.as_str(),
            _ => plain.as_str(),
        };
        for (c, cell) in row.iter().enumerate() {
            cell_rect(out, &cell.rect, fill);
            let attrs = match (c, cell.kind) {
                (0, _) => &header_attrs,
                (_, CellKind::Missing) => &missing_attrs,
                (_, CellKind::Feature) => &feature_attrs,
                (_, CellKind::Number | CellKind::Text) => &cell_attrs,
            };
            write_text(out, &cell.text, attrs, "");
        }
    }
    out.push_str("</g></g>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_stringified_compactly() {
        assert_eq!(fmt(12.0), "12");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(f64::NAN), "0");
        assert_eq!(fmt(0.5), "0.5");
        assert_eq!(fmt_path(1.23456), "1.235");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml(r#"A&B <"x">"#), "A&amp;B &lt;&quot;x&quot;&gt;");
    }
}
