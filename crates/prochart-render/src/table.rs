use crate::geom;
use crate::model::{Anchor, TableCellLayout, TableHeaderLayout, TableLayout, TextLayout};
use crate::text::{TextMeasurer, TextStyle};
use prochart_core::compile::{CellKind, TableBody};
use prochart_core::layout::{Alignment, LayoutOptions};

/// Header of the parameter-name column.
pub const CORNER_LABEL: &str = "参数";
const MIN_PRODUCT_COLUMN: f64 = 60.0;

/// Lays out a comparison table whose top-left corner is at `origin`. Height follows the content.
pub fn layout_table(
    body: &TableBody,
    origin: (f64, f64),
    available_width: f64,
    options: &LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> TableLayout {
    let style = &options.table;
    let pad = style.cell_padding;
    let header_style = TextStyle::from(&style.header_font);
    let cell_style = TextStyle::from(&style.cell_font);
    let header_line = style.header_font.size * 1.2;
    let cell_line = style.cell_font.size * 1.2;

    let mut widths = Vec::with_capacity(body.columns.len() + 1);
    let first = body
        .rows
        .iter()
        .map(|r| measurer.measure(&r.parameter, &cell_style).width)
        .fold(measurer.measure(CORNER_LABEL, &header_style).width, f64::max);
    widths.push(first + 2.0 * pad);
    for (c, column) in body.columns.iter().enumerate() {
        let content = body
            .rows
            .iter()
            .filter_map(|r| r.cells.get(c))
            .map(|cell| measurer.measure(&cell.text, &cell_style).width)
            .fold(
                measurer
                    .measure(&column.brand, &header_style)
                    .width
                    .max(measurer.measure(&column.model, &cell_style).width),
                f64::max,
            );
        widths.push((content + 2.0 * pad).max(MIN_PRODUCT_COLUMN));
    }

    let natural: f64 = widths.iter().sum();
    if natural > available_width && natural > 0.0 {
        let k = available_width / natural;
        for w in &mut widths {
            *w *= k;
        }
    }
    let table_width: f64 = widths.iter().sum();
    let (x0, y0) = origin;
    let x0 = match options.alignment {
        Alignment::Left => x0,
        Alignment::Center => x0 + ((available_width - table_width) / 2.0).max(0.0),
        Alignment::Right => x0 + (available_width - table_width).max(0.0),
    };
    let mut column_x = Vec::with_capacity(widths.len());
    let mut x = x0;
    for w in &widths {
        column_x.push(x);
        x += w;
    }

    let has_models = body.columns.iter().any(|c| !c.model.trim().is_empty());
    let model_line = if has_models { cell_line } else { 0.0 };
    let header_height = header_line + model_line + 2.0 * pad;
    let row_height = cell_line + 2.0 * pad;

    let corner = TableCellLayout {
        rect: geom::rect(x0, y0, widths[0], header_height),
        text: TextLayout {
            text: CORNER_LABEL.to_string(),
            x: x0 + pad,
            y: y0 + pad + style.header_font.size,
            anchor: Anchor::Start,
        },
        kind: CellKind::Text,
    };

    let headers = body
        .columns
        .iter()
        .enumerate()
        .map(|(c, column)| {
            let x = column_x[c + 1];
            let w = widths[c + 1];
            let center = x + w / 2.0;
            let brand_y = y0 + pad + style.header_font.size;
            TableHeaderLayout {
                rect: geom::rect(x, y0, w, header_height),
                brand: TextLayout {
                    text: column.brand.clone(),
                    x: center,
                    y: brand_y,
                    anchor: Anchor::Middle,
                },
                model: (!column.model.trim().is_empty()).then(|| TextLayout {
                    text: column.model.clone(),
                    x: center,
                    y: brand_y + cell_line,
                    anchor: Anchor::Middle,
                }),
            }
        })
        .collect();

    let rows = body
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let y = y0 + header_height + r as f64 * row_height;
            let baseline = y + pad + style.cell_font.size;
            let mut cells = Vec::with_capacity(row.cells.len() + 1);
            cells.push(TableCellLayout {
                rect: geom::rect(x0, y, widths[0], row_height),
                text: TextLayout {
                    text: row.parameter.clone(),
                    x: x0 + pad,
                    y: baseline,
                    anchor: Anchor::Start,
                },
                kind: CellKind::Text,
            });
            for (c, cell) in row.cells.iter().enumerate().take(body.columns.len()) {
                let x = column_x[c + 1];
                let w = widths[c + 1];
                cells.push(TableCellLayout {
                    rect: geom::rect(x, y, w, row_height),
                    text: TextLayout {
                        text: cell.text.clone(),
                        x: x + w / 2.0,
                        y: baseline,
                        anchor: Anchor::Middle,
                    },
                    kind: cell.kind,
                });
            }
            cells
        })
        .collect();

    let striped_rows = if style.stripe_background.is_some() {
        (0..body.rows.len()).filter(|r| r % 2 == 1).collect()
    } else {
        Vec::new()
    };

    TableLayout {
        bounds: geom::rect(
            x0,
            y0,
            table_width,
            header_height + body.rows.len() as f64 * row_height,
        ),
        column_widths: widths,
        corner,
        headers,
        rows,
        striped_rows,
    }
}
