use super::purifiers;
use crate::compile::*;
use crate::*;

fn selection(ids: &[&str], params: &[&str]) -> Selection {
    let catalog = purifiers();
    let mut s = Selection::new();
    for id in ids {
        let p = catalog.iter().find(|p| p.id == *id).unwrap().clone();
        s.add_product(p).unwrap();
    }
    for name in params {
        s.add_parameter(*name);
    }
    s
}

#[test]
fn bar_chart_has_one_series_per_parameter_and_one_value_per_product() {
    let s = selection(&["a", "b", "c"], &["价格", "噪音级别"]);
    let spec = compile(&s, ChartArchetype::Bar, "  空气净化器对比 ", Theme::Default);

    assert_eq!(spec.title, "空气净化器对比");
    assert_eq!(spec.series_count(), 2);
    assert_eq!(spec.legend, vec!["价格", "噪音级别"]);
    let ChartBody::Cartesian(body) = &spec.body else {
        panic!("expected cartesian body, got {:?}", spec.body);
    };
    assert_eq!(body.series_kind, SeriesKind::Bar);
    assert_eq!(
        body.categories,
        vec!["Dyson TP07", "Xiaomi 4 Pro", "Blueair Classic 480i"]
    );
    assert_eq!(body.series[0].values, vec![4290.0, 1299.0, 0.0]);
    assert_eq!(body.series[1].values, vec![45.0, 38.0, 0.0]);
    assert_eq!(body.series[0].color, Theme::Default.color(0));
    assert_eq!(body.series[1].color, Theme::Default.color(1));

    let recs = recommend(s.product_count(), s.parameter_count());
    assert_eq!(recs[0].archetype, ChartArchetype::Bar);
    assert!(recs[0].reason.contains('3'));
    assert!(recs[0].reason.contains('2'));
}

#[test]
fn long_category_labels_rotate() {
    let s = selection(&["a", "c"], &["CADR"]);
    let spec = compile(&s, ChartArchetype::Line, "t", Theme::Modern);
    let ChartBody::Cartesian(body) = &spec.body else {
        panic!("expected cartesian body");
    };
    assert_eq!(body.series_kind, SeriesKind::Line);
    assert_eq!(body.label_rotation, 45.0);
    assert_eq!(body.series[0].values, vec![350.0, 1200.0]);

    let short = ProductRecord::new("x", "A", "B");
    let mut s = Selection::new();
    s.add_product(short).unwrap();
    s.add_parameter("价格");
    let ChartBody::Cartesian(body) = compile(&s, ChartArchetype::Bar, "t", Theme::Default).body
    else {
        panic!("expected cartesian body");
    };
    assert_eq!(body.label_rotation, 0.0);
}

#[test]
fn pie_slices_follow_the_first_parameter() {
    let s = selection(&["a", "b"], &["价格"]);
    let spec = compile(&s, ChartArchetype::Pie, "Price share", Theme::Business);
    assert_eq!(spec.series_count(), 1);
    let ChartBody::Pie(body) = &spec.body else {
        panic!("expected pie body");
    };
    assert_eq!(body.parameter.as_deref(), Some("价格"));
    let values: Vec<f64> = body.slices.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![4290.0, 1299.0]);
    assert_eq!(spec.legend, vec!["Dyson TP07", "Xiaomi 4 Pro"]);
}

#[test]
fn radar_axis_max_leaves_headroom_and_never_collapses() {
    let s = selection(&["a", "b", "d"], &["CADR", "静音模式", "WiFi", "价格"]);
    let spec = compile(&s, ChartArchetype::Radar, "Radar", Theme::Dark);
    let ChartBody::Radar(body) = &spec.body else {
        panic!("expected radar body");
    };
    assert_eq!(body.polygons.len(), 3);
    assert_eq!(body.indicators.len(), 4);
    for (axis, indicator) in body.indicators.iter().enumerate() {
        let observed = body
            .polygons
            .iter()
            .map(|p| p.values[axis])
            .fold(0.0, f64::max);
        assert!(indicator.max > observed, "{indicator:?} vs {observed}");
    }
    assert_eq!(body.indicators[0].max, 500.0 * 1.2);
    // Nobody has WiFi among a, b, d.
    assert_eq!(body.indicators[2].max, 1.0);
    assert_eq!(body.polygons[0].values[1], 1.0);
    assert_eq!(body.polygons[1].values[1], 0.0);
}

#[test]
fn radar_headroom_is_floored() {
    let s = selection(&["a", "b"], &["CADR"]);
    let options = CompileOptions {
        radar_headroom: 1.0,
        ..Default::default()
    };
    let spec = compile_with(&s, ChartArchetype::Radar, "r", Theme::Default, &options);
    let ChartBody::Radar(body) = &spec.body else {
        panic!("expected radar body");
    };
    assert!((body.indicators[0].max - 550.0).abs() < 1e-9);
}

#[test]
fn radar_axis_max_stays_finite_for_extreme_values() {
    let mut s = Selection::new();
    for (id, x) in [("p", "1.7e308"), ("q", "1")] {
        let product =
            ProductRecord::new(id, "B", id).with_parameter("x", ScalarValue::Text(x.to_string()));
        s.add_product(product).unwrap();
    }
    s.add_parameter("x");
    let spec = compile(&s, ChartArchetype::Radar, "r", Theme::Default);
    let ChartBody::Radar(body) = &spec.body else {
        panic!("expected radar body");
    };
    assert_eq!(body.indicators[0].max, 1.7e308);
}

#[test]
fn table_cells_keep_their_origin() {
    let s = selection(&["a", "c"], &["噪音级别", "HEPA", "WiFi", "价格", "静音模式"]);
    let spec = compile(&s, ChartArchetype::Table, "Table", Theme::Default);
    assert!(spec.legend.is_empty());
    assert_eq!(spec.series_count(), 0);
    let ChartBody::Table(body) = &spec.body else {
        panic!("expected table body");
    };
    assert_eq!(body.columns[0].brand, "Dyson");
    assert_eq!(body.columns[1].model, "Classic 480i");

    let row = |name: &str| {
        body.rows
            .iter()
            .find(|r| r.parameter == name)
            .unwrap()
            .cells
            .iter()
            .map(|c| (c.text.as_str(), c.kind))
            .collect::<Vec<_>>()
    };
    assert_eq!(
        row("噪音级别"),
        vec![("45dB", CellKind::Text), ("-", CellKind::Missing)]
    );
    assert_eq!(
        row("HEPA"),
        vec![("✓", CellKind::Feature), ("✓", CellKind::Feature)]
    );
    assert_eq!(
        row("WiFi"),
        vec![("-", CellKind::Missing), ("✓", CellKind::Feature)]
    );
    assert_eq!(
        row("价格"),
        vec![("4290", CellKind::Number), ("-", CellKind::Missing)]
    );
    assert_eq!(row("静音模式")[0], ("是", CellKind::Text));
}

#[test]
fn compile_is_deterministic() {
    let s = selection(&["a", "b", "c", "d"], &["价格", "CADR", "HEPA"]);
    for archetype in ChartArchetype::ALL {
        for theme in Theme::ALL {
            let first = compile(&s, archetype, "Same", theme);
            let second = compile(&s.clone(), archetype, "Same", theme);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}

#[test]
fn odd_shapes_still_compile() {
    let empty = Selection::new();
    for archetype in ChartArchetype::ALL {
        let spec = compile(&empty, archetype, "", Theme::Default);
        assert_eq!(spec.archetype, archetype);
    }
    let spec = compile(&empty, ChartArchetype::Pie, "", Theme::Default);
    let ChartBody::Pie(body) = spec.body else {
        panic!("expected pie body");
    };
    assert!(body.parameter.is_none());
    assert!(body.slices.is_empty());
}

#[test]
fn spec_json_is_tagged_by_kind() {
    let s = selection(&["a", "b"], &["价格"]);
    let spec = compile(&s, ChartArchetype::Bar, "t", Theme::Default);
    let v = serde_json::to_value(&spec).unwrap();
    assert_eq!(v["archetype"], "bar");
    assert_eq!(v["body"]["kind"], "cartesian");
    assert_eq!(v["body"]["seriesKind"], "bar");
    let back: ChartSpec = serde_json::from_value(v).unwrap();
    assert_eq!(back, spec);
}
