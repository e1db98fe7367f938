use crate::product::{ProductRecord, ScalarValue};

mod compile;
mod wizard;

fn text(s: &str) -> ScalarValue {
    ScalarValue::Text(s.to_string())
}

/// Five air purifiers; `c` has no noise level and no price.
pub(crate) fn purifiers() -> Vec<ProductRecord> {
    vec![
        ProductRecord::new("a", "Dyson", "TP07")
            .with_price(4290.0)
            .with_parameter("噪音级别", text("45dB"))
            .with_parameter("CADR", ScalarValue::Number(350.0))
            .with_parameter("静音模式", ScalarValue::Bool(true))
            .with_feature("HEPA"),
        ProductRecord::new("b", "Xiaomi", "4 Pro")
            .with_price(1299.0)
            .with_parameter("噪音级别", text("38dB"))
            .with_parameter("CADR", ScalarValue::Number(500.0))
            .with_parameter("静音模式", ScalarValue::Bool(false)),
        ProductRecord::new("c", "Blueair", "Classic 480i")
            .with_parameter("CADR", text("1,200 m³/h"))
            .with_feature("HEPA")
            .with_feature("WiFi"),
        ProductRecord::new("d", "Philips", "AC2889").with_price(1999.0),
        ProductRecord::new("e", "Sharp", "FP-J30").with_price(899.0),
        ProductRecord::new("f", "Midea", "KJ400G").with_price(699.0),
    ]
}
