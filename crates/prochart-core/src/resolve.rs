//! Value resolution for (product, parameter) pairs.
//!
//! Resolution is total: missing or malformed data degrades to `0` in numeric contexts and to a
//! sentinel string in tabular contexts. Nothing here returns an error.

use crate::catalog::SyntheticField;
use crate::product::{ProductRecord, ScalarValue, fmt_number};

/// Shown in table cells for features the product has.
pub const CHECK_MARK: &str = "✓";
/// Shown in table cells when the product carries no value for the parameter.
pub const NO_DATA: &str = "-";

/// Where a resolved value came from; table rendering styles cells by it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    FeaturePresent,
    Missing,
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => fmt_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::FeaturePresent => CHECK_MARK.to_string(),
            CellValue::Missing => NO_DATA.to_string(),
        }
    }
}

/// Resolves the raw cell for `name`, preserving its origin.
///
/// An authored parameter wins over a `basicInfo` alias of the same spelling (`"price"`); the
/// display names (`"价格"`) always resolve to `basicInfo`.
pub fn resolve_cell(product: &ProductRecord, name: &str) -> CellValue {
    let authored = product.parameters.get(name);
    let synthetic = match authored {
        Some(_) => SyntheticField::from_display_name(name),
        None => SyntheticField::from_name(name),
    };
    if let Some(SyntheticField::Price) = synthetic {
        return match product.price() {
            Some(p) => CellValue::Number(p),
            None => CellValue::Missing,
        };
    }

    if let Some(value) = authored.filter(|_| synthetic.is_none()) {
        return match value {
            ScalarValue::Number(n) if n.is_finite() => CellValue::Number(*n),
            ScalarValue::Number(_) => CellValue::Missing,
            other => CellValue::Text(other.to_string()),
        };
    }

    if product.has_feature(name) {
        return CellValue::FeaturePresent;
    }

    let info = &product.basic_info;
    let text = match synthetic {
        Some(SyntheticField::Brand) => info.brand.as_str(),
        Some(SyntheticField::Model) => info.model_name.as_str(),
        Some(SyntheticField::Category) => info.category.as_str(),
        Some(SyntheticField::Price) | None => "",
    };
    if text.trim().is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(text.to_string())
    }
}

/// Numeric context: chart series values.
pub fn numeric_value(product: &ProductRecord, name: &str) -> f64 {
    match resolve_cell(product, name) {
        CellValue::Number(n) => n,
        CellValue::FeaturePresent => 1.0,
        CellValue::Missing => 0.0,
        CellValue::Text(s) => {
            // Booleans authored in the parameter map count as presence.
            match product.parameters.get(name) {
                Some(ScalarValue::Bool(b)) => {
                    if *b {
                        1.0
                    } else {
                        0.0
                    }
                }
                _ => coerce_number(&s).unwrap_or(0.0),
            }
        }
    }
}

/// Tabular context: table cells.
pub fn display_value(product: &ProductRecord, name: &str) -> String {
    resolve_cell(product, name).display()
}

/// Parses the leading decimal number of `text` (`"45dB"` → `45`, `" 1,299 "` → `1299`).
///
/// Thousands separators are dropped before parsing. Returns `None` when no digits lead the string
/// or the result is not finite.
pub fn coerce_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let bytes = cleaned.as_bytes();
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() {
        let b = bytes[end];
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                // Only treat as exponent when digits follow (`"3e"` parses as 3).
                let rest = &bytes[end + 1..];
                let digits_at = match rest.first() {
                    Some(b'+') | Some(b'-') => 1,
                    _ => 0,
                };
                if !rest.get(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                    break;
                }
                seen_exp = true;
                end += digits_at;
            }
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    let v = cleaned[..end].parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BRAND, PRICE};

    fn product() -> ProductRecord {
        ProductRecord::new("a", "Acme", "X1")
            .with_price(1999.0)
            .with_parameter("噪音级别", ScalarValue::Text("45dB".to_string()))
            .with_parameter("颜色", ScalarValue::Text("深空灰".to_string()))
            .with_parameter("功率", ScalarValue::Number(1200.0))
            .with_parameter("静音模式", ScalarValue::Bool(true))
            .with_feature("HEPA")
    }

    #[test]
    fn price_resolves_from_basic_info_under_both_names() {
        let p = product();
        assert_eq!(numeric_value(&p, PRICE), 1999.0);
        assert_eq!(numeric_value(&p, "price"), 1999.0);
        assert_eq!(display_value(&p, PRICE), "1999");

        let unpriced = ProductRecord::new("b", "B", "2");
        assert_eq!(numeric_value(&unpriced, PRICE), 0.0);
        assert_eq!(display_value(&unpriced, PRICE), NO_DATA);
    }

    #[test]
    fn authored_alias_keys_shadow_basic_info() {
        let p = product()
            .with_parameter("price", ScalarValue::Number(10.0))
            .with_parameter("category", ScalarValue::Text("x".to_string()))
            .with_category("purifier");
        assert_eq!(numeric_value(&p, "price"), 10.0);
        assert_eq!(numeric_value(&p, PRICE), 1999.0);
        assert_eq!(display_value(&p, "category"), "x");
        assert_eq!(display_value(&p, crate::catalog::CATEGORY), "purifier");
    }

    #[test]
    fn parameter_strings_coerce_or_degrade() {
        let p = product();
        assert_eq!(numeric_value(&p, "噪音级别"), 45.0);
        assert_eq!(display_value(&p, "噪音级别"), "45dB");
        assert_eq!(numeric_value(&p, "颜色"), 0.0);
        assert_eq!(display_value(&p, "颜色"), "深空灰");
        assert_eq!(numeric_value(&p, "功率"), 1200.0);
        assert_eq!(numeric_value(&p, "静音模式"), 1.0);
        assert_eq!(display_value(&p, "静音模式"), "是");
    }

    #[test]
    fn features_are_presence_values() {
        let p = product();
        assert_eq!(numeric_value(&p, "HEPA"), 1.0);
        assert_eq!(display_value(&p, "HEPA"), CHECK_MARK);
    }

    #[test]
    fn missing_parameter_is_zero_or_dash() {
        let p = ProductRecord::new("c", "C", "3");
        assert_eq!(numeric_value(&p, "噪音级别"), 0.0);
        assert_eq!(display_value(&p, "噪音级别"), NO_DATA);
    }

    #[test]
    fn synthetic_text_fields_are_tabular_only() {
        let p = product();
        assert_eq!(display_value(&p, BRAND), "Acme");
        assert_eq!(numeric_value(&p, BRAND), 0.0);
    }

    #[test]
    fn resolver_is_total_over_odd_inputs() {
        let mut p = product();
        p.parameters
            .insert("坏值".to_string(), ScalarValue::Number(f64::NAN));
        p.basic_info.price = Some(f64::INFINITY);
        for name in ["", " ", "坏值", PRICE, "HEPA", "\u{0}", "不存在"] {
            let n = numeric_value(&p, name);
            assert!(n.is_finite(), "{name:?} resolved to {n}");
            let _ = display_value(&p, name);
        }
        assert_eq!(numeric_value(&p, PRICE), 0.0);
        assert_eq!(display_value(&p, "坏值"), NO_DATA);
    }

    #[test]
    fn coerce_number_reads_leading_numbers() {
        assert_eq!(coerce_number("45dB"), Some(45.0));
        assert_eq!(coerce_number(" -3.5 kg"), Some(-3.5));
        assert_eq!(coerce_number("1,299"), Some(1299.0));
        assert_eq!(coerce_number("2e3"), Some(2000.0));
        assert_eq!(coerce_number("3e"), Some(3.0));
        assert_eq!(coerce_number("abc"), None);
        assert_eq!(coerce_number("-"), None);
        assert_eq!(coerce_number(""), None);
    }
}
