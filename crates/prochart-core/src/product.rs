//! Product records as supplied by the catalog collaborator.
//!
//! Records are read-only here. The JSON shape uses camelCase keys (`basicInfo`, `modelName`)
//! so catalog exports can be loaded without a translation layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar parameter value as authored by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(true) => f.write_str("是"),
            ScalarValue::Bool(false) => f.write_str("否"),
            ScalarValue::Number(n) => f.write_str(&fmt_number(*n)),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub parameters: IndexMap<String, ScalarValue>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>, brand: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            basic_info: BasicInfo {
                brand: brand.into(),
                model_name: model_name.into(),
                ..Default::default()
            },
            parameters: IndexMap::new(),
            features: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.basic_info.price = Some(price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.basic_info.category = category.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: ScalarValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Returns a usable price, ignoring non-finite values.
    pub fn price(&self) -> Option<f64> {
        self.basic_info.price.filter(|p| p.is_finite())
    }

    /// Brand and model joined by a space; used as category axis labels and legend entries.
    pub fn display_name(&self) -> String {
        let brand = self.basic_info.brand.trim();
        let model = self.basic_info.model_name.trim();
        match (brand.is_empty(), model.is_empty()) {
            (false, false) => format!("{brand} {model}"),
            (false, true) => brand.to_string(),
            (true, false) => model.to_string(),
            (true, true) => self.id.clone(),
        }
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }
}

/// Formats a number the way users typed it: no trailing `.0`, at most 3 fractional digits.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut r = (v * 1000.0).round() / 1000.0;
    if !r.is_finite() {
        return format!("{v:e}");
    }
    if r.abs() < 0.0005 {
        r = 0.0;
    }
    let mut s = format!("{r:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

/// Loads a catalog export (a JSON array of product records).
pub fn parse_catalog(json: &str) -> crate::Result<Vec<ProductRecord>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        let p = ProductRecord::new("p-1", "", "");
        assert_eq!(p.display_name(), "p-1");
        let p = ProductRecord::new("p-1", "Dyson", "V15");
        assert_eq!(p.display_name(), "Dyson V15");
    }

    #[test]
    fn parses_camel_case_catalog_with_mixed_scalars() {
        let json = r#"[{
            "id": "a",
            "basicInfo": { "brand": "Acme", "modelName": "X1", "price": 1999 },
            "parameters": { "噪音级别": "45dB", "功率": 1200, "静音模式": true },
            "features": ["HEPA"]
        }]"#;
        let products = parse_catalog(json).unwrap();
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.price(), Some(1999.0));
        assert_eq!(
            p.parameters.get("噪音级别"),
            Some(&ScalarValue::Text("45dB".to_string()))
        );
        assert_eq!(p.parameters.get("功率"), Some(&ScalarValue::Number(1200.0)));
        assert_eq!(p.parameters.get("静音模式"), Some(&ScalarValue::Bool(true)));
        assert!(p.has_feature("HEPA"));
    }

    #[test]
    fn fmt_number_trims_trailing_zeros() {
        assert_eq!(fmt_number(1999.0), "1999");
        assert_eq!(fmt_number(2.50), "2.5");
        assert_eq!(fmt_number(-0.0), "0");
        assert_eq!(fmt_number(f64::NAN), "0");
        assert_eq!(fmt_number(1.7e308), "1.7e308");
    }
}
