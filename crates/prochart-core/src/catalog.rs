//! Parameter universe extraction.

use crate::product::ProductRecord;
use indexmap::IndexSet;

pub const PRICE: &str = "价格";
pub const BRAND: &str = "品牌";
pub const MODEL: &str = "型号";
pub const CATEGORY: &str = "类别";

/// Parameter names backed by `basicInfo` rather than the open-ended parameter map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticField {
    Price,
    Brand,
    Model,
    Category,
}

impl SyntheticField {
    /// Accepts both the canonical display names and the `basicInfo` field names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            PRICE | "price" => Some(Self::Price),
            BRAND | "brand" => Some(Self::Brand),
            MODEL | "model" | "modelName" => Some(Self::Model),
            CATEGORY | "category" => Some(Self::Category),
            _ => None,
        }
    }

    /// Matches only the canonical display names, never the `basicInfo` aliases.
    pub fn from_display_name(name: &str) -> Option<Self> {
        match name.trim() {
            PRICE => Some(Self::Price),
            BRAND => Some(Self::Brand),
            MODEL => Some(Self::Model),
            CATEGORY => Some(Self::Category),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Price => PRICE,
            Self::Brand => BRAND,
            Self::Model => MODEL,
            Self::Category => CATEGORY,
        }
    }
}

/// Collects every comparable parameter name across `products`.
///
/// Order is first occurrence: price (only when some product is priced), the brand/model/category
/// synthetics, then parameter map keys, then feature entries. Empty input yields an empty list.
pub fn extract_parameters(products: &[ProductRecord]) -> Vec<String> {
    if products.is_empty() {
        return Vec::new();
    }

    let mut out: IndexSet<String> = IndexSet::new();
    if products.iter().any(|p| p.price().is_some()) {
        out.insert(PRICE.to_string());
    }
    for synthetic in [SyntheticField::Brand, SyntheticField::Model, SyntheticField::Category] {
        out.insert(synthetic.display_name().to_string());
    }
    for product in products {
        for key in product.parameters.keys() {
            // Authored keys spelled like a `basicInfo` alias stay; the display names are taken.
            if SyntheticField::from_display_name(key).is_some() {
                continue;
            }
            out.insert(key.clone());
        }
    }
    for product in products {
        for feature in &product.features {
            if !feature.trim().is_empty() {
                out.insert(feature.clone());
            }
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ScalarValue;

    fn num(v: f64) -> ScalarValue {
        ScalarValue::Number(v)
    }

    #[test]
    fn empty_catalog_has_no_parameters() {
        assert!(extract_parameters(&[]).is_empty());
    }

    #[test]
    fn price_is_only_offered_when_some_product_is_priced() {
        let unpriced = vec![ProductRecord::new("a", "A", "1")];
        assert_eq!(extract_parameters(&unpriced), vec![BRAND, MODEL, CATEGORY]);

        let priced = vec![
            ProductRecord::new("a", "A", "1"),
            ProductRecord::new("b", "B", "2").with_price(10.0),
        ];
        assert_eq!(extract_parameters(&priced)[0], PRICE);
    }

    #[test]
    fn union_covers_every_product_in_first_occurrence_order() {
        let products = vec![
            ProductRecord::new("a", "A", "1")
                .with_parameter("功率", num(1.0))
                .with_parameter("噪音级别", num(40.0))
                .with_feature("HEPA"),
            ProductRecord::new("b", "B", "2")
                .with_parameter("噪音级别", num(42.0))
                .with_parameter("重量", num(3.0))
                .with_feature("HEPA")
                .with_feature("APP控制"),
        ];
        let names = extract_parameters(&products);
        assert_eq!(
            names,
            vec![BRAND, MODEL, CATEGORY, "功率", "噪音级别", "重量", "HEPA", "APP控制"]
        );

        // Every key and feature appears exactly once.
        for p in &products {
            for k in p.parameters.keys() {
                assert_eq!(names.iter().filter(|n| *n == k).count(), 1);
            }
            for f in &p.features {
                assert_eq!(names.iter().filter(|n| *n == f).count(), 1);
            }
        }
    }

    #[test]
    fn authored_keys_named_like_basic_info_fields_are_kept() {
        let products = vec![
            ProductRecord::new("a", "A", "1")
                .with_parameter("price", num(10.0))
                .with_parameter("category", ScalarValue::Text("x".into()))
                .with_parameter(PRICE, num(5.0)),
        ];
        let names = extract_parameters(&products);
        assert_eq!(names, vec![BRAND, MODEL, CATEGORY, "price", "category"]);
    }

    #[test]
    fn synthetic_aliases_resolve() {
        assert_eq!(SyntheticField::from_name("price"), Some(SyntheticField::Price));
        assert_eq!(SyntheticField::from_name("modelName"), Some(SyntheticField::Model));
        assert_eq!(SyntheticField::from_name("噪音级别"), None);
    }
}
