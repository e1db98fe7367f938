use crate::product::ProductRecord;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub const MIN_PRODUCTS: usize = 2;
pub const MAX_PRODUCTS: usize = 5;
pub const MIN_PARAMETERS: usize = 1;

/// User-correctable problems that block a wizard step or an edit.
///
/// These are surfaced as inline notices; they never abort the wizard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateViolation {
    #[error("Select at least {min} products to compare (currently {count})")]
    TooFewProducts { count: usize, min: usize },
    #[error("At most {max} products can be compared at once")]
    TooManyProducts { max: usize },
    #[error("Product `{id}` is not in the catalog")]
    UnknownProduct { id: String },
    #[error("Select at least one parameter to compare")]
    NoParameters,
    #[error("Choose a chart type")]
    NoArchetype,
    #[error("Enter a chart title")]
    BlankTitle,
    #[error("Already at the first step")]
    AtFirstStep,
    #[error("Already at the last step")]
    AtLastStep,
}

/// Ordered product and parameter choices of one wizard run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    products: Vec<ProductRecord>,
    parameters: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn parameters(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.parameters.iter().map(String::as_str)
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().cloned().collect()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn contains_product(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    pub fn contains_parameter(&self, name: &str) -> bool {
        self.parameters.contains(name)
    }

    /// Adds a product at the end. Re-adding a selected product is a no-op; a sixth product is
    /// rejected and leaves the selection unchanged.
    pub fn add_product(&mut self, product: ProductRecord) -> Result<(), GateViolation> {
        if self.contains_product(&product.id) {
            return Ok(());
        }
        if self.products.len() >= MAX_PRODUCTS {
            return Err(GateViolation::TooManyProducts { max: MAX_PRODUCTS });
        }
        self.products.push(product);
        Ok(())
    }

    pub fn remove_product(&mut self, id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        before != self.products.len()
    }

    /// Returns `true` when the parameter was newly added.
    pub fn add_parameter(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() {
            return false;
        }
        self.parameters.insert(name)
    }

    pub fn remove_parameter(&mut self, name: &str) -> bool {
        self.parameters.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.products.clear();
        self.parameters.clear();
    }

    pub fn check_products(&self) -> Result<(), GateViolation> {
        let count = self.products.len();
        if count < MIN_PRODUCTS {
            return Err(GateViolation::TooFewProducts {
                count,
                min: MIN_PRODUCTS,
            });
        }
        if count > MAX_PRODUCTS {
            return Err(GateViolation::TooManyProducts { max: MAX_PRODUCTS });
        }
        Ok(())
    }

    pub fn check_parameters(&self) -> Result<(), GateViolation> {
        if self.parameters.len() < MIN_PARAMETERS {
            return Err(GateViolation::NoParameters);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ProductRecord {
        ProductRecord::new(id, "B", id)
    }

    #[test]
    fn sixth_product_is_rejected_without_changing_selection() {
        let mut s = Selection::new();
        for id in ["a", "b", "c", "d", "e"] {
            s.add_product(p(id)).unwrap();
        }
        let before = s.clone();
        let err = s.add_product(p("f")).unwrap_err();
        assert_eq!(err, GateViolation::TooManyProducts { max: 5 });
        assert!(err.to_string().contains('5'));
        assert_eq!(s, before);
    }

    #[test]
    fn products_are_a_set_by_id() {
        let mut s = Selection::new();
        s.add_product(p("a")).unwrap();
        s.add_product(p("a")).unwrap();
        assert_eq!(s.product_count(), 1);
        assert!(s.remove_product("a"));
        assert!(!s.remove_product("a"));
    }

    #[test]
    fn parameter_order_is_preserved_on_removal() {
        let mut s = Selection::new();
        for n in ["x", "y", "z"] {
            s.add_parameter(n);
        }
        s.remove_parameter("y");
        assert_eq!(s.parameter_names(), vec!["x", "z"]);
        assert!(!s.add_parameter("  "));
    }

    #[test]
    fn gates_report_counts() {
        let mut s = Selection::new();
        s.add_product(p("a")).unwrap();
        assert_eq!(
            s.check_products(),
            Err(GateViolation::TooFewProducts { count: 1, min: 2 })
        );
        assert_eq!(s.check_parameters(), Err(GateViolation::NoParameters));
    }
}
