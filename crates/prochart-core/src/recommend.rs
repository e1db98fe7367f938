//! Archetype suggestions from the shape of a selection.

use crate::archetype::ChartArchetype;
use serde::{Deserialize, Serialize};

/// Thresholds for the suggestion rules. These are UX heuristics, so they are data rather than
/// invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationRules {
    pub bar_min_products: usize,
    pub bar_max_parameters: usize,
    pub radar_min_parameters: usize,
    pub pie_max_products: usize,
    pub pie_parameters: usize,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            bar_min_products: 3,
            bar_max_parameters: 3,
            radar_min_parameters: 4,
            pie_max_products: 5,
            pie_parameters: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub archetype: ChartArchetype,
    pub reason: String,
}

impl RecommendationRules {
    fn bar_fires(&self, product_count: usize, parameter_count: usize) -> bool {
        product_count >= self.bar_min_products && parameter_count <= self.bar_max_parameters
    }

    fn radar_fires(&self, parameter_count: usize) -> bool {
        parameter_count >= self.radar_min_parameters
    }

    /// Returns every matching suggestion in rule declaration order (bar, radar, pie).
    ///
    /// Radar is additive: when the parameter count first crosses into radar territory, a bar
    /// suggestion that held one parameter earlier is kept alongside it.
    pub fn recommend(&self, product_count: usize, parameter_count: usize) -> Vec<Recommendation> {
        let mut out = Vec::new();
        let radar = self.radar_fires(parameter_count);

        let bar = self.bar_fires(product_count, parameter_count)
            || (radar
                && parameter_count == self.radar_min_parameters
                && parameter_count > 0
                && self.bar_fires(product_count, parameter_count - 1));
        if bar {
            out.push(Recommendation {
                archetype: ChartArchetype::Bar,
                reason: format!(
                    "Comparing {product_count} products across {parameter_count} key parameters reads most directly as bars"
                ),
            });
        }

        if radar {
            out.push(Recommendation {
                archetype: ChartArchetype::Radar,
                reason: format!(
                    "{parameter_count} dimensions of holistic comparison across {product_count} products are best shown radially"
                ),
            });
        }

        if product_count <= self.pie_max_products && parameter_count == self.pie_parameters {
            out.push(Recommendation {
                archetype: ChartArchetype::Pie,
                reason: format!(
                    "A single-parameter share breakdown of {product_count} products is clearest as a pie"
                ),
            });
        }

        out
    }
}

/// [`RecommendationRules::recommend`] with the default thresholds.
pub fn recommend(product_count: usize, parameter_count: usize) -> Vec<Recommendation> {
    RecommendationRules::default().recommend(product_count, parameter_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(recs: &[Recommendation]) -> Vec<ChartArchetype> {
        recs.iter().map(|r| r.archetype).collect()
    }

    #[test]
    fn three_products_two_parameters_suggests_bar_with_counts() {
        let recs = recommend(3, 2);
        assert_eq!(kinds(&recs), vec![ChartArchetype::Bar]);
        let reason = &recs[0].reason;
        let three = reason.find('3').expect("product count in reason");
        let two = reason[three..].find('2').expect("parameter count after product count");
        assert!(two > 0);
    }

    #[test]
    fn adding_a_fourth_parameter_adds_radar_without_dropping_bar() {
        let before = kinds(&recommend(3, 3));
        assert_eq!(before, vec![ChartArchetype::Bar]);

        let after = kinds(&recommend(3, 4));
        assert_eq!(after, vec![ChartArchetype::Bar, ChartArchetype::Radar]);

        // Past the boundary only radar remains.
        assert_eq!(kinds(&recommend(3, 5)), vec![ChartArchetype::Radar]);
    }

    #[test]
    fn radar_alone_when_bar_never_applied() {
        assert_eq!(kinds(&recommend(2, 4)), vec![ChartArchetype::Radar]);
    }

    #[test]
    fn overlapping_rules_surface_together_in_declaration_order() {
        assert_eq!(
            kinds(&recommend(3, 1)),
            vec![ChartArchetype::Bar, ChartArchetype::Pie]
        );
    }

    #[test]
    fn no_rule_firing_is_valid() {
        assert!(recommend(2, 2).is_empty());
        assert!(recommend(2, 3).is_empty());
    }

    #[test]
    fn thresholds_are_configurable() {
        let rules = RecommendationRules {
            bar_min_products: 2,
            ..Default::default()
        };
        assert_eq!(kinds(&rules.recommend(2, 2)), vec![ChartArchetype::Bar]);
    }
}
