//! Load combinations

use serde::{Deserialize, Serialize};

use super::LoadCategory;

/// Limit state a combination is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LimitState {
    /// Ultimate limit state (strength)
    Uls,
    /// Serviceability limit state (deformation, cracking)
    Sls,
}

impl LimitState {
    pub fn label(&self) -> &'static str {
        match self {
            LimitState::Uls => "ULS",
            LimitState::Sls => "SLS",
        }
    }
}

/// One factored load case inside a combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationTerm {
    /// Name of the load case
    pub case: String,
    pub category: LoadCategory,
    pub factor: f64,
}

/// A load combination defines how load cases are combined for analysis.
///
/// Combinations are produced by [`LoadCombinationEngine`](super::LoadCombinationEngine);
/// terms keep the order of the template they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Label, e.g. `ULS2a: 1.1D + 1.3L + 0.8W`
    pub label: String,
    pub limit_state: LimitState,
    pub terms: Vec<CombinationTerm>,
}

impl LoadCombination {
    pub(crate) fn new(label: String, limit_state: LimitState, terms: Vec<CombinationTerm>) -> Self {
        Self {
            label,
            limit_state,
            terms,
        }
    }

    /// Get the factor for a load case (zero when the case is not part of the combination)
    pub fn factor(&self, case: &str) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.case == case)
            .map(|t| t.factor)
            .sum()
    }

    /// Factor applied to a category, if present
    pub fn category_factor(&self, category: LoadCategory) -> Option<f64> {
        self.terms
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.factor)
    }

    /// Check if this combination includes a specific load case
    pub fn includes(&self, case: &str) -> bool {
        self.terms.iter().any(|t| t.case == case)
    }

    /// Readable formula, e.g. `1.1D + 1.3L - 0.8W`
    pub fn formula(&self) -> String {
        let mut out = String::new();
        for (idx, term) in self.terms.iter().enumerate() {
            let sign = if term.factor < 0.0 { "-" } else { "+" };
            if idx == 0 {
                if term.factor < 0.0 {
                    out.push('-');
                }
            } else {
                out.push_str(&format!(" {} ", sign));
            }
            let magnitude = term.factor.abs();
            if (magnitude - 1.0).abs() > 1e-12 {
                out.push_str(&format!("{}", magnitude));
            }
            out.push_str(term.category.symbol());
        }
        out
    }

    pub fn is_uls(&self) -> bool {
        self.limit_state == LimitState::Uls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(category: LoadCategory, factor: f64) -> CombinationTerm {
        CombinationTerm {
            case: category.default_case_name().to_string(),
            category,
            factor,
        }
    }

    #[test]
    fn test_formula_and_factor_lookup() {
        let combo = LoadCombination::new(
            "ULS2b".into(),
            LimitState::Uls,
            vec![
                term(LoadCategory::Dead, 1.1),
                term(LoadCategory::Live, 1.3),
                term(LoadCategory::Wind, -0.8),
            ],
        );
        assert_eq!(combo.formula(), "1.1D + 1.3L - 0.8W");
        assert_eq!(combo.factor("Wind"), -0.8);
        assert_eq!(combo.factor("Crane"), 0.0);
        assert!(!combo.includes("Crane"));
        assert_eq!(combo.category_factor(LoadCategory::Dead), Some(1.1));
    }

    #[test]
    fn test_unit_factor_is_omitted_in_formula() {
        let combo = LoadCombination::new(
            "SLS1".into(),
            LimitState::Sls,
            vec![term(LoadCategory::Dead, 1.0), term(LoadCategory::Live, 1.0)],
        );
        assert_eq!(combo.formula(), "D + L");
    }
}
