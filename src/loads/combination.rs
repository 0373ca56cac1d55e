//! Load combination engine (TCVN 2737)
//!
//! Expands the load cases present in a model into the ULS and SLS
//! combinations listed by the catalog's combination templates.
//!
//! Rules applied to each template, in catalog order:
//! - the template applies only when every `required` category is present;
//! - optional terms whose category is absent are dropped, never kept with a
//!   zero factor;
//! - reversible (lateral) terms produce an `a` variant with the positive sign
//!   and a `b` variant with the negative sign;
//! - a combination whose factor set repeats an earlier one of the same limit
//!   state is dropped, so the first label wins.

use log::debug;

use super::{CombinationTerm, LimitState, LoadCaseSet, LoadCategory, LoadCombination};
use crate::catalog::{CombinationTemplate, StandardsCatalog};
use crate::error::{StructError, StructResult};

/// Generates governing load combinations from a set of load cases
pub struct LoadCombinationEngine<'a> {
    catalog: &'a StandardsCatalog,
}

impl<'a> LoadCombinationEngine<'a> {
    pub fn new(catalog: &'a StandardsCatalog) -> Self {
        Self { catalog }
    }

    /// Produce all applicable combinations, ULS first then SLS
    pub fn generate(&self, cases: &LoadCaseSet) -> StructResult<Vec<LoadCombination>> {
        if !cases.contains(LoadCategory::Dead) {
            return Err(StructError::config(
                "a dead load case is required to form load combinations",
            ));
        }

        let mut uls = Vec::new();
        let mut sls = Vec::new();
        for template in self.catalog.combination_templates() {
            let bucket = match template.limit_state {
                LimitState::Uls => &mut uls,
                LimitState::Sls => &mut sls,
            };
            for combo in expand_template(template, cases)? {
                if bucket.iter().any(|c: &LoadCombination| same_factors(c, &combo)) {
                    debug!("dropping duplicate combination {}", combo.label);
                    continue;
                }
                bucket.push(combo);
            }
        }

        debug!("generated {} ULS and {} SLS combinations", uls.len(), sls.len());
        uls.extend(sls);
        Ok(uls)
    }
}

fn expand_template(
    template: &CombinationTemplate,
    cases: &LoadCaseSet,
) -> StructResult<Vec<LoadCombination>> {
    let dead = template
        .terms
        .iter()
        .find(|t| t.category == LoadCategory::Dead)
        .ok_or_else(|| {
            StructError::config(format!("combination template {} has no dead term", template.label))
        })?;
    if dead.factor <= 0.0 {
        return Err(StructError::config(format!(
            "combination template {} has a non-positive dead factor",
            template.label
        )));
    }
    if template
        .terms
        .iter()
        .any(|t| !t.category.is_lateral() && t.factor < 0.0)
    {
        return Err(StructError::config(format!(
            "combination template {} has a negative gravity factor",
            template.label
        )));
    }

    let applies = template
        .terms
        .iter()
        .filter(|t| t.required)
        .all(|t| cases.contains(t.category));
    if !applies {
        return Ok(Vec::new());
    }

    let present: Vec<_> = template
        .terms
        .iter()
        .filter(|t| cases.contains(t.category))
        .collect();
    let reversible = present.iter().any(|t| t.reversible);
    let signs: &[(f64, &str)] = if reversible {
        &[(1.0, "a"), (-1.0, "b")]
    } else {
        &[(1.0, "")]
    };

    let mut out = Vec::with_capacity(signs.len());
    for &(sign, suffix) in signs {
        let terms: Vec<CombinationTerm> = present
            .iter()
            .filter_map(|t| {
                let case = cases.get(t.category)?;
                let factor = if t.reversible { sign * t.factor } else { t.factor };
                Some(CombinationTerm {
                    case: case.name.clone(),
                    category: t.category,
                    factor,
                })
            })
            .collect();
        let mut combo = LoadCombination::new(String::new(), template.limit_state, terms);
        combo.label = format!("{}{}: {}", template.label, suffix, combo.formula());
        out.push(combo);
    }
    Ok(out)
}

fn same_factors(a: &LoadCombination, b: &LoadCombination) -> bool {
    a.limit_state == b.limit_state
        && a.terms.len() == b.terms.len()
        && a.terms.iter().zip(&b.terms).all(|(x, y)| {
            x.category == y.category && (x.factor - y.factor).abs() < 1e-12
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadCase;

    fn catalog() -> StandardsCatalog {
        StandardsCatalog::tcvn().unwrap()
    }

    fn set(categories: &[LoadCategory]) -> LoadCaseSet {
        categories.iter().map(|&c| LoadCase::of(c)).collect()
    }

    #[test]
    fn test_missing_dead_load_is_configuration_error() {
        let cat = catalog();
        let err = LoadCombinationEngine::new(&cat)
            .generate(&set(&[LoadCategory::Live]))
            .unwrap_err();
        assert!(matches!(err, StructError::Configuration(_)));
    }

    #[test]
    fn test_dead_and_live_only() {
        let cat = catalog();
        let combos = LoadCombinationEngine::new(&cat)
            .generate(&set(&[LoadCategory::Dead, LoadCategory::Live]))
            .unwrap();
        let labels: Vec<_> = combos.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["ULS1: 1.1D + 1.3L", "SLS1: D + L", "SLS4: D"]);
    }

    #[test]
    fn test_wind_generates_both_signs() {
        let cat = catalog();
        let combos = LoadCombinationEngine::new(&cat)
            .generate(&set(&[LoadCategory::Dead, LoadCategory::Live, LoadCategory::Wind]))
            .unwrap();
        let uls2a = combos.iter().find(|c| c.label.starts_with("ULS2a")).unwrap();
        let uls2b = combos.iter().find(|c| c.label.starts_with("ULS2b")).unwrap();
        assert_eq!(uls2a.factor("Wind"), 0.8);
        assert_eq!(uls2b.factor("Wind"), -0.8);
        assert_eq!(uls2b.label, "ULS2b: 1.1D + 1.3L - 0.8W");
        let uls = combos.iter().filter(|c| c.is_uls()).count();
        let sls = combos.len() - uls;
        assert_eq!(uls, 9);
        assert_eq!(sls, 6);
    }

    #[test]
    fn test_every_combination_has_dead_and_only_present_cases() {
        let cat = catalog();
        let engine = LoadCombinationEngine::new(&cat);
        let inputs = [
            vec![LoadCategory::Dead],
            vec![LoadCategory::Dead, LoadCategory::Seismic],
            vec![LoadCategory::Dead, LoadCategory::RoofLive, LoadCategory::Wind],
            LoadCategory::ALL.to_vec(),
        ];
        for categories in inputs {
            let cases = set(&categories);
            for combo in engine.generate(&cases).unwrap() {
                let dead = combo.category_factor(LoadCategory::Dead).unwrap();
                assert!(dead > 0.0, "{}", combo.label);
                for term in &combo.terms {
                    assert!(cases.contains(term.category), "{}", combo.label);
                    assert!(term.factor != 0.0);
                    if !term.category.is_lateral() {
                        assert!(term.factor > 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_duplicate_factor_sets_are_dropped() {
        let cat = catalog();
        // With dead load alone ULS1 reduces to 1.1D, and SLS1 and SLS4 both reduce to D
        let combos = LoadCombinationEngine::new(&cat)
            .generate(&set(&[LoadCategory::Dead]))
            .unwrap();
        let labels: Vec<_> = combos.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["ULS1: 1.1D", "SLS1: D"]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let cat = catalog();
        let engine = LoadCombinationEngine::new(&cat);
        let cases = set(&LoadCategory::ALL);
        assert_eq!(engine.generate(&cases).unwrap(), engine.generate(&cases).unwrap());
    }
}
