//! Reduction of capacity verdicts to a design summary

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::design::{CapacityVerdict, VerdictStatus};

/// Number of elements in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub warning: usize,
    pub fail: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.ok + self.warning + self.fail
    }

    fn add(&mut self, status: VerdictStatus) {
        match status {
            VerdictStatus::Ok => self.ok += 1,
            VerdictStatus::Warning => self.warning += 1,
            VerdictStatus::Fail => self.fail += 1,
        }
    }
}

/// Governing verdict per element plus the elements needing attention
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignSummary {
    /// One verdict per element, in order of first appearance
    pub governing: Vec<CapacityVerdict>,
    /// Failing elements, highest utilization first
    pub failing: Vec<CapacityVerdict>,
    /// Elements in the warning band, highest utilization first
    pub warnings: Vec<CapacityVerdict>,
    pub counts: StatusCounts,
}

impl DesignSummary {
    pub fn governing_for(&self, element: &str) -> Option<&CapacityVerdict> {
        self.governing.iter().find(|v| v.element == element)
    }

    pub fn all_ok(&self) -> bool {
        self.counts.fail == 0 && self.counts.warning == 0
    }
}

/// NaN ranks above every number
fn compare_utilization(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Pure reduction over verdicts; nothing is recomputed
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn aggregate(verdicts: &[CapacityVerdict]) -> DesignSummary {
        let mut governing: Vec<CapacityVerdict> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for verdict in verdicts {
            match index.get(verdict.element.as_str()) {
                Some(&k) => {
                    // Strictly greater, so the first of equal verdicts is kept
                    if compare_utilization(verdict.utilization, governing[k].utilization) == Ordering::Greater {
                        governing[k] = verdict.clone();
                    }
                }
                None => {
                    index.insert(&verdict.element, governing.len());
                    governing.push(verdict.clone());
                }
            }
        }

        let mut counts = StatusCounts::default();
        for verdict in &governing {
            counts.add(verdict.status);
        }

        let by_status = |status: VerdictStatus| {
            let mut selected: Vec<CapacityVerdict> =
                governing.iter().filter(|v| v.status == status).cloned().collect();
            selected.sort_by(|a, b| compare_utilization(b.utilization, a.utilization));
            selected
        };
        let failing = by_status(VerdictStatus::Fail);
        let warnings = by_status(VerdictStatus::Warning);

        DesignSummary {
            governing,
            failing,
            warnings,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{FailureMode, ModeResult};

    fn verdict(element: &str, combination: &str, u: f64) -> CapacityVerdict {
        CapacityVerdict::from_mode(
            element,
            "steel_member",
            combination,
            ModeResult::new(FailureMode::Strength, u),
        )
    }

    #[test]
    fn test_governing_picks_maximum_per_element() {
        let verdicts = vec![
            verdict("B1", "ULS1", 0.4),
            verdict("C1", "ULS1", 0.9),
            verdict("B1", "ULS2", 0.7),
            verdict("B1", "ULS3", 0.5),
        ];
        let summary = ResultAggregator::aggregate(&verdicts);
        assert_eq!(summary.governing.len(), 2);
        assert_eq!(summary.governing[0].element, "B1");
        assert_eq!(summary.governing_for("B1").unwrap().combination, "ULS2");
        assert_eq!(summary.counts, StatusCounts { ok: 1, warning: 1, fail: 0 });
        assert!(!summary.all_ok());
    }

    #[test]
    fn test_ties_keep_first_in_input_order() {
        let verdicts = vec![verdict("B1", "ULS1", 0.6), verdict("B1", "ULS2", 0.6)];
        let summary = ResultAggregator::aggregate(&verdicts);
        assert_eq!(summary.governing_for("B1").unwrap().combination, "ULS1");
    }

    #[test]
    fn test_failing_sorted_descending_and_stable() {
        let verdicts = vec![
            verdict("A", "ULS1", 1.1),
            verdict("B", "ULS1", 2.0),
            verdict("C", "ULS1", 1.1),
            verdict("D", "ULS1", 0.85),
            verdict("E", "ULS1", f64::NAN),
            verdict("F", "ULS1", 0.95),
        ];
        let summary = ResultAggregator::aggregate(&verdicts);
        let failing: Vec<&str> = summary.failing.iter().map(|v| v.element.as_str()).collect();
        assert_eq!(failing, vec!["E", "B", "A", "C"]);
        let warnings: Vec<&str> = summary.warnings.iter().map(|v| v.element.as_str()).collect();
        assert_eq!(warnings, vec!["F", "D"]);
        assert_eq!(summary.counts.total(), 6);
    }

    #[test]
    fn test_nan_governs_its_element() {
        let verdicts = vec![verdict("B1", "ULS1", 0.3), verdict("B1", "ULS2", f64::NAN)];
        let summary = ResultAggregator::aggregate(&verdicts);
        let governing = summary.governing_for("B1").unwrap();
        assert_eq!(governing.combination, "ULS2");
        assert_eq!(governing.status, VerdictStatus::Fail);
    }

    #[test]
    fn test_empty_input() {
        let summary = ResultAggregator::aggregate(&[]);
        assert!(summary.governing.is_empty());
        assert!(summary.all_ok());
    }
}
