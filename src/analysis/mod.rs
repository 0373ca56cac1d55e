//! Linear static analysis: options and the frame solver

mod solver;

pub use solver::{FemSolver, PreparedModel};

use serde::{Deserialize, Serialize};

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// A pivot below `pivot_tolerance × original diagonal` marks the stiffness singular
    pub pivot_tolerance: f64,
    /// Check static equilibrium after each solve
    pub check_statics: bool,
    /// Relative tolerance of the equilibrium check
    pub statics_tolerance: f64,
    /// Evenly spaced stations used when scanning member diagrams
    pub diagram_stations: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1e-10,
            check_statics: true,
            statics_tolerance: 1e-6,
            diagram_stations: 11,
        }
    }
}

impl AnalysisOptions {
    /// Create options for linear analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Set the singularity pivot tolerance
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Enable or disable the equilibrium check
    pub fn with_statics_check(mut self, enabled: bool) -> Self {
        self.check_statics = enabled;
        self
    }

    /// Set the relative equilibrium tolerance
    pub fn with_statics_tolerance(mut self, tol: f64) -> Self {
        self.statics_tolerance = tol;
        self
    }

    /// Set the number of diagram stations (at least 2)
    pub fn with_diagram_stations(mut self, stations: usize) -> Self {
        self.diagram_stations = stations.max(2);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_deserialize_with_defaults() {
        let opts: AnalysisOptions = serde_json::from_str(r#"{"diagram_stations": 21}"#).unwrap();
        assert_eq!(opts.diagram_stations, 21);
        assert_eq!(opts.pivot_tolerance, 1e-10);
        assert!(opts.check_statics);
    }

    #[test]
    fn test_builder_methods() {
        let opts = AnalysisOptions::linear()
            .with_statics_check(false)
            .with_diagram_stations(1);
        assert!(!opts.check_statics);
        assert_eq!(opts.diagram_stations, 2);
    }
}
