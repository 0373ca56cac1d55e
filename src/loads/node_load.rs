//! Concentrated loads at nodes

use serde::{Deserialize, Serialize};

/// Force (kN) and moment (kN·m) at a node in global axes, ordered
/// `[FX, FY, FZ, MX, MY, MZ]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    pub components: [f64; 6],
    /// Load case name
    pub case: String,
}

impl NodeLoad {
    pub fn new(components: [f64; 6], case: &str) -> Self {
        Self {
            components,
            case: case.to_string(),
        }
    }

    /// Storey forces from wind and seismic loads
    pub fn force(fx: f64, fy: f64, fz: f64, case: &str) -> Self {
        Self::new([fx, fy, fz, 0.0, 0.0, 0.0], case)
    }

    pub fn moment(mx: f64, my: f64, mz: f64, case: &str) -> Self {
        Self::new([0.0, 0.0, 0.0, mx, my, mz], case)
    }

    pub fn as_array(&self) -> [f64; 6] {
        self.components
    }
}
