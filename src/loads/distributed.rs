//! Uniform line loads on members

use serde::{Deserialize, Serialize};

/// Axis a member load acts along
///
/// Lower-case variants are member local axes, upper-case variants global.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoadDirection {
    Fx,
    Fy,
    Fz,
    FX,
    FY,
    FZ,
}

impl LoadDirection {
    /// Axis index and whether it is a global axis
    pub fn axis(&self) -> (usize, bool) {
        match self {
            LoadDirection::Fx => (0, false),
            LoadDirection::Fy => (1, false),
            LoadDirection::Fz => (2, false),
            LoadDirection::FX => (0, true),
            LoadDirection::FY => (1, true),
            LoadDirection::FZ => (2, true),
        }
    }
}

/// Full-length uniform load `w` (kN/m) on a member under one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    pub w: f64,
    pub direction: LoadDirection,
    pub case: String,
}

impl DistributedLoad {
    pub fn uniform(w: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            w,
            direction,
            case: case.to_string(),
        }
    }

    /// Gravity load of magnitude `w` along global -Y
    pub fn uniform_downward(w: f64, case: &str) -> Self {
        Self::uniform(-w.abs(), LoadDirection::FY, case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downward_load_ignores_sign() {
        let up = DistributedLoad::uniform_downward(-8.0, "Live");
        let down = DistributedLoad::uniform_downward(8.0, "Live");
        assert_eq!(up, down);
        assert_eq!(down.w, -8.0);
        assert_eq!(down.direction.axis(), (1, true));
        assert_eq!(LoadDirection::Fy.axis(), (1, false));
    }
}
