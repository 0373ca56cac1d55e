//! Material properties

use serde::{Deserialize, Serialize};

/// Strength data by material family (kPa)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Structural steel: design strength `f` and ultimate strength `fu`
    Steel { grade: String, f: f64, fu: f64 },
    /// Concrete: design compressive strength `rb` and tensile strength `rbt`
    Concrete { grade: String, rb: f64, rbt: f64 },
    /// Stiffness only
    Elastic,
}

/// Material properties for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity in kPa
    pub e: f64,
    /// Shear modulus in kPa
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Unit weight in kN/m³
    pub unit_weight: f64,
    pub kind: MaterialKind,
}

impl Material {
    /// Create a stiffness-only material
    pub fn new(e: f64, g: f64, nu: f64, unit_weight: f64) -> Self {
        Self {
            e,
            g,
            nu,
            unit_weight,
            kind: MaterialKind::Elastic,
        }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(e: f64, nu: f64, unit_weight: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        Self::new(e, g, nu, unit_weight)
    }

    /// Attach strength data
    pub fn with_kind(mut self, kind: MaterialKind) -> Self {
        self.kind = kind;
        self
    }

    /// Grade name, if the material came from a graded table
    pub fn grade(&self) -> Option<&str> {
        match &self.kind {
            MaterialKind::Steel { grade, .. } | MaterialKind::Concrete { grade, .. } => Some(grade),
            MaterialKind::Elastic => None,
        }
    }

    /// Steel design strength `f`
    pub fn steel_strength(&self) -> Option<f64> {
        match self.kind {
            MaterialKind::Steel { f, .. } => Some(f),
            _ => None,
        }
    }

    /// Steel ultimate strength `fu`
    pub fn steel_ultimate(&self) -> Option<f64> {
        match self.kind {
            MaterialKind::Steel { fu, .. } => Some(fu),
            _ => None,
        }
    }

    /// Concrete design strengths `(rb, rbt)`
    pub fn concrete_strength(&self) -> Option<(f64, f64)> {
        match self.kind {
            MaterialKind::Concrete { rb, rbt, .. } => Some((rb, rbt)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotropic_material() {
        let mat = Material::isotropic(200e6, 0.3, 78.5);
        let expected_g = 200e6 / (2.0 * 1.3);
        assert!((mat.g - expected_g).abs() < 1e-6);
        assert!(mat.grade().is_none());
    }

    #[test]
    fn test_strength_accessors() {
        let steel = Material::isotropic(200e6, 0.3, 78.5).with_kind(MaterialKind::Steel {
            grade: "SS400".into(),
            f: 235e3,
            fu: 400e3,
        });
        assert_eq!(steel.steel_strength(), Some(235e3));
        assert_eq!(steel.concrete_strength(), None);
        assert_eq!(steel.grade(), Some("SS400"));
    }
}
