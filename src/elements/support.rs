//! Support conditions

use serde::{Deserialize, Serialize};

/// Support conditions at a node.
///
/// A DOF is either rigidly restrained, elastically supported by a spring
/// (kN/m or kN·m/rad), or free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Restrained in X translation
    pub dx: bool,
    /// Restrained in Y translation
    pub dy: bool,
    /// Restrained in Z translation
    pub dz: bool,
    /// Restrained in X rotation
    pub rx: bool,
    /// Restrained in Y rotation
    pub ry: bool,
    /// Restrained in Z rotation
    pub rz: bool,
    /// Spring stiffness per DOF [DX, DY, DZ, RX, RY, RZ]; zero means no spring
    #[serde(default)]
    pub springs: [f64; 6],
}

impl Support {
    /// Create a new support with no restraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fully fixed support (all DOFs restrained)
    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Create a pinned support (translations restrained, rotations free)
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Create a support with specific restraints
    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
            springs: [0.0; 6],
        }
    }

    /// Create an elastic support with the given spring stiffness on each DOF
    pub fn spring(stiffness: [f64; 6]) -> Self {
        Self {
            springs: stiffness,
            ..Self::default()
        }
    }

    /// Add a spring on a single DOF (0-5)
    pub fn with_spring(mut self, dof: usize, stiffness: f64) -> Self {
        if dof < 6 {
            self.springs[dof] = stiffness;
        }
        self
    }

    /// Restraint flags as [DX, DY, DZ, RX, RY, RZ]
    pub fn restraints(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Check if a DOF (0-5) is rigidly restrained
    pub fn is_restrained(&self, dof: usize) -> bool {
        self.restraints().get(dof).copied().unwrap_or(false)
    }

    /// Whether the support provides any restraint or spring at all
    pub fn is_active(&self) -> bool {
        self.restraints().iter().any(|&r| r) || self.springs.iter().any(|&k| k > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let s = Support::fixed();
        assert!((0..6).all(|d| s.is_restrained(d)));
    }

    #[test]
    fn test_pinned_support() {
        let s = Support::pinned();
        assert_eq!(s.restraints(), [true, true, true, false, false, false]);
    }

    #[test]
    fn test_spring_support_is_active_but_unrestrained() {
        let s = Support::new().with_spring(1, 5.0e4);
        assert!(s.is_active());
        assert!(!s.is_restrained(1));
        assert!(!Support::new().is_active());
    }
}
