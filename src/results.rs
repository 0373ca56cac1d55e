//! Result types for frame analysis
//!
//! Internal force diagrams follow these sign conventions along the member
//! local x-axis, measured from the i-node:
//!
//! - axial force is positive in tension;
//! - `moment_major` is positive when it puts the local -y face in tension
//!   (sagging for a beam loaded downward);
//! - shears are the derivatives of the corresponding moment diagrams.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StructError, StructResult};
use crate::loads::LimitState;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Reaction forces at a supported node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Resultant horizontal force (X-Z plane)
    pub fn horizontal(&self) -> f64 {
        self.fx.hypot(self.fz)
    }

    /// Resultant overturning moment about the horizontal axes
    pub fn overturning(&self) -> f64 {
        self.mx.hypot(self.mz)
    }
}

/// Internal forces at one end of a member, in the diagram sign convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis (minor)
    pub moment_y: f64,
    /// Bending moment about local z axis (major)
    pub moment_z: f64,
}

impl MemberForces {
    /// Create from local force array at i-node
    pub fn from_i_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: -forces[0],
            shear_y: forces[1],
            shear_z: forces[2],
            torsion: -forces[3],
            moment_y: -forces[4],
            moment_z: -forces[5],
        }
    }

    /// Create from local force array at j-node
    pub fn from_j_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: forces[6],
            shear_y: -forces[7],
            shear_z: -forces[8],
            torsion: forces[9],
            moment_y: forces[10],
            moment_z: forces[11],
        }
    }

    /// Resultant shear
    pub fn shear(&self) -> f64 {
        self.shear_y.hypot(self.shear_z)
    }
}

/// Internal forces at one station along a member
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationForces {
    /// Distance from the i-node (m)
    pub x: f64,
    pub axial: f64,
    pub shear_y: f64,
    pub shear_z: f64,
    pub moment_z: f64,
    pub moment_y: f64,
}

/// Solved state of one member under one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    /// Local end forces acting on the member [i: Fx..Mz, j: Fx..Mz]
    pub end_forces: [f64; 12],
    /// Factored uniform load in local axes [wx, wy, wz] (kN/m)
    pub w_local: [f64; 3],
    /// Member length (m)
    pub length: f64,
    /// Flexural rigidity about the strong axis (kN·m²)
    pub ei_major: f64,
    /// Flexural rigidity about the weak axis (kN·m²)
    pub ei_minor: f64,
}

impl MemberResult {
    fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(0.0, self.length)
    }

    /// Axial force at `x` (positive = tension)
    pub fn axial_at(&self, x: f64) -> f64 {
        let x = self.clamp_x(x);
        -(self.end_forces[0] + self.w_local[0] * x)
    }

    /// Shear along local y at `x`
    pub fn shear_major_at(&self, x: f64) -> f64 {
        let x = self.clamp_x(x);
        self.end_forces[1] + self.w_local[1] * x
    }

    /// Shear along local z at `x`
    pub fn shear_minor_at(&self, x: f64) -> f64 {
        let x = self.clamp_x(x);
        self.end_forces[2] + self.w_local[2] * x
    }

    /// Strong-axis bending moment at `x`
    pub fn moment_major_at(&self, x: f64) -> f64 {
        let x = self.clamp_x(x);
        let f = &self.end_forces;
        -f[5] + f[1] * x + self.w_local[1] * x * x / 2.0
    }

    /// Weak-axis bending moment at `x`
    pub fn moment_minor_at(&self, x: f64) -> f64 {
        let x = self.clamp_x(x);
        let f = &self.end_forces;
        -f[4] - f[2] * x - self.w_local[2] * x * x / 2.0
    }

    /// Position of the stationary point of a moment diagram, if inside the span
    fn interior_extremum(&self, shear_i: f64, w: f64) -> Option<f64> {
        if w.abs() < f64::EPSILON {
            return None;
        }
        let x = -shear_i / w;
        (x > 0.0 && x < self.length).then_some(x)
    }

    /// Stations where a moment diagram can peak: both ends and any interior extremum
    fn critical_points(&self) -> Vec<f64> {
        let mut xs = vec![0.0, self.length];
        xs.extend(self.interior_extremum(self.end_forces[1], self.w_local[1]));
        xs.extend(self.interior_extremum(self.end_forces[2], self.w_local[2]));
        xs
    }

    /// Largest sagging (positive) strong-axis moment, zero if none
    pub fn max_sagging_moment(&self) -> f64 {
        self.critical_points()
            .into_iter()
            .map(|x| self.moment_major_at(x))
            .fold(0.0, f64::max)
    }

    /// Largest hogging strong-axis moment as a magnitude, zero if none
    pub fn max_hogging_moment(&self) -> f64 {
        self.critical_points()
            .into_iter()
            .map(|x| -self.moment_major_at(x))
            .fold(0.0, f64::max)
    }

    /// Largest strong-axis moment magnitude
    pub fn max_moment_major(&self) -> f64 {
        self.max_sagging_moment().max(self.max_hogging_moment())
    }

    /// Largest weak-axis moment magnitude
    pub fn max_moment_minor(&self) -> f64 {
        self.critical_points()
            .into_iter()
            .map(|x| self.moment_minor_at(x).abs())
            .fold(0.0, f64::max)
    }

    /// Largest shear magnitudes (major, minor); linear diagrams peak at the ends
    pub fn max_shear(&self) -> (f64, f64) {
        let vy = self.shear_major_at(0.0).abs().max(self.shear_major_at(self.length).abs());
        let vz = self.shear_minor_at(0.0).abs().max(self.shear_minor_at(self.length).abs());
        (vy, vz)
    }

    /// Mid-span deflection along local y, relative to the chord between the ends
    pub fn mid_span_deflection_major(&self) -> f64 {
        if self.ei_major <= 0.0 {
            return 0.0;
        }
        let l = self.length;
        let ends = self.moment_major_at(0.0) + self.moment_major_at(l);
        -ends * l * l / (16.0 * self.ei_major) + 5.0 * self.w_local[1] * l.powi(4) / (384.0 * self.ei_major)
    }

    /// Mid-span deflection along local z, relative to the chord between the ends
    pub fn mid_span_deflection_minor(&self) -> f64 {
        if self.ei_minor <= 0.0 {
            return 0.0;
        }
        let l = self.length;
        let ends = self.moment_minor_at(0.0) + self.moment_minor_at(l);
        (ends * l * l / 16.0 + 5.0 * self.w_local[2] * l.powi(4) / 384.0) / self.ei_minor
    }

    pub fn forces_i(&self) -> MemberForces {
        MemberForces::from_i_node_forces(&self.end_forces)
    }

    pub fn forces_j(&self) -> MemberForces {
        MemberForces::from_j_node_forces(&self.end_forces)
    }

    pub fn station(&self, x: f64) -> StationForces {
        StationForces {
            x,
            axial: self.axial_at(x),
            shear_y: self.shear_major_at(x),
            shear_z: self.shear_minor_at(x),
            moment_z: self.moment_major_at(x),
            moment_y: self.moment_minor_at(x),
        }
    }

    /// Forces at `stations` evenly spaced points, plus any interior moment extremum
    pub fn diagram(&self, stations: usize) -> Vec<StationForces> {
        let n = stations.max(2);
        let mut xs: Vec<f64> = (0..n)
            .map(|k| self.length * k as f64 / (n - 1) as f64)
            .collect();
        xs.extend(self.critical_points());
        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        xs.into_iter().map(|x| self.station(x)).collect()
    }

    /// Envelope of the quantities the capacity checks consume
    pub fn design_forces(&self, stations: usize) -> DesignForces {
        let diagram = self.diagram(stations);
        let (v_major, v_minor) = self.max_shear();
        let axial = diagram.iter().map(|s| s.axial);
        let (n_tension, n_compression) = axial.fold((0.0_f64, 0.0_f64), |(t, c), n| {
            (t.max(n), c.max(-n))
        });
        DesignForces {
            length: self.length,
            n_tension,
            n_compression,
            v_major,
            v_minor,
            torsion: self.end_forces[3].abs(),
            m_sagging: self.max_sagging_moment(),
            m_hogging: self.max_hogging_moment(),
            m_minor: self.max_moment_minor(),
            deflection_major: self.mid_span_deflection_major().abs(),
            deflection_minor: self.mid_span_deflection_minor().abs(),
            end_i: self.forces_i(),
            end_j: self.forces_j(),
            stations: diagram,
        }
    }
}

/// Member force envelope under one combination
///
/// Magnitudes are non-negative. `stations` keeps the signed forces so that
/// interaction checks can combine axial force and moments at the same section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignForces {
    pub length: f64,
    pub n_tension: f64,
    pub n_compression: f64,
    pub v_major: f64,
    pub v_minor: f64,
    pub torsion: f64,
    pub m_sagging: f64,
    pub m_hogging: f64,
    pub m_minor: f64,
    pub deflection_major: f64,
    pub deflection_minor: f64,
    pub end_i: MemberForces,
    pub end_j: MemberForces,
    pub stations: Vec<StationForces>,
}

impl DesignForces {
    /// Largest strong-axis moment magnitude
    pub fn m_major(&self) -> f64 {
        self.m_sagging.max(self.m_hogging)
    }

    /// Envelope for a member carrying only end forces and no span load
    pub fn from_end_forces(end_forces: [f64; 12], length: f64) -> Self {
        MemberResult {
            end_forces,
            w_local: [0.0; 3],
            length,
            ei_major: 0.0,
            ei_minor: 0.0,
        }
        .design_forces(2)
    }
}

/// Solved state of the whole model under one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Combination label
    pub combination: String,
    pub limit_state: LimitState,
    pub displacements: BTreeMap<String, NodeDisplacement>,
    pub members: BTreeMap<String, MemberResult>,
    /// Reactions at supported nodes; only restrained or spring DOFs are non-zero
    pub reactions: BTreeMap<String, Reactions>,
}

impl AnalysisResult {
    pub fn node_displacement(&self, node: &str) -> StructResult<&NodeDisplacement> {
        self.displacements
            .get(node)
            .ok_or_else(|| StructError::NodeNotFound(node.to_string()))
    }

    pub fn member(&self, member: &str) -> StructResult<&MemberResult> {
        self.members
            .get(member)
            .ok_or_else(|| StructError::MemberNotFound(member.to_string()))
    }

    /// Reaction at a node; an unsupported node reports zero
    pub fn reaction(&self, node: &str) -> Reactions {
        self.reactions.get(node).copied().unwrap_or_default()
    }

    /// Sum of all reactions as [FX, FY, FZ, MX, MY, MZ]
    pub fn total_reaction(&self) -> [f64; 6] {
        self.reactions.values().fold([0.0; 6], |mut acc, r| {
            for (a, v) in acc.iter_mut().zip(r.as_array()) {
                *a += v;
            }
            acc
        })
    }

    /// Largest translation among all nodes, with its node name
    pub fn max_displacement(&self) -> Option<(&str, f64)> {
        self.displacements
            .iter()
            .map(|(name, d)| (name.as_str(), d.translation_magnitude()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Simply supported span with gravity load `w` (kN/m, downward)
    fn simply_supported(w: f64, l: f64, ei: f64) -> MemberResult {
        let mut end_forces = [0.0; 12];
        end_forces[1] = w * l / 2.0;
        end_forces[7] = w * l / 2.0;
        MemberResult {
            end_forces,
            w_local: [0.0, -w, 0.0],
            length: l,
            ei_major: ei,
            ei_minor: ei,
        }
    }

    #[test]
    fn test_simply_supported_diagrams() {
        let r = simply_supported(10.0, 6.0, 2.0e4);
        assert_relative_eq!(r.moment_major_at(3.0), 45.0, epsilon = 1e-9);
        assert_relative_eq!(r.max_sagging_moment(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(r.max_hogging_moment(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(r.shear_major_at(0.0), 30.0, epsilon = 1e-9);
        assert_relative_eq!(r.shear_major_at(6.0), -30.0, epsilon = 1e-9);
        let expected = -5.0 * 10.0 * 6.0_f64.powi(4) / (384.0 * 2.0e4);
        assert_relative_eq!(r.mid_span_deflection_major(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_end_moments_reduce_deflection() {
        // Fixed-fixed span: end moments wL²/12 hogging
        let (w, l, ei) = (12.0, 4.0, 1.0e4);
        let mut r = simply_supported(w, l, ei);
        r.end_forces[5] = w * l * l / 12.0;
        r.end_forces[11] = -w * l * l / 12.0;
        assert_relative_eq!(r.max_hogging_moment(), w * l * l / 12.0, epsilon = 1e-9);
        assert_relative_eq!(r.max_sagging_moment(), w * l * l / 24.0, epsilon = 1e-9);
        let expected = -w * l.powi(4) / (384.0 * ei);
        assert_relative_eq!(r.mid_span_deflection_major(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_end_forces_convention() {
        let r = simply_supported(10.0, 6.0, 2.0e4);
        let i = r.forces_i();
        let j = r.forces_j();
        assert_relative_eq!(i.shear_y, 30.0);
        assert_relative_eq!(j.shear_y, -30.0);
        assert_relative_eq!(j.moment_z, 0.0);
    }

    #[test]
    fn test_design_forces_envelope() {
        let mut r = simply_supported(10.0, 6.0, 2.0e4);
        // 50 kN compression
        r.end_forces[0] = 50.0;
        r.end_forces[6] = -50.0;
        let d = r.design_forces(5);
        assert_relative_eq!(d.n_compression, 50.0);
        assert_relative_eq!(d.n_tension, 0.0);
        assert_relative_eq!(d.m_major(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(d.v_major, 30.0);
        assert!(d.stations.iter().any(|s| (s.x - 3.0).abs() < 1e-12));
        assert_eq!(d.stations.first().map(|s| s.x), Some(0.0));
    }

    #[test]
    fn test_total_reaction_sums_nodes() {
        let mut result = AnalysisResult {
            combination: "ULS1".into(),
            limit_state: LimitState::Uls,
            displacements: BTreeMap::new(),
            members: BTreeMap::new(),
            reactions: BTreeMap::new(),
        };
        result.reactions.insert("A".into(), Reactions::from_array([1.0, 30.0, 0.0, 0.0, 0.0, 0.0]));
        result.reactions.insert("B".into(), Reactions::from_array([-1.0, 30.0, 0.0, 0.0, 0.0, 2.0]));
        assert_eq!(result.total_reaction(), [0.0, 60.0, 0.0, 0.0, 0.0, 2.0]);
        assert_eq!(result.reaction("C"), Reactions::default());
    }
}
