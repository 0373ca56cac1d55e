//! Steel member checks (TCVN 5575)

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult};
use crate::catalog::{Standard, StandardsCatalog};
use crate::elements::{Material, MemberRole, Section, SectionShape};
use crate::error::StructResult;

/// Column buckling curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucklingCurve {
    A,
    #[default]
    B,
    C,
    D,
}

impl BucklingCurve {
    fn key(&self) -> &'static str {
        match self {
            BucklingCurve::A => "a",
            BucklingCurve::B => "b",
            BucklingCurve::C => "c",
            BucklingCurve::D => "d",
        }
    }
}

/// Design data for a steel beam, column or brace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteelMemberSpec {
    /// Effective length factor μ for buckling about the strong axis
    pub mu_major: f64,
    /// Effective length factor μ for buckling about the weak axis
    pub mu_minor: f64,
    /// Unbraced length (m); the member length when absent
    pub unbraced_length: Option<f64>,
    pub curve: BucklingCurve,
    /// Compression flange held along its length, e.g. by a slab
    pub lateral_restraint: bool,
}

impl Default for SteelMemberSpec {
    fn default() -> Self {
        Self {
            mu_major: 1.0,
            mu_minor: 1.0,
            unbraced_length: None,
            curve: BucklingCurve::B,
            lateral_restraint: false,
        }
    }
}

impl SteelMemberSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effective_length(mut self, mu_major: f64, mu_minor: f64) -> Self {
        self.mu_major = mu_major;
        self.mu_minor = mu_minor;
        self
    }

    pub fn with_unbraced_length(mut self, length: f64) -> Self {
        self.unbraced_length = Some(length);
        self
    }

    pub fn with_curve(mut self, curve: BucklingCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_lateral_restraint(mut self) -> Self {
        self.lateral_restraint = true;
        self
    }
}

/// Elastic critical moment of a doubly symmetric I-section over `length`
///
/// Mcr = C1·√(π²EIy/L² · (GJ + π²EIw/L²)) with Iw = Iy·(h - tf)²/4. Other
/// shapes are not prone to lateral-torsional buckling and give `None`.
pub fn critical_moment(section: &Section, material: &Material, length: f64, c1: f64) -> Option<f64> {
    let SectionShape::IShape {
        height,
        flange_thickness,
        ..
    } = section.shape
    else {
        return None;
    };
    let iw = section.iy * (height - flange_thickness).powi(2) / 4.0;
    let l2 = length * length;
    let euler = PI * PI * material.e * section.iy / l2;
    Some(c1 * (euler * (material.g * section.j + PI * PI * material.e * iw / l2)).sqrt())
}

/// Buckling reduction factor φ
pub fn buckling_factor(lambda_bar: f64, alpha: f64, lambda_0: f64, phi_min: f64) -> f64 {
    let big_phi = 0.5 * (1.0 + alpha * (lambda_bar - lambda_0) + lambda_bar * lambda_bar);
    let root = (big_phi * big_phi - lambda_bar * lambda_bar).max(0.0).sqrt();
    (1.0 / (big_phi + root)).clamp(phi_min, 1.0)
}

impl CapacityCheck for SteelMemberSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        let forces = demand.member_forces()?;
        let section = demand.section()?;
        let material = demand.material()?;
        let (f, _) = demand.steel_strength()?;
        let lookup = |table: &str, key: &str| catalog.lookup(Standard::Tcvn5575, table, key);

        if !demand.is_uls() {
            let role = demand.role.unwrap_or(MemberRole::Generic);
            if role == MemberRole::Column {
                return Ok(Vec::new());
            }
            let limit_ratio = lookup("deflection_limit", &format!("{:?}", role))?;
            let allowable = forces.length / limit_ratio;
            let deflection = forces.deflection_major.max(forces.deflection_minor);
            return Ok(vec![ModeResult::new(FailureMode::Deflection, ratio(deflection, allowable))
                .with("deflection", deflection)
                .with("allowable", allowable)]);
        }

        let gamma_c = lookup("resistance", "gamma_c")?;
        let fv = lookup("resistance", "shear_ratio")? * f;
        let threshold = lookup("resistance", "shear_interaction_threshold")?;

        // Shear
        let v_cap_major = section.shear_area_major() * fv * gamma_c;
        let v_cap_minor = section.shear_area_minor() * fv * gamma_c;
        let u_shear = ratio(forces.v_major, v_cap_major).max(ratio(forces.v_minor, v_cap_minor));

        // Bending resistance reduced for high shear
        let shear_share = ratio(forces.v_major, v_cap_major);
        let rho = if shear_share > threshold {
            (2.0 * shear_share - 1.0).powi(2).min(1.0)
        } else {
            0.0
        };
        let n_cap = section.a * f * gamma_c;
        let mz_cap = section.wz * f * gamma_c * (1.0 - rho);
        let my_cap = section.wy * f * gamma_c;

        let u_strength = forces
            .stations
            .iter()
            .map(|s| ratio(s.axial, n_cap) + ratio(s.moment_z, mz_cap) + ratio(s.moment_y, my_cap))
            .fold(0.0, f64::max);

        let mut results = vec![
            ModeResult::new(FailureMode::Strength, u_strength)
                .with("n_cap", n_cap)
                .with("mz_cap", mz_cap)
                .with("my_cap", my_cap)
                .with("rho", rho),
            ModeResult::new(FailureMode::Shear, u_shear)
                .with("v_cap_major", v_cap_major)
                .with("v_cap_minor", v_cap_minor),
        ];

        // Lateral-torsional buckling of an unrestrained I-section
        let m_major = forces.m_major();
        if m_major > 0.0 && !self.lateral_restraint {
            let length = self.unbraced_length.unwrap_or(forces.length);
            let lt = |key: &str| lookup("lateral_torsional", key);
            if let Some(m_cr) = critical_moment(section, material, length, lt("c1")?) {
                let lambda_lt = (section.wz * f / m_cr).sqrt();
                let phi_min = lookup("buckling", "phi_min")?;
                let phi_b = buckling_factor(lambda_lt, lt("alpha")?, lt("lambda_0")?, phi_min);
                let u_lt = ratio(m_major, phi_b * mz_cap) + ratio(forces.m_minor, my_cap);
                results.push(
                    ModeResult::new(FailureMode::LateralTorsional, u_lt)
                        .with("m_cr", m_cr)
                        .with("lambda_lt", lambda_lt)
                        .with("phi_b", phi_b),
                );
            }
        }

        // Flexural buckling under compression
        let n = forces.n_compression;
        if n > 0.0 {
            let e = material.e;
            let length = self.unbraced_length.unwrap_or(forces.length);
            let alpha = lookup("buckling_curve_alpha", self.curve.key())?;
            let lambda_0 = lookup("buckling", "lambda_0")?;
            let phi_min = lookup("buckling", "phi_min")?;

            let axis = |mu: f64, inertia: f64, radius: f64| {
                let le = mu * length;
                let lambda = le / radius;
                let lambda_bar = lambda / (PI * (e / f).sqrt());
                let n_e = PI * PI * e * inertia / (le * le);
                (lambda_bar, buckling_factor(lambda_bar, alpha, lambda_0, phi_min), n_e)
            };
            let (lb_major, phi_major, ne_major) = axis(self.mu_major, section.iz, section.r_major());
            let (lb_minor, phi_minor, ne_minor) = axis(self.mu_minor, section.iy, section.r_minor());
            let phi = phi_major.min(phi_minor);
            let lambda_bar = lb_major.max(lb_minor);

            let amplified = |m: f64, m_cap: f64, n_e: f64| {
                if m == 0.0 {
                    0.0
                } else if n >= n_e {
                    f64::INFINITY
                } else {
                    ratio(m, m_cap) / (1.0 - n / n_e)
                }
            };
            let u_buckling = ratio(n, phi * n_cap)
                + amplified(forces.m_major(), mz_cap, ne_major)
                + amplified(forces.m_minor, my_cap, ne_minor);
            // Above the Euler load the member is unstable regardless of moment
            let u_buckling = if n >= ne_major.min(ne_minor) {
                u_buckling.max(n / ne_major.min(ne_minor))
            } else {
                u_buckling
            };

            results.push(
                ModeResult::new(FailureMode::Buckling, u_buckling)
                    .with("lambda_bar", lambda_bar)
                    .with("phi", phi)
                    .with("n_e", ne_major.min(ne_minor)),
            );
        }

        Ok(results)
    }
}
