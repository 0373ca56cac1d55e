//! Reinforced concrete beam checks (TCVN 5574)
//!
//! Flexure uses the rectangular stress block: αm = M/(Rb·b·h0²),
//! ξ = 1 − √(1 − 2αm), As = ξ·Rb·b·h0/Rs. Past αm = 0.5 the closed form has
//! no real root; the required area then grows linearly as (Rb·b·h0/Rs)·2αm so
//! that utilization stays continuous and increasing in the moment.

use serde::{Deserialize, Serialize};

use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult};
use crate::catalog::{RebarGrade, Standard, StandardsCatalog};
use crate::elements::SectionShape;
use crate::error::{StructError, StructResult};

/// Exposure class selecting the crack width limit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[default]
    Normal,
    Humid,
    Aggressive,
}

impl Environment {
    fn key(&self) -> &'static str {
        match self {
            Environment::Normal => "normal",
            Environment::Humid => "humid",
            Environment::Aggressive => "aggressive",
        }
    }
}

/// End conditions selecting the allowable span/depth ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportCondition {
    #[default]
    SimplySupported,
    OneEndContinuous,
    BothEndsContinuous,
    Cantilever,
}

impl SupportCondition {
    fn key(&self) -> &'static str {
        match self {
            SupportCondition::SimplySupported => "simply_supported",
            SupportCondition::OneEndContinuous => "one_end_continuous",
            SupportCondition::BothEndsContinuous => "both_ends_continuous",
            SupportCondition::Cantilever => "cantilever",
        }
    }
}

/// Shear links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stirrups {
    /// Total area of the legs crossing one section (m²)
    pub area: f64,
    /// Spacing along the member (m)
    pub spacing: f64,
    /// Rebar grade key
    pub grade: String,
}

/// Reinforcement of a rectangular RC beam; width and height come from the member section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcBeamSpec {
    /// Distance from the tension face to the bar centroid (m)
    pub cover: f64,
    /// Bottom bars, resisting sagging moment (m²)
    pub as_bottom: f64,
    /// Top bars, resisting hogging moment (m²)
    pub as_top: f64,
    /// Main bar diameter (m)
    pub bar_diameter: f64,
    /// Main bar grade key
    pub rebar: String,
    #[serde(default)]
    pub stirrups: Option<Stirrups>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub support: SupportCondition,
}

impl RcBeamSpec {
    pub fn new(cover: f64, as_bottom: f64, as_top: f64, bar_diameter: f64, rebar: &str) -> Self {
        Self {
            cover,
            as_bottom,
            as_top,
            bar_diameter,
            rebar: rebar.to_string(),
            stirrups: None,
            environment: Environment::Normal,
            support: SupportCondition::SimplySupported,
        }
    }

    pub fn with_stirrups(mut self, area: f64, spacing: f64, grade: &str) -> Self {
        self.stirrups = Some(Stirrups {
            area,
            spacing,
            grade: grade.to_string(),
        });
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_support(mut self, support: SupportCondition) -> Self {
        self.support = support;
        self
    }
}

/// A rectangular section strip under bending
#[derive(Debug, Clone, Copy)]
pub(crate) struct RcStrip {
    pub b: f64,
    pub h: f64,
    pub h0: f64,
    pub rb: f64,
    pub eb: f64,
}

/// Required tension steel and utilization of a rectangular section
pub(crate) fn flexure(
    strip: &RcStrip,
    m: f64,
    as_prov: f64,
    rebar: &RebarGrade,
    catalog: &StandardsCatalog,
) -> StructResult<ModeResult> {
    let lookup = |key: &str| catalog.lookup(Standard::Tcvn5574, "flexure", key);
    let omega = lookup("block_depth_factor")?;
    let eps_b2 = lookup("eps_b2")?;
    let mu_min = lookup("mu_min")?;

    let RcStrip { b, h0, rb, .. } = *strip;
    let m = m.abs();
    let alpha_m = m / (rb * b * h0 * h0);
    let (xi, as_calc) = if alpha_m < 0.5 {
        let xi = 1.0 - (1.0 - 2.0 * alpha_m).sqrt();
        (xi, xi * rb * b * h0 / rebar.rs)
    } else {
        (1.0, rb * b * h0 / rebar.rs * 2.0 * alpha_m)
    };
    let as_req = as_calc.max(mu_min * b * h0);

    let xi_r = omega / (1.0 + rebar.yield_strain() / eps_b2);
    let alpha_r = xi_r * (1.0 - xi_r / 2.0);
    let mut u = ratio(as_req, as_prov);
    if xi > xi_r {
        u = u.max(m / (alpha_r * rb * b * h0 * h0));
    }

    Ok(ModeResult::new(FailureMode::Flexure, u)
        .with("alpha_m", alpha_m)
        .with("xi", xi)
        .with("xi_r", xi_r)
        .with("as_req", as_req)
        .with("as_prov", as_prov))
}

/// Crack width of a cracked rectangular section (mm) against the environment limit
pub(crate) fn crack_width(
    strip: &RcStrip,
    m: f64,
    as_prov: f64,
    bar_diameter: f64,
    rebar: &RebarGrade,
    environment: Environment,
    catalog: &StandardsCatalog,
) -> StructResult<ModeResult> {
    let lookup = |key: &str| catalog.lookup(Standard::Tcvn5574, "crack", key);
    let limit = catalog.lookup(Standard::Tcvn5574, "crack_width_limit_mm", environment.key())?;
    let m = m.abs();
    if m == 0.0 {
        return Ok(ModeResult::new(FailureMode::CrackWidth, 0.0).with("limit_mm", limit));
    }
    if as_prov <= 0.0 {
        return Ok(ModeResult::new(FailureMode::CrackWidth, f64::INFINITY).with("limit_mm", limit));
    }

    let RcStrip { b, h, h0, eb, .. } = *strip;
    let cover = h - h0;

    // Cracked elastic neutral axis
    let n = rebar.es / eb;
    let n_rho = n * as_prov / (b * h0);
    let x = h0 * ((n_rho * n_rho + 2.0 * n_rho).sqrt() - n_rho);
    let z = h0 - x / 3.0;
    let sigma_s = m / (as_prov * z);

    // Bar spacing from the tension zone area
    let tension_depth = (h - x).clamp(2.0 * cover, 0.5 * h);
    let raw = 0.5 * b * tension_depth / as_prov * bar_diameter;
    let lower = (lookup("min_spacing_bar_multiple")? * bar_diameter).max(lookup("min_spacing")?);
    let upper = (lookup("max_spacing_bar_multiple")? * bar_diameter).min(lookup("max_spacing")?);
    let ls = raw.max(lower).min(upper.max(lower));

    let factors = lookup("phi_1")? * lookup("phi_2")? * lookup("phi_3")? * lookup("psi_s")?;
    let acrc_mm = factors * sigma_s / rebar.es * ls * 1000.0;

    Ok(ModeResult::new(FailureMode::CrackWidth, acrc_mm / limit)
        .with("acrc_mm", acrc_mm)
        .with("limit_mm", limit)
        .with("sigma_s", sigma_s)
        .with("x", x))
}

pub(crate) fn rectangle(demand: &Demand) -> StructResult<(f64, f64)> {
    match demand.section()?.shape {
        SectionShape::Rectangular { width, height } => Ok((width, height)),
        _ => Err(StructError::config("RC checks need a rectangular section")),
    }
}

impl CapacityCheck for RcBeamSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        let forces = demand.member_forces()?;
        let (b, h) = rectangle(demand)?;
        let (rb, rbt) = demand.concrete_strength()?;
        let rebar = catalog.rebar_grade(&self.rebar)?;
        let h0 = h - self.cover;
        if h0 <= 0.0 {
            return Err(StructError::config(format!(
                "cover {} exceeds section height {}",
                self.cover, h
            )));
        }
        let strip = RcStrip {
            b,
            h,
            h0,
            rb,
            eb: demand.material()?.e,
        };

        if !demand.is_uls() {
            let sag = crack_width(&strip, forces.m_sagging, self.as_bottom, self.bar_diameter, rebar, self.environment, catalog)?;
            let hog = crack_width(&strip, forces.m_hogging, self.as_top, self.bar_diameter, rebar, self.environment, catalog)?;
            let crack = if hog.utilization > sag.utilization { hog } else { sag };

            let allowable = catalog.lookup(Standard::Tcvn5574, "span_depth_ratio", self.support.key())?;
            let slenderness = forces.length / h0;
            let span_depth = ModeResult::new(FailureMode::SpanDepth, slenderness / allowable)
                .with("span_depth", slenderness)
                .with("allowable", allowable);
            return Ok(vec![crack, span_depth]);
        }

        // Sagging against bottom bars, hogging against top bars
        let mut faces = Vec::new();
        if forces.m_sagging > 0.0 {
            faces.push(flexure(&strip, forces.m_sagging, self.as_bottom, rebar, catalog)?);
        }
        if forces.m_hogging > 0.0 {
            faces.push(flexure(&strip, forces.m_hogging, self.as_top, rebar, catalog)?);
        }
        let flex = faces
            .into_iter()
            .reduce(|a, b| if b.utilization > a.utilization { b } else { a })
            .unwrap_or_else(|| ModeResult::new(FailureMode::Flexure, 0.0));

        // Shear over an inclined section of projection 2·h0
        let lookup = |key: &str| catalog.lookup(Standard::Tcvn5574, "shear", key);
        let q = forces.v_major;
        let q_b = 0.5 * lookup("phi_b2")? * rbt * b * h0;
        let q_sw = match &self.stirrups {
            Some(s) if s.spacing > 0.0 => {
                let rsw = catalog.rebar_grade(&s.grade)?.rsw;
                2.0 * lookup("phi_sw")? * rsw * s.area * h0 / s.spacing
            }
            _ => 0.0,
        };
        let strut = lookup("phi_b1")? * rb * b * h0;
        let u_shear = ratio(q, q_b + q_sw).max(ratio(q, strut));
        let shear = ModeResult::new(FailureMode::Shear, u_shear)
            .with("q_b", q_b)
            .with("q_sw", q_sw)
            .with("q_strut", strut);

        Ok(vec![flex, shear])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::test_support::{sls, uls};
    use crate::design::DemandForces;
    use crate::elements::Section;
    use crate::results::{DesignForces, MemberResult};
    use approx::assert_relative_eq;

    fn beam_forces(m: f64, v: f64, length: f64) -> DesignForces {
        // Simply supported span carrying a uniform load that produces M and V
        let w = 8.0 * m / (length * length);
        let mut end_forces = [0.0; 12];
        end_forces[1] = w * length / 2.0;
        end_forces[7] = w * length / 2.0;
        let mut forces = MemberResult {
            end_forces,
            w_local: [0.0, -w, 0.0],
            length,
            ei_major: 0.0,
            ei_minor: 0.0,
        }
        .design_forces(11);
        forces.v_major = v;
        forces
    }

    fn utilization(results: &[ModeResult], mode: FailureMode) -> f64 {
        results.iter().find(|r| r.mode == mode).unwrap().utilization
    }

    #[test]
    fn test_flexure_required_steel() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let rebar = cat.rebar_grade("CB400-V").unwrap();
        let strip = RcStrip {
            b: 0.3,
            h: 0.5,
            h0: 0.46,
            rb: 14500.0,
            eb: 3.0e7,
        };
        let result = flexure(&strip, 150.0, 0.001, rebar, &cat).unwrap();
        let alpha_m: f64 = 150.0 / (14500.0 * 0.3 * 0.46 * 0.46);
        let xi = 1.0 - (1.0 - 2.0 * alpha_m).sqrt();
        let as_req = xi * 14500.0 * 0.3 * 0.46 / 350e3;
        assert_relative_eq!(result.quantity("as_req").unwrap(), as_req, epsilon = 1e-12);
        assert_relative_eq!(result.utilization, as_req / 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_doubling_moment_never_reduces_utilization() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = Section::rectangular(0.3, 0.5);
        let concrete = cat.concrete_material("B25").unwrap();
        let spec = RcBeamSpec::new(0.04, 0.0012, 0.0006, 0.02, "CB400-V");
        let combo = uls();

        let mut previous = 0.0;
        let mut m = 10.0;
        while m < 5000.0 {
            let forces = beam_forces(m, 0.0, 6.0);
            let demand = Demand::new(DemandForces::Member(&forces), &combo)
                .with_section(&section)
                .with_material(&concrete);
            let u = utilization(&spec.check(&demand, &cat).unwrap(), FailureMode::Flexure);
            assert!(u >= previous, "u({m}) = {u} < {previous}");
            previous = u;
            m *= 2.0;
        }
        assert!(previous > 1.0);
    }

    #[test]
    fn test_shear_capacity_with_stirrups() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = Section::rectangular(0.3, 0.5);
        let concrete = cat.concrete_material("B25").unwrap();
        let forces = beam_forces(50.0, 120.0, 6.0);
        let combo = uls();
        let demand = Demand::new(DemandForces::Member(&forces), &combo)
            .with_section(&section)
            .with_material(&concrete);

        let plain = RcBeamSpec::new(0.04, 0.0012, 0.0006, 0.02, "CB400-V");
        let linked = plain.clone().with_stirrups(2.0 * 5.03e-5, 0.15, "CB240-T");
        let u_plain = utilization(&plain.check(&demand, &cat).unwrap(), FailureMode::Shear);
        let u_linked = utilization(&linked.check(&demand, &cat).unwrap(), FailureMode::Shear);

        let q_b = 0.5 * 1.5 * 1050.0 * 0.3 * 0.46;
        assert_relative_eq!(u_plain, 120.0 / q_b, epsilon = 1e-9);
        assert!(u_linked < u_plain);
    }

    #[test]
    fn test_serviceability_modes() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = Section::rectangular(0.3, 0.5);
        let concrete = cat.concrete_material("B25").unwrap();
        let forces = beam_forces(80.0, 0.0, 6.0);
        let combo = sls();
        let demand = Demand::new(DemandForces::Member(&forces), &combo)
            .with_section(&section)
            .with_material(&concrete);

        let spec = RcBeamSpec::new(0.04, 0.0012, 0.0006, 0.02, "CB400-V");
        let results = spec.check(&demand, &cat).unwrap();
        let crack = results.iter().find(|r| r.mode == FailureMode::CrackWidth).unwrap();
        assert!(crack.quantity("acrc_mm").unwrap() > 0.0);
        assert_relative_eq!(crack.quantity("limit_mm").unwrap(), 0.4);
        assert_relative_eq!(
            utilization(&results, FailureMode::SpanDepth),
            (6.0 / 0.46) / 20.0,
            epsilon = 1e-12
        );

        let humid = spec.with_environment(Environment::Humid).check(&demand, &cat).unwrap();
        assert!(utilization(&humid, FailureMode::CrackWidth) > crack.utilization);
    }

    #[test]
    fn test_non_rectangular_section_rejected() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = cat.steel_section("I300x150").unwrap();
        let concrete = cat.concrete_material("B25").unwrap();
        let forces = beam_forces(50.0, 10.0, 6.0);
        let combo = uls();
        let demand = Demand::new(DemandForces::Member(&forces), &combo)
            .with_section(&section)
            .with_material(&concrete);
        let err = RcBeamSpec::new(0.04, 0.001, 0.001, 0.02, "CB400-V")
            .check(&demand, &cat)
            .unwrap_err();
        assert!(matches!(err, StructError::Configuration(_)));
    }
}
