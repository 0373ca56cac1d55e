//! Bolted, welded and base plate connections (TCVN 5575)

use serde::{Deserialize, Serialize};

use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult};
use crate::catalog::{Standard, StandardsCatalog};
use crate::error::{StructError, StructResult};

/// Bolt group at a member end; every bolt takes an equal share of the forces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltedConnectionSpec {
    pub bolts: usize,
    /// Bolt size key, e.g. `M20`
    pub size: String,
    /// Strength class key, e.g. `8.8`
    pub grade: String,
    pub shear_planes: usize,
    /// Smallest total thickness of plies bearing in one direction (m)
    pub ply_thickness: f64,
    /// Steel grade of the connected plies
    pub plate_grade: String,
}

impl BoltedConnectionSpec {
    pub fn new(bolts: usize, size: &str, grade: &str) -> Self {
        Self {
            bolts,
            size: size.to_string(),
            grade: grade.to_string(),
            shear_planes: 1,
            ply_thickness: 0.01,
            plate_grade: "SS400".to_string(),
        }
    }

    pub fn with_shear_planes(mut self, planes: usize) -> Self {
        self.shear_planes = planes;
        self
    }

    pub fn with_plies(mut self, thickness: f64, grade: &str) -> Self {
        self.ply_thickness = thickness;
        self.plate_grade = grade.to_string();
        self
    }
}

impl CapacityCheck for BoltedConnectionSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        if self.bolts == 0 {
            return Err(StructError::config("bolt group has no bolts"));
        }
        let forces = demand.end_forces()?;
        let size = catalog.bolt_size(&self.size)?;
        let grade = catalog.bolt_grade(&self.grade)?;
        let fu = catalog.steel_grade(&self.plate_grade)?.fu;
        let gamma_b = catalog.lookup(Standard::Tcvn5575, "bolted", "gamma_b")?;
        let bearing_factor = catalog.lookup(Standard::Tcvn5575, "bolted", "bearing_factor")?;

        let n = self.bolts as f64;
        let v = forces.shear() / n;
        let t = forces.axial.max(0.0) / n;

        let n_vb = grade.fvb * gamma_b * size.a * self.shear_planes as f64;
        let n_cb = bearing_factor * fu * size.d * self.ply_thickness * gamma_b;
        let n_tb = grade.ftb * size.abn;
        let combined = (ratio(v, n_vb.min(n_cb)).powi(2) + ratio(t, n_tb).powi(2)).sqrt();

        Ok(vec![
            ModeResult::new(FailureMode::BoltShear, ratio(v, n_vb))
                .with("v_bolt", v)
                .with("n_vb", n_vb),
            ModeResult::new(FailureMode::BoltBearing, ratio(v, n_cb))
                .with("v_bolt", v)
                .with("n_cb", n_cb),
            ModeResult::new(FailureMode::BoltTension, ratio(t, n_tb))
                .with("t_bolt", t)
                .with("n_tb", n_tb),
            ModeResult::new(FailureMode::BoltCombined, combined),
        ])
    }
}

/// Fillet weld group at a member end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldedConnectionSpec {
    /// Electrode key, e.g. `N42`
    pub electrode: String,
    /// Leg size hf (m)
    pub leg: f64,
    /// Total effective length (m)
    pub length: f64,
    /// Steel grade of the base metal
    pub base_metal: String,
}

impl WeldedConnectionSpec {
    pub fn new(electrode: &str, leg: f64, length: f64) -> Self {
        Self {
            electrode: electrode.to_string(),
            leg,
            length,
            base_metal: "SS400".to_string(),
        }
    }

    pub fn with_base_metal(mut self, grade: &str) -> Self {
        self.base_metal = grade.to_string();
        self
    }
}

impl CapacityCheck for WeldedConnectionSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        let forces = demand.end_forces()?;
        let fwf = catalog.weld_electrode(&self.electrode)?.fwf;
        let fu = catalog.steel_grade(&self.base_metal)?.fu;
        let lookup = |key: &str| catalog.lookup(Standard::Tcvn5575, "weld", key);

        // Weld metal and fusion boundary sections
        let throat = lookup("beta_f")? * self.leg * self.length * fwf;
        let fusion = lookup("beta_s")? * self.leg * self.length * lookup("fusion_ratio")? * fu;
        let capacity = throat.min(fusion) * lookup("gamma_c")?;

        let resultant = (forces.axial.powi(2) + forces.shear_y.powi(2) + forces.shear_z.powi(2)).sqrt();
        Ok(vec![ModeResult::new(FailureMode::WeldStrength, ratio(resultant, capacity))
            .with("force", resultant)
            .with("throat", throat)
            .with("fusion", fusion)])
    }
}

/// Column base plate on a concrete pedestal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePlateSpec {
    /// Plate width B (m)
    pub width: f64,
    /// Plate length L in the bending direction (m)
    pub length: f64,
    pub thickness: f64,
    /// Plate steel grade key
    pub grade: String,
    /// Pedestal concrete grade key
    pub concrete: String,
}

impl BasePlateSpec {
    pub fn new(width: f64, length: f64, thickness: f64, grade: &str, concrete: &str) -> Self {
        Self {
            width,
            length,
            thickness,
            grade: grade.to_string(),
            concrete: concrete.to_string(),
        }
    }
}

impl CapacityCheck for BasePlateSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        let reaction = demand.reaction()?;
        let column = demand.section()?;
        let rb = catalog.concrete_grade(&self.concrete)?.rb;
        let f = catalog
            .steel_material(&self.grade)?
            .steel_strength()
            .ok_or_else(|| StructError::config(format!("{} is not a plate steel", self.grade)))?;
        let lookup = |key: &str| catalog.lookup(Standard::Tcvn5575, "base_plate", key);

        let (b, l) = (self.width, self.length);
        let p = reaction.fy.max(0.0);
        let m = reaction.overturning();
        let q = p / (b * l) + 6.0 * m / (b * l * l);
        let q_allow = lookup("local_bearing_factor")? * rb;

        // Plate cantilever beyond the column flange
        let overhang = ((l - lookup("cantilever_depth_factor")? * column.depth) / 2.0).max(0.0);
        let m_plate = q * overhang * overhang / 2.0;
        let t_req = (6.0 * m_plate / f).sqrt();

        Ok(vec![
            ModeResult::new(FailureMode::BasePlateBearing, ratio(q, q_allow))
                .with("q", q)
                .with("q_allow", q_allow),
            ModeResult::new(FailureMode::BasePlateThickness, ratio(t_req, self.thickness))
                .with("t_req", t_req)
                .with("overhang", overhang),
        ])
    }
}
