//! Standards catalog - read-only TCVN tables
//!
//! Every code coefficient used by the combination engine and the capacity
//! checks is read from a [`StandardsCatalog`]. The catalog is loaded once,
//! never mutated, and shared by reference (it is `Sync`), so concurrent
//! checks need no locking.
//!
//! A missing entry is always a [`StructError::Lookup`] naming the standard,
//! table and key; no default is ever substituted.

mod records;

pub use records::{
    BearingFactors, BoltGrade, BoltSize, CombinationTemplate, ConcreteGrade, RebarGrade,
    SlabCoefficient, SoilProfile, SteelGrade, SteelProfile, TemplateTerm, WeldElectrode,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::elements::{Material, MaterialKind, Section};
use crate::error::{StructError, StructResult};

/// Embedded TCVN data set
const TCVN_DATA: &str = include_str!("../../data/tcvn_standards.json");

/// Governing standard of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Standard {
    /// Loads and actions
    Tcvn2737,
    /// Concrete and reinforced concrete structures
    Tcvn5574,
    /// Steel structures
    Tcvn5575,
    /// Foundations on natural soil
    Tcvn9362,
    /// Pile foundations
    Tcvn10304,
}

impl Standard {
    /// Identifier used as the top-level key of the coefficient tables
    pub fn id(&self) -> &'static str {
        match self {
            Standard::Tcvn2737 => "TCVN 2737:2023",
            Standard::Tcvn5574 => "TCVN 5574:2018",
            Standard::Tcvn5575 => "TCVN 5575:2024",
            Standard::Tcvn9362 => "TCVN 9362:2012",
            Standard::Tcvn10304 => "TCVN 10304:2014",
        }
    }
}

impl std::fmt::Display for Standard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

fn miss(standard: Standard, table: &str, key: impl Into<String>) -> StructError {
    StructError::Lookup {
        standard: standard.id().to_string(),
        table: table.to_string(),
        key: key.into(),
    }
}

/// Read-only provider of section, material, soil and coefficient tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardsCatalog {
    pub version: String,
    coefficients: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    steel_profiles: BTreeMap<String, SteelProfile>,
    steel_grades: BTreeMap<String, SteelGrade>,
    concrete_grades: BTreeMap<String, ConcreteGrade>,
    rebar_grades: BTreeMap<String, RebarGrade>,
    soils: BTreeMap<String, SoilProfile>,
    bearing_capacity_factors: Vec<BearingFactors>,
    bolt_grades: BTreeMap<String, BoltGrade>,
    bolt_sizes: BTreeMap<String, BoltSize>,
    weld_electrodes: BTreeMap<String, WeldElectrode>,
    slab_coefficients: Vec<SlabCoefficient>,
    load_combinations: Vec<CombinationTemplate>,
}

impl StandardsCatalog {
    /// Load the embedded TCVN data set
    pub fn tcvn() -> StructResult<Self> {
        Self::from_json_str(TCVN_DATA)
    }

    /// Parse a catalog from a JSON document
    pub fn from_json_str(json: &str) -> StructResult<Self> {
        let mut catalog: StandardsCatalog = serde_json::from_str(json)?;
        catalog.normalize();
        Ok(catalog)
    }

    /// Parse a catalog from any reader
    pub fn from_reader<R: Read>(reader: R) -> StructResult<Self> {
        let mut catalog: StandardsCatalog = serde_json::from_reader(reader)?;
        catalog.normalize();
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> StructResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn normalize(&mut self) {
        self.bearing_capacity_factors
            .sort_by(|a, b| a.phi.total_cmp(&b.phi));
        self.slab_coefficients
            .sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    }

    /// Generic scalar lookup: `lookup(standard, table, key)`
    pub fn lookup(&self, standard: Standard, table: &str, key: &str) -> StructResult<f64> {
        self.table(standard, table)?
            .get(key)
            .copied()
            .ok_or_else(|| miss(standard, table, key))
    }

    /// A whole scalar table
    pub fn table(&self, standard: Standard, table: &str) -> StructResult<&BTreeMap<String, f64>> {
        self.coefficients
            .get(standard.id())
            .and_then(|tables| tables.get(table))
            .ok_or_else(|| miss(standard, table, "*"))
    }

    pub fn steel_profile(&self, key: &str) -> StructResult<&SteelProfile> {
        self.steel_profiles
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5575, "steel_profiles", key))
    }

    /// Section properties of a catalog steel profile
    pub fn steel_section(&self, key: &str) -> StructResult<Section> {
        self.steel_profile(key).map(SteelProfile::section)
    }

    pub fn steel_grade(&self, key: &str) -> StructResult<&SteelGrade> {
        self.steel_grades
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5575, "steel_grades", key))
    }

    /// Steel material with design strength f = fy / γM
    pub fn steel_material(&self, key: &str) -> StructResult<Material> {
        let grade = self.steel_grade(key)?;
        let gamma_m = self.lookup(Standard::Tcvn5575, "resistance", "material_factor")?;
        Ok(Material::isotropic(grade.e, grade.nu, grade.unit_weight).with_kind(MaterialKind::Steel {
            grade: key.to_string(),
            f: grade.fy / gamma_m,
            fu: grade.fu,
        }))
    }

    pub fn concrete_grade(&self, key: &str) -> StructResult<&ConcreteGrade> {
        self.concrete_grades
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5574, "concrete_grades", key))
    }

    /// Concrete material carrying its design strengths
    pub fn concrete_material(&self, key: &str) -> StructResult<Material> {
        let grade = self.concrete_grade(key)?;
        Ok(Material::isotropic(grade.eb, grade.nu, grade.unit_weight).with_kind(
            MaterialKind::Concrete {
                grade: key.to_string(),
                rb: grade.rb,
                rbt: grade.rbt,
            },
        ))
    }

    /// Material by grade key, steel grades first
    pub fn material(&self, key: &str) -> StructResult<Material> {
        if self.steel_grades.contains_key(key) {
            self.steel_material(key)
        } else if self.concrete_grades.contains_key(key) {
            self.concrete_material(key)
        } else {
            Err(miss(Standard::Tcvn5575, "materials", key))
        }
    }

    pub fn rebar_grade(&self, key: &str) -> StructResult<&RebarGrade> {
        self.rebar_grades
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5574, "rebar_grades", key))
    }

    pub fn soil(&self, key: &str) -> StructResult<&SoilProfile> {
        self.soils
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn9362, "soils", key))
    }

    /// Bearing capacity factors at friction angle `phi` (degrees).
    ///
    /// Linear interpolation between tabulated angles; an angle outside the
    /// table is a lookup miss.
    pub fn bearing_factors(&self, phi: f64) -> StructResult<BearingFactors> {
        let rows = &self.bearing_capacity_factors;
        let key = || format!("phi={}", phi);
        let upper = rows
            .iter()
            .position(|r| r.phi >= phi - 1e-9)
            .ok_or_else(|| miss(Standard::Tcvn9362, "bearing_capacity_factors", key()))?;
        let hi = rows[upper];
        if (hi.phi - phi).abs() < 1e-9 {
            return Ok(hi);
        }
        if upper == 0 {
            return Err(miss(Standard::Tcvn9362, "bearing_capacity_factors", key()));
        }
        let lo = rows[upper - 1];
        let t = (phi - lo.phi) / (hi.phi - lo.phi);
        Ok(BearingFactors {
            phi,
            nc: lo.nc + t * (hi.nc - lo.nc),
            nq: lo.nq + t * (hi.nq - lo.nq),
            ngamma: lo.ngamma + t * (hi.ngamma - lo.ngamma),
        })
    }

    pub fn bolt_grade(&self, key: &str) -> StructResult<&BoltGrade> {
        self.bolt_grades
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5575, "bolt_grades", key))
    }

    pub fn bolt_size(&self, key: &str) -> StructResult<&BoltSize> {
        self.bolt_sizes
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5575, "bolt_sizes", key))
    }

    pub fn weld_electrode(&self, key: &str) -> StructResult<&WeldElectrode> {
        self.weld_electrodes
            .get(key)
            .ok_or_else(|| miss(Standard::Tcvn5575, "weld_electrodes", key))
    }

    /// Two-way slab coefficients `(alpha_x, alpha_y)` for aspect ratio Ly/Lx
    pub fn slab_coefficients(&self, ratio: f64) -> StructResult<(f64, f64)> {
        let rows = &self.slab_coefficients;
        let key = || format!("ratio={:.3}", ratio);
        let upper = rows
            .iter()
            .position(|r| r.ratio >= ratio - 1e-9)
            .ok_or_else(|| miss(Standard::Tcvn5574, "slab_coefficients", key()))?;
        let hi = rows[upper];
        if (hi.ratio - ratio).abs() < 1e-9 {
            return Ok((hi.alpha_x, hi.alpha_y));
        }
        if upper == 0 {
            return Err(miss(Standard::Tcvn5574, "slab_coefficients", key()));
        }
        let lo = rows[upper - 1];
        let t = (ratio - lo.ratio) / (hi.ratio - lo.ratio);
        Ok((
            lo.alpha_x + t * (hi.alpha_x - lo.alpha_x),
            lo.alpha_y + t * (hi.alpha_y - lo.alpha_y),
        ))
    }

    /// Load combination templates in code order
    pub fn combination_templates(&self) -> &[CombinationTemplate] {
        &self.load_combinations
    }

    /// Basic wind pressure W0 (kPa) for a wind zone
    pub fn wind_pressure(&self, zone: &str) -> StructResult<f64> {
        self.lookup(Standard::Tcvn2737, "wind_pressure", zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn catalog() -> StandardsCatalog {
        StandardsCatalog::tcvn().unwrap()
    }

    #[test]
    fn test_embedded_catalog_parses() {
        let cat = catalog();
        assert!(!cat.combination_templates().is_empty());
        assert_relative_eq!(cat.lookup(Standard::Tcvn5574, "flexure", "eps_b2").unwrap(), 0.0035);
    }

    #[test]
    fn test_lookup_miss_names_key() {
        let err = catalog().steel_section("I999x999").unwrap_err();
        match err {
            StructError::Lookup { table, key, .. } => {
                assert_eq!(table, "steel_profiles");
                assert_eq!(key, "I999x999");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(catalog().lookup(Standard::Tcvn5575, "bolted", "nope").is_err());
        assert!(catalog().soil("peat").is_err());
    }

    #[test]
    fn test_steel_material_design_strength() {
        let m = catalog().steel_material("SS400").unwrap();
        assert_relative_eq!(m.steel_strength().unwrap(), 245000.0 / 1.05, epsilon = 1e-6);
        assert_eq!(m.grade(), Some("SS400"));
    }

    #[test]
    fn test_bearing_factor_interpolation() {
        let cat = catalog();
        let f30 = cat.bearing_factors(30.0).unwrap();
        assert_relative_eq!(f30.nq, 22.46);
        let f32 = cat.bearing_factors(32.5).unwrap();
        assert_relative_eq!(f32.nc, (37.16 + 57.75) / 2.0, epsilon = 1e-9);
        assert!(cat.bearing_factors(50.0).is_err());
        assert!(cat.bearing_factors(-5.0).is_err());
    }

    #[test]
    fn test_slab_coefficients_interpolate() {
        let cat = catalog();
        let (ax, ay) = cat.slab_coefficients(1.0).unwrap();
        assert_relative_eq!(ax, ay);
        let (ax, _) = cat.slab_coefficients(1.25).unwrap();
        assert_relative_eq!(ax, (0.0428 + 0.0452) / 2.0, epsilon = 1e-12);
        assert!(cat.slab_coefficients(2.5).is_err());
    }

    #[test]
    fn test_material_dispatch() {
        let cat = catalog();
        assert!(cat.material("B25").unwrap().concrete_strength().is_some());
        assert!(cat.material("SM490").unwrap().steel_strength().is_some());
        assert!(matches!(cat.material("B99"), Err(StructError::Lookup { .. })));
    }
}
