//! Typed records of the catalog tables
//!
//! All values are in the crate's units (kN, m, kPa).

use serde::{Deserialize, Serialize};

use crate::elements::Section;
use crate::loads::{LimitState, LoadCategory};

/// Rolled or welded steel profile dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape")]
pub enum SteelProfile {
    I { h: f64, b: f64, tw: f64, tf: f64 },
    Box { h: f64, b: f64, t: f64 },
}

impl SteelProfile {
    /// Section properties derived from the profile dimensions
    pub fn section(&self) -> Section {
        match *self {
            SteelProfile::I { h, b, tw, tf } => Section::i_shape(h, b, tw, tf),
            SteelProfile::Box { h, b, t } => Section::box_section(h, b, t),
        }
    }
}

/// Structural steel grade (yield/ultimate strength, stiffness)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteelGrade {
    pub fy: f64,
    pub fu: f64,
    pub e: f64,
    pub nu: f64,
    pub unit_weight: f64,
}

/// Concrete grade design strengths and modulus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteGrade {
    pub rb: f64,
    pub rbt: f64,
    pub eb: f64,
    pub nu: f64,
    pub unit_weight: f64,
}

/// Reinforcing bar grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarGrade {
    /// Tension design strength
    pub rs: f64,
    /// Compression design strength
    pub rsc: f64,
    /// Stirrup design strength
    pub rsw: f64,
    pub es: f64,
}

impl RebarGrade {
    /// Yield strain in tension
    pub fn yield_strain(&self) -> f64 {
        self.rs / self.es
    }
}

/// Soil parameters for shallow and pile foundations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    pub name: String,
    /// Friction angle (degrees)
    pub phi: f64,
    /// Cohesion (kPa)
    pub cohesion: f64,
    /// Unit weight (kN/m³)
    pub unit_weight: f64,
    /// Unit end-bearing resistance at the pile tip (kPa)
    pub pile_base_resistance: f64,
    /// Unit shaft friction along the pile (kPa)
    pub pile_shaft_friction: f64,
}

/// Bearing capacity factors for one friction angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingFactors {
    pub phi: f64,
    pub nc: f64,
    pub nq: f64,
    pub ngamma: f64,
}

/// Bolt strength class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltGrade {
    /// Shear design strength
    pub fvb: f64,
    /// Tension design strength
    pub ftb: f64,
}

/// Bolt diameter and areas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltSize {
    pub d: f64,
    /// Gross shank area
    pub a: f64,
    /// Net (threaded) area
    pub abn: f64,
}

/// Weld metal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeldElectrode {
    /// Weld metal design strength
    pub fwf: f64,
}

/// Two-way slab moment coefficients for one aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabCoefficient {
    pub ratio: f64,
    pub alpha_x: f64,
    pub alpha_y: f64,
}

/// One term of a combination template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTerm {
    pub category: LoadCategory,
    pub factor: f64,
    /// The template only applies when this category is present
    #[serde(default)]
    pub required: bool,
    /// The term is generated with both signs
    #[serde(default)]
    pub reversible: bool,
}

/// A load combination template from the load code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationTemplate {
    pub label: String,
    pub limit_state: LimitState,
    pub terms: Vec<TemplateTerm>,
}
