//! Capacity checks against TCVN design rules
//!
//! Every element kind implements [`CapacityCheck`]. A check receives the
//! demand of one combination and returns the utilization of each failure
//! mode that applies to that combination's limit state: strength modes for
//! ULS, deflection, crack width and span/depth for SLS.

pub mod connection;
pub mod foundation;
pub mod rc_beam;
pub mod rc_column;
pub mod rc_slab;
pub mod shear_wall;
pub mod steel;
pub mod verdict;

pub use connection::{BasePlateSpec, BoltedConnectionSpec, WeldedConnectionSpec};
pub use foundation::{FootingSlab, FootingSpec, PileGroupSpec, StripFootingSpec};
pub use rc_beam::{Environment, RcBeamSpec, Stirrups, SupportCondition};
pub use rc_column::{InteractionDiagram, RcColumnSpec};
pub use rc_slab::{ColumnPosition, RcSlabSpec, SlabColumn};
pub use shear_wall::ShearWallSpec;
pub use steel::{BucklingCurve, SteelMemberSpec};
pub use verdict::{CapacityVerdict, FailureMode, ModeResult, VerdictStatus};

use serde::{Deserialize, Serialize};

use crate::catalog::StandardsCatalog;
use crate::elements::{Material, MemberRole, Section};
use crate::error::{StructError, StructResult};
use crate::loads::{LimitState, LoadCombination};
use crate::results::{DesignForces, MemberForces, Reactions};

/// Forces an element is checked against
#[derive(Debug, Clone, Copy)]
pub enum DemandForces<'a> {
    /// Force envelope along a member
    Member(&'a DesignForces),
    /// Forces at one member end
    MemberEnd(MemberForces),
    /// Reaction at a supported node
    Support(Reactions),
    /// No analysis forces; the check derives its demand from the combination
    None,
}

/// Demand of one element under one combination
#[derive(Debug, Clone, Copy)]
pub struct Demand<'a> {
    pub forces: DemandForces<'a>,
    pub section: Option<&'a Section>,
    pub material: Option<&'a Material>,
    pub role: Option<MemberRole>,
    pub limit_state: LimitState,
    pub combination: &'a LoadCombination,
}

impl<'a> Demand<'a> {
    pub fn new(forces: DemandForces<'a>, combination: &'a LoadCombination) -> Self {
        Self {
            forces,
            section: None,
            material: None,
            role: None,
            limit_state: combination.limit_state,
            combination,
        }
    }

    pub fn with_section(mut self, section: &'a Section) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_material(mut self, material: &'a Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_role(mut self, role: MemberRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_uls(&self) -> bool {
        self.limit_state == LimitState::Uls
    }

    pub fn member_forces(&self) -> StructResult<&'a DesignForces> {
        match self.forces {
            DemandForces::Member(forces) => Ok(forces),
            _ => Err(StructError::config("check needs member forces")),
        }
    }

    pub fn end_forces(&self) -> StructResult<MemberForces> {
        match self.forces {
            DemandForces::MemberEnd(forces) => Ok(forces),
            _ => Err(StructError::config("check needs member end forces")),
        }
    }

    pub fn reaction(&self) -> StructResult<Reactions> {
        match self.forces {
            DemandForces::Support(reaction) => Ok(reaction),
            _ => Err(StructError::config("check needs a support reaction")),
        }
    }

    pub fn section(&self) -> StructResult<&'a Section> {
        self.section
            .ok_or_else(|| StructError::config("check needs the element section"))
    }

    pub fn material(&self) -> StructResult<&'a Material> {
        self.material
            .ok_or_else(|| StructError::config("check needs the element material"))
    }

    pub(crate) fn steel_strength(&self) -> StructResult<(f64, f64)> {
        let material = self.material()?;
        match (material.steel_strength(), material.steel_ultimate()) {
            (Some(f), Some(fu)) => Ok((f, fu)),
            _ => Err(StructError::config(format!(
                "material {} is not a steel grade",
                material.grade().unwrap_or("(elastic)")
            ))),
        }
    }

    pub(crate) fn concrete_strength(&self) -> StructResult<(f64, f64)> {
        let material = self.material()?;
        material.concrete_strength().ok_or_else(|| {
            StructError::config(format!(
                "material {} is not a concrete grade",
                material.grade().unwrap_or("(elastic)")
            ))
        })
    }
}

/// A capacity check for one element kind
pub trait CapacityCheck {
    /// Utilization per failure mode for the demand's limit state
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>>;
}

/// Element design data, one variant per element kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementCheck {
    Steel(SteelMemberSpec),
    RcBeam(RcBeamSpec),
    RcSlab(RcSlabSpec),
    RcColumn(RcColumnSpec),
    ShearWall(ShearWallSpec),
    Bolted(BoltedConnectionSpec),
    Welded(WeldedConnectionSpec),
    BasePlate(BasePlateSpec),
    Footing(FootingSpec),
    StripFooting(StripFootingSpec),
    PileGroup(PileGroupSpec),
}

impl ElementCheck {
    pub fn kind(&self) -> &'static str {
        match self {
            ElementCheck::Steel(_) => "steel_member",
            ElementCheck::RcBeam(_) => "rc_beam",
            ElementCheck::RcSlab(_) => "rc_slab",
            ElementCheck::RcColumn(_) => "rc_column",
            ElementCheck::ShearWall(_) => "shear_wall",
            ElementCheck::Bolted(_) => "bolted_connection",
            ElementCheck::Welded(_) => "welded_connection",
            ElementCheck::BasePlate(_) => "base_plate",
            ElementCheck::Footing(_) => "footing",
            ElementCheck::StripFooting(_) => "strip_footing",
            ElementCheck::PileGroup(_) => "pile_group",
        }
    }

    fn as_check(&self) -> &dyn CapacityCheck {
        match self {
            ElementCheck::Steel(spec) => spec,
            ElementCheck::RcBeam(spec) => spec,
            ElementCheck::RcSlab(spec) => spec,
            ElementCheck::RcColumn(spec) => spec,
            ElementCheck::ShearWall(spec) => spec,
            ElementCheck::Bolted(spec) => spec,
            ElementCheck::Welded(spec) => spec,
            ElementCheck::BasePlate(spec) => spec,
            ElementCheck::Footing(spec) => spec,
            ElementCheck::StripFooting(spec) => spec,
            ElementCheck::PileGroup(spec) => spec,
        }
    }
}

impl CapacityCheck for ElementCheck {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        self.as_check().check(demand, catalog)
    }
}

/// Member end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEnd {
    I,
    J,
}

impl MemberEnd {
    pub fn tag(&self) -> &'static str {
        match self {
            MemberEnd::I => "i",
            MemberEnd::J => "j",
        }
    }
}

/// Where an element's demand comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DesignTarget {
    /// Force envelope of a member
    Member(String),
    /// Forces at one end of a member
    MemberEnd { member: String, end: MemberEnd },
    /// Reaction at a supported node
    Support(String),
    /// Not tied to the frame model
    Standalone,
}

/// One element to check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Element id used in verdicts
    pub id: String,
    pub target: DesignTarget,
    pub check: ElementCheck,
}

impl DesignSpec {
    pub fn member(name: &str, check: ElementCheck) -> Self {
        Self {
            id: name.to_string(),
            target: DesignTarget::Member(name.to_string()),
            check,
        }
    }

    /// Element id is `{member}@i` or `{member}@j`
    pub fn member_end(name: &str, end: MemberEnd, check: ElementCheck) -> Self {
        Self {
            id: format!("{}@{}", name, end.tag()),
            target: DesignTarget::MemberEnd {
                member: name.to_string(),
                end,
            },
            check,
        }
    }

    pub fn support(node: &str, check: ElementCheck) -> Self {
        Self {
            id: node.to_string(),
            target: DesignTarget::Support(node.to_string()),
            check,
        }
    }

    pub fn standalone(id: &str, check: ElementCheck) -> Self {
        Self {
            id: id.to_string(),
            target: DesignTarget::Standalone,
            check,
        }
    }
}

/// Wraps element checks into verdicts
pub struct CheckEngine<'a> {
    catalog: &'a StandardsCatalog,
}

impl<'a> CheckEngine<'a> {
    pub fn new(catalog: &'a StandardsCatalog) -> Self {
        Self { catalog }
    }

    /// Verdicts of one element under one combination
    ///
    /// Modes that belong to the other limit state are discarded.
    pub fn check(
        &self,
        element: &str,
        check: &ElementCheck,
        demand: &Demand,
    ) -> StructResult<Vec<CapacityVerdict>> {
        let modes = check.check(demand, self.catalog)?;
        Ok(modes
            .into_iter()
            .filter(|m| m.mode.limit_state() == demand.limit_state)
            .map(|m| CapacityVerdict::from_mode(element, check.kind(), &demand.combination.label, m))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::loads::{CombinationTerm, LimitState, LoadCategory, LoadCombination};

    /// Combination with the given category factors
    pub fn combo(limit_state: LimitState, terms: &[(LoadCategory, f64)]) -> LoadCombination {
        LoadCombination::new(
            limit_state.label().to_string(),
            limit_state,
            terms
                .iter()
                .map(|&(category, factor)| CombinationTerm {
                    case: category.default_case_name().to_string(),
                    category,
                    factor,
                })
                .collect(),
        )
    }

    pub fn uls() -> LoadCombination {
        combo(LimitState::Uls, &[(LoadCategory::Dead, 1.0)])
    }

    pub fn sls() -> LoadCombination {
        combo(LimitState::Sls, &[(LoadCategory::Dead, 1.0)])
    }
}
