//! vietstruct - frame analysis and TCVN capacity verification
//!
//! This library analyses building frames and checks their elements against
//! the Vietnamese design standards:
//! - Standards catalog (sections, materials, soils, code coefficients)
//! - Load combinations per TCVN 2737
//! - Building model generation from a column grid
//! - Linear static 3D frame analysis
//! - Steel (TCVN 5575), reinforced concrete (TCVN 5574), connection and
//!   foundation (TCVN 9362, TCVN 10304) checks
//! - Governing-verdict aggregation
//!
//! ## Units
//!
//! | Quantity | Unit |
//! |---|---|
//! | Force | kN |
//! | Length | m |
//! | Moment | kN·m |
//! | Stress, pressure, modulus | kPa |
//! | Area | m² |
//! | Distributed load | kN/m |
//! | Unit weight | kN/m³ |
//!
//! The global Y axis is vertical.
//!
//! ## Example
//! ```rust,no_run
//! use vietstruct::prelude::*;
//!
//! let catalog = StandardsCatalog::tcvn()?;
//!
//! let input = DesignInput {
//!     layout: BuildingLayout::uniform(2, 6.0, 1, 5.0, 1, 3.6),
//!     roles: RoleAssignments::new()
//!         .with(MemberRole::Column, RoleAssignment::profile("H250x250", "SS400"))
//!         .with(MemberRole::PrimaryBeam, RoleAssignment::profile("I400x200", "SS400"))
//!         .with(MemberRole::SecondaryBeam, RoleAssignment::profile("I300x150", "SS400")),
//!     loads: LoadIntensities::new()
//!         .with_area(LoadCategory::Dead, 4.0)
//!         .with_area(LoadCategory::Live, 2.0),
//!     role_checks: [(MemberRole::PrimaryBeam, ElementCheck::Steel(SteelMemberSpec::new()))].into(),
//!     elements: Vec::new(),
//!     options: AnalysisOptions::default(),
//! };
//!
//! let report = run_design(&input, &catalog)?;
//! for verdict in &report.summary.failing {
//!     println!("{} {:?} u={:.2}", verdict.element, verdict.mode, verdict.utilization);
//! }
//! # Ok::<(), vietstruct::error::StructError>(())
//! ```

pub mod aggregate;
pub mod analysis;
pub mod builder;
pub mod catalog;
pub mod design;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::aggregate::{DesignSummary, ResultAggregator};
    pub use crate::analysis::{AnalysisOptions, FemSolver};
    pub use crate::builder::{
        BeamDirection, BuildingLayout, LoadIntensities, RoleAssignment, RoleAssignments,
        SectionSpec, StructuralModelBuilder, WindInput,
    };
    pub use crate::catalog::{Standard, StandardsCatalog};
    pub use crate::design::{
        BasePlateSpec, BoltedConnectionSpec, CapacityCheck, CapacityVerdict, ColumnPosition,
        DesignSpec, ElementCheck, FailureMode, FootingSlab, FootingSpec, MemberEnd, PileGroupSpec,
        RcBeamSpec, RcColumnSpec, RcSlabSpec, ShearWallSpec, SteelMemberSpec, StripFootingSpec,
        VerdictStatus, WeldedConnectionSpec,
    };
    pub use crate::elements::{Material, Member, MemberReleases, MemberRole, Node, Section, Support};
    pub use crate::error::{StructError, StructResult};
    pub use crate::loads::{
        DistributedLoad, LimitState, LoadCase, LoadCaseSet, LoadCategory, LoadCombination,
        LoadCombinationEngine, LoadDirection, NodeLoad,
    };
    pub use crate::model::FEModel;
    pub use crate::pipeline::{run_design, run_model, DesignInput, DesignReport, UnitFailure};
    pub use crate::results::{AnalysisResult, DesignForces, MemberForces, NodeDisplacement, Reactions};
}
