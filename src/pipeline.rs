//! One-shot design run: build, solve every combination, check every element, aggregate
//!
//! A failing combination or element check is recorded as a [`UnitFailure`]
//! and the rest of the run proceeds. Errors that leave no model to analyse
//! (layout, role assignment, geometry) abort the run.

use std::collections::BTreeMap;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DesignSummary, ResultAggregator};
use crate::analysis::{AnalysisOptions, FemSolver};
use crate::builder::{BuildingLayout, LoadIntensities, RoleAssignments, StructuralModelBuilder};
use crate::catalog::StandardsCatalog;
use crate::design::{
    CapacityVerdict, CheckEngine, Demand, DemandForces, DesignSpec, DesignTarget, ElementCheck,
    MemberEnd,
};
use crate::elements::{Member, MemberRole, Section};
use crate::error::{StructError, StructResult};
use crate::loads::{LoadCaseSet, LoadCombination, LoadCombinationEngine};
use crate::model::FEModel;
use crate::results::AnalysisResult;

/// Everything needed for a design run, deserializable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInput {
    pub layout: BuildingLayout,
    pub roles: RoleAssignments,
    pub loads: LoadIntensities,
    /// Check applied to every generated member of a role
    #[serde(default)]
    pub role_checks: BTreeMap<MemberRole, ElementCheck>,
    /// Individually targeted elements: connections, supports, slabs
    #[serde(default)]
    pub elements: Vec<DesignSpec>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// A combination solve or element check that did not complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub combination: Option<String>,
    pub element: Option<String>,
    /// Error kind, see [`StructError::kind`]
    pub kind: String,
    pub message: String,
}

impl UnitFailure {
    fn new(combination: Option<&str>, element: Option<&str>, error: &StructError) -> Self {
        Self {
            combination: combination.map(str::to_string),
            element: element.map(str::to_string),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Output of a design run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    pub combinations: Vec<LoadCombination>,
    /// One result per successfully solved combination, in combination order
    pub results: Vec<AnalysisResult>,
    pub verdicts: Vec<CapacityVerdict>,
    pub summary: DesignSummary,
    pub failures: Vec<UnitFailure>,
}

impl DesignReport {
    pub fn result(&self, combination: &str) -> Option<&AnalysisResult> {
        self.results.iter().find(|r| r.combination == combination)
    }

    pub fn verdicts_for<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a CapacityVerdict> + 'a {
        self.verdicts.iter().filter(move |v| v.element == element)
    }
}

/// Generate the model from a building layout and run the design
pub fn run_design(input: &DesignInput, catalog: &StandardsCatalog) -> StructResult<DesignReport> {
    let built = StructuralModelBuilder::new(catalog).build(&input.layout, &input.roles, &input.loads)?;

    let mut specs: Vec<DesignSpec> = Vec::new();
    for (&role, check) in &input.role_checks {
        for name in built.members_with_role(role) {
            specs.push(DesignSpec::member(name, check.clone()));
        }
    }
    specs.extend(input.elements.iter().cloned());

    run_model(&built.model, &built.cases, &specs, &input.options, catalog)
}

/// Run the design on a prepared model and its load cases
pub fn run_model(
    model: &FEModel,
    cases: &LoadCaseSet,
    specs: &[DesignSpec],
    options: &AnalysisOptions,
    catalog: &StandardsCatalog,
) -> StructResult<DesignReport> {
    let combinations = LoadCombinationEngine::new(catalog).generate(cases)?;
    info!(
        "design run: {} nodes, {} members, {} combinations, {} elements",
        model.nodes.len(),
        model.members.len(),
        combinations.len(),
        specs.len()
    );

    let prepared = FemSolver::new(options.clone()).prepare(model)?;
    let mut failures = Vec::new();
    let mut results = Vec::new();
    for (combo, outcome) in combinations.iter().zip(prepared.solve_all(&combinations)) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("combination {} skipped: {}", combo.label, e);
                failures.push(UnitFailure::new(Some(&combo.label), None, &e));
            }
        }
    }

    // One task per (element, combination); standalone elements need no analysis
    let mut tasks: Vec<(&DesignSpec, &LoadCombination, Option<&AnalysisResult>)> = Vec::new();
    for spec in specs {
        if spec.target == DesignTarget::Standalone {
            tasks.extend(combinations.iter().map(|c| (spec, c, None)));
        } else {
            for result in &results {
                let combo = combinations
                    .iter()
                    .find(|c| c.label == result.combination)
                    .ok_or_else(|| StructError::config(format!("no combination {}", result.combination)))?;
                tasks.push((spec, combo, Some(result)));
            }
        }
    }
    debug!("{} check tasks", tasks.len());

    let engine = CheckEngine::new(catalog);
    let stations = options.diagram_stations;
    let run = |&(spec, combo, result): &(&DesignSpec, &LoadCombination, Option<&AnalysisResult>)| {
        check_element(&engine, model, spec, combo, result, stations)
    };
    #[cfg(feature = "parallel")]
    let outcomes: Vec<StructResult<Vec<CapacityVerdict>>> = tasks.par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<StructResult<Vec<CapacityVerdict>>> = tasks.iter().map(run).collect();

    let mut verdicts = Vec::new();
    for ((spec, combo, _), outcome) in tasks.iter().zip(outcomes) {
        match outcome {
            Ok(v) => verdicts.extend(v),
            Err(e) => {
                warn!("check of {} under {} failed: {}", spec.id, combo.label, e);
                failures.push(UnitFailure::new(Some(&combo.label), Some(&spec.id), &e));
            }
        }
    }

    let summary = ResultAggregator::aggregate(&verdicts);
    info!(
        "design summary: {} OK, {} WARNING, {} FAIL, {} failed units",
        summary.counts.ok,
        summary.counts.warning,
        summary.counts.fail,
        failures.len()
    );

    Ok(DesignReport {
        combinations,
        results,
        verdicts,
        summary,
        failures,
    })
}

/// Section of the column standing on a support node, or of any member there
fn support_section<'m>(model: &'m FEModel, node: &str) -> StructResult<&'m Section> {
    let attached = |m: &&Member| m.i_node == node || m.j_node == node;
    let member = model
        .members
        .iter()
        .filter(|(_, m)| attached(m))
        .find(|(_, m)| m.role == MemberRole::Column)
        .or_else(|| model.members.iter().find(|(_, m)| attached(m)))
        .map(|(name, _)| name.as_str())
        .ok_or_else(|| StructError::config(format!("no member is attached to support {}", node)))?;
    model.member_section(member)
}

fn check_element(
    engine: &CheckEngine,
    model: &FEModel,
    spec: &DesignSpec,
    combo: &LoadCombination,
    result: Option<&AnalysisResult>,
    stations: usize,
) -> StructResult<Vec<CapacityVerdict>> {
    let analysis = || {
        result.ok_or_else(|| StructError::config(format!("{} needs analysis results", spec.id)))
    };

    match &spec.target {
        DesignTarget::Standalone => {
            let demand = Demand::new(DemandForces::None, combo);
            engine.check(&spec.id, &spec.check, &demand)
        }
        DesignTarget::Member(name) => {
            let member = model.member(name)?;
            let forces = analysis()?.member(name)?.design_forces(stations);
            let demand = Demand::new(DemandForces::Member(&forces), combo)
                .with_section(model.member_section(name)?)
                .with_material(model.member_material(name)?)
                .with_role(member.role);
            engine.check(&spec.id, &spec.check, &demand)
        }
        DesignTarget::MemberEnd { member: name, end } => {
            let member = model.member(name)?;
            let member_result = analysis()?.member(name)?;
            let forces = match end {
                MemberEnd::I => member_result.forces_i(),
                MemberEnd::J => member_result.forces_j(),
            };
            let demand = Demand::new(DemandForces::MemberEnd(forces), combo)
                .with_section(model.member_section(name)?)
                .with_material(model.member_material(name)?)
                .with_role(member.role);
            engine.check(&spec.id, &spec.check, &demand)
        }
        DesignTarget::Support(node) => {
            model.node(node)?;
            if !model.supports.contains_key(node) {
                return Err(StructError::config(format!("node {} has no support", node)));
            }
            let reaction = analysis()?.reaction(node);
            let demand = Demand::new(DemandForces::Support(reaction), combo)
                .with_section(support_section(model, node)?);
            engine.check(&spec.id, &spec.check, &demand)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RoleAssignment;
    use crate::design::{FootingSpec, SteelMemberSpec};
    use crate::elements::{Node, Support};
    use crate::loads::{DistributedLoad, LoadCase, LoadCategory};

    fn portal(catalog: &StandardsCatalog) -> FEModel {
        let mut model = FEModel::new();
        model.add_material("SS400", catalog.steel_material("SS400").unwrap()).unwrap();
        model.add_section("H200x200", catalog.steel_section("H200x200").unwrap()).unwrap();
        model.add_section("I300x150", catalog.steel_section("I300x150").unwrap()).unwrap();
        model.add_node("A", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("B", Node::new(0.0, 4.0, 0.0)).unwrap();
        model.add_node("C", Node::new(6.0, 4.0, 0.0)).unwrap();
        model.add_node("D", Node::new(6.0, 0.0, 0.0)).unwrap();
        let column = |i: &str, j: &str| Member::new(i, j, "SS400", "H200x200").with_role(MemberRole::Column);
        model.add_member("C1", column("A", "B")).unwrap();
        model.add_member("C2", column("D", "C")).unwrap();
        model
            .add_member("B1", Member::new("B", "C", "SS400", "I300x150").with_role(MemberRole::PrimaryBeam))
            .unwrap();
        model.add_support("A", Support::fixed()).unwrap();
        model.add_support("D", Support::fixed()).unwrap();
        model
            .add_member_dist_load("B1", DistributedLoad::uniform_downward(12.0, "Dead"))
            .unwrap();
        model
            .add_member_dist_load("B1", DistributedLoad::uniform_downward(8.0, "Live"))
            .unwrap();
        model
    }

    fn cases() -> LoadCaseSet {
        LoadCaseSet::new().with(LoadCase::dead()).with(LoadCase::live())
    }

    #[test]
    fn test_run_model_checks_every_combination() {
        let catalog = StandardsCatalog::tcvn().unwrap();
        let model = portal(&catalog);
        let specs = vec![
            DesignSpec::member("B1", ElementCheck::Steel(SteelMemberSpec::new())),
            DesignSpec::support("A", ElementCheck::Footing(FootingSpec::new(2.0, 2.0, 1.5, "sand_medium"))),
        ];
        let report = run_model(&model, &cases(), &specs, &AnalysisOptions::default(), &catalog).unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.results.len(), report.combinations.len());
        assert!(report.verdicts_for("B1").count() > 0);
        assert!(report.verdicts_for("A").all(|v| v.kind == "footing"));
        assert_eq!(report.summary.governing.len(), 2);
        assert_eq!(report.summary.governing[0].element, "B1");
    }

    #[test]
    fn test_failed_check_is_recorded_and_run_continues() {
        let catalog = StandardsCatalog::tcvn().unwrap();
        let model = portal(&catalog);
        let specs = vec![
            DesignSpec::member("B1", ElementCheck::Steel(SteelMemberSpec::new())),
            DesignSpec::member("NOPE", ElementCheck::Steel(SteelMemberSpec::new())),
        ];
        let report = run_model(&model, &cases(), &specs, &AnalysisOptions::default(), &catalog).unwrap();
        assert_eq!(report.failures.len(), report.results.len());
        assert!(report.failures.iter().all(|f| f.element.as_deref() == Some("NOPE")));
        assert!(report.verdicts_for("B1").count() > 0);
    }

    #[test]
    fn test_support_section_prefers_column() {
        let catalog = StandardsCatalog::tcvn().unwrap();
        let model = portal(&catalog);
        let section = support_section(&model, "A").unwrap();
        assert_eq!(section, model.sections.get("H200x200").unwrap());
    }

    #[test]
    fn test_design_input_from_json() {
        let catalog = StandardsCatalog::tcvn().unwrap();
        let input = DesignInput {
            layout: BuildingLayout::uniform(2, 6.0, 1, 5.0, 1, 3.6),
            roles: RoleAssignments::new()
                .with(MemberRole::Column, RoleAssignment::profile("H250x250", "SS400"))
                .with(MemberRole::PrimaryBeam, RoleAssignment::profile("I400x200", "SS400"))
                .with(MemberRole::SecondaryBeam, RoleAssignment::profile("I300x150", "SS400")),
            loads: LoadIntensities::new()
                .with_area(LoadCategory::Dead, 4.0)
                .with_area(LoadCategory::Live, 2.0),
            role_checks: BTreeMap::from([(MemberRole::PrimaryBeam, ElementCheck::Steel(SteelMemberSpec::new()))]),
            elements: Vec::new(),
            options: AnalysisOptions::default(),
        };
        let json = serde_json::to_string(&input).unwrap();
        let parsed: DesignInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, input);

        let report = run_design(&parsed, &catalog).unwrap();
        assert!(report.failures.is_empty());
        assert!(!report.verdicts.is_empty());
        assert!(report.verdicts.iter().all(|v| v.kind == "steel_member"));
    }
}
