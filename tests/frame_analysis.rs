use approx::assert_relative_eq;
use vietstruct::prelude::*;

const E: f64 = 2.1e8;

/// Simply supported beam along X: pin at N1, roller at N2
fn simply_supported_beam(span: f64, w: f64) -> FEModel {
    let mut model = FEModel::new();
    model.add_material("Steel", Material::isotropic(E, 0.3, 78.5)).unwrap();
    model.add_section("R", Section::rectangular(0.2, 0.4)).unwrap();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(span, 0.0, 0.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "R")).unwrap();
    model
        .add_support("N1", Support::with_restraints(true, true, true, true, false, false))
        .unwrap();
    model
        .add_support("N2", Support::with_restraints(false, true, true, false, false, false))
        .unwrap();
    model
        .add_member_dist_load("M1", DistributedLoad::uniform_downward(w, "Dead"))
        .unwrap();
    model
}

fn dead_only_combinations(catalog: &StandardsCatalog) -> Vec<LoadCombination> {
    let cases = LoadCaseSet::new().with(LoadCase::dead());
    LoadCombinationEngine::new(catalog).generate(&cases).unwrap()
}

fn service(combos: &[LoadCombination]) -> &LoadCombination {
    combos.iter().find(|c| c.limit_state == LimitState::Sls).unwrap()
}

#[test]
fn test_simply_supported_beam_moment_and_deflection() {
    let catalog = StandardsCatalog::tcvn().unwrap();
    let (span, w) = (6.0, 10.0);
    let model = simply_supported_beam(span, w);
    let combos = dead_only_combinations(&catalog);

    let prepared = FemSolver::default().prepare(&model).unwrap();
    let result = prepared.solve(service(&combos)).unwrap();
    let beam = result.member("M1").unwrap();

    let m_expected = w * span * span / 8.0;
    assert_relative_eq!(beam.max_sagging_moment(), m_expected, max_relative = 1e-3);
    assert_relative_eq!(beam.moment_major_at(span / 2.0), m_expected, max_relative = 1e-3);

    let ei = E * 0.2 * 0.4_f64.powi(3) / 12.0;
    let delta_expected = 5.0 * w * span.powi(4) / (384.0 * ei);
    assert_relative_eq!(beam.mid_span_deflection_major().abs(), delta_expected, max_relative = 1e-3);
}

#[test]
fn test_reactions_balance_applied_load() {
    let catalog = StandardsCatalog::tcvn().unwrap();
    let model = simply_supported_beam(5.0, 12.0);
    let combos = dead_only_combinations(&catalog);
    let prepared = FemSolver::default().prepare(&model).unwrap();

    for combo in &combos {
        let result = prepared.solve(combo).unwrap();
        let factor = combo.factor("Dead");
        let total = result.total_reaction();
        assert_relative_eq!(total[1], factor * 12.0 * 5.0, max_relative = 1e-9);
        assert_relative_eq!(result.reaction("N1").fy, result.reaction("N2").fy, max_relative = 1e-9);
        assert_eq!(result.reaction("N2").fx, 0.0);
    }
}

#[test]
fn test_mechanism_reports_instability() {
    let catalog = StandardsCatalog::tcvn().unwrap();
    let mut model = simply_supported_beam(4.0, 5.0);
    // Free torsion at both ends
    model.add_support("N1", Support::pinned()).unwrap();
    model.add_support("N2", Support::pinned()).unwrap();

    let combos = dead_only_combinations(&catalog);
    let prepared = FemSolver::default().prepare(&model).unwrap();
    assert!(!prepared.is_stable());
    match prepared.solve(&combos[0]) {
        Err(StructError::Instability { combination, .. }) => assert_eq!(combination, combos[0].label),
        other => panic!("expected instability, got {:?}", other.map(|r| r.combination)),
    }
}

#[test]
fn test_solving_twice_is_identical() {
    let catalog = StandardsCatalog::tcvn().unwrap();
    let layout = BuildingLayout::uniform(2, 6.0, 2, 5.0, 2, 3.5).with_secondary_beams(1);
    let roles = RoleAssignments::new()
        .with(MemberRole::Column, RoleAssignment::rectangular(0.3, 0.3, "B25"))
        .with(MemberRole::PrimaryBeam, RoleAssignment::rectangular(0.25, 0.5, "B25"))
        .with(MemberRole::SecondaryBeam, RoleAssignment::rectangular(0.2, 0.35, "B25"));
    let loads = LoadIntensities::new()
        .with_area(LoadCategory::Dead, 5.0)
        .with_area(LoadCategory::Live, 2.0)
        .with_wind(WindInput::Pressure(0.9))
        .with_seismic(0.08);
    let built = StructuralModelBuilder::new(&catalog)
        .build(&layout, &roles, &loads)
        .unwrap();
    let combos = LoadCombinationEngine::new(&catalog).generate(&built.cases).unwrap();

    let prepared = FemSolver::default().prepare(&built.model).unwrap();
    let first: Vec<AnalysisResult> = prepared.solve_all(&combos).into_iter().map(Result::unwrap).collect();
    let second: Vec<AnalysisResult> = prepared.solve_all(&combos).into_iter().map(Result::unwrap).collect();
    assert_eq!(first, second);

    let labels: Vec<&str> = first.iter().map(|r| r.combination.as_str()).collect();
    let expected: Vec<&str> = combos.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, expected);
}

#[test]
fn test_combinations_always_carry_dead_load() {
    let catalog = StandardsCatalog::tcvn().unwrap();
    let cases = LoadCaseSet::new()
        .with(LoadCase::dead())
        .with(LoadCase::live())
        .with(LoadCase::wind());
    let combos = LoadCombinationEngine::new(&catalog).generate(&cases).unwrap();
    assert!(!combos.is_empty());
    for combo in &combos {
        assert!(combo.factor("Dead") > 0.0, "{} has no dead term", combo.label);
        assert!(combo.terms.iter().all(|t| cases.contains(t.category)));
    }
}
