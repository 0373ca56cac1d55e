//! vietstruct demo - two-bay steel frame
//!
//! Builds a two-bay, two-story steel frame, runs every TCVN combination,
//! checks beams, columns, base plates and footings, and prints the design
//! summary as JSON. Set `RUST_LOG=info` (or `debug`) to follow the run.

use anyhow::{Context, Result};
use log::info;
use vietstruct::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let catalog = StandardsCatalog::tcvn().context("loading the embedded TCVN catalog")?;

    let layout = BuildingLayout::uniform(2, 6.0, 1, 6.0, 2, 3.6)
        .with_secondary_beams(1)
        .with_roof(true);
    let roles = RoleAssignments::new()
        .with(MemberRole::Column, RoleAssignment::profile("H250x250", "SS400"))
        .with(MemberRole::PrimaryBeam, RoleAssignment::profile("I400x200", "SS400"))
        .with(MemberRole::SecondaryBeam, RoleAssignment::profile("I300x150", "SS400"))
        .with(MemberRole::Purlin, RoleAssignment::profile("I200x100", "SS400"));
    let loads = LoadIntensities::new()
        .with_area(LoadCategory::Dead, 4.5)
        .with_area(LoadCategory::Live, 2.0)
        .with_area(LoadCategory::RoofLive, 0.75)
        .with_wind(WindInput::Zone {
            zone: "II".to_string(),
            coefficient: 0.8,
        })
        .with_self_weight();

    let built = StructuralModelBuilder::new(&catalog)
        .build(&layout, &roles, &loads)
        .context("building the frame model")?;
    info!(
        "generated {} nodes and {} members",
        built.model.nodes.len(),
        built.model.members.len()
    );

    let mut specs = Vec::new();
    for role in [
        MemberRole::Column,
        MemberRole::PrimaryBeam,
        MemberRole::SecondaryBeam,
        MemberRole::Purlin,
    ] {
        let check = match role {
            MemberRole::Column => SteelMemberSpec::new().with_effective_length(1.2, 1.0),
            _ => SteelMemberSpec::new(),
        };
        for name in built.members_with_role(role) {
            specs.push(DesignSpec::member(name, ElementCheck::Steel(check.clone())));
        }
    }
    for node in built.base_nodes() {
        specs.push(DesignSpec::support(
            node,
            ElementCheck::BasePlate(BasePlateSpec::new(0.4, 0.45, 0.022, "SS400", "B20")),
        ));
        specs.push(DesignSpec {
            id: format!("F-{}", node),
            ..DesignSpec::support(
                node,
                ElementCheck::Footing(FootingSpec::new(1.8, 2.2, 1.5, "sand_medium")),
            )
        });
    }
    for name in built.members_with_role(MemberRole::PrimaryBeam) {
        specs.push(DesignSpec::member_end(
            name,
            MemberEnd::I,
            ElementCheck::Bolted(BoltedConnectionSpec::new(6, "M20", "8.8").with_plies(0.012, "SS400")),
        ));
    }

    let report = run_model(
        &built.model,
        &built.cases,
        &specs,
        &AnalysisOptions::default(),
        &catalog,
    )
    .context("running the design")?;

    for failure in &report.failures {
        eprintln!(
            "skipped {} {}: {}",
            failure.combination.as_deref().unwrap_or("-"),
            failure.element.as_deref().unwrap_or("-"),
            failure.message
        );
    }
    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    Ok(())
}
