//! Structural model builder
//!
//! Turns a rectangular column grid with story heights into a frame model:
//! columns at every grid intersection, main beams along one plan axis, and
//! secondary beams (or purlins on a roof level) along the other, at every
//! column line plus any intermediate positions in each bay. Floor area loads
//! go onto the secondary beams by tributary width; the main beams pick them up
//! through the frame.
//!
//! Plan axes are X and Z; Y is vertical. Wind and seismic loads act in +X.

use std::collections::BTreeMap;

use log::{debug, info};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::catalog::{Standard, StandardsCatalog};
use crate::elements::{Member, MemberReleases, MemberRole, Node, Section, Support};
use crate::error::{StructError, StructResult};
use crate::loads::{DistributedLoad, LoadCase, LoadCaseSet, LoadCategory, LoadDirection, NodeLoad};
use crate::model::FEModel;

/// Plan axis along which the main beams span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamDirection {
    #[default]
    X,
    Z,
}

/// Column grid, stories and framing arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingLayout {
    /// Bay spacings along X (m)
    pub bays_x: Vec<f64>,
    /// Bay spacings along Z (m)
    pub bays_z: Vec<f64>,
    /// Story heights from the ground up (m)
    pub story_heights: Vec<f64>,
    #[serde(default)]
    pub main_beam_direction: BeamDirection,
    /// Intermediate secondary beams per bay, in addition to those on column lines
    #[serde(default)]
    pub secondary_beams_per_bay: usize,
    /// Top level is a roof: its secondary members become purlins
    #[serde(default)]
    pub roof: bool,
}

impl BuildingLayout {
    /// Layout with equal bays and equal stories
    pub fn uniform(nx: usize, spacing_x: f64, nz: usize, spacing_z: f64, stories: usize, height: f64) -> Self {
        Self {
            bays_x: vec![spacing_x; nx],
            bays_z: vec![spacing_z; nz],
            story_heights: vec![height; stories],
            main_beam_direction: BeamDirection::X,
            secondary_beams_per_bay: 0,
            roof: false,
        }
    }

    pub fn with_main_beams(mut self, direction: BeamDirection) -> Self {
        self.main_beam_direction = direction;
        self
    }

    pub fn with_secondary_beams(mut self, per_bay: usize) -> Self {
        self.secondary_beams_per_bay = per_bay;
        self
    }

    pub fn with_roof(mut self, roof: bool) -> Self {
        self.roof = roof;
        self
    }

    /// Plan area of one floor (m²)
    pub fn floor_area(&self) -> f64 {
        self.bays_x.iter().sum::<f64>() * self.bays_z.iter().sum::<f64>()
    }

    fn validate(&self) -> StructResult<()> {
        let groups = [
            ("bays_x", &self.bays_x),
            ("bays_z", &self.bays_z),
            ("story_heights", &self.story_heights),
        ];
        for (field, values) in groups {
            if values.is_empty() {
                return Err(StructError::config(format!("{} needs at least one entry", field)));
            }
            if let Some(v) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
                return Err(StructError::config(format!(
                    "{} must be positive, got {}",
                    field, v
                )));
            }
        }
        Ok(())
    }
}

/// Section of a role: a catalog steel profile or a solid rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionSpec {
    /// Catalog steel profile key, e.g. `I300x150`
    Profile(String),
    /// Solid rectangle, `height` vertical for beams (m)
    Rectangular { width: f64, height: f64 },
}

impl SectionSpec {
    /// Model section name
    pub fn name(&self) -> String {
        match self {
            SectionSpec::Profile(key) => key.clone(),
            SectionSpec::Rectangular { width, height } => {
                format!("R{:.0}x{:.0}", width * 1000.0, height * 1000.0)
            }
        }
    }

    fn resolve(&self, catalog: &StandardsCatalog) -> StructResult<Section> {
        match self {
            SectionSpec::Profile(key) => catalog.steel_section(key),
            SectionSpec::Rectangular { width, height } => {
                if !(*width > 0.0 && *height > 0.0) {
                    return Err(StructError::config(format!(
                        "rectangular section {}x{} must have positive dimensions",
                        width, height
                    )));
                }
                Ok(Section::rectangular(*width, *height))
            }
        }
    }
}

/// Section and material grade for one member role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub section: SectionSpec,
    /// Catalog steel or concrete grade key
    pub material: String,
}

impl RoleAssignment {
    pub fn new(section: SectionSpec, material: &str) -> Self {
        Self {
            section,
            material: material.to_string(),
        }
    }

    pub fn profile(key: &str, material: &str) -> Self {
        Self::new(SectionSpec::Profile(key.to_string()), material)
    }

    pub fn rectangular(width: f64, height: f64, material: &str) -> Self {
        Self::new(SectionSpec::Rectangular { width, height }, material)
    }
}

/// Role assignments by member role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAssignments(pub BTreeMap<MemberRole, RoleAssignment>);

impl RoleAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: MemberRole, assignment: RoleAssignment) -> Self {
        self.0.insert(role, assignment);
        self
    }

    pub fn get(&self, role: MemberRole) -> StructResult<&RoleAssignment> {
        self.0
            .get(&role)
            .ok_or_else(|| StructError::config(format!("no section assigned to role {:?}", role)))
    }
}

/// Facade wind input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindInput {
    /// Design facade pressure (kPa)
    Pressure(f64),
    /// Wind zone base pressure times a pressure coefficient
    Zone { zone: String, coefficient: f64 },
}

impl WindInput {
    fn pressure(&self, catalog: &StandardsCatalog) -> StructResult<f64> {
        match self {
            WindInput::Pressure(p) => Ok(*p),
            WindInput::Zone { zone, coefficient } => Ok(catalog.wind_pressure(zone)? * coefficient),
        }
    }
}

/// Lateral loads and self-weight option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateralLoads {
    pub wind: Option<WindInput>,
    /// Base shear coefficient applied to each level's seismic weight
    pub seismic_coefficient: Option<f64>,
    /// Add member self-weight to the dead case
    pub self_weight: bool,
}

/// Area loads (kPa) by gravity category, plus lateral loads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadIntensities {
    pub area: BTreeMap<LoadCategory, f64>,
    #[serde(default)]
    pub lateral: LateralLoads,
}

impl LoadIntensities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_area(mut self, category: LoadCategory, kpa: f64) -> Self {
        self.area.insert(category, kpa);
        self
    }

    pub fn with_wind(mut self, wind: WindInput) -> Self {
        self.lateral.wind = Some(wind);
        self
    }

    pub fn with_seismic(mut self, coefficient: f64) -> Self {
        self.lateral.seismic_coefficient = Some(coefficient);
        self
    }

    pub fn with_self_weight(mut self) -> Self {
        self.lateral.self_weight = true;
        self
    }

    fn area_load(&self, category: LoadCategory) -> f64 {
        self.area.get(&category).copied().unwrap_or(0.0)
    }
}

/// A generated model with its load cases
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: FEModel,
    pub cases: LoadCaseSet,
    /// Elevation of every level, ground first (m)
    pub levels: Vec<f64>,
}

impl BuiltModel {
    /// Member names with a given role, in name order
    pub fn members_with_role(&self, role: MemberRole) -> Vec<&str> {
        self.model
            .members
            .iter()
            .filter(|(_, m)| m.role == role)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Nodes carrying a support, in name order
    pub fn base_nodes(&self) -> Vec<&str> {
        self.model.supported_nodes().collect()
    }
}

/// A position along a plan axis
#[derive(Debug, Clone, Copy)]
struct AxisPoint {
    coord: f64,
    on_grid: bool,
}

fn grid_points(bays: &[f64]) -> Vec<f64> {
    let mut points = vec![0.0];
    for bay in bays {
        let last = points[points.len() - 1];
        points.push(last + bay);
    }
    points
}

/// Column lines plus `extra` evenly spaced positions inside every bay
fn framing_points(bays: &[f64], extra: usize) -> Vec<AxisPoint> {
    let grid = grid_points(bays);
    let mut points = Vec::new();
    for pair in grid.windows(2) {
        points.push(AxisPoint {
            coord: pair[0],
            on_grid: true,
        });
        for k in 1..=extra {
            points.push(AxisPoint {
                coord: pair[0] + (pair[1] - pair[0]) * k as f64 / (extra + 1) as f64,
                on_grid: false,
            });
        }
    }
    points.push(AxisPoint {
        coord: grid[grid.len() - 1],
        on_grid: true,
    });
    points
}

/// Half the distance to each neighbour
fn tributary_widths(coords: &[f64]) -> Vec<f64> {
    let n = coords.len();
    (0..n)
        .map(|k| {
            let left = if k > 0 { (coords[k] - coords[k - 1]) / 2.0 } else { 0.0 };
            let right = if k + 1 < n { (coords[k + 1] - coords[k]) / 2.0 } else { 0.0 };
            left + right
        })
        .collect()
}

fn node_name(level: usize, p: usize, j: usize) -> String {
    format!("N{}-{}-{}", level, p, j)
}

/// Builds frame models from grid layouts
pub struct StructuralModelBuilder<'a> {
    catalog: &'a StandardsCatalog,
}

impl<'a> StructuralModelBuilder<'a> {
    pub fn new(catalog: &'a StandardsCatalog) -> Self {
        Self { catalog }
    }

    /// Build a fresh model and its load cases
    pub fn build(
        &self,
        layout: &BuildingLayout,
        roles: &RoleAssignments,
        loads: &LoadIntensities,
    ) -> StructResult<BuiltModel> {
        layout.validate()?;
        for (category, q) in &loads.area {
            if category.is_lateral() {
                return Err(StructError::config(format!(
                    "{:?} cannot be given as an area load",
                    category
                )));
            }
            if !(q.is_finite() && *q >= 0.0) {
                return Err(StructError::config(format!(
                    "area load for {:?} must be non-negative, got {}",
                    category, q
                )));
            }
        }

        let (main_bays, cross_bays) = match layout.main_beam_direction {
            BeamDirection::X => (&layout.bays_x, &layout.bays_z),
            BeamDirection::Z => (&layout.bays_z, &layout.bays_x),
        };
        let along = framing_points(main_bays, layout.secondary_beams_per_bay);
        let across = grid_points(cross_bays);
        let along_coords: Vec<f64> = along.iter().map(|p| p.coord).collect();
        let trib = tributary_widths(&along_coords);

        let to_xz = |u: f64, v: f64| match layout.main_beam_direction {
            BeamDirection::X => (u, v),
            BeamDirection::Z => (v, u),
        };

        let mut levels = vec![0.0];
        for h in &layout.story_heights {
            let last = levels[levels.len() - 1];
            levels.push(last + h);
        }
        let top = levels.len() - 1;

        let mut model = FEModel::new();
        let mut section_of = BTreeMap::new();
        let mut material_of = BTreeMap::new();
        let mut roles_used = vec![MemberRole::Column, MemberRole::PrimaryBeam, MemberRole::SecondaryBeam];
        if layout.roof {
            roles_used.push(MemberRole::Purlin);
        }
        for role in roles_used {
            let assignment = roles.get(role)?;
            let section_name = assignment.section.name();
            if !model.sections.contains_key(&section_name) {
                model.add_section(&section_name, assignment.section.resolve(self.catalog)?)?;
            }
            if !model.materials.contains_key(&assignment.material) {
                model.add_material(&assignment.material, self.catalog.material(&assignment.material)?)?;
            }
            section_of.insert(role, section_name);
            material_of.insert(role, assignment.material.clone());
        }
        let member_of = |role: MemberRole, i: &str, j: &str| {
            Member::new(i, j, &material_of[&role], &section_of[&role]).with_role(role)
        };

        // Nodes: column bases on the ground, every framing point above
        for (level, &y) in levels.iter().enumerate() {
            for (p, point) in along.iter().enumerate() {
                if level == 0 && !point.on_grid {
                    continue;
                }
                for (j, &v) in across.iter().enumerate() {
                    let (x, z) = to_xz(point.coord, v);
                    model.add_node(&node_name(level, p, j), Node::new(x, y, z))?;
                }
            }
        }

        // Columns and fixed bases
        for (p, _) in along.iter().enumerate().filter(|(_, pt)| pt.on_grid) {
            for j in 0..across.len() {
                model.add_support(&node_name(0, p, j), Support::fixed())?;
                for level in 1..levels.len() {
                    let name = format!("C{}-{}-{}", level, p, j);
                    let member = member_of(
                        MemberRole::Column,
                        &node_name(level - 1, p, j),
                        &node_name(level, p, j),
                    );
                    model.add_member(&name, member)?;
                }
            }
        }

        // Beams on every level
        for level in 1..levels.len() {
            let secondary_role = if layout.roof && level == top {
                MemberRole::Purlin
            } else {
                MemberRole::SecondaryBeam
            };
            for j in 0..across.len() {
                for p in 0..along.len() - 1 {
                    let name = format!("{}{}-{}-{}", MemberRole::PrimaryBeam.tag(), level, p, j);
                    let member = member_of(
                        MemberRole::PrimaryBeam,
                        &node_name(level, p, j),
                        &node_name(level, p + 1, j),
                    );
                    model.add_member(&name, member)?;
                }
            }
            for p in 0..along.len() {
                for j in 0..across.len() - 1 {
                    let name = format!("{}{}-{}-{}", secondary_role.tag(), level, p, j);
                    let member = member_of(secondary_role, &node_name(level, p, j), &node_name(level, p, j + 1))
                        .with_releases(MemberReleases::pin_both());
                    model.add_member(&name, member)?;
                }
            }
        }

        let mut present: Vec<LoadCategory> = Vec::new();
        let mut mark = |category: LoadCategory| {
            if !present.contains(&category) {
                present.push(category);
            }
        };

        // Area loads onto secondary members by tributary width
        for level in 1..levels.len() {
            let is_roof = layout.roof && level == top;
            let role = if is_roof { MemberRole::Purlin } else { MemberRole::SecondaryBeam };
            for (&category, &q) in &loads.area {
                let applies = match category {
                    LoadCategory::Live => !is_roof,
                    LoadCategory::RoofLive => is_roof,
                    _ => true,
                };
                if !applies || q == 0.0 {
                    continue;
                }
                mark(category);
                for (p, width) in trib.iter().enumerate() {
                    for j in 0..across.len() - 1 {
                        let name = format!("{}{}-{}-{}", role.tag(), level, p, j);
                        let load = DistributedLoad::uniform(-q * width, LoadDirection::Fy, category.default_case_name());
                        model.add_member_dist_load(&name, load)?;
                    }
                }
            }
        }

        if loads.lateral.self_weight {
            mark(LoadCategory::Dead);
            let weights: Vec<(String, f64)> = model
                .members
                .iter()
                .map(|(name, member)| {
                    let unit_weight = model.materials[&member.material].unit_weight;
                    let area = model.sections[&member.section].a;
                    (name.clone(), unit_weight * area)
                })
                .collect();
            for (name, w) in weights {
                model.add_member_dist_load(
                    &name,
                    DistributedLoad::uniform_downward(w, LoadCategory::Dead.default_case_name()),
                )?;
            }
        }

        // Wind on the X = 0 face, tributary width along Z times tributary height
        if let Some(wind) = &loads.lateral.wind {
            let pressure = wind.pressure(self.catalog)?;
            if pressure != 0.0 {
                mark(LoadCategory::Wind);
                for level in 1..levels.len() {
                    let below = levels[level] - levels[level - 1];
                    let above = if level < top { levels[level + 1] - levels[level] } else { 0.0 };
                    let height = (below + above) / 2.0;

                    let mut face: Vec<(String, f64)> = model
                        .nodes
                        .iter()
                        .filter(|(_, n)| n.x.abs() < 1e-9 && (n.y - levels[level]).abs() < 1e-9)
                        .map(|(name, n)| (name.clone(), n.z))
                        .collect();
                    face.sort_by(|a, b| a.1.total_cmp(&b.1));
                    let z: Vec<f64> = face.iter().map(|f| f.1).collect();
                    for ((name, _), width) in face.iter().zip(tributary_widths(&z)) {
                        let force = pressure * width * height;
                        model.add_node_load(name, NodeLoad::force(force, 0.0, 0.0, LoadCategory::Wind.default_case_name()))?;
                    }
                }
            }
        }

        // Seismic level forces shared by the column tops
        if let Some(coefficient) = loads.lateral.seismic_coefficient {
            let participation = self
                .catalog
                .lookup(Standard::Tcvn2737, "seismic", "live_participation")?;
            let area = layout.floor_area();

            // Member self-weight lumped to the levels, half of it at each end
            let mut member_weight = vec![0.0; levels.len()];
            if loads.lateral.self_weight {
                for member in model.members.values() {
                    let ends = [&model.nodes[&member.i_node], &model.nodes[&member.j_node]];
                    let w = model.materials[&member.material].unit_weight
                        * model.sections[&member.section].a
                        * ends[0].distance_to(ends[1]);
                    for node in ends {
                        if let Some(k) = levels.iter().position(|&y| (node.y - y).abs() < 1e-9) {
                            member_weight[k] += w / 2.0;
                        }
                    }
                }
            }

            let column_tops: Vec<(usize, usize)> = along
                .iter()
                .enumerate()
                .filter(|(_, pt)| pt.on_grid)
                .flat_map(|(p, _)| (0..across.len()).map(move |j| (p, j)))
                .collect();
            for level in 1..levels.len() {
                let is_roof = layout.roof && level == top;
                let live = if is_roof {
                    loads.area_load(LoadCategory::RoofLive)
                } else {
                    loads.area_load(LoadCategory::Live)
                };
                let weight = (loads.area_load(LoadCategory::Dead) + participation * live) * area
                    + member_weight[level];
                let force = coefficient * weight / column_tops.len() as f64;
                if force == 0.0 {
                    continue;
                }
                mark(LoadCategory::Seismic);
                for &(p, j) in &column_tops {
                    model.add_node_load(
                        &node_name(level, p, j),
                        NodeLoad::force(force, 0.0, 0.0, LoadCategory::Seismic.default_case_name()),
                    )?;
                }
            }
        }

        let cases: LoadCaseSet = present.into_iter().map(LoadCase::of).collect();
        validate_model(&model)?;

        info!(
            "built model: {} nodes, {} members, {} load cases",
            model.nodes.len(),
            model.members.len(),
            cases.len()
        );
        Ok(BuiltModel { model, cases, levels })
    }
}

/// Geometry validation plus a reachability check from the supports
///
/// Every node must connect to a supported node through members; the first
/// node (in name order) that does not is reported.
pub fn validate_model(model: &FEModel) -> StructResult<()> {
    model.validate_geometry()?;

    let mut graph: UnGraph<&str, ()> = UnGraph::new_undirected();
    let ground = graph.add_node("");
    let index: BTreeMap<&str, NodeIndex> = model
        .nodes
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();
    for member in model.members.values() {
        graph.add_edge(index[member.i_node.as_str()], index[member.j_node.as_str()], ());
    }
    for name in model.supported_nodes() {
        graph.add_edge(ground, index[name], ());
    }

    let mut reached = vec![false; graph.node_count()];
    let mut bfs = Bfs::new(&graph, ground);
    while let Some(n) = bfs.next(&graph) {
        reached[n.index()] = true;
    }

    if let Some((name, _)) = index.iter().find(|(_, idx)| !reached[idx.index()]) {
        return Err(StructError::degenerate(
            *name,
            "not connected to any supported node",
        ));
    }
    debug!("all {} nodes reach a support", index.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn catalog() -> StandardsCatalog {
        StandardsCatalog::tcvn().unwrap()
    }

    fn roles() -> RoleAssignments {
        RoleAssignments::new()
            .with(MemberRole::Column, RoleAssignment::profile("H300x300", "SS400"))
            .with(MemberRole::PrimaryBeam, RoleAssignment::profile("I400x200", "SS400"))
            .with(MemberRole::SecondaryBeam, RoleAssignment::profile("I250x125", "SS400"))
            .with(MemberRole::Purlin, RoleAssignment::profile("I150x75", "SS400"))
    }

    fn total_case_load(model: &FEModel, case: &str) -> f64 {
        model
            .member_dist_loads
            .iter()
            .flat_map(|(name, loads)| {
                let length = model.member_length(name).unwrap();
                loads
                    .iter()
                    .filter(move |l| l.case == case)
                    .map(move |l| l.w * length)
            })
            .sum()
    }

    #[test]
    fn test_framing_counts() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(2, 6.0, 1, 5.0, 2, 3.6).with_secondary_beams(1);
        let loads = LoadIntensities::new().with_area(LoadCategory::Dead, 4.0);
        let built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();

        // 3 column lines × 2 grid lines × 2 stories
        assert_eq!(built.members_with_role(MemberRole::Column).len(), 12);
        // 5 framing points along X, 4 segments per grid line, 2 lines, 2 levels
        assert_eq!(built.members_with_role(MemberRole::PrimaryBeam).len(), 16);
        assert_eq!(built.members_with_role(MemberRole::SecondaryBeam).len(), 10);
        assert_eq!(built.base_nodes().len(), 6);
        assert_eq!(built.levels, vec![0.0, 3.6, 7.2]);
    }

    #[test]
    fn test_tributary_loads_total_floor_load() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(3, 6.0, 2, 7.5, 3, 3.3).with_secondary_beams(2);
        let loads = LoadIntensities::new()
            .with_area(LoadCategory::Dead, 4.5)
            .with_area(LoadCategory::Live, 2.0);
        let built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();

        let area = layout.floor_area();
        assert_relative_eq!(total_case_load(&built.model, "Dead"), -4.5 * area * 3.0, max_relative = 1e-12);
        assert_relative_eq!(total_case_load(&built.model, "Live"), -2.0 * area * 3.0, max_relative = 1e-12);
        assert!(built.cases.contains(LoadCategory::Live));
        assert!(!built.cases.contains(LoadCategory::Wind));
    }

    #[test]
    fn test_roof_level_uses_purlins_and_roof_live() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(1, 6.0, 1, 6.0, 2, 3.5)
            .with_main_beams(BeamDirection::Z)
            .with_roof(true);
        let loads = LoadIntensities::new()
            .with_area(LoadCategory::Dead, 3.0)
            .with_area(LoadCategory::Live, 2.0)
            .with_area(LoadCategory::RoofLive, 0.3);
        let built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();

        let purlins = built.members_with_role(MemberRole::Purlin);
        assert_eq!(purlins.len(), 2);
        assert!(purlins.iter().all(|p| p.starts_with("P2-")));
        assert_relative_eq!(total_case_load(&built.model, "RoofLive"), -0.3 * 36.0, max_relative = 1e-12);
        assert_relative_eq!(total_case_load(&built.model, "Live"), -2.0 * 36.0, max_relative = 1e-12);
    }

    #[test]
    fn test_wind_and_seismic_totals() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(2, 6.0, 2, 5.0, 2, 4.0);
        let loads = LoadIntensities::new()
            .with_area(LoadCategory::Dead, 5.0)
            .with_area(LoadCategory::Live, 2.0)
            .with_wind(WindInput::Zone {
                zone: "II".into(),
                coefficient: 0.8,
            })
            .with_seismic(0.05);
        let built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();

        let total = |case: &str| -> f64 {
            built
                .model
                .node_loads
                .values()
                .flatten()
                .filter(|l| l.case == case)
                .map(|l| l.components[0])
                .sum()
        };
        // Facade 10 m wide, tributary height 4 m + 2 m
        assert_relative_eq!(total("Wind"), 0.95 * 0.8 * 10.0 * 6.0, max_relative = 1e-12);
        // Two levels of (5 + 0.5·2) kPa over 120 m²
        assert_relative_eq!(total("Seismic"), 0.05 * 6.0 * 120.0 * 2.0, max_relative = 1e-12);
        assert!(built.cases.contains(LoadCategory::Wind));
        assert!(built.cases.contains(LoadCategory::Seismic));
    }

    #[test]
    fn test_seismic_weight_includes_self_weight() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(2, 6.0, 2, 5.0, 2, 4.0);
        let loads = LoadIntensities::new()
            .with_area(LoadCategory::Dead, 5.0)
            .with_seismic(0.05)
            .with_self_weight();
        let built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();
        let model = &built.model;

        // Everything above the base: all members less the lower half of the ground columns
        let weight = |name: &str| {
            let member = &model.members[name];
            model.materials[&member.material].unit_weight
                * model.sections[&member.section].a
                * model.member_length(name).unwrap()
        };
        let members: f64 = model.members.keys().map(|name| weight(name)).sum();
        let base_halves: f64 = model
            .members
            .iter()
            .filter(|(_, m)| model.nodes[&m.i_node].y == 0.0 || model.nodes[&m.j_node].y == 0.0)
            .map(|(name, _)| weight(name) / 2.0)
            .sum();
        assert!(members > 0.0 && base_halves > 0.0);

        let seismic: f64 = model
            .node_loads
            .values()
            .flatten()
            .filter(|l| l.case == "Seismic")
            .map(|l| l.components[0])
            .sum();
        let expected = 0.05 * (5.0 * 120.0 * 2.0 + members - base_halves);
        assert_relative_eq!(seismic, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_layout_is_configuration_error() {
        let cat = catalog();
        let builder = StructuralModelBuilder::new(&cat);
        let loads = LoadIntensities::new().with_area(LoadCategory::Dead, 3.0);

        let no_bays = BuildingLayout::uniform(0, 6.0, 1, 6.0, 1, 3.0);
        assert!(matches!(
            builder.build(&no_bays, &roles(), &loads).unwrap_err(),
            StructError::Configuration(_)
        ));

        let negative = BuildingLayout::uniform(1, -6.0, 1, 6.0, 1, 3.0);
        assert!(matches!(
            builder.build(&negative, &roles(), &loads).unwrap_err(),
            StructError::Configuration(_)
        ));

        let missing_role = RoleAssignments::new()
            .with(MemberRole::Column, RoleAssignment::rectangular(0.3, 0.3, "B25"));
        let layout = BuildingLayout::uniform(1, 6.0, 1, 6.0, 1, 3.0);
        assert!(matches!(
            builder.build(&layout, &missing_role, &loads).unwrap_err(),
            StructError::Configuration(_)
        ));
    }

    #[test]
    fn test_floating_member_is_degenerate() {
        let cat = catalog();
        let layout = BuildingLayout::uniform(1, 6.0, 1, 6.0, 1, 3.0);
        let loads = LoadIntensities::new().with_area(LoadCategory::Dead, 3.0);
        let mut built = StructuralModelBuilder::new(&cat).build(&layout, &roles(), &loads).unwrap();
        assert!(validate_model(&built.model).is_ok());

        built.model.add_node("F1", Node::new(20.0, 3.0, 0.0)).unwrap();
        built.model.add_node("F2", Node::new(24.0, 3.0, 0.0)).unwrap();
        built
            .model
            .add_member("FLOAT", Member::new("F1", "F2", "SS400", "I400x200"))
            .unwrap();
        match validate_model(&built.model).unwrap_err() {
            StructError::DegenerateGeometry { entity, .. } => assert_eq!(entity, "F1"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
