//! FE Model - structural model container
//!
//! Holds nodes, members and their shared sections and materials, supports,
//! and the loads of every load case keyed by case name. The model carries no
//! solution state; analysis results live in [`crate::results::AnalysisResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::elements::{Material, Member, Node, Section, Support};
use crate::error::{StructError, StructResult};
use crate::loads::{DistributedLoad, NodeLoad};
use crate::math::{self, Mat12, MIN_MEMBER_LENGTH};

/// Two nodes closer than this are treated as coincident (m)
pub const COINCIDENT_TOLERANCE: f64 = 1e-6;

/// The 3D frame model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FEModel {
    /// Nodes in the model
    pub nodes: BTreeMap<String, Node>,
    /// Materials in the model
    pub materials: BTreeMap<String, Material>,
    /// Sections in the model
    pub sections: BTreeMap<String, Section>,
    /// Members (frame elements) in the model
    pub members: BTreeMap<String, Member>,
    /// Support conditions at nodes
    pub supports: BTreeMap<String, Support>,
    /// Node loads
    pub node_loads: BTreeMap<String, Vec<NodeLoad>>,
    /// Member distributed loads
    pub member_dist_loads: BTreeMap<String, Vec<DistributedLoad>>,
}

impl FEModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> StructResult<()> {
        if self.nodes.contains_key(name) {
            return Err(StructError::DuplicateName(name.to_string()));
        }
        self.nodes.insert(name.to_string(), node);
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> StructResult<()> {
        if self.materials.contains_key(name) {
            return Err(StructError::DuplicateName(name.to_string()));
        }
        self.materials.insert(name.to_string(), material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> StructResult<()> {
        if self.sections.contains_key(name) {
            return Err(StructError::DuplicateName(name.to_string()));
        }
        self.sections.insert(name.to_string(), section);
        Ok(())
    }

    /// Add a member to the model
    pub fn add_member(&mut self, name: &str, member: Member) -> StructResult<()> {
        if !self.nodes.contains_key(&member.i_node) {
            return Err(StructError::NodeNotFound(member.i_node.clone()));
        }
        if !self.nodes.contains_key(&member.j_node) {
            return Err(StructError::NodeNotFound(member.j_node.clone()));
        }
        if member.i_node == member.j_node {
            return Err(StructError::degenerate(
                name,
                format!("both ends connect to node {}", member.i_node),
            ));
        }
        if !self.materials.contains_key(&member.material) {
            return Err(StructError::MaterialNotFound(member.material.clone()));
        }
        if !self.sections.contains_key(&member.section) {
            return Err(StructError::SectionNotFound(member.section.clone()));
        }
        if self.members.contains_key(name) {
            return Err(StructError::DuplicateName(name.to_string()));
        }

        self.members.insert(name.to_string(), member);
        Ok(())
    }

    /// Add or replace the support at a node
    pub fn add_support(&mut self, node_name: &str, support: Support) -> StructResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(StructError::NodeNotFound(node_name.to_string()));
        }
        self.supports.insert(node_name.to_string(), support);
        Ok(())
    }

    /// Add a load to a node
    pub fn add_node_load(&mut self, node_name: &str, load: NodeLoad) -> StructResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(StructError::NodeNotFound(node_name.to_string()));
        }
        self.node_loads
            .entry(node_name.to_string())
            .or_default()
            .push(load);
        Ok(())
    }

    /// Add a distributed load to a member
    pub fn add_member_dist_load(&mut self, member_name: &str, load: DistributedLoad) -> StructResult<()> {
        if !self.members.contains_key(member_name) {
            return Err(StructError::MemberNotFound(member_name.to_string()));
        }
        self.member_dist_loads
            .entry(member_name.to_string())
            .or_default()
            .push(load);
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    pub fn node(&self, name: &str) -> StructResult<&Node> {
        self.nodes
            .get(name)
            .ok_or_else(|| StructError::NodeNotFound(name.to_string()))
    }

    pub fn member(&self, name: &str) -> StructResult<&Member> {
        self.members
            .get(name)
            .ok_or_else(|| StructError::MemberNotFound(name.to_string()))
    }

    /// Section assigned to a member
    pub fn member_section(&self, name: &str) -> StructResult<&Section> {
        let member = self.member(name)?;
        self.sections
            .get(&member.section)
            .ok_or_else(|| StructError::SectionNotFound(member.section.clone()))
    }

    /// Material assigned to a member
    pub fn member_material(&self, name: &str) -> StructResult<&Material> {
        let member = self.member(name)?;
        self.materials
            .get(&member.material)
            .ok_or_else(|| StructError::MaterialNotFound(member.material.clone()))
    }

    /// Length of a member, derived from its node positions
    pub fn member_length(&self, name: &str) -> StructResult<f64> {
        let member = self.member(name)?;
        let i = self.node(&member.i_node)?;
        let j = self.node(&member.j_node)?;
        Ok(i.distance_to(j))
    }

    /// Global-to-local transformation matrix of a member
    pub fn member_transformation(&self, name: &str) -> StructResult<Mat12> {
        let member = self.member(name)?;
        let i = self.node(&member.i_node)?;
        let j = self.node(&member.j_node)?;
        math::member_transformation_matrix(&i.coords(), &j.coords(), member.rotation)
            .ok_or_else(|| StructError::degenerate(name, "member has zero length"))
    }

    /// Names of the load cases that carry at least one load
    pub fn loaded_cases(&self) -> Vec<String> {
        let mut cases: Vec<String> = self
            .node_loads
            .values()
            .flatten()
            .map(|l| l.case.clone())
            .chain(self.member_dist_loads.values().flatten().map(|l| l.case.clone()))
            .collect();
        cases.sort();
        cases.dedup();
        cases
    }

    /// Nodes with at least one active support restraint or spring
    pub fn supported_nodes(&self) -> impl Iterator<Item = &str> {
        self.supports
            .iter()
            .filter(|(_, s)| s.is_active())
            .map(|(name, _)| name.as_str())
    }

    /// Check member references, member lengths and coincident nodes
    pub fn validate_geometry(&self) -> StructResult<()> {
        for (name, member) in &self.members {
            let i = self.node(&member.i_node)?;
            let j = self.node(&member.j_node)?;
            if !self.materials.contains_key(&member.material) {
                return Err(StructError::MaterialNotFound(member.material.clone()));
            }
            if !self.sections.contains_key(&member.section) {
                return Err(StructError::SectionNotFound(member.section.clone()));
            }
            if i.distance_to(j) < MIN_MEMBER_LENGTH {
                return Err(StructError::degenerate(name.as_str(), "member has zero length"));
            }
        }

        if let Some((a, b)) = self.find_coincident_nodes() {
            return Err(StructError::degenerate(
                a,
                format!("coincides with node {}", b),
            ));
        }
        Ok(())
    }

    /// First pair of distinct nodes closer than [`COINCIDENT_TOLERANCE`]
    fn find_coincident_nodes(&self) -> Option<(&str, &str)> {
        let mut sorted: Vec<(&String, &Node)> = self.nodes.iter().collect();
        sorted.sort_by(|a, b| a.1.x.total_cmp(&b.1.x).then_with(|| a.0.cmp(b.0)));

        for (k, (name_a, a)) in sorted.iter().enumerate() {
            for (name_b, b) in sorted[k + 1..].iter() {
                if b.x - a.x > COINCIDENT_TOLERANCE {
                    break;
                }
                if a.distance_to(b) < COINCIDENT_TOLERANCE {
                    return Some((name_a.as_str(), name_b.as_str()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Material;

    fn two_node_model() -> FEModel {
        let mut model = FEModel::new();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(6.0, 0.0, 0.0)).unwrap();
        model
            .add_material("Steel", Material::isotropic(2.1e8, 0.3, 78.5))
            .unwrap();
        model.add_section("Sec", Section::rectangular(0.2, 0.4)).unwrap();
        model
    }

    #[test]
    fn test_add_member_checks_references() {
        let mut model = two_node_model();
        let err = model
            .add_member("M1", Member::new("N1", "N9", "Steel", "Sec"))
            .unwrap_err();
        assert!(matches!(err, StructError::NodeNotFound(n) if n == "N9"));

        let err = model
            .add_member("M1", Member::new("N1", "N2", "Concrete", "Sec"))
            .unwrap_err();
        assert!(matches!(err, StructError::MaterialNotFound(_)));

        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        let err = model
            .add_member("M1", Member::new("N2", "N1", "Steel", "Sec"))
            .unwrap_err();
        assert!(matches!(err, StructError::DuplicateName(_)));
        assert_eq!(model.member_length("M1").unwrap(), 6.0);
    }

    #[test]
    fn test_member_to_itself_is_degenerate() {
        let mut model = two_node_model();
        let err = model
            .add_member("M1", Member::new("N1", "N1", "Steel", "Sec"))
            .unwrap_err();
        assert!(matches!(err, StructError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_coincident_nodes_detected() {
        let mut model = two_node_model();
        model.add_node("N3", Node::new(6.0, 0.0, 1e-9)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model.add_member("M2", Member::new("N1", "N3", "Steel", "Sec")).unwrap();

        match model.validate_geometry().unwrap_err() {
            StructError::DegenerateGeometry { entity, detail } => {
                assert_eq!(entity, "N2");
                assert!(detail.contains("N3"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_loads_require_existing_targets() {
        let mut model = two_node_model();
        assert!(model.add_node_load("N7", NodeLoad::force(1.0, 0.0, 0.0, "Dead")).is_err());
        assert!(model
            .add_member_dist_load("M7", DistributedLoad::uniform_downward(5.0, "Dead"))
            .is_err());

        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model
            .add_member_dist_load("M1", DistributedLoad::uniform_downward(5.0, "Live"))
            .unwrap();
        model.add_node_load("N2", NodeLoad::force(1.0, 0.0, 0.0, "Dead")).unwrap();
        assert_eq!(model.loaded_cases(), vec!["Dead".to_string(), "Live".to_string()]);
    }
}
