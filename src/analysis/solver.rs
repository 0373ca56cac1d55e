//! Linear static frame solver
//!
//! [`FemSolver::prepare`] assembles and factors the free-DOF stiffness matrix
//! of a model once. Each [`PreparedModel::solve`] then builds the factored
//! load vector of one combination, back-substitutes and recovers member end
//! forces and support reactions. The prepared model is read-only, so
//! combinations can be solved concurrently.

use std::collections::BTreeMap;

use log::{debug, warn};
use nalgebra::{DVector, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::AnalysisOptions;
use crate::error::{StructError, StructResult};
use crate::loads::LoadCombination;
use crate::math::{self, Mat12, Mat3, PivotFailure, SkylineCholesky, SparseMatrixBuilder, Vec12};
use crate::model::FEModel;
use crate::results::{AnalysisResult, MemberResult, NodeDisplacement, Reactions};

const DOF_NAMES: [&str; 6] = ["DX", "DY", "DZ", "RX", "RY", "RZ"];

/// Per-member data reused by every combination
#[derive(Debug, Clone)]
struct ElementData {
    i: usize,
    j: usize,
    length: f64,
    t: Mat12,
    rotation: Mat3,
    /// Uncondensed local stiffness, needed to condense fixed end reactions
    k_full: Mat12,
    /// Local stiffness with end releases condensed out
    k_local: Mat12,
    releases: [bool; 12],
    ei_major: f64,
    ei_minor: f64,
}

impl ElementData {
    /// Global DOF indices of the member ends
    fn dofs(&self) -> [usize; 12] {
        let mut dofs = [0; 12];
        for k in 0..6 {
            dofs[k] = self.i * 6 + k;
            dofs[k + 6] = self.j * 6 + k;
        }
        dofs
    }
}

/// Linear static solver for frame models
#[derive(Debug, Clone, Default)]
pub struct FemSolver {
    options: AnalysisOptions,
}

impl FemSolver {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Number the DOFs, assemble the free-DOF stiffness matrix and factor it
    ///
    /// Geometry errors are returned here. A singular stiffness matrix is not:
    /// it is recorded and reported by every [`PreparedModel::solve`] call
    /// with the label of the combination being solved.
    pub fn prepare<'m>(&self, model: &'m FEModel) -> StructResult<PreparedModel<'m>> {
        model.validate_geometry()?;

        let node_names: Vec<String> = model.nodes.keys().cloned().collect();
        let node_index: BTreeMap<&str, usize> = node_names
            .iter()
            .enumerate()
            .map(|(k, name)| (name.as_str(), k))
            .collect();

        // Free DOF numbering in node order; restrained DOFs are removed
        let n_dofs = node_names.len() * 6;
        let mut dof_map: Vec<Option<usize>> = vec![None; n_dofs];
        let mut free_dofs: Vec<usize> = Vec::new();
        for (k, name) in node_names.iter().enumerate() {
            let support = model.supports.get(name);
            for d in 0..6 {
                let restrained = support.is_some_and(|s| s.is_restrained(d));
                if !restrained {
                    dof_map[k * 6 + d] = Some(free_dofs.len());
                    free_dofs.push(k * 6 + d);
                }
            }
        }

        let mut elements = BTreeMap::new();
        for (name, member) in &model.members {
            let material = model.member_material(name)?;
            let section = model.member_section(name)?;
            let t = model.member_transformation(name)?;
            let length = model.member_length(name)?;

            let k_full = math::member_local_stiffness(
                material.e,
                material.g,
                section.a,
                section.iy,
                section.iz,
                section.j,
                length,
            );
            let releases = member.releases.as_array();
            let (k_local, _) = math::condense_releases(&k_full, &Vec12::zeros(), &releases);

            elements.insert(
                name.clone(),
                ElementData {
                    i: node_index[member.i_node.as_str()],
                    j: node_index[member.j_node.as_str()],
                    length,
                    t,
                    rotation: math::extract_rotation_matrix(&t),
                    k_full,
                    k_local,
                    releases,
                    ei_major: material.e * section.iz,
                    ei_minor: material.e * section.iy,
                },
            );
        }

        // Assemble K = Σ Tᵀ·k·T over free DOFs, plus support springs
        let mut builder = SparseMatrixBuilder::new(free_dofs.len());
        for element in elements.values() {
            let k_global = element.t.transpose() * element.k_local * element.t;
            let dofs = element.dofs();
            for (a, &ga) in dofs.iter().enumerate() {
                let Some(row) = dof_map[ga] else { continue };
                for (b, &gb) in dofs.iter().enumerate() {
                    if let Some(col) = dof_map[gb] {
                        builder.add(row, col, k_global[(a, b)]);
                    }
                }
            }
        }
        for (name, support) in &model.supports {
            let k = node_index[name.as_str()];
            for d in 0..6 {
                if let Some(row) = dof_map[k * 6 + d] {
                    if support.springs[d] > 0.0 {
                        builder.add(row, row, support.springs[d]);
                    }
                }
            }
        }

        debug!(
            "assembled {} free DOFs ({} non-zeros) for {} members",
            builder.size(),
            builder.nnz(),
            elements.len()
        );

        let factor = if free_dofs.is_empty() {
            Ok(None)
        } else {
            let csr = builder.to_csr();
            SkylineCholesky::factor(&csr, self.options.pivot_tolerance)
                .map(Some)
                .map_err(|failure| describe_pivot(&failure, &free_dofs, &node_names))
        };
        if let Err(detail) = &factor {
            warn!("stiffness matrix is singular: {}", detail);
        }

        Ok(PreparedModel {
            model,
            options: self.options.clone(),
            node_names,
            dof_map,
            elements,
            factor,
        })
    }
}

fn describe_pivot(failure: &PivotFailure, free_dofs: &[usize], node_names: &[String]) -> String {
    let global = free_dofs[failure.index];
    format!(
        "singular stiffness at node {} {} (pivot ratio {:.3e})",
        node_names[global / 6],
        DOF_NAMES[global % 6],
        failure.ratio
    )
}

/// A model with its stiffness matrix assembled and factored
pub struct PreparedModel<'m> {
    model: &'m FEModel,
    options: AnalysisOptions,
    node_names: Vec<String>,
    dof_map: Vec<Option<usize>>,
    elements: BTreeMap<String, ElementData>,
    /// `Ok(None)` when the model has no free DOF; `Err` holds the instability detail
    factor: Result<Option<SkylineCholesky>, String>,
}

impl<'m> PreparedModel<'m> {
    pub fn model(&self) -> &FEModel {
        self.model
    }

    /// Number of free DOFs
    pub fn free_dof_count(&self) -> usize {
        self.dof_map.iter().filter(|d| d.is_some()).count()
    }

    /// Whether the stiffness matrix factored successfully
    pub fn is_stable(&self) -> bool {
        self.factor.is_ok()
    }

    /// Factored uniform load of a member in local axes
    fn member_w_local(&self, name: &str, element: &ElementData, combo: &LoadCombination) -> [f64; 3] {
        let mut w = Vector3::zeros();
        for load in self.model.member_dist_loads.get(name).into_iter().flatten() {
            let factor = combo.factor(&load.case);
            if factor == 0.0 {
                continue;
            }
            let (axis, global) = load.direction.axis();
            let mut v = Vector3::zeros();
            v[axis] = factor * load.w;
            w += if global { element.rotation * v } else { v };
        }
        [w[0], w[1], w[2]]
    }

    /// Fixed end reactions of a member, condensed for its releases
    fn member_fer(&self, element: &ElementData, w_local: &[f64; 3]) -> Vec12 {
        let fer = math::fer_local_uniform(w_local, element.length);
        if element.releases.iter().any(|&r| r) {
            math::condense_releases(&element.k_full, &fer, &element.releases).1
        } else {
            fer
        }
    }

    /// Solve one combination
    pub fn solve(&self, combo: &LoadCombination) -> StructResult<AnalysisResult> {
        let factor = self.factor.as_ref().map_err(|detail| StructError::Instability {
            combination: combo.label.clone(),
            detail: detail.clone(),
        })?;

        let n_nodes = self.node_names.len();
        let node_index: BTreeMap<&str, usize> = self
            .node_names
            .iter()
            .enumerate()
            .map(|(k, name)| (name.as_str(), k))
            .collect();

        // Factored node loads as a full-length global vector
        let mut applied = vec![0.0; n_nodes * 6];
        for (node, loads) in &self.model.node_loads {
            let k = node_index[node.as_str()];
            for load in loads {
                let factor = combo.factor(&load.case);
                for (d, v) in load.as_array().into_iter().enumerate() {
                    applied[k * 6 + d] += factor * v;
                }
            }
        }

        let mut loads_local: BTreeMap<&str, ([f64; 3], Vec12)> = BTreeMap::new();
        for (name, element) in &self.elements {
            let w_local = self.member_w_local(name, element, combo);
            let fer = self.member_fer(element, &w_local);
            loads_local.insert(name.as_str(), (w_local, fer));
        }

        // P = node loads - Σ Tᵀ·FER on the free DOFs
        let free_count = self.free_dof_count();
        let mut p = DVector::zeros(free_count);
        for (g, &value) in applied.iter().enumerate() {
            if let Some(row) = self.dof_map[g] {
                p[row] += value;
            }
        }
        for (name, element) in &self.elements {
            let fer_global = element.t.transpose() * loads_local[name.as_str()].1;
            for (a, &g) in element.dofs().iter().enumerate() {
                if let Some(row) = self.dof_map[g] {
                    p[row] -= fer_global[a];
                }
            }
        }

        let d_free = match factor {
            Some(f) => f.solve(&p),
            None => DVector::zeros(0),
        };
        let mut d_all = vec![0.0; n_nodes * 6];
        for (g, slot) in self.dof_map.iter().enumerate() {
            if let Some(row) = slot {
                d_all[g] = d_free[*row];
            }
        }

        let displacements: BTreeMap<String, NodeDisplacement> = self
            .node_names
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let mut arr = [0.0; 6];
                arr.copy_from_slice(&d_all[k * 6..k * 6 + 6]);
                (name.clone(), NodeDisplacement::from_array(arr))
            })
            .collect();

        // Member end forces f = k·T·d + FER, and their global sum per node
        let mut members = BTreeMap::new();
        let mut nodal_sum = vec![0.0; n_nodes * 6];
        for (name, element) in &self.elements {
            let dofs = element.dofs();
            let d_global = Vec12::from_iterator(dofs.iter().map(|&g| d_all[g]));
            let (w_local, fer) = loads_local[name.as_str()];
            let f_local = element.k_local * (element.t * d_global) + fer;

            let f_global = element.t.transpose() * f_local;
            for (a, &g) in dofs.iter().enumerate() {
                nodal_sum[g] += f_global[a];
            }

            let mut end_forces = [0.0; 12];
            end_forces.copy_from_slice(f_local.as_slice());
            members.insert(
                name.clone(),
                MemberResult {
                    end_forces,
                    w_local,
                    length: element.length,
                    ei_major: element.ei_major,
                    ei_minor: element.ei_minor,
                },
            );
        }

        // Reactions: member end forces minus applied node loads, kept only on supported DOFs
        let mut reactions = BTreeMap::new();
        for (name, support) in &self.model.supports {
            if !support.is_active() {
                continue;
            }
            let k = node_index[name.as_str()];
            let mut r = [0.0; 6];
            for (d, slot) in r.iter_mut().enumerate() {
                if support.is_restrained(d) || support.springs[d] > 0.0 {
                    *slot = nodal_sum[k * 6 + d] - applied[k * 6 + d];
                }
            }
            reactions.insert(name.clone(), Reactions::from_array(r));
        }

        let result = AnalysisResult {
            combination: combo.label.clone(),
            limit_state: combo.limit_state,
            displacements,
            members,
            reactions,
        };

        if self.options.check_statics {
            self.check_statics(&result, &applied);
        }
        debug!("solved {}", combo.label);
        Ok(result)
    }

    /// Solve every combination, concurrently when the `parallel` feature is on
    ///
    /// Results come back in input order.
    pub fn solve_all(&self, combos: &[LoadCombination]) -> Vec<StructResult<AnalysisResult>> {
        #[cfg(feature = "parallel")]
        {
            combos.par_iter().map(|c| self.solve(c)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            combos.iter().map(|c| self.solve(c)).collect()
        }
    }

    /// Sum of applied node loads and span loads must balance the reactions
    fn check_statics(&self, result: &AnalysisResult, applied: &[f64]) {
        let mut total = Vector3::zeros();
        for node in applied.chunks(6) {
            total += Vector3::new(node[0], node[1], node[2]);
        }
        for (name, element) in &self.elements {
            if let Some(member) = result.members.get(name) {
                let w = Vector3::new(member.w_local[0], member.w_local[1], member.w_local[2]);
                total += element.rotation.transpose() * w * element.length;
            }
        }

        let r = result.total_reaction();
        let reaction = Vector3::new(r[0], r[1], r[2]);
        let imbalance = (total + reaction).norm();
        let scale = total.norm().max(1.0);
        if imbalance > self.options.statics_tolerance * scale {
            warn!(
                "{}: applied loads and reactions differ by {:.4e} kN",
                result.combination, imbalance
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Member, MemberReleases, Node, Section, Support};
    use crate::loads::{DistributedLoad, LimitState, LoadCategory, CombinationTerm, NodeLoad};
    use approx::assert_relative_eq;

    fn unit_combo(case: &str) -> LoadCombination {
        LoadCombination::new(
            "TEST".into(),
            LimitState::Uls,
            vec![CombinationTerm {
                case: case.into(),
                category: LoadCategory::Dead,
                factor: 1.0,
            }],
        )
    }

    fn base_model() -> FEModel {
        let mut model = FEModel::new();
        model.add_material("Steel", Material::isotropic(2.0e8, 0.3, 78.5)).unwrap();
        model.add_section("Sec", Section::rectangular(0.2, 0.4)).unwrap();
        model
    }

    #[test]
    fn test_cantilever_tip_load() {
        let mut model = base_model();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(4.0, 0.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model.add_node_load("N2", NodeLoad::force(0.0, -10.0, 0.0, "Dead")).unwrap();

        let prepared = FemSolver::default().prepare(&model).unwrap();
        let result = prepared.solve(&unit_combo("Dead")).unwrap();

        let ei = 2.0e8 * 0.2 * 0.4_f64.powi(3) / 12.0;
        let tip = result.node_displacement("N2").unwrap();
        assert_relative_eq!(tip.dy, -10.0 * 64.0 / (3.0 * ei), max_relative = 1e-9);

        let r = result.reaction("N1");
        assert_relative_eq!(r.fy, 10.0, epsilon = 1e-8);
        assert_relative_eq!(r.mz, 40.0, epsilon = 1e-8);

        let member = result.member("M1").unwrap();
        assert_relative_eq!(member.max_hogging_moment(), 40.0, epsilon = 1e-8);
    }

    #[test]
    fn test_pinned_member_carries_no_end_moment() {
        // Propped cantilever built as a fixed member with a pinned j-end release
        let mut model = base_model();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(5.0, 0.0, 0.0)).unwrap();
        model
            .add_member(
                "M1",
                Member::new("N1", "N2", "Steel", "Sec").with_releases(MemberReleases::pin_j()),
            )
            .unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model.add_support("N2", Support::fixed()).unwrap();
        model
            .add_member_dist_load("M1", DistributedLoad::uniform_downward(8.0, "Dead"))
            .unwrap();

        let prepared = FemSolver::default().prepare(&model).unwrap();
        assert_eq!(prepared.free_dof_count(), 0);
        let result = prepared.solve(&unit_combo("Dead")).unwrap();
        let member = result.member("M1").unwrap();

        // Fixed-pinned: hogging wL²/8 at the fixed end, zero at the pin
        assert_relative_eq!(member.moment_major_at(5.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(member.max_hogging_moment(), 8.0 * 25.0 / 8.0, epsilon = 1e-9);
        assert_relative_eq!(result.reaction("N1").fy, 5.0 * 8.0 * 5.0 / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mechanism_reports_instability_with_combination_label() {
        let mut model = base_model();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(4.0, 0.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model.add_support("N1", Support::pinned()).unwrap();

        let prepared = FemSolver::default().prepare(&model).unwrap();
        assert!(!prepared.is_stable());
        match prepared.solve(&unit_combo("Dead")).unwrap_err() {
            StructError::Instability { combination, detail } => {
                assert_eq!(combination, "TEST");
                assert!(detail.contains("singular"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_spring_support_reaction() {
        let mut model = base_model();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(0.0, 3.0, 0.0)).unwrap();
        model.add_member("C1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model
            .add_support("N1", Support::with_restraints(true, false, true, true, true, true).with_spring(1, 1.0e4))
            .unwrap();
        model.add_node_load("N2", NodeLoad::force(0.0, -50.0, 0.0, "Dead")).unwrap();

        let prepared = FemSolver::default().prepare(&model).unwrap();
        let result = prepared.solve(&unit_combo("Dead")).unwrap();
        assert_relative_eq!(result.reaction("N1").fy, 50.0, epsilon = 1e-6);
        assert_relative_eq!(
            result.node_displacement("N1").unwrap().dy,
            -50.0 / 1.0e4,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_solve_all_keeps_order() {
        let mut model = base_model();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(4.0, 0.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "Sec")).unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model.add_node_load("N2", NodeLoad::force(0.0, -10.0, 0.0, "Dead")).unwrap();

        let combos: Vec<_> = (1..=4)
            .map(|k| {
                let mut c = unit_combo("Dead");
                c.label = format!("C{k}");
                c.terms[0].factor = k as f64;
                c
            })
            .collect();
        let prepared = FemSolver::default().prepare(&model).unwrap();
        let results = prepared.solve_all(&combos);
        for (k, result) in results.iter().enumerate() {
            let result = result.as_ref().unwrap();
            assert_eq!(result.combination, format!("C{}", k + 1));
            assert_relative_eq!(result.reaction("N1").fy, 10.0 * (k + 1) as f64, epsilon = 1e-8);
        }
    }
}
