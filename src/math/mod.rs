//! Frame element matrices and the sparse solver

pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, Matrix4, SMatrix, SVector, Vector3};

pub use sparse::{reverse_cuthill_mckee, PivotFailure, SkylineCholesky, SparseMatrixBuilder};

pub type Mat3 = Matrix3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Members shorter than this are degenerate
pub const MIN_MEMBER_LENGTH: f64 = 1e-9;

const AXIS_TOLERANCE: f64 = 1e-10;

/// Local axes of a member, one unit vector per row
///
/// Local x runs from the i node to the j node. A horizontal member keeps
/// local y on global Y. A vertical member keeps local z on global Z, so
/// sway in the XY plane bends columns about local z. An inclined member keeps
/// local z horizontal. `rotation` (radians) then turns y and z about local x.
///
/// Returns `None` for a zero-length member.
pub fn member_axes(i_node: &[f64; 3], j_node: &[f64; 3], rotation: f64) -> Option<Mat3> {
    let d = Vector3::from(*j_node) - Vector3::from(*i_node);
    let length = d.norm();
    if length < MIN_MEMBER_LENGTH {
        return None;
    }
    let x = d / length;

    let (y, z) = if x.x.abs() < AXIS_TOLERANCE && x.z.abs() < AXIS_TOLERANCE {
        let y = if x.y > 0.0 { -Vector3::<f64>::x() } else { Vector3::x() };
        (y, Vector3::z())
    } else if d.y.abs() < AXIS_TOLERANCE {
        let y = Vector3::y();
        (y, x.cross(&y).normalize())
    } else {
        let plan = Vector3::new(d.x, 0.0, d.z);
        let z = if x.y > 0.0 { plan.cross(&x) } else { x.cross(&plan) };
        let z = z.normalize();
        (z.cross(&x).normalize(), z)
    };

    let (sin_r, cos_r) = rotation.sin_cos();
    let (y, z) = (y * cos_r + z * sin_r, z * cos_r - y * sin_r);
    Some(Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]))
}

/// Global-to-local transformation of a 12-DOF frame element
///
/// The member axes fill the four 3x3 diagonal blocks.
pub fn member_transformation_matrix(
    i_node: &[f64; 3],
    j_node: &[f64; 3],
    rotation: f64,
) -> Option<Mat12> {
    let r = member_axes(i_node, j_node, rotation)?;
    let mut t = Mat12::zeros();
    for block in 0..4 {
        t.fixed_view_mut::<3, 3>(3 * block, 3 * block).copy_from(&r);
    }
    Some(t)
}

/// First diagonal block of a transformation matrix
pub fn extract_rotation_matrix(t: &Mat12) -> Mat3 {
    t.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Two-node spring between local DOFs `p` and `q`
fn add_spring(k: &mut Mat12, p: usize, q: usize, stiffness: f64) {
    k[(p, p)] += stiffness;
    k[(q, q)] += stiffness;
    k[(p, q)] -= stiffness;
    k[(q, p)] -= stiffness;
}

/// Euler-Bernoulli bending in one plane over DOFs `[v_i, θ_i, v_j, θ_j]`
///
/// `sign` is -1 for bending about local y, where a positive rotation lowers
/// the far end.
fn add_bending(k: &mut Mat12, dofs: [usize; 4], ei: f64, l: f64, sign: f64) {
    let k12 = 12.0 * ei / l.powi(3);
    let k6 = sign * 6.0 * ei / l.powi(2);
    let k4 = 4.0 * ei / l;
    let k2 = 2.0 * ei / l;
    #[rustfmt::skip]
    let block = Matrix4::new(
         k12,  k6, -k12,  k6,
          k6,  k4,  -k6,  k2,
        -k12, -k6,  k12, -k6,
          k6,  k2,  -k6,  k4,
    );
    for (a, &p) in dofs.iter().enumerate() {
        for (b, &q) in dofs.iter().enumerate() {
            k[(p, q)] += block[(a, b)];
        }
    }
}

/// Local stiffness of a 3D frame element
///
/// DOF order per node is `[u, v, w, θx, θy, θz]`, node i then node j.
/// `iy` and `iz` are the second moments about local y and z; `j` is the
/// torsion constant.
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let mut k = Mat12::zeros();
    add_spring(&mut k, 0, 6, e * a / length);
    add_spring(&mut k, 3, 9, g * j / length);
    add_bending(&mut k, [1, 5, 7, 11], e * iz, length, 1.0);
    add_bending(&mut k, [2, 4, 8, 10], e * iy, length, -1.0);
    k
}

/// Apply static condensation for released DOFs
///
/// Returns the condensed stiffness `k11 - k12·k22⁻¹·k21` and fixed end
/// reactions `fer1 - k12·k22⁻¹·fer2`, expanded back to 12 components with
/// zeros at the released DOFs. When `k22` is singular the released rows and
/// columns are simply dropped; the global assembly then reports the mechanism.
///
/// # Arguments
/// * `k` - Full local stiffness matrix
/// * `fer` - Uncondensed fixed end reaction vector
/// * `releases` - Boolean array indicating which DOFs are released
pub fn condense_releases(k: &Mat12, fer: &Vec12, releases: &[bool; 12]) -> (Mat12, Vec12) {
    let (released, kept): (std::vec::Vec<usize>, std::vec::Vec<usize>) =
        (0..12).partition(|&i| releases[i]);

    if released.is_empty() {
        return (*k, *fer);
    }

    let n1 = kept.len();
    let n2 = released.len();

    let k11 = DMatrix::from_fn(n1, n1, |i, j| k[(kept[i], kept[j])]);
    let k12 = DMatrix::from_fn(n1, n2, |i, j| k[(kept[i], released[j])]);
    let k21 = DMatrix::from_fn(n2, n1, |i, j| k[(released[i], kept[j])]);
    let k22 = DMatrix::from_fn(n2, n2, |i, j| k[(released[i], released[j])]);
    let fer1 = DVector::from_fn(n1, |i, _| fer[kept[i]]);
    let fer2 = DVector::from_fn(n2, |i, _| fer[released[i]]);

    let (k_cond, fer_cond) = match k22.try_inverse() {
        Some(k22_inv) => {
            let coupling = &k12 * &k22_inv;
            (&k11 - &coupling * &k21, &fer1 - &coupling * &fer2)
        }
        None => (k11, fer1),
    };

    let mut k_out = Mat12::zeros();
    let mut fer_out = Vec12::zeros();
    for (i, &ki) in kept.iter().enumerate() {
        fer_out[ki] = fer_cond[i];
        for (j, &kj) in kept.iter().enumerate() {
            k_out[(ki, kj)] = k_cond[(i, j)];
        }
    }

    (k_out, fer_out)
}

/// Fixed end reactions of a uniform load `w` along local axis `direction`
/// (0 = x, 1 = y, 2 = z)
pub fn fer_uniform_load(w: f64, length: f64, direction: usize) -> Vec12 {
    let end_force = -w * length / 2.0;
    let end_moment = w * length * length / 12.0;
    let mut fer = Vec12::zeros();
    match direction {
        0 => {
            fer[0] = end_force;
            fer[6] = end_force;
        }
        1 => {
            fer[1] = end_force;
            fer[7] = end_force;
            fer[5] = -end_moment;
            fer[11] = end_moment;
        }
        2 => {
            fer[2] = end_force;
            fer[8] = end_force;
            fer[4] = end_moment;
            fer[10] = -end_moment;
        }
        _ => {}
    }
    fer
}

/// Fixed end reactions for uniform loads `[wx, wy, wz]` in local axes
pub fn fer_local_uniform(w: &[f64; 3], length: f64) -> Vec12 {
    (0..3)
        .filter(|&d| w[d] != 0.0)
        .fold(Vec12::zeros(), |acc, d| acc + fer_uniform_load(w[d], length, d))
}
