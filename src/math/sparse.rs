//! Sparse assembly and skyline factorization of the reduced stiffness matrix
//!
//! Frame stiffness matrices are banded once reordered, so the reduced system
//! is assembled in COO form, reordered with reverse Cuthill-McKee and
//! factored in skyline (profile) storage.

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Triplet accumulator for a square stiffness matrix
///
/// Repeated `(row, col)` entries are summed when the matrix is converted.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    dim: usize,
    triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    pub fn new(dim: usize) -> Self {
        // A frame DOF couples with roughly ten nodes of six DOFs each
        Self {
            dim,
            triplets: Vec::with_capacity(dim * 60),
        }
    }

    /// Queue `value` at `(row, col)`; zeros are skipped
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.triplets.push((row, col, value));
        }
    }

    pub fn size(&self) -> usize {
        self.dim
    }

    /// Stored triplets, before duplicates are summed
    pub fn nnz(&self) -> usize {
        self.triplets.len()
    }

    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.dim, self.dim);
        self.triplets.iter().for_each(|&(r, c, v)| coo.push(r, c, v));
        CsrMatrix::from(&coo)
    }

    /// Dense copy, used to cross-check small systems
    pub fn to_dense(&self) -> DMatrix<f64> {
        self.triplets
            .iter()
            .fold(DMatrix::zeros(self.dim, self.dim), |mut m, &(r, c, v)| {
                m[(r, c)] += v;
                m
            })
    }
}

/// Factorization failure at a pivot, in the ordering of the input matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotFailure {
    /// Row of the failing pivot in the input (unpermuted) ordering
    pub index: usize,
    /// Remaining pivot divided by the original diagonal term
    pub ratio: f64,
}

/// Cholesky factor L (K = L·Lᵀ) of a symmetric positive definite matrix in
/// skyline row storage, with the RCM permutation applied.
///
/// A pivot that falls to `tolerance` times its original diagonal term or
/// below marks the matrix as singular: the lost digits correspond to a
/// rigid-body mode or a mechanism.
#[derive(Debug, Clone)]
pub struct SkylineCholesky {
    size: usize,
    // row i stores L[i, i - heights[i] ..= i]
    skyline: Vec<Vec<f64>>,
    heights: Vec<usize>,
    // perm[new] = old
    perm: Vec<usize>,
}

impl SkylineCholesky {
    /// Reorder and factor a symmetric matrix
    pub fn factor(csr: &CsrMatrix<f64>, tolerance: f64) -> Result<Self, PivotFailure> {
        let size = csr.nrows();
        let perm = reverse_cuthill_mckee(csr);
        let inv = inverse_permutation(&perm);

        // Skyline profile of the permuted matrix
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            let (r, c) = (inv[row], inv[col]);
            if c < r {
                heights[r] = heights[r].max(r - c);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();
        for (row, col, &val) in csr.triplet_iter() {
            let (r, c) = (inv[row], inv[col]);
            if c <= r {
                skyline[r][c + heights[r] - r] += val;
            }
        }

        let mut factor = Self {
            size,
            skyline,
            heights,
            perm,
        };
        factor.factorize(tolerance)?;
        Ok(factor)
    }

    fn factorize(&mut self, tolerance: f64) -> Result<(), PivotFailure> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;
            let original = self.skyline[i][hi];

            // L[i,j] for j < i
            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            // L[i,i]
            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let pivot = original - sum;
            let ratio = if original > 0.0 { pivot / original } else { 0.0 };
            if pivot.is_nan() || pivot <= 0.0 || ratio <= tolerance {
                return Err(PivotFailure {
                    index: self.perm[i],
                    ratio,
                });
            }
            self.skyline[i][hi] = pivot.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        let start = row - self.heights[row];
        if col < start || col > row {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.size
    }

    /// Solve K·x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = DVector::from_iterator(self.size, self.perm.iter().map(|&old| b[old]));

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        let mut out = DVector::zeros(self.size);
        for (new, &old) in self.perm.iter().enumerate() {
            out[old] = x[new];
        }
        out
    }
}

/// Reverse Cuthill-McKee ordering of the matrix graph, as `perm[new] = old`
///
/// Every connected component is walked breadth first from its lowest-degree
/// row, visiting neighbours by increasing degree.
pub fn reverse_cuthill_mckee(csr: &CsrMatrix<f64>) -> Vec<usize> {
    let n = csr.nrows();
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (row, col, &value) in csr.triplet_iter() {
        if row != col && value != 0.0 {
            neighbours[row].push(col);
        }
    }
    let degree: Vec<usize> = neighbours.iter().map(Vec::len).collect();
    for list in &mut neighbours {
        list.sort_unstable_by_key(|&k| (degree[k], k));
    }

    let mut order = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    let mut frontier = VecDeque::new();
    while let Some(root) = (0..n).filter(|&k| !seen[k]).min_by_key(|&k| (degree[k], k)) {
        seen[root] = true;
        frontier.push_back(root);
        while let Some(row) = frontier.pop_front() {
            order.push(row);
            for &next in &neighbours[row] {
                if !seen[next] {
                    seen[next] = true;
                    frontier.push_back(next);
                }
            }
        }
    }
    order.reverse();
    order
}

/// `inv[old] = new` for a permutation `perm[new] = old`
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    perm.iter().enumerate().for_each(|(new, &old)| inv[old] = new);
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tridiagonal(n: usize) -> SparseMatrixBuilder {
        let mut builder = SparseMatrixBuilder::new(n);
        for i in 0..n {
            builder.add(i, i, 4.0);
            if i + 1 < n {
                builder.add(i, i + 1, -1.0);
                builder.add(i + 1, i, -1.0);
            }
        }
        builder
    }

    #[test]
    fn test_sparse_builder_accumulates() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 4.0);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, 0.0);
        let dense = builder.to_dense();
        assert_relative_eq!(dense[(0, 0)], 5.0);
        assert_eq!(builder.nnz(), 2);
    }

    #[test]
    fn test_skyline_solve_matches_dense() {
        let builder = tridiagonal(6);
        let csr = builder.to_csr();
        let chol = SkylineCholesky::factor(&csr, 1e-12).unwrap();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let x = chol.solve(&b);
        let residual = builder.to_dense() * &x - &b;
        assert!(residual.norm() < 1e-10, "residual {}", residual.norm());
    }

    #[test]
    fn test_singular_matrix_reports_pivot() {
        // Two springs in series with no ground: rigid-body mode
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 1.0);
        let err = SkylineCholesky::factor(&builder.to_csr(), 1e-10).unwrap_err();
        assert!(err.ratio <= 1e-10);
    }

    #[test]
    fn test_zero_diagonal_is_singular() {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 2.0);
        builder.add(2, 2, 2.0);
        let err = SkylineCholesky::factor(&builder.to_csr(), 1e-10).unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_rcm_is_permutation() {
        let perm = reverse_cuthill_mckee(&tridiagonal(5).to_csr());
        let mut sorted = perm.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        let inv = inverse_permutation(&perm);
        for (new, &old) in perm.iter().enumerate() {
            assert_eq!(inv[old], new);
        }
    }
}
