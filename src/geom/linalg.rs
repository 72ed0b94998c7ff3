//! Dense matrices and LU factorization for the fitting systems.
//!
//! Collocation matrices of B-splines are banded and diagonally dominant in
//! practice, but tangent rows and normal equations are not, so the
//! factorization always pivots on the largest remaining entry of a column.

use std::ops::{Index, IndexMut};

use super::core::Tolerance;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("matrix is singular at pivot {pivot}")]
    Singular { pivot: usize },
    #[error("matrix has no rows or columns")]
    Empty,
}

/// Row-major dense matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self::from_diagonals(n, &[(0, 1.0)])
    }

    /// Square `n x n` matrix with constant bands.
    ///
    /// Each `(offset, value)` pair fills the diagonal `offset` places right of
    /// the main one (negative offsets go left). Later pairs overwrite earlier
    /// ones where they overlap.
    #[must_use]
    pub fn from_diagonals(n: usize, bands: &[(isize, f64)]) -> Self {
        let mut matrix = Self::zeros(n, n);
        for &(offset, value) in bands {
            for row in 0..n {
                let Some(col) = row.checked_add_signed(offset) else {
                    continue;
                };
                if col < n {
                    matrix[(row, col)] = value;
                }
            }
        }
        matrix
    }

    /// Build from row vectors. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LinalgError> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(row_count * cols);
        for row in rows {
            if row.len() != cols {
                return Err(LinalgError::DimensionMismatch {
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: row_count,
            cols,
            data,
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        &mut self.data[index * self.cols..(index + 1) * self.cols]
    }

    /// Insert a row before `index`, shifting later rows down.
    pub fn insert_row(&mut self, index: usize, row: &[f64]) -> Result<(), LinalgError> {
        if row.len() != self.cols {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols,
                found: row.len(),
            });
        }
        let at = index.min(self.rows) * self.cols;
        self.data.splice(at..at, row.iter().copied());
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self, LinalgError> {
        if self.cols != rhs.rows {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols,
                found: rhs.rows,
            });
        }
        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    out[(i, j)] += a * rhs[(k, j)];
                }
            }
        }
        Ok(out)
    }

    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>, LinalgError> {
        if v.len() != self.cols {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols,
                found: v.len(),
            });
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Largest absolute entry, 0 for an empty matrix.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row * self.cols + col]
    }
}

/// `PA = LU` with unit-diagonal `L` stored below the diagonal of `lu`.
///
/// Factor once, then call [`solve`](Self::solve) for every right-hand side.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Matrix,
    permutation: Vec<usize>,
}

impl LuDecomposition {
    /// Gaussian elimination with partial pivoting.
    ///
    /// A pivot smaller than [`Tolerance::PIVOT`] times the largest entry of the
    /// input is reported as [`LinalgError::Singular`].
    pub fn decompose(matrix: &Matrix) -> Result<Self, LinalgError> {
        if !matrix.is_square() {
            return Err(LinalgError::NotSquare {
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        let n = matrix.rows();
        if n == 0 {
            return Err(LinalgError::Empty);
        }

        let threshold = Tolerance::PIVOT.eps * matrix.max_abs().max(1.0);
        let mut lu = matrix.clone();
        let mut permutation: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut max_row = k;
            let mut max_val = lu[(k, k)].abs();
            for i in (k + 1)..n {
                if lu[(i, k)].abs() > max_val {
                    max_val = lu[(i, k)].abs();
                    max_row = i;
                }
            }

            if max_val <= threshold {
                return Err(LinalgError::Singular { pivot: k });
            }

            if max_row != k {
                for j in 0..n {
                    lu.data.swap(k * n + j, max_row * n + j);
                }
                permutation.swap(k, max_row);
            }

            let pivot = lu[(k, k)];
            for i in (k + 1)..n {
                let factor = lu[(i, k)] / pivot;
                lu[(i, k)] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    let upper = lu[(k, j)];
                    lu[(i, j)] -= factor * upper;
                }
            }
        }

        Ok(Self { lu, permutation })
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.lu.rows()
    }

    /// Row permutation applied during factorization (`P` as an index map).
    #[must_use]
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Solve `A x = rhs` with the stored factors.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LinalgError> {
        let n = self.dim();
        if rhs.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: rhs.len(),
            });
        }

        // Forward substitution on the permuted right-hand side.
        let mut x: Vec<f64> = self.permutation.iter().map(|&p| rhs[p]).collect();
        for i in 0..n {
            let row = self.lu.row(i);
            let sum: f64 = row[..i].iter().zip(&x[..i]).map(|(l, y)| l * y).sum();
            x[i] -= sum;
        }

        // Back substitution.
        for i in (0..n).rev() {
            let row = self.lu.row(i);
            let sum: f64 = row[i + 1..].iter().zip(&x[i + 1..]).map(|(u, v)| u * v).sum();
            x[i] = (x[i] - sum) / row[i];
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-10, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn identity_and_bands() {
        let id = Matrix::identity(3);
        assert_eq!(id.row(1), &[0.0, 1.0, 0.0]);

        let tri = Matrix::from_diagonals(4, &[(-1, 1.0), (0, 4.0), (1, 1.0)]);
        assert_eq!(tri.row(0), &[4.0, 1.0, 0.0, 0.0]);
        assert_eq!(tri.row(2), &[0.0, 1.0, 4.0, 1.0]);
        assert_eq!(tri.row(3), &[0.0, 0.0, 1.0, 4.0]);
    }

    #[test]
    fn transpose_and_multiply() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let at = a.transpose();
        assert_eq!(at.rows(), 3);
        assert_eq!(at.row(2), &[3.0, 6.0]);

        let ata = at.mul(&a).unwrap();
        assert_eq!(ata.row(0), &[17.0, 22.0, 27.0]);
        assert_eq!(ata, ata.transpose());

        assert_eq!(a.mul_vec(&[1.0, 0.0, -1.0]).unwrap(), vec![-2.0, -2.0]);
        assert!(a.mul(&a).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err, LinalgError::DimensionMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn insert_row_shifts_following_rows() {
        let mut m = Matrix::identity(2);
        m.insert_row(1, &[5.0, 6.0]).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(0), &[1.0, 0.0]);
        assert_eq!(m.row(1), &[5.0, 6.0]);
        assert_eq!(m.row(2), &[0.0, 1.0]);
    }

    #[test]
    fn lu_solves_with_pivoting() {
        // Zero in the leading position forces a row swap.
        let a = Matrix::from_rows(vec![
            vec![0.0, 2.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![2.0, 0.0, 3.0],
        ])
        .unwrap();
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_ne!(lu.permutation(), &[0, 1, 2]);

        let expected = [1.0, -2.0, 3.0];
        let b = a.mul_vec(&expected).unwrap();
        assert_close(&lu.solve(&b).unwrap(), &expected);

        // The same factorization serves a second right-hand side.
        let expected2 = [0.5, 0.25, -1.0];
        let b2 = a.mul_vec(&expected2).unwrap();
        assert_close(&lu.solve(&b2).unwrap(), &expected2);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(
            LuDecomposition::decompose(&a).unwrap_err(),
            LinalgError::Singular { pivot: 1 }
        );
    }

    #[test]
    fn non_square_and_empty_are_rejected() {
        let a = Matrix::zeros(2, 3);
        assert_eq!(
            LuDecomposition::decompose(&a).unwrap_err(),
            LinalgError::NotSquare { rows: 2, cols: 3 }
        );
        assert_eq!(
            LuDecomposition::decompose(&Matrix::zeros(0, 0)).unwrap_err(),
            LinalgError::Empty
        );
    }

    #[test]
    fn solve_checks_rhs_length() {
        let lu = LuDecomposition::decompose(&Matrix::identity(2)).unwrap();
        assert!(lu.solve(&[1.0]).is_err());
    }
}
