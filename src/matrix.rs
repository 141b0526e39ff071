//! Representation-polymorphic matrix handle.
//!
//! Only sparse/sparse pairings are implemented. Any binary operation that
//! involves a dense or pivot operand panics with
//! [`MatrixError::NotImplemented`] rather than producing a converted result.

use ndarray::Array2;

use crate::error::{fail, MatrixError};
use crate::sparse::SparseMatrix;

/// Permutation matrix: row `r` has a single `1.0` at column `perm[r]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pivot {
    perm: Vec<usize>,
}

impl Pivot {
    /// Fails with `ZeroLength` for an empty permutation and `IndexOutOfRange`
    /// when `perm` is not a permutation of `0..perm.len()`.
    pub fn new(perm: Vec<usize>) -> crate::Result<Self> {
        if perm.is_empty() {
            return Err(MatrixError::ZeroLength);
        }
        let mut seen = vec![false; perm.len()];
        for &p in &perm {
            match seen.get_mut(p) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(MatrixError::IndexOutOfRange),
            }
        }
        Ok(Self { perm })
    }

    pub fn size(&self) -> usize {
        self.perm.len()
    }

    #[track_caller]
    pub fn at(&self, r: usize, c: usize) -> f64 {
        if r >= self.perm.len() || c >= self.perm.len() {
            fail(MatrixError::IndexOutOfRange);
        }
        if self.perm[r] == c {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub enum Matrix {
    Sparse(SparseMatrix),
    Dense(Array2<f64>),
    Pivot(Pivot),
}

impl From<SparseMatrix> for Matrix {
    fn from(m: SparseMatrix) -> Self {
        Matrix::Sparse(m)
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(m: Array2<f64>) -> Self {
        Matrix::Dense(m)
    }
}

impl From<Pivot> for Matrix {
    fn from(p: Pivot) -> Self {
        Matrix::Pivot(p)
    }
}

/// Dispatches a binary operation to the sparse/sparse implementation.
macro_rules! sparse_pair {
    ($op:literal, $a:expr, $b:expr, |$x:ident, $y:ident| $body:expr) => {
        match ($a, $b) {
            (Matrix::Sparse($x), Matrix::Sparse($y)) => $body,
            _ => fail(MatrixError::NotImplemented($op)),
        }
    };
}

impl Matrix {
    pub fn dims(&self) -> (usize, usize) {
        match self {
            Matrix::Sparse(m) => m.dims(),
            Matrix::Dense(m) => m.dim(),
            Matrix::Pivot(p) => (p.size(), p.size()),
        }
    }

    #[track_caller]
    pub fn at(&self, r: usize, c: usize) -> f64 {
        let (rows, cols) = self.dims();
        if r >= rows || c >= cols {
            fail(MatrixError::IndexOutOfRange);
        }
        match self {
            Matrix::Sparse(m) => m.at(r, c),
            Matrix::Dense(m) => m[[r, c]],
            Matrix::Pivot(p) => p.at(r, c),
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseMatrix> {
        match self {
            Matrix::Sparse(m) => Some(m),
            _ => None,
        }
    }

    #[track_caller]
    pub fn add(&self, b: &Matrix) -> Matrix {
        sparse_pair!("add", self, b, |x, y| x.add(y).into())
    }

    #[track_caller]
    pub fn subtract(&self, b: &Matrix) -> Matrix {
        sparse_pair!("subtract", self, b, |x, y| x.subtract(y).into())
    }

    #[track_caller]
    pub fn multiply_elementwise(&self, b: &Matrix) -> Matrix {
        sparse_pair!("multiply_elementwise", self, b, |x, y| x.multiply_elementwise(y).into())
    }

    #[track_caller]
    pub fn equals(&self, b: &Matrix) -> bool {
        sparse_pair!("equals", self, b, |x, y| x.equals(y))
    }

    #[track_caller]
    pub fn approx_equals(&self, b: &Matrix, epsilon: f64) -> bool {
        sparse_pair!("approx_equals", self, b, |x, y| x.approx_equals(y, epsilon))
    }

    #[track_caller]
    pub fn inner_product(&self, b: &Matrix) -> f64 {
        sparse_pair!("inner_product", self, b, |x, y| x.inner_product(y))
    }

    #[track_caller]
    pub fn dot(&self, b: &Matrix) -> Matrix {
        sparse_pair!("dot", self, b, |x, y| x.dot(y).into())
    }

    #[track_caller]
    pub fn augment(&self, b: &Matrix) -> Matrix {
        sparse_pair!("augment", self, b, |x, y| x.augment(y).into())
    }

    #[track_caller]
    pub fn stack(&self, b: &Matrix) -> Matrix {
        sparse_pair!("stack", self, b, |x, y| x.stack(y).into())
    }
}
