//! Conversions between [`SparseMatrix`] and dense or compressed collaborators.
//!
//! - `ndarray::Array2<f64>` for dense materialisation and construction.
//! - `nalgebra_sparse::CsrMatrix<f64>` for handing data to CSR-based code.

use anyhow::anyhow;
use nalgebra_sparse::CsrMatrix;
use ndarray::{Array2, ArrayView2};

use crate::error::{MatrixError, Result};
use crate::sparse::{SparseElement, SparseMatrix, SparseRow};

impl SparseMatrix {
    /// Every logical cell, implicit zeros included.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows(), self.cols()));
        for (r, c, v) in self.triplet_iter() {
            dense[[r, c]] = v;
        }
        dense
    }

    /// Builds a matrix from a dense view, storing only non-zero cells.
    pub fn from_array(dense: ArrayView2<f64>) -> Result<Self> {
        let (rows, cols) = dense.dim();
        if rows < 1 || cols < 1 {
            return Err(MatrixError::ZeroLength);
        }
        let data = dense
            .rows()
            .into_iter()
            .map(|row| {
                SparseRow::from_sorted(
                    row.iter()
                        .enumerate()
                        .filter(|&(_, &v)| v != 0.0)
                        .map(|(c, &v)| SparseElement::new(c, v))
                        .collect(),
                )
            })
            .collect();
        Ok(SparseMatrix::from_rows(rows, cols, data))
    }
}

impl TryFrom<&SparseMatrix> for CsrMatrix<f64> {
    type Error = anyhow::Error;

    /// Stored zeros are carried over as explicit CSR entries.
    fn try_from(m: &SparseMatrix) -> anyhow::Result<Self> {
        let nnz = m.nnz();
        let mut row_offsets = Vec::with_capacity(m.rows() + 1);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_offsets.push(0);
        for row in m.row_iter() {
            for e in row {
                col_indices.push(e.index);
                values.push(e.value);
            }
            row_offsets.push(col_indices.len());
        }

        CsrMatrix::try_from_csr_data(m.rows(), m.cols(), row_offsets, col_indices, values)
            .map_err(|e| anyhow!("CSR conversion failed: {}", e))
    }
}

impl TryFrom<&CsrMatrix<f64>> for SparseMatrix {
    type Error = MatrixError;

    fn try_from(csr: &CsrMatrix<f64>) -> Result<Self> {
        if csr.nrows() < 1 || csr.ncols() < 1 {
            return Err(MatrixError::ZeroLength);
        }
        let data = csr
            .row_iter()
            .map(|row| {
                SparseRow::from_sorted(
                    row.col_indices()
                        .iter()
                        .zip(row.values())
                        .map(|(&c, &v)| SparseElement::new(c, v))
                        .collect(),
                )
            })
            .collect();
        Ok(SparseMatrix::from_rows(csr.nrows(), csr.ncols(), data))
    }
}
