//! Structural transforms and arithmetic for [`SparseMatrix`].
//!
//! Every binary operation is a per-row merge of two index-sorted rows, so the
//! cost is linear in the stored elements of the operands. The matrix product
//! extracts one column of the right operand at a time into a buffer borrowed
//! from a [`ScratchPool`].

use log::debug;

use crate::error::{fail, MatrixError};
use crate::sparse::pool::{self, ScratchPool};
use crate::sparse::{SparseMatrix, SparseRow};

impl SparseMatrix {
    #[track_caller]
    fn check_same_shape(&self, b: &SparseMatrix) {
        if self.dims() != b.dims() {
            fail(MatrixError::Shape);
        }
    }

    fn zip_rows<F>(&self, b: &SparseMatrix, f: F) -> SparseMatrix
    where
        F: Fn(&SparseRow, &SparseRow) -> SparseRow,
    {
        let data = self.data.iter().zip(&b.data).map(|(x, y)| f(x, y)).collect();
        SparseMatrix::from_rows(self.rows, self.cols, data)
    }

    fn map_rows<F>(&self, f: F) -> SparseMatrix
    where
        F: Fn(usize, &SparseRow) -> SparseRow,
    {
        let data = self.data.iter().enumerate().map(|(r, row)| f(r, row)).collect();
        SparseMatrix::from_rows(self.rows, self.cols, data)
    }

    pub fn transpose(&self) -> SparseMatrix {
        let mut data = vec![SparseRow::new(); self.cols];
        // source rows are visited in ascending order, so every target row
        // receives its indices already sorted
        for (r, row) in self.data.iter().enumerate() {
            for e in row {
                data[e.index].push(r, e.value);
            }
        }
        SparseMatrix::from_rows(self.cols, self.rows, data)
    }

    /// Upper triangle including the diagonal.
    #[track_caller]
    pub fn upper_triangular(&self) -> SparseMatrix {
        self.check_square();
        self.map_rows(|i, row| SparseRow::from_sorted(row.upper_from(i).to_vec()))
    }

    /// Lower triangle including the diagonal.
    #[track_caller]
    pub fn lower_triangular(&self) -> SparseMatrix {
        self.check_square();
        self.map_rows(|i, row| SparseRow::from_sorted(row.lower_to(i).to_vec()))
    }

    /// Horizontal concatenation `[self | b]`.
    #[track_caller]
    pub fn augment(&self, b: &SparseMatrix) -> SparseMatrix {
        if self.rows != b.rows {
            fail(MatrixError::ColumnLength);
        }
        let shift = self.cols;
        let data = self
            .data
            .iter()
            .zip(&b.data)
            .map(|(x, y)| {
                let mut row = SparseRow::with_capacity(x.len() + y.len());
                row.extend_from_slice(x.as_slice());
                for e in y {
                    row.push(e.index + shift, e.value);
                }
                row
            })
            .collect();
        SparseMatrix::from_rows(self.rows, self.cols + b.cols, data)
    }

    /// Vertical concatenation of `self` above `b`.
    #[track_caller]
    pub fn stack(&self, b: &SparseMatrix) -> SparseMatrix {
        if self.cols != b.cols {
            fail(MatrixError::RowLength);
        }
        let data = self.data.iter().chain(&b.data).cloned().collect();
        SparseMatrix::from_rows(self.rows + b.rows, self.cols, data)
    }

    /// Keeps the stored elements for which `f(row, col, value)` holds.
    pub fn filter<F>(&self, f: F) -> SparseMatrix
    where
        F: Fn(usize, usize, f64) -> bool,
    {
        self.map_rows(|r, row| {
            SparseRow::from_sorted(row.iter().filter(|e| f(r, e.index, e.value)).copied().collect())
        })
    }

    /// Maps the stored elements through `f(row, col, value)`. Implicit zeros
    /// are not visited.
    pub fn apply<F>(&self, f: F) -> SparseMatrix
    where
        F: Fn(usize, usize, f64) -> f64,
    {
        let mut m = self.clone();
        for (r, row) in m.data.iter_mut().enumerate() {
            for e in row.as_mut_slice() {
                e.value = f(r, e.index, e.value);
            }
        }
        m
    }

    /// Maps every logical cell through `f(row, col, value)`, storing the
    /// result wherever it differs from the current value.
    pub fn apply_all<F>(&self, f: F) -> SparseMatrix
    where
        F: Fn(usize, usize, f64) -> f64,
    {
        let mut m = self.clone();
        for (r, row) in self.data.iter().enumerate() {
            for c in 0..self.cols {
                let old = row.at(c);
                let v = f(r, c, old);
                if v != old {
                    m.data[r].set(c, v);
                }
            }
        }
        m
    }

    /// Drops stored elements equal to zero.
    pub fn clean(&self) -> SparseMatrix {
        self.compact(|v| v != 0.0)
    }

    /// Drops stored elements with `|value| <= epsilon`.
    pub fn clean_with_tolerance(&self, epsilon: f64) -> SparseMatrix {
        self.compact(|v| v.abs() > epsilon)
    }

    fn compact<F>(&self, keep: F) -> SparseMatrix
    where
        F: Fn(f64) -> bool,
    {
        self.map_rows(|_, row| {
            let mut row = row.clone();
            row.retain(|e| keep(e.value));
            row
        })
    }

    /// Element-wise sum. Cancelling entries remain stored as zeros.
    #[track_caller]
    pub fn add(&self, b: &SparseMatrix) -> SparseMatrix {
        self.check_same_shape(b);
        self.zip_rows(b, SparseRow::fold_add)
    }

    #[track_caller]
    pub fn subtract(&self, b: &SparseMatrix) -> SparseMatrix {
        self.check_same_shape(b);
        self.zip_rows(b, SparseRow::fold_sub)
    }

    #[track_caller]
    pub fn multiply_elementwise(&self, b: &SparseMatrix) -> SparseMatrix {
        self.check_same_shape(b);
        self.zip_rows(b, SparseRow::fold_mul)
    }

    /// Logical equality; `false` for differently shaped matrices.
    pub fn equals(&self, b: &SparseMatrix) -> bool {
        self.dims() == b.dims() && self.data.iter().zip(&b.data).all(|(x, y)| x.fold_equal(y))
    }

    pub fn approx_equals(&self, b: &SparseMatrix, epsilon: f64) -> bool {
        self.dims() == b.dims()
            && self
                .data
                .iter()
                .zip(&b.data)
                .all(|(x, y)| x.fold_approx(y, epsilon))
    }

    pub fn scalar_multiply(&self, f: f64) -> SparseMatrix {
        self.map_rows(|_, row| row.scale(f))
    }

    /// Sum of the element-wise product.
    #[track_caller]
    pub fn inner_product(&self, b: &SparseMatrix) -> f64 {
        self.check_same_shape(b);
        self.data.iter().zip(&b.data).map(|(x, y)| x.fold_mul_sum(y)).sum()
    }

    /// Matrix product using the process-wide scratch pool.
    ///
    /// If [`pool::initialize`] was never called, the first call installs a
    /// default pool (10 buffers of capacity 100) and logs it at `info`.
    #[track_caller]
    pub fn dot(&self, b: &SparseMatrix) -> SparseMatrix {
        let pool = pool::global();
        self.dot_with(b, &pool)
    }

    /// Matrix product borrowing its column buffer from `pool`.
    ///
    /// Blocks while every buffer of `pool` is on loan.
    #[track_caller]
    pub fn dot_with(&self, b: &SparseMatrix, pool: &ScratchPool) -> SparseMatrix {
        if self.cols != b.rows {
            fail(MatrixError::Shape);
        }
        debug!(
            "sparse product {}x{} . {}x{}",
            self.rows, self.cols, b.rows, b.cols
        );
        let mut out = SparseMatrix::empty(self.rows, b.cols);
        let mut column = pool.borrow();
        for c in 0..b.cols {
            for (r, row) in b.data.iter().enumerate() {
                let v = row.at(c);
                if v != 0.0 {
                    column.push(r, v);
                }
            }
            for (r, row) in self.data.iter().enumerate() {
                let v = row.fold_mul_sum(&column);
                if v != 0.0 {
                    out.data[r].push(c, v);
                }
            }
            column.clear();
        }
        out
    }
}
