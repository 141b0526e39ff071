use rand::Rng;

use crate::error::{fail, MatrixError, Result};
use crate::sparse::{SparseElement, SparseRow};
use crate::utils::{Direction, NormOrder};

/// Row-sparse matrix of `f64`.
///
/// Each row keeps its stored elements sorted by column index. Binary
/// operations allocate a new matrix and never mutate the receiver; `set` is
/// the only in-place mutation. `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<SparseRow>,
}

impl SparseMatrix {
    /// Builds a matrix from dense rows, storing only non-zero cells.
    pub fn new<R: AsRef<[f64]>>(dense: &[R]) -> Result<Self> {
        let cols = match dense.first() {
            Some(first) if !first.as_ref().is_empty() => first.as_ref().len(),
            _ => return Err(MatrixError::ZeroLength),
        };
        let mut data = Vec::with_capacity(dense.len());
        for row in dense {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MatrixError::RowLength);
            }
            data.push(SparseRow::from_dense(row));
        }
        Ok(Self {
            rows: dense.len(),
            cols,
            data,
        })
    }

    /// An all-zero `rows x cols` matrix with no stored elements.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        if rows < 1 || cols < 1 {
            return Err(MatrixError::ZeroLength);
        }
        Ok(Self::empty(rows, cols))
    }

    pub fn identity(size: usize) -> Result<Self> {
        if size < 1 {
            return Err(MatrixError::ZeroLength);
        }
        let data = (0..size)
            .map(|i| SparseRow::from_sorted(vec![SparseElement::new(i, 1.0)]))
            .collect();
        Ok(Self {
            rows: size,
            cols: size,
            data,
        })
    }

    /// Fills each cell with probability `density` using values from `f`.
    pub fn random<R, F>(
        rows: usize,
        cols: usize,
        density: f64,
        rng: &mut R,
        mut f: F,
    ) -> Result<Self>
    where
        R: Rng,
        F: FnMut(&mut R) -> f64,
    {
        let mut m = Self::zeros(rows, cols)?;
        for r in 0..rows {
            for c in 0..cols {
                if rng.random::<f64>() < density {
                    let v = f(rng);
                    m.data[r].set(c, v);
                }
            }
        }
        Ok(m)
    }

    /// Like [`SparseMatrix::random`], drawing from the thread-local RNG.
    pub fn from_fn<F>(rows: usize, cols: usize, density: f64, mut f: F) -> Result<Self>
    where
        F: FnMut() -> f64,
    {
        Self::random(rows, cols, density, &mut rand::rng(), |_| f())
    }

    /// The non-zero stored values of `mats`, row-major, as a row vector.
    pub fn elements(mats: &[&SparseMatrix]) -> Self {
        let values: Vec<f64> = mats.iter().flat_map(|m| m.elements_vector()).collect();
        let row = SparseRow::from_sorted(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| SparseElement::new(i, v))
                .collect(),
        );
        Self {
            rows: 1,
            cols: values.len().max(1),
            data: vec![row],
        }
    }

    /// The non-zero stored values, row-major.
    pub fn elements_vector(&self) -> Vec<f64> {
        self.data
            .iter()
            .flat_map(|row| row.iter())
            .map(|e| e.value)
            .filter(|&v| v != 0.0)
            .collect()
    }

    pub(crate) fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![SparseRow::new(); rows],
        }
    }

    pub(crate) fn from_rows(rows: usize, cols: usize, data: Vec<SparseRow>) -> Self {
        debug_assert_eq!(data.len(), rows);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Total number of stored elements, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.data.iter().map(SparseRow::len).sum()
    }

    /// Stored elements of row `r`.
    pub fn row(&self, r: usize) -> &SparseRow {
        match self.data.get(r) {
            Some(row) => row,
            None => fail(MatrixError::IndexOutOfRange),
        }
    }

    pub fn row_iter(&self) -> std::slice::Iter<'_, SparseRow> {
        self.data.iter()
    }

    /// `(row, col, value)` for every stored element in row-major order.
    pub fn triplet_iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().map(move |e| (r, e.index, e.value)))
    }

    #[track_caller]
    fn check_index(&self, r: usize, c: usize) {
        if r >= self.rows || c >= self.cols {
            fail(MatrixError::IndexOutOfRange);
        }
    }

    #[track_caller]
    pub(crate) fn check_square(&self) {
        if !self.is_square() {
            fail(MatrixError::Square);
        }
    }

    #[track_caller]
    pub fn at(&self, r: usize, c: usize) -> f64 {
        self.check_index(r, c);
        self.data[r].at(c)
    }

    #[track_caller]
    pub fn set(&mut self, r: usize, c: usize, v: f64) {
        self.check_index(r, c);
        self.data[r].set(c, v);
    }

    #[track_caller]
    pub fn trace(&self) -> f64 {
        self.check_square();
        self.data.iter().enumerate().map(|(i, row)| row.at(i)).sum()
    }

    /// Logical minimum: rows with fewer stored elements than columns also
    /// contribute an implicit zero.
    pub fn min(&self) -> f64 {
        self.data.iter().fold(f64::MAX, |m, row| {
            let m = row.min().map_or(m, |v| v.min(m));
            if row.len() < self.cols {
                m.min(0.0)
            } else {
                m
            }
        })
    }

    pub fn max(&self) -> f64 {
        self.data.iter().fold(-f64::MAX, |m, row| {
            let m = row.max().map_or(m, |v| v.max(m));
            if row.len() < self.cols {
                m.max(0.0)
            } else {
                m
            }
        })
    }

    /// Smallest non-zero value, or `0.0` if the matrix holds none.
    pub fn min_non_zero(&self) -> f64 {
        self.data
            .iter()
            .filter_map(SparseRow::min_non_zero)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Largest non-zero value, or `0.0` if the matrix holds none.
    pub fn max_non_zero(&self) -> f64 {
        self.data
            .iter()
            .filter_map(SparseRow::max_non_zero)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(SparseRow::sum).sum()
    }

    /// Norm selected by an integer order code: `1`, `-1`, [`INF`](crate::INF),
    /// `-INF`, or [`FRO`](crate::FRO) (`0` is an alias).
    ///
    /// Panics with `NormOrder` for any other code and with `NotImplemented`
    /// for the spectral norms `2` and `-2`.
    #[track_caller]
    pub fn norm(&self, ord: i32) -> f64 {
        match NormOrder::try_from(ord) {
            Ok(order) => self.norm_with(order),
            Err(err) => fail(err),
        }
    }

    pub fn norm_with(&self, order: NormOrder) -> f64 {
        // absolute value of each signed row or column sum
        let abs_sums = |direction: Direction| -> Vec<f64> {
            let mut sums = vec![0.0; self.axis_len(direction)];
            for (r, row) in self.data.iter().enumerate() {
                for e in row {
                    let slot = match direction {
                        Direction::ROW => r,
                        Direction::COLUMN => e.index,
                    };
                    sums[slot] += e.value;
                }
            }
            sums.into_iter().map(f64::abs).collect()
        };
        match order {
            NormOrder::One => abs_sums(Direction::COLUMN).into_iter().fold(0.0, f64::max),
            NormOrder::NegOne => {
                abs_sums(Direction::COLUMN).into_iter().fold(f64::MAX, f64::min)
            }
            NormOrder::Inf => abs_sums(Direction::ROW).into_iter().fold(0.0, f64::max),
            NormOrder::NegInf => abs_sums(Direction::ROW).into_iter().fold(f64::MAX, f64::min),
            NormOrder::Frobenius => self
                .data
                .iter()
                .flat_map(|row| row.iter())
                .map(|e| e.value * e.value)
                .sum::<f64>()
                .sqrt(),
        }
    }

    fn axis_len(&self, direction: Direction) -> usize {
        match direction {
            Direction::ROW => self.rows,
            Direction::COLUMN => self.cols,
        }
    }

    /// Reduces along `direction` into a vector matrix: `ROW` gives a
    /// `rows x 1` column vector, `COLUMN` a `1 x cols` row vector.
    ///
    /// `row_fold` reduces one stored row together with its logical width;
    /// `col_fold` combines logical cell values of a column, starting at `init`.
    fn reduce_axis<R, C>(
        &self,
        direction: Direction,
        row_fold: R,
        init: f64,
        col_fold: C,
    ) -> SparseMatrix
    where
        R: Fn(&SparseRow, usize) -> f64,
        C: Fn(f64, f64) -> f64,
    {
        match direction {
            Direction::ROW => {
                let data = self
                    .data
                    .iter()
                    .map(|row| {
                        let v = row_fold(row, self.cols);
                        SparseRow::from_sorted(vec![SparseElement::new(0, v)])
                    })
                    .collect();
                SparseMatrix::from_rows(self.rows, 1, data)
            }
            Direction::COLUMN => {
                // no column index: every column probes every row
                let elems = (0..self.cols)
                    .map(|c| {
                        let v = self.data.iter().fold(init, |acc, row| col_fold(acc, row.at(c)));
                        SparseElement::new(c, v)
                    })
                    .collect();
                SparseMatrix::from_rows(1, self.cols, vec![SparseRow::from_sorted(elems)])
            }
        }
    }

    /// Per-row or per-column sums. `cols == true` sums down each column.
    pub fn sum_axis(&self, cols: bool) -> SparseMatrix {
        self.reduce_axis(Direction::along_columns(cols), |row, _| row.sum(), 0.0, |a, v| a + v)
    }

    /// Per-row or per-column logical maxima.
    ///
    /// Both directions count implicit zeros: a row with fewer stored entries
    /// than `cols` has a maximum of at least `0.0`, and an all-zero row
    /// reduces to `0.0`.
    pub fn max_axis(&self, cols: bool) -> SparseMatrix {
        self.reduce_axis(
            Direction::along_columns(cols),
            |row, width| logical_row_max(row, width),
            -f64::MAX,
            f64::max,
        )
    }

    /// Per-row or per-column logical minima.
    ///
    /// Both directions count implicit zeros: `[[1, 0, 2]]` reduces row-wise
    /// to `0.0`, not to the smallest stored value.
    pub fn min_axis(&self, cols: bool) -> SparseMatrix {
        self.reduce_axis(
            Direction::along_columns(cols),
            |row, width| logical_row_min(row, width),
            f64::MAX,
            f64::min,
        )
    }

    /// Dense row-major copy of every logical cell.
    pub fn to_dense_vec(&self) -> Vec<Vec<f64>> {
        self.data
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; self.cols];
                for e in row {
                    dense[e.index] = e.value;
                }
                dense
            })
            .collect()
    }

    #[track_caller]
    pub fn reshape(&self, r: usize, c: usize) -> SparseMatrix {
        if r.checked_mul(c) != Some(self.rows * self.cols) {
            fail(MatrixError::Shape);
        }
        fail(MatrixError::NotImplemented("reshape"))
    }

    #[track_caller]
    pub fn det(&self) -> f64 {
        fail(MatrixError::NotImplemented("det"))
    }

    /// Checks that every row is strictly ascending and inside `[0, cols)`.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows
            && self.data.iter().all(|row| {
                row.as_slice().windows(2).all(|w| w[0].index < w[1].index)
                    && row.last_index().map_or(true, |last| last < self.cols)
            })
    }
}

pub(crate) fn logical_row_min(row: &SparseRow, width: usize) -> f64 {
    let m = row.min().unwrap_or(f64::MAX);
    if row.len() < width {
        m.min(0.0)
    } else {
        m
    }
}

pub(crate) fn logical_row_max(row: &SparseRow, width: usize) -> f64 {
    let m = row.max().unwrap_or(-f64::MAX);
    if row.len() < width {
        m.max(0.0)
    } else {
        m
    }
}
