use std::ops::AddAssign;

use anyhow::anyhow;
use num_traits::{Float, NumCast, PrimInt, Unsigned, Zero};

use super::matrix::{logical_row_max, logical_row_min};
use super::{MatrixMinMax, MatrixNonZero, MatrixSum, SparseMatrix};

fn cast<T: NumCast, V: NumCast>(value: V) -> anyhow::Result<T> {
    T::from(value).ok_or_else(|| anyhow!("Failed to convert to target type"))
}

impl MatrixNonZero for SparseMatrix {
    fn nonzero_col<T>(&self) -> anyhow::Result<Vec<T>>
    where
        T: PrimInt + Unsigned + Zero + AddAssign,
    {
        let mut result = vec![T::zero(); self.cols];
        for (_, col, _) in self.triplet_iter() {
            result[col] += T::one();
        }
        Ok(result)
    }

    fn nonzero_row<T>(&self) -> anyhow::Result<Vec<T>>
    where
        T: PrimInt + Unsigned + Zero + AddAssign,
    {
        self.data.iter().map(|row| cast(row.len())).collect()
    }
}

impl MatrixSum for SparseMatrix {
    type Item = f64;

    fn sum_col<T>(&self) -> anyhow::Result<Vec<T>>
    where
        T: Float + NumCast + AddAssign + std::iter::Sum,
    {
        let mut result = vec![T::zero(); self.cols];
        for (_, col, value) in self.triplet_iter() {
            result[col] += cast::<T, _>(value)?;
        }
        Ok(result)
    }

    fn sum_row<T>(&self) -> anyhow::Result<Vec<T>>
    where
        T: Float + NumCast + AddAssign + std::iter::Sum,
    {
        self.data.iter().map(|row| cast(row.sum())).collect()
    }
}

impl MatrixMinMax for SparseMatrix {
    type Item = f64;

    fn min_max_col<Item>(&self) -> anyhow::Result<(Vec<Item>, Vec<Item>)>
    where
        Item: Float + NumCast,
    {
        let mut min = vec![f64::MAX; self.cols];
        let mut max = vec![-f64::MAX; self.cols];
        let mut stored = vec![0usize; self.cols];

        for (_, col, value) in self.triplet_iter() {
            min[col] = min[col].min(value);
            max[col] = max[col].max(value);
            stored[col] += 1;
        }

        // a column with fewer stored entries than rows holds an implicit zero
        for col in 0..self.cols {
            if stored[col] < self.rows {
                min[col] = min[col].min(0.0);
                max[col] = max[col].max(0.0);
            }
        }

        let min: Vec<Item> = min.into_iter().map(cast).collect::<anyhow::Result<_>>()?;
        let max: Vec<Item> = max.into_iter().map(cast).collect::<anyhow::Result<_>>()?;
        Ok((min, max))
    }

    fn min_max_row<Item>(&self) -> anyhow::Result<(Vec<Item>, Vec<Item>)>
    where
        Item: Float + NumCast,
    {
        let mut min = Vec::with_capacity(self.rows);
        let mut max = Vec::with_capacity(self.rows);
        for row in &self.data {
            min.push(cast(logical_row_min(row, self.cols))?);
            max.push(cast(logical_row_max(row, self.cols))?);
        }
        Ok((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_matrix() -> SparseMatrix {
        // [1 0 2]
        // [0 0 0]
        // [3 4 0]
        // [0 5 6]
        SparseMatrix::new(&[
            [1.0, 0.0, 2.0],
            [0.0, 0.0, 0.0],
            [3.0, 4.0, 0.0],
            [0.0, 5.0, 6.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_nonzero_counts() {
        let matrix = create_test_matrix();
        let cols: Vec<u32> = matrix.nonzero_col().unwrap();
        let rows: Vec<u32> = matrix.nonzero_row().unwrap();
        assert_eq!(cols, vec![2, 2, 2]);
        assert_eq!(rows, vec![2, 0, 2, 2]);

        let rows_u8: Vec<u8> = matrix.nonzero_row().unwrap();
        assert_eq!(rows_u8, vec![2, 0, 2, 2]);
    }

    #[test]
    fn test_nonzero_counts_include_explicit_zeros() {
        let mut matrix = create_test_matrix();
        matrix.set(1, 1, 0.0);
        let rows: Vec<u64> = matrix.nonzero_row().unwrap();
        assert_eq!(rows, vec![2, 1, 2, 2]);
    }

    #[test]
    fn test_sums_agree_with_axis_reductions() {
        let matrix = create_test_matrix();
        let cols: Vec<f64> = matrix.sum_col().unwrap();
        let rows: Vec<f32> = matrix.sum_row().unwrap();
        assert_eq!(cols, vec![4.0, 9.0, 8.0]);
        assert_eq!(rows, vec![3.0, 0.0, 7.0, 11.0]);
        assert_eq!(matrix.sum_axis(true).to_dense_vec()[0], cols);
    }

    #[test]
    fn test_min_max() {
        let matrix = create_test_matrix();
        let (min, max): (Vec<f64>, Vec<f64>) = matrix.min_max_col().unwrap();
        assert_eq!(min, vec![0.0, 0.0, 0.0]);
        assert_eq!(max, vec![3.0, 5.0, 6.0]);

        let (min, max): (Vec<f64>, Vec<f64>) = matrix.min_max_row().unwrap();
        assert_eq!(min, vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(max, vec![2.0, 0.0, 4.0, 6.0]);

        let full = SparseMatrix::new(&[[-1.0, -2.0], [-3.0, -4.0]]).unwrap();
        let (min, max): (Vec<f64>, Vec<f64>) = full.min_max_col().unwrap();
        assert_eq!(min, vec![-3.0, -4.0]);
        assert_eq!(max, vec![-1.0, -2.0]);
    }
}
