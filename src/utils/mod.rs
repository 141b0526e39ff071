use crate::error::MatrixError;

/// Axis selector for reductions.
///
/// `ROW` reduces each row to a single value (yielding a column vector),
/// `COLUMN` reduces each column (yielding a row vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ROW,
    COLUMN,
}

impl Direction {
    pub fn along_columns(cols: bool) -> Self {
        if cols {
            Direction::COLUMN
        } else {
            Direction::ROW
        }
    }
}

/// Integer order code for the infinity norm.
pub const INF: i32 = i32::MAX;
/// Integer order code for the Frobenius norm. `0` is accepted as an alias.
pub const FRO: i32 = i32::MIN;

/// Supported matrix norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormOrder {
    /// Max over columns of the absolute value of the column sum.
    One,
    /// Min over columns of the absolute value of the column sum.
    NegOne,
    /// Max over rows of the absolute value of the row sum.
    Inf,
    /// Min over rows of the absolute value of the row sum.
    NegInf,
    Frobenius,
}

impl TryFrom<i32> for NormOrder {
    type Error = MatrixError;

    fn try_from(ord: i32) -> Result<Self, Self::Error> {
        match ord {
            1 => Ok(NormOrder::One),
            -1 => Ok(NormOrder::NegOne),
            INF => Ok(NormOrder::Inf),
            x if x == -INF => Ok(NormOrder::NegInf),
            0 | FRO => Ok(NormOrder::Frobenius),
            2 | -2 => Err(MatrixError::NotImplemented("2-norm requires an svd")),
            _ => Err(MatrixError::NormOrder),
        }
    }
}
