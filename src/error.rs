//! Error types for sparse matrix operations.
//!
//! Construction from caller supplied data returns [`MatrixError`] as a regular
//! `Result`. Misuse of an existing matrix (bad index, mismatched shapes, a
//! non-square receiver) panics with a [`MatrixError`] payload instead, which
//! [`maybe_sparse`] can turn back into a `Result`.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::sparse::SparseMatrix;

/// Result type alias for fallible matrix construction.
pub type Result<T> = std::result::Result<T, MatrixError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix: zero length in matrix definition")]
    ZeroLength,

    #[error("matrix: row length mismatch")]
    RowLength,

    #[error("matrix: col length mismatch")]
    ColumnLength,

    #[error("matrix: dimension mismatch")]
    Shape,

    #[error("matrix: expect square matrix")]
    Square,

    #[error("matrix: index out of range")]
    IndexOutOfRange,

    #[error("matrix: illegal norm order")]
    NormOrder,

    #[error("matrix: not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Abort the current operation with `err` as the panic payload.
#[track_caller]
pub(crate) fn fail(err: MatrixError) -> ! {
    panic::panic_any(err)
}

/// Unwraps a construction result, panicking with the carried [`MatrixError`].
#[track_caller]
pub fn must_sparse(result: Result<SparseMatrix>) -> SparseMatrix {
    match result {
        Ok(m) => m,
        Err(err) => fail(err),
    }
}

/// Runs `f`, converting a [`MatrixError`] panic raised inside it into an `Err`.
///
/// Panics carrying any other payload are resumed unchanged.
pub fn maybe_sparse<F>(f: F) -> Result<SparseMatrix>
where
    F: FnOnce() -> SparseMatrix,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(m) => Ok(m),
        Err(payload) => match payload.downcast::<MatrixError>() {
            Ok(err) => Err(*err),
            Err(other) => panic::resume_unwind(other),
        },
    }
}
