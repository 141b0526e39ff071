pub mod dense;
pub mod error;
pub mod matrix;
pub mod sparse;
mod utils;

pub use error::{maybe_sparse, must_sparse, MatrixError, Result};
pub use matrix::{Matrix, Pivot};
pub use sparse::pool::{ScratchPool, ScratchPoolConfig};
pub use sparse::{SparseElement, SparseMatrix, SparseRow};
pub use utils::Direction;
pub use utils::NormOrder;
pub use utils::{FRO, INF};
