/// Sparse operators tied to a GridSpace
pub mod matrix;
/// Grid functions tied to a GridSpace
pub mod vector;

pub use matrix::MatrixElement;
pub use vector::VectorElement;

use crate::error::{GridError, Result};
use crate::space::GridSpace;

use std::sync::Arc;

/// Algebra shared by [VectorElement] and [MatrixElement].
///
/// Binary operations require both operands to come from the same `GridSpace` instance and
/// return [GridError::IncompatibleSpace] otherwise.
pub trait GridElement: Sized {
    /// The space this element belongs to
    fn space(&self) -> &Arc<GridSpace>;

    /// A zero-valued element of the same space (and sparsity pattern, for matrices)
    fn similar(&self) -> Self;

    fn try_add(&self, other: &Self) -> Result<Self>;

    fn try_sub(&self, other: &Self) -> Result<Self>;

    /// Multiply every stored value by `alpha`
    fn scale(&self, alpha: f64) -> Self;

    /// Overwrite this element's values with those of `other`
    fn copy_from(&mut self, other: &Self) -> Result<()>;

    fn check_space(&self, other: &Self) -> Result<()> {
        check_same_space(self.space(), other.space())
    }
}

pub(crate) fn check_same_space(a: &Arc<GridSpace>, b: &Arc<GridSpace>) -> Result<()> {
    if Arc::ptr_eq(a, b) {
        Ok(())
    } else {
        Err(GridError::IncompatibleSpace)
    }
}

/// The identity operator of `space`
pub fn identity(space: &Arc<GridSpace>) -> MatrixElement {
    MatrixElement::identity(space)
}

/// Wrap an existing sparse matrix as an operator of `space`
pub fn wrap_matrix(
    space: &Arc<GridSpace>,
    matrix: nalgebra_sparse::CsrMatrix<f64>,
) -> Result<MatrixElement> {
    MatrixElement::new(space, matrix)
}
