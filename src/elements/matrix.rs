use super::{check_same_space, GridElement, VectorElement};
use crate::error::{GridError, Result};
use crate::linalg::{self, petsc::AIJMatrixBinary};
use crate::space::GridSpace;

use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use std::ops::{Mul, Neg};
use std::sync::Arc;

/// A square sparse operator acting on the grid functions of a [GridSpace].
///
/// Scalar operations (`add_scalar`, `scale`, `powf`, ...) only touch the stored entries.
/// Structural zeros stay zero, so `add_scalar` is *not* the dense `A + c` unless every entry
/// is stored.
#[derive(Clone, Debug)]
pub struct MatrixElement {
    space: Arc<GridSpace>,
    values: CsrMatrix<f64>,
}

impl MatrixElement {
    /// Wrap an existing sparse matrix; it must be `ndofs x ndofs`
    pub fn new(space: &Arc<GridSpace>, values: CsrMatrix<f64>) -> Result<Self> {
        let n = space.ndofs();
        for found in [values.nrows(), values.ncols()] {
            if found != n {
                return Err(GridError::DimensionMismatch { expected: n, found });
            }
        }

        Ok(Self::from_parts(Arc::clone(space), values))
    }

    /// The identity operator
    pub fn identity(space: &Arc<GridSpace>) -> Self {
        Self::from_parts(Arc::clone(space), CsrMatrix::identity(space.ndofs()))
    }

    pub(crate) fn from_parts(space: Arc<GridSpace>, values: CsrMatrix<f64>) -> Self {
        debug_assert_eq!(values.nrows(), space.ndofs());
        debug_assert_eq!(values.ncols(), space.ndofs());
        Self { space, values }
    }

    pub fn values(&self) -> &CsrMatrix<f64> {
        &self.values
    }

    pub fn into_values(self) -> CsrMatrix<f64> {
        self.values
    }

    /// Number of stored entries (explicit zeros included)
    pub fn nnz(&self) -> usize {
        self.values.nnz()
    }

    pub fn dimension(&self) -> usize {
        self.values.nrows()
    }

    // ----------------------------------------------------------------------------------------------------
    // Indexing
    // ----------------------------------------------------------------------------------------------------

    /// Entry at (`row`, `col`); structural zeros read as `0.0`
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.values
            .get_entry(row, col)
            .map(|entry| entry.into_value())
            .ok_or_else(|| GridError::OutOfBounds {
                index: vec![row, col],
                extent: vec![self.values.nrows(), self.values.ncols()],
            })
    }

    /// Entry at column-major linear index `k` (`row = k % n`, `col = k / n`)
    pub fn get_linear(&self, k: usize) -> Result<f64> {
        let n = self.values.nrows();
        if k >= n * n {
            return Err(GridError::OutOfBounds {
                index: vec![k],
                extent: vec![n * n],
            });
        }

        self.get(k % n, k / n)
    }

    // ----------------------------------------------------------------------------------------------------
    // Matrix Algebra
    // ----------------------------------------------------------------------------------------------------

    /// Matrix product `self * other`
    pub fn try_matmul(&self, other: &Self) -> Result<Self> {
        self.check_space(other)?;
        Ok(Self::from_parts(
            Arc::clone(&self.space),
            &self.values * &other.values,
        ))
    }

    /// Matrix-vector product
    pub fn apply(&self, u: &VectorElement) -> Result<VectorElement> {
        check_same_space(&self.space, u.space())?;
        Ok(VectorElement::from_parts(
            Arc::clone(&self.space),
            linalg::csr_matvec(&self.values, u.values())?,
        ))
    }

    /// `u * V`: row `p` scaled by `u[p]`
    pub fn scale_rows(&self, u: &VectorElement) -> Result<Self> {
        check_same_space(&self.space, u.space())?;

        let mut values = self.values.clone();
        for (mut row, u_p) in values.row_iter_mut().zip(u.values().iter()) {
            row.values_mut().iter_mut().for_each(|v| *v *= u_p);
        }

        Ok(Self::from_parts(Arc::clone(&self.space), values))
    }

    /// `V * u`: column `q` scaled by `u[q]`
    pub fn scale_cols(&self, u: &VectorElement) -> Result<Self> {
        check_same_space(&self.space, u.space())?;

        let mut values = self.values.clone();
        for mut row in values.row_iter_mut() {
            let (cols, row_values) = row.cols_and_values_mut();
            for (c, v) in cols.iter().zip(row_values.iter_mut()) {
                *v *= u[*c];
            }
        }

        Ok(Self::from_parts(Arc::clone(&self.space), values))
    }

    pub fn transpose(&self) -> Self {
        Self::from_parts(Arc::clone(&self.space), self.values.transpose())
    }

    // ----------------------------------------------------------------------------------------------------
    // Scalar operations on stored entries
    // ----------------------------------------------------------------------------------------------------

    /// Apply `f` to every stored entry, keeping the sparsity pattern
    pub fn map_stored<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        let mut values = self.values.clone();
        values.values_mut().iter_mut().for_each(|v| *v = f(*v));
        Self::from_parts(Arc::clone(&self.space), values)
    }

    /// Add `c` to the stored entries only (structural zeros are not filled)
    pub fn add_scalar(&self, c: f64) -> Self {
        self.map_stored(|v| v + c)
    }

    /// Subtract `c` from the stored entries only
    pub fn sub_scalar(&self, c: f64) -> Self {
        self.map_stored(|v| v - c)
    }

    pub fn div_scalar(&self, c: f64) -> Self {
        self.map_stored(|v| v / c)
    }

    pub fn powf(&self, exponent: f64) -> Self {
        self.map_stored(|v| v.powf(exponent))
    }

    pub fn powi(&self, exponent: i32) -> Self {
        self.map_stored(|v| v.powi(exponent))
    }

    // ----------------------------------------------------------------------------------------------------
    // Conversion / Export
    // ----------------------------------------------------------------------------------------------------

    pub fn to_dense(&self) -> DMatrix<f64> {
        DMatrix::from(&self.values)
    }

    /// Write the operator to `path` in PETSc's binary AIJ format
    pub fn write_petsc_binary(&self, path: impl AsRef<str>) -> Result<()> {
        AIJMatrixBinary::from(&self.values).print_to_petsc_binary_file(path)?;
        Ok(())
    }
}

impl GridElement for MatrixElement {
    fn space(&self) -> &Arc<GridSpace> {
        &self.space
    }

    /// Same sparsity pattern with every stored value set to zero
    fn similar(&self) -> Self {
        self.map_stored(|_| 0.0)
    }

    fn try_add(&self, other: &Self) -> Result<Self> {
        check_same_space(&self.space, &other.space)?;
        Ok(Self::from_parts(
            Arc::clone(&self.space),
            &self.values + &other.values,
        ))
    }

    fn try_sub(&self, other: &Self) -> Result<Self> {
        check_same_space(&self.space, &other.space)?;
        Ok(Self::from_parts(
            Arc::clone(&self.space),
            &self.values - &other.values,
        ))
    }

    fn scale(&self, alpha: f64) -> Self {
        self.map_stored(|v| v * alpha)
    }

    /// Copy stored values from `other`, which must have the identical sparsity pattern
    fn copy_from(&mut self, other: &Self) -> Result<()> {
        check_same_space(&self.space, &other.space)?;
        if !linalg::same_pattern(&self.values, &other.values) {
            return Err(GridError::PatternMismatch);
        }

        self.values
            .values_mut()
            .copy_from_slice(other.values.values());
        Ok(())
    }
}

impl Mul<f64> for &MatrixElement {
    type Output = MatrixElement;
    fn mul(self, coefficient: f64) -> MatrixElement {
        self.scale(coefficient)
    }
}

impl Neg for &MatrixElement {
    type Output = MatrixElement;
    fn neg(self) -> MatrixElement {
        self.scale(-1.0)
    }
}

impl From<&MatrixElement> for DMatrix<f64> {
    fn from(element: &MatrixElement) -> Self {
        element.to_dense()
    }
}
