use super::{check_same_space, GridElement, MatrixElement};
use crate::error::{GridError, Result};
use crate::space::GridSpace;

use nalgebra::DVector;
use rayon::prelude::*;
use std::ops::{Index, Mul, Neg};
use std::sync::Arc;

/// A grid function: one value per point of the space's mesh, in canonical point order
#[derive(Clone, Debug)]
pub struct VectorElement {
    space: Arc<GridSpace>,
    values: DVector<f64>,
}

impl VectorElement {
    /// Wrap `values`, which must hold exactly `ndofs` entries
    pub fn new(space: &Arc<GridSpace>, values: DVector<f64>) -> Result<Self> {
        if values.len() != space.ndofs() {
            return Err(GridError::DimensionMismatch {
                expected: space.ndofs(),
                found: values.len(),
            });
        }

        Ok(Self::from_parts(Arc::clone(space), values))
    }

    pub fn from_vec(space: &Arc<GridSpace>, values: Vec<f64>) -> Result<Self> {
        Self::new(space, DVector::from_vec(values))
    }

    pub fn zeros(space: &Arc<GridSpace>) -> Self {
        Self::from_parts(Arc::clone(space), DVector::zeros(space.ndofs()))
    }

    /// Sample `f` at the coordinates of every grid point
    pub fn from_fn<F>(space: &Arc<GridSpace>, f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let mesh = space.mesh();
        let values: Vec<f64> = (0..space.ndofs())
            .into_par_iter()
            .map(|p| f(&mesh.point_at(p)))
            .collect();

        Self::from_parts(Arc::clone(space), DVector::from_vec(values))
    }

    pub(crate) fn from_parts(space: Arc<GridSpace>, values: DVector<f64>) -> Self {
        debug_assert_eq!(values.len(), space.ndofs());
        Self { space, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// Mutable access to the values; the length cannot change through this
    pub fn values_mut(&mut self) -> &mut [f64] {
        self.values.as_mut_slice()
    }

    pub fn into_values(self) -> DVector<f64> {
        self.values
    }

    /// Value at point `p`, checked against the storage extent
    pub fn get(&self, p: usize) -> Result<f64> {
        self.values.get(p).copied().ok_or_else(|| GridError::OutOfBounds {
            index: vec![p],
            extent: vec![self.values.len()],
        })
    }

    /// Value at the point with per-axis indices `index`
    pub fn get_at(&self, index: &[usize]) -> Result<f64> {
        let p = self.space.mesh().linear_index(index)?;
        self.get(p)
    }

    /// Elementwise product
    pub fn component_mul(&self, other: &Self) -> Result<Self> {
        self.check_space(other)?;
        Ok(Self::from_parts(
            Arc::clone(&self.space),
            self.values.component_mul(&other.values),
        ))
    }

    /// Elementwise quotient
    pub fn component_div(&self, other: &Self) -> Result<Self> {
        self.check_space(other)?;
        Ok(Self::from_parts(
            Arc::clone(&self.space),
            self.values.component_div(&other.values),
        ))
    }

    /// Plain (unweighted) dot product
    pub fn dot(&self, other: &Self) -> Result<f64> {
        self.check_space(other)?;
        Ok(self.values.dot(&other.values))
    }

    /// `u * V`: scale row `p` of `matrix` by `u[p]`
    pub fn mul_matrix(&self, matrix: &MatrixElement) -> Result<MatrixElement> {
        matrix.scale_rows(self)
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self::from_parts(Arc::clone(&self.space), self.values.map(f))
    }
}

impl GridElement for VectorElement {
    fn space(&self) -> &Arc<GridSpace> {
        &self.space
    }

    fn similar(&self) -> Self {
        Self::zeros(&self.space)
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
        Self::from_parts(Arc::clone(&self.space), &self.values * alpha)
    }

    fn copy_from(&mut self, other: &Self) -> Result<()> {
        check_same_space(&self.space, &other.space)?;
        self.values.copy_from(&other.values);
        Ok(())
    }
}

impl Index<usize> for VectorElement {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl Mul<f64> for &VectorElement {
    type Output = VectorElement;
    fn mul(self, coefficient: f64) -> VectorElement {
        self.scale(coefficient)
    }
}

impl Mul<f64> for VectorElement {
    type Output = Self;
    fn mul(mut self, coefficient: f64) -> Self {
        self.values *= coefficient;
        self
    }
}

impl Neg for VectorElement {
    type Output = Self;
    fn neg(mut self) -> Self {
        self.values.neg_mut();
        self
    }
}

impl From<VectorElement> for DVector<f64> {
    fn from(element: VectorElement) -> Self {
        element.values
    }
}
