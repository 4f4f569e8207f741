use crate::error::{GridError, Result};
use crate::mesh::{GridAxis, TensorMesh};

use nalgebra::DVector;
use rayon::prelude::*;

/// 1D factor of the `innerplus` weights along `axis`.
///
/// Along the emphasized axis the factor is the full backward spacing (zero at the first
/// point). Along the other axes it is the half spacing on interior points and zero on
/// both endpoints.
pub(crate) fn axis_factor(axis: &GridAxis, emphasized: bool) -> Vec<f64> {
    let n = axis.num_points();

    if emphasized {
        (0..n).map(|j| axis.spacing(j)).collect()
    } else {
        (0..n)
            .map(|j| {
                if j == 0 || j == n - 1 {
                    0.0
                } else {
                    axis.half_spacing(j)
                }
            })
            .collect()
    }
}

/// Full-grid array whose entry at point `p = (j1, .., jD)` is `factors[0][j1] * .. * factors[D-1][jD]`
pub(crate) fn tensor_product(mesh: &TensorMesh, factors: &[Vec<f64>]) -> Result<DVector<f64>> {
    if factors.len() != mesh.dim() {
        return Err(GridError::DimensionMismatch {
            expected: mesh.dim(),
            found: factors.len(),
        });
    }
    for (factor, n) in factors.iter().zip(mesh.point_counts()) {
        if factor.len() != n {
            return Err(GridError::DimensionMismatch {
                expected: n,
                found: factor.len(),
            });
        }
    }

    let strides = mesh.strides();
    let weights: Vec<f64> = (0..mesh.num_points())
        .into_par_iter()
        .map(|p| {
            factors
                .iter()
                .zip(strides.iter())
                .map(|(factor, stride)| factor[(p / stride) % factor.len()])
                .product::<f64>()
        })
        .collect();

    Ok(DVector::from_vec(weights))
}

/// Weights of the standard discrete L2 inner product: the cell measure of every point
pub(crate) fn innerh_weights(mesh: &TensorMesh) -> Result<DVector<f64>> {
    let measures = mesh.cell_measures();
    if measures.len() != mesh.num_points() {
        return Err(GridError::DimensionMismatch {
            expected: mesh.num_points(),
            found: measures.len(),
        });
    }

    Ok(DVector::from_vec(measures))
}

/// Weights of the modified inner product emphasizing `axis` (numbered from 1)
pub(crate) fn innerplus_weights(mesh: &TensorMesh, axis: usize) -> Result<DVector<f64>> {
    mesh.check_axis(axis)?;

    let factors: Vec<Vec<f64>> = mesh
        .axes()
        .enumerate()
        .map(|(k, grid_axis)| axis_factor(grid_axis, k + 1 == axis))
        .collect();

    tensor_product(mesh, &factors)
}
