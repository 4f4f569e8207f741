/// Treatment of the last point along an axis
pub mod edge;

pub use edge::EdgeBehavior;

use crate::elements::{GridElement, MatrixElement, VectorElement};
use crate::error::Result;
use crate::mesh::{TensorMesh, MAX_DIM};
use crate::space::GridSpace;

use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;
use smallvec::SmallVec;
use std::sync::Arc;

/// Offset of a shift operator along one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shift {
    /// Shift by zero (the identity)
    Identity,
    /// Shift by +1
    Forward,
}

/// Sparse operator mapping a grid function to its values shifted along `axis`.
///
/// Row `p` of the result holds a single `1.0` in the column of the point reached from `p`,
/// so `(S u)[p] = u[p + e_axis]`. The last point along the axis follows `edge`.
/// Only the mesh topology is used; no spacing enters the matrix.
pub fn shift_matrix(
    mesh: &TensorMesh,
    axis: usize,
    shift: Shift,
    edge: EdgeBehavior,
) -> Result<CsrMatrix<f64>> {
    mesh.check_axis(axis)?;
    let n = mesh.num_points();

    if shift == Shift::Identity {
        return Ok(CsrMatrix::identity(n));
    }

    let stride = mesh.strides()[axis - 1];
    let len = mesh.point_counts()[axis - 1];

    let targets: Vec<Option<usize>> = (0..n)
        .into_par_iter()
        .map(|p| edge.forward_target(p, (p / stride) % len, len, stride))
        .collect();

    let mut row_offsets = Vec::with_capacity(n + 1);
    let mut col_indices = Vec::with_capacity(n);
    row_offsets.push(0);
    for target in targets {
        if let Some(q) = target {
            col_indices.push(q);
        }
        row_offsets.push(col_indices.len());
    }
    let values = vec![1.0; col_indices.len()];

    log::trace!(
        "assembled {:?} shift along axis {} ({} stored entries)",
        shift,
        axis,
        values.len()
    );

    Ok(CsrMatrix::try_from_csr_data(
        n,
        n,
        row_offsets,
        col_indices,
        values,
    )?)
}

/// Unscaled forward difference `shift(axis, Forward) - shift(axis, Identity)`
pub fn forward_difference(
    mesh: &TensorMesh,
    axis: usize,
    edge: EdgeBehavior,
) -> Result<CsrMatrix<f64>> {
    let forward = shift_matrix(mesh, axis, Shift::Forward, edge)?;
    let identity = shift_matrix(mesh, axis, Shift::Identity, edge)?;

    Ok(&forward - &identity)
}

/// Forward average `(shift(axis, Forward) + shift(axis, Identity)) / 2`
pub fn forward_average(
    mesh: &TensorMesh,
    axis: usize,
    edge: EdgeBehavior,
) -> Result<CsrMatrix<f64>> {
    let forward = shift_matrix(mesh, axis, Shift::Forward, edge)?;
    let identity = shift_matrix(mesh, axis, Shift::Identity, edge)?;

    let mut average = &forward + &identity;
    average.values_mut().iter_mut().for_each(|v| *v *= 0.5);
    Ok(average)
}

/// Forward differencing along the axes of a [GridSpace].
///
/// * on a space: the difference operator itself
/// * on a [VectorElement]: the differenced grid function `D u`
/// * on a [MatrixElement]: the composed operator `D M`
pub trait Diff {
    type Output;

    /// Number of axes available to [Diff::diff]
    fn num_axes(&self) -> usize;

    /// Forward difference along `axis` (numbered from 1)
    fn diff(&self, axis: usize) -> Result<Self::Output>;

    /// Forward differences along every axis, in axis order.
    ///
    /// A 1D space yields a single entry.
    fn diff_all(&self) -> Result<SmallVec<[Self::Output; MAX_DIM]>> {
        (1..=self.num_axes()).map(|axis| self.diff(axis)).collect()
    }
}

impl Diff for Arc<GridSpace> {
    type Output = MatrixElement;

    fn num_axes(&self) -> usize {
        self.dim()
    }

    fn diff(&self, axis: usize) -> Result<MatrixElement> {
        self.get_diff_matrix(axis)
    }
}

impl Diff for VectorElement {
    type Output = VectorElement;

    fn num_axes(&self) -> usize {
        self.space().dim()
    }

    fn diff(&self, axis: usize) -> Result<VectorElement> {
        self.space().get_diff_matrix(axis)?.apply(self)
    }
}

impl Diff for MatrixElement {
    type Output = MatrixElement;

    fn num_axes(&self) -> usize {
        self.space().dim()
    }

    fn diff(&self, axis: usize) -> Result<MatrixElement> {
        self.space().get_diff_matrix(axis)?.try_matmul(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use nalgebra::DMatrix;
    use proptest::prelude::*;

    fn mesh_2d() -> TensorMesh {
        TensorMesh::from_coords(vec![vec![0.0, 0.1, 0.3, 0.6], vec![0.0, 1.0, 3.0]]).unwrap()
    }

    #[test]
    fn forward_shift_1d() {
        let mesh = TensorMesh::uniform(&[(0.0, 1.0)], &[4]).unwrap();
        let s = DMatrix::from(&shift_matrix(&mesh, 1, Shift::Forward, EdgeBehavior::Clamp).unwrap());

        let expected = DMatrix::from_row_slice(
            4,
            4,
            &[
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        );
        assert_eq!(s, expected);
    }

    #[test]
    fn forward_shift_second_axis() {
        let mesh = mesh_2d();
        let s = shift_matrix(&mesh, 2, Shift::Forward, EdgeBehavior::Absorb).unwrap();

        // 4 points per row along axis 1, the last row of 4 points has no +1 neighbor in axis 2
        assert_eq!(s.nnz(), 8);
        for (r, c, v) in s.triplet_iter() {
            assert_eq!(c, r + 4);
            assert_eq!(*v, 1.0);
        }
    }

    #[test]
    fn difference_edge_rows() {
        let mesh = TensorMesh::uniform(&[(0.0, 1.0)], &[3]).unwrap();

        let clamp = DMatrix::from(&forward_difference(&mesh, 1, EdgeBehavior::Clamp).unwrap());
        let wrap = DMatrix::from(&forward_difference(&mesh, 1, EdgeBehavior::Wrap).unwrap());
        let absorb = DMatrix::from(&forward_difference(&mesh, 1, EdgeBehavior::Absorb).unwrap());

        for m in [&clamp, &wrap, &absorb] {
            assert_eq!(m[(0, 0)], -1.0);
            assert_eq!(m[(0, 1)], 1.0);
            assert_eq!(m[(1, 1)], -1.0);
            assert_eq!(m[(1, 2)], 1.0);
        }

        assert_eq!(clamp.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 0.0]);
        assert_eq!(wrap.row(2).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0, -1.0]);
        assert_eq!(absorb.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, -1.0]);
    }

    #[test]
    fn identity_plus_difference_is_forward_shift() {
        let mesh = TensorMesh::from_coords(vec![
            vec![0.0, 0.1, 0.3],
            vec![0.0, 1.0, 3.0, 3.5],
            vec![-1.0, 1.0],
        ])
        .unwrap();

        for edge in [EdgeBehavior::Clamp, EdgeBehavior::Wrap, EdgeBehavior::Absorb] {
            for axis in 1..=3 {
                let s0 = shift_matrix(&mesh, axis, Shift::Identity, edge).unwrap();
                let s1 = shift_matrix(&mesh, axis, Shift::Forward, edge).unwrap();
                let d = forward_difference(&mesh, axis, edge).unwrap();

                assert_eq!(DMatrix::from(&(&s0 + &d)), DMatrix::from(&s1));
            }
        }
    }

    #[test]
    fn average_of_linear_function() {
        let mesh = TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap();
        let avg = DMatrix::from(&forward_average(&mesh, 1, EdgeBehavior::Clamp).unwrap());

        let u = nalgebra::DVector::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let mid = avg * u;
        let expected = [0.5, 1.5, 2.5, 3.5, 4.0];
        for (m, e) in mid.iter().zip(expected.iter()) {
            assert!((m - e).abs() < 1e-15);
        }
    }

    #[test]
    fn invalid_axis() {
        let mesh = mesh_2d();
        assert!(matches!(
            shift_matrix(&mesh, 3, Shift::Forward, EdgeBehavior::Clamp),
            Err(GridError::InvalidAxis { axis: 3, dim: 2 })
        ));
        assert!(matches!(
            forward_difference(&mesh, 0, EdgeBehavior::Clamp),
            Err(GridError::InvalidAxis { axis: 0, dim: 2 })
        ));
    }

    #[test]
    fn diff_all_axes() {
        let space = GridSpace::new(Arc::new(mesh_2d())).unwrap();

        let operators = space.diff_all().unwrap();
        assert_eq!(operators.len(), 2);

        let u = VectorElement::from_fn(&space, |x| x[0] + 10.0 * x[1]);
        let du = u.diff_all().unwrap();

        // point (1, 1): neighbors (2, 1) and (1, 2)
        let p = space.mesh().linear_index(&[1, 1]).unwrap();
        assert!((du[0][p] - 0.2).abs() < 1e-14);
        assert!((du[1][p] - 20.0).abs() < 1e-14);

        let dm = MatrixElement::identity(&space).diff_all().unwrap();
        for (a, b) in dm.iter().zip(operators.iter()) {
            assert_eq!(a.to_dense(), b.to_dense());
        }
    }

    #[test]
    fn diff_1d_single_entry() {
        let space = GridSpace::new(Arc::new(TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap())).unwrap();
        assert_eq!(space.diff_all().unwrap().len(), 1);
        assert!(matches!(space.diff(2), Err(GridError::InvalidAxis { .. })));
    }

    proptest! {
        #[test]
        fn diff_is_linear(
            u in prop::collection::vec(-10.0f64..10.0, 12),
            v in prop::collection::vec(-10.0f64..10.0, 12),
            alpha in -5.0f64..5.0,
            beta in -5.0f64..5.0,
            axis in 1usize..=2,
        ) {
            let space = GridSpace::new(Arc::new(mesh_2d())).unwrap();
            let u = VectorElement::from_vec(&space, u).unwrap();
            let v = VectorElement::from_vec(&space, v).unwrap();

            let combined = u.scale(alpha).try_add(&v.scale(beta)).unwrap();
            let lhs = combined.diff(axis).unwrap();
            let rhs = u.diff(axis).unwrap().scale(alpha).try_add(&v.diff(axis).unwrap().scale(beta)).unwrap();

            for (l, r) in lhs.values().iter().zip(rhs.values().iter()) {
                prop_assert!((l - r).abs() < 1e-10);
            }
        }

        #[test]
        fn shift_identity_holds_for_any_mesh(
            n1 in 1usize..6,
            n2 in 1usize..6,
            axis in 1usize..=2,
        ) {
            let mesh = TensorMesh::uniform(&[(0.0, 1.0), (0.0, 2.0)], &[n1, n2]).unwrap();
            for edge in [EdgeBehavior::Clamp, EdgeBehavior::Wrap, EdgeBehavior::Absorb] {
                let s0 = shift_matrix(&mesh, axis, Shift::Identity, edge).unwrap();
                let s1 = shift_matrix(&mesh, axis, Shift::Forward, edge).unwrap();
                let d = forward_difference(&mesh, axis, edge).unwrap();
                prop_assert_eq!(DMatrix::from(&(&s0 + &d)), DMatrix::from(&s1));
            }
        }
    }
}
