/// Inner product weight construction
pub mod weights;

use crate::elements::{GridElement, MatrixElement, VectorElement};
use crate::error::{GridError, Result};
use crate::mesh::{TensorMesh, MAX_DIM};
use crate::operators::{self, EdgeBehavior, Shift};

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use smallvec::SmallVec;
#[cfg(feature = "json_export")]
use std::fs::File;
#[cfg(feature = "json_export")]
use std::io::BufWriter;
use std::sync::Arc;

/// Construction options for a [GridSpace]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridSpaceConfig {
    /// Treatment of the last point along each axis in the shift and difference operators
    pub edge: EdgeBehavior,
}

impl GridSpaceConfig {
    pub fn with_edge(edge: EdgeBehavior) -> Self {
        Self { edge }
    }
}

/// Discrete function space over a [TensorMesh].
///
/// Holds the inner product weights and the forward difference operator of every axis.
/// Everything is computed once, during construction, and never modified afterwards;
/// spaces are handed out as `Arc<GridSpace>` and elements refer back to them.
/// Two elements are compatible only when they share the same `Arc` (not merely an
/// equal mesh).
#[derive(Debug)]
pub struct GridSpace {
    mesh: Arc<TensorMesh>,
    config: GridSpaceConfig,
    innerh_weights: DVector<f64>,
    innerplus_weights: SmallVec<[DVector<f64>; MAX_DIM]>,
    diff_matrices: SmallVec<[CsrMatrix<f64>; MAX_DIM]>,
}

impl GridSpace {
    /// Build a space with the default configuration
    pub fn new(mesh: Arc<TensorMesh>) -> Result<Arc<Self>> {
        Self::with_config(mesh, GridSpaceConfig::default())
    }

    /// Build a space, computing its weights and difference operators
    pub fn with_config(mesh: Arc<TensorMesh>, config: GridSpaceConfig) -> Result<Arc<Self>> {
        if let Some(k) = mesh.point_counts().iter().position(|n| *n == 0) {
            return Err(GridError::EmptyAxis(k + 1));
        }

        let innerh_weights = weights::innerh_weights(&mesh)?;

        let innerplus_weights = (1..=mesh.dim())
            .map(|axis| weights::innerplus_weights(&mesh, axis))
            .collect::<Result<SmallVec<[_; MAX_DIM]>>>()?;

        let diff_matrices = (1..=mesh.dim())
            .map(|axis| operators::forward_difference(&mesh, axis, config.edge))
            .collect::<Result<SmallVec<[_; MAX_DIM]>>>()?;

        if let Some(w) = innerplus_weights
            .iter()
            .find(|w| w.len() != innerh_weights.len())
        {
            return Err(GridError::DimensionMismatch {
                expected: innerh_weights.len(),
                found: w.len(),
            });
        }

        log::debug!(
            "built {}D grid space: {} points, edge behavior {:?}",
            mesh.dim(),
            mesh.num_points(),
            config.edge
        );

        Ok(Arc::new(Self {
            mesh,
            config,
            innerh_weights,
            innerplus_weights,
            diff_matrices,
        }))
    }

    // ----------------------------------------------------------------------------------------------------
    // General Data Retrieval
    // ----------------------------------------------------------------------------------------------------

    pub fn mesh(&self) -> &Arc<TensorMesh> {
        &self.mesh
    }

    /// Number of degrees of freedom (one per grid point)
    pub fn ndofs(&self) -> usize {
        self.innerh_weights.len()
    }

    pub fn dim(&self) -> usize {
        self.mesh.dim()
    }

    /// Name of the scalar type stored by elements of this space
    pub fn element_type(&self) -> &'static str {
        std::any::type_name::<f64>()
    }

    pub fn config(&self) -> GridSpaceConfig {
        self.config
    }

    pub fn edge_behavior(&self) -> EdgeBehavior {
        self.config.edge
    }

    /// Cell measure of every point
    pub fn innerh_weights(&self) -> &DVector<f64> {
        &self.innerh_weights
    }

    /// Full spacing along `axis` times half spacings along the other axes
    pub fn innerplus_weights(&self, axis: usize) -> Result<&DVector<f64>> {
        self.mesh.check_axis(axis)?;
        Ok(&self.innerplus_weights[axis - 1])
    }

    /// The cached forward difference operator along `axis` as a raw sparse matrix
    pub fn diff_matrix(&self, axis: usize) -> Result<&CsrMatrix<f64>> {
        self.mesh.check_axis(axis)?;
        Ok(&self.diff_matrices[axis - 1])
    }

    /// Identity check used for every binary operation between elements
    pub fn is_same(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other)
    }

    // ----------------------------------------------------------------------------------------------------
    // Operators
    // ----------------------------------------------------------------------------------------------------

    /// Forward difference operator along `axis` (numbered from 1)
    pub fn get_diff_matrix(self: &Arc<Self>, axis: usize) -> Result<MatrixElement> {
        let matrix = self.diff_matrix(axis)?.clone();
        Ok(MatrixElement::from_parts(Arc::clone(self), matrix))
    }

    /// Shift operator along `axis`, assembled with this space's edge behavior
    pub fn shift_matrix(self: &Arc<Self>, axis: usize, shift: Shift) -> Result<MatrixElement> {
        let matrix = operators::shift_matrix(&self.mesh, axis, shift, self.config.edge)?;
        Ok(MatrixElement::from_parts(Arc::clone(self), matrix))
    }

    /// Forward average operator along `axis`
    pub fn average_matrix(self: &Arc<Self>, axis: usize) -> Result<MatrixElement> {
        let matrix = operators::forward_average(&self.mesh, axis, self.config.edge)?;
        Ok(MatrixElement::from_parts(Arc::clone(self), matrix))
    }

    // ----------------------------------------------------------------------------------------------------
    // Inner Products
    // ----------------------------------------------------------------------------------------------------

    /// Discrete L2 inner product `sum_p w[p] u[p] v[p]` using the cell measures
    pub fn inner_h(self: &Arc<Self>, u: &VectorElement, v: &VectorElement) -> Result<f64> {
        self.weighted_inner(&self.innerh_weights, u, v)
    }

    /// Modified inner product using the `innerplus` weights of `axis`
    pub fn inner_plus(
        self: &Arc<Self>,
        u: &VectorElement,
        v: &VectorElement,
        axis: usize,
    ) -> Result<f64> {
        let weights = self.innerplus_weights(axis)?;
        self.weighted_inner(weights, u, v)
    }

    /// Norm induced by [GridSpace::inner_h]
    pub fn norm_h(self: &Arc<Self>, u: &VectorElement) -> Result<f64> {
        Ok(self.inner_h(u, u)?.sqrt())
    }

    fn weighted_inner(
        self: &Arc<Self>,
        weights: &DVector<f64>,
        u: &VectorElement,
        v: &VectorElement,
    ) -> Result<f64> {
        if !self.is_same(u.space()) || !self.is_same(v.space()) {
            return Err(GridError::IncompatibleSpace);
        }

        Ok(weights
            .iter()
            .zip(u.values().iter().zip(v.values().iter()))
            .map(|(w, (a, b))| w * a * b)
            .sum())
    }

    /// Print the mesh axes and inner product weights to a JSON file specified by path
    #[cfg(feature = "json_export")]
    pub fn export_to_json(&self, path: impl AsRef<str>) -> Result<()> {
        let f = File::create(path.as_ref())?;
        let mut w = BufWriter::new(&f);

        let space_object = object! {
            "axes": JsonValue::from(
                self.mesh.axes().map(|axis| JsonValue::from(axis.coords().to_vec())).collect::<Vec<_>>()
            ),
            "edge": format!("{:?}", self.config.edge),
            "innerh_weights": JsonValue::from(self.innerh_weights.as_slice().to_vec()),
            "innerplus_weights": JsonValue::from(
                self.innerplus_weights.iter().map(|w| JsonValue::from(w.as_slice().to_vec())).collect::<Vec<_>>()
            ),
        };

        space_object.write_pretty(&mut w, 4)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn non_uniform_2d() -> Arc<TensorMesh> {
        Arc::new(
            TensorMesh::from_coords(vec![
                vec![0.0, 0.1, 0.3, 0.6, 1.0],
                vec![0.0, 0.5, 0.75, 2.0, 2.5, 3.0],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn uniform_1d_weights() {
        let mesh = Arc::new(TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap());
        let space = GridSpace::new(mesh).unwrap();

        assert_eq!(space.ndofs(), 5);
        assert_eq!(space.dim(), 1);
        assert_eq!(
            space.innerh_weights().as_slice(),
            &[0.125, 0.25, 0.25, 0.25, 0.125]
        );
        assert_eq!(
            space.innerplus_weights(1).unwrap().as_slice(),
            &[0.0, 0.25, 0.25, 0.25, 0.25]
        );
    }

    #[test]
    fn innerh_is_product_of_half_spacings() {
        let mesh = non_uniform_2d();
        let space = GridSpace::new(Arc::clone(&mesh)).unwrap();

        let [x, y] = [mesh.axis(1).unwrap(), mesh.axis(2).unwrap()];
        for (p, idx) in mesh.indices().enumerate() {
            let expected = x.half_spacing(idx[0]) * y.half_spacing(idx[1]);
            assert!((space.innerh_weights()[p] - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn innerplus_tensor_product_property() {
        let mesh = non_uniform_2d();
        let space = GridSpace::new(Arc::clone(&mesh)).unwrap();

        let [x, y] = [mesh.axis(1).unwrap(), mesh.axis(2).unwrap()];
        let [nx, ny] = [x.num_points(), y.num_points()];
        let wx = space.innerplus_weights(1).unwrap();
        let wy = space.innerplus_weights(2).unwrap();

        for (p, idx) in mesh.indices().enumerate() {
            let [i, j] = [idx[0], idx[1]];

            let off_y = if j == 0 || j == ny - 1 { 0.0 } else { y.half_spacing(j) };
            let off_x = if i == 0 || i == nx - 1 { 0.0 } else { x.half_spacing(i) };

            assert!((wx[p] - x.spacing(i) * off_y).abs() < 1e-15);
            assert!((wy[p] - y.spacing(j) * off_x).abs() < 1e-15);
        }

        // interior point (2, 3): spacing_x(2) * half_spacing_y(3)
        let p = mesh.linear_index(&[2, 3]).unwrap();
        assert!((wx[p] - 0.2 * 0.875).abs() < 1e-15);
        assert!((wy[p] - 1.25 * 0.25).abs() < 1e-15);
    }

    #[test]
    fn cached_diff_matrices() {
        let space = GridSpace::new(non_uniform_2d()).unwrap();

        for axis in 1..=2 {
            let cached = space.get_diff_matrix(axis).unwrap();
            let fresh =
                operators::forward_difference(space.mesh(), axis, EdgeBehavior::Clamp).unwrap();
            assert_eq!(cached.to_dense(), DMatrix::from(&fresh));
            assert!(space.is_same(cached.space()));
        }
    }

    #[test]
    fn axis_out_of_range() {
        let space = GridSpace::new(non_uniform_2d()).unwrap();

        assert!(matches!(
            space.get_diff_matrix(4),
            Err(GridError::InvalidAxis { axis: 4, dim: 2 })
        ));
        assert!(matches!(
            space.get_diff_matrix(0),
            Err(GridError::InvalidAxis { axis: 0, dim: 2 })
        ));
        assert!(matches!(
            space.innerplus_weights(3),
            Err(GridError::InvalidAxis { .. })
        ));
    }

    #[test]
    fn end_to_end_1d() {
        let mesh = Arc::new(TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap());
        let space = GridSpace::new(mesh).unwrap();

        let u = VectorElement::from_vec(&space, vec![0.0, 1.0, 4.0, 9.0, 16.0]).unwrap();
        let du = space.get_diff_matrix(1).unwrap().apply(&u).unwrap();

        assert_eq!(du.values().as_slice(), &[1.0, 3.0, 5.0, 7.0, 0.0]);
    }

    #[test]
    fn absorbing_edge_config() {
        let mesh = Arc::new(TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap());
        let space =
            GridSpace::with_config(mesh, GridSpaceConfig::with_edge(EdgeBehavior::Absorb)).unwrap();
        assert_eq!(space.edge_behavior(), EdgeBehavior::Absorb);

        let u = VectorElement::from_vec(&space, vec![0.0, 1.0, 4.0, 9.0, 16.0]).unwrap();
        let du = space.get_diff_matrix(1).unwrap().apply(&u).unwrap();

        assert_eq!(du.values().as_slice(), &[1.0, 3.0, 5.0, 7.0, -16.0]);
    }

    #[test]
    fn inner_products() {
        let mesh = Arc::new(TensorMesh::uniform(&[(0.0, 1.0), (0.0, 2.0)], &[5, 3]).unwrap());
        let space = GridSpace::new(mesh).unwrap();

        let one = VectorElement::from_fn(&space, |_| 1.0);
        // integral of 1 over [0, 1] x [0, 2]
        assert!((space.inner_h(&one, &one).unwrap() - 2.0).abs() < 1e-14);
        assert!((space.norm_h(&one).unwrap() - 2.0f64.sqrt()).abs() < 1e-14);

        // x-emphasized weights: full spacing 0.25 on 4 points, off-axis interior half spacing 1.0
        assert!((space.inner_plus(&one, &one, 1).unwrap() - 1.0).abs() < 1e-14);

        let other_space = GridSpace::new(Arc::clone(space.mesh())).unwrap();
        let foreign = VectorElement::from_fn(&other_space, |_| 1.0);
        assert!(matches!(
            space.inner_h(&one, &foreign),
            Err(GridError::IncompatibleSpace)
        ));
    }

    #[test]
    fn element_type_and_accessors() {
        let space = GridSpace::new(non_uniform_2d()).unwrap();
        assert_eq!(space.element_type(), "f64");
        assert_eq!(space.ndofs(), 30);
        assert_eq!(space.mesh().num_points(), space.ndofs());
    }

    #[test]
    #[cfg(feature = "json_export")]
    fn space_to_json() {
        let space = GridSpace::new(non_uniform_2d()).unwrap();
        space.export_to_json("./test_output/space_2d.json").unwrap();

        let contents = std::fs::read_to_string("./test_output/space_2d.json").unwrap();
        let parsed = json::parse(&contents).unwrap();
        assert_eq!(parsed["innerh_weights"].members().count(), 30);
        assert_eq!(parsed["innerplus_weights"].members().count(), 2);
    }
}
