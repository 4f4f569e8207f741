/// A single coordinate axis of a structured mesh
pub mod axis;

pub use axis::GridAxis;

use crate::error::{GridError, Result};

#[cfg(feature = "json_export")]
use json::object;
use json::JsonValue;
use smallvec::SmallVec;
use std::fs::read_to_string;
#[cfg(feature = "json_export")]
use std::fs::File;
#[cfg(feature = "json_export")]
use std::io::BufWriter;

/// Largest supported number of mesh dimensions
pub const MAX_DIM: usize = 3;

/// Per-axis integer data (point counts, indices, strides)
pub type AxisIndex = SmallVec<[usize; MAX_DIM]>;

/// A structured, possibly non-uniform, tensor-product mesh in 1, 2, or 3 dimensions.
///
/// Points are enumerated in column-major order: the first axis varies fastest, so the
/// point with per-axis indices `(j1, j2, j3)` has linear index `j1 + n1 * (j2 + n2 * j3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorMesh {
    axes: SmallVec<[GridAxis; MAX_DIM]>,
    strides: AxisIndex,
    num_points: usize,
}

impl TensorMesh {
    /// Construct a mesh from one `GridAxis` per dimension
    pub fn new(axes: Vec<GridAxis>) -> Result<Self> {
        if axes.is_empty() || axes.len() > MAX_DIM {
            return Err(GridError::InvalidMesh(format!(
                "mesh must have between 1 and {} axes, found {}",
                MAX_DIM,
                axes.len()
            )));
        }

        let mut strides = AxisIndex::with_capacity(axes.len());
        let mut num_points = 1;
        for (k, axis) in axes.iter().enumerate() {
            if axis.num_points() == 0 {
                return Err(GridError::EmptyAxis(k + 1));
            }
            strides.push(num_points);
            num_points *= axis.num_points();
        }

        Ok(Self {
            axes: axes.into_iter().collect(),
            strides,
            num_points,
        })
    }

    /// Construct a mesh directly from per-axis coordinate lists
    pub fn from_coords(coords: Vec<Vec<f64>>) -> Result<Self> {
        let axes = coords
            .into_iter()
            .enumerate()
            .map(|(k, c)| {
                if c.is_empty() {
                    Err(GridError::EmptyAxis(k + 1))
                } else {
                    GridAxis::new(c)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(axes)
    }

    /// Uniformly spaced mesh over the box described by `bounds` with `counts` points per axis
    pub fn uniform(bounds: &[(f64, f64)], counts: &[usize]) -> Result<Self> {
        if bounds.len() != counts.len() {
            return Err(GridError::DimensionMismatch {
                expected: bounds.len(),
                found: counts.len(),
            });
        }

        let axes = bounds
            .iter()
            .zip(counts.iter())
            .enumerate()
            .map(|(k, (&(start, end), &n))| {
                if n == 0 {
                    Err(GridError::EmptyAxis(k + 1))
                } else {
                    GridAxis::uniform(start, end, n)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(axes)
    }

    /// Construct a Mesh from a JSON file with the following format
    ///
    /// ```JSON
    /// {
    ///     "axes": [
    ///         [0.0, 0.25, 0.5, 0.75, 1.0],
    ///         [0.0, 0.1, 0.3, 0.6]
    ///     ]
    /// }
    /// ```
    ///
    /// Each entry of `axes` lists the coordinates along one dimension in increasing order.
    pub fn from_file(path: impl AsRef<str>) -> Result<Self> {
        let mesh_file_contents = read_to_string(path.as_ref())?;
        let mesh_file_json = json::parse(&mesh_file_contents)?;

        let mesh = Self::from_coords(parse_axes(&mesh_file_json)?)?;
        log::debug!(
            "loaded {}D mesh with {} points from {}",
            mesh.dim(),
            mesh.num_points(),
            path.as_ref()
        );

        Ok(mesh)
    }

    /// Print the mesh to a JSON file specified by path (same format as [TensorMesh::from_file])
    #[cfg(feature = "json_export")]
    pub fn export_to_json(&self, path: impl AsRef<str>) -> Result<()> {
        let f = File::create(path.as_ref())?;
        let mut w = BufWriter::new(&f);

        let mesh_object = object! {
            "axes": JsonValue::from(
                self.axes.iter().map(|axis| JsonValue::from(axis.coords().to_vec())).collect::<Vec<_>>()
            ),
        };

        mesh_object.write_pretty(&mut w, 4)?;

        Ok(())
    }

    // ----------------------------------------------------------------------------------------------------
    // Topology
    // ----------------------------------------------------------------------------------------------------

    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    /// Total number of grid points
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// The axis numbered `axis` (numbering starts at 1)
    pub fn axis(&self, axis: usize) -> Result<&GridAxis> {
        self.check_axis(axis)?;
        Ok(&self.axes[axis - 1])
    }

    /// Iterate over the axes in order
    pub fn axes(&self) -> impl Iterator<Item = &GridAxis> + '_ {
        self.axes.iter()
    }

    pub fn point_counts(&self) -> AxisIndex {
        self.axes.iter().map(|a| a.num_points()).collect()
    }

    /// Distance between consecutive points along each axis in the linear ordering
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub(crate) fn check_axis(&self, axis: usize) -> Result<()> {
        if axis == 0 || axis > self.dim() {
            Err(GridError::InvalidAxis {
                axis,
                dim: self.dim(),
            })
        } else {
            Ok(())
        }
    }

    /// Per-axis indices of the point with linear index `p`
    pub fn multi_index(&self, p: usize) -> Result<AxisIndex> {
        self.check_point(p)?;
        Ok(self.split_index(p))
    }

    fn check_point(&self, p: usize) -> Result<()> {
        if p >= self.num_points {
            Err(GridError::OutOfBounds {
                index: vec![p],
                extent: vec![self.num_points],
            })
        } else {
            Ok(())
        }
    }

    /// `p` must be below `num_points`
    fn split_index(&self, p: usize) -> AxisIndex {
        self.strides
            .iter()
            .map(|stride| p / stride)
            .zip(self.axes.iter())
            .map(|(q, axis)| q % axis.num_points())
            .collect()
    }

    /// Linear index of the point with per-axis indices `index`
    pub fn linear_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.dim() {
            return Err(GridError::DimensionMismatch {
                expected: self.dim(),
                found: index.len(),
            });
        }
        if index
            .iter()
            .zip(self.axes.iter())
            .any(|(j, axis)| *j >= axis.num_points())
        {
            return Err(GridError::OutOfBounds {
                index: index.to_vec(),
                extent: self.point_counts().to_vec(),
            });
        }

        Ok(index
            .iter()
            .zip(self.strides.iter())
            .map(|(j, stride)| j * stride)
            .sum())
    }

    /// Iterate over the per-axis indices of every point in canonical order
    pub fn indices(&self) -> impl Iterator<Item = AxisIndex> + '_ {
        (0..self.num_points).map(move |p| self.split_index(p))
    }

    // ----------------------------------------------------------------------------------------------------
    // Geometry
    // ----------------------------------------------------------------------------------------------------

    /// Coordinates of the point with linear index `p`
    pub fn point(&self, p: usize) -> Result<SmallVec<[f64; MAX_DIM]>> {
        self.check_point(p)?;
        Ok(self.point_at(p))
    }

    pub(crate) fn point_at(&self, p: usize) -> SmallVec<[f64; MAX_DIM]> {
        self.split_index(p)
            .iter()
            .zip(self.axes.iter())
            .map(|(j, axis)| axis.coord(*j))
            .collect()
    }

    /// Local length/area/volume around point `p`: the product of its half spacings
    pub fn cell_measure(&self, p: usize) -> Result<f64> {
        self.check_point(p)?;
        Ok(self.measure_at(p))
    }

    fn measure_at(&self, p: usize) -> f64 {
        self.split_index(p)
            .iter()
            .zip(self.axes.iter())
            .map(|(j, axis)| axis.half_spacing(*j))
            .product()
    }

    /// Cell measures of all points in canonical order
    pub fn cell_measures(&self) -> Vec<f64> {
        (0..self.num_points).map(|p| self.measure_at(p)).collect()
    }
}

fn parse_axes(mesh_file_json: &JsonValue) -> Result<Vec<Vec<f64>>> {
    if !mesh_file_json["axes"].is_array() {
        return Err(GridError::InvalidMesh(String::from(
            "mesh file must contain an \"axes\" array",
        )));
    }

    mesh_file_json["axes"]
        .members()
        .enumerate()
        .map(|(k, json_axis)| {
            if !json_axis.is_array() {
                return Err(GridError::InvalidMesh(format!(
                    "axis {} must be an array of coordinates",
                    k + 1
                )));
            }

            json_axis
                .members()
                .map(|x| {
                    x.as_f64().ok_or_else(|| {
                        GridError::InvalidMesh(format!(
                            "axis {} must be composed of numerical values",
                            k + 1
                        ))
                    })
                })
                .collect()
        })
        .collect()
}
