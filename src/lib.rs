//! Finite-difference function spaces over structured, non-uniform meshes.
//!
//! A [GridSpace] is built once from a [TensorMesh]. It holds the inner product weights of the
//! mesh and the forward difference operator of every axis. Grid functions ([VectorElement]) and
//! sparse operators ([MatrixElement]) refer back to their space, and binary operations check
//! that both operands share it.
//!
//! ```
//! use gridspace_fd::{Diff, GridSpace, TensorMesh, VectorElement};
//! use std::sync::Arc;
//!
//! let mesh = Arc::new(TensorMesh::uniform(&[(0.0, 1.0)], &[5]).unwrap());
//! let space = GridSpace::new(mesh).unwrap();
//!
//! let u = VectorElement::from_vec(&space, vec![0.0, 1.0, 4.0, 9.0, 16.0]).unwrap();
//! let du = u.diff(1).unwrap();
//! assert_eq!(du.values().as_slice(), &[1.0, 3.0, 5.0, 7.0, 0.0]);
//! ```

/// Grid functions and sparse operators tied to a GridSpace
pub mod elements;
/// Error taxonomy shared by every operation
pub mod error;
/// Sparse linear algebra helpers
pub mod linalg;
/// Structured tensor-product meshes
pub mod mesh;
/// Shift, difference, and average operators
pub mod operators;
/// Grid spaces: inner product weights and cached difference operators
pub mod space;

pub use elements::{GridElement, MatrixElement, VectorElement};
pub use error::{GridError, Result};
pub use mesh::{GridAxis, TensorMesh, MAX_DIM};
pub use operators::{Diff, EdgeBehavior, Shift};
pub use space::{GridSpace, GridSpaceConfig};
