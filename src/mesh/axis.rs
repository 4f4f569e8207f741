use crate::error::{GridError, Result};

/// An ordered set of coordinates along one direction of a structured mesh
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    coords: Vec<f64>,
}

impl GridAxis {
    /// Construct an axis from strictly increasing, finite coordinates
    pub fn new(coords: Vec<f64>) -> Result<Self> {
        if coords.is_empty() {
            return Err(GridError::InvalidMesh(String::from("axis has no points")));
        }
        if let Some(bad) = coords.iter().find(|x| !x.is_finite()) {
            return Err(GridError::InvalidMesh(format!(
                "axis coordinate {} is not finite",
                bad
            )));
        }
        if let Some(w) = coords.windows(2).find(|w| w[1] <= w[0]) {
            return Err(GridError::InvalidMesh(format!(
                "axis coordinates must be strictly increasing ({} >= {})",
                w[0], w[1]
            )));
        }

        Ok(Self { coords })
    }

    /// `n` evenly spaced points from `start` to `end` (inclusive)
    pub fn uniform(start: f64, end: f64, n: usize) -> Result<Self> {
        match n {
            0 => Err(GridError::InvalidMesh(String::from("axis has no points"))),
            1 => Self::new(vec![start]),
            _ => {
                let step = (end - start) / (n - 1) as f64;
                Self::new((0..n).map(|j| start + step * j as f64).collect())
            }
        }
    }

    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn coord(&self, j: usize) -> f64 {
        self.coords[j]
    }

    /// Backward spacing `x[j] - x[j-1]`; zero at the first point
    pub fn spacing(&self, j: usize) -> f64 {
        if j == 0 {
            0.0
        } else {
            self.coords[j] - self.coords[j - 1]
        }
    }

    /// Distance between the midpoints on either side of `x[j]`.
    ///
    /// The endpoints only see one neighbor, so they get half of the adjacent spacing.
    /// A single point axis has no extent and returns zero.
    pub fn half_spacing(&self, j: usize) -> f64 {
        let n = self.coords.len();
        if n < 2 {
            return 0.0;
        }

        let lo = self.coords[j.saturating_sub(1)];
        let hi = self.coords[(j + 1).min(n - 1)];
        (hi - lo) / 2.0
    }

    pub fn length(&self) -> f64 {
        self.coords[self.coords.len() - 1] - self.coords[0]
    }
}
