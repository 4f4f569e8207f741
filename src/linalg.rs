/// Export of sparse operators in PETSc's binary format
pub mod petsc;

use crate::error::{GridError, Result};

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;

/// Sparse matrix-vector product `m * x`, evaluated row by row in parallel.
///
/// Rows are collected in order, so the result is identical to a sequential evaluation.
pub fn csr_matvec(m: &CsrMatrix<f64>, x: &DVector<f64>) -> Result<DVector<f64>> {
    if m.ncols() != x.len() {
        return Err(GridError::DimensionMismatch {
            expected: m.ncols(),
            found: x.len(),
        });
    }

    let offsets = m.row_offsets();
    let cols = m.col_indices();
    let values = m.values();

    let y: Vec<f64> = (0..m.nrows())
        .into_par_iter()
        .map(|r| {
            let span = offsets[r]..offsets[r + 1];
            cols[span.clone()]
                .iter()
                .zip(values[span].iter())
                .map(|(c, v)| v * x[*c])
                .sum::<f64>()
        })
        .collect();

    Ok(DVector::from_vec(y))
}

/// True when both matrices have the same shape and store entries at the same positions
pub fn same_pattern(a: &CsrMatrix<f64>, b: &CsrMatrix<f64>) -> bool {
    a.nrows() == b.nrows()
        && a.ncols() == b.ncols()
        && a.row_offsets() == b.row_offsets()
        && a.col_indices() == b.col_indices()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use nalgebra_sparse::CooMatrix;

    fn sample() -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(3, 3);
        coo.push(0, 0, 1.0);
        coo.push(0, 2, 2.0);
        coo.push(1, 1, 3.0);
        coo.push(2, 0, 4.0);
        coo.push(2, 2, 5.0);
        CsrMatrix::from(&coo)
    }

    #[test]
    fn matvec_matches_dense() {
        let m = sample();
        let x = DVector::from_vec(vec![1.0, -2.0, 0.5]);

        let y = csr_matvec(&m, &x).unwrap();
        assert_eq!(y, DMatrix::from(&m) * &x);
        assert_eq!(y.as_slice(), &[2.0, -6.0, 6.5]);
    }

    #[test]
    fn matvec_empty_rows() {
        let m = CsrMatrix::<f64>::zeros(2, 2);
        let y = csr_matvec(&m, &DVector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(y.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn matvec_wrong_length() {
        assert!(matches!(
            csr_matvec(&sample(), &DVector::from_vec(vec![1.0, 2.0])),
            Err(GridError::DimensionMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn pattern_comparison() {
        let a = sample();
        let mut b = sample();
        b.values_mut().iter_mut().for_each(|v| *v = -*v);

        assert!(same_pattern(&a, &b));
        assert!(!same_pattern(&a, &CsrMatrix::identity(3)));
        assert!(!same_pattern(&a, &CsrMatrix::identity(4)));
    }
}
