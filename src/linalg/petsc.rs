use std::fs::File;
use std::io::{BufWriter, Write};

use bytes::{BufMut, BytesMut};
use nalgebra_sparse::CsrMatrix;

/// PETSc's class id for matrices stored in binary files
pub const MAT_FILE_CLASSID: i32 = 1211216;

/// Petsc/Slepc Sparse Matrix Format
pub struct AIJMatrixBinary {
    pub a: Vec<f64>,
    pub i: Vec<i32>, // Number of entries on each row (compute a prefix sum to get canonical form)
    pub j: Vec<i32>,
    pub rows: usize,
    pub cols: usize,
}

impl From<&CsrMatrix<f64>> for AIJMatrixBinary {
    fn from(sm: &CsrMatrix<f64>) -> Self {
        let i = sm
            .row_offsets()
            .windows(2)
            .map(|w| (w[1] - w[0]) as i32)
            .collect();

        Self {
            a: sm.values().to_vec(),
            i,
            j: sm.col_indices().iter().map(|c| *c as i32).collect(),
            rows: sm.nrows(),
            cols: sm.ncols(),
        }
    }
}

impl AIJMatrixBinary {
    pub fn print_to_petsc_binary_file(&self, path: impl AsRef<str>) -> std::io::Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        // header
        let mut header_buf = BytesMut::with_capacity(16);
        header_buf.put_i32(MAT_FILE_CLASSID);
        header_buf.put_i32(self.rows as i32);
        header_buf.put_i32(self.cols as i32);
        header_buf.put_i32(self.a.len() as i32);
        writer.write_all(header_buf.as_ref())?;

        // num-non-zero entries on each row
        let mut rnnz_buf = BytesMut::with_capacity(self.i.len() * 4);
        for &rnz in self.i.iter() {
            rnnz_buf.put_i32(rnz);
        }
        writer.write_all(rnnz_buf.as_ref())?;

        // column indices of non-zero entries
        let mut j_buf = BytesMut::with_capacity(self.j.len() * 4);
        for &j in self.j.iter() {
            j_buf.put_i32(j);
        }
        writer.write_all(j_buf.as_ref())?;

        // non-zero entries
        let mut a_buf = BytesMut::with_capacity(self.a.len() * 8);
        for &a in self.a.iter() {
            a_buf.put_f64(a);
        }
        writer.write_all(a_buf.as_ref())?;

        writer.flush()
    }
}
