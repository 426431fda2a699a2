//! Minimal sparse-matrix capability used by the preprocessor and both solvers.
//!
//! The clearing algorithms only ever need row sums, row scaling, a transpose and
//! matrix-vector products. Keeping those behind [`SparseOps`] means the solver code
//! never touches a storage format directly.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

/// Operations a liability-like matrix must support.
pub trait SparseOps: Sized {
    /// Number of rows.
    fn nrows(&self) -> usize;

    /// Number of columns.
    fn ncols(&self) -> usize;

    /// Sum of every row, returned as a column vector.
    fn row_sums(&self) -> DVector<f64>;

    /// Returns a copy with row `i` multiplied by `factors[i]`.
    fn scale_rows(&self, factors: &DVector<f64>) -> Self;

    /// Returns the transposed matrix.
    fn transposed(&self) -> Self;

    /// Computes `self * x`.
    fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64>;
}

impl SparseOps for CsrMatrix<f64> {
    fn nrows(&self) -> usize {
        CsrMatrix::nrows(self)
    }

    fn ncols(&self) -> usize {
        CsrMatrix::ncols(self)
    }

    fn row_sums(&self) -> DVector<f64> {
        DVector::from_iterator(
            CsrMatrix::nrows(self),
            self.row_iter()
                .map(|row| row.values().iter().fold(0.0, |total, value| total + value)),
        )
    }

    fn scale_rows(&self, factors: &DVector<f64>) -> Self {
        let mut scaled = self.clone();
        for (row_index, mut row) in scaled.row_iter_mut().enumerate() {
            let factor = factors[row_index];
            for value in row.values_mut() {
                *value *= factor;
            }
        }
        scaled
    }

    fn transposed(&self) -> Self {
        self.transpose()
    }

    fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        self * x
    }
}
