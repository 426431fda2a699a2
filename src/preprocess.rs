//! Derived quantities shared by both clearing solvers.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::network::LiabilityNetwork;
use crate::sparse::SparseOps;

/// Total obligation of every node: the row sums of `L`.
pub fn compute_total_obligations<M: SparseOps>(liabilities: &M) -> DVector<f64> {
    liabilities.row_sums()
}

/// Relative liabilities matrix `Pi`.
///
/// Row `i` is row `i` of `L` divided by `p_bar[i]`; rows of nodes that owe nothing
/// are zeroed. The sparsity pattern of `L` is preserved.
pub fn compute_proportional_matrix<M: SparseOps>(liabilities: &M) -> M {
    let p_bar = compute_total_obligations(liabilities);
    let factors = p_bar.map(|total| if total != 0.0 { total.recip() } else { 0.0 });
    liabilities.scale_rows(&factors)
}

/// Everything a solve derives from the inputs, computed once per call.
#[derive(Clone, Debug)]
pub struct ClearingSystem {
    p_bar: DVector<f64>,
    pi: CsrMatrix<f64>,
    pi_t: CsrMatrix<f64>,
    external_assets: DVector<f64>,
}

impl ClearingSystem {
    /// Derives `p_bar`, `Pi` and `Pi^T` from a validated network.
    pub fn new(network: &LiabilityNetwork) -> Self {
        let liabilities = network.liabilities();
        let p_bar = compute_total_obligations(liabilities);
        let pi = compute_proportional_matrix(liabilities);
        let pi_t = pi.transposed();
        Self {
            p_bar,
            pi,
            pi_t,
            external_assets: network.external_assets().clone(),
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.p_bar.len()
    }

    /// Total obligations `p_bar`.
    pub fn total_obligations(&self) -> &DVector<f64> {
        &self.p_bar
    }

    /// Relative liabilities matrix `Pi`.
    pub fn proportional(&self) -> &CsrMatrix<f64> {
        &self.pi
    }

    /// Transposed relative liabilities matrix `Pi^T`.
    pub fn proportional_transpose(&self) -> &CsrMatrix<f64> {
        &self.pi_t
    }

    /// External assets `e`.
    pub fn external_assets(&self) -> &DVector<f64> {
        &self.external_assets
    }

    /// Inflow each node receives when payers pay `payments`: `Pi^T * p`.
    pub fn inflows(&self, payments: &DVector<f64>) -> DVector<f64> {
        self.pi_t.mul_vector(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn network() -> LiabilityNetwork {
        let dense = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 3.0, 1.0, 0.0, 0.0, 0.0, 2.0, 2.0, 0.0],
        );
        LiabilityNetwork::from_dense(&dense, DVector::zeros(3)).unwrap()
    }

    #[test]
    fn total_obligations_are_row_sums() {
        let p_bar = compute_total_obligations(network().liabilities());
        assert_eq!(p_bar, DVector::from_vec(vec![4.0, 0.0, 4.0]));
    }

    #[test]
    fn proportional_rows_are_stochastic_or_zero() {
        let pi = compute_proportional_matrix(network().liabilities());
        let sums = pi.row_sums();
        assert_relative_eq!(sums[0], 1.0, epsilon = 1e-15);
        assert_eq!(sums[1], 0.0);
        assert_relative_eq!(sums[2], 1.0, epsilon = 1e-15);
        assert_eq!(pi.nnz(), network().liabilities().nnz());
    }

    #[test]
    fn all_zero_liabilities_give_zero_obligations() {
        let network = LiabilityNetwork::from_triplets(4, &[], DVector::zeros(4)).unwrap();
        let system = ClearingSystem::new(&network);
        assert_eq!(system.total_obligations(), &DVector::zeros(4));
        assert_eq!(system.proportional().nnz(), 0);
    }

    #[test]
    fn inflows_distribute_payments_proportionally() {
        let system = ClearingSystem::new(&network());
        let inflows = system.inflows(&DVector::from_vec(vec![4.0, 0.0, 2.0]));
        assert_relative_eq!(inflows[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(inflows[1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(inflows[2], 1.0, epsilon = 1e-12);
    }
}
