//! Validated liability network inputs.
//!
//! A [`LiabilityNetwork`] pairs the nominal liability matrix `L` with the external
//! asset vector `e`. Whatever format the caller starts from, the matrix is stored
//! in CSR form and checked once so that the solvers can assume well-formed data.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{ClearingError, Result};

/// Nominal liabilities and external assets for a network of `n` nodes.
#[derive(Clone, Debug)]
pub struct LiabilityNetwork {
    liabilities: CsrMatrix<f64>,
    external_assets: DVector<f64>,
}

impl LiabilityNetwork {
    /// Validates a CSR liability matrix against the external asset vector.
    pub fn new(liabilities: CsrMatrix<f64>, external_assets: DVector<f64>) -> Result<Self> {
        if liabilities.nrows() != liabilities.ncols() {
            return Err(ClearingError::NotSquare {
                rows: liabilities.nrows(),
                cols: liabilities.ncols(),
            });
        }
        let n = liabilities.nrows();
        if external_assets.len() != n {
            return Err(ClearingError::dimension_mismatch(
                "external assets length",
                n,
                external_assets.len(),
            ));
        }

        for (index, value) in external_assets.iter().enumerate() {
            if !value.is_finite() {
                return Err(ClearingError::NonFiniteInput {
                    context: "external assets",
                    index,
                });
            }
        }

        for (debtor, creditor, amount) in liabilities.triplet_iter() {
            if !amount.is_finite() {
                return Err(ClearingError::NonFiniteInput {
                    context: "liability matrix",
                    index: debtor * n + creditor,
                });
            }
            if *amount < 0.0 {
                return Err(ClearingError::NegativeLiability {
                    debtor,
                    creditor,
                    amount: *amount,
                });
            }
        }

        Ok(Self {
            liabilities,
            external_assets,
        })
    }

    /// Builds a network from a dense liability matrix, dropping explicit zeros.
    pub fn from_dense(liabilities: &DMatrix<f64>, external_assets: DVector<f64>) -> Result<Self> {
        Self::new(CsrMatrix::from(liabilities), external_assets)
    }

    /// Builds a network from a coordinate matrix. Duplicate entries are summed.
    pub fn from_coo(liabilities: &CooMatrix<f64>, external_assets: DVector<f64>) -> Result<Self> {
        Self::new(CsrMatrix::from(liabilities), external_assets)
    }

    /// Builds a network of `nodes` nodes from `(debtor, creditor, amount)` triplets.
    ///
    /// Repeated `(debtor, creditor)` pairs accumulate, so a list of individual
    /// contracts can be passed without pre-aggregation.
    pub fn from_triplets(
        nodes: usize,
        triplets: &[(usize, usize, f64)],
        external_assets: DVector<f64>,
    ) -> Result<Self> {
        let mut coo = CooMatrix::new(nodes, nodes);
        for &(row, col, amount) in triplets {
            if row >= nodes || col >= nodes {
                return Err(ClearingError::IndexOutOfBounds { row, col, nodes });
            }
            coo.push(row, col, amount);
        }
        Self::from_coo(&coo, external_assets)
    }

    /// Number of nodes in the network.
    pub fn node_count(&self) -> usize {
        self.external_assets.len()
    }

    /// Returns the nominal liability matrix `L`.
    pub fn liabilities(&self) -> &CsrMatrix<f64> {
        &self.liabilities
    }

    /// Returns the external asset vector `e`.
    pub fn external_assets(&self) -> &DVector<f64> {
        &self.external_assets
    }

    /// Same liabilities under a different external asset vector.
    pub fn with_external_assets(&self, external_assets: DVector<f64>) -> Result<Self> {
        Self::new(self.liabilities.clone(), external_assets)
    }
}
