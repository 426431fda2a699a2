//! Seeded synthetic liability networks for stress runs and benchmarks.

use nalgebra::DVector;
use nalgebra_sparse::CooMatrix;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Uniform};

use crate::error::{ClearingError, Result};
use crate::network::LiabilityNetwork;

/// Random directed network: each ordered pair of distinct nodes carries a
/// liability with probability `density`, with log-normally distributed amounts.
#[derive(Clone, Debug)]
pub struct NetworkGenerator {
    /// Number of nodes.
    pub nodes: usize,
    /// Probability that node `i` owes node `j`.
    pub density: f64,
    /// Location of the log-normal liability amounts.
    pub amount_mu: f64,
    /// Scale of the log-normal liability amounts.
    pub amount_sigma: f64,
    /// External assets are drawn uniformly from this range.
    pub asset_range: (f64, f64),
}

impl NetworkGenerator {
    /// A generator for `nodes` nodes with moderate connectivity.
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            density: 0.1,
            amount_mu: 0.0,
            amount_sigma: 1.0,
            asset_range: (0.0, 2.0),
        }
    }

    /// Sets the link probability.
    pub fn density(mut self, density: f64) -> Self {
        self.density = density.clamp(0.0, 1.0);
        self
    }

    /// Sets the external asset range.
    pub fn asset_range(mut self, low: f64, high: f64) -> Self {
        self.asset_range = (low, high);
        self
    }

    /// Draws a network from the generator with a fixed seed.
    pub fn generate(&self, seed: u64) -> Result<LiabilityNetwork> {
        let (low, high) = self.asset_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(ClearingError::NumericalError {
                context: "asset range",
            });
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ClearingError::NumericalError {
                context: "link density",
            });
        }
        let amounts = LogNormal::new(self.amount_mu, self.amount_sigma).map_err(|_| {
            ClearingError::NumericalError {
                context: "liability amount distribution",
            }
        })?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut coo = CooMatrix::new(self.nodes, self.nodes);
        for debtor in 0..self.nodes {
            for creditor in 0..self.nodes {
                if debtor != creditor && rng.gen_bool(self.density) {
                    coo.push(debtor, creditor, amounts.sample(&mut rng));
                }
            }
        }

        let assets = Uniform::new_inclusive(low, high);
        let external_assets =
            DVector::from_iterator(self.nodes, (0..self.nodes).map(|_| assets.sample(&mut rng)));

        LiabilityNetwork::from_coo(&coo, external_assets)
    }
}
