//! Drivers that run the solvers over one network or a batch of asset shocks.

use log::debug;
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clearing::{clear_system, ClearingResult};
use crate::error::{ClearingError, Result};
use crate::lp::clear_system_lp;
use crate::network::LiabilityNetwork;
use crate::options::{ClearingOptions, LpOptions};
use crate::preprocess::ClearingSystem;

/// Outcome of clearing the same network with both solvers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverComparison {
    /// Result of the fixed-point solver.
    pub fixed_point: ClearingResult,
    /// Result of the LP solver.
    pub linear_program: ClearingResult,
    /// Largest absolute payment difference between the two.
    pub max_payment_gap: f64,
    /// Whether both solvers flag the same nodes.
    pub defaults_agree: bool,
}

impl SolverComparison {
    /// Whether payments agree within `tolerance` and default sets coincide.
    pub fn agrees_within(&self, tolerance: f64) -> bool {
        self.defaults_agree && self.max_payment_gap <= tolerance
    }
}

/// Clears `network` with both solvers, sharing one preprocessing pass.
pub fn compare_solvers(
    network: &LiabilityNetwork,
    clearing: &ClearingOptions,
    lp: &LpOptions,
) -> Result<SolverComparison> {
    let system = ClearingSystem::new(network);
    let fixed_point = clear_system(&system, clearing)?;
    let linear_program = clear_system_lp(&system, lp)?;

    let max_payment_gap = if fixed_point.payments.is_empty() {
        0.0
    } else {
        (&fixed_point.payments - &linear_program.payments).amax()
    };
    let defaults_agree = fixed_point.defaults == linear_program.defaults;
    debug!("solver comparison: max payment gap {max_payment_gap:e}, defaults agree {defaults_agree}");

    Ok(SolverComparison {
        fixed_point,
        linear_program,
        max_payment_gap,
        defaults_agree,
    })
}

/// Clears the liabilities of `network` under each external asset vector in
/// `scenarios`, in parallel. Results keep the order of `scenarios`.
pub fn clear_scenarios(
    network: &LiabilityNetwork,
    scenarios: &[DVector<f64>],
    options: &ClearingOptions,
) -> Result<Vec<ClearingResult>> {
    let n = network.node_count();
    if let Some(bad) = scenarios.iter().find(|assets| assets.len() != n) {
        return Err(ClearingError::dimension_mismatch(
            "scenario assets length",
            n,
            bad.len(),
        ));
    }

    scenarios
        .par_iter()
        .map(|assets| {
            let shocked = network.with_external_assets(assets.clone())?;
            clear_system(&ClearingSystem::new(&shocked), options)
        })
        .collect()
}
