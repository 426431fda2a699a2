//! Fixed-point clearing solver.
//!
//! Starting from full payment, the solver alternates between two steps until the
//! default set stops changing:
//!
//! 1. freeze the current default set `D` and solve the payment fixed point
//!    `p = F_D(p)`, in which solvent nodes pay `p_bar` and defaulting nodes pay
//!    what they receive plus their external assets;
//! 2. re-evaluate the default set at the new payments.
//!
//! Defaults only accumulate as payments fall, so the loop terminates after at most
//! `n + 1` rounds on well-formed inputs. A cap guards against cycling anyway.

use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::defaults::{next_default_set, DefaultSet};
use crate::error::{ClearingError, Result};
use crate::network::LiabilityNetwork;
use crate::options::ClearingOptions;
use crate::preprocess::ClearingSystem;
use crate::solving::{fixed_point, FixedPointSummary};

/// Clearing payments and defaults produced by either solver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClearingResult {
    /// Clearing payment vector `p`, with `0 <= p[i] <= p_bar[i]`.
    pub payments: DVector<f64>,
    /// Nodes unable to pay their total obligation in full.
    pub defaults: DefaultSet,
    /// Total obligations `p_bar` the payments are measured against.
    pub total_obligations: DVector<f64>,
    /// How the result was obtained.
    pub diagnostics: SolveSummary,
}

impl ClearingResult {
    /// Unpaid part of each node's obligation, `p_bar - p`.
    pub fn shortfall(&self) -> DVector<f64> {
        &self.total_obligations - &self.payments
    }

    /// Fraction of its obligation each node pays; nodes owing nothing report 1.
    pub fn recovery_rates(&self) -> DVector<f64> {
        self.payments
            .zip_map(&self.total_obligations, |paid, owed| {
                if owed > 0.0 {
                    paid / owed
                } else {
                    1.0
                }
            })
    }
}

/// Solver-specific diagnostics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SolveSummary {
    /// Produced by [`clearing_p`].
    FixedPoint {
        /// Number of default-set rounds.
        rounds: usize,
        /// Fixed-point steps summed over all rounds.
        iterations: usize,
        /// Largest change in the final fixed-point step.
        max_gap: f64,
    },
    /// Produced by [`clearing_p_lp`](crate::lp::clearing_p_lp).
    LinearProgram {
        /// Solver termination status.
        status: String,
        /// Interior-point iterations.
        iterations: u32,
        /// Total payments at the optimum.
        total_payments: f64,
    },
}

/// Computes the clearing payment vector and default set with default options.
pub fn clearing_p(network: &LiabilityNetwork) -> Result<ClearingResult> {
    clearing_p_with_options(network, &ClearingOptions::default())
}

/// Computes the clearing payment vector and default set.
pub fn clearing_p_with_options(
    network: &LiabilityNetwork,
    options: &ClearingOptions,
) -> Result<ClearingResult> {
    let system = ClearingSystem::new(network);
    clear_system(&system, options)
}

pub(crate) fn clear_system(
    system: &ClearingSystem,
    options: &ClearingOptions,
) -> Result<ClearingResult> {
    let n = system.node_count();
    let p_bar = system.total_obligations();
    let cap = options.round_cap(n);

    if n == 0 {
        return Ok(ClearingResult {
            payments: DVector::zeros(0),
            defaults: DefaultSet::empty(0),
            total_obligations: DVector::zeros(0),
            diagnostics: SolveSummary::FixedPoint {
                rounds: 0,
                iterations: 0,
                max_gap: 0.0,
            },
        });
    }

    let mut payments = p_bar.clone();
    let mut defaults = next_default_set(&payments, system, options.default_tolerance);
    let mut rounds = 0usize;
    let mut iterations = 0usize;

    loop {
        if rounds == cap {
            return Err(ClearingError::DefaultSetDidNotStabilize { rounds });
        }
        rounds += 1;

        let (next, summary) = next_payments(&payments, &defaults, system, options)?;
        iterations += summary.iterations;
        let next_defaults = next_default_set(&next, system, options.default_tolerance);
        debug!(
            "clearing round {rounds}: {} defaults, fixed point took {} steps",
            next_defaults.count(),
            summary.iterations
        );

        payments = next;
        if next_defaults == defaults {
            return Ok(ClearingResult {
                payments,
                defaults,
                total_obligations: p_bar.clone(),
                diagnostics: SolveSummary::FixedPoint {
                    rounds,
                    iterations,
                    max_gap: summary.max_gap,
                },
            });
        }
        defaults = next_defaults;
    }
}

/// Solves `p = F_D(p)` for a frozen default set, starting from `start`.
fn next_payments(
    start: &DVector<f64>,
    defaults: &DefaultSet,
    system: &ClearingSystem,
    options: &ClearingOptions,
) -> Result<(DVector<f64>, FixedPointSummary)> {
    let map = |p: &DVector<f64>| payment_map(p, defaults, system);
    let (fixed, summary) = fixed_point(map, start.clone(), &options.fixed_point)?;
    // One more application pins solvent nodes to p_bar and clips extrapolation.
    Ok((map(&fixed), summary))
}

/// `F_D(p) = Lambda [Pi^T (Lambda p + (I - Lambda) p_bar) + e] + (I - Lambda) p_bar`
/// with `Lambda = diag(D)`, keeping defaulting payments inside `[0, p_bar]`.
fn payment_map(
    payments: &DVector<f64>,
    defaults: &DefaultSet,
    system: &ClearingSystem,
) -> DVector<f64> {
    let p_bar = system.total_obligations();
    let flags = defaults.as_slice();
    let paid = DVector::from_iterator(
        p_bar.len(),
        (0..p_bar.len()).map(|i| if flags[i] { payments[i] } else { p_bar[i] }),
    );
    let received = system.inflows(&paid) + system.external_assets();
    DVector::from_iterator(
        p_bar.len(),
        (0..p_bar.len()).map(|i| {
            if flags[i] {
                received[i].clamp(0.0, p_bar[i])
            } else {
                p_bar[i]
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::available_funds;
    use crate::solving::FixedPointMethod;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn network(rows: usize, values: &[f64], assets: &[f64]) -> LiabilityNetwork {
        let dense = DMatrix::from_row_slice(rows, rows, values);
        LiabilityNetwork::from_dense(&dense, DVector::from_vec(assets.to_vec())).unwrap()
    }

    #[test]
    fn two_node_example_defaults_the_short_node() {
        let result = clearing_p(&network(2, &[0.0, 1.0, 2.0, 0.0], &[1.0, 0.0])).unwrap();
        assert_relative_eq!(result.payments[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.payments[1], 1.0, epsilon = 1e-9);
        assert_eq!(result.defaults.as_slice(), &[false, true]);
        assert_relative_eq!(result.shortfall()[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.recovery_rates()[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn plain_iteration_agrees_with_del2() {
        let net = network(
            3,
            &[0.0, 4.0, 2.0, 1.0, 0.0, 3.0, 2.0, 2.0, 0.0],
            &[0.5, 0.2, 1.0],
        );
        let accelerated = clearing_p(&net).unwrap();
        let plain = clearing_p_with_options(
            &net,
            &ClearingOptions::default().with_method(FixedPointMethod::Iteration),
        )
        .unwrap();
        assert_relative_eq!(accelerated.payments, plain.payments, epsilon = 1e-8);
        assert_eq!(accelerated.defaults, plain.defaults);
    }

    #[test]
    fn defaulting_nodes_pay_their_available_funds() {
        let net = network(
            3,
            &[0.0, 5.0, 1.0, 2.0, 0.0, 2.0, 1.0, 1.0, 0.0],
            &[1.0, 0.5, 3.0],
        );
        let result = clearing_p(&net).unwrap();
        let system = ClearingSystem::new(&net);
        let funds = available_funds(&result.payments, &system);
        for i in 0..3 {
            if result.defaults.is_defaulted(i) {
                assert_relative_eq!(result.payments[i], funds[i], epsilon = 1e-8);
            } else {
                assert_eq!(result.payments[i], system.total_obligations()[i]);
            }
        }
        assert!(result.defaults.count() > 0);
    }

    #[test]
    fn isolated_nodes_never_default() {
        let net = network(3, &[0.0; 9], &[-1.0, 0.0, 4.0]);
        let result = clearing_p(&net).unwrap();
        assert_eq!(result.payments, DVector::zeros(3));
        assert_eq!(result.defaults, DefaultSet::empty(3));
    }

    #[test]
    fn round_cap_surfaces_as_error() {
        // node 0 defaults first, which then drags node 1 down in the second round
        let net = network(
            3,
            &[0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
            &[1.0, 0.5, 0.0],
        );
        let cascade = clearing_p(&net).unwrap();
        assert_eq!(cascade.defaults.defaulted_nodes(), vec![0, 1]);
        assert!(matches!(cascade.diagnostics, SolveSummary::FixedPoint { rounds: 2, .. }));

        let options = ClearingOptions::default().with_max_default_rounds(1);
        let result = clearing_p_with_options(&net, &options);
        assert!(matches!(
            result,
            Err(ClearingError::DefaultSetDidNotStabilize { rounds: 1 })
        ));
    }

    #[test]
    fn inner_non_convergence_is_not_swallowed() {
        // node 0 and 1 default into each other with a slow geometric decay
        let net = network(
            3,
            &[0.0, 9.0, 1.0, 9.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
        );
        let mut options = ClearingOptions::default().with_method(FixedPointMethod::Iteration);
        options.fixed_point.max_iterations = 3;
        let result = clearing_p_with_options(&net, &options);
        assert!(matches!(
            result,
            Err(ClearingError::FixedPointDidNotConverge { iterations: 3, .. })
        ));
    }

    #[test]
    fn tightly_coupled_defaulters_converge_to_zero() {
        // nodes 0 and 1 owe each other almost everything, so plain iteration
        // shrinks the gap by only 0.1% per step
        let net = network(
            3,
            &[0.0, 999.0, 1.0, 999.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
        );
        let result = clearing_p(&net).unwrap();
        assert!(result.payments[0].abs() < 1e-9);
        assert!(result.payments[1].abs() < 1e-9);
        assert_eq!(result.payments[2], 0.0);
        assert_eq!(result.defaults.defaulted_nodes(), vec![0, 1]);

        let plain = ClearingOptions::default().with_method(FixedPointMethod::Iteration);
        assert!(matches!(
            clearing_p_with_options(&net, &plain),
            Err(ClearingError::FixedPointDidNotConverge { .. })
        ));
    }

    #[test]
    fn empty_network_clears_trivially() {
        let net = LiabilityNetwork::from_triplets(0, &[], DVector::zeros(0)).unwrap();
        let result = clearing_p(&net).unwrap();
        assert!(result.payments.is_empty());
        assert!(result.defaults.is_empty());
    }
}
