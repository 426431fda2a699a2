//! Generic fixed-point iteration used by the clearing solver.

use log::trace;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{ClearingError, Result};

/// Update rule applied at every step of [`fixed_point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedPointMethod {
    /// Plain iteration `x <- f(x)`.
    Iteration,
    /// Steffensen's method with componentwise Aitken extrapolation.
    ///
    /// Each step evaluates `f` twice and extrapolates
    /// `x - (f(x) - x)^2 / (f(f(x)) - 2 f(x) + x)`; components with a zero
    /// denominator or a non-finite extrapolation take `f(f(x))`.
    Del2,
}

/// Configuration for the fixed-point search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixedPointOptions {
    /// Supremum norm tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of steps allowed before aborting.
    pub max_iterations: usize,
    /// Update rule.
    pub method: FixedPointMethod,
}

impl Default for FixedPointOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 10_000,
            method: FixedPointMethod::Del2,
        }
    }
}

/// Diagnostics returned alongside a fixed point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixedPointSummary {
    /// Number of steps performed.
    pub iterations: usize,
    /// Maximum absolute change observed in the final step.
    pub max_gap: f64,
}

/// Iterates `map` from `initial` until successive iterates differ by less than
/// `options.tolerance` in the supremum norm.
pub fn fixed_point<F>(
    mut map: F,
    initial: DVector<f64>,
    options: &FixedPointOptions,
) -> Result<(DVector<f64>, FixedPointSummary)>
where
    F: FnMut(&DVector<f64>) -> DVector<f64>,
{
    let mut current = initial;
    let mut max_gap = f64::INFINITY;
    let mut iteration = 0usize;

    while iteration < options.max_iterations {
        let next = match options.method {
            FixedPointMethod::Iteration => map(&current),
            FixedPointMethod::Del2 => {
                let once = map(&current);
                let twice = map(&once);
                aitken(&current, &once, &twice)
            }
        };
        if next.iter().any(|value| value.is_nan()) {
            return Err(ClearingError::NumericalError {
                context: "fixed-point iteration",
            });
        }

        max_gap = (&next - &current).amax();
        current = next;
        iteration += 1;
        trace!("fixed point step {iteration}: max gap {max_gap:e}");

        if max_gap < options.tolerance {
            return Ok((
                current,
                FixedPointSummary {
                    iterations: iteration,
                    max_gap,
                },
            ));
        }
    }

    Err(ClearingError::FixedPointDidNotConverge {
        iterations: iteration,
        max_gap,
    })
}

fn aitken(x0: &DVector<f64>, x1: &DVector<f64>, x2: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        x0.len(),
        (0..x0.len()).map(|i| {
            let denominator = x2[i] - 2.0 * x1[i] + x0[i];
            if denominator == 0.0 {
                x2[i]
            } else {
                let step = x1[i] - x0[i];
                let extrapolated = x0[i] - step * step / denominator;
                if extrapolated.is_finite() {
                    extrapolated
                } else {
                    x2[i]
                }
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn affine(x: &DVector<f64>) -> DVector<f64> {
        x.map(|v| 0.5 * v + 1.0)
    }

    #[test]
    fn plain_iteration_finds_affine_fixed_point() {
        let options = FixedPointOptions {
            method: FixedPointMethod::Iteration,
            ..FixedPointOptions::default()
        };
        let (x, summary) = fixed_point(affine, DVector::zeros(2), &options).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert!(summary.iterations > 10);
        assert!(summary.max_gap < options.tolerance);
    }

    #[test]
    fn del2_accelerates_linear_maps() {
        let options = FixedPointOptions::default();
        assert_eq!(options.method, FixedPointMethod::Del2);
        let (x, summary) = fixed_point(affine, DVector::zeros(2), &options).unwrap();
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert!(summary.iterations <= 2);
    }

    #[test]
    fn reports_non_convergence() {
        let options = FixedPointOptions {
            max_iterations: 5,
            method: FixedPointMethod::Iteration,
            ..FixedPointOptions::default()
        };
        let result = fixed_point(|x| x.map(|v| v + 1.0), DVector::zeros(1), &options);
        match result {
            Err(ClearingError::FixedPointDidNotConverge {
                iterations,
                max_gap,
            }) => {
                assert_eq!(iterations, 5);
                assert_relative_eq!(max_gap, 1.0);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }
}
