//! Solver configuration for the fixed-point and LP clearing paths.

use serde::{Deserialize, Serialize};

use crate::solving::{FixedPointMethod, FixedPointOptions};

/// Controls the outer default-set loop and the inner payment fixed point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClearingOptions {
    /// Configuration for the payment fixed point under a frozen default set.
    pub fixed_point: FixedPointOptions,
    /// Shortfall below which a node is not flagged as defaulting.
    pub default_tolerance: f64,
    /// Cap on default-set rounds; `None` uses the node count plus two.
    pub max_default_rounds: Option<usize>,
}

impl Default for ClearingOptions {
    fn default() -> Self {
        Self {
            fixed_point: FixedPointOptions::default(),
            default_tolerance: 1e-9,
            max_default_rounds: None,
        }
    }
}

impl ClearingOptions {
    /// Override the fixed-point settings while preserving other defaults.
    pub fn with_fixed_point(mut self, fixed_point: FixedPointOptions) -> Self {
        self.fixed_point = fixed_point;
        self
    }

    /// Select the fixed-point update rule.
    pub fn with_method(mut self, method: FixedPointMethod) -> Self {
        self.fixed_point.method = method;
        self
    }

    /// Set the shortfall tolerance of the default test; zero compares exactly.
    pub fn with_default_tolerance(mut self, tolerance: f64) -> Self {
        self.default_tolerance = tolerance.max(0.0);
        self
    }

    /// Cap the number of default-set rounds.
    pub fn with_max_default_rounds(mut self, rounds: usize) -> Self {
        self.max_default_rounds = Some(rounds.max(1));
        self
    }

    pub(crate) fn round_cap(&self, nodes: usize) -> usize {
        self.max_default_rounds.unwrap_or(nodes + 2)
    }
}

/// Settings forwarded to the interior-point LP solver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LpOptions {
    /// Absolute duality gap tolerance.
    pub tolerance: f64,
    /// Maximum number of interior-point iterations.
    pub max_iterations: u32,
    /// Shortfall below which a node is not flagged as defaulting.
    pub default_tolerance: f64,
    /// Print the solver's progress table.
    pub verbose: bool,
}

impl Default for LpOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 200,
            default_tolerance: 1e-7,
            verbose: false,
        }
    }
}

impl LpOptions {
    /// Set the duality gap tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the interior-point iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Set the shortfall tolerance used when deriving defaults from LP payments.
    pub fn with_default_tolerance(mut self, tolerance: f64) -> Self {
        self.default_tolerance = tolerance.max(0.0);
        self
    }

    /// Enable or disable solver output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
