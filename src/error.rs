use thiserror::Error;

/// Unified error type for clearing operations.
#[derive(Debug, Error)]
pub enum ClearingError {
    /// Raised when the liability matrix is not square.
    #[error("liability matrix must be square, found {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Raised when provided vectors or matrices have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, usually the node count.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when a nominal liability is negative.
    #[error("liability owed by node {debtor} to node {creditor} must be non-negative, found {amount}")]
    NegativeLiability {
        debtor: usize,
        creditor: usize,
        amount: f64,
    },

    /// Raised when an input contains NaN or an infinite value.
    #[error("non-finite value in {context} at index {index}")]
    NonFiniteInput { context: &'static str, index: usize },

    /// Raised when a triplet or coordinate entry points outside the network.
    #[error("entry ({row}, {col}) lies outside a network of {nodes} nodes")]
    IndexOutOfBounds { row: usize, col: usize, nodes: usize },

    /// Raised when the inner payment fixed point fails to meet the tolerance.
    #[error(
        "payment fixed point did not converge after {iterations} iterations; last max gap {max_gap}"
    )]
    FixedPointDidNotConverge {
        /// Number of iterations performed before termination.
        iterations: usize,
        /// Maximum absolute change in the last iteration.
        max_gap: f64,
    },

    /// Raised when the default set keeps changing past the outer round cap.
    #[error("default set did not stabilize within {rounds} rounds")]
    DefaultSetDidNotStabilize { rounds: usize },

    /// Raised when the LP solver terminates without an optimal solution.
    #[error("linear program terminated with status {status}")]
    LinearProgram { status: String },

    /// Raised when numerical routines produce NaN.
    #[error("encountered NaN during {context}")]
    NumericalError { context: &'static str },
}

impl ClearingError {
    /// Helper to format a [`DimensionMismatch`](ClearingError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for surfacing a terminal LP solver status.
    pub fn linear_program<S: ToString>(status: S) -> Self {
        Self::LinearProgram {
            status: status.to_string(),
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ClearingError>;
