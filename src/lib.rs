//! Sparse Eisenberg–Noe clearing for networks of interbank obligations.
//!
//! Given a matrix of nominal liabilities `L` (`L[i][j]` is what node `i` owes node
//! `j`) and a vector of external assets `e`, the crate computes the clearing
//! payment vector `p` and the set of defaulting nodes. It offers tools to
//!
//! - validate and normalize network inputs (`network` module),
//! - derive total obligations and the relative liabilities matrix (`preprocess`),
//! - evaluate the default-set oracle (`defaults`),
//! - clear the network by fixed-point iteration (`clearing`) or by linear
//!   programming (`lp`), and
//! - compare the two solvers or run batches of asset shocks (`scenarios`).
//!
//! Both solvers are pure functions of their inputs, so they can be called from
//! many threads at once.
//!
//! # Quick start
//!
//! ```no_run
//! use clearing::{clearing_p, clearing_p_lp, LiabilityNetwork};
//! use nalgebra::{DMatrix, DVector};
//!
//! // Node 0 owes node 1 one unit; node 1 owes node 0 two units.
//! let liabilities = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0]);
//! let assets = DVector::from_vec(vec![1.0, 0.0]);
//! let network = LiabilityNetwork::from_dense(&liabilities, assets).expect("valid network");
//!
//! let fixed_point = clearing_p(&network).expect("converged");
//! let lp = clearing_p_lp(&network).expect("solved");
//! println!("payments {:?}, defaults {:?}", fixed_point.payments, fixed_point.defaults);
//! println!("LP payments {:?}", lp.payments);
//! ```

pub mod clearing;
pub mod defaults;
pub mod error;
pub mod generate;
pub mod lp;
pub mod network;
pub mod options;
pub mod preprocess;
pub mod scenarios;
pub mod solving;
pub mod sparse;

pub use clearing::{clearing_p, clearing_p_with_options, ClearingResult, SolveSummary};
pub use defaults::DefaultSet;
pub use error::{ClearingError, Result};
pub use lp::{clearing_p_lp, clearing_p_lp_with_options};
pub use network::LiabilityNetwork;
pub use options::{ClearingOptions, LpOptions};
pub use solving::{FixedPointMethod, FixedPointOptions, FixedPointSummary};
