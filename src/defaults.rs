//! Default-set oracle: which nodes cannot meet their obligations at a trial payment.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::preprocess::ClearingSystem;

/// Set of defaulting nodes, stored as one flag per node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSet {
    flags: Vec<bool>,
}

impl DefaultSet {
    /// Wraps per-node default flags.
    pub fn new(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    /// A set in which no node defaults.
    pub fn empty(nodes: usize) -> Self {
        Self::new(vec![false; nodes])
    }

    /// Number of nodes covered by the set.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the set covers zero nodes.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether `node` is in default.
    pub fn is_defaulted(&self, node: usize) -> bool {
        self.flags[node]
    }

    /// Number of defaulting nodes.
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }

    /// Indices of defaulting nodes in ascending order.
    pub fn defaulted_nodes(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(node, flag)| flag.then_some(node))
            .collect()
    }

    /// The `D` vector: 1.0 for defaulting nodes, 0.0 otherwise.
    pub fn indicator(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.flags.len(),
            self.flags.iter().map(|flag| if *flag { 1.0 } else { 0.0 }),
        )
    }

    /// Raw flags.
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}

/// Funds available for debt service: `min(Pi^T p + e, p_bar)` elementwise.
pub fn available_funds(payments: &DVector<f64>, system: &ClearingSystem) -> DVector<f64> {
    let resources = system.inflows(payments) + system.external_assets();
    resources.zip_map(system.total_obligations(), f64::min)
}

/// Flags node `i` when `p_bar[i]` exceeds its available funds by more than `tolerance`.
///
/// A `tolerance` of zero is the exact comparison of the model. Nodes that owe
/// nothing are never flagged, whatever their external assets.
pub fn next_default_set(
    payments: &DVector<f64>,
    system: &ClearingSystem,
    tolerance: f64,
) -> DefaultSet {
    let funds = available_funds(payments, system);
    let flags = system
        .total_obligations()
        .iter()
        .zip(funds.iter())
        .map(|(owed, available)| *owed > 0.0 && owed - available > tolerance)
        .collect();
    DefaultSet::new(flags)
}
