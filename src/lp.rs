//! Linear-programming clearing solver.
//!
//! The clearing vector is the greatest payment vector that respects every balance
//! sheet and obligation cap, so it solves
//!
//! ```text
//! maximize    sum(p)
//! subject to  (I - Pi^T) p <= e
//!             0 <= p <= p_bar
//! ```
//!
//! The program is handed to Clarabel in sparse CSC form as `min -1'p` with all
//! constraints stacked into a single non-negative cone.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use log::{debug, warn};
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::clearing::{ClearingResult, SolveSummary};
use crate::defaults::next_default_set;
use crate::error::{ClearingError, Result};
use crate::network::LiabilityNetwork;
use crate::options::LpOptions;
use crate::preprocess::ClearingSystem;

/// Solves the clearing LP with default options.
pub fn clearing_p_lp(network: &LiabilityNetwork) -> Result<ClearingResult> {
    clearing_p_lp_with_options(network, &LpOptions::default())
}

/// Solves the clearing LP and derives the default set from its optimal payments.
pub fn clearing_p_lp_with_options(
    network: &LiabilityNetwork,
    options: &LpOptions,
) -> Result<ClearingResult> {
    let system = ClearingSystem::new(network);
    clear_system_lp(&system, options)
}

pub(crate) fn clear_system_lp(
    system: &ClearingSystem,
    options: &LpOptions,
) -> Result<ClearingResult> {
    let n = system.node_count();
    let p_bar = system.total_obligations();
    let e = system.external_assets();

    // Nodes owing nothing are pinned at zero and get no column.
    let indebted: Vec<usize> = (0..n).filter(|&node| p_bar[node] > 0.0).collect();
    let k = indebted.len();

    let (solution, status, iterations) = if k == 0 {
        if let Some(node) = (0..n).find(|&node| e[node] < 0.0) {
            debug!("node {node} has negative assets and no inflow; LP is infeasible");
            return Err(ClearingError::linear_program("PrimalInfeasible"));
        }
        (Vec::new(), "Solved".to_string(), 0)
    } else {
        solve_program(system, &indebted, options)?
    };

    let mut payments = DVector::zeros(n);
    for (column, &node) in indebted.iter().enumerate() {
        payments[node] = solution[column].clamp(0.0, p_bar[node]);
    }
    if payments.iter().any(|value| value.is_nan()) {
        return Err(ClearingError::NumericalError {
            context: "LP solution",
        });
    }

    let defaults = next_default_set(&payments, system, options.default_tolerance);
    let total_payments = payments.sum();
    debug!(
        "clearing LP finished with status {status} after {iterations} iterations: {} defaults",
        defaults.count()
    );

    Ok(ClearingResult {
        payments,
        defaults,
        total_obligations: p_bar.clone(),
        diagnostics: SolveSummary::LinearProgram {
            status,
            iterations,
            total_payments,
        },
    })
}

fn solve_program(
    system: &ClearingSystem,
    indebted: &[usize],
    options: &LpOptions,
) -> Result<(Vec<f64>, String, u32)> {
    let n = system.node_count();
    let k = indebted.len();
    let rows = n + 2 * k;

    let a = constraint_matrix(system, indebted);
    let p = CscMatrix::<f64>::zeros((k, k));
    let q = vec![-1.0; k];

    let mut b = Vec::with_capacity(rows);
    b.extend(system.external_assets().iter().copied());
    b.extend(std::iter::repeat(0.0).take(k));
    b.extend(indebted.iter().map(|&node| system.total_obligations()[node]));

    let cones = [SupportedConeT::NonnegativeConeT(rows)];

    let mut settings = DefaultSettings::<f64>::default();
    settings.verbose = options.verbose;
    settings.max_iter = options.max_iterations;
    settings.tol_gap_abs = options.tolerance;
    settings.tol_gap_rel = options.tolerance;
    settings.tol_feas = options.tolerance;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
    solver.solve();

    let status = format!("{:?}", solver.solution.status);
    match &solver.solution.status {
        SolverStatus::Solved => {}
        SolverStatus::AlmostSolved => {
            warn!("clearing LP reached reduced accuracy only");
        }
        _ => return Err(ClearingError::linear_program(status)),
    }

    Ok((
        solver.solution.x.clone(),
        status,
        solver.solution.iterations,
    ))
}

/// Stacks `(I - Pi^T)`, `-I` and `I` restricted to the indebted columns.
fn constraint_matrix(system: &ClearingSystem, indebted: &[usize]) -> CscMatrix<f64> {
    let n = system.node_count();
    let k = indebted.len();

    let mut selection = CooMatrix::new(n, k);
    for (column, &node) in indebted.iter().enumerate() {
        selection.push(node, column, 1.0);
    }
    let balance = &CsrMatrix::identity(n) - system.proportional_transpose();
    let balance = &balance * &CsrMatrix::from(&selection);

    let mut stacked = CooMatrix::new(n + 2 * k, k);
    for (row, column, value) in balance.triplet_iter() {
        if *value != 0.0 {
            stacked.push(row, column, *value);
        }
    }
    for column in 0..k {
        stacked.push(n + column, column, -1.0);
        stacked.push(n + k + column, column, 1.0);
    }

    let (colptr, rowval, nzval) = nalgebra_sparse::CscMatrix::from(&stacked).disassemble();
    CscMatrix::new(n + 2 * k, k, colptr, rowval, nzval)
}
