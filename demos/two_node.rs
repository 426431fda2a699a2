//! Clears the two-node reference network with both solvers and prints the results.

use clearing::scenarios::compare_solvers;
use clearing::{ClearingOptions, LiabilityNetwork, LpOptions};
use nalgebra::{DMatrix, DVector};

fn main() -> clearing::Result<()> {
    // Node 0 owes node 1 one unit, node 1 owes node 0 two units.
    let liabilities = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0]);
    let assets = DVector::from_vec(vec![1.0, 0.0]);
    let network = LiabilityNetwork::from_dense(&liabilities, assets)?;

    let comparison = compare_solvers(&network, &ClearingOptions::default(), &LpOptions::default())?;

    let fixed_point = &comparison.fixed_point;
    println!("total obligations: {:?}", fixed_point.total_obligations.as_slice());
    println!("fixed-point payments: {:?}", fixed_point.payments.as_slice());
    println!("fixed-point defaults: {:?}", fixed_point.defaults.defaulted_nodes());
    println!("recovery rates: {:?}", fixed_point.recovery_rates().as_slice());
    println!("LP payments: {:?}", comparison.linear_program.payments.as_slice());
    println!("LP defaults: {:?}", comparison.linear_program.defaults.defaulted_nodes());
    println!(
        "max payment gap {:.3e}, defaults agree: {}",
        comparison.max_payment_gap, comparison.defaults_agree
    );
    Ok(())
}
