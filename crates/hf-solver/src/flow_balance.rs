//! Volumetric and RBC flow-balance audits of a solved flow field.
//!
//! The first call establishes the network's numerical noise floor and caches
//! it; subsequent calls enforce local (interior junction) and global
//! (boundary sum) conservation against a tolerance scaled by a reference
//! boundary flow. Violations are fatal.

use hf_network::{FieldState, VascularNetwork};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Relative tolerance on the reference boundary flow.
const TOLERANCE: f64 = 1e-5;

/// Net volumetric flow per junction: outflow through vessels minus inflow.
///
/// With the `from` -> `to` sign convention, a positive entry at a boundary
/// junction is blood the network receives from outside.
pub fn node_flow_balance(network: &VascularNetwork, flow_rate: &[f64]) -> Vec<f64> {
    let mut balance = vec![0.0; network.junctions().len()];
    for (e, vessel) in network.vessels().iter().enumerate() {
        balance[vessel.from.index() as usize] += flow_rate[e];
        balance[vessel.to.index() as usize] -= flow_rate[e];
    }
    balance
}

/// Net RBC flux per interior junction (boundary entries are zero).
///
/// The Berg criterion reads this as the RBC leakage of the haematocrit pass.
pub fn local_rbc_imbalance(
    network: &VascularNetwork,
    flow_rate: &[f64],
    hd: &[f64],
) -> Vec<f64> {
    let mut imbalance = vec![0.0; network.junctions().len()];
    for (e, vessel) in network.vessels().iter().enumerate() {
        let rbc_flux = flow_rate[e] * hd[e];
        imbalance[vessel.from.index() as usize] += rbc_flux;
        imbalance[vessel.to.index() as usize] -= rbc_flux;
    }
    for node in network.boundary_junctions() {
        imbalance[node.index() as usize] = 0.0;
    }
    imbalance
}

/// Reference flow: magnitude in the first boundary junction's first vessel.
fn reference_flow(network: &VascularNetwork, flow_rate: &[f64]) -> f64 {
    network
        .boundary_junctions()
        .next()
        .and_then(|node| network.incident_vessels(node).first().copied())
        .map(|edge| flow_rate[edge.index() as usize].abs())
        .unwrap_or(0.0)
}

/// Audit the solved flow field.
///
/// The first call on a fresh `FieldState` only measures and caches the mean
/// interior imbalance as the network's noise floor. Every later call fails
/// with a fatal error if any interior junction, or the boundary sum, is out
/// of balance beyond `TOLERANCE` times the reference flow.
pub fn check_flow_balance(
    network: &VascularNetwork,
    fields: &mut FieldState,
) -> SolverResult<()> {
    let balance = node_flow_balance(network, &fields.flow_rate);
    let tol_flow = TOLERANCE * reference_flow(network, &fields.flow_rate);

    if fields.balance_tolerance.is_none() {
        let interior: Vec<f64> = network
            .junctions()
            .iter()
            .filter(|j| !network.is_boundary(j.id))
            .map(|j| balance[j.id.index() as usize].abs())
            .collect();
        let noise_floor = if interior.is_empty() {
            0.0
        } else {
            interior.iter().sum::<f64>() / interior.len() as f64
        };
        fields.balance_tolerance = Some(noise_floor);
        debug!(noise_floor, "flow balance noise floor established");
        return Ok(());
    }

    for junction in network.junctions() {
        if network.is_boundary(junction.id) {
            continue;
        }
        let residual = balance[junction.id.index() as usize].abs();
        if residual >= tol_flow {
            return Err(SolverError::FlowImbalance {
                node: junction.id,
                residual,
                tol: tol_flow,
            });
        }
    }

    let global: f64 = network
        .boundary_junctions()
        .map(|node| balance[node.index() as usize])
        .sum();
    if global.abs() >= tol_flow {
        return Err(SolverError::GlobalImbalance {
            residual: global.abs(),
            tol: tol_flow,
        });
    }

    Ok(())
}
