//! Outer convergence loop and the composite (Berg) residual.
//!
//! The residual combines the RBC leakage at interior junctions, normalized
//! by the RBC supply entering the network, with the relative change of the
//! pressure, flow and haematocrit fields between consecutive iterations.

use hf_core::relative_change;
use hf_haematocrit::{PhaseSeparation, SplitDiagnostics, update_hd};
use hf_network::{FieldState, VascularNetwork};
use tracing::{debug, info};

use crate::error::SolverResult;
use crate::flow_balance::{check_flow_balance, local_rbc_imbalance, node_flow_balance};
use crate::pressure_flow::update_pressure_flow;
use crate::transmissibility::update_transmissibility;
use crate::velocity::update_velocity;

/// Convergence tuning.
///
/// The thresholds are empirically tuned per network family; they are
/// configuration, not constants.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceConfig {
    /// Composite residual below which the loop may stop.
    pub berg_threshold: f64,
    /// Minimum iteration count before convergence may be declared.
    pub warmup_iterations: usize,
    /// Hard iteration cap; reaching it is a soft failure.
    pub max_iterations: usize,
    /// Snapshot hook cadence.
    pub snapshot_every: usize,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            berg_threshold: 1e-8,
            warmup_iterations: 10,
            max_iterations: 4000,
            snapshot_every: 25,
        }
    }
}

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Residual dropped below threshold after warm-up.
    Converged,
    /// Iteration cap reached; results are emitted but not converged.
    Capped,
}

/// Residual history and terminal state of a solve.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: Outcome,
    pub iterations: usize,
    /// Composite residual per iteration, starting at iteration 2.
    pub berg_residuals: Vec<f64>,
    pub pressure_changes: Vec<f64>,
    pub flow_changes: Vec<f64>,
    pub hd_changes: Vec<f64>,
}

/// Periodic view of the solve handed to the snapshot hook.
pub struct SnapshotEvent<'a> {
    pub iteration: usize,
    pub berg_residuals: &'a [f64],
    pub fields: &'a FieldState,
}

/// Run the convergence loop to a terminal state.
pub fn run(
    network: &VascularNetwork,
    fields: &mut FieldState,
    config: &ConvergenceConfig,
) -> SolverResult<SolveReport> {
    run_with_snapshots(network, fields, config, |_| {})
}

/// Run the convergence loop, invoking `on_snapshot` every
/// `snapshot_every` iterations. The hook must not block.
pub fn run_with_snapshots(
    network: &VascularNetwork,
    fields: &mut FieldState,
    config: &ConvergenceConfig,
    mut on_snapshot: impl FnMut(SnapshotEvent<'_>),
) -> SolverResult<SolveReport> {
    let law = PhaseSeparation::default();
    let mut diagnostics = SplitDiagnostics::default();
    let mut transmissibility = vec![0.0; network.vessels().len()];

    let mut report = SolveReport {
        outcome: Outcome::Capped,
        iterations: 0,
        berg_residuals: Vec::new(),
        pressure_changes: Vec::new(),
        flow_changes: Vec::new(),
        hd_changes: Vec::new(),
    };

    // Previous iteration's (pressure, flow, hd) fields
    let mut previous: Option<(Vec<f64>, Vec<f64>, Vec<f64>)> = None;

    for iteration in 1..=config.max_iterations {
        update_transmissibility(network, &fields.hd, &mut transmissibility);
        update_pressure_flow(network, &transmissibility, fields)?;
        update_velocity(network, fields);
        update_hd(network, fields, &law, &mut diagnostics)?;
        check_flow_balance(network, fields)?;

        report.iterations = iteration;

        let pressure = fields.pressure.clone().unwrap_or_default();
        let flow = fields.flow_rate.clone();
        let hd = fields.hd.clone();

        // No residual on the first iteration: nothing to compare against
        if let Some((prev_pressure, prev_flow, prev_hd)) = previous.as_ref() {
            let pressure_change = relative_change(&pressure, prev_pressure);
            let flow_change = relative_change(&flow, prev_flow);
            let hd_change = relative_change(&hd, prev_hd);

            let leakage: f64 = local_rbc_imbalance(network, &flow, &hd)
                .iter()
                .map(|x| x.abs())
                .sum();
            let supply = rbc_supply(network, &flow);
            let leakage_term = if leakage == 0.0 { 0.0 } else { leakage / supply };

            let residual = leakage_term + pressure_change + flow_change + hd_change;
            report.berg_residuals.push(residual);
            report.pressure_changes.push(pressure_change);
            report.flow_changes.push(flow_change);
            report.hd_changes.push(hd_change);
            debug!(iteration, residual, "berg residual");

            if iteration % config.snapshot_every == 0 {
                on_snapshot(SnapshotEvent {
                    iteration,
                    berg_residuals: &report.berg_residuals,
                    fields,
                });
            }

            if iteration > 2
                && residual <= config.berg_threshold
                && iteration > config.warmup_iterations
            {
                info!(iteration, residual, "converged");
                report.outcome = Outcome::Converged;
                return Ok(report);
            }
        }

        previous = Some((pressure, flow, hd));
    }

    info!(
        iterations = report.iterations,
        "iteration cap reached without convergence"
    );
    report.outcome = Outcome::Capped;
    Ok(report)
}

/// RBC flux entering the network: boundary haematocrit times net inflow,
/// summed over boundary junctions currently feeding the network.
fn rbc_supply(network: &VascularNetwork, flow_rate: &[f64]) -> f64 {
    let balance = node_flow_balance(network, flow_rate);
    network
        .boundary_junctions()
        .filter_map(|node| {
            network
                .boundary(node)
                .map(|b| b.haematocrit * balance[node.index() as usize].max(0.0))
        })
        .sum()
}
