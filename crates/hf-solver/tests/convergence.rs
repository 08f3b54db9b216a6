//! End-to-end convergence tests on small networks.

use hf_core::units::{m, m3ps, pa, um};
use hf_network::{Boundary, BoundaryKind, FieldState, NetworkBuilder, VascularNetwork};
use hf_solver::{ConvergenceConfig, Outcome, SolverError, run, run_with_snapshots};

fn pressure_boundary(p_pa: f64, haematocrit: f64) -> Boundary {
    Boundary::new(BoundaryKind::Pressure(pa(p_pa)), haematocrit)
}

fn test_config() -> ConvergenceConfig {
    ConvergenceConfig {
        berg_threshold: 1e-10,
        warmup_iterations: 3,
        max_iterations: 500,
        snapshot_every: 25,
    }
}

fn two_node_network() -> VascularNetwork {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_junction("inlet");
    let n1 = builder.add_junction("outlet");
    builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
    builder.set_boundary(n0, pressure_boundary(5000.0, 0.45));
    builder.set_boundary(n1, pressure_boundary(0.0, 0.45));
    builder.build().unwrap()
}

#[test]
fn two_node_passthrough_converges() {
    let _ = tracing_subscriber::fmt::try_init();
    let network = two_node_network();
    let mut fields = FieldState::uniform(&network, 0.45).unwrap();

    let report = run(&network, &mut fields, &test_config()).unwrap();

    assert_eq!(report.outcome, Outcome::Converged);
    assert!(report.iterations <= 10, "took {} iterations", report.iterations);
    // Pass-through: the single vessel carries the inlet boundary haematocrit
    assert!((fields.hd[0] - 0.45).abs() < 1e-12);
    assert!(fields.flow_rate[0] > 0.0);

    let pressure = fields.pressure.as_ref().unwrap();
    assert!((pressure[0] - 5000.0).abs() < 1e-6);
    assert!((pressure[1] - 0.0).abs() < 1e-6);
}

#[test]
fn y_network_converges_and_conserves_rbc_flux() {
    let _ = tracing_subscriber::fmt::try_init();
    // inlet -> branch -> two outlets with unequal daughters
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_junction("inlet");
    let n1 = builder.add_junction("branch");
    let n2 = builder.add_junction("outlet_a");
    let n3 = builder.add_junction("outlet_b");
    builder.add_vessel("feed", n0, n1, um(20.0), m(1e-3)).unwrap();
    builder.add_vessel("wide", n1, n2, um(12.0), m(1e-3)).unwrap();
    builder.add_vessel("narrow", n1, n3, um(8.0), m(1e-3)).unwrap();
    builder.set_boundary(n0, pressure_boundary(5000.0, 0.45));
    builder.set_boundary(n2, pressure_boundary(0.0, 0.45));
    builder.set_boundary(n3, pressure_boundary(0.0, 0.45));
    let network = builder.build().unwrap();

    let mut fields = FieldState::uniform(&network, 0.45).unwrap();
    let config = ConvergenceConfig {
        berg_threshold: 1e-8,
        ..test_config()
    };

    let report = run(&network, &mut fields, &config).unwrap();
    assert_eq!(report.outcome, Outcome::Converged);

    // All vessels flow away from the inlet
    assert!(fields.flow_rate.iter().all(|q| *q > 0.0));

    // Phase separation kept every haematocrit physical
    assert!(fields.hd.iter().all(|h| *h >= 0.0 && *h < 1.0));

    // RBC flux balances across the branch junction
    let rbc_in = fields.flow_rate[0] * fields.hd[0];
    let rbc_out = fields.flow_rate[1] * fields.hd[1] + fields.flow_rate[2] * fields.hd[2];
    assert!((rbc_in - rbc_out).abs() <= 1e-5 * rbc_in.abs().max(1e-30));

    // The wider, faster daughter runs at least as rich as the narrow one
    assert!(fields.flow_rate[1] > fields.flow_rate[2]);
}

#[test]
fn inflow_boundary_prescribes_flow() {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_junction("inlet");
    let n1 = builder.add_junction("outlet");
    builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
    builder.set_boundary(n0, Boundary::new(BoundaryKind::Inflow(m3ps(1e-12)), 0.5));
    builder.set_boundary(n1, pressure_boundary(0.0, 0.5));
    let network = builder.build().unwrap();

    let mut fields = FieldState::uniform(&network, 0.45).unwrap();
    let report = run(&network, &mut fields, &test_config()).unwrap();

    assert_eq!(report.outcome, Outcome::Converged);
    assert!((fields.flow_rate[0] - 1e-12).abs() < 1e-24);
    assert!((fields.hd[0] - 0.5).abs() < 1e-12);
}

#[test]
fn iteration_cap_is_a_soft_failure() {
    let network = two_node_network();
    let mut fields = FieldState::uniform(&network, 0.45).unwrap();

    let config = ConvergenceConfig {
        // Unreachable threshold forces the cap
        berg_threshold: -1.0,
        warmup_iterations: 1,
        max_iterations: 5,
        snapshot_every: 25,
    };

    let report = run(&network, &mut fields, &config).unwrap();
    assert_eq!(report.outcome, Outcome::Capped);
    assert_eq!(report.iterations, 5);
    // Results are still emitted
    assert!(fields.pressure.is_some());
    assert!((fields.hd[0] - 0.45).abs() < 1e-12);
}

#[test]
fn snapshot_hook_fires_on_cadence() {
    let network = two_node_network();
    let mut fields = FieldState::uniform(&network, 0.45).unwrap();

    let config = ConvergenceConfig {
        berg_threshold: -1.0,
        warmup_iterations: 1,
        max_iterations: 9,
        snapshot_every: 2,
    };

    let mut seen = Vec::new();
    let report = run_with_snapshots(&network, &mut fields, &config, |event| {
        seen.push((event.iteration, event.berg_residuals.len()));
    })
    .unwrap();

    assert_eq!(report.outcome, Outcome::Capped);
    // The residual only exists from iteration 2 onward
    assert_eq!(seen.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![2, 4, 6, 8]);
    assert!(seen.iter().all(|(i, n)| *n == i - 1));
}

#[test]
fn all_inflow_network_is_singular() {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_junction("inlet");
    let n1 = builder.add_junction("outlet");
    builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
    // No pressure anchor anywhere: the nodal system has no unique solution
    builder.set_boundary(n0, Boundary::new(BoundaryKind::Inflow(m3ps(1e-12)), 0.45));
    builder.set_boundary(n1, Boundary::new(BoundaryKind::Inflow(m3ps(-1e-12)), 0.45));
    let network = builder.build().unwrap();

    let mut fields = FieldState::uniform(&network, 0.45).unwrap();
    let err = run(&network, &mut fields, &test_config()).unwrap_err();
    assert!(matches!(err, SolverError::SingularSystem));
}
