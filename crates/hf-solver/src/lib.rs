//! hf-solver: pressure/flow solve and convergence loop for haemoflow.
//!
//! One iteration runs: transmissibility update -> linear pressure solve ->
//! signed edge flows -> RBC velocity -> haematocrit resolution -> flow
//! balance audit -> composite (Berg) residual. The loop repeats until the
//! residual drops below threshold or the iteration cap is hit.

pub mod error;
pub mod flow_balance;
pub mod iterative;
pub mod linear_system;
pub mod pressure_flow;
pub mod transmissibility;
pub mod velocity;
pub mod viscosity;

pub use error::{SolverError, SolverResult};
pub use flow_balance::{check_flow_balance, local_rbc_imbalance, node_flow_balance};
pub use iterative::{ConvergenceConfig, Outcome, SnapshotEvent, SolveReport, run, run_with_snapshots};
pub use linear_system::assemble_pressure_system;
pub use pressure_flow::update_pressure_flow;
pub use transmissibility::update_transmissibility;
pub use velocity::update_velocity;
pub use viscosity::relative_apparent_viscosity;
