//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub network_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub converged: bool,
    pub iterations: usize,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn stamped(
        run_id: RunId,
        network_name: impl Into<String>,
        solver_version: impl Into<String>,
        converged: bool,
        iterations: usize,
    ) -> Self {
        Self {
            run_id,
            network_name: network_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            converged,
            iterations,
        }
    }
}


/// Final field arrays and residual history of a terminated solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Nodal pressures (Pa).
    pub pressure: Vec<f64>,
    /// Signed vessel flow rates (m³/s).
    pub flow_rate: Vec<f64>,
    /// Discharge haematocrit per vessel.
    pub hd: Vec<f64>,
    /// Composite residual per iteration, starting at iteration 2.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub berg_residuals: Vec<f64>,
}
