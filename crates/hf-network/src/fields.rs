//! Per-iteration mutable field state.

use crate::error::{NetworkError, NetworkResult};
use crate::graph::VascularNetwork;

/// The single network-wide set of mutable field arrays.
///
/// Owned by the convergence loop; each solver stage borrows exactly the
/// arrays it updates. Nothing caches copies across iterations; the arrays
/// here are the only authoritative per-iteration state.
#[derive(Debug, Clone)]
pub struct FieldState {
    /// Nodal pressures (Pa). None until the first pressure solve has run.
    pub pressure: Option<Vec<f64>>,
    /// Signed vessel flow rates (m³/s); positive runs `from` -> `to`.
    pub flow_rate: Vec<f64>,
    /// RBC velocity per vessel (m/s).
    pub velocity: Vec<f64>,
    /// Tube haematocrit per vessel (input field).
    pub ht: Vec<f64>,
    /// Discharge haematocrit per vessel (computed each pass).
    pub hd: Vec<f64>,
    /// Network flow-balance tolerance, cached by the first balance check.
    pub balance_tolerance: Option<f64>,
}

impl FieldState {
    /// Create a field state with the given tube haematocrit per vessel.
    ///
    /// Discharge haematocrit starts as a copy of the tube haematocrit; flow,
    /// velocity and pressure start unset.
    pub fn new(network: &VascularNetwork, ht: Vec<f64>) -> NetworkResult<Self> {
        let n_vessels = network.vessels().len();
        if ht.len() != n_vessels {
            return Err(NetworkError::FieldLength {
                what: "tube haematocrit",
                got: ht.len(),
                expected: n_vessels,
            });
        }
        let hd = ht.clone();
        Ok(Self {
            pressure: None,
            flow_rate: vec![0.0; n_vessels],
            velocity: vec![0.0; n_vessels],
            ht,
            hd,
            balance_tolerance: None,
        })
    }

    /// Create a field state with one tube haematocrit for every vessel.
    pub fn uniform(network: &VascularNetwork, ht: f64) -> NetworkResult<Self> {
        Self::new(network, vec![ht; network.vessels().len()])
    }
}
