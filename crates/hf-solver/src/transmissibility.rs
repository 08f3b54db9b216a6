//! Vessel transmissibility.
//!
//! Poiseuille conductance with the haematocrit-dependent apparent viscosity:
//! T = pi d^4 / (128 mu_app L). Haematocrit feeds back into the pressure
//! field through this stage.

use hf_core::units::constants::{M_TO_UM, PLASMA_VISCOSITY_PA_S};
use hf_network::VascularNetwork;
use std::f64::consts::PI;

use crate::viscosity::relative_apparent_viscosity;

/// Recompute the transmissibility of every vessel from the current
/// discharge haematocrit.
pub fn update_transmissibility(
    network: &VascularNetwork,
    hd: &[f64],
    transmissibility: &mut [f64],
) {
    for (i, vessel) in network.vessels().iter().enumerate() {
        let mu_app =
            PLASMA_VISCOSITY_PA_S * relative_apparent_viscosity(vessel.diameter * M_TO_UM, hd[i]);
        transmissibility[i] = PI * vessel.diameter.powi(4) / (128.0 * mu_app * vessel.length);
    }
}
