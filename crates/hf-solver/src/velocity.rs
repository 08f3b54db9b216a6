//! RBC velocity from bulk flow and the Fahraeus effect.
//!
//! Red cells travel faster than whole blood: Ht/Hd = v_bulk/v_rbc, so
//! v_rbc = v_bulk * hd / ht. With no cells in the tube the ratio is moot and
//! the bulk velocity is used.

use hf_network::{FieldState, VascularNetwork};
use std::f64::consts::PI;

/// Recompute the signed RBC velocity of every vessel.
pub fn update_velocity(network: &VascularNetwork, fields: &mut FieldState) {
    for (i, vessel) in network.vessels().iter().enumerate() {
        let area = PI * vessel.diameter * vessel.diameter / 4.0;
        let bulk = fields.flow_rate[i] / area;
        fields.velocity[i] = if fields.ht[i] > 0.0 {
            bulk * fields.hd[i] / fields.ht[i]
        } else {
            bulk
        };
    }
}
