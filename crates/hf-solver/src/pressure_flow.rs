//! Pressure solve and signed edge flows.

use hf_core::ensure_finite;
use hf_network::{FieldState, VascularNetwork};
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::linear_system::assemble_pressure_system;

/// Solve the nodal pressure system and derive signed vessel flows.
///
/// Flow sign follows the stored endpoint order: positive runs `from` -> `to`.
pub fn update_pressure_flow(
    network: &VascularNetwork,
    transmissibility: &[f64],
    fields: &mut FieldState,
) -> SolverResult<()> {
    let (a, b) = assemble_pressure_system(network, transmissibility);

    let pressure = a.lu().solve(&b).ok_or(SolverError::SingularSystem)?;
    for p in pressure.iter() {
        ensure_finite(*p, "pressure")?;
    }

    for (e, vessel) in network.vessels().iter().enumerate() {
        let dp = pressure[vessel.from.index() as usize] - pressure[vessel.to.index() as usize];
        fields.flow_rate[e] = transmissibility[e] * dp;
    }

    debug!(nodes = pressure.len(), "pressure field updated");
    fields.pressure = Some(pressure.iter().copied().collect());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::units::{m, pa, um};
    use hf_network::{Boundary, BoundaryKind, NetworkBuilder};

    #[test]
    fn two_node_poiseuille_flow() {
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("out");
        builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45));
        builder.set_boundary(n1, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        let network = builder.build().unwrap();

        let mut fields = FieldState::uniform(&network, 0.45).unwrap();
        let t = [2.0e-15];
        update_pressure_flow(&network, &t, &mut fields).unwrap();

        let pressure = fields.pressure.as_ref().unwrap();
        assert!((pressure[0] - 100.0).abs() < 1e-9);
        assert!((pressure[1] - 0.0).abs() < 1e-9);
        assert!((fields.flow_rate[0] - 2.0e-13).abs() < 1e-20);
    }

    #[test]
    fn series_chain_has_uniform_flow() {
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("mid");
        let n2 = builder.add_junction("out");
        builder.add_vessel("v0", n0, n1, um(10.0), m(1e-3)).unwrap();
        builder.add_vessel("v1", n1, n2, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Pressure(pa(200.0)), 0.45));
        builder.set_boundary(n2, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        let network = builder.build().unwrap();

        let mut fields = FieldState::uniform(&network, 0.45).unwrap();
        let t = [1.0e-15, 1.0e-15];
        update_pressure_flow(&network, &t, &mut fields).unwrap();

        let pressure = fields.pressure.as_ref().unwrap();
        assert!((pressure[1] - 100.0).abs() < 1e-9);
        assert!((fields.flow_rate[0] - fields.flow_rate[1]).abs() < 1e-25);
    }
}
