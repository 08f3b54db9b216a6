//! Assembly of the nodal pressure system.
//!
//! One row per junction: volume conservation sum T_e (p_i - p_j) = q_source
//! for interior and inflow-boundary junctions, a Dirichlet identity row for
//! pressure-boundary junctions.

use hf_network::{BoundaryKind, VascularNetwork};
use nalgebra::{DMatrix, DVector};

/// Assemble the dense pressure system `A p = b`.
pub fn assemble_pressure_system(
    network: &VascularNetwork,
    transmissibility: &[f64],
) -> (DMatrix<f64>, DVector<f64>) {
    let n = network.junctions().len();
    let mut a = DMatrix::zeros(n, n);
    let mut b = DVector::zeros(n);

    for (e, vessel) in network.vessels().iter().enumerate() {
        let t = transmissibility[e];
        let i = vessel.from.index() as usize;
        let j = vessel.to.index() as usize;
        a[(i, i)] += t;
        a[(j, j)] += t;
        a[(i, j)] -= t;
        a[(j, i)] -= t;
    }

    for junction in network.junctions() {
        let i = junction.id.index() as usize;
        match network.boundary(junction.id).map(|b| b.kind) {
            Some(BoundaryKind::Pressure(p)) => {
                // Dirichlet: overwrite the conservation row
                for j in 0..n {
                    a[(i, j)] = 0.0;
                }
                a[(i, i)] = 1.0;
                b[i] = p.value;
            }
            Some(BoundaryKind::Inflow(q)) => {
                b[i] = q.value;
            }
            None => {}
        }
    }

    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::units::{m, m3ps, pa, um};
    use hf_network::{Boundary, NetworkBuilder};

    #[test]
    fn dirichlet_rows_are_identity() {
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("out");
        builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45));
        builder.set_boundary(n1, Boundary::new(BoundaryKind::Pressure(pa(10.0)), 0.45));
        let network = builder.build().unwrap();

        let (a, b) = assemble_pressure_system(&network, &[2.0]);
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(a[(0, 1)], 0.0);
        assert_eq!(b[0], 100.0);
        assert_eq!(b[1], 10.0);
    }

    #[test]
    fn interior_row_balances_transmissibilities() {
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("mid");
        let n2 = builder.add_junction("out");
        builder.add_vessel("v0", n0, n1, um(10.0), m(1e-3)).unwrap();
        builder.add_vessel("v1", n1, n2, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45));
        builder.set_boundary(n2, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        let network = builder.build().unwrap();

        let (a, b) = assemble_pressure_system(&network, &[3.0, 5.0]);
        assert_eq!(a[(1, 0)], -3.0);
        assert_eq!(a[(1, 1)], 8.0);
        assert_eq!(a[(1, 2)], -5.0);
        assert_eq!(b[1], 0.0);
    }

    #[test]
    fn inflow_boundary_becomes_source_term() {
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("out");
        builder.add_vessel("v", n0, n1, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Inflow(m3ps(2.5)), 0.45));
        builder.set_boundary(n1, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        let network = builder.build().unwrap();

        let (a, b) = assemble_pressure_system(&network, &[4.0]);
        // Conservation row kept, with the prescribed inflow on the right
        assert_eq!(a[(0, 0)], 4.0);
        assert_eq!(a[(0, 1)], -4.0);
        assert_eq!(b[0], 2.5);
    }
}
