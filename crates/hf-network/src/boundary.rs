//! Boundary conditions at network inlets and outlets.

use hf_core::units::{Pressure, VolumeRate};

/// Kind of condition prescribed at a boundary junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryKind {
    /// Fixed pressure (Dirichlet row in the nodal system).
    Pressure(Pressure),
    /// Fixed volumetric inflow, positive into the network (source term).
    Inflow(VolumeRate),
}

/// A boundary condition: the prescribed kind plus the haematocrit carried
/// by blood entering through this junction.
///
/// The haematocrit is only consumed when the junction acts as an inflow
/// during a haematocrit pass (ghost parents take it as their value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub kind: BoundaryKind,
    pub haematocrit: f64,
}

impl Boundary {
    pub fn new(kind: BoundaryKind, haematocrit: f64) -> Self {
        Self { kind, haematocrit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::units::{m3ps, pa};

    #[test]
    fn boundary_kinds_compare() {
        let b1 = Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45);
        let b2 = Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45);
        assert_eq!(b1, b2);

        let b3 = Boundary::new(BoundaryKind::Inflow(m3ps(1e-12)), 0.45);
        assert_ne!(b1, b3);
    }
}
