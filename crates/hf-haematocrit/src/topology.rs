//! Parent/daughter classification of junction topology.
//!
//! A haematocrit pass walks junctions in strictly descending pressure order.
//! Relative to that order, an incident vessel whose far endpoint ranks
//! earlier (higher pressure, ties broken by original junction id) is a
//! parent; every other incident vessel is a daughter. The ordering
//! guarantees that a parent's haematocrit is already finalized when the
//! junction is processed.

use std::cmp::Ordering;

use hf_core::{EdgeId, NodeId};
use hf_network::VascularNetwork;

/// Parents and daughters of one junction for the current flow field.
///
/// Transient: recomputed fresh every pass, never stored.
#[derive(Debug, Clone, Default)]
pub struct NodeTopology {
    pub parents: Vec<EdgeId>,
    pub daughters: Vec<EdgeId>,
}

/// Junction indices sorted by descending pressure, ties by ascending id.
///
/// The sort is stable, so equal pressures keep their original id order.
pub fn pressure_order(pressure: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pressure.len()).collect();
    order.sort_by(|&a, &b| {
        pressure[b]
            .partial_cmp(&pressure[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Inverse of `pressure_order`: rank[i] is junction i's position in the order.
pub fn pressure_ranks(order: &[usize]) -> Vec<usize> {
    let mut rank = vec![0; order.len()];
    for (position, &node) in order.iter().enumerate() {
        rank[node] = position;
    }
    rank
}

/// Classify the vessels incident to `node` into parents and daughters.
pub fn classify(network: &VascularNetwork, node: NodeId, rank: &[usize]) -> NodeTopology {
    let mut topology = NodeTopology::default();
    let node_rank = rank[node.index() as usize];

    for &edge in network.incident_vessels(node) {
        let vessel = &network.vessels()[edge.index() as usize];
        let Some(neighbour) = vessel.other_end(node) else {
            continue;
        };
        if rank[neighbour.index() as usize] < node_rank {
            topology.parents.push(edge);
        } else {
            topology.daughters.push(edge);
        }
    }

    topology
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::units::{m, pa, um};
    use hf_network::{Boundary, BoundaryKind, NetworkBuilder};

    #[test]
    fn order_is_descending_and_stable() {
        let pressure = [3.0, 7.0, 7.0, 1.0];
        let order = pressure_order(&pressure);
        assert_eq!(order, vec![1, 2, 0, 3]);

        let rank = pressure_ranks(&order);
        assert_eq!(rank, vec![2, 0, 1, 3]);
    }

    #[test]
    fn classify_bifurcation() {
        // n0 -> n1 -> {n2, n3}, pressures strictly decreasing from n0
        let mut builder = NetworkBuilder::new();
        let n0 = builder.add_junction("in");
        let n1 = builder.add_junction("branch");
        let n2 = builder.add_junction("out_a");
        let n3 = builder.add_junction("out_b");
        let e0 = builder.add_vessel("v0", n0, n1, um(10.0), m(1e-3)).unwrap();
        let e1 = builder.add_vessel("v1", n1, n2, um(10.0), m(1e-3)).unwrap();
        let e2 = builder.add_vessel("v2", n1, n3, um(10.0), m(1e-3)).unwrap();
        builder.set_boundary(n0, Boundary::new(BoundaryKind::Pressure(pa(100.0)), 0.45));
        builder.set_boundary(n2, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        builder.set_boundary(n3, Boundary::new(BoundaryKind::Pressure(pa(0.0)), 0.45));
        let network = builder.build().unwrap();

        let pressure = [100.0, 50.0, 0.0, 0.0];
        let order = pressure_order(&pressure);
        let rank = pressure_ranks(&order);

        let topo = classify(&network, n1, &rank);
        assert_eq!(topo.parents, vec![e0]);
        assert_eq!(topo.daughters, vec![e1, e2]);

        // The inlet has no parents; its single vessel is a daughter
        let inlet = classify(&network, n0, &rank);
        assert!(inlet.parents.is_empty());
        assert_eq!(inlet.daughters, vec![e0]);
    }
}
