//! Incremental network builder.

use std::collections::HashMap;

use hf_core::units::Length;
use hf_core::{EdgeId, NodeId};

use crate::boundary::Boundary;
use crate::error::{NetworkError, NetworkResult};
use crate::graph::{Junction, VascularNetwork, Vessel};
use crate::validate;

/// Builder for constructing a vascular network incrementally.
///
/// Use `add_junction` and `add_vessel` to build up the topology, attach
/// boundary conditions with `set_boundary`, then call `build()` to validate
/// and freeze it into an immutable `VascularNetwork`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    junctions: Vec<Junction>,
    vessels: Vec<Vessel>,
    boundaries: HashMap<NodeId, Boundary>,
    next_node_id: u32,
    next_edge_id: u32,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a junction to the network and return its ID.
    pub fn add_junction(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        self.junctions.push(Junction {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a vessel between two junctions. Positive flow runs `from` -> `to`.
    ///
    /// Endpoints must already exist; geometry must be positive.
    pub fn add_vessel(
        &mut self,
        name: impl Into<String>,
        from: NodeId,
        to: NodeId,
        diameter: Length,
        length: Length,
    ) -> NetworkResult<EdgeId> {
        let id = EdgeId::from_index(self.next_edge_id);

        for node in [from, to] {
            if node.index() as usize >= self.junctions.len() {
                return Err(NetworkError::InvalidJunctionRef { vessel: id, node });
            }
        }
        if from == to {
            return Err(NetworkError::SelfLoop {
                vessel: id,
                node: from,
            });
        }

        self.next_edge_id += 1;
        self.vessels.push(Vessel {
            id,
            name: name.into(),
            from,
            to,
            diameter: diameter.value,
            length: length.value,
        });
        Ok(id)
    }

    /// Attach (or replace) a boundary condition on a junction.
    pub fn set_boundary(&mut self, node: NodeId, boundary: Boundary) {
        self.boundaries.insert(node, boundary);
    }

    /// Build and validate the network, returning an immutable `VascularNetwork`.
    pub fn build(self) -> NetworkResult<VascularNetwork> {
        let mut boundaries = vec![None; self.junctions.len()];
        for (node, boundary) in &self.boundaries {
            let idx = node.index() as usize;
            if idx >= self.junctions.len() {
                return Err(NetworkError::InvalidBoundaryRef { node: *node });
            }
            boundaries[idx] = Some(*boundary);
        }

        validate::validate_structure(&self.junctions, &self.vessels, &boundaries)?;

        let (incidence_offsets, incident_vessels) =
            Self::build_adjacency(&self.junctions, &self.vessels);

        validate::validate_adjacency(
            &self.junctions,
            &self.vessels,
            &incidence_offsets,
            &incident_vessels,
        )?;

        Ok(VascularNetwork {
            junctions: self.junctions,
            vessels: self.vessels,
            boundaries,
            incidence_offsets,
            incident_vessels,
        })
    }

    /// Build compact adjacency lists: for each junction, collect its incident vessels.
    fn build_adjacency(junctions: &[Junction], vessels: &[Vessel]) -> (Vec<usize>, Vec<EdgeId>) {
        let mut node_to_vessels: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        for vessel in vessels {
            node_to_vessels.entry(vessel.from).or_default().push(vessel.id);
            node_to_vessels.entry(vessel.to).or_default().push(vessel.id);
        }

        // Sort each junction's vessel list for determinism
        for list in node_to_vessels.values_mut() {
            list.sort_by_key(|v| v.index());
        }

        let mut offsets = Vec::with_capacity(junctions.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);

        for junction in junctions {
            if let Some(list) = node_to_vessels.get(&junction.id) {
                flat.extend_from_slice(list);
            }
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}
