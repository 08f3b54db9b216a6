//! Core network data structures.

use hf_core::{EdgeId, NodeId};

use crate::boundary::Boundary;

/// A junction in the vascular network (a branch point or a boundary).
///
/// Junctions are minimal: they hold no field data,
/// just an ID and a name for human reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub id: NodeId,
    pub name: String,
}

/// A vessel segment connecting two junctions.
///
/// The stored endpoint order fixes the sign convention for flow:
/// a positive flow rate runs from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Vessel {
    pub id: EdgeId,
    pub name: String,
    pub from: NodeId,
    pub to: NodeId,
    /// Lumen diameter (m).
    pub diameter: f64,
    /// Segment length (m).
    pub length: f64,
}

impl Vessel {
    /// The endpoint opposite to `node`; None if the vessel is not incident.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }
}

/// The network: a validated, immutable collection of junctions and vessels.
///
/// The network stores:
/// - All junctions and vessels in vectors (indexed by their IDs).
/// - Compact adjacency: for each junction, which vessels are incident.
/// - Boundary conditions per junction (None for interior junctions).
#[derive(Debug, Clone)]
pub struct VascularNetwork {
    pub(crate) junctions: Vec<Junction>,
    pub(crate) vessels: Vec<Vessel>,
    pub(crate) boundaries: Vec<Option<Boundary>>,

    /// Offsets for junction->vessel adjacency: junction i's vessels are in
    /// incident_vessels[incidence_offsets[i]..incidence_offsets[i+1]].
    pub(crate) incidence_offsets: Vec<usize>,

    /// Flat list of vessel IDs incident to junctions (sorted by junction ID
    /// then vessel ID for determinism).
    pub(crate) incident_vessels: Vec<EdgeId>,
}

impl VascularNetwork {
    /// Return all junctions.
    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    /// Return all vessels.
    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Get a junction by ID (returns None if ID out of bounds).
    pub fn junction(&self, id: NodeId) -> Option<&Junction> {
        self.junctions.get(id.index() as usize)
    }

    /// Get a vessel by ID (returns None if ID out of bounds).
    pub fn vessel(&self, id: EdgeId) -> Option<&Vessel> {
        self.vessels.get(id.index() as usize)
    }

    /// Iterate over all vessel IDs incident to a given junction.
    pub fn incident_vessels(&self, node_id: NodeId) -> &[EdgeId] {
        let idx = node_id.index() as usize;
        if idx >= self.junctions.len() {
            return &[];
        }
        let start = self.incidence_offsets[idx];
        let end = self.incidence_offsets[idx + 1];
        &self.incident_vessels[start..end]
    }

    /// Boundary condition at a junction, if it is a boundary.
    pub fn boundary(&self, node_id: NodeId) -> Option<&Boundary> {
        self.boundaries
            .get(node_id.index() as usize)
            .and_then(|b| b.as_ref())
    }

    /// Whether the junction carries a boundary condition.
    pub fn is_boundary(&self, node_id: NodeId) -> bool {
        self.boundary(node_id).is_some()
    }

    /// IDs of all boundary junctions, in id order.
    pub fn boundary_junctions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.boundaries
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(|(i, _)| NodeId::from_index(i as u32))
    }
}
