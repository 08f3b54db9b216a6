//! Network validation logic.

use std::collections::HashSet;

use hf_core::EdgeId;

use crate::boundary::Boundary;
use crate::error::{NetworkError, NetworkResult};
use crate::graph::{Junction, Vessel};

/// Validate the network structure: endpoint references, geometry, boundaries.
pub(crate) fn validate_structure(
    junctions: &[Junction],
    vessels: &[Vessel],
    boundaries: &[Option<Boundary>],
) -> NetworkResult<()> {
    for (i, vessel) in vessels.iter().enumerate() {
        // Vessel IDs are contiguous and match their indices
        if vessel.id.index() as usize != i {
            return Err(NetworkError::InconsistentAdjacency { node: vessel.from });
        }

        for node in [vessel.from, vessel.to] {
            if node.index() as usize >= junctions.len() {
                return Err(NetworkError::InvalidJunctionRef {
                    vessel: vessel.id,
                    node,
                });
            }
        }

        if vessel.from == vessel.to {
            return Err(NetworkError::SelfLoop {
                vessel: vessel.id,
                node: vessel.from,
            });
        }

        if !(vessel.diameter > 0.0) {
            return Err(NetworkError::InvalidGeometry {
                vessel: vessel.id,
                what: "diameter",
                value: vessel.diameter,
            });
        }
        if !(vessel.length > 0.0) {
            return Err(NetworkError::InvalidGeometry {
                vessel: vessel.id,
                what: "length",
                value: vessel.length,
            });
        }
    }

    let mut any_boundary = false;
    for (i, boundary) in boundaries.iter().enumerate() {
        if let Some(b) = boundary {
            any_boundary = true;
            if !(0.0..1.0).contains(&b.haematocrit) {
                return Err(NetworkError::InvalidBoundaryHaematocrit {
                    node: junctions[i].id,
                    value: b.haematocrit,
                });
            }
        }
    }
    // A network with vessels but no boundaries cannot be driven
    if !vessels.is_empty() && !any_boundary {
        return Err(NetworkError::NoBoundaries);
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    junctions: &[Junction],
    vessels: &[Vessel],
    incidence_offsets: &[usize],
    incident_vessels: &[EdgeId],
) -> NetworkResult<()> {
    if incidence_offsets.len() != junctions.len() + 1 {
        return Err(NetworkError::InconsistentAdjacency {
            node: junctions
                .first()
                .map_or(hf_core::NodeId::from_index(0), |j| j.id),
        });
    }

    // Every listed vessel must actually touch the junction
    for junction in junctions {
        let idx = junction.id.index() as usize;
        let start = incidence_offsets[idx];
        let end = incidence_offsets[idx + 1];

        for &vessel_id in &incident_vessels[start..end] {
            let vessel = vessels
                .get(vessel_id.index() as usize)
                .ok_or(NetworkError::InconsistentAdjacency { node: junction.id })?;
            if vessel.from != junction.id && vessel.to != junction.id {
                return Err(NetworkError::InconsistentAdjacency { node: junction.id });
            }
        }
    }

    // Each vessel appears exactly twice (once per endpoint)
    let mut seen: HashSet<(EdgeId, bool)> = HashSet::new();
    for (i, junction) in junctions.iter().enumerate() {
        let start = incidence_offsets[i];
        let end = incidence_offsets[i + 1];
        for &vessel_id in &incident_vessels[start..end] {
            let vessel = &vessels[vessel_id.index() as usize];
            let is_from = vessel.from == junction.id;
            if !seen.insert((vessel_id, is_from)) {
                return Err(NetworkError::InconsistentAdjacency { node: junction.id });
            }
        }
    }
    if seen.len() != vessels.len() * 2 {
        return Err(NetworkError::InconsistentAdjacency {
            node: junctions
                .first()
                .map_or(hf_core::NodeId::from_index(0), |j| j.id),
        });
    }

    Ok(())
}
