//! Network-specific error types.

use hf_core::{EdgeId, NodeId};
use thiserror::Error;

/// Network construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Vessel {vessel} refers to non-existent junction {node}")]
    InvalidJunctionRef { vessel: EdgeId, node: NodeId },

    #[error("Vessel {vessel} connects junction {node} to itself")]
    SelfLoop { vessel: EdgeId, node: NodeId },

    #[error("Vessel {vessel} has non-positive {what}: {value}")]
    InvalidGeometry {
        vessel: EdgeId,
        what: &'static str,
        value: f64,
    },

    #[error("Boundary haematocrit at junction {node} out of [0, 1): {value}")]
    InvalidBoundaryHaematocrit { node: NodeId, value: f64 },

    #[error("Boundary set on non-existent junction {node}")]
    InvalidBoundaryRef { node: NodeId },

    #[error("Network has no boundary junctions")]
    NoBoundaries,

    #[error("Adjacency list inconsistent for junction {node}")]
    InconsistentAdjacency { node: NodeId },

    #[error("Field length mismatch for {what}: got {got}, expected {expected}")]
    FieldLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
