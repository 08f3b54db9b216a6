//! Error types for solver operations.

use hf_core::{CoreError, NodeId};
use hf_haematocrit::HaematocritError;
use hf_network::NetworkError;
use thiserror::Error;

/// Errors that can occur while solving the network.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Pressure system is singular")]
    SingularSystem,

    #[error("Local flow balance violated at junction {node}: residual {residual} (tol {tol})")]
    FlowImbalance {
        node: NodeId,
        residual: f64,
        tol: f64,
    },

    #[error("Global flow balance violated: residual {residual} (tol {tol})")]
    GlobalImbalance { residual: f64, tol: f64 },

    #[error("Haematocrit error: {0}")]
    Haematocrit(#[from] HaematocritError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] CoreError),
}

pub type SolverResult<T> = Result<T, SolverError>;
