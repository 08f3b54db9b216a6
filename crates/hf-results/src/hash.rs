//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};

use crate::types::RunSnapshot;

pub fn compute_run_id(network_name: &str, snapshot: &RunSnapshot, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    hasher.update(network_name.as_bytes());

    let snapshot_json = serde_json::to_string(snapshot).unwrap_or_default();
    hasher.update(snapshot_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
