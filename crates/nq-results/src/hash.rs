//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};

use nq_core::Real;

/// Run id derived from the grid contents and the model's declared surface.
/// Identical inputs hash identically, independent of worker count.
pub fn compute_run_id(
    model_name: &str,
    uncertain_names: &[String],
    nodes: &[Vec<Real>],
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(model_name.as_bytes());
    for name in uncertain_names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    for node in nodes {
        for value in node {
            hasher.update(value.to_le_bytes());
        }
    }

    let result = hasher.finalize();
    format!("{:x}", result)
}
