//! Digests of the design state
//!
//! ## Determinism Guarantees
//!
//! - Same observable state → same digest (canonical JSON of ordered maps)
//! - Id allocation counters and the live id map are excluded
//! - Semantic errors and undo history are not part of the state

use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::model::DesignState;

/// Hex-encoded SHA256 of the design tree, name spaces and back references
///
/// ## Errors
///
/// Returns `DesignError::Serialization` if JSON serialization fails.
///
/// ## Example
///
/// ```
/// use rdm_core::{digest::state_digest, Module};
///
/// let module = Module::report_design().unwrap();
/// let digest = state_digest(module.state()).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn state_digest(state: &DesignState) -> Result<String> {
    let canonical = serde_json::to_string(state)?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElementKind;

    #[test]
    fn test_hash_string_deterministic() {
        assert_eq!(hash_string("design"), hash_string("design"));
        assert_ne!(hash_string("design"), hash_string("library"));
    }

    #[test]
    fn test_allocated_element_is_part_of_digest() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let before = state_digest(&state).unwrap();
        state.allocate(ElementKind::Label);
        let after = state_digest(&state).unwrap();
        assert_ne!(before, after);
        assert_eq!(after, state_digest(&state).unwrap());
    }
}
