//! Keyed commitment over device register state.
//!
//! Lets an external verifier check that two observations of the device
//! saw the same registers without exposing the registers themselves.
//! Uses BLAKE3 in keyed mode with a per-device key derived at
//! provisioning time.

use crate::controller::AnchorState;

/// A 256-bit keyed hash of an [`AnchorState`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateCommitment([u8; 32]);

impl StateCommitment {
    /// Computes the commitment of `state` under `key`.
    pub fn compute(key: &[u8; 32], state: &AnchorState) -> Self {
        Self(*blake3::keyed_hash(key, &state.encode()).as_bytes())
    }

    /// Recomputes and compares in constant time.
    pub fn verify(&self, key: &[u8; 32], state: &AnchorState) -> bool {
        blake3::Hash::from(self.0) == blake3::keyed_hash(key, &state.encode())
    }

    /// Raw commitment bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for StateCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl std::fmt::Debug for StateCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StateCommitment({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_changes_commitment() {
        let state = AnchorState::power_on();
        let a = StateCommitment::compute(&[1; 32], &state);
        let b = StateCommitment::compute(&[2; 32], &state);

        assert_ne!(a, b);
        assert!(a.verify(&[1; 32], &state));
        assert!(!a.verify(&[2; 32], &state));
    }

    #[test]
    fn test_display_is_hex() {
        let c = StateCommitment::compute(&[0; 32], &AnchorState::power_on());
        let s = c.to_string();

        assert_eq!(s.len(), 64);
        assert_eq!(hex::decode(&s).unwrap(), c.as_bytes());
    }
}
