//! Per-device key material derived from the provisioning seed.
//!
//! The constants folded into every response are opaque per-device
//! configuration values. They are derived with domain-separated SHA-256
//! so that each has an independent value and none is a literal in code.

use crate::noise::Block256;
use sha2::{Digest, Sha256};

/// Domain separator for key derivation.
const KEY_DOMAIN: &[u8] = b"trust-anchor-keys-v1";

/// Device-wide constants used by the response pipeline and the
/// integrity commitment.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceKeyMaterial {
    /// Folded into every accumulation step.
    pub(crate) mix: Block256,
    /// First output whitening constant.
    pub(crate) response_a: Block256,
    /// Second output whitening constant.
    pub(crate) response_b: Block256,
    /// Key for the keyed state commitment.
    pub(crate) commitment_key: [u8; 32],
}

impl DeviceKeyMaterial {
    /// Derives all key material from a provisioning seed.
    pub fn derive(provisioning_seed: &str) -> Self {
        Self {
            mix: Block256::from_le_bytes(derive_one(b"mix", provisioning_seed)),
            response_a: Block256::from_le_bytes(derive_one(b"response-a", provisioning_seed)),
            response_b: Block256::from_le_bytes(derive_one(b"response-b", provisioning_seed)),
            commitment_key: derive_one(b"commitment", provisioning_seed),
        }
    }

    /// Returns the commitment key.
    pub(crate) fn commitment_key(&self) -> &[u8; 32] {
        &self.commitment_key
    }
}

fn derive_one(label: &[u8], seed: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(KEY_DOMAIN);
    hasher.update((label.len() as u32).to_le_bytes());
    hasher.update(label);
    hasher.update(seed.as_bytes());
    let result = hasher.finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(&result);
    key
}

impl std::fmt::Debug for DeviceKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceKeyMaterial").finish_non_exhaustive()
    }
}
