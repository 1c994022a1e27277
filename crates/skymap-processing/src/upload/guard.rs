//! In-flight duplicate-submission guard.
//!
//! A slot is keyed by `(session, sha256(bytes))`. Holding the slot marks the upload as in
//! flight; dropping it releases the key.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};

type SlotKey = (String, String);

#[derive(Clone, Default)]
pub struct InFlightUploads {
    inner: Arc<Mutex<HashSet<SlotKey>>>,
}

impl InFlightUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Claim the slot for `(session_key, digest)`, or `None` if it is already held.
    pub fn try_acquire(&self, session_key: &str, digest: String) -> Option<InFlightSlot> {
        let key = (session_key.to_string(), digest);
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightSlot {
            owner: self.clone(),
            key,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<SlotKey>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases its key on drop.
pub struct InFlightSlot {
    owner: InFlightUploads,
    key: SlotKey,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_for_same_bytes_fails() {
        let guard = InFlightUploads::new();
        let digest = InFlightUploads::digest(b"sky");

        let slot = guard.try_acquire("session-a", digest.clone());
        assert!(slot.is_some());
        assert!(guard.try_acquire("session-a", digest.clone()).is_none());

        // Different session or different bytes are independent
        assert!(guard.try_acquire("session-b", digest.clone()).is_some());
        assert!(guard
            .try_acquire("session-a", InFlightUploads::digest(b"other"))
            .is_some());

        drop(slot);
        assert!(guard.try_acquire("session-a", digest).is_some());
    }

    #[test]
    fn test_slots_release_on_drop() {
        let guard = InFlightUploads::new();
        {
            let _slot = guard.try_acquire("s", InFlightUploads::digest(b"x"));
            assert_eq!(guard.len(), 1);
        }
        assert!(guard.is_empty());
    }
}
