// ── ObjectID Provider ────────────────────────────────────────────────────
// 12 bytes: 4-byte BE unix-seconds timestamp ‖ 5 random bytes ‖ 3-byte
// process-scoped monotonic counter. Modeled on MongoDB-style ObjectIds.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

use super::IdProvider;
use crate::error::{EciesError, EciesResult};

const LEN: usize = 12;
const COUNTER_MASK: u32 = 0x00FF_FFFF; // counter wraps at 2^24

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A 12-byte ObjectID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectId(pub [u8; LEN]);

/// Generates and validates [`ObjectId`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectIdProvider;

impl IdProvider<ObjectId> for ObjectIdProvider {
    fn byte_length(&self) -> usize {
        LEN
    }

    fn name(&self) -> &'static str {
        "object-id"
    }

    fn generate(&self) -> ObjectId {
        let mut bytes = [0u8; LEN];

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after the unix epoch")
            .as_secs() as u32;
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());

        rand::thread_rng().fill_bytes(&mut bytes[4..9]);

        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
        bytes[9] = (counter >> 16) as u8;
        bytes[10] = (counter >> 8) as u8;
        bytes[11] = counter as u8;

        ObjectId(bytes)
    }

    fn validate(&self, bytes: &[u8]) -> bool {
        bytes.len() == LEN && bytes.iter().any(|&b| b != 0)
    }

    fn serialise(&self, bytes: &[u8]) -> EciesResult<String> {
        if bytes.len() != LEN {
            return Err(EciesError::InvalidStringLength {
                expected: LEN,
                actual: bytes.len(),
            });
        }
        Ok(hex::encode(bytes))
    }

    fn deserialise(&self, s: &str) -> EciesResult<Vec<u8>> {
        if s.len() != LEN * 2 {
            return Err(EciesError::InvalidStringLength {
                expected: LEN * 2,
                actual: s.len(),
            });
        }
        hex::decode(s).map_err(|_| EciesError::InvalidCharacters)
    }

    fn to_bytes(&self, value: &ObjectId) -> Vec<u8> {
        value.0.to_vec()
    }

    fn from_bytes(&self, bytes: &[u8]) -> EciesResult<ObjectId> {
        if !self.validate(bytes) {
            return Err(EciesError::InvalidDeserializedId);
        }
        let mut out = [0u8; LEN];
        out.copy_from_slice(bytes);
        Ok(ObjectId(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_well_formed_and_monotonic_counter() {
        let provider = ObjectIdProvider;
        let a = provider.generate();
        let b = provider.generate();
        assert!(provider.validate(&a.0));
        assert!(provider.validate(&b.0));
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn serialise_roundtrip() {
        let provider = ObjectIdProvider;
        let id = provider.generate();
        let s = provider.id_to_string(&id);
        assert_eq!(s.len(), 24);
        let back = provider.id_from_string(&s).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn rejects_all_zero() {
        let provider = ObjectIdProvider;
        assert!(!provider.validate(&[0u8; LEN]));
    }

    #[test]
    fn rejects_wrong_length() {
        let provider = ObjectIdProvider;
        assert!(!provider.validate(&[1u8; 11]));
    }
}
