// ── Opaque Provider ──────────────────────────────────────────────────────
// N arbitrary bytes, serialised as 2N-char lowercase hex. No structural
// validation beyond length — callers needing a shape the other providers
// don't cover supply their own N.

use rand::RngCore;

use super::IdProvider;
use crate::error::{EciesError, EciesResult};

/// Generates and validates fixed-length opaque byte identifiers.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueProvider {
    byte_length: usize,
}

impl OpaqueProvider {
    /// A provider for ids of exactly `byte_length` bytes. `byte_length` must
    /// be nonzero.
    pub fn new(byte_length: usize) -> EciesResult<Self> {
        if byte_length == 0 {
            return Err(EciesError::InvalidByteLengthParameter(byte_length));
        }
        Ok(Self { byte_length })
    }
}

impl IdProvider<Vec<u8>> for OpaqueProvider {
    fn byte_length(&self) -> usize {
        self.byte_length
    }

    fn name(&self) -> &'static str {
        "opaque"
    }

    fn generate(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_length];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }

    fn validate(&self, bytes: &[u8]) -> bool {
        bytes.len() == self.byte_length
    }

    fn serialise(&self, bytes: &[u8]) -> EciesResult<String> {
        if !self.validate(bytes) {
            return Err(EciesError::InvalidStringLength {
                expected: self.byte_length,
                actual: bytes.len(),
            });
        }
        Ok(hex::encode(bytes))
    }

    fn deserialise(&self, s: &str) -> EciesResult<Vec<u8>> {
        if s.len() != self.byte_length * 2 {
            return Err(EciesError::InvalidStringLength {
                expected: self.byte_length * 2,
                actual: s.len(),
            });
        }
        hex::decode(s).map_err(|_| EciesError::InvalidCharacters)
    }

    fn to_bytes(&self, value: &Vec<u8>) -> Vec<u8> {
        value.clone()
    }

    fn from_bytes(&self, bytes: &[u8]) -> EciesResult<Vec<u8>> {
        if !self.validate(bytes) {
            return Err(EciesError::InvalidDeserializedId);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_and_roundtrip() {
        let provider = OpaqueProvider::new(20).unwrap();
        let id = provider.generate();
        assert_eq!(id.len(), 20);
        let s = provider.id_to_string(&id);
        assert_eq!(s.len(), 40);
        let back = provider.id_from_string(&s).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn rejects_zero_length() {
        assert!(OpaqueProvider::new(0).is_err());
    }

    #[test]
    fn rejects_wrong_length_bytes() {
        let provider = OpaqueProvider::new(8).unwrap();
        assert!(!provider.validate(&[0u8; 7]));
    }
}
