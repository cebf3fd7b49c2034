// ── UUID Provider ────────────────────────────────────────────────────────
// 16-byte RFC-4122 UUIDs of any version, serialised as the standard 36-char
// dashed hex form.

use super::IdProvider;
use crate::error::{EciesError, EciesResult};

const LEN: usize = 16;
const DASHED_LEN: usize = 36;

/// Generates (version 4) and validates (any RFC-4122 version) [`uuid::Uuid`]
/// values.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidProvider;

impl IdProvider<uuid::Uuid> for UuidProvider {
    fn byte_length(&self) -> usize {
        LEN
    }

    fn name(&self) -> &'static str {
        "uuid"
    }

    fn generate(&self) -> uuid::Uuid {
        uuid::Uuid::new_v4()
    }

    fn validate(&self, bytes: &[u8]) -> bool {
        if bytes.len() != LEN {
            return false;
        }
        match uuid::Uuid::from_slice(bytes) {
            Ok(u) => u.get_version().is_some(),
            Err(_) => false,
        }
    }

    fn serialise(&self, bytes: &[u8]) -> EciesResult<String> {
        if bytes.len() != LEN {
            return Err(EciesError::InvalidStringLength {
                expected: LEN,
                actual: bytes.len(),
            });
        }
        let u = uuid::Uuid::from_slice(bytes).map_err(|e| EciesError::ParseFailed(e.to_string()))?;
        Ok(u.hyphenated().to_string())
    }

    fn deserialise(&self, s: &str) -> EciesResult<Vec<u8>> {
        if s.len() != DASHED_LEN {
            return Err(EciesError::InvalidStringLength {
                expected: DASHED_LEN,
                actual: s.len(),
            });
        }
        let u = uuid::Uuid::parse_str(s).map_err(|e| EciesError::ParseFailed(e.to_string()))?;
        Ok(u.as_bytes().to_vec())
    }

    fn to_bytes(&self, value: &uuid::Uuid) -> Vec<u8> {
        value.as_bytes().to_vec()
    }

    fn from_bytes(&self, bytes: &[u8]) -> EciesResult<uuid::Uuid> {
        if !self.validate(bytes) {
            return Err(EciesError::InvalidDeserializedId);
        }
        uuid::Uuid::from_slice(bytes).map_err(|e| EciesError::ParseFailed(e.to_string()))
    }
}
