// ── GUID-v4 Provider ─────────────────────────────────────────────────────
// 16-byte RFC-4122 version-4 GUIDs, serialised as 24-char standard base64.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use super::IdProvider;
use crate::error::{EciesError, EciesResult};
use crate::guid::Guid;

const LEN: usize = 16;

/// Generates and validates version-4 [`Guid`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuidV4Provider;

impl IdProvider<Guid> for GuidV4Provider {
    fn byte_length(&self) -> usize {
        LEN
    }

    fn name(&self) -> &'static str {
        "guid-v4"
    }

    fn generate(&self) -> Guid {
        Guid::new_v4()
    }

    fn validate(&self, bytes: &[u8]) -> bool {
        if bytes.len() != LEN {
            return false;
        }
        match Guid::from_bytes(bytes) {
            Ok(guid) => guid.version() == Some(4),
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
        Ok(BASE64_STANDARD.encode(bytes))
    }

    fn deserialise(&self, s: &str) -> EciesResult<Vec<u8>> {
        let decoded = BASE64_STANDARD
            .decode(s)
            .map_err(|e| EciesError::ParseFailed(e.to_string()))?;
        if decoded.len() != LEN {
            return Err(EciesError::InvalidStringLength {
                expected: LEN,
                actual: decoded.len(),
            });
        }
        Ok(decoded)
    }

    fn to_bytes(&self, value: &Guid) -> Vec<u8> {
        value.as_bytes().to_vec()
    }

    fn from_bytes(&self, bytes: &[u8]) -> EciesResult<Guid> {
        if !self.validate(bytes) {
            return Err(EciesError::InvalidDeserializedId);
        }
        Guid::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_version_4() {
        let provider = GuidV4Provider;
        let guid = provider.generate();
        assert!(provider.validate(&provider.to_bytes(&guid)));
    }

    #[test]
    fn serialise_roundtrip_is_24_chars() {
        let provider = GuidV4Provider;
        let guid = provider.generate();
        let s = provider.id_to_string(&guid);
        assert_eq!(s.len(), 24);
        let back = provider.id_from_string(&s).unwrap();
        assert!(provider.equals(&guid, &back));
    }
}
