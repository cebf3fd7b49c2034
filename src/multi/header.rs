// ── Multi-recipient Header Layout ───────────────────────────────────────────
// magic(2) ‖ version(1) ‖ type(1) ‖ recipientCount(2, BE)
//   ‖ payloadIv(12) ‖ payloadTag(16) ‖ ephemeralPk(65)
//   ‖ RecipientEntry[recipientCount]
// RecipientEntry = id(B) ‖ tag(16) ‖ wrapped(32)

use crate::error::{EciesError, EciesResult};
use crate::primitives::{IV_LEN, TAG_LEN};

/// Two-byte magic identifying a multi-recipient envelope. Deliberately not
/// of the form `0x04 xx` so it can never be mistaken for a basic envelope's
/// leading type byte.
pub const MAGIC: [u8; 2] = [0xEC, 0x15];

/// Current header version. Parsers reject any other value with
/// [`EciesError::InvalidEnvelopeVersion`].
pub const VERSION: u8 = 0x01;

/// Envelope type byte (reserved for future multi-recipient subtypes).
pub const TYPE_MULTI: u8 = 0x01;

const UNCOMPRESSED_SEC1_LEN: usize = 65;
const WRAPPED_KEY_LEN: usize = TAG_LEN + 32; // 48: AEAD tag + AES-256 key

/// Bytes of the header that are bound as AAD on the payload AEAD: magic,
/// version, type, and recipientCount. Binding recipientCount closes a
/// substitution attack — an attacker cannot drop or add recipient entries
/// without invalidating the payload tag.
pub const HEADER_PREFIX_LEN: usize = 2 + 1 + 1 + 2;

const FIXED_HEADER_LEN: usize = HEADER_PREFIX_LEN + IV_LEN + TAG_LEN + UNCOMPRESSED_SEC1_LEN;

/// Size in bytes of one `RecipientEntry` given an identifier byte length `b`.
pub fn entry_len(id_len: usize) -> usize {
    id_len + WRAPPED_KEY_LEN
}

/// Parsed fixed-size portion of a multi-recipient header.
#[derive(Debug, Clone)]
pub struct HeaderFixed {
    pub recipient_count: u16,
    pub payload_iv: [u8; IV_LEN],
    pub payload_tag: [u8; TAG_LEN],
    pub ephemeral_pk: [u8; UNCOMPRESSED_SEC1_LEN],
}

/// Serialize the fixed header portion (everything before the recipient
/// table). Returns the bytes; callers append `RecipientEntry` data after.
pub fn encode_fixed(fixed: &HeaderFixed) -> Vec<u8> {
    let mut out = Vec::with_capacity(FIXED_HEADER_LEN);
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(TYPE_MULTI);
    out.extend_from_slice(&fixed.recipient_count.to_be_bytes());
    out.extend_from_slice(&fixed.payload_iv);
    out.extend_from_slice(&fixed.payload_tag);
    out.extend_from_slice(&fixed.ephemeral_pk);
    debug_assert_eq!(out.len(), FIXED_HEADER_LEN);
    out
}

/// Parse and validate the fixed header portion of `data`. Returns the parsed
/// fields plus the offset at which the recipient table begins.
pub fn decode_fixed(data: &[u8]) -> EciesResult<(HeaderFixed, usize)> {
    if data.len() < FIXED_HEADER_LEN {
        return Err(EciesError::with_source_data(
            "envelope shorter than fixed multi-recipient header",
            0,
            data,
        ));
    }
    if data[0..2] != MAGIC {
        return Err(EciesError::with_source_data("bad multi-recipient magic", 0, data));
    }
    let version = data[2];
    if version != VERSION {
        return Err(EciesError::InvalidEnvelopeVersion(version));
    }
    // data[3] is the type byte; only TYPE_MULTI is defined today, reserved
    // for future subtypes rather than rejected outright.

    let recipient_count = u16::from_be_bytes([data[4], data[5]]);
    let mut offset = HEADER_PREFIX_LEN;

    let mut payload_iv = [0u8; IV_LEN];
    payload_iv.copy_from_slice(&data[offset..offset + IV_LEN]);
    offset += IV_LEN;

    let mut payload_tag = [0u8; TAG_LEN];
    payload_tag.copy_from_slice(&data[offset..offset + TAG_LEN]);
    offset += TAG_LEN;

    let mut ephemeral_pk = [0u8; UNCOMPRESSED_SEC1_LEN];
    ephemeral_pk.copy_from_slice(&data[offset..offset + UNCOMPRESSED_SEC1_LEN]);
    offset += UNCOMPRESSED_SEC1_LEN;

    debug_assert_eq!(offset, FIXED_HEADER_LEN);

    Ok((
        HeaderFixed {
            recipient_count,
            payload_iv,
            payload_tag,
            ephemeral_pk,
        },
        offset,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_header_roundtrip() {
        let fixed = HeaderFixed {
            recipient_count: 3,
            payload_iv: [1u8; IV_LEN],
            payload_tag: [2u8; TAG_LEN],
            ephemeral_pk: [3u8; UNCOMPRESSED_SEC1_LEN],
        };
        let encoded = encode_fixed(&fixed);
        assert_eq!(encoded.len(), FIXED_HEADER_LEN);
        let (parsed, offset) = decode_fixed(&encoded).unwrap();
        assert_eq!(offset, FIXED_HEADER_LEN);
        assert_eq!(parsed.recipient_count, 3);
        assert_eq!(parsed.payload_iv, [1u8; IV_LEN]);
        assert_eq!(parsed.payload_tag, [2u8; TAG_LEN]);
        assert_eq!(parsed.ephemeral_pk, [3u8; UNCOMPRESSED_SEC1_LEN]);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut encoded = encode_fixed(&HeaderFixed {
            recipient_count: 1,
            payload_iv: [0u8; IV_LEN],
            payload_tag: [0u8; TAG_LEN],
            ephemeral_pk: [0u8; UNCOMPRESSED_SEC1_LEN],
        });
        encoded[0] = 0x00;
        assert!(decode_fixed(&encoded).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut encoded = encode_fixed(&HeaderFixed {
            recipient_count: 1,
            payload_iv: [0u8; IV_LEN],
            payload_tag: [0u8; TAG_LEN],
            ephemeral_pk: [0u8; UNCOMPRESSED_SEC1_LEN],
        });
        encoded[2] = 0x02;
        match decode_fixed(&encoded) {
            Err(EciesError::InvalidEnvelopeVersion(2)) => {}
            other => panic!("expected InvalidEnvelopeVersion(2), got {other:?}"),
        }
    }
}
