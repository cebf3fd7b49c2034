// ── GUID Value Type ──────────────────────────────────────────────────────
// A 16-byte RFC-4122 identifier with five textual/numeric representations
// and version factories v1/v3/v4/v5/v6/v7. Version and timestamp generation
// are delegated to the `uuid` crate; this type owns parsing, the five
// representations, ordering, and hashing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::engine::general_purpose::{
    STANDARD as BASE64_STANDARD, STANDARD_NO_PAD as BASE64_STANDARD_NO_PAD,
    URL_SAFE as BASE64_URL_SAFE, URL_SAFE_NO_PAD as BASE64_URL_SAFE_NO_PAD,
};
use base64::Engine;

use crate::error::{EciesError, EciesResult};

const LEN: usize = 16;
const DASHED_LEN: usize = 36;
const SHORT_HEX_LEN: usize = 32;

/// A 16-byte GUID. Cheap to copy; representations are computed on demand
/// rather than cached, since a GUID is small enough that caching would only
/// add bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Guid([u8; LEN]);

impl Guid {
    /// Wrap exactly 16 raw bytes as a GUID.
    pub fn from_bytes(bytes: &[u8]) -> EciesResult<Guid> {
        if bytes.len() != LEN {
            return Err(EciesError::InvalidGuidLength(bytes.len()));
        }
        let mut out = [0u8; LEN];
        out.copy_from_slice(bytes);
        Ok(Guid(out))
    }

    /// The 16 raw bytes.
    pub fn as_bytes(&self) -> &[u8; LEN] {
        &self.0
    }

    /// A GUID from its 128-bit integer representation (big-endian byte order).
    pub fn from_u128(value: u128) -> Guid {
        Guid(value.to_be_bytes())
    }

    /// The 128-bit integer representation (big-endian byte order).
    pub fn to_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Parse any of the five supported textual forms, dispatching on length
    /// and shape: 36-char dashed hex, 32-char short hex, or 22/24-char
    /// base64 (standard or URL-safe, padded or not).
    pub fn parse(s: &str) -> EciesResult<Guid> {
        match s.len() {
            DASHED_LEN => Self::from_dashed_hex(s),
            SHORT_HEX_LEN => Self::from_short_hex(s),
            22 | 24 => Self::from_base64(s),
            other => Err(EciesError::InvalidGuid {
                shape: "unrecognized GUID string length",
                len: other,
                source_data: s.as_bytes().to_vec(),
            }),
        }
    }

    /// Parse the canonical `8-4-4-4-12` dashed hex form.
    pub fn from_dashed_hex(s: &str) -> EciesResult<Guid> {
        if s.len() != DASHED_LEN {
            return Err(EciesError::InvalidGuidLength(s.len()));
        }
        let bytes = s.as_bytes();
        if bytes[8] != b'-' || bytes[13] != b'-' || bytes[18] != b'-' || bytes[23] != b'-' {
            return Err(EciesError::InvalidGuid {
                shape: "dashed-hex",
                len: s.len(),
                source_data: s.as_bytes().to_vec(),
            });
        }
        let compact: String = s.chars().filter(|&c| c != '-').collect();
        Self::from_short_hex(&compact)
    }

    /// Parse the 32-char dashless hex form.
    pub fn from_short_hex(s: &str) -> EciesResult<Guid> {
        if s.len() != SHORT_HEX_LEN {
            return Err(EciesError::InvalidGuidLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|_| EciesError::InvalidGuid {
            shape: "short-hex",
            len: s.len(),
            source_data: s.as_bytes().to_vec(),
        })?;
        let guid = Guid::from_bytes(&bytes)?;
        Self::require_boundary_or_rfc4122(guid, "short-hex", s)
    }

    /// Parse standard base64 (padded or unpadded).
    pub fn from_base64(s: &str) -> EciesResult<Guid> {
        let decoded = BASE64_STANDARD
            .decode(s)
            .or_else(|_| BASE64_STANDARD_NO_PAD.decode(s))
            .or_else(|_| BASE64_URL_SAFE.decode(s))
            .or_else(|_| BASE64_URL_SAFE_NO_PAD.decode(s))
            .map_err(|e| EciesError::ParseFailed(e.to_string()))?;
        let guid = Guid::from_bytes(&decoded)?;
        Self::require_boundary_or_rfc4122(guid, "base64", s)
    }

    /// Parse URL-safe base64 specifically (padded or unpadded).
    pub fn from_base64_urlsafe(s: &str) -> EciesResult<Guid> {
        let decoded = BASE64_URL_SAFE
            .decode(s)
            .or_else(|_| BASE64_URL_SAFE_NO_PAD.decode(s))
            .map_err(|e| EciesError::ParseFailed(e.to_string()))?;
        let guid = Guid::from_bytes(&decoded)?;
        Self::require_boundary_or_rfc4122(guid, "base64-urlsafe", s)
    }

    /// Step (c) of the parse validation order: boundary values (nil,
    /// all-`0xFF`) are accepted unconditionally; every other value must
    /// pass an RFC-4122 validity check (a recognised variant and version).
    fn require_boundary_or_rfc4122(guid: Guid, shape: &'static str, s: &str) -> EciesResult<Guid> {
        if guid.is_nil() || guid.is_max() {
            return Ok(guid);
        }
        if guid.variant() == Some(1) && guid.version().is_some() {
            Ok(guid)
        } else {
            Err(EciesError::InvalidGuid {
                shape,
                len: s.len(),
                source_data: s.as_bytes().to_vec(),
            })
        }
    }

    /// Canonical `8-4-4-4-12` dashed hex form, lowercase.
    pub fn to_dashed_hex(&self) -> String {
        let hex = hex::encode(self.0);
        format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }

    /// 32-char dashless hex form, lowercase.
    pub fn to_short_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// 24-char standard base64 form.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }

    /// URL-safe base64 form.
    pub fn to_base64_urlsafe(&self) -> String {
        BASE64_URL_SAFE.encode(self.0)
    }

    /// RFC-4122 version nibble, or `None` if the variant bits don't match
    /// RFC-4122 (this is also how the all-zero nil GUID and the all-`0xFF`
    /// max GUID report "no version": neither sets the `10xx` variant).
    pub fn version(&self) -> Option<u8> {
        if self.0[8] >> 6 != 0b10 {
            return None;
        }
        let version_nibble = self.0[6] >> 4;
        if (1..=8).contains(&version_nibble) {
            Some(version_nibble)
        } else {
            None
        }
    }

    /// RFC-4122 variant: `0` (NCS backward-compatible), `1` (RFC-4122), or
    /// `2` (Microsoft). `None` for the reserved-future `0b111` pattern.
    pub fn variant(&self) -> Option<u8> {
        let b = self.0[8];
        if b >> 7 == 0b0 {
            Some(0)
        } else if b >> 6 == 0b10 {
            Some(1)
        } else if b >> 5 == 0b110 {
            Some(2)
        } else {
            None
        }
    }

    /// `true` for the all-zero GUID.
    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; LEN]
    }

    /// `true` for the all-`0xFF` GUID.
    pub fn is_max(&self) -> bool {
        self.0 == [0xFFu8; LEN]
    }

    /// Byte-wise lexicographic comparison.
    pub fn compare_to(&self, other: &Guid) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// FNV-1a hash over the raw bytes, for use in non-cryptographic hash
    /// tables where a full 128-bit key would be wasteful.
    pub fn hash_code(&self) -> u32 {
        const FNV_OFFSET: u32 = 0x811c_9dc5;
        const FNV_PRIME: u32 = 0x0100_0193;
        let mut hash = FNV_OFFSET;
        for &byte in &self.0 {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn from_uuid(u: uuid::Uuid) -> Guid {
        Guid(*u.as_bytes())
    }

    fn to_uuid(self) -> uuid::Uuid {
        uuid::Uuid::from_bytes(self.0)
    }

    /// Version 1: timestamp + node id (MAC-address-shaped, caller-supplied).
    pub fn new_v1(node_id: [u8; 6]) -> Guid {
        let ts = uuid::Timestamp::now(uuid::NoContext);
        Guid::from_uuid(uuid::Uuid::new_v1(ts, &node_id))
    }

    /// Version 3: MD5 of `namespace ‖ name`.
    pub fn new_v3(namespace: &Guid, name: &[u8]) -> Guid {
        Guid::from_uuid(uuid::Uuid::new_v3(&namespace.to_uuid(), name))
    }

    /// Version 4: fully random.
    pub fn new_v4() -> Guid {
        Guid::from_uuid(uuid::Uuid::new_v4())
    }

    /// Version 5: SHA-1 of `namespace ‖ name`.
    pub fn new_v5(namespace: &Guid, name: &[u8]) -> Guid {
        Guid::from_uuid(uuid::Uuid::new_v5(&namespace.to_uuid(), name))
    }

    /// Version 6: reordered timestamp (sortable) + node id.
    pub fn new_v6(node_id: [u8; 6]) -> Guid {
        let ts = uuid::Timestamp::now(uuid::NoContext);
        Guid::from_uuid(uuid::Uuid::new_v6(ts, &node_id))
    }

    /// Version 7: Unix-epoch-millis timestamp + random tail (sortable,
    /// no node id needed).
    pub fn new_v7() -> Guid {
        Guid::from_uuid(uuid::Uuid::now_v7())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string());
        let variant = self
            .variant()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "Guid({}, v{}, variant={})",
            self.to_dashed_hex(),
            version,
            variant
        )
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dashed_hex())
    }
}

impl PartialOrd for Guid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Ord for Guid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl Hash for Guid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}
