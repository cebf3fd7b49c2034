// ── Identifier-Provider Contract ────────────────────────────────────────────
// Parametric by native id type T.

pub mod object_id;
pub mod guid_provider;
pub mod uuid_provider;
pub mod opaque;

pub use object_id::{ObjectId, ObjectIdProvider};
pub use guid_provider::GuidV4Provider;
pub use opaque::OpaqueProvider;
pub use uuid_provider::UuidProvider;

use subtle::ConstantTimeEq;

use crate::error::EciesResult;

/// Contract shared by every recipient-identifier variant. `T` is the
/// provider's native in-memory id type (e.g. a fixed byte array, a
/// [`crate::guid::Guid`], a [`uuid::Uuid`]).
pub trait IdProvider<T> {
    /// Fixed number of bytes this provider's ids occupy in an envelope.
    fn byte_length(&self) -> usize;

    /// Human-readable provider name, for diagnostics and config provenance.
    fn name(&self) -> &'static str;

    /// Draw a fresh id from a cryptographic RNG.
    fn generate(&self) -> T;

    /// Validate a raw byte buffer as a well-formed id of this provider's
    /// shape (length plus any variant-specific structural checks).
    fn validate(&self, bytes: &[u8]) -> bool;

    /// Render `bytes` (must already be `byte_length()` long) in this
    /// provider's canonical string form.
    fn serialise(&self, bytes: &[u8]) -> EciesResult<String>;

    /// Parse this provider's canonical string form back to raw bytes.
    /// `deserialise(serialise(x)) == x` for every valid `x`.
    fn deserialise(&self, s: &str) -> EciesResult<Vec<u8>>;

    /// Encode a native id value as raw bytes.
    fn to_bytes(&self, value: &T) -> Vec<u8>;

    /// Decode raw bytes into a native id value.
    /// `fromBytes(toBytes(x)) == x` for every valid `x`.
    fn from_bytes(&self, bytes: &[u8]) -> EciesResult<T>;

    /// Constant-time equality over two native ids of this provider's shape.
    fn equals(&self, a: &T, b: &T) -> bool {
        constant_time_eq(&self.to_bytes(a), &self.to_bytes(b))
    }

    /// Produce a value disjoint from `value` — mutating the clone must never
    /// affect the original. All provider native types here are owned,
    /// non-aliasing values, so this is always a plain value clone.
    fn clone_id(&self, value: &T) -> T {
        self.from_bytes(&self.to_bytes(value))
            .expect("round-tripping a value this provider produced cannot fail")
    }

    /// Render a native id in its canonical string form.
    fn id_to_string(&self, value: &T) -> String {
        self.serialise(&self.to_bytes(value))
            .expect("serialising a value this provider produced cannot fail")
    }

    /// Parse a native id from its canonical string form.
    fn id_from_string(&self, s: &str) -> EciesResult<T> {
        let bytes = self.deserialise(s)?;
        self.from_bytes(&bytes)
    }
}

/// Constant-time equality for two byte buffers. Buffers of differing length
/// are unequal in O(1) time (length is not secret) without short-circuiting
/// the byte comparison itself.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
