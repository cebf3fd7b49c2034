//! ECIES on secp256k1, a multi-recipient envelope format, pluggable
//! recipient-identifier providers, a GUID value type, and streaming
//! encrypt/decrypt/checksum/xor-fold transforms.

pub mod codec;
pub mod config;
pub mod error;
pub mod external;
pub mod guid;
pub mod id_provider;
pub mod multi;
pub mod primitives;
pub mod streaming;

pub use codec::{decrypt_basic, decrypt_length_prefixed, encrypt_basic, encrypt_length_prefixed};
pub use config::{Config, Provenance, Registry};
pub use error::{EciesError, EciesResult};
pub use external::{Translator, WalletProvider};
pub use guid::Guid;
pub use id_provider::{GuidV4Provider, IdProvider, ObjectId, ObjectIdProvider, OpaqueProvider, UuidProvider};
pub use multi::{decrypt_multi, encrypt_multi, Recipient};
pub use primitives::KeyPair;
