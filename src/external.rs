// ── External Collaborator Contracts ─────────────────────────────────────
// Minimal trait surfaces for two collaborators this crate treats as opaque.
// Neither is implemented here — callers supply their own wallet and
// translator and pass them through to this crate's error/key-input
// boundaries.

/// Supplies a secp256k1 keypair derived from a BIP-39 mnemonic. The core
/// never introspects the mnemonic itself.
pub trait WalletProvider {
    /// `(secret_key_32_bytes, public_key_sec1_bytes)`.
    fn keypair(&self, mnemonic: &str) -> (Vec<u8>, Vec<u8>);
}

/// Maps an `(component, key, vars)` triple to a localised message. When no
/// translator is supplied, callers should fall back to the untranslated
/// `key`.
pub trait Translator {
    fn translate(&self, component: &str, key: &str, vars: &[(&str, &str)]) -> String;
}
