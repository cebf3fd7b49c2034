// ── Crypto Primitives ───────────────────────────────────────────────────────
// scalar × point arithmetic, KDF, AEAD, signing. Pure and deterministic given
// their inputs; no hidden global state.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{EciesError, EciesResult};

/// Length of an uncompressed secp256k1 point without the leading SEC1 tag
/// byte — what the basic envelope stores as `Epk`.
pub const UNCOMPRESSED_POINT_LEN: usize = 64;
/// AEAD nonce/IV length (AES-256-GCM).
pub const IV_LEN: usize = 12;
/// AEAD tag length (AES-256-GCM).
pub const TAG_LEN: usize = 16;
/// Derived symmetric key length (AES-256).
pub const KEY_LEN: usize = 32;

/// A secp256k1 keypair. Private key bytes are zeroized on drop.
pub struct KeyPair {
    pub secret_key: k256::SecretKey,
    pub public_key: k256::PublicKey,
}

impl KeyPair {
    /// Draw a fresh keypair from a cryptographic RNG.
    pub fn generate() -> Self {
        let secret_key = k256::SecretKey::random(&mut rand::thread_rng());
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// The public key in uncompressed SEC1 form (65 bytes, leading `0x04`).
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let encoded = self.public_key.as_affine().to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(encoded.as_bytes());
        out
    }
}

/// Parse a public key from either 33-byte compressed or 65-byte uncompressed
/// SEC1 encoding. Fails with [`EciesError::InvalidPublicKey`] when the point
/// is not on the curve.
pub fn parse_public_key(bytes: &[u8]) -> EciesResult<k256::PublicKey> {
    k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| EciesError::InvalidPublicKey)
}

/// Parse a secret key from its 32-byte scalar encoding.
pub fn parse_secret_key(bytes: &[u8]) -> EciesResult<k256::SecretKey> {
    if bytes.len() != 32 {
        return Err(EciesError::InvalidKeySize {
            expected: 32,
            actual: bytes.len(),
        });
    }
    k256::SecretKey::from_slice(bytes).map_err(|_| EciesError::InvalidKeySize {
        expected: 32,
        actual: bytes.len(),
    })
}

/// Reconstruct a public key from the 64-byte envelope encoding (uncompressed
/// point with the `0x04` tag byte implied by the envelope's type byte).
pub fn public_key_from_envelope_bytes(epk: &[u8; UNCOMPRESSED_POINT_LEN]) -> EciesResult<k256::PublicKey> {
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..].copy_from_slice(epk);
    parse_public_key(&sec1)
}

/// ECDH: `sk_local · pk_remote`. Fails when `pk_remote` does not parse as a
/// point on the curve (callers typically pre-parse it; kept as a hard
/// invariant here since a bad point must never silently proceed).
pub fn derive_shared(sk_local: &k256::SecretKey, pk_remote: &k256::PublicKey) -> Zeroizing<[u8; 32]> {
    let shared = diffie_hellman(sk_local.to_nonzero_scalar(), pk_remote.as_affine());
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    out
}

/// HKDF-SHA-256 over a shared secret, with optional context-binding `info`.
/// Output is always 32 bytes (an AES-256 key).
pub fn kdf(shared_secret: &[u8], info: Option<&[u8]>) -> Zeroizing<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    // A fixed-size output from a 32-byte PRK never fails to expand.
    hk.expand(info.unwrap_or(&[]), out.as_mut_slice())
        .expect("32-byte HKDF-SHA256 expand with a valid PRK cannot fail");
    out
}

/// AES-256-GCM encrypt. Returns `(ciphertext, tag)` with the tag appended by
/// the underlying crate — split here so callers can lay out their own wire
/// format (envelopes store `tag` before `ciphertext`).
pub fn aead_encrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
    aad: Option<&[u8]>,
) -> EciesResult<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EciesError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })?;
    let nonce = Nonce::from_slice(iv);
    let payload = aes_gcm::aead::Payload {
        msg: plaintext,
        aad: aad.unwrap_or(&[]),
    };
    let mut sealed = cipher
        .encrypt(nonce, payload)
        .map_err(|_| EciesError::DecryptionFailed)?;
    let tag_start = sealed.len() - TAG_LEN;
    let tag_bytes = sealed.split_off(tag_start);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);
    Ok((sealed, tag))
}

/// AES-256-GCM decrypt from a separated `(ciphertext, tag)` pair. Fails with
/// [`EciesError::DecryptionFailed`] on any AEAD integrity failure — never
/// returns a partial plaintext.
pub fn aead_decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
    aad: Option<&[u8]>,
) -> EciesResult<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EciesError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })?;
    let nonce = Nonce::from_slice(iv);
    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);
    let payload = aes_gcm::aead::Payload {
        msg: &sealed,
        aad: aad.unwrap_or(&[]),
    };
    let plaintext = cipher
        .decrypt(nonce, payload)
        .map_err(|_| EciesError::DecryptionFailed)?;
    sealed.zeroize();
    Ok(Zeroizing::new(plaintext))
}

/// Generate a fresh secp256k1 keypair. Callers needing deterministic wallet
/// derivation use the external wallet collaborator instead.
pub fn generate_keypair() -> KeyPair {
    KeyPair::generate()
}

/// ECDSA-SHA-256 sign over an arbitrary message.
pub fn sign(sk: &k256::SecretKey, message: &[u8]) -> Signature {
    let signing_key = SigningKey::from(sk);
    signing_key.sign(message)
}

/// ECDSA-SHA-256 verify.
pub fn verify(pk: &k256::PublicKey, message: &[u8], signature: &Signature) -> bool {
    let verifying_key = VerifyingKey::from(pk);
    verifying_key.verify(message, signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdh_is_symmetric() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let s1 = derive_shared(&a.secret_key, &b.public_key);
        let s2 = derive_shared(&b.secret_key, &a.public_key);
        assert_eq!(*s1, *s2);
    }

    #[test]
    fn aead_roundtrip() {
        let key = [0x11u8; KEY_LEN];
        let iv = [0x22u8; IV_LEN];
        let pt = b"hello world";
        let (ct, tag) = aead_encrypt(&key, &iv, pt, Some(b"aad")).unwrap();
        let recovered = aead_decrypt(&key, &iv, &ct, &tag, Some(b"aad")).unwrap();
        assert_eq!(&*recovered, pt);
    }

    #[test]
    fn aead_wrong_aad_fails() {
        let key = [0x11u8; KEY_LEN];
        let iv = [0x22u8; IV_LEN];
        let pt = b"hello world";
        let (ct, tag) = aead_encrypt(&key, &iv, pt, Some(b"aad")).unwrap();
        assert!(aead_decrypt(&key, &iv, &ct, &tag, Some(b"other")).is_err());
    }

    #[test]
    fn sign_verify_roundtrip() {
        let kp = KeyPair::generate();
        let sig = sign(&kp.secret_key, b"message");
        assert!(verify(&kp.public_key, b"message", &sig));
        assert!(!verify(&kp.public_key, b"tampered", &sig));
    }
}
