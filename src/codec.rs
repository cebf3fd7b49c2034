// ── Single-recipient ECIES Codec ────────────────────────────────────────────
// Basic envelope: 0x04 ‖ Epk(64) ‖ iv(12) ‖ tag(16) ‖ ct(|pt|)
// Length-prefixed: len(4, BE) ‖ Basic

use crate::error::{EciesError, EciesResult};
use crate::primitives::{self, IV_LEN, TAG_LEN, UNCOMPRESSED_POINT_LEN};

/// Type byte identifying a basic single-recipient envelope.
pub const ENVELOPE_TYPE_BASIC: u8 = 0x04;

/// Fixed overhead added by [`encrypt_basic`]: type byte + ephemeral pubkey +
/// IV + AEAD tag.
pub const BASIC_OVERHEAD: usize = 1 + UNCOMPRESSED_POINT_LEN + IV_LEN + TAG_LEN;

/// Fixed overhead added by [`encrypt_length_prefixed`]: a basic envelope
/// plus its 4-byte big-endian length prefix.
pub const LENGTH_PREFIXED_OVERHEAD: usize = BASIC_OVERHEAD + 4;

/// Encrypted length for a plaintext of `plaintext_len` bytes, basic envelope.
pub fn encrypted_len_basic(plaintext_len: usize) -> usize {
    plaintext_len + BASIC_OVERHEAD
}

/// Encrypted length for a plaintext of `plaintext_len` bytes, length-prefixed
/// envelope. The streaming encoder (`streaming::encrypt`) uses this to size
/// its output chunks.
pub fn encrypted_len_length_prefixed(plaintext_len: usize) -> usize {
    plaintext_len + LENGTH_PREFIXED_OVERHEAD
}

/// Encrypt `plaintext` for `recipient_pk` (33- or 65-byte SEC1 encoding),
/// producing a basic envelope.
pub fn encrypt_basic(recipient_pk: &[u8], plaintext: &[u8]) -> EciesResult<Vec<u8>> {
    let pk = primitives::parse_public_key(recipient_pk)?;
    let ephemeral = primitives::generate_keypair();
    let shared = primitives::derive_shared(&ephemeral.secret_key, &pk);
    let key = primitives::kdf(&*shared, None);

    let mut iv = [0u8; IV_LEN];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut iv);

    let (ct, tag) = primitives::aead_encrypt(&key, &iv, plaintext, None)?;

    let epk = ephemeral.public_key_uncompressed();
    let mut out = Vec::with_capacity(encrypted_len_basic(plaintext.len()));
    out.push(ENVELOPE_TYPE_BASIC);
    out.extend_from_slice(&epk[1..]); // drop the 0x04 SEC1 tag, implied by the envelope type byte
    out.extend_from_slice(&iv);
    out.extend_from_slice(&tag);
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Decrypt a basic envelope with `sk` (32-byte scalar).
pub fn decrypt_basic(sk: &[u8], envelope: &[u8]) -> EciesResult<Vec<u8>> {
    if envelope.len() < BASIC_OVERHEAD {
        return Err(EciesError::with_source_data(
            "envelope shorter than basic overhead",
            0,
            envelope,
        ));
    }
    if envelope[0] != ENVELOPE_TYPE_BASIC {
        log::warn!("[codec] unexpected envelope type byte {:#04x}", envelope[0]);
        return Err(EciesError::InvalidEnvelopeVersion(envelope[0]));
    }

    let mut offset = 1;
    let epk_bytes: [u8; UNCOMPRESSED_POINT_LEN] = envelope[offset..offset + UNCOMPRESSED_POINT_LEN]
        .try_into()
        .expect("slice length checked above");
    offset += UNCOMPRESSED_POINT_LEN;

    let iv: [u8; IV_LEN] = envelope[offset..offset + IV_LEN].try_into().unwrap();
    offset += IV_LEN;

    let tag: [u8; TAG_LEN] = envelope[offset..offset + TAG_LEN].try_into().unwrap();
    offset += TAG_LEN;

    let ct = &envelope[offset..];

    let epk = primitives::public_key_from_envelope_bytes(&epk_bytes)?;
    let sk = primitives::parse_secret_key(sk)?;
    let shared = primitives::derive_shared(&sk, &epk);
    let key = primitives::kdf(&*shared, None);

    primitives::aead_decrypt(&key, &iv, ct, &tag, None).map(|pt| pt.to_vec())
}

/// Encrypt and wrap with a 4-byte big-endian length prefix, so concatenated
/// blocks in a stream can be decoded without per-block framing.
pub fn encrypt_length_prefixed(recipient_pk: &[u8], plaintext: &[u8]) -> EciesResult<Vec<u8>> {
    let basic = encrypt_basic(recipient_pk, plaintext)?;
    let mut out = Vec::with_capacity(4 + basic.len());
    out.extend_from_slice(&(basic.len() as u32).to_be_bytes());
    out.extend_from_slice(&basic);
    Ok(out)
}

/// Decode one length-prefixed envelope from the start of `data`, returning
/// the decrypted plaintext and the number of bytes consumed from `data`.
pub fn decrypt_length_prefixed(sk: &[u8], data: &[u8]) -> EciesResult<(Vec<u8>, usize)> {
    if data.len() < 4 {
        return Err(EciesError::with_source_data(
            "truncated length prefix",
            0,
            data,
        ));
    }
    let len = u32::from_be_bytes(data[..4].try_into().unwrap()) as usize;
    let total = 4 + len;
    if data.len() < total {
        return Err(EciesError::with_source_data(
            "truncated envelope body",
            4,
            data,
        ));
    }
    let plaintext = decrypt_basic(sk, &data[4..total])?;
    Ok((plaintext, total))
}
