// ── Multi-recipient Processor ────────────────────────────────────────────────
// Amortises one AEAD payload encryption across many recipients.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::header::{self, HeaderFixed, HEADER_PREFIX_LEN};
use crate::error::{EciesError, EciesResult};
use crate::primitives::{self, IV_LEN, KEY_LEN, TAG_LEN};

/// One recipient to encrypt for: an identifier (exactly `id_len` bytes, the
/// configuration-wide `B`) and their SEC1-encoded public key.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Encrypt `plaintext` for every recipient in `recipients`, amortising one
/// AEAD payload encryption. `id_len` is the configuration-wide identifier
/// byte length `B`; every recipient id must be exactly that long.
/// `max_recipients` bounds `recipients.len()`.
pub fn encrypt_multi(
    recipients: &[Recipient],
    id_len: usize,
    max_recipients: u16,
    plaintext: &[u8],
) -> EciesResult<Vec<u8>> {
    if recipients.is_empty() {
        return Err(EciesError::InvariantViolation(
            "recipientCount must not be zero".into(),
        ));
    }
    if recipients.len() > max_recipients as usize || recipients.len() > u16::MAX as usize {
        return Err(EciesError::TooManyRecipients {
            count: recipients.len(),
            max: max_recipients as usize,
        });
    }
    for r in recipients {
        if r.id.len() != id_len {
            return Err(EciesError::InvariantViolation(format!(
                "RecipientIdConsistency: recipient id is {} bytes, configured idProvider.byteLength is {}",
                r.id.len(),
                id_len
            )));
        }
    }

    // Sort by id (byte-wise lexicographic) for deterministic envelope bytes
    // and to let decoders binary-search. Reject duplicate ids up front.
    let mut sorted: Vec<&Recipient> = recipients.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    for pair in sorted.windows(2) {
        if pair[0].id == pair[1].id {
            return Err(EciesError::InvariantViolation(format!(
                "duplicate recipient id {:02x?}",
                pair[0].id
            )));
        }
    }

    let recipient_count = sorted.len() as u16;

    // headerPrefix = magic ‖ version ‖ type ‖ recipientCount — computable
    // before the payload is encrypted, since it only depends on the count.
    let mut header_prefix = Vec::with_capacity(HEADER_PREFIX_LEN);
    header_prefix.extend_from_slice(&header::MAGIC);
    header_prefix.push(header::VERSION);
    header_prefix.push(header::TYPE_MULTI);
    header_prefix.extend_from_slice(&recipient_count.to_be_bytes());

    let symmetric_key = Zeroizing::new(random_key());
    let ephemeral = primitives::generate_keypair();

    let mut payload_iv = [0u8; IV_LEN];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut payload_iv);

    let (ciphertext, payload_tag) =
        primitives::aead_encrypt(&symmetric_key, &payload_iv, plaintext, Some(&header_prefix))?;

    let fixed = HeaderFixed {
        recipient_count,
        payload_iv,
        payload_tag,
        ephemeral_pk: ephemeral.public_key_uncompressed(),
    };
    let mut out = header::encode_fixed(&fixed);

    for recipient in &sorted {
        let pk = primitives::parse_public_key(&recipient.public_key)?;
        let shared = primitives::derive_shared(&ephemeral.secret_key, &pk);
        let k_i = primitives::kdf(&*shared, Some(&recipient.id));
        let iv_i = recipient_iv(&header_prefix, &recipient.id);
        let (wrapped, tag_i) = primitives::aead_encrypt(&k_i, &iv_i, &symmetric_key, None)?;

        out.extend_from_slice(&recipient.id);
        out.extend_from_slice(&tag_i);
        out.extend_from_slice(&wrapped);
    }

    out.extend_from_slice(&ciphertext);
    log::debug!("[multi] built header for {recipient_count} recipients, envelope {} bytes", out.len());
    Ok(out)
}

/// Decrypt a multi-recipient envelope for the holder of `(id, sk)`.
pub fn decrypt_multi(id: &[u8], sk: &[u8], id_len: usize, envelope: &[u8]) -> EciesResult<Vec<u8>> {
    if id.len() != id_len {
        return Err(EciesError::InvariantViolation(format!(
            "RecipientIdConsistency: lookup id is {} bytes, configured idProvider.byteLength is {}",
            id.len(),
            id_len
        )));
    }

    let (fixed, table_offset) = header::decode_fixed(envelope)?;
    let entry_len = header::entry_len(id_len);
    let table_len = entry_len * fixed.recipient_count as usize;
    if envelope.len() < table_offset + table_len {
        return Err(EciesError::with_source_data(
            "envelope shorter than recipient table",
            table_offset,
            envelope,
        ));
    }

    let header_prefix = &envelope[..HEADER_PREFIX_LEN];
    let table = &envelope[table_offset..table_offset + table_len];

    let entry = binary_search_entry(table, id, id_len, entry_len).ok_or_else(|| {
        log::warn!("[multi] recipient id not found among {} entries", fixed.recipient_count);
        EciesError::RecipientNotFound
    })?;

    let tag_i: [u8; TAG_LEN] = entry[id_len..id_len + TAG_LEN].try_into().unwrap();
    let wrapped = &entry[id_len + TAG_LEN..];

    let sk = primitives::parse_secret_key(sk)?;
    let epk = primitives::parse_public_key(&fixed.ephemeral_pk)?;
    let shared = primitives::derive_shared(&sk, &epk);
    let k_i = primitives::kdf(&*shared, Some(id));
    let iv_i = recipient_iv(header_prefix, id);

    let symmetric_key_vec = primitives::aead_decrypt(&k_i, &iv_i, wrapped, &tag_i, None)?;
    if symmetric_key_vec.len() != KEY_LEN {
        return Err(EciesError::InvalidKeySize {
            expected: KEY_LEN,
            actual: symmetric_key_vec.len(),
        });
    }
    let mut symmetric_key = Zeroizing::new([0u8; KEY_LEN]);
    symmetric_key.copy_from_slice(&symmetric_key_vec);

    let payload = &envelope[table_offset + table_len..];
    primitives::aead_decrypt(
        &symmetric_key,
        &fixed.payload_iv,
        payload,
        &fixed.payload_tag,
        Some(header_prefix),
    )
    .map(|pt| pt.to_vec())
}

fn random_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Deterministic per-recipient IV: first 12 bytes of
/// SHA-256(headerPrefix ‖ id). Recomputable on decrypt without being stored.
fn recipient_iv(header_prefix: &[u8], id: &[u8]) -> [u8; IV_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(header_prefix);
    hasher.update(id);
    let digest = hasher.finalize();
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&digest[..IV_LEN]);
    iv
}

/// Binary-search the sorted recipient table for `id`, returning its entry
/// slice (`id ‖ tag ‖ wrapped`) if present.
fn binary_search_entry<'a>(
    table: &'a [u8],
    id: &[u8],
    id_len: usize,
    entry_len: usize,
) -> Option<&'a [u8]> {
    let count = table.len() / entry_len;
    let mut lo = 0usize;
    let mut hi = count;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let entry = &table[mid * entry_len..(mid + 1) * entry_len];
        match entry[..id_len].cmp(id) {
            std::cmp::Ordering::Equal => return Some(entry),
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::KeyPair;

    fn recipient(id: u8, id_len: usize, pk: &KeyPair) -> Recipient {
        let mut id_bytes = vec![0u8; id_len];
        id_bytes[id_len - 1] = id;
        Recipient {
            id: id_bytes,
            public_key: pk.public_key_uncompressed().to_vec(),
        }
    }

    #[test]
    fn three_way_roundtrip_and_fourth_recipient_fails() {
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let recipients: Vec<Recipient> = keys
            .iter()
            .enumerate()
            .map(|(i, kp)| recipient((i + 1) as u8, 12, kp))
            .collect();

        let envelope = encrypt_multi(&recipients, 12, 10, b"hello").unwrap();

        for (i, kp) in keys.iter().enumerate() {
            let id = recipients[i].id.clone();
            let pt = decrypt_multi(&id, &kp.secret_key.to_bytes(), 12, &envelope).unwrap();
            assert_eq!(pt, b"hello");
        }

        let intruder = KeyPair::generate();
        let fourth_id = {
            let mut v = vec![0u8; 12];
            v[11] = 4;
            v
        };
        let err = decrypt_multi(&fourth_id, &intruder.secret_key.to_bytes(), 12, &envelope)
            .unwrap_err();
        assert!(matches!(err, EciesError::RecipientNotFound));
    }

    #[test]
    fn wrong_size_id_rejected_as_invariant_violation() {
        let kp = KeyPair::generate();
        let recipients = vec![recipient(1, 16, &kp)];
        let err = encrypt_multi(&recipients, 12, 10, b"hello").unwrap_err();
        assert!(matches!(err, EciesError::InvariantViolation(msg) if msg.contains("RecipientIdConsistency")));
    }

    #[test]
    fn zero_recipients_rejected() {
        let err = encrypt_multi(&[], 12, 10, b"hello").unwrap_err();
        assert!(matches!(err, EciesError::InvariantViolation(_)));
    }

    #[test]
    fn too_many_recipients_rejected() {
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let recipients: Vec<Recipient> = keys
            .iter()
            .enumerate()
            .map(|(i, kp)| recipient((i + 1) as u8, 12, kp))
            .collect();
        let err = encrypt_multi(&recipients, 12, 2, b"hello").unwrap_err();
        assert!(matches!(err, EciesError::TooManyRecipients { count: 3, max: 2 }));
    }

    #[test]
    fn envelope_is_deterministic_under_fixed_rng_and_input_order() {
        // Determinism here means: given the SAME symmetric key/ephemeral/ivs
        // (which in production are random), the entry *ordering* in the
        // envelope is independent of input order because entries are
        // sorted by id. We check that property directly.
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let mut recipients: Vec<Recipient> = keys
            .iter()
            .enumerate()
            .map(|(i, kp)| recipient((i + 1) as u8, 12, kp))
            .collect();
        recipients.reverse();

        let envelope = encrypt_multi(&recipients, 12, 10, b"hello").unwrap();
        let (fixed, table_offset) = header::decode_fixed(&envelope).unwrap();
        let entry_len = header::entry_len(12);
        let mut last_id = vec![];
        for i in 0..fixed.recipient_count as usize {
            let entry = &envelope[table_offset + i * entry_len..table_offset + (i + 1) * entry_len];
            let id = entry[..12].to_vec();
            assert!(id > last_id, "entries must be sorted ascending by id");
            last_id = id;
        }
    }

    #[test]
    fn tampered_recipient_count_fails_payload_aad() {
        let keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        let recipients: Vec<Recipient> = keys
            .iter()
            .enumerate()
            .map(|(i, kp)| recipient((i + 1) as u8, 12, kp))
            .collect();
        let mut envelope = encrypt_multi(&recipients, 12, 10, b"hello").unwrap();
        // Flip a bit in the recipientCount field (bytes 4..6): this is bound
        // as AAD, so the payload tag must fail to verify afterwards.
        envelope[4] ^= 0xFF;
        let id = recipients[0].id.clone();
        let err = decrypt_multi(&id, &keys[0].secret_key.to_bytes(), 12, &envelope);
        assert!(err.is_err());
    }
}
