// ── Streaming Decrypt ────────────────────────────────────────────────────
// Inverse of `streaming::encrypt`: reads back-to-back length-prefixed basic
// envelopes, decrypts each, writes plaintext.

use std::io::{Read, Write};

use zeroize::Zeroize;

use super::{read_fill, CancelToken};
use crate::codec;
use crate::error::{EciesError, EciesResult};

/// Decrypt a stream of length-prefixed envelopes produced by
/// [`super::encrypt_stream`] with the same `block_size` (`S`). Symmetric
/// with the encrypt side: consumes exactly `S` bytes per block (the final
/// block may be shorter), decoding the one envelope each block holds. Memory
/// use is bounded by `block_size` regardless of input size.
pub fn decrypt_stream<R: Read, W: Write>(
    sk: &[u8],
    mut reader: R,
    mut writer: W,
    block_size: usize,
    cancel: &CancelToken,
) -> EciesResult<u64> {
    if block_size <= codec::LENGTH_PREFIXED_OVERHEAD {
        return Err(EciesError::InvalidByteLengthParameter(block_size));
    }
    let mut buf = vec![0u8; block_size];
    let mut total_written = 0u64;

    loop {
        if cancel.is_cancelled() {
            buf.zeroize();
            return Err(EciesError::Aborted);
        }

        let n = read_fill(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }

        let (mut plaintext, consumed) = codec::decrypt_length_prefixed(sk, &buf[..n])?;
        if consumed != n {
            buf.zeroize();
            return Err(EciesError::with_source_data(
                "trailing bytes after envelope in block",
                consumed,
                &buf[..n],
            ));
        }
        writer
            .write_all(&plaintext)
            .map_err(|e| EciesError::with_source_data(format!("stream write failed: {e}"), 0, &[]))?;
        total_written += plaintext.len() as u64;
        plaintext.zeroize();

        if n < block_size {
            break;
        }
    }

    buf.zeroize();
    Ok(total_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::KeyPair;
    use crate::streaming::encrypt::encrypt_stream;

    #[test]
    fn empty_input_roundtrips_to_empty_output() {
        let kp = KeyPair::generate();
        let cancel = CancelToken::new();
        let mut encrypted = Vec::new();
        encrypt_stream(&kp.public_key_uncompressed(), &[][..], &mut encrypted, 4096, &cancel).unwrap();
        let mut decrypted = Vec::new();
        decrypt_stream(&kp.secret_key.to_bytes(), &encrypted[..], &mut decrypted, 4096, &cancel).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn tampered_stream_fails() {
        let kp = KeyPair::generate();
        let cancel = CancelToken::new();
        let mut encrypted = Vec::new();
        encrypt_stream(
            &kp.public_key_uncompressed(),
            &b"hello stream"[..],
            &mut encrypted,
            4096,
            &cancel,
        )
        .unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;
        let mut decrypted = Vec::new();
        assert!(decrypt_stream(&kp.secret_key.to_bytes(), &encrypted[..], &mut decrypted, 4096, &cancel).is_err());
    }
}
