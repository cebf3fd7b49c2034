// ── Streaming Encrypt ────────────────────────────────────────────────────
// Reads plaintext in fixed-size chunks, encrypts each as a length-prefixed
// basic envelope, writes the envelopes back to back.

use std::io::{Read, Write};

use zeroize::Zeroize;

use super::{read_fill, CancelToken};
use crate::codec;
use crate::error::{EciesError, EciesResult};

/// Encrypt `reader`'s entire contents for `recipient_pk`, writing
/// length-prefixed envelopes to `writer` that are exactly `block_size` (`S`)
/// bytes each, except for a possibly-shorter final block. `capacity = S -
/// overhead` plaintext bytes are read per block so every full emission lands
/// on the `S` boundary. Checked once per block against `cancel`; on
/// cancellation the in-flight plaintext buffer is zeroized before returning
/// [`EciesError::Aborted`].
pub fn encrypt_stream<R: Read, W: Write>(
    recipient_pk: &[u8],
    mut reader: R,
    mut writer: W,
    block_size: usize,
    cancel: &CancelToken,
) -> EciesResult<u64> {
    if block_size <= codec::LENGTH_PREFIXED_OVERHEAD {
        return Err(EciesError::InvalidByteLengthParameter(block_size));
    }
    let capacity = block_size - codec::LENGTH_PREFIXED_OVERHEAD;
    let mut buf = vec![0u8; capacity];
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

        let envelope = codec::encrypt_length_prefixed(recipient_pk, &buf[..n])?;
        debug_assert!(n < capacity || envelope.len() == block_size);
        writer
            .write_all(&envelope)
            .map_err(|e| EciesError::with_source_data(format!("stream write failed: {e}"), 0, &[]))?;
        total_written += envelope.len() as u64;

        if n < capacity {
            break;
        }
    }

    buf.zeroize();
    Ok(total_written)
}
