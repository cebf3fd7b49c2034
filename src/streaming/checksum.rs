// ── Streaming Checksum ───────────────────────────────────────────────────
// Rolling SHA3-512 digest over a reader, chunked and cancellable.

use std::io::Read;

use sha3::{Digest, Sha3_512};

use super::CancelToken;
use crate::error::{EciesError, EciesResult};

/// Length of the digest produced by [`checksum_stream`].
pub const CHECKSUM_LEN: usize = 64;

/// Compute the SHA3-512 digest of `reader`'s entire contents, reading in
/// `chunk_size`-byte pieces and checking `cancel` once per chunk.
pub fn checksum_stream<R: Read>(
    mut reader: R,
    chunk_size: usize,
    cancel: &CancelToken,
) -> EciesResult<[u8; CHECKSUM_LEN]> {
    let mut hasher = Sha3_512::new();
    let mut buf = vec![0u8; chunk_size];

    loop {
        if cancel.is_cancelled() {
            return Err(EciesError::Aborted);
        }
        let n = reader
            .read(&mut buf)
            .map_err(|e| EciesError::with_source_data(format!("stream read failed: {e}"), 0, &[]))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hasher.finalize());
    Ok(out)
}

/// Verify that `data`'s digest matches `expected`, in constant time.
pub fn verify_checksum(data: &[u8], expected: &[u8; CHECKSUM_LEN]) -> EciesResult<()> {
    let actual = checksum_stream(data, data.len().max(1), &CancelToken::new())?;
    if crate::id_provider::constant_time_eq(&actual, expected) {
        Ok(())
    } else {
        Err(EciesError::DecryptedValueChecksumMismatch)
    }
}
