// ── Streaming XOR Fold ───────────────────────────────────────────────────
// Folds a reader's contents into a fixed-width accumulator by XOR-ing each
// byte into `accumulator[i % width]`. Cheap, non-cryptographic content
// fingerprint used where a full checksum is unnecessary.

use std::io::Read;

use super::CancelToken;
use crate::error::{EciesError, EciesResult};

/// XOR-fold `reader`'s entire contents into a `width`-byte accumulator.
/// `width` must be nonzero.
pub fn xor_fold_stream<R: Read>(
    mut reader: R,
    width: usize,
    chunk_size: usize,
    cancel: &CancelToken,
) -> EciesResult<Vec<u8>> {
    if width == 0 {
        return Err(EciesError::InvalidByteLengthParameter(width));
    }

    let mut accumulator = vec![0u8; width];
    let mut buf = vec![0u8; chunk_size];
    let mut position = 0usize;

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
        for &byte in &buf[..n] {
            accumulator[position % width] ^= byte;
            position += 1;
        }
    }

    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_deterministic() {
        let cancel = CancelToken::new();
        let a = xor_fold_stream(&b"abcdefgh"[..], 4, 3, &cancel).unwrap();
        let b = xor_fold_stream(&b"abcdefgh"[..], 4, 8, &cancel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_byte_width_is_total_xor() {
        let cancel = CancelToken::new();
        let folded = xor_fold_stream(&[1u8, 2, 3, 4][..], 1, 16, &cancel).unwrap();
        assert_eq!(folded, vec![1 ^ 2 ^ 3 ^ 4]);
    }

    #[test]
    fn rejects_zero_width() {
        let cancel = CancelToken::new();
        assert!(xor_fold_stream(&b"x"[..], 0, 16, &cancel).is_err());
    }
}
