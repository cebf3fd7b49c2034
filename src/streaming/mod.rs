// ── Streaming Transforms ─────────────────────────────────────────────────
// Chunked encrypt/decrypt/checksum/xor-fold over `Read`/`Write`, all
// cooperatively cancellable.

pub mod checksum;
pub mod decrypt;
pub mod encrypt;
pub mod xor_fold;

pub use checksum::checksum_stream;
pub use decrypt::decrypt_stream;
pub use encrypt::encrypt_stream;
pub use xor_fold::xor_fold_stream;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::EciesResult;

/// Default output block size `S` for streaming encrypt/decrypt: large enough
/// to amortize per-block envelope overhead, small enough to keep memory use
/// bounded regardless of input size.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Fill `buf` from `reader` as far as possible, stopping only at EOF (unlike
/// a single `read`, which may return short reads that aren't EOF).
pub(crate) fn read_fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> EciesResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .map_err(|e| crate::error::EciesError::with_source_data(format!("stream read failed: {e}"), 0, &[]))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// A cheaply-cloneable, shareable cancellation flag. Streaming operations
/// poll it once per chunk; setting it from another thread aborts the
/// operation at the next chunk boundary with [`crate::error::EciesError::Aborted`].
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
