// ── Multi-recipient Envelope ────────────────────────────────────────────────
// One payload, encrypted once, with a per-recipient wrapped key for each
// entry in the header's recipient table.

pub mod header;
pub mod processor;

pub use header::{HeaderFixed, HEADER_PREFIX_LEN, MAGIC, VERSION};
pub use processor::{decrypt_multi, encrypt_multi, Recipient};
