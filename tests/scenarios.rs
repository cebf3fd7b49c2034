// Integration tests: end-to-end scenarios and cross-module properties not
// already covered by inline unit tests.

use std::time::Instant;

use ecies_core::guid::Guid;
use ecies_core::id_provider::{IdProvider, ObjectIdProvider};
use ecies_core::multi::{decrypt_multi, encrypt_multi, Recipient};
use ecies_core::primitives::KeyPair;
use ecies_core::streaming::{decrypt_stream, encrypt_stream, CancelToken};
use ecies_core::{EciesError, Registry};

#[test]
fn scenario_4_guid_nil() {
    let guid = Guid::from_dashed_hex("00000000-0000-0000-0000-000000000000").unwrap();
    assert_eq!(guid.version(), None);
    assert!(guid.is_nil());
    assert_eq!(guid.to_base64(), "AAAAAAAAAAAAAAAAAAAAAA==");
}

#[test]
fn scenario_5_streaming_2_5mb() {
    let kp = KeyPair::generate();
    let mut plaintext = vec![0u8; 2_621_440];
    for (i, byte) in plaintext.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }

    let cancel = CancelToken::new();
    let mut encrypted = Vec::new();
    // "arbitrary chunk sizes" on the read side: use an odd, non-power-of-two
    // block size to exercise a non-aligned final chunk.
    encrypt_stream(&kp.public_key_uncompressed(), &plaintext[..], &mut encrypted, 1024, &cancel).unwrap();

    let mut decrypted = Vec::new();
    decrypt_stream(&kp.secret_key.to_bytes(), &encrypted[..], &mut decrypted, 1024, &cancel).unwrap();

    assert_eq!(decrypted, plaintext);
}

#[test]
fn scenario_6_cancellation_after_five_chunks() {
    struct CountingReader<'a> {
        data: &'a [u8],
        offset: usize,
        chunks_served: usize,
        cancel: CancelToken,
        trip_after: usize,
    }

    impl<'a> std::io::Read for CountingReader<'a> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.offset >= self.data.len() {
                return Ok(0);
            }
            let n = buf.len().min(self.data.len() - self.offset);
            buf[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
            self.offset += n;
            self.chunks_served += 1;
            if self.chunks_served >= self.trip_after {
                self.cancel.cancel();
            }
            Ok(n)
        }
    }

    let kp = KeyPair::generate();
    let plaintext = vec![0x7Eu8; 1024 * 20];
    let cancel = CancelToken::new();
    let reader = CountingReader {
        data: &plaintext,
        offset: 0,
        chunks_served: 0,
        cancel: cancel.clone(),
        trip_after: 5,
    };

    let mut out = Vec::new();
    let result = encrypt_stream(&kp.public_key_uncompressed(), reader, &mut out, 1024, &cancel);
    assert!(matches!(result, Err(EciesError::Aborted)));
}

#[test]
fn round_trip_multi_across_recipient_counts() {
    for n in [1usize, 2, 5, 16] {
        let keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        let recipients: Vec<Recipient> = keys
            .iter()
            .enumerate()
            .map(|(i, kp)| {
                let mut id = vec![0u8; 12];
                id[8..12].copy_from_slice(&(i as u32).to_be_bytes());
                Recipient {
                    id,
                    public_key: kp.public_key_uncompressed().to_vec(),
                }
            })
            .collect();

        let envelope = encrypt_multi(&recipients, 12, 1000, b"shared payload").unwrap();
        for (i, kp) in keys.iter().enumerate() {
            let pt = decrypt_multi(&recipients[i].id, &kp.secret_key.to_bytes(), 12, &envelope).unwrap();
            assert_eq!(pt, b"shared payload");
        }
    }
}

#[test]
fn guid_five_way_round_trip_many_random_v4() {
    for _ in 0..500 {
        let guid = Guid::new_v4();
        let dashed = guid.to_dashed_hex();
        let short = guid.to_short_hex();
        let b64 = guid.to_base64();
        let b64url = guid.to_base64_urlsafe();
        let as_u128 = guid.to_u128();

        assert_eq!(Guid::from_dashed_hex(&dashed).unwrap(), guid);
        assert_eq!(Guid::from_short_hex(&short).unwrap(), guid);
        assert_eq!(Guid::from_base64(&b64).unwrap(), guid);
        assert_eq!(Guid::from_base64_urlsafe(&b64url).unwrap(), guid);
        assert_eq!(Guid::from_u128(as_u128), guid);
    }
}

#[test]
fn serialise_deserialise_identity_object_id() {
    let provider = ObjectIdProvider;
    for _ in 0..1000 {
        let id = provider.generate();
        let round_tripped = provider.id_from_string(&provider.id_to_string(&id)).unwrap();
        assert_eq!(id, round_tripped);
    }
}

#[test]
fn invariant_enforcement_end_to_end() {
    let registry = Registry::new();
    let mut config = ecies_core::Config::defaults();
    config.member_id_length = 99; // idProvider.byteLength for guid-v4 is 16
    match registry.init("bad", config) {
        Err(EciesError::InvariantViolation(msg)) => {
            assert!(msg.contains("RecipientIdConsistency"));
        }
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
}

#[test]
fn constant_time_equality_is_not_grossly_data_dependent() {
    use ecies_core::id_provider::constant_time_eq;

    let a = [0x11u8; 16];
    let mut b_last_byte_differs = a;
    b_last_byte_differs[15] ^= 0xFF;
    let c_all_differ = [0x22u8; 16];

    let time_one_diff = {
        let start = Instant::now();
        for _ in 0..10_000 {
            std::hint::black_box(constant_time_eq(&a, &b_last_byte_differs));
        }
        start.elapsed()
    };
    let time_all_diff = {
        let start = Instant::now();
        for _ in 0..10_000 {
            std::hint::black_box(constant_time_eq(&a, &c_all_differ));
        }
        start.elapsed()
    };

    // A constant-time comparison should not show an order-of-magnitude skew
    // between these two cases; this is a coarse sanity check, not a formal
    // timing-channel proof.
    let ratio = time_one_diff.as_secs_f64() / time_all_diff.as_secs_f64().max(1e-12);
    assert!(ratio < 3.0 && ratio > 1.0 / 3.0, "ratio was {ratio}");
}

#[test]
fn streaming_alignment_across_block_sizes() {
    let kp = KeyPair::generate();
    let plaintext: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
    for block_size in [128usize, 256, 1024, 4096] {
        let cancel = CancelToken::new();
        let mut encrypted = Vec::new();
        encrypt_stream(&kp.public_key_uncompressed(), &plaintext[..], &mut encrypted, block_size, &cancel)
            .unwrap();
        let mut decrypted = Vec::new();
        decrypt_stream(&kp.secret_key.to_bytes(), &encrypted[..], &mut decrypted, block_size, &cancel).unwrap();
        assert_eq!(decrypted, plaintext, "mismatch at block_size {block_size}");
    }
}
