// Facade coverage: golden vectors, determinism across worker counts, the
// tamper matrix, cancellation, reader-returning variants, parameter policy.

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use cryptainer_core::constants::{CHUNK_HEADER_LEN, FILE_HEADER_LEN};
    use cryptainer_core::crypto::{wrap_file_key_with_nonce, FileKey};
    use cryptainer_core::headers::HeaderError;
    use cryptainer_core::{
        CancellationToken, DecryptOptions, EncryptOptions, FileKeyMaterial, StreamCipher,
        StreamError,
    };

    const CHUNK_64K: usize = 64 * 1024;

    fn master_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    fn fixed_material() -> FileKeyMaterial {
        FileKeyMaterial {
            file_key: FileKey::from_bytes([0x5A; 32]),
            nonce_prefix: 0x0102_0304,
            file_key_nonce: [0x0B; 12],
        }
    }

    fn encrypt_all(cipher: &StreamCipher, data: &[u8], opts: &EncryptOptions) -> Vec<u8> {
        let mut input = Cursor::new(data.to_vec());
        let mut output = Vec::new();
        cipher
            .encrypt(&mut input, &mut output, opts, &CancellationToken::new())
            .unwrap();
        output
    }

    fn decrypt_all(
        cipher: &StreamCipher,
        data: &[u8],
        opts: &DecryptOptions,
    ) -> Result<Vec<u8>, StreamError> {
        let mut input = Cursor::new(data.to_vec());
        let mut output = Vec::new();
        cipher
            .decrypt(&mut input, &mut output, opts, &CancellationToken::new())
            .map(|_| output)
    }

    #[test]
    fn hello_roundtrip_with_golden_prefix() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = "Hello AES-GCM streaming!".as_bytes();

        let opts = EncryptOptions::sized(1_048_576, data.len() as u64);
        let encrypted = encrypt_all(&cipher, data, &opts);

        // Magic then the declared header length 76, little-endian.
        assert_eq!(
            &encrypted[..8],
            &[0x43, 0x54, 0x4E, 0x31, 0x4C, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encrypted.len(),
            FILE_HEADER_LEN + CHUNK_HEADER_LEN + data.len()
        );

        let decrypted = decrypt_all(&cipher, &encrypted, &DecryptOptions::strict()).unwrap();
        assert_eq!(decrypted, data);
    }

    #[test]
    fn multi_chunk_roundtrip_across_chunk_sizes() {
        let cipher = StreamCipher::new(master_key(), 3).unwrap();

        for chunk_size in [65_536usize, 131_072, 1_048_576] {
            let data_len = chunk_size * 2 + chunk_size / 2 + 123;
            let data: Vec<u8> = (0..data_len).map(|i| (i % 251) as u8).collect();

            let opts = EncryptOptions::sized(chunk_size, data_len as u64);
            let encrypted = encrypt_all(&cipher, &data, &opts);

            let chunks = data_len.div_ceil(chunk_size);
            assert_eq!(
                encrypted.len(),
                FILE_HEADER_LEN + chunks * CHUNK_HEADER_LEN + data_len,
                "chunk_size {chunk_size}"
            );

            let decrypted =
                decrypt_all(&cipher, &encrypted, &DecryptOptions::strict()).unwrap();
            assert_eq!(decrypted, data, "chunk_size {chunk_size}");
        }
    }

    #[test]
    fn snapshot_reports_chunk_and_byte_totals() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x77u8; CHUNK_64K + 100];

        let mut input = Cursor::new(data.clone());
        let mut output = Vec::new();
        let snapshot = cipher
            .encrypt(
                &mut input,
                &mut output,
                &EncryptOptions::with_chunk_size(CHUNK_64K),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(snapshot.chunks, 2);
        assert_eq!(snapshot.bytes_plaintext, data.len() as u64);
        assert_eq!(snapshot.bytes_ciphertext, data.len() as u64);
        assert_eq!(
            snapshot.bytes_overhead,
            (FILE_HEADER_LEN + 2 * CHUNK_HEADER_LEN) as u64
        );
        assert!(snapshot.to_json().contains("\"chunks\":2"));
    }

    #[test]
    fn deterministic_output_for_fixed_material_across_worker_counts() {
        let data: Vec<u8> = (0..400_000usize).map(|i| (i % 256) as u8).collect();
        let opts = EncryptOptions::sized(CHUNK_64K, data.len() as u64);

        let mut outputs = Vec::new();
        for threads in [2usize, 8] {
            let cipher = StreamCipher::with_threads(master_key(), 7, threads).unwrap();
            let mut input = Cursor::new(data.clone());
            let mut output = Vec::new();
            cipher
                .encrypt_with_material(
                    fixed_material(),
                    &mut input,
                    &mut output,
                    &opts,
                    &CancellationToken::new(),
                )
                .unwrap();
            outputs.push(output);
        }

        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn file_header_bytes_are_pinned_for_fixed_material() {
        let cipher = StreamCipher::with_threads(master_key(), 7, 2).unwrap();
        let data = b"pinned header vector";
        let opts = EncryptOptions::sized(CHUNK_64K, data.len() as u64);

        let mut input = Cursor::new(data.to_vec());
        let mut output = Vec::new();
        cipher
            .encrypt_with_material(
                fixed_material(),
                &mut input,
                &mut output,
                &opts,
                &CancellationToken::new(),
            )
            .unwrap();

        let material = fixed_material();
        let wrapped =
            wrap_file_key_with_nonce(&master_key(), 7, &material.file_key, material.file_key_nonce)
                .unwrap();

        let header = &output[..FILE_HEADER_LEN];
        assert_eq!(&header[0..4], b"CTN1");
        assert_eq!(&header[4..8], &76u32.to_le_bytes());
        assert_eq!(&header[8..16], &(data.len() as u64).to_le_bytes());
        assert_eq!(&header[16..20], &7u32.to_le_bytes());
        assert_eq!(&header[20..24], &material.nonce_prefix.to_le_bytes());
        assert_eq!(&header[24..36], &material.file_key_nonce);
        assert_eq!(&header[36..52], &wrapped.tag);
        assert_eq!(&header[52..84], &wrapped.key);
    }

    #[test]
    fn flipped_ciphertext_byte_fails_authentication_with_empty_output() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x31u8; CHUNK_64K];
        let mut encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));

        // First byte of the first chunk's ciphertext.
        encrypted[FILE_HEADER_LEN + CHUNK_HEADER_LEN] ^= 0x01;

        let mut input = Cursor::new(encrypted);
        let mut output = Vec::new();
        let err = cipher
            .decrypt(
                &mut input,
                &mut output,
                &DecryptOptions::default(),
                &CancellationToken::new(),
            )
            .unwrap_err();

        assert!(err.is_authentication_failure());
        assert!(output.is_empty());
    }

    #[test]
    fn flipped_tag_byte_fails_authentication() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x32u8; CHUNK_64K];
        let mut encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));

        // Inside the first chunk header's tag field.
        encrypted[FILE_HEADER_LEN + 21] ^= 0x01;

        let err = decrypt_all(&cipher, &encrypted, &DecryptOptions::default()).unwrap_err();
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn tampered_key_id_is_rejected_before_unwrap() {
        let cipher = StreamCipher::new(master_key(), 3).unwrap();
        let data = vec![0x33u8; 1000];
        let mut encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));

        encrypted[16..20].copy_from_slice(&999u32.to_le_bytes());

        let mut input = Cursor::new(encrypted);
        let mut output = Vec::new();
        let err = cipher
            .decrypt(
                &mut input,
                &mut output,
                &DecryptOptions::default(),
                &CancellationToken::new(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            StreamError::Header(HeaderError::KeyIdMismatch {
                have: 999,
                need: 3
            })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn tampered_wrapped_key_fails_authentication() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x34u8; 1000];
        let mut encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));

        // Inside the wrapped file key field.
        encrypted[60] ^= 0x01;

        let err = decrypt_all(&cipher, &encrypted, &DecryptOptions::default()).unwrap_err();
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn wrong_master_key_fails_authentication() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x35u8; 1000];
        let encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));

        let mut other = master_key();
        other[31] ^= 0x80;
        let wrong = StreamCipher::new(other, 7).unwrap();

        let err = decrypt_all(&wrong, &encrypted, &DecryptOptions::default()).unwrap_err();
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn precancelled_operations_fail_without_output() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut input = Cursor::new(vec![0u8; CHUNK_64K]);
        let mut output = Vec::new();
        let err = cipher
            .encrypt(
                &mut input,
                &mut output,
                &EncryptOptions::with_chunk_size(CHUNK_64K),
                &cancel,
            )
            .unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
        assert!(output.len() <= FILE_HEADER_LEN);

        let encrypted = encrypt_all(
            &cipher,
            b"some data",
            &EncryptOptions::with_chunk_size(CHUNK_64K),
        );
        let mut input = Cursor::new(encrypted);
        let mut output = Vec::new();
        let err = cipher
            .decrypt(&mut input, &mut output, &DecryptOptions::default(), &cancel)
            .unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
        assert!(output.is_empty());
    }

    #[test]
    fn reader_variants_roundtrip() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data: Vec<u8> = (0..200_000usize).map(|i| (i % 256) as u8).collect();

        let mut reader = cipher.encrypt_reader(
            Cursor::new(data.clone()),
            EncryptOptions::sized(CHUNK_64K, data.len() as u64),
            CancellationToken::new(),
        );
        let mut encrypted = Vec::new();
        reader.read_to_end(&mut encrypted).unwrap();

        let mut reader = cipher.decrypt_reader(
            Cursor::new(encrypted),
            DecryptOptions::strict(),
            CancellationToken::new(),
        );
        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).unwrap();

        assert_eq!(decrypted, data);
    }

    #[test]
    fn reader_surfaces_pipeline_error_as_io_error() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let data = vec![0x36u8; CHUNK_64K];
        let mut encrypted =
            encrypt_all(&cipher, &data, &EncryptOptions::with_chunk_size(CHUNK_64K));
        encrypted[FILE_HEADER_LEN + CHUNK_HEADER_LEN] ^= 0x01;

        let mut reader = cipher.decrypt_reader(
            Cursor::new(encrypted),
            DecryptOptions::default(),
            CancellationToken::new(),
        );
        let mut decrypted = Vec::new();
        let err = reader.read_to_end(&mut decrypted).unwrap_err();
        assert!(err.to_string().contains("tag mismatch"));
    }

    #[test]
    fn key_id_bounds_are_enforced() {
        assert!(matches!(
            StreamCipher::new(master_key(), 0),
            Err(StreamError::Header(HeaderError::InvalidKeyId { have: 0 }))
        ));
        assert!(StreamCipher::new(master_key(), i32::MAX as u32).is_ok());
        assert!(StreamCipher::new(master_key(), i32::MAX as u32 + 1).is_err());
    }

    #[test]
    fn chunk_size_bounds_are_enforced() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let mut input = Cursor::new(vec![0u8; 16]);
        let mut output = Vec::new();

        for chunk_size in [1024usize, 2 * 1024 * 1024 * 1024] {
            let err = cipher
                .encrypt(
                    &mut input,
                    &mut output,
                    &EncryptOptions::with_chunk_size(chunk_size),
                    &CancellationToken::new(),
                )
                .unwrap_err();
            assert!(matches!(err, StreamError::Validation(_)));
        }
    }

    #[test]
    fn truncated_file_header_is_unexpected_end() {
        let cipher = StreamCipher::new(master_key(), 7).unwrap();
        let err = decrypt_all(&cipher, &[0x43; 20], &DecryptOptions::default()).unwrap_err();
        assert!(matches!(err, StreamError::UnexpectedEnd { .. }));
    }
}
