//! End-to-end properties of the chunk/compress/decompress pipeline.

use huffzip::compression::{compress_buffer, decompress_buffer};
use huffzip::error::HuffzipError;

/// A deterministic pseudo-random buffer, so the tests need no RNG crate.
fn noisy(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

#[test]
fn roundtrip_across_buffers_and_chunk_sizes() {
    let buffers: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0],
        vec![7; 1000],
        b"aaaaabbbcc".to_vec(),
        b"If Peter Piper picked a peck of pickled peppers...".repeat(20),
        (0..=255u8).collect(),
        noisy(10_000),
    ];
    for buffer in &buffers {
        for chunk_size in [1, 3, 64, 4096, 1 << 20] {
            let packed = compress_buffer(buffer, chunk_size, 4).unwrap();
            let restored = decompress_buffer(&packed, 4).unwrap();
            assert_eq!(
                &restored, buffer,
                "round trip failed for {} bytes at chunk size {}",
                buffer.len(),
                chunk_size
            );
        }
    }
}

#[test]
fn archives_are_deterministic() {
    let data = noisy(50_000);
    let first = compress_buffer(&data, 4096, 1).unwrap();
    let second = compress_buffer(&data, 4096, 8).unwrap();
    // same chunk size: byte-identical archives regardless of pool size
    assert_eq!(first, second);
    let third = compress_buffer(&data, 4096, 8).unwrap();
    assert_eq!(second, third);
}

#[test]
fn repetitive_data_actually_shrinks() {
    let data = b"abab".repeat(25_000);
    let packed = compress_buffer(&data, 65536, 4).unwrap();
    assert!(packed.len() < data.len() / 2);
}

#[test]
fn invalid_configuration_surfaces() {
    assert!(matches!(
        compress_buffer(b"data", 0, 4),
        Err(HuffzipError::InvalidConfiguration(_))
    ));
}

#[test]
fn mangled_archive_is_rejected_not_misread() {
    let data = noisy(5_000);
    let packed = compress_buffer(&data, 512, 2).unwrap();

    // flip a byte somewhere in the chunk payloads
    let mut mangled = packed.clone();
    let target = mangled.len() - 3;
    mangled[target] ^= 0xff;
    match decompress_buffer(&mangled, 2) {
        // either the stream fails validation...
        Err(HuffzipError::CorruptStream(_)) => {}
        // ...or the flip landed where it still decodes to the declared
        // size; it must never grow or shrink the output
        Ok(restored) => assert_eq!(restored.len(), data.len()),
        Err(e) => panic!("unexpected error kind: {}", e),
    }

    // truncation is always caught
    assert!(decompress_buffer(&packed[..packed.len() - 1], 2).is_err());
}
