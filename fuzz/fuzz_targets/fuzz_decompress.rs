#![no_main]

use libfuzzer_sys::fuzz_target;
use lz11::{DecompressConfig, Decompressor};

fuzz_target!(|data: &[u8]| {
    // Keep allocations small so the fuzzer explores the token stream
    let decompressor = Decompressor::new(DecompressConfig { max_size: 1 << 16 });

    // Decoding may fail on invalid input - that's OK
    // We're looking for panics/crashes, not errors
    if let Ok(output) = decompressor.decompress(data) {
        let header = lz11::peek_header(data).unwrap();
        assert_eq!(output.len(), header.decompressed_size);
    }
});
