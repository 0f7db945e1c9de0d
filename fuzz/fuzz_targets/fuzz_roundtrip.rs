#![no_main]

use libfuzzer_sys::fuzz_target;
use lz11::{decompress, CompressConfig, Compressor, SearchStrategy};

fuzz_target!(|data: &[u8]| {
    // First byte picks the configuration, the rest is the payload
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };

    let config = CompressConfig {
        strategy: if selector & 1 == 0 {
            SearchStrategy::HashChain
        } else {
            SearchStrategy::Exhaustive
        },
        allow_overlap: selector & 2 != 0,
    };

    let compressed = Compressor::new(config.clone()).compress(payload).unwrap();
    let restored = decompress(&compressed).unwrap();
    assert_eq!(restored, payload);

    // Both strategies must agree byte for byte
    let other = CompressConfig {
        strategy: match config.strategy {
            SearchStrategy::HashChain => SearchStrategy::Exhaustive,
            SearchStrategy::Exhaustive => SearchStrategy::HashChain,
        },
        ..config
    };
    assert_eq!(Compressor::new(other).compress(payload).unwrap(), compressed);
});
