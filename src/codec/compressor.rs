use crate::error::{try_alloc, Result};
use crate::format::Lz11Header;
use crate::lz::{encode_greedy, ExhaustiveFinder, HashChainFinder, SearchStrategy, TokenEncoder};
use crate::{Codec, CodecStats, CompressConfig};
use log::debug;

/// Whole-buffer LZ11 compressor
#[derive(Clone, Debug, Default)]
pub struct Compressor {
    config: CompressConfig,
}

impl Compressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressConfig {
        &self.config
    }

    /// Compress `data` into a complete LZ11 stream (header included)
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.compress_with_stats(data).map(|(out, _)| out)
    }

    pub fn compress_with_stats(&self, data: &[u8]) -> Result<(Vec<u8>, CodecStats)> {
        let header = Lz11Header::for_size(data.len())?;

        // Starting guess only; the encoder grows the buffer as needed
        let mut output = try_alloc(header.header_len + data.len() / 2 + 64)?;
        header.write_to(&mut output);

        let mut encoder = TokenEncoder::new(output);
        let overlap = self.config.allow_overlap;
        match self.config.strategy {
            SearchStrategy::Exhaustive => {
                encode_greedy(data, &mut ExhaustiveFinder::new(overlap), &mut encoder)?
            }
            SearchStrategy::HashChain => {
                encode_greedy(data, &mut HashChainFinder::new(overlap), &mut encoder)?
            }
        }

        let stats = CodecStats {
            input_bytes: data.len() as u64,
            output_bytes: encoder.len() as u64,
            literals: encoder.literals(),
            matches: encoder.matches(),
            trailing_bytes: 0,
        };
        debug!(
            "compressed {} -> {} bytes ({:?}, overlap={})",
            stats.input_bytes, stats.output_bytes, self.config.strategy, overlap
        );

        Ok((encoder.finish(), stats))
    }
}

impl Codec for Compressor {
    fn process(&self, input: &[u8]) -> Result<(Vec<u8>, CodecStats)> {
        self.compress_with_stats(input)
    }
}
