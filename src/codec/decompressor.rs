use crate::error::Result;
use crate::format::Lz11Header;
use crate::lz::TokenDecoder;
use crate::{Codec, CodecStats, DecompressConfig};
use log::debug;

/// Whole-buffer LZ11 decompressor
#[derive(Clone, Debug, Default)]
pub struct Decompressor {
    config: DecompressConfig,
}

impl Decompressor {
    pub fn new(config: DecompressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecompressConfig {
        &self.config
    }

    /// Decompress a complete LZ11 stream; bytes after the last token are ignored
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decompress_with_stats(data).map(|(out, _)| out)
    }

    pub fn decompress_with_stats(&self, data: &[u8]) -> Result<(Vec<u8>, CodecStats)> {
        let header = Lz11Header::parse_with_limit(data, self.config.effective_max_size())?;
        let body = &data[header.header_len..];

        let decoded = TokenDecoder::new(body, header.decompressed_size)?.decode()?;

        let stats = CodecStats {
            input_bytes: data.len() as u64,
            output_bytes: decoded.data.len() as u64,
            literals: decoded.literals,
            matches: decoded.matches,
            trailing_bytes: (body.len() - decoded.consumed) as u64,
        };
        debug!(
            "decompressed {} -> {} bytes ({} trailing)",
            stats.input_bytes, stats.output_bytes, stats.trailing_bytes
        );

        Ok((decoded.data, stats))
    }
}

impl Codec for Decompressor {
    fn process(&self, input: &[u8]) -> Result<(Vec<u8>, CodecStats)> {
        self.decompress_with_stats(input)
    }
}
