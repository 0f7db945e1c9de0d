pub mod codec;
pub mod error;
pub mod format;
pub mod lz;
pub mod texture;

pub use codec::{batch::BatchCodec, compressor::Compressor, decompressor::Decompressor};
pub use error::{Error, Result};
pub use format::{Lz11Header, MAX_DECOMPRESSED_SIZE};
pub use lz::{Lz11Token, SearchStrategy};
pub use texture::{decode_tileset, AlphaMode};

/// Configuration for compression
#[derive(Clone, Debug, Default)]
pub struct CompressConfig {
    /// How match candidates are enumerated (output is identical either way)
    pub strategy: SearchStrategy,
    /// Allow matches longer than their distance (self-overlapping runs).
    ///
    /// Off by default, which reproduces the reference encoder byte for byte.
    pub allow_overlap: bool,
}

/// Configuration for decompression
#[derive(Clone, Debug)]
pub struct DecompressConfig {
    /// Largest declared size to accept (capped at 8 MiB)
    pub max_size: usize,
}

impl DecompressConfig {
    /// The size limit actually enforced
    pub fn effective_max_size(&self) -> usize {
        self.max_size.min(MAX_DECOMPRESSED_SIZE)
    }
}

impl Default for DecompressConfig {
    fn default() -> Self {
        Self { max_size: MAX_DECOMPRESSED_SIZE }
    }
}

/// Configuration for batch processing
#[derive(Clone, Debug, Default)]
pub struct BatchConfig {
    /// Number of worker threads (0 = auto, 1 = run on the calling thread)
    pub num_threads: usize,
}

/// Statistics from a compress or decompress call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub literals: u64,
    pub matches: u64,
    /// Input bytes after the end of the token stream (decompression only)
    pub trailing_bytes: u64,
}

/// A whole-buffer transform: one input buffer in, one output buffer out
pub trait Codec {
    fn process(&self, input: &[u8]) -> Result<(Vec<u8>, CodecStats)>;
}

/// Compress `data` with the default configuration
///
/// The default search never lets a match overlap its own output, so runs are
/// coded with distances of at least 3 and output matches the reference
/// encoder. For run-heavy data set [`CompressConfig::allow_overlap`] on a
/// [`Compressor`] to allow distance-1 runs.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    Compressor::default().compress(data)
}

/// Decompress an LZ11 stream with the default 8 MiB limit
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    Decompressor::default().decompress(data)
}

/// Parse the header of an LZ11 stream without decoding it
pub fn peek_header(data: &[u8]) -> Result<Lz11Header> {
    Lz11Header::parse(data)
}

/// Quick check: does `data` start with the LZ11 tag byte?
pub fn is_lz11(data: &[u8]) -> bool {
    data.first() == Some(&format::LZ11_TAG)
}
