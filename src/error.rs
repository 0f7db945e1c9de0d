use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Header errors
    #[error("Not an LZ11 stream: expected tag byte 0x11, got 0x{found:02x}")]
    FormatMismatch { found: u8 },

    #[error("Declared size {size} bytes exceeds maximum {max}")]
    TooLarge { size: u64, max: u64 },

    // Token stream errors
    #[error("Back-reference distance {distance} exceeds available output {available}")]
    CorruptStream { distance: u16, available: usize },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Match token out of range: length {length}, distance {distance}")]
    InvalidToken { length: u32, distance: u16 },

    // Allocation errors
    #[error("Failed to allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    // Tileset errors
    #[error("Tileset data too small: {size} bytes, need at least {min}")]
    InputTooSmall { size: usize, min: usize },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the input simply isn't LZ11, as opposed to a damaged LZ11 stream.
    ///
    /// Callers that probe several formats can treat this as "try the next one".
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::FormatMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Allocate an empty buffer with room for `capacity` bytes, reporting failure
/// instead of aborting.
pub(crate) fn try_alloc(capacity: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity).map_err(|_| Error::OutOfMemory { requested: capacity })?;
    Ok(buf)
}
