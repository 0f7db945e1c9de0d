use super::constants::*;
use crate::error::{Error, Result};

/// Parsed LZ11 header
///
/// Layout: tag byte `0x11`, then a 24-bit little-endian size. A zero size
/// field means a 32-bit little-endian size follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz11Header {
    /// Declared decompressed size
    pub decompressed_size: usize,
    /// Number of header bytes; the token body starts here
    pub header_len: usize,
}

impl Lz11Header {
    /// Parse a header, enforcing the 8 MiB size limit
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_limit(data, MAX_DECOMPRESSED_SIZE)
    }

    /// Parse a header, rejecting declared sizes above `max_size`
    pub fn parse_with_limit(data: &[u8], max_size: usize) -> Result<Self> {
        let (&tag, rest) = data.split_first().ok_or(Error::UnexpectedEof)?;
        if tag != LZ11_TAG {
            return Err(Error::FormatMismatch { found: tag });
        }

        if rest.len() < 3 {
            return Err(Error::UnexpectedEof);
        }
        let short = u32::from_le_bytes([rest[0], rest[1], rest[2], 0]);

        let (size, header_len) = if short != 0 {
            (short, SHORT_HEADER_SIZE)
        } else {
            // Zero is always the extended marker, never an empty payload
            if rest.len() < 7 {
                return Err(Error::UnexpectedEof);
            }
            (u32::from_le_bytes([rest[3], rest[4], rest[5], rest[6]]), EXTENDED_HEADER_SIZE)
        };

        let size = size as usize;
        if size > max_size {
            return Err(Error::TooLarge { size: size as u64, max: max_size as u64 });
        }

        Ok(Lz11Header { decompressed_size: size, header_len })
    }

    /// Header describing a payload of `decompressed_size` bytes
    pub fn for_size(decompressed_size: usize) -> Result<Self> {
        if decompressed_size > u32::MAX as usize {
            return Err(Error::TooLarge {
                size: decompressed_size as u64,
                max: u32::MAX as u64,
            });
        }
        let header_len = if Self::fits_short(decompressed_size) {
            SHORT_HEADER_SIZE
        } else {
            EXTENDED_HEADER_SIZE
        };
        Ok(Lz11Header { decompressed_size, header_len })
    }

    /// Whether this header uses the 8-byte extended form
    pub fn is_extended(&self) -> bool {
        self.header_len == EXTENDED_HEADER_SIZE
    }

    /// Append the encoded header to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let size = self.decompressed_size as u32;
        out.push(LZ11_TAG);
        if self.is_extended() {
            out.extend_from_slice(&[0, 0, 0]);
            out.extend_from_slice(&size.to_le_bytes());
        } else {
            out.extend_from_slice(&size.to_le_bytes()[..3]);
        }
    }

    /// Encode the header as a standalone byte vector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_len);
        self.write_to(&mut out);
        out
    }

    fn fits_short(size: usize) -> bool {
        size != 0 && size <= MAX_SHORT_SIZE as usize
    }
}
