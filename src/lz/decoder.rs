use super::tokens::{match_size_from_lead, read_match, Lz11Token};
use crate::error::{try_alloc, Error, Result};
use crate::format::constants::TOKENS_PER_FLAG;
use log::trace;

/// Where the decoder is within the flag/token grouping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    /// Next body byte is a flag byte
    ReadFlag,
    /// `remaining` tokens of the current group are left, described by the
    /// top bits of `flags`
    ReadToken { flags: u8, remaining: u8 },
    /// Output reached the declared size
    Done,
}

/// Result of decoding a token body
#[derive(Debug)]
pub struct DecodedBody {
    /// Decompressed bytes, exactly the declared size
    pub data: Vec<u8>,
    /// Body bytes consumed; anything after this was ignored
    pub consumed: usize,
    pub literals: u64,
    pub matches: u64,
}

/// Turns an LZ11 token body into output bytes
///
/// The output buffer is allocated once at the declared size and doubles as
/// the dictionary for back-references.
pub struct TokenDecoder<'a> {
    body: &'a [u8],
    pos: usize,
    output: Vec<u8>,
    target: usize,
    state: DecodeState,
    literals: u64,
    matches: u64,
}

impl<'a> TokenDecoder<'a> {
    /// Create a decoder for `body` that will produce `decompressed_size` bytes
    pub fn new(body: &'a [u8], decompressed_size: usize) -> Result<Self> {
        let output = try_alloc(decompressed_size)?;
        let state = if decompressed_size == 0 { DecodeState::Done } else { DecodeState::ReadFlag };
        Ok(Self {
            body,
            pos: 0,
            output,
            target: decompressed_size,
            state,
            literals: 0,
            matches: 0,
        })
    }

    /// Bytes produced so far
    pub fn produced(&self) -> usize {
        self.output.len()
    }

    pub fn is_done(&self) -> bool {
        self.state == DecodeState::Done
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        let byte = *self.body.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let body: &'a [u8] = self.body;
        let bytes = body.get(self.pos..self.pos + n).ok_or(Error::UnexpectedEof)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Decode and apply the next token
    ///
    /// Returns `None` once the declared size has been produced. A match that
    /// would run past the declared size is cut short.
    pub fn next_token(&mut self) -> Result<Option<Lz11Token>> {
        let (flags, remaining) = match self.state {
            DecodeState::Done => return Ok(None),
            DecodeState::ReadFlag => (self.read_byte()?, TOKENS_PER_FLAG as u8),
            DecodeState::ReadToken { flags, remaining } => (flags, remaining),
        };

        let token = if flags & 0x80 == 0 {
            let byte = self.read_byte()?;
            self.output.push(byte);
            self.literals += 1;
            Lz11Token::Literal(byte)
        } else {
            let lead = *self.body.get(self.pos).ok_or(Error::UnexpectedEof)?;
            let bytes = self.read_bytes(match_size_from_lead(lead))?;
            let (length, distance) = read_match(bytes);
            self.copy_match(length as usize, distance)?;
            self.matches += 1;
            Lz11Token::Match { length, distance }
        };

        self.state = if self.output.len() >= self.target {
            DecodeState::Done
        } else if remaining > 1 {
            DecodeState::ReadToken { flags: flags << 1, remaining: remaining - 1 }
        } else {
            DecodeState::ReadFlag
        };

        Ok(Some(token))
    }

    /// Copy `length` bytes from `distance` back, one byte at a time so the
    /// source may overlap bytes written by this same copy
    fn copy_match(&mut self, length: usize, distance: u16) -> Result<()> {
        let available = self.output.len();
        let distance = distance as usize;
        if distance > available {
            return Err(Error::CorruptStream { distance: distance as u16, available });
        }

        let end = (available + length).min(self.target);
        for i in available..end {
            let byte = self.output[i - distance];
            self.output.push(byte);
        }
        Ok(())
    }

    /// Decode the whole body
    pub fn decode(mut self) -> Result<DecodedBody> {
        while self.next_token()?.is_some() {}

        trace!(
            "decoded {} bytes from {} body bytes ({} literals, {} matches)",
            self.output.len(),
            self.pos,
            self.literals,
            self.matches
        );

        Ok(DecodedBody {
            data: self.output,
            consumed: self.pos,
            literals: self.literals,
            matches: self.matches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_only() {
        let body = [0x00, b'h', b'e', b'l', b'l', b'o', 0xEE, 0xEE];
        let out = TokenDecoder::new(&body, 5).unwrap().decode().unwrap();
        assert_eq!(out.data, b"hello");
        assert_eq!(out.consumed, 6);
        assert_eq!(out.literals, 5);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_overlapping_copy() {
        // literal 'x', then match distance 1 length 10 -> high nibble 9
        let body = [0x40, b'x', 0x90, 0x00];
        let out = TokenDecoder::new(&body, 11).unwrap().decode().unwrap();
        assert_eq!(out.data, vec![b'x'; 11]);
    }

    #[test]
    fn test_pattern_copy() {
        // "ab" then distance 2 length 6
        let body = [0x20, b'a', b'b', 0x50, 0x01];
        let out = TokenDecoder::new(&body, 8).unwrap().decode().unwrap();
        assert_eq!(out.data, b"abababab");
    }

    #[test]
    fn test_distance_exceeds_output() {
        // one literal, then distance 2
        let body = [0x40, b'a', 0x20, 0x01];
        let result = TokenDecoder::new(&body, 10).unwrap().decode();
        assert!(matches!(result, Err(Error::CorruptStream { distance: 2, available: 1 })));
    }

    #[test]
    fn test_match_before_any_output() {
        let body = [0x80, 0x20, 0x00];
        let result = TokenDecoder::new(&body, 3).unwrap().decode();
        assert!(matches!(result, Err(Error::CorruptStream { distance: 1, available: 0 })));
    }

    #[test]
    fn test_truncated_body() {
        let body = [0x00, b'a', b'b', b'c'];
        let result = TokenDecoder::new(&body, 100).unwrap().decode();
        assert!(matches!(result, Err(Error::UnexpectedEof)));

        // Match token cut in the middle
        let body = [0x40, b'a', 0x00, 0x00];
        let result = TokenDecoder::new(&body, 100).unwrap().decode();
        assert!(matches!(result, Err(Error::UnexpectedEof)));

        // Missing flag byte
        let result = TokenDecoder::new(&[], 1).unwrap().decode();
        assert!(matches!(result, Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_stops_mid_match() {
        // 'a' then a distance-1 length-16 match, but only 5 bytes declared
        let body = [0x40, b'a', 0xF0, 0x00, 0xFF];
        let out = TokenDecoder::new(&body, 5).unwrap().decode().unwrap();
        assert_eq!(out.data, b"aaaaa");
        assert_eq!(out.consumed, 4);
    }

    #[test]
    fn test_stops_mid_flag_group() {
        // Flag byte promises more tokens but the size is reached after two
        let body = [0x00, b'a', b'b'];
        let out = TokenDecoder::new(&body, 2).unwrap().decode().unwrap();
        assert_eq!(out.data, b"ab");
    }

    #[test]
    fn test_multiple_flag_groups() {
        let mut body = vec![0x00];
        body.extend_from_slice(b"01234567");
        body.push(0x00);
        body.extend_from_slice(b"89");
        let out = TokenDecoder::new(&body, 10).unwrap().decode().unwrap();
        assert_eq!(out.data, b"0123456789");
        assert_eq!(out.consumed, body.len());
    }

    #[test]
    fn test_long_and_medium_tokens() {
        // 'z', medium match len 17 dist 1, long match len 273 dist 1
        let body = [0x60, b'z', 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00];
        let out = TokenDecoder::new(&body, 1 + 17 + 273).unwrap().decode().unwrap();
        assert_eq!(out.data, vec![b'z'; 291]);
        assert_eq!(out.matches, 2);
    }

    #[test]
    fn test_zero_size_reads_nothing() {
        let out = TokenDecoder::new(&[], 0).unwrap().decode().unwrap();
        assert!(out.data.is_empty());
        assert_eq!(out.consumed, 0);
    }

    #[test]
    fn test_next_token_sequence() {
        let body = [0x40, b'q', 0x20, 0x00];
        let mut decoder = TokenDecoder::new(&body, 4).unwrap();
        assert_eq!(decoder.next_token().unwrap(), Some(Lz11Token::Literal(b'q')));
        assert_eq!(decoder.produced(), 1);
        let token = decoder.next_token().unwrap();
        assert_eq!(token, Some(Lz11Token::Match { length: 3, distance: 1 }));
        assert!(decoder.is_done());
        assert_eq!(decoder.next_token().unwrap(), None);
    }
}
