use crate::error::{Error, Result};
use crate::format::constants::*;

/// Represents a single token in the LZ11 stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lz11Token {
    /// A literal byte
    Literal(u8),
    /// A back-reference: copy `length` bytes from `distance` bytes back
    Match { length: u32, distance: u16 },
}

impl Lz11Token {
    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Lz11Token::Literal(_) => 1,
            Lz11Token::Match { length, .. } => *length as usize,
        }
    }

    /// Number of body bytes this token occupies (excluding its flag bit)
    pub fn encoded_size(&self) -> usize {
        match self {
            Lz11Token::Literal(_) => 1,
            Lz11Token::Match { length, .. } => match_token_size(*length as usize),
        }
    }

    /// Whether this token sets its flag bit
    pub fn is_match(&self) -> bool {
        matches!(self, Lz11Token::Match { .. })
    }

    /// Check that a match fits the wire format: length 3..=65808, distance 1..=4096
    pub fn validate(&self) -> Result<()> {
        match *self {
            Lz11Token::Literal(_) => Ok(()),
            Lz11Token::Match { length, distance }
                if (MIN_MATCH..=MAX_MATCH).contains(&(length as usize))
                    && (1..=WINDOW_SIZE).contains(&(distance as usize)) =>
            {
                Ok(())
            }
            Lz11Token::Match { length, distance } => Err(Error::InvalidToken { length, distance }),
        }
    }
}

/// A match found by the match finder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchCandidate {
    pub distance: u16,
    pub length: u32,
}

impl From<MatchCandidate> for Lz11Token {
    fn from(m: MatchCandidate) -> Self {
        Lz11Token::Match { length: m.length, distance: m.distance }
    }
}

/// Size in bytes of the match token needed for `length`
pub fn match_token_size(length: usize) -> usize {
    debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&length));
    if length <= SHORT_MATCH_MAX {
        2
    } else if length <= MEDIUM_MATCH_MAX {
        3
    } else {
        4
    }
}

/// Append the packed form of a match token to `out`
///
/// `length` must be in 3..=65808 and `distance` in 1..=4096; see
/// [`Lz11Token::validate`].
pub(crate) fn write_match(out: &mut Vec<u8>, length: u32, distance: u16) {
    debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&(length as usize)));
    debug_assert!((1..=WINDOW_SIZE).contains(&(distance as usize)));

    let disp = (distance - 1) & 0x0FFF;
    let disp_hi = (disp >> 8) as u8;
    let disp_lo = disp as u8;
    let length = length as usize;

    if length <= SHORT_MATCH_MAX {
        let len = (length - 1) as u8;
        out.extend_from_slice(&[(len << 4) | disp_hi, disp_lo]);
    } else if length <= MEDIUM_MATCH_MAX {
        let len = (length - MEDIUM_MATCH_BIAS) as u8;
        out.extend_from_slice(&[len >> 4, ((len & 0x0F) << 4) | disp_hi, disp_lo]);
    } else {
        let len = (length - LONG_MATCH_BIAS) as u16;
        out.extend_from_slice(&[
            0x10 | (len >> 12) as u8,
            (len >> 4) as u8,
            (((len & 0x0F) as u8) << 4) | disp_hi,
            disp_lo,
        ]);
    }
}

/// Size of the match token whose first byte is `b0`
pub fn match_size_from_lead(b0: u8) -> usize {
    match b0 >> 4 {
        0 => 3,
        1 => 4,
        _ => 2,
    }
}

/// Unpack a match token from exactly `match_size_from_lead(bytes[0])` bytes
///
/// Returns `(length, distance)`.
pub fn read_match(bytes: &[u8]) -> (u32, u16) {
    let b0 = bytes[0];
    match b0 >> 4 {
        0 => {
            let (b1, b2) = (bytes[1], bytes[2]);
            let length =
                ((((b0 & 0x0F) as u32) << 4) | (b1 >> 4) as u32) + MEDIUM_MATCH_BIAS as u32;
            let distance = ((((b1 & 0x0F) as u16) << 8) | b2 as u16) + 1;
            (length, distance)
        }
        1 => {
            let (b1, b2, b3) = (bytes[1], bytes[2], bytes[3]);
            let length = ((((b0 & 0x0F) as u32) << 12) | ((b1 as u32) << 4) | (b2 >> 4) as u32)
                + LONG_MATCH_BIAS as u32;
            let distance = ((((b2 & 0x0F) as u16) << 8) | b3 as u16) + 1;
            (length, distance)
        }
        _ => {
            let b1 = bytes[1];
            let length = (b0 >> 4) as u32 + 1;
            let distance = ((((b0 & 0x0F) as u16) << 8) | b1 as u16) + 1;
            (length, distance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(length: u32, distance: u16) -> Vec<u8> {
        let mut out = Vec::new();
        write_match(&mut out, length, distance);
        out
    }

    #[test]
    fn test_token_size_boundaries() {
        assert_eq!(packed(3, 1).len(), 2);
        assert_eq!(packed(16, 1).len(), 2);
        assert_eq!(packed(17, 1).len(), 3);
        assert_eq!(packed(272, 1).len(), 3);
        assert_eq!(packed(273, 1).len(), 4);
        assert_eq!(packed(65808, 4096).len(), 4);

        assert_eq!(match_token_size(16), 2);
        assert_eq!(match_token_size(17), 3);
        assert_eq!(match_token_size(272), 3);
        assert_eq!(match_token_size(273), 4);
    }

    #[test]
    fn test_short_token_layout() {
        // length 3, distance 3 -> high nibble 2, disp 2
        assert_eq!(packed(3, 3), vec![0x20, 0x02]);
        // length 16, distance 4096 -> high nibble 15, disp 0xFFF
        assert_eq!(packed(16, 4096), vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_medium_token_layout() {
        // length 17 -> 0, distance 1 -> 0
        assert_eq!(packed(17, 1), vec![0x00, 0x00, 0x00]);
        // length 272 -> 0xFF, distance 0x123 + 1
        assert_eq!(packed(272, 0x124), vec![0x0F, 0xF1, 0x23]);
    }

    #[test]
    fn test_long_token_layout() {
        assert_eq!(packed(273, 1), vec![0x10, 0x00, 0x00, 0x00]);
        // length 65808 -> 0xFFFF, distance 0xABC + 1
        assert_eq!(packed(65808, 0xABD), vec![0x1F, 0xFF, 0xFA, 0xBC]);
    }

    #[test]
    fn test_read_match_branches() {
        assert_eq!(read_match(&[0x20, 0x02]), (3, 3));
        assert_eq!(read_match(&[0xFF, 0xFF]), (16, 4096));
        assert_eq!(read_match(&[0x0F, 0xF1, 0x23]), (272, 0x124));
        assert_eq!(read_match(&[0x1F, 0xFF, 0xFA, 0xBC]), (65808, 0xABD));
    }

    #[test]
    fn test_lead_byte_sizes() {
        assert_eq!(match_size_from_lead(0x00), 3);
        assert_eq!(match_size_from_lead(0x0F), 3);
        assert_eq!(match_size_from_lead(0x10), 4);
        assert_eq!(match_size_from_lead(0x1F), 4);
        assert_eq!(match_size_from_lead(0x20), 2);
        assert_eq!(match_size_from_lead(0xFF), 2);
    }

    #[test]
    fn test_boundary_lengths_unpack() {
        for length in [3u32, 15, 16, 17, 18, 271, 272, 273, 274, 4369, 65807, 65808] {
            for distance in [1u16, 2, 255, 256, 4095, 4096] {
                let bytes = packed(length, distance);
                assert_eq!(bytes.len(), match_size_from_lead(bytes[0]));
                assert_eq!(read_match(&bytes), (length, distance));
            }
        }
    }

    #[test]
    fn test_validate_ranges() {
        assert!(Lz11Token::Literal(0).validate().is_ok());
        assert!(Lz11Token::Match { length: 3, distance: 1 }.validate().is_ok());
        assert!(Lz11Token::Match { length: 65808, distance: 4096 }.validate().is_ok());

        for (length, distance) in [(0, 1), (2, 1), (65809, 1), (3, 0), (3, 4097)] {
            match (Lz11Token::Match { length, distance }).validate() {
                Err(Error::InvalidToken { length: l, distance: d }) => {
                    assert_eq!((l, d), (length, distance));
                }
                other => panic!("length {} distance {}: {:?}", length, distance, other),
            }
        }
    }

    #[test]
    fn test_token_sizes() {
        assert_eq!(Lz11Token::Literal(b'x').uncompressed_size(), 1);
        assert_eq!(Lz11Token::Literal(b'x').encoded_size(), 1);
        let m = Lz11Token::from(MatchCandidate { distance: 8, length: 300 });
        assert!(m.is_match());
        assert_eq!(m.uncompressed_size(), 300);
        assert_eq!(m.encoded_size(), 4);
    }
}
