use super::finder::MatchFinder;
use super::tokens::{write_match, Lz11Token};
use crate::error::{Error, Result};
use crate::format::constants::TOKENS_PER_FLAG;
use log::trace;

/// Largest encoded flag group: flag byte plus eight 4-byte match tokens
const MAX_GROUP_SIZE: usize = 1 + TOKENS_PER_FLAG * 4;

/// Writes LZ11 tokens with their flag bytes
///
/// Each flag byte is reserved in the output before its tokens, and bits are
/// set MSB-first as tokens are pushed. The output grows as needed.
pub struct TokenEncoder {
    output: Vec<u8>,
    /// Position of the flag byte of the current group
    flag_pos: usize,
    /// Tokens written into the current group (0 = no open group)
    tokens_in_group: usize,
    literals: u64,
    matches: u64,
}

impl TokenEncoder {
    /// Continue writing after whatever `output` already holds (usually the header)
    pub fn new(output: Vec<u8>) -> Self {
        Self { output, flag_pos: 0, tokens_in_group: 0, literals: 0, matches: 0 }
    }

    /// Append one token, opening a new flag group when needed
    ///
    /// Matches outside the encodable ranges are rejected with
    /// [`Error::InvalidToken`] and leave the output untouched.
    pub fn push(&mut self, token: Lz11Token) -> Result<()> {
        token.validate()?;
        if self.tokens_in_group == 0 {
            self.output
                .try_reserve(MAX_GROUP_SIZE)
                .map_err(|_| Error::OutOfMemory { requested: self.output.len() + MAX_GROUP_SIZE })?;
            self.flag_pos = self.output.len();
            self.output.push(0);
        }

        match token {
            Lz11Token::Literal(byte) => {
                self.output.push(byte);
                self.literals += 1;
            }
            Lz11Token::Match { length, distance } => {
                self.output[self.flag_pos] |= 0x80 >> self.tokens_in_group;
                write_match(&mut self.output, length, distance);
                self.matches += 1;
            }
        }

        self.tokens_in_group = (self.tokens_in_group + 1) % TOKENS_PER_FLAG;
        Ok(())
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn literals(&self) -> u64 {
        self.literals
    }

    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Finish and return the output bytes
    pub fn finish(self) -> Vec<u8> {
        self.output
    }
}

/// Greedily tokenize `data` with `finder`, pushing every token into `encoder`
pub fn encode_greedy<F: MatchFinder>(
    data: &[u8],
    finder: &mut F,
    encoder: &mut TokenEncoder,
) -> Result<()> {
    let mut pos = 0;
    while pos < data.len() {
        match finder.find_match(data, pos) {
            Some(m) => {
                encoder.push(m.into())?;
                pos += m.length as usize;
            }
            None => {
                encoder.push(Lz11Token::Literal(data[pos]))?;
                pos += 1;
            }
        }
    }

    trace!(
        "tokenized {} bytes into {} literals and {} matches",
        data.len(),
        encoder.literals(),
        encoder.matches()
    );
    Ok(())
}
