pub mod decoder;
pub mod encoder;
pub mod finder;
pub mod tokens;

pub use decoder::{DecodedBody, TokenDecoder};
pub use encoder::{encode_greedy, TokenEncoder};
pub use finder::{ExhaustiveFinder, HashChainFinder, MatchFinder, SearchStrategy};
pub use tokens::{Lz11Token, MatchCandidate};
