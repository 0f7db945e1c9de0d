//! Greedy longest-match search over the 4 KiB sliding window.
//!
//! Both finders return the longest match at a position and break ties in
//! favour of the nearest candidate (smallest distance). They differ only in
//! how candidates are enumerated, so their results are identical.

use super::tokens::MatchCandidate;
use crate::format::constants::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

/// How the encoder enumerates match candidates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Scan every window position (slow, reference behaviour)
    Exhaustive,
    /// Follow hash chains keyed on the next 3 bytes
    #[default]
    HashChain,
}

/// Finds the best back-reference for a position of the input
pub trait MatchFinder {
    /// Best match starting at `offset`, or `None` if nothing reaches 3 bytes.
    ///
    /// Offsets must be queried in non-decreasing order.
    fn find_match(&mut self, data: &[u8], offset: usize) -> Option<MatchCandidate>;
}

/// Window start and the longest usable length at `offset`
#[inline]
fn search_bounds(data: &[u8], offset: usize) -> (usize, usize) {
    let window = offset.min(WINDOW_SIZE);
    let max_len = MAX_MATCH.min(data.len() - offset).min(window);
    (offset - window, max_len)
}

/// Count equal bytes at `candidate` and `offset`, up to `limit`
#[inline]
fn match_length(data: &[u8], candidate: usize, offset: usize, limit: usize) -> usize {
    data[candidate..].iter().zip(&data[offset..]).take(limit).take_while(|(a, b)| a == b).count()
}

/// Linear scan of the whole window
pub struct ExhaustiveFinder {
    allow_overlap: bool,
}

impl ExhaustiveFinder {
    pub fn new(allow_overlap: bool) -> Self {
        Self { allow_overlap }
    }
}

impl MatchFinder for ExhaustiveFinder {
    fn find_match(&mut self, data: &[u8], offset: usize) -> Option<MatchCandidate> {
        let (start, max_len) = search_bounds(data, offset);
        if self.allow_overlap {
            return nearest_longest(data, (start..offset).rev(), offset, max_len);
        }

        let mut best = None;
        let mut best_len = MIN_MATCH;

        // Farthest first; `>=` lets a nearer candidate take over on a tie
        for candidate in start..offset {
            let distance = offset - candidate;
            let len = match_length(data, candidate, offset, max_len.min(distance));

            if len >= best_len {
                best_len = len;
                best = Some(MatchCandidate { distance: distance as u16, length: len as u32 });
            }

            // Nearer candidates are capped below the current best
            if best_len > distance {
                break;
            }
        }

        best
    }
}

/// Longest uncapped match among `candidates` (nearest first); the first
/// candidate to reach a length wins, and reaching `max_len` ends the search
fn nearest_longest(
    data: &[u8],
    candidates: impl Iterator<Item = usize>,
    offset: usize,
    max_len: usize,
) -> Option<MatchCandidate> {
    let mut best = None;
    let mut best_len = MIN_MATCH - 1;

    for candidate in candidates {
        if best_len >= max_len {
            break;
        }
        if data[candidate + best_len] != data[offset + best_len] {
            continue;
        }

        let len = match_length(data, candidate, offset, max_len);
        if len > best_len {
            best_len = len;
            best = Some(MatchCandidate {
                distance: (offset - candidate) as u16,
                length: len as u32,
            });
        }
    }

    best
}

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NIL: u32 = u32::MAX;

/// Hash-chain index over 3-byte prefixes
///
/// `prev` is a ring of `WINDOW_SIZE` links: the slot for position `p` is only
/// reused by `p + WINDOW_SIZE`, which is outside any window containing `p`.
pub struct HashChainFinder {
    allow_overlap: bool,
    head: Vec<u32>,
    prev: Vec<u32>,
    /// Next position to add to the index
    next_insert: usize,
    /// Scratch list of chain positions, nearest first
    chain: Vec<u32>,
}

impl HashChainFinder {
    pub fn new(allow_overlap: bool) -> Self {
        Self {
            allow_overlap,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
            next_insert: 0,
            chain: Vec::with_capacity(WINDOW_SIZE),
        }
    }

    #[inline]
    fn hash(data: &[u8], pos: usize) -> usize {
        let key = u32::from(data[pos]) << 16
            | u32::from(data[pos + 1]) << 8
            | u32::from(data[pos + 2]);
        (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = Self::hash(data, pos);
        self.prev[pos % WINDOW_SIZE] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Collect chain entries inside the window into `self.chain`
    fn collect_chain(&mut self, data: &[u8], offset: usize, start: usize) {
        self.chain.clear();
        let mut cand = self.head[Self::hash(data, offset)];
        while cand != NIL && cand as usize >= start {
            self.chain.push(cand);
            cand = self.prev[cand as usize % WINDOW_SIZE];
        }
    }

    /// Farthest first with the distance cap, same walk as the exhaustive scan
    fn best_bounded(&self, data: &[u8], offset: usize, max_len: usize) -> Option<MatchCandidate> {
        let mut best = None;
        let mut best_len = MIN_MATCH;

        for &cand in self.chain.iter().rev() {
            let candidate = cand as usize;
            let distance = offset - candidate;
            if best_len > distance {
                break;
            }

            let limit = max_len.min(distance);
            if limit < best_len || data[candidate + best_len - 1] != data[offset + best_len - 1] {
                continue;
            }

            let len = match_length(data, candidate, offset, limit);
            if len >= best_len {
                best_len = len;
                best = Some(MatchCandidate { distance: distance as u16, length: len as u32 });
            }
        }

        best
    }
}

impl MatchFinder for HashChainFinder {
    fn find_match(&mut self, data: &[u8], offset: usize) -> Option<MatchCandidate> {
        while self.next_insert < offset {
            self.insert(data, self.next_insert);
            self.next_insert += 1;
        }

        let (start, max_len) = search_bounds(data, offset);
        if max_len < MIN_MATCH {
            return None;
        }

        self.collect_chain(data, offset, start);
        if self.allow_overlap {
            let chain = self.chain.iter().map(|&cand| cand as usize);
            nearest_longest(data, chain, offset, max_len)
        } else {
            self.best_bounded(data, offset, max_len)
        }
    }
}
