/// Tag byte identifying the LZ11 variant
pub const LZ11_TAG: u8 = 0x11;

/// Size of the short header (tag + 24-bit size)
pub const SHORT_HEADER_SIZE: usize = 4;

/// Size of the extended header (tag + 24-bit zero marker + 32-bit size)
pub const EXTENDED_HEADER_SIZE: usize = 8;

/// Largest size the 24-bit header field can hold
pub const MAX_SHORT_SIZE: u32 = 0xFF_FFFF;

/// Hard limit on the declared decompressed size (8 MiB)
pub const MAX_DECOMPRESSED_SIZE: usize = 0x80_0000;

/// Sliding window size (12-bit distance field)
pub const WINDOW_SIZE: usize = 0x1000;

/// Shortest match worth encoding
pub const MIN_MATCH: usize = 3;

/// Longest match a 2-byte token can carry
pub const SHORT_MATCH_MAX: usize = 0x10;

/// Length bias of the 3-byte token
pub const MEDIUM_MATCH_BIAS: usize = 0x11;

/// Longest match a 3-byte token can carry
pub const MEDIUM_MATCH_MAX: usize = 0xFF + MEDIUM_MATCH_BIAS;

/// Length bias of the 4-byte token
pub const LONG_MATCH_BIAS: usize = 0x111;

/// Longest match a 4-byte token can carry
pub const MAX_MATCH: usize = 0xFFFF + LONG_MATCH_BIAS;

/// Tokens covered by one flag byte
pub const TOKENS_PER_FLAG: usize = 8;
