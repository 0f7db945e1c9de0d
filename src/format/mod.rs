pub mod constants;
pub mod header;

pub use constants::*;
pub use header::Lz11Header;
