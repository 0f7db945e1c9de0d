pub mod batch;
pub mod compressor;
pub mod decompressor;
