//! Tileset pixel decoding.
//!
//! Tilesets are 1024×256 textures stored as 4×4 tiles of big-endian 16-bit
//! pixels. A pixel with the top bit clear is RGB4A3, with it set RGB555.
//! Output is premultiplied ARGB32, one little-endian `u32` per pixel.

use crate::error::{try_alloc, Error, Result};

/// Texture width in pixels
pub const TILESET_WIDTH: usize = 1024;

/// Texture height in pixels
pub const TILESET_HEIGHT: usize = 256;

const TILE_SIZE: usize = 4;

/// Minimum input size: two bytes per pixel
pub const TILESET_INPUT_SIZE: usize = TILESET_WIDTH * TILESET_HEIGHT * 2;

/// Output size: four bytes per pixel
pub const TILESET_OUTPUT_SIZE: usize = TILESET_WIDTH * TILESET_HEIGHT * 4;

/// How the 3-bit alpha of RGB4A3 pixels is treated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Use the stored alpha and premultiply
    #[default]
    Blend,
    /// Force every pixel fully opaque
    Opaque,
}

/// Decode a tileset into premultiplied ARGB32 (B, G, R, A byte order)
pub fn decode_tileset(data: &[u8], alpha: AlphaMode) -> Result<Vec<u8>> {
    if data.len() < TILESET_INPUT_SIZE {
        return Err(Error::InputTooSmall { size: data.len(), min: TILESET_INPUT_SIZE });
    }

    let mut output = try_alloc(TILESET_OUTPUT_SIZE)?;
    output.resize(TILESET_OUTPUT_SIZE, 0);

    let alpha_or = match alpha {
        AlphaMode::Blend => 0,
        AlphaMode::Opaque => 7,
    };

    for (index, word) in data[..TILESET_INPUT_SIZE].chunks_exact(2).enumerate() {
        let (x, y) = pixel_position(index);
        let pixel = decode_pixel(u16::from_be_bytes([word[0], word[1]]), alpha_or);
        let pos = (y * TILESET_WIDTH + x) * 4;
        output[pos..pos + 4].copy_from_slice(&pixel.to_le_bytes());
    }

    Ok(output)
}

/// Image coordinates of the `index`-th stored pixel: 4×4 tiles, row-major
/// within each tile, tiles row-major across the image
fn pixel_position(index: usize) -> (usize, usize) {
    let tiles_per_row = TILESET_WIDTH / TILE_SIZE;
    let tile = index / (TILE_SIZE * TILE_SIZE);
    let within = index % (TILE_SIZE * TILE_SIZE);
    let x = (tile % tiles_per_row) * TILE_SIZE + within % TILE_SIZE;
    let y = (tile / tiles_per_row) * TILE_SIZE + within / TILE_SIZE;
    (x, y)
}

/// Convert one stored pixel to premultiplied ARGB32
fn decode_pixel(value: u16, alpha_or: u8) -> u32 {
    if value & 0x8000 == 0 {
        // RGB4A3
        let alpha = ((value >> 12) as u8) | alpha_or;
        let alpha = u32::from(alpha << 5 | alpha << 2 | alpha >> 1);
        let red = u32::from((value >> 8) & 0xF);
        let green = u32::from((value >> 4) & 0xF);
        let blue = u32::from(value & 0xF);
        let argb =
            alpha << 24 | red << 20 | red << 16 | green << 12 | green << 8 | blue << 4 | blue;
        premultiply(argb)
    } else {
        // RGB555
        let widen = |c: u16| -> u32 {
            let c = (c & 0x1F) as u32;
            c << 3 | c >> 2
        };
        0xFF00_0000 | widen(value >> 10) << 16 | widen(value >> 5) << 8 | widen(value)
    }
}

/// Premultiply the colour channels by alpha, rounding like Qt's `PREMUL`
fn premultiply(argb: u32) -> u32 {
    let alpha = argb >> 24;

    let mut rb = (argb & 0x00FF_00FF) * alpha;
    rb = (rb + ((rb >> 8) & 0x00FF_00FF) + 0x0080_0080) >> 8;
    rb &= 0x00FF_00FF;

    let mut g = ((argb >> 8) & 0xFF) * alpha;
    g = g + ((g >> 8) & 0xFF) + 0x80;
    g &= 0xFF00;

    g | rb | alpha << 24
}
