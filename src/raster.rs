//! Minimal 8-bit grayscale PNG encoder.
//!
//! Layout:
//! ```text
//! [signature: 8 bytes][IHDR][IDAT][IEND]
//! chunk = [length: 4 bytes BE][tag: 4 bytes][payload][crc32(tag + payload): 4 bytes BE]
//! ```
//! Every scanline is stored with filter type 0 and the whole image goes into
//! a single zlib stream.

use crc32fast::Hasher;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::ArrayView2;
use std::io::{Result as IoResult, Write};

/// PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

const BIT_DEPTH: u8 = 8;
const COLOR_GRAYSCALE: u8 = 0;
const FILTER_NONE: u8 = 0;

fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    let mut hasher = Hasher::new();
    hasher.update(tag);
    hasher.update(payload);
    let crc = hasher.finalize();

    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.to_be_bytes());
}

fn header_payload(width: u32, height: u32) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = BIT_DEPTH;
    ihdr[9] = COLOR_GRAYSCALE;
    // compression, filter method and interlace all stay 0
    ihdr
}

/// Encodes a `[height][width]` byte grid as a grayscale PNG.
pub fn encode_gray8(pixels: ArrayView2<u8>) -> IoResult<Vec<u8>> {
    let (height, width) = pixels.dim();

    let mut raw = Vec::with_capacity(height * (width + 1));
    for row in pixels.outer_iter() {
        raw.push(FILTER_NONE);
        raw.extend(row.iter().copied());
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&raw)?;
    let data = encoder.finish()?;

    let mut out = Vec::with_capacity(SIGNATURE.len() + 3 * 12 + 13 + data.len());
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &header_payload(width as u32, height as u32));
    write_chunk(&mut out, b"IDAT", &data);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}
