//! Gzip stage applied after encoding and removed before decoding

use std::io::{Read, Write};

use flate2::Compression as GzLevel;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// First two bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn gzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), GzLevel::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

pub fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 4);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decompress when possible, otherwise hand back the input unchanged
///
/// Only used for artifacts written before the format marker existed.
pub fn gunzip_or_raw(bytes: &[u8]) -> Vec<u8> {
    match gunzip(bytes) {
        Ok(decompressed) => decompressed,
        Err(_) => bytes.to_vec(),
    }
}
