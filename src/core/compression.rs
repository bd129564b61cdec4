//! Compression support for external datasets.
//!
//! External dataset files may hold a zlib stream instead of raw elements,
//! the same deflate encoding HDF5 uses for its gzip filter.

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression as Level;

use crate::util::{Error, Result};

/// Compression applied to an external dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// Raw little-endian elements.
    #[default]
    None,
    /// A zlib stream that inflates to raw little-endian elements.
    Zlib,
}

impl Compression {
    /// Parse from the name used in container documents.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" | "" => Some(Self::None),
            "zlib" | "gzip" | "deflate" => Some(Self::Zlib),
            _ => None,
        }
    }
}

/// Compress data using zlib.
///
/// # Arguments
/// * `data` - Data to compress
/// * `level` - Compression level (0-9, where 0 is no compression, 9 is max)
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Level::new(level.min(9)));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a zlib stream that must produce exactly `expected_len` bytes.
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::with_capacity(expected_len);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != expected_len {
        return Err(Error::invalid(format!(
            "zlib stream inflated to {} bytes, expected {}",
            decompressed.len(),
            expected_len
        )));
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress() {
        let original = b"0123456789abcdef".repeat(200);

        let compressed = compress(&original, 6).unwrap();
        assert!(compressed.len() < original.len());

        let decompressed = decompress(&compressed, original.len()).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let compressed = compress(b"abcd", 6).unwrap();
        assert!(decompress(&compressed, 8).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decompress(b"definitely not zlib", 4).is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(Compression::from_name("gzip"), Some(Compression::Zlib));
        assert_eq!(Compression::from_name("none"), Some(Compression::None));
        assert_eq!(Compression::from_name("lzf"), None);
    }
}
