//! Status list bitstrings.
//!
//! The `encodedList` of a status list credential is a deflate-compressed
//! bitstring, base64-encoded. Issuers wrap the deflate stream in a zlib
//! header (`eJ...`); GZIP and raw deflate are accepted too. Index 0 is the
//! left-most (most significant) bit of the first byte; a set bit means the
//! credential is revoked.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use base64ct::{Base64Unpadded, Base64UrlUnpadded, Encoding};
use bitvec::order::Msb0;
use bitvec::vec::BitVec;
use flate2::Compression;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;

/// Minimum status list length (16KB of bits) so that a list does not
/// reveal how many credentials an issuer has issued.
pub const MIN_LIST_BITS: usize = 16 * 1024 * 8;

/// A decoded status list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusList {
    bits: BitVec<u8, Msb0>,
}

impl Default for StatusList {
    fn default() -> Self {
        Self::new(MIN_LIST_BITS)
    }
}

impl StatusList {
    /// Create a status list of `len` bits, all unset. The length is rounded
    /// up to a whole number of bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, len.div_ceil(8) * 8),
        }
    }

    /// Create a minimum-length status list with the given indexes set.
    #[must_use]
    pub fn from_indexes(indexes: &[usize]) -> Self {
        let max = indexes.iter().max().map_or(0, |i| i + 1);
        let mut list = Self::new(MIN_LIST_BITS.max(max));
        for idx in indexes {
            list.bits.set(*idx, true);
        }
        list
    }

    /// Decode an `encodedList` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not base64 or does not decompress.
    pub fn decode(encoded: &str) -> Result<Self> {
        let trimmed = encoded.trim().trim_end_matches('=');
        let compressed = Base64UrlUnpadded::decode_vec(trimmed)
            .or_else(|_| Base64Unpadded::decode_vec(trimmed))
            .context("invalid base64-encoded status list")?;

        let mut inflated = Vec::new();
        let read = match compressed.as_slice() {
            [0x1f, 0x8b, ..] => GzDecoder::new(compressed.as_slice()).read_to_end(&mut inflated),
            [0x78, ..] => ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut inflated),
            _ => DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut inflated),
        };
        read.context("invalid compressed status list")?;

        Ok(Self {
            bits: BitVec::from_vec(inflated),
        })
    }

    /// Encode the list as an `encodedList` value: zlib-wrapped deflate,
    /// base64url-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if compression fails.
    pub fn encode(&self) -> Result<String> {
        let mut encoder = ZlibEncoder::new(vec![], Compression::best());
        encoder.write_all(self.bits.as_raw_slice())?;
        let compressed = encoder.finish()?;
        Ok(Base64UrlUnpadded::encode_string(&compressed))
    }

    /// Set or clear the bit at `idx`.
    ///
    /// # Errors
    ///
    /// Returns an error if `idx` is beyond the end of the list.
    pub fn set(&mut self, idx: usize, value: bool) -> Result<()> {
        if idx >= self.bits.len() {
            bail!("index {idx} is outside the status list (length {})", self.bits.len());
        }
        self.bits.set(idx, value);
        Ok(())
    }

    /// Returns `true` if the bit at `idx` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if `idx` is beyond the end of the list.
    pub fn is_set(&self, idx: usize) -> Result<bool> {
        let Some(bit) = self.bits.get(idx) else {
            bail!("index {idx} is outside the status list (length {})", self.bits.len());
        };
        Ok(*bit)
    }

    /// Number of entries in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bits_survive_encoding() {
        let list = StatusList::from_indexes(&[0, 7, 94567]);
        let encoded = list.encode().expect("should encode");

        let decoded = StatusList::decode(&encoded).expect("should decode");
        assert_eq!(decoded.len(), MIN_LIST_BITS);
        assert!(decoded.is_set(0).expect("should be in range"));
        assert!(decoded.is_set(7).expect("should be in range"));
        assert!(decoded.is_set(94567).expect("should be in range"));
        assert!(!decoded.is_set(1).expect("should be in range"));
    }

    // An issued list: zlib header, standard padded base64, bits 46, 51 and
    // 52 set.
    const ISSUED_LIST: &str = "eJztwUERAAAIA6CdKeyfdLbwAyRnNgAAAAAAAAAAAAAAAAAAAMCfAr/AABs=";

    #[test]
    fn issued_zlib_list() {
        let list = StatusList::decode(ISSUED_LIST).expect("should decode");
        assert_eq!(list.len(), MIN_LIST_BITS);
        assert!(list.is_set(51).expect("should be in range"));
        assert!(list.is_set(46).expect("should be in range"));
        assert!(!list.is_set(934).expect("should be in range"));
        assert!(!list.is_set(0).expect("should be in range"));
    }

    #[test]
    fn url_safe_alphabet() {
        let url_safe = ISSUED_LIST.replace('/', "_").replace('+', "-");
        let list = StatusList::decode(&url_safe).expect("should decode");
        assert!(list.is_set(51).expect("should be in range"));
        assert!(!list.is_set(934).expect("should be in range"));
    }

    #[test]
    fn raw_deflate() {
        let mut encoder = flate2::write::DeflateEncoder::new(vec![], Compression::default());
        encoder.write_all(&[0, 0b0010_0000]).expect("should write");
        let compressed = encoder.finish().expect("should compress");

        let list = StatusList::decode(&Base64UrlUnpadded::encode_string(&compressed))
            .expect("should decode");
        assert!(list.is_set(10).expect("should be in range"));
        assert!(!list.is_set(11).expect("should be in range"));
    }

    #[test]
    fn encodes_zlib() {
        let encoded = StatusList::from_indexes(&[3]).encode().expect("should encode");
        assert!(encoded.starts_with("eN"));
    }

    #[test]
    fn left_most_bit_is_index_zero() {
        let mut encoder = flate2::write::GzEncoder::new(vec![], Compression::default());
        encoder.write_all(&[0b1000_0001, 0]).expect("should write");
        let compressed = encoder.finish().expect("should compress");

        // standard, padded base64 is accepted too
        let encoded = base64ct::Base64::encode_string(&compressed);
        let list = StatusList::decode(&encoded).expect("should decode");

        assert!(list.is_set(0).expect("should be in range"));
        assert!(list.is_set(7).expect("should be in range"));
        assert!(!list.is_set(8).expect("should be in range"));
    }

    #[test]
    fn out_of_range() {
        let list = StatusList::new(16);
        assert!(list.is_set(16).is_err());
    }

    #[test]
    fn garbage() {
        assert!(StatusList::decode("not a status list!").is_err());
        assert!(StatusList::decode("H4sIAAAAAAAA").is_err());
    }
}
