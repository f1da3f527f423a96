//! Convenience hashing for callers who don't already have a hashing
//! pipeline feeding the sketch. Not used by the core `add`/`fold`/
//! `estimate`/`serialize`/`parse` operations, which treat the hash function
//! as an external collaborator and accept raw bytes from any source.

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Hash an arbitrary byte slice into a 16-byte buffer suitable for
/// [`crate::Sketch::add`]. Two independent 64-bit hashes (seeded
/// differently) are concatenated so the result comfortably clears the
/// minimum 10-byte input length with room to spare for both the leading
/// bit-scan and the bucket tail to draw from independent bits.
pub fn hash_bytes(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&xxhash(data, 0).to_be_bytes());
    out[8..].copy_from_slice(&xxhash(data, 0x9E37_79B9_7F4A_7C15).to_be_bytes());
    out
}

fn xxhash(data: &[u8], seed: u64) -> u64 {
    let mut hasher = XxHash64::with_seed(seed);
    hasher.write(data);
    hasher.finish()
}

/// Hash an arbitrary [`Hash`] item the same way as [`hash_bytes`], by first
/// feeding it through `std::hash::Hash` into a byte buffer.
pub fn hash_item<T: Hash>(item: &T) -> [u8; 16] {
    struct ByteCollector(Vec<u8>);
    impl Hasher for ByteCollector {
        fn finish(&self) -> u64 {
            0
        }
        fn write(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    let mut collector = ByteCollector(Vec::new());
    item.hash(&mut collector);
    hash_bytes(&collector.0)
}
