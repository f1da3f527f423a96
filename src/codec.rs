//! Serialize a register store to its sparse or dense wire form, and parse
//! either form (plus the legacy V0 layout) back into one.

use crate::constants::{DENSE_THRESHOLD, NUM_BYTES_FOR_BUCKETS};
use crate::error::{Result, SketchError};
use crate::register_store::{RegisterStore, Version};
use crate::validation::{validate_byte_size, validate_min_size};

/// Serialize a store to bytes, choosing sparse form when occupancy is low
/// enough and dense form otherwise. Always emits V1.
pub fn serialize(store: &RegisterStore<'_>) -> Vec<u8> {
    let non_zero = store.num_non_zero_registers();
    // A brand-new sketch (non_zero == 0) always serializes dense: there is
    // nothing to gain from the sparse form and the canonical empty-sketch
    // wire form is the full dense buffer.
    if non_zero > 0 && non_zero < DENSE_THRESHOLD {
        serialize_sparse(store)
    } else {
        serialize_dense(store)
    }
}

fn serialize_dense(store: &RegisterStore<'_>) -> Vec<u8> {
    store.as_bytes().to_vec()
}

fn serialize_sparse(store: &RegisterStore<'_>) -> Vec<u8> {
    let header_len = Version::V1.header_len();
    let mut out = Vec::with_capacity(header_len + store.num_non_zero_registers() as usize * 3);
    out.extend_from_slice(&store.as_bytes()[..header_len]);

    for (byte_index, &byte) in store.payload().iter().enumerate() {
        if byte == 0 {
            continue;
        }
        let position = (byte_index + header_len) as u16;
        out.extend_from_slice(&position.to_be_bytes());
        out.push(byte);
    }

    out
}

/// Parse a byte buffer into a register store. Disambiguates V0 vs V1 purely
/// by total length: V0's header is 3 bytes (length ≡ 0 mod 3, or exactly
/// 1027 for the dense case), V1's header is 7 bytes (length never ≡ 0 mod
/// 3). See the length-arithmetic comment at the call site below.
pub fn parse<'a>(bytes: &'a [u8]) -> Result<RegisterStore<'a>> {
    validate_byte_size(bytes.len())?;
    validate_min_size(bytes.len(), 1)?;

    // A V1 buffer's length is always header_len (7, ≡1 mod 3) plus either
    // 1024 (dense, ≡1 mod 3) or 3k (sparse triples), so it is never ≡0 mod
    // 3. A V0 buffer's length is header_len (3, ≡0 mod 3) plus either a
    // legacy sparse payload (3k, ≡0 mod 3) or the fixed dense payload
    // (1024 bytes, giving the distinguished total 1027).
    let version = if bytes.len() == 1027 || bytes.len() % 3 == 0 {
        Version::V0
    } else {
        Version::V1
    };
    validate_min_size(bytes.len(), version.header_len())?;

    let byte_version = Version::from_tag(bytes[0])?;
    if byte_version != version {
        return Err(SketchError::DeserializationError(format!(
            "version byte {:#04x} does not match length-inferred version {:#04x}",
            bytes[0],
            version.tag()
        )));
    }

    match version {
        Version::V0 => parse_v0(bytes),
        Version::V1 => parse_v1(bytes),
    }
}

fn parse_v0(bytes: &[u8]) -> Result<RegisterStore<'_>> {
    let header_len = Version::V0.header_len();
    let payload = &bytes[header_len..];

    if payload.len() != NUM_BYTES_FOR_BUCKETS {
        return Err(SketchError::DeserializationError(format!(
            "legacy (V0) sketch payload must be {NUM_BYTES_FOR_BUCKETS} bytes, got {}",
            payload.len()
        )));
    }

    // V0 carries no numNonZeroRegisters/overflow fields; upgrade in-memory
    // to a V1-shaped buffer so the rest of this crate only ever deals with
    // one layout after parse.
    let register_offset = bytes[1];
    let mut upgraded = vec![0u8; Version::V1.header_len() + NUM_BYTES_FOR_BUCKETS];
    upgraded[0] = Version::V1.tag();
    upgraded[1] = register_offset;
    upgraded[Version::V1.header_len()..].copy_from_slice(payload);

    let mut non_zero = 0u16;
    for byte in payload {
        non_zero += u16::from(byte & 0xF0 != 0);
        non_zero += u16::from(byte & 0x0F != 0);
    }
    let nz_bytes = non_zero.to_be_bytes();
    upgraded[2] = nz_bytes[0];
    upgraded[3] = nz_bytes[1];

    Ok(RegisterStore::from_owned(Version::V1, upgraded))
}

fn parse_v1(bytes: &[u8]) -> Result<RegisterStore<'_>> {
    let header_len = Version::V1.header_len();
    let remaining = &bytes[header_len..];

    if remaining.len() == NUM_BYTES_FOR_BUCKETS {
        return Ok(RegisterStore::from_borrowed(Version::V1, bytes));
    }

    if remaining.len() % 3 != 0 {
        return Err(SketchError::DeserializationError(format!(
            "sparse sketch payload must be a multiple of 3 bytes, got {}",
            remaining.len()
        )));
    }

    let mut dense = vec![0u8; header_len + NUM_BYTES_FOR_BUCKETS];
    dense[..header_len].copy_from_slice(&bytes[..header_len]);

    for triple in remaining.chunks_exact(3) {
        let position = u16::from_be_bytes([triple[0], triple[1]]) as usize;
        if position < header_len || position >= header_len + NUM_BYTES_FOR_BUCKETS {
            return Err(SketchError::DeserializationError(format!(
                "sparse triple position {position} out of range"
            )));
        }
        dense[position] = triple[2];
    }

    Ok(RegisterStore::from_owned(Version::V1, dense))
}
