//! Bounds checking shared by the update engine and the codec.

use crate::error::{Result, SketchError};

/// Shortest hashed value the update engine will accept: 8 bytes feed the
/// leading-one scan, 2 more feed the bucket mask.
pub const MIN_HASH_LEN: usize = 10;

/// Largest serialized buffer this crate will attempt to parse, guarding
/// against unbounded allocation from a corrupt or adversarial input.
pub const MAX_BYTE_SIZE: usize = 64 * 1024 * 1024;

/// Validate that a hashed value is long enough for bucket/position derivation.
pub fn validate_min_hash_len(bytes: &[u8]) -> Result<()> {
    if bytes.len() < MIN_HASH_LEN {
        return Err(SketchError::InvalidArgument {
            param: "hashed_value".to_string(),
            value: bytes.len().to_string(),
            constraint: format!("must be at least {MIN_HASH_LEN} bytes"),
        });
    }
    Ok(())
}

/// Validate that an input buffer's size is within the safety ceiling before
/// any parsing work begins.
pub fn validate_byte_size(size: usize) -> Result<()> {
    if size > MAX_BYTE_SIZE {
        return Err(SketchError::DeserializationError(format!(
            "input size {size} exceeds maximum allowed size {MAX_BYTE_SIZE}"
        )));
    }
    Ok(())
}

/// Validate that a buffer carries at least `required` bytes before a header
/// read proceeds.
pub fn validate_min_size(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(SketchError::DeserializationError(format!(
            "insufficient data: need at least {required} bytes, got {actual}"
        )));
    }
    Ok(())
}

/// Validate that a version byte read from a header is one this crate
/// understands.
pub fn validate_header_version(version: u8) -> Result<()> {
    if version != 0x00 && version != 0x01 {
        return Err(SketchError::DeserializationError(format!(
            "unsupported sketch version byte {version:#04x}"
        )));
    }
    Ok(())
}
