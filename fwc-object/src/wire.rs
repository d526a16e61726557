use fwc_buffer::ByteBuffer;

use crate::error::ObjectError;

/// A record with a fixed, known on-disk size. All of this crate's wire
/// types are fixed-size (§6 lists an exact byte count for each).
pub trait WireSize {
    const SIZE: usize;
}

/// Appends a record's little-endian wire bytes to a buffer.
pub trait WireWrite: WireSize {
    /// Writes `self` at the end of `buf`, returning the offset it was
    /// written at.
    fn write_le(&self, buf: &mut ByteBuffer) -> usize;
}

/// Reads a record back out of exactly `Self::SIZE` little-endian bytes.
pub trait WireRead: WireSize + Sized {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError>;
}

pub(crate) fn require_len(bytes: &[u8], expected: usize) -> Result<(), ObjectError> {
    if bytes.len() < expected {
        return Err(ObjectError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

pub(crate) fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

pub(crate) fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn u8_at(bytes: &[u8], offset: usize) -> u8 {
    bytes[offset]
}
