use crate::error::ObjectError;
use crate::wire::{i32_at, require_len, u32_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;

/// Event-handler registration, 16 bytes on disk (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    /// IP-relative function pointer, stored as a count of 4-byte units.
    pub function_ptr_ip_rel: i32,
    pub priority: u32,
    pub key: u32,
    pub event: u32,
}

impl WireSize for EventRecord {
    const SIZE: usize = 16;
}

impl WireWrite for EventRecord {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&self.function_ptr_ip_rel.to_le_bytes());
        buf.append(&self.priority.to_le_bytes());
        buf.append(&self.key.to_le_bytes());
        buf.append(&self.event.to_le_bytes());
        offset
    }
}

impl WireRead for EventRecord {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        Ok(Self {
            function_ptr_ip_rel: i32_at(bytes, 0),
            priority: u32_at(bytes, 4),
            key: u32_at(bytes, 8),
            event: u32_at(bytes, 12),
        })
    }
}
