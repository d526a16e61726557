use crate::error::ObjectError;
use crate::wire::{require_len, u32_at, u64_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;

/// Call-graph stack frame entry, 24 bytes on disk (§6). Records how much
/// stack frame `syma` commits and (if it is itself a caller) the largest
/// frame among `calls` callees reachable through `symb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSizeRecord {
    pub syma: u32,
    pub symb: u32,
    pub framesize: u64,
    pub numvectors: u32,
    pub calls: u32,
}

impl WireSize for StackSizeRecord {
    const SIZE: usize = 24;
}

impl WireWrite for StackSizeRecord {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&self.syma.to_le_bytes());
        buf.append(&self.symb.to_le_bytes());
        buf.append(&self.framesize.to_le_bytes());
        buf.append(&self.numvectors.to_le_bytes());
        buf.append(&self.calls.to_le_bytes());
        offset
    }
}

impl WireRead for StackSizeRecord {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        Ok(Self {
            syma: u32_at(bytes, 0),
            symb: u32_at(bytes, 4),
            framesize: u64_at(bytes, 8),
            numvectors: u32_at(bytes, 16),
            calls: u32_at(bytes, 20),
        })
    }
}
