use bitflags::bitflags;

use crate::error::ObjectError;
use crate::wire::{require_len, u32_at, u64_at, u8_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;

bitflags! {
    /// Section attribute flags (§3 "Section header").
    #[derive(Default)]
    pub struct SectionFlags: u32 {
        const EXEC              = 1 << 0;
        const WRITE              = 1 << 1;
        const READ               = 1 << 2;
        const IP_BASE            = 1 << 3;
        const DATAP_BASE         = 1 << 4;
        const THREADP_BASE       = 1 << 5;
        const EVENT_HANDLER      = 1 << 6;
        const EXCEPTION_HANDLER  = 1 << 7;
        const DEBUG              = 1 << 8;
        const COMMENT            = 1 << 9;
        const RELINK             = 1 << 10;
        const FIXED              = 1 << 11;
        const AUTOGEN            = 1 << 12;
    }
}

/// Section content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum SectionType {
    Null = 0,
    Symtab = 1,
    Strtab = 2,
    Rela = 3,
    Note = 4,
    Progbits = 5,
    /// Occupies address space but no file bytes (§3 invariant).
    Nobits = 6,
    Comdat = 7,
    Allocated = 8,
    List = 9,
    Stacksize = 10,
    Accessrights = 11,
}

impl SectionType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Null,
            1 => Self::Symtab,
            2 => Self::Strtab,
            3 => Self::Rela,
            4 => Self::Note,
            5 => Self::Progbits,
            6 => Self::Nobits,
            7 => Self::Comdat,
            8 => Self::Allocated,
            9 => Self::List,
            10 => Self::Stacksize,
            11 => Self::Accessrights,
            _ => return None,
        })
    }
}

/// `ElfFwcShdr`, 56 bytes on disk (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: u32,
    pub flags: SectionFlags,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub entsize: u32,
    pub module: u32,
    pub library: u32,
    pub section_type: SectionType,
    /// log2 of the section's alignment (§3 invariant: "Alignment fields
    /// store log2").
    pub align_log2: u8,
    pub relink_cmds: u8,
}

impl SectionHeader {
    pub fn is_nobits(&self) -> bool {
        self.section_type == SectionType::Nobits
    }

    pub fn alignment(&self) -> u64 {
        1u64 << self.align_log2
    }
}

impl WireSize for SectionHeader {
    const SIZE: usize = 56;
}

impl WireWrite for SectionHeader {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&self.name.to_le_bytes());
        buf.append(&self.flags.bits().to_le_bytes());
        buf.append(&self.addr.to_le_bytes());
        buf.append(&self.offset.to_le_bytes());
        buf.append(&self.size.to_le_bytes());
        buf.append(&self.link.to_le_bytes());
        buf.append(&self.entsize.to_le_bytes());
        buf.append(&self.module.to_le_bytes());
        buf.append(&self.library.to_le_bytes());
        buf.append(&0u32.to_le_bytes()); // _pad
        buf.append(&[self.section_type as u8, self.align_log2, self.relink_cmds, 0]);
        offset
    }
}

impl WireRead for SectionHeader {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        let section_type_raw = u8_at(bytes, 52);
        let section_type =
            SectionType::from_u8(section_type_raw).ok_or(ObjectError::UnknownDiscriminant {
                field: "SectionHeader::section_type",
                value: section_type_raw as u32,
            })?;
        Ok(Self {
            name: u32_at(bytes, 0),
            flags: SectionFlags::from_bits_truncate(u32_at(bytes, 4)),
            addr: u64_at(bytes, 8),
            offset: u64_at(bytes, 16),
            size: u64_at(bytes, 24),
            link: u32_at(bytes, 32),
            entsize: u32_at(bytes, 36),
            module: u32_at(bytes, 40),
            library: u32_at(bytes, 44),
            section_type,
            align_log2: u8_at(bytes, 53),
            relink_cmds: u8_at(bytes, 54),
        })
    }
}
