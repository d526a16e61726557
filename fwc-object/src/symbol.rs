use bitflags::bitflags;

use crate::error::ObjectError;
use crate::wire::{require_len, u32_at, u64_at, u8_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;
use fwc_types::{SectionId, NONE_SYMBOL};

/// What kind of entity a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum SymbolType {
    NoType = 0,
    Object = 1,
    Func = 2,
    Section = 3,
    File = 4,
    Constant = 5,
    Variable = 6,
    Expression = 7,
    TypeName = 8,
}

impl SymbolType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::NoType,
            1 => Self::Object,
            2 => Self::Func,
            3 => Self::Section,
            4 => Self::File,
            5 => Self::Constant,
            6 => Self::Variable,
            7 => Self::Expression,
            8 => Self::TypeName,
            _ => return None,
        })
    }
}

/// Symbol binding / linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum SymbolBind {
    Local = 0,
    Global = 1,
    Weak = 2,
    Weak2 = 3,
    Unresolved = 4,
    Ignore = 5,
    Exe = 6,
}

impl SymbolBind {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Local,
            1 => Self::Global,
            2 => Self::Weak,
            3 => Self::Weak2,
            4 => Self::Unresolved,
            5 => Self::Ignore,
            6 => Self::Exe,
            _ => return None,
        })
    }
}

bitflags! {
    /// Visibility and attribute flags (the symbol's `other` field).
    #[derive(Default)]
    pub struct SymbolFlags: u32 {
        const HIDDEN        = 1 << 0;
        const IP_BASE       = 1 << 1;
        const DATAP_BASE    = 1 << 2;
        const THREADP_BASE  = 1 << 3;
        const FLOAT         = 1 << 4;
        const COMMON        = 1 << 5;
        const UNWIND        = 1 << 6;
        const DEBUG         = 1 << 7;
        const RELINK        = 1 << 8;
        const MAIN          = 1 << 9;
        const EXPORTED      = 1 << 10;
        const THREAD        = 1 << 11;
    }
}

/// `ElfFwcSym`, 40 bytes on disk (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub name: u32,
    pub symbol_type: SymbolType,
    pub bind: SymbolBind,
    pub other: SymbolFlags,
    pub section: SectionId,
    pub value: u64,
    pub unit_size: u32,
    pub unit_num: u32,
    pub reguse1: u32,
    pub reguse2: u32,
}

impl Symbol {
    /// Symbol id `0` and the all-ones sentinel are reserved for "none" and
    /// "unresolved" respectively (§3 invariant).
    pub const fn is_none_or_unresolved(id: u32) -> bool {
        id == 0 || id == NONE_SYMBOL
    }
}

impl WireSize for Symbol {
    const SIZE: usize = 40;
}

impl WireWrite for Symbol {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&self.name.to_le_bytes());
        buf.append(&[self.symbol_type as u8, self.bind as u8, 0, 0]);
        buf.append(&self.other.bits().to_le_bytes());
        buf.append(&self.section.to_le_bytes());
        buf.append(&self.value.to_le_bytes());
        buf.append(&self.unit_size.to_le_bytes());
        buf.append(&self.unit_num.to_le_bytes());
        buf.append(&self.reguse1.to_le_bytes());
        buf.append(&self.reguse2.to_le_bytes());
        offset
    }
}

impl WireRead for Symbol {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        let type_raw = u8_at(bytes, 4);
        let bind_raw = u8_at(bytes, 5);
        let symbol_type = SymbolType::from_u8(type_raw).ok_or(ObjectError::UnknownDiscriminant {
            field: "Symbol::symbol_type",
            value: type_raw as u32,
        })?;
        let bind = SymbolBind::from_u8(bind_raw).ok_or(ObjectError::UnknownDiscriminant {
            field: "Symbol::bind",
            value: bind_raw as u32,
        })?;
        Ok(Self {
            name: u32_at(bytes, 0),
            symbol_type,
            bind,
            other: SymbolFlags::from_bits_truncate(u32_at(bytes, 8)),
            section: u32_at(bytes, 12),
            value: u64_at(bytes, 16),
            unit_size: u32_at(bytes, 24),
            unit_num: u32_at(bytes, 28),
            reguse1: u32_at(bytes, 32),
            reguse2: u32_at(bytes, 36),
        })
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    /// Orders by name offset, so a symbol table can use
    /// [`fwc_buffer::TypedArray::insert_sorted_unique`] for lookup-by-name.
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}
