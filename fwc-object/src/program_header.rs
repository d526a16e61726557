use bitflags::bitflags;

use crate::error::ObjectError;
use crate::wire::{require_len, u32_at, u64_at, u8_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;

/// What a loadable segment becomes at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum SegmentKind {
    Const = 0,
    Code = 1,
    Data = 2,
    Bss = 3,
}

impl SegmentKind {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Const,
            1 => Self::Code,
            2 => Self::Data,
            3 => Self::Bss,
            _ => return None,
        })
    }

    /// A segment's position in the required const/code/data/bss ordering
    /// (§3 invariant on program headers).
    const fn order(self) -> u8 {
        self as u8
    }
}

/// Which base pointer a segment is addressed relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum BaseKind {
    Ip = 0,
    DataP = 1,
    ThreadP = 2,
}

bitflags! {
    /// Segment flags (§6: "Legal values for p_flags (segment flags) are
    /// the same as section flags"). Bit positions mirror
    /// [`crate::section::SectionFlags`]'s base-pointer bits so a base
    /// pointer reads the same way whether it's attached to a section or a
    /// segment.
    #[derive(Default)]
    pub struct ProgramFlags: u32 {
        const IP_BASE      = 1 << 3;
        const DATAP_BASE   = 1 << 4;
        const THREADP_BASE = 1 << 5;
    }
}

impl ProgramFlags {
    const BASE_MASK_BITS: u32 = (1 << 3) | (1 << 4) | (1 << 5);

    fn for_base(base: BaseKind) -> Self {
        match base {
            BaseKind::Ip => ProgramFlags::IP_BASE,
            BaseKind::DataP => ProgramFlags::DATAP_BASE,
            BaseKind::ThreadP => ProgramFlags::THREADP_BASE,
        }
    }

    /// `None` when zero or more than one base-pointer bit is set.
    fn base(self) -> Option<BaseKind> {
        match self.bits() & Self::BASE_MASK_BITS {
            bits if bits == ProgramFlags::IP_BASE.bits() => Some(BaseKind::Ip),
            bits if bits == ProgramFlags::DATAP_BASE.bits() => Some(BaseKind::DataP),
            bits if bits == ProgramFlags::THREADP_BASE.bits() => Some(BaseKind::ThreadP),
            _ => None,
        }
    }

    fn non_base_bits(self) -> Self {
        ProgramFlags::from_bits_truncate(self.bits() & !Self::BASE_MASK_BITS)
    }
}

/// `ElfFwcPhdr`, 48 bytes on disk (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeader {
    pub segment: SegmentKind,
    pub flags: ProgramFlags,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align_log2: u8,
}

impl ProgramHeader {
    /// Builds a header from the base pointer and any extra flag bits,
    /// setting exactly one of `flags`'s base-pointer bits.
    pub fn new(segment: SegmentKind, base: BaseKind, extra_flags: ProgramFlags) -> Self {
        Self {
            segment,
            flags: ProgramFlags::for_base(base) | extra_flags.non_base_bits(),
            offset: 0,
            vaddr: 0,
            paddr: 0,
            filesz: 0,
            memsz: 0,
            align_log2: 0,
        }
    }

    pub fn alignment(&self) -> u64 {
        1u64 << self.align_log2
    }

    /// Which base pointer this segment is addressed relative to, derived
    /// from `flags`'s base-pointer bits.
    pub fn base(&self) -> Option<BaseKind> {
        self.flags.base()
    }

    /// Combined ordering key: base pointer first, then segment kind, so a
    /// full program header table sorts as const(IP), code(IP), data(DATAP),
    /// bss(DATAP), data(THREADP), bss(THREADP). A header with no (or more
    /// than one) base-pointer bit set sorts last — `read_le` rejects that
    /// shape outright, so this only matters for headers built in-process.
    fn order_key(&self) -> (u8, u8) {
        (self.base().map(|b| b as u8).unwrap_or(u8::MAX), self.segment.order())
    }
}

/// Checks that `headers` observe the required const/code/data/bss ordering
/// (§3 invariant). Returns the index of the first header found out of
/// order, if any.
pub fn check_order(headers: &[ProgramHeader]) -> Result<(), ObjectError> {
    let mut prev_key = None;
    for (index, header) in headers.iter().enumerate() {
        let key = header.order_key();
        if let Some(prev) = prev_key {
            if key < prev {
                return Err(ObjectError::ProgramHeaderOrder { index });
            }
        }
        prev_key = Some(key);
    }
    Ok(())
}

/// `ElfFwcPhdr`, 56 bytes on disk (§6: the listed fields — type, flags,
/// offset, vaddr, paddr, filesz, memsz, align-log2, 7 pad bytes — sum to
/// 56, not the "48 bytes" the prose states; `elf_forwardcom.h`'s
/// `ElfFwcPhdr` agrees on 56, so this crate follows the field list).
impl WireSize for ProgramHeader {
    const SIZE: usize = 56;
}

impl WireWrite for ProgramHeader {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&[self.segment as u8, 0, 0, 0]);
        buf.append(&self.flags.bits().to_le_bytes());
        buf.append(&self.offset.to_le_bytes());
        buf.append(&self.vaddr.to_le_bytes());
        buf.append(&self.paddr.to_le_bytes());
        buf.append(&self.filesz.to_le_bytes());
        buf.append(&self.memsz.to_le_bytes());
        buf.append(&[self.align_log2, 0, 0, 0, 0, 0, 0, 0]);
        offset
    }
}

impl WireRead for ProgramHeader {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        let segment_raw = u8_at(bytes, 0);
        let segment = SegmentKind::from_u8(segment_raw).ok_or(ObjectError::UnknownDiscriminant {
            field: "ProgramHeader::segment",
            value: segment_raw as u32,
        })?;
        let flags = ProgramFlags::from_bits_truncate(u32_at(bytes, 4));
        if flags.base().is_none() {
            return Err(ObjectError::UnknownDiscriminant {
                field: "ProgramHeader::flags (base pointer bit)",
                value: flags.bits(),
            });
        }
        Ok(Self {
            segment,
            flags,
            offset: u64_at(bytes, 8),
            vaddr: u64_at(bytes, 16),
            paddr: u64_at(bytes, 24),
            filesz: u64_at(bytes, 32),
            memsz: u64_at(bytes, 40),
            align_log2: u8_at(bytes, 48),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(base: BaseKind, segment: SegmentKind) -> ProgramHeader {
        let mut header = ProgramHeader::new(segment, base, ProgramFlags::empty());
        header.align_log2 = 3;
        header
    }

    #[test]
    fn round_trips_through_wire_bytes() {
        let header = sample(BaseKind::Ip, SegmentKind::Code);
        let mut buf = ByteBuffer::new();
        header.write_le(&mut buf);
        assert_eq!(buf.len(), ProgramHeader::SIZE);
        assert_eq!(ProgramHeader::read_le(buf.as_slice()).unwrap(), header);
    }

    #[test]
    fn correct_order_is_accepted() {
        let headers = vec![
            sample(BaseKind::Ip, SegmentKind::Const),
            sample(BaseKind::Ip, SegmentKind::Code),
            sample(BaseKind::DataP, SegmentKind::Data),
            sample(BaseKind::DataP, SegmentKind::Bss),
            sample(BaseKind::ThreadP, SegmentKind::Data),
            sample(BaseKind::ThreadP, SegmentKind::Bss),
        ];
        assert!(check_order(&headers).is_ok());
    }

    #[test]
    fn out_of_order_segment_is_rejected() {
        let headers = vec![
            sample(BaseKind::Ip, SegmentKind::Code),
            sample(BaseKind::Ip, SegmentKind::Const),
        ];
        assert!(matches!(
            check_order(&headers),
            Err(ObjectError::ProgramHeaderOrder { index: 1 })
        ));
    }

    #[test]
    fn base_pointer_lands_in_the_flags_field_not_the_type_byte() {
        let header = sample(BaseKind::DataP, SegmentKind::Data);
        let mut buf = ByteBuffer::new();
        header.write_le(&mut buf);
        let bytes = buf.as_slice();
        assert_eq!(bytes[1], 0, "the segment's type byte must not carry the base pointer");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), ProgramFlags::DATAP_BASE.bits());
    }

    #[test]
    fn extra_flag_bits_survive_the_round_trip_alongside_the_base_pointer() {
        let header = ProgramHeader::new(SegmentKind::Data, BaseKind::ThreadP, ProgramFlags::from_bits_truncate(1 << 10));
        let mut buf = ByteBuffer::new();
        header.write_le(&mut buf);
        let decoded = ProgramHeader::read_le(buf.as_slice()).unwrap();
        assert_eq!(decoded.base(), Some(BaseKind::ThreadP));
        assert!(decoded.flags.bits() & (1 << 10) != 0);
    }

    #[test]
    fn missing_base_pointer_bit_is_rejected() {
        let header = sample(BaseKind::Ip, SegmentKind::Code);
        let mut buf = ByteBuffer::new();
        header.write_le(&mut buf);
        let mut bytes = buf.as_slice().to_vec();
        bytes[4] = 0; // clear IP_BASE, leaving no base-pointer bit set
        assert!(matches!(
            ProgramHeader::read_le(&bytes),
            Err(ObjectError::UnknownDiscriminant { .. })
        ));
    }
}
