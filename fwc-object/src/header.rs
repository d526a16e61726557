use crate::error::ObjectError;
use crate::wire::{require_len, u32_at, u64_at, WireRead, WireSize, WireWrite};
use fwc_buffer::ByteBuffer;

/// The 4-byte ELF signature, `\x7FELF`.
pub const ELF_MAGIC: u32 = 0x464C_457F;

/// `e_ident[EI_CLASS]`: this crate only ever emits 64-bit files.
pub const ELF_CLASS_64: u8 = 2;

/// `e_ident[EI_DATA]`: this crate only ever emits little-endian files.
pub const ELF_DATA_2LSB: u8 = 1;

/// `e_ident[EI_OSABI]`, the ForwardCom toolchain-specific value.
pub const ELF_OSABI_FORWARDCOM: u8 = 250;

/// File type (`e_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[repr(u16)]
pub enum FileKind {
    Relocatable = 1,
    Executable = 2,
    SharedObject = 3,
}

impl FileKind {
    pub const fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Relocatable,
            2 => Self::Executable,
            3 => Self::SharedObject,
            _ => return None,
        })
    }
}

/// `ElfFwcEhdr`: the standard ELF64 header plus the ForwardCom additions
/// (`stackvect`, `stacksize`, `ip_base`, `datap_base`, `threadp_base`), 104
/// bytes on disk (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub kind: FileKind,
    pub machine: u16,
    pub version: u32,
    pub entry: u64,
    pub phoff: u64,
    pub shoff: u64,
    pub flags: u32,
    pub phnum: u16,
    pub shnum: u32,
    pub shstrndx: u32,
    pub stackvect: u32,
    pub stacksize: u64,
    pub ip_base: u64,
    pub datap_base: u64,
    pub threadp_base: u64,
}

impl FileHeader {
    const E_EHSIZE: u16 = FileHeader::SIZE as u16;
    const E_PHENTSIZE: u16 = 56;
    const E_SHENTSIZE: u16 = 56;
}

/// The handful of header fields an embedder chooses rather than derives
/// from the sections/program headers already built up: machine id and the
/// three base-pointer values (`ip_base`/`datap_base`/`threadp_base`) a
/// relocation's `DataP`/`ThreadP`/`IpBase` kind resolves against. OS-ABI is
/// not included since this crate only ever emits [`ELF_OSABI_FORWARDCOM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileHeaderOptions {
    pub machine: u16,
    pub ip_base: u64,
    pub datap_base: u64,
    pub threadp_base: u64,
    pub stackvect: u32,
    pub stacksize: u64,
}

impl FileHeaderOptions {
    /// Builds a complete [`FileHeader`] from these options plus the
    /// bookkeeping fields (`kind`, `entry`, `phoff`/`shoff`/`phnum`/`shnum`/
    /// `shstrndx`) that only the file layout pass in [`crate::ObjectFile`]
    /// knows.
    #[allow(clippy::too_many_arguments)]
    pub fn build_header(
        &self,
        kind: FileKind,
        entry: u64,
        phoff: u64,
        shoff: u64,
        phnum: u16,
        shnum: u32,
        shstrndx: u32,
    ) -> FileHeader {
        FileHeader {
            kind,
            machine: self.machine,
            version: 1,
            entry,
            phoff,
            shoff,
            flags: 0,
            phnum,
            shnum,
            shstrndx,
            stackvect: self.stackvect,
            stacksize: self.stacksize,
            ip_base: self.ip_base,
            datap_base: self.datap_base,
            threadp_base: self.threadp_base,
        }
    }
}

impl WireSize for FileHeader {
    const SIZE: usize = 104;
}

impl WireWrite for FileHeader {
    fn write_le(&self, buf: &mut ByteBuffer) -> usize {
        let offset = buf.append(&[0u8; 16]);
        let mut ident = [0u8; 16];
        ident[0..4].copy_from_slice(&ELF_MAGIC.to_le_bytes());
        ident[4] = ELF_CLASS_64;
        ident[5] = ELF_DATA_2LSB;
        ident[6] = 1; // EI_VERSION = EV_CURRENT
        ident[7] = ELF_OSABI_FORWARDCOM;
        buf.write_bytes(offset, &ident).expect("just appended 16 bytes");
        buf.append(&(self.kind as u16).to_le_bytes());
        buf.append(&self.machine.to_le_bytes());
        buf.append(&self.version.to_le_bytes());
        buf.append(&self.entry.to_le_bytes());
        buf.append(&self.phoff.to_le_bytes());
        buf.append(&self.shoff.to_le_bytes());
        buf.append(&self.flags.to_le_bytes());
        buf.append(&Self::E_EHSIZE.to_le_bytes());
        buf.append(&Self::E_PHENTSIZE.to_le_bytes());
        buf.append(&self.phnum.to_le_bytes());
        buf.append(&Self::E_SHENTSIZE.to_le_bytes());
        buf.append(&self.shnum.to_le_bytes());
        buf.append(&self.shstrndx.to_le_bytes());
        buf.append(&self.stackvect.to_le_bytes());
        buf.append(&self.stacksize.to_le_bytes());
        buf.append(&self.ip_base.to_le_bytes());
        buf.append(&self.datap_base.to_le_bytes());
        buf.append(&self.threadp_base.to_le_bytes());
        offset
    }
}

impl WireRead for FileHeader {
    fn read_le(bytes: &[u8]) -> Result<Self, ObjectError> {
        require_len(bytes, Self::SIZE)?;
        let magic = u32_at(bytes, 0);
        if magic != ELF_MAGIC {
            return Err(ObjectError::UnknownDiscriminant {
                field: "FileHeader::magic",
                value: magic,
            });
        }
        let kind_raw = u16::from_le_bytes(bytes[16..18].try_into().unwrap());
        let kind = FileKind::from_u16(kind_raw).ok_or(ObjectError::UnknownDiscriminant {
            field: "FileHeader::kind",
            value: kind_raw as u32,
        })?;
        Ok(Self {
            kind,
            machine: u16::from_le_bytes(bytes[18..20].try_into().unwrap()),
            version: u32_at(bytes, 20),
            entry: u64_at(bytes, 24),
            phoff: u64_at(bytes, 32),
            shoff: u64_at(bytes, 40),
            flags: u32_at(bytes, 48),
            phnum: u16::from_le_bytes(bytes[56..58].try_into().unwrap()),
            shnum: u32_at(bytes, 60),
            shstrndx: u32_at(bytes, 64),
            stackvect: u32_at(bytes, 68),
            stacksize: u64_at(bytes, 72),
            ip_base: u64_at(bytes, 80),
            datap_base: u64_at(bytes, 88),
            threadp_base: u64_at(bytes, 96),
        })
    }
}
