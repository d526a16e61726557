use fwc_buffer::{ByteBuffer, TypedArray};

use crate::error::ObjectError;
use crate::header::{FileHeader, FileHeaderOptions, FileKind};
use crate::program_header::{check_order, ProgramHeader};
use crate::relocation::Relocation;
use crate::section::{SectionHeader, SectionType};
use crate::symbol::Symbol;
use crate::wire::{WireRead, WireSize, WireWrite};

/// An in-progress object or executable file: raw section bytes plus the
/// section, symbol, and relocation tables that describe them.
///
/// Mirrors the "object model" role §4 assigns the core: own the buffer,
/// the typed tables, and the invariants tying them together, while leaving
/// the archive container (§6 "Library archive") to an external reader.
#[derive(Debug, Default)]
pub struct ObjectFile {
    data: ByteBuffer,
    sections: TypedArray<SectionHeader>,
    symbols: TypedArray<Symbol>,
    relocations: TypedArray<Relocation>,
    program_headers: TypedArray<ProgramHeader>,
}

impl ObjectFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[SectionHeader] {
        self.sections.as_slice()
    }

    pub fn symbols(&self) -> &[Symbol] {
        self.symbols.as_slice()
    }

    pub fn relocations(&self) -> &[Relocation] {
        self.relocations.as_slice()
    }

    /// Appends a section's raw bytes (aligned to 8, per §6) and records its
    /// header. `NOBITS` sections must not carry file content — they only
    /// reserve address space (§3 invariant).
    pub fn add_section(
        &mut self,
        mut header: SectionHeader,
        content: &[u8],
    ) -> Result<usize, ObjectError> {
        if header.section_type == SectionType::Nobits && !content.is_empty() {
            return Err(ObjectError::NobitsHasData {
                index: self.sections.len(),
                len: content.len(),
            });
        }
        self.data.align_to(8);
        if header.is_nobits() {
            header.offset = self.data.len() as u64;
        } else {
            header.offset = self.data.append(content) as u64;
            header.size = content.len() as u64;
        }
        Ok(self.sections.push(header))
    }

    /// Adds a zero-length filler section used to pad between two sections
    /// that would otherwise misalign (§6: "Inter-section padding uses an
    /// explicit filler section").
    pub fn add_filler(&mut self, len: usize) -> usize {
        self.data.align_to(8);
        let offset = self.data.append_zero_padded(len);
        self.sections.push(SectionHeader {
            name: 0,
            flags: crate::section::SectionFlags::empty(),
            addr: 0,
            offset: offset as u64,
            size: len as u64,
            link: 0,
            entsize: 0,
            module: 0,
            library: 0,
            section_type: SectionType::Null,
            align_log2: 0,
            relink_cmds: 0,
        })
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> usize {
        self.symbols.push(symbol)
    }

    /// Adds a relocation after checking it stays within its target
    /// section's bounds (§3 invariant: `r_offset + size(r_type) <=
    /// section.size`).
    pub fn add_relocation(&mut self, relocation: Relocation) -> Result<usize, ObjectError> {
        let section = self
            .sections
            .get(relocation.section as usize)
            .map_err(|_| ObjectError::RelocationOutOfBounds {
                offset: relocation.offset,
                size: relocation.size.bytes(),
                section_size: 0,
            })?;
        relocation.fits_in_section(section.size)?;
        Ok(self.relocations.push(relocation))
    }

    /// Adds a program header. Program headers in an executable must be
    /// submitted in const(IP)/code(IP)/data(DATAP)/bss(DATAP)/
    /// data(THREADP)/bss(THREADP) order; out-of-order submission is
    /// rejected immediately rather than silently accepted and checked
    /// later.
    pub fn add_program_header(&mut self, header: ProgramHeader) -> Result<usize, ObjectError> {
        self.program_headers.push(header);
        check_order(self.program_headers.as_slice())?;
        Ok(self.program_headers.len() - 1)
    }

    /// Serializes the file header, program headers, raw section data, and
    /// section header table into a single buffer, in the order §6 lays
    /// out: header, program headers, raw data, section headers.
    pub fn write(&self, kind: FileKind, entry: u64, options: &FileHeaderOptions) -> ByteBuffer {
        let phoff = FileHeader::SIZE as u64;
        let ph_bytes = self.program_headers.len() as u64 * ProgramHeader::SIZE as u64;
        let data_start = phoff + ph_bytes;
        let padded_data_len = fwc_buffer::align_up(self.data.len(), 8) as u64;
        let shoff = data_start + padded_data_len;

        let header = options.build_header(
            kind,
            entry,
            phoff,
            shoff,
            self.program_headers.len() as u16,
            self.sections.len() as u32,
            0,
        );

        let mut out = ByteBuffer::new();
        header.write_le(&mut out);
        for ph in self.program_headers.iter() {
            ph.write_le(&mut out);
        }
        debug_assert_eq!(out.len() as u64, data_start);
        out.copy_from(&self.data);
        out.align_to(8);
        debug_assert_eq!(out.len() as u64, shoff);
        for section in self.sections.iter() {
            section.write_le(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionFlags;

    fn progbits(size: usize) -> SectionHeader {
        SectionHeader {
            name: 0,
            flags: SectionFlags::READ | SectionFlags::EXEC,
            addr: 0,
            offset: 0,
            size: size as u64,
            link: 0,
            entsize: 0,
            module: 0,
            library: 0,
            section_type: SectionType::Progbits,
            align_log2: 3,
            relink_cmds: 0,
        }
    }

    #[test]
    fn add_section_aligns_and_records_offset() {
        let mut obj = ObjectFile::new();
        obj.add_section(progbits(3), b"abc").unwrap();
        obj.add_section(progbits(2), b"de").unwrap();
        let sections = obj.sections();
        assert_eq!(sections[0].offset, 0);
        assert_eq!(sections[1].offset % 8, 0);
    }

    #[test]
    fn nobits_section_with_content_is_rejected() {
        let mut obj = ObjectFile::new();
        let mut header = progbits(4);
        header.section_type = SectionType::Nobits;
        assert!(matches!(
            obj.add_section(header, b"data"),
            Err(ObjectError::NobitsHasData { .. })
        ));
    }

    #[test]
    fn relocation_outside_section_is_rejected() {
        let mut obj = ObjectFile::new();
        obj.add_section(progbits(4), b"abcd").unwrap();
        let reloc = Relocation {
            offset: 2,
            section: 0,
            kind: crate::relocation::RelocKind::Absolute,
            size: crate::relocation::RelocSize::Bits32,
            scale_log2: 0,
            options: crate::relocation::RelocOptions::empty(),
            sym: 0,
            addend: 0,
            refsym: 0,
        };
        assert!(obj.add_relocation(reloc).is_err());
    }

    #[test]
    fn write_places_shoff_after_header_program_headers_and_data() {
        let mut obj = ObjectFile::new();
        obj.add_section(progbits(5), b"hello").unwrap();
        let options = FileHeaderOptions {
            machine: 0xFC,
            ..FileHeaderOptions::default()
        };
        let out = obj.write(FileKind::Relocatable, 0, &options);
        let header = FileHeader::read_le(out.as_slice()).unwrap();
        assert_eq!(header.phoff, FileHeader::SIZE as u64);
        assert_eq!(header.shoff, FileHeader::SIZE as u64 + fwc_buffer::align_up(5, 8) as u64);
        assert_eq!(header.machine, 0xFC);
    }
}
