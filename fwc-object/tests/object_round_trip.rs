//! Building a small object file end to end: sections, a symbol, and a
//! relocation, then reading the serialized header back out.

use fwc_object::{
    FileHeader, FileHeaderOptions, FileKind, ObjectFile, RelocKind, RelocOptions, RelocSize, Relocation,
    SectionFlags, SectionHeader, SectionType, Symbol, SymbolBind, SymbolFlags, SymbolType, WireRead,
};

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
fn a_function_with_a_local_call_site_links_into_one_file() {
    let mut obj = ObjectFile::new();
    let code_index = obj.add_section(progbits(4), &[0u8; 4]).unwrap();

    obj.add_symbol(Symbol {
        name: 0,
        symbol_type: SymbolType::Func,
        bind: SymbolBind::Local,
        other: SymbolFlags::empty(),
        section: code_index as u32,
        value: 0,
        unit_size: 4,
        unit_num: 1,
        reguse1: 0,
        reguse2: 0,
    });

    obj.add_relocation(Relocation {
        offset: 0,
        section: code_index as u32,
        kind: RelocKind::SelfRel,
        size: RelocSize::Bits32,
        scale_log2: 0,
        options: RelocOptions::empty(),
        sym: 0,
        addend: -4,
        refsym: 0,
    })
    .unwrap();

    let options = FileHeaderOptions {
        machine: 0xFC,
        ip_base: 0x1000,
        ..FileHeaderOptions::default()
    };
    let out = obj.write(FileKind::Relocatable, 0, &options);

    let header = FileHeader::read_le(out.as_slice()).unwrap();
    assert_eq!(header.machine, 0xFC);
    assert_eq!(header.ip_base, 0x1000);
    assert_eq!(header.shnum, 1);
    assert_eq!(obj.symbols().len(), 1);
    assert_eq!(obj.relocations().len(), 1);
}
