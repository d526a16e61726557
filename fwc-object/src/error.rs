/// Errors raised while building or laying out an object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// A fixed-size wire record was read from too few bytes.
    #[error("wire record of size {expected} truncated to {actual} bytes")]
    Truncated { expected: usize, actual: usize },
    /// An enum field's on-disk discriminant has no known meaning.
    #[error("unknown discriminant {value} for {field}")]
    UnknownDiscriminant { field: &'static str, value: u32 },
    /// A relocation's `offset + size(r_type)` runs past its section's size
    /// (invariant: "For each relocation, `r_offset + size(r_type) <=
    /// section.size`").
    #[error("relocation at offset {offset} (size {size}) overruns section of size {section_size}")]
    RelocationOutOfBounds {
        offset: u64,
        size: u32,
        section_size: u64,
    },
    /// Program headers in an executable were not submitted in the
    /// required order: const(IP), code(IP), data(DATAP), bss(DATAP),
    /// data(THREADP), bss(THREADP).
    #[error("program header {index} violates the required const/code/data/bss ordering")]
    ProgramHeaderOrder { index: usize },
    /// A `NOBITS` section was given file bytes; it may only reserve
    /// address space.
    #[error("section {index} is NOBITS but was given {len} bytes of file content")]
    NobitsHasData { index: usize, len: usize },
}
