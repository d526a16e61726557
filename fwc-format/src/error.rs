/// Errors raised while looking up or fitting an instruction format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The nested lookup table produced a criterion outside `{0, 1, 2, 3,
    /// 4, 5, 7, 8}`. This can only happen if [`crate::table::FIRST_LEVEL`]
    /// or one of the second-level tables was built incorrectly; it is a
    /// toolchain bug, never a user-facing condition.
    #[error("format lookup table is corrupt: unknown criterion {criterion}")]
    TableCorrupt {
        /// The offending criterion value.
        criterion: u8,
    },
    /// No descriptor in the opcode's category accepted the candidate
    /// instruction shape.
    #[error("no instruction format fits this operand shape")]
    NoInstructionFit,
}
