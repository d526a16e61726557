use bitflags::bitflags;
use fwc_format::Opcode;
use fwc_types::{DataType, Immediate, RegisterRef, SectionId, SymbolId};

bitflags! {
    /// Jump-condition suffix bits riding alongside an [`SCode`]'s opcode
    /// (§3 "instruction"). Named after the original assembler's `II_JUMP_*`
    /// mask constants.
    #[derive(Default)]
    pub struct JumpFlags: u8 {
        const INVERT    = 1 << 0;
        const UNORDERED = 1 << 1;
        const ZERO      = 1 << 2;
        const POSITIVE  = 1 << 3;
        const NEGATIVE  = 1 << 4;
        const CARRY     = 1 << 5;
        const UABOVE    = 1 << 6;
        const TRUE      = 1 << 7;
    }
}

/// Opcode plus jump-condition suffix, the `instruction` field of an
/// [`SCode`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: Option<Opcode>,
    pub jump: JumpFlags,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode: Some(opcode),
            jump: JumpFlags::empty(),
        }
    }

    pub fn with_jump(opcode: Opcode, jump: JumpFlags) -> Self {
        Self {
            opcode: Some(opcode),
            jump,
        }
    }

    /// `true` for a bare label record (§3 invariant: "Any SCode with
    /// nonzero `label` must have zero `instruction`").
    pub fn is_none(&self) -> bool {
        self.opcode.is_none()
    }
}

bitflags! {
    /// Expression shape flags (§3 "etype").
    #[derive(Default)]
    pub struct EType: u16 {
        const HAS_REG1        = 1 << 0;
        const HAS_REG2        = 1 << 1;
        const HAS_MEMORY      = 1 << 2;
        const HAS_IMMEDIATE_INT   = 1 << 3;
        const HAS_IMMEDIATE_FLOAT = 1 << 4;
        const HAS_MASK        = 1 << 5;
        const HAS_OPTIONS     = 1 << 6;
        const HAS_JUMP_OFFSET = 1 << 7;
        const HAS_SYMBOL      = 1 << 8;
        const HAS_ERROR       = 1 << 9;
    }
}

/// The assembler's intermediate form for one instruction, or for a bare
/// label position when `label != 0` and `instruction.is_none()` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SCode {
    pub instruction: Instruction,
    pub dtype: Option<DataType>,
    pub etype: EType,
    pub dest: Option<RegisterRef>,
    pub reg1: Option<RegisterRef>,
    pub reg2: Option<RegisterRef>,
    pub value: Option<Immediate>,
    pub optionbits: u8,
    pub sym5: SymbolId,
    pub label: SymbolId,
    pub section: SectionId,
}

impl SCode {
    pub fn label_at(section: SectionId, label: SymbolId) -> Self {
        Self {
            label,
            section,
            ..Self::default()
        }
    }

    pub fn is_label(&self) -> bool {
        self.label != 0 && self.instruction.is_none()
    }

    /// `true` if this record has no memory operand, symbol, mask, options,
    /// or error — part of the jump-merge optimizer's fusion precondition
    /// (§4.4).
    pub fn is_fusable_arithmetic(&self) -> bool {
        !self.etype.intersects(
            EType::HAS_MEMORY | EType::HAS_SYMBOL | EType::HAS_MASK | EType::HAS_OPTIONS | EType::HAS_ERROR,
        )
    }
}
