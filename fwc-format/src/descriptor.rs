use bitflags::bitflags;

use crate::opcode::Opcode;

/// General layout of fields within the instruction word (§4.2 "template").
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Template {
    A,
    B,
    C,
    D,
    E,
}

/// How a descriptor is selected: by opcode alone, by operand shape, or
/// because the instruction is a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Category {
    /// `opcode` implies the format; no further choice is made.
    Single = 1,
    /// The format is chosen by operand shape among several candidates.
    Multi = 3,
    Jump = 4,
}

bitflags! {
    /// Which operand slots a template exposes.
    #[derive(Default)]
    pub struct OperandAvail: u16 {
        const RD  = 1 << 0;
        const RS  = 1 << 1;
        const RT  = 1 << 2;
        const RU  = 1 << 3;
        const MASK = 1 << 4;
        const IM1 = 1 << 5;
        const IM2 = 1 << 6;
        const IM3 = 1 << 7;
        const IM4 = 1 << 8;
        const IM5 = 1 << 9;
        const IM6 = 1 << 10;
        const IM7 = 1 << 11;
    }
}

bitflags! {
    /// Memory-operand shape, for formats whose `mem` field is nonzero.
    #[derive(Default)]
    pub struct MemFlags: u8 {
        const HAS_BASE      = 1 << 0;
        const HAS_INDEX     = 1 << 1;
        const HAS_LENGTH    = 1 << 2;
        const HAS_LIMIT     = 1 << 3;
        const HAS_BROADCAST = 1 << 4;
        const HAS_SCALAR    = 1 << 5;
    }
}

bitflags! {
    /// Vector-operand shape.
    #[derive(Default)]
    pub struct VectFlags: u8 {
        const VECTOR = 1 << 0;
        /// RT holds a vector length, not a register reference.
        const RT_IS_LENGTH = 1 << 1;
    }
}

/// How the operand type is determined for a given descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandTypePolicy {
    /// Every operand uses this fixed bit width regardless of the source
    /// type annotation (e.g. jump-condition instructions, which never
    /// carry a typed operand).
    Forced(u8),
    /// The operand width is read out of a 2-bit field in the template.
    TemplateField,
}

/// A single encoding variant (§4.2 "Descriptor fields").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SFormat {
    /// `mmmM`-shaped format id, e.g. `0x141`.
    pub form: u16,
    pub category: Category,
    pub template: Template,
    pub op_avail: OperandAvail,
    pub ot: OperandTypePolicy,
    /// Size and bit position of the jump-offset field, in bytes / bits.
    pub jump_size: u8,
    pub jump_pos: u8,
    pub addr_size: u8,
    pub addr_pos: u8,
    pub imm_size: u8,
    pub imm_pos: u8,
    /// Size/position of the auxiliary split-immediate field; zero when
    /// the format carries only one constant.
    pub imm_aux_size: u8,
    pub imm_aux_pos: u8,
    pub vect: VectFlags,
    pub mem: MemFlags,
    /// log2 of the address-offset scale factor.
    pub scale: u8,
    /// Index of this entry within [`crate::table::FORMAT_LIST`]; filled in
    /// by [`crate::table::format_list`] rather than written by hand, so it
    /// can never drift from the entry's real position.
    pub format_index: u16,
    /// Link into the opcode-dispatch table; opaque to this crate, carried
    /// through for `fwc-asm`'s execution-table lookups (the emulator and
    /// disassembler use it — this crate never does).
    pub exe_table: u16,
    /// Inclusive `op1` range this descriptor applies to.
    pub op1_low: u8,
    pub op1_high: u8,
    /// Total instruction length in 32-bit words (1..=3).
    pub words: u8,
}

impl SFormat {
    pub fn covers_opcode(&self, opcode: Opcode) -> bool {
        let op1 = opcode.op1();
        op1 >= self.op1_low && op1 <= self.op1_high
    }

    /// Maximum magnitude representable in the immediate field, given its
    /// size in bytes and whether the value is signed.
    pub fn imm_range(&self, signed: bool) -> Option<(i64, i64)> {
        if self.imm_size == 0 {
            return None;
        }
        let bits = self.imm_size as u32 * 8;
        if signed {
            let max = (1i64 << (bits - 1)) - 1;
            Some((-(max + 1), max))
        } else {
            let max = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
            Some((0, max as i64))
        }
    }
}
