//! The expression/condition compiler (§4.3): turns a `COMPARE`/`AND`/
//! `TEST_BITS_AND`/constant `SCode` into one carrying a jump-condition
//! suffix, ready for the format planner.
//!
//! `optionbits` bit layout (not specified bit-exactly anywhere in the
//! corpus, only the field roles are — this module and [`crate::scode`] only
//! need to agree with each other):
//! - bit 0: invert flag, used by `COMPARE` and `TEST_BITS_AND`.
//! - bits 1-2: `COMPARE` predicate, `00=Equal 01=Less 10=Greater 11=Illegal`.
//! - bit 2 alone: `TEST_BIT` invert flag (no predicate bits to share with,
//!   since `TEST_BIT` never reaches this function with a predicate set).
//! - bit 3: "unordered requested" flag on a float `COMPARE`.

use fwc_format::Opcode;
use fwc_types::{BaseType, Immediate};

use crate::error::AsmErrorKind;
use crate::scode::{EType, Instruction, JumpFlags, SCode};

const INVERT_BIT: u8 = 1 << 0;
const PREDICATE_SHIFT: u8 = 1;
const PREDICATE_MASK: u8 = 0b11;
const TEST_BIT_INVERT_BIT: u8 = 1 << 2;
const UNORDERED_REQUESTED_BIT: u8 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComparePredicate {
    Equal,
    Less,
    Greater,
    Illegal,
}

impl ComparePredicate {
    fn from_optionbits(bits: u8) -> Self {
        match (bits >> PREDICATE_SHIFT) & PREDICATE_MASK {
            0 => Self::Equal,
            1 => Self::Less,
            2 => Self::Greater,
            _ => Self::Illegal,
        }
    }
}

/// A jump-condition combination is in the "signed-compare window" when it
/// was built from a signed-integer or float relational compare, or from a
/// float equality test (`==`/`!=`, which is `ZERO` here) — as opposed to an
/// unsigned relational compare. This is the concrete stand-in this crate
/// uses for the original encoding's `(0x1000, 0x3000)` numeric range; a
/// float `a != b` is itself an unordered comparison (neither `<` nor `>`
/// nor `==` holds for NaN), which is why `ZERO` belongs in the window too.
fn in_signed_compare_window(jump: JumpFlags) -> bool {
    jump.intersects(JumpFlags::NEGATIVE | JumpFlags::POSITIVE | JumpFlags::ZERO)
}

fn compile_compare(mut code: SCode) -> (SCode, Option<AsmErrorKind>) {
    let predicate = ComparePredicate::from_optionbits(code.optionbits);
    let invert = code.optionbits & INVERT_BIT != 0;
    let unordered_requested = code.optionbits & UNORDERED_REQUESTED_BIT != 0;

    if predicate == ComparePredicate::Illegal {
        code.instruction = Instruction::with_jump(Opcode::Jump, JumpFlags::empty());
        code.optionbits = 0;
        code.etype = EType::empty();
        return (code, Some(AsmErrorKind::ExpectLogical));
    }

    let is_float = code
        .dtype
        .map(|dtype| dtype.base.is_float())
        .unwrap_or(false);
    let is_unsigned = code.dtype.map(|dtype| dtype.is_unsigned()).unwrap_or(false);

    let mut jump = match predicate {
        ComparePredicate::Equal => JumpFlags::ZERO,
        ComparePredicate::Less if is_unsigned => JumpFlags::CARRY,
        ComparePredicate::Less => JumpFlags::NEGATIVE,
        ComparePredicate::Greater if is_unsigned => JumpFlags::UABOVE,
        ComparePredicate::Greater => JumpFlags::POSITIVE,
        ComparePredicate::Illegal => unreachable!("handled above"),
    };

    if invert {
        jump |= JumpFlags::INVERT;
    }

    if is_float && predicate == ComparePredicate::Equal && invert && unordered_requested {
        if in_signed_compare_window(jump) {
            jump |= JumpFlags::UNORDERED;
        }
    }

    code.instruction = Instruction::with_jump(Opcode::Compare, jump);
    code.optionbits = 0;
    (code, None)
}

/// `AND` with a power-of-two immediate becomes `TEST_BIT`; any other
/// integer immediate becomes `TEST_BITS_OR` (§4.3).
fn compile_and(mut code: SCode) -> (SCode, Option<AsmErrorKind>) {
    let Some(Immediate::Unsigned(bits)) = code.value else {
        code.instruction = Instruction::with_jump(Opcode::Jump, JumpFlags::empty());
        code.optionbits = 0;
        code.etype = EType::empty();
        return (code, Some(AsmErrorKind::ExpectLogical));
    };

    let mut jump = JumpFlags::TRUE;
    if bits.is_power_of_two() {
        let bit_index = bits.trailing_zeros() as u64;
        if code.optionbits & TEST_BIT_INVERT_BIT != 0 {
            jump |= JumpFlags::INVERT;
        }
        code.instruction = Instruction::with_jump(Opcode::TestBit, jump);
        code.value = Some(Immediate::Unsigned(bit_index));
    } else {
        code.instruction = Instruction::with_jump(Opcode::TestBitsOr, jump);
    }
    code.optionbits = 0;
    (code, None)
}

fn compile_test_bits_and(mut code: SCode) -> (SCode, Option<AsmErrorKind>) {
    let mut jump = JumpFlags::TRUE;
    if code.optionbits & INVERT_BIT != 0 {
        jump |= JumpFlags::INVERT;
    }
    code.instruction = Instruction::with_jump(Opcode::TestBitsAnd, jump);
    code.optionbits = 0;
    (code, None)
}

fn compile_constant(mut code: SCode) -> (SCode, Option<AsmErrorKind>) {
    let is_zero = code.value.map(Immediate::is_zero).unwrap_or(true);
    let jump = if is_zero { JumpFlags::INVERT } else { JumpFlags::empty() };
    code.instruction = Instruction::with_jump(Opcode::Jump, jump);
    code.optionbits = 0;
    code.etype = EType::empty();
    (code, None)
}

/// Compiles a reduced expression `SCode` (`COMPARE`/`AND`/`TEST_BITS_AND`/
/// constant) into one carrying a jump-condition suffix (§4.3). On an
/// unrecognized shape, returns an `ExpectLogical` diagnostic alongside an
/// `SCode` coerced to an unconditional jump so the caller can proceed.
pub fn compile_condition(code: SCode) -> (SCode, Option<AsmErrorKind>) {
    match code.instruction.opcode {
        Some(Opcode::Compare) => compile_compare(code),
        Some(Opcode::And) => compile_and(code),
        Some(Opcode::TestBitsAnd) => compile_test_bits_and(code),
        None => compile_constant(code),
        Some(_) => {
            let mut coerced = code;
            coerced.instruction = Instruction::with_jump(Opcode::Jump, JumpFlags::empty());
            coerced.optionbits = 0;
            coerced.etype = EType::empty();
            (coerced, Some(AsmErrorKind::ExpectLogical))
        }
    }
}

/// Toggles `JUMP_INVERT`; for a float compare in the signed-compare window,
/// also toggles `JUMP_UNORDERED` (the logical inverse of an ordered float
/// comparison is an unordered one) (§4.3).
pub fn invert_condition(code: &mut SCode) {
    code.instruction.jump ^= JumpFlags::INVERT;
    let is_float = code.dtype.map(|dtype| dtype.base.is_float()).unwrap_or(false);
    if is_float && in_signed_compare_window(code.instruction.jump) {
        code.instruction.jump ^= JumpFlags::UNORDERED;
    }
}
