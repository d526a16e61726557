//! The jump-merge optimizer (§4.4): fuses a preceding arithmetic/logical
//! instruction `A` into a following conditional jump `J` when doing so
//! preserves the program's meaning and the target format table has a fused
//! opcode for the combination.

use fwc_format::Opcode;
use fwc_types::{DataType, Immediate};

use crate::scode::{JumpFlags, SCode};

/// Attempts to fuse `prev` (the arithmetic/logical instruction) into `jump`
/// (the conditional jump that follows it with no label in between). Returns
/// the fused `SCode` on success; on failure, returns `None` and both inputs
/// are left untouched by the caller.
pub fn try_fuse(prev: &SCode, jump: &SCode, optimizations_enabled: bool) -> Option<SCode> {
    if !optimizations_enabled {
        return None;
    }
    if prev.section != jump.section {
        tracing::warn!("jump-merge declined: different sections");
        return None;
    }
    if !prev.is_fusable_arithmetic() {
        tracing::warn!("jump-merge declined: {:?} has a disqualifying operand", prev.instruction.opcode);
        return None;
    }
    let Some(jump_opcode) = jump.instruction.opcode else {
        return None;
    };
    if !matches!(jump_opcode, Opcode::Jump | Opcode::Compare) {
        return None;
    }
    if prev.dest != jump.reg1 {
        tracing::warn!("jump-merge declined: destination/source register mismatch");
        return None;
    }
    if let (Some(prev_type), Some(jump_type)) = (prev.dtype, jump.dtype) {
        if !prev_type.agrees_with(&jump_type) {
            tracing::warn!("jump-merge declined: operand types disagree");
            return None;
        }
    }
    if !immediate_fits_32_bits(prev.value) {
        tracing::warn!("jump-merge declined: immediate does not fit 32 bits");
        return None;
    }

    let is_unsigned = jump.dtype.map(|dtype| dtype.is_unsigned()).unwrap_or(false);
    let fused_opcode = match prev.instruction.opcode {
        Some(Opcode::Add) if is_increment_by_one(prev.value) => increment_compare_fusion(jump.instruction.jump),
        Some(Opcode::Add) | Some(Opcode::Sub) => add_sub_jump_fusion(jump.instruction.jump, is_unsigned),
        Some(Opcode::And) | Some(Opcode::Or) | Some(Opcode::Xor) => logical_and_branch_fusion(jump.instruction.jump),
        _ => None,
    }?;

    let mut fused = *jump;
    fused.instruction.opcode = Some(fused_opcode);
    fused.dest = prev.dest;
    fused.reg1 = prev.reg1;
    fused.reg2 = prev.reg2;
    fused.value = prev.value;
    Some(fused)
}

fn is_increment_by_one(value: Option<Immediate>) -> bool {
    matches!(value, Some(v) if v.as_i64() == 1)
}

fn immediate_fits_32_bits(value: Option<Immediate>) -> bool {
    match value {
        None => true,
        Some(Immediate::Float(_)) => true,
        Some(v) => v.fits_signed(32) || v.fits_unsigned(32),
    }
}

/// `ADD 1` followed by an unsigned `</>=`-style compare fuses to
/// increment-compare-jump (§4.4).
fn increment_compare_fusion(jump: JumpFlags) -> Option<Opcode> {
    if jump.contains(JumpFlags::CARRY) {
        Some(if jump.contains(JumpFlags::INVERT) {
            Opcode::IncrementCompareJumpAbove
        } else {
            Opcode::IncrementCompareJumpBelow
        })
    } else if jump.contains(JumpFlags::UABOVE) {
        Some(if jump.contains(JumpFlags::INVERT) {
            Opcode::IncrementCompareJumpBelow
        } else {
            Opcode::IncrementCompareJumpAbove
        })
    } else {
        None
    }
}

/// `ADD`/`SUB` followed by a compare-with-zero fuses to an
/// add/sub-jump-on-sign-or-zero form. Only `==`/`!=` are eligible when the
/// comparison is unsigned, since an unsigned sign bit carries no meaning
/// (§4.4).
fn add_sub_jump_fusion(jump: JumpFlags, is_unsigned: bool) -> Option<Opcode> {
    if jump.contains(JumpFlags::ZERO) {
        Some(Opcode::AddSubJumpSignZero)
    } else if !is_unsigned && jump.intersects(JumpFlags::NEGATIVE | JumpFlags::POSITIVE) {
        Some(Opcode::AddSubJumpSignZero)
    } else {
        None
    }
}

/// `AND`/`OR`/`XOR` followed by a compare-with-zero (`==`/`!=` only) fuses to
/// a logical-and-branch form (§4.4).
fn logical_and_branch_fusion(jump: JumpFlags) -> Option<Opcode> {
    if jump.contains(JumpFlags::ZERO) {
        Some(Opcode::LogicJumpZero)
    } else {
        None
    }
}
