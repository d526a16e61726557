use fwc_types::Immediate;

use crate::descriptor::{OperandAvail, SFormat};
use crate::error::FormatError;
use crate::opcode::Opcode;
use crate::shape::InstrShape;
use crate::table::format_list;

/// Descriptor ids whose lookup path is reached through criterion 8 (the
/// `IM12 == 0xFFFF` check): the "has an immediate" / "is conditional"
/// variant of an opcode that also has a plain register-register or
/// unconditional form. Kept here, next to the encoder that has to set the
/// marker, rather than duplicated as a per-descriptor flag.
const MARKED_FORMAT_IDS: &[u16] = &[2, 4, 6, 8, 10, 12, 14, 19];

/// A packed instruction, 1-3 32-bit words little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedWord {
    pub words: [u32; 3],
    pub len: u8,
}

impl EncodedWord {
    /// The first 64 bits, as `lookup` expects them.
    pub fn lookup_word(&self) -> u64 {
        (self.words[0] as u64) | ((self.words[1] as u64) << 32)
    }
}

fn signed_fits(value: i64, bits: u32) -> bool {
    if bits == 0 {
        return value == 0;
    }
    let max = (1i64 << (bits - 1)) - 1;
    let min = -(max + 1);
    value >= min && value <= max
}

fn immediate_fits(descriptor: &SFormat, value: Immediate) -> bool {
    if descriptor.imm_size == 0 {
        return false;
    }
    let bits = descriptor.imm_size as u32 * 8;
    match value {
        Immediate::Unsigned(_) => value.fits_unsigned(bits),
        Immediate::Signed(_) => value.fits_signed(bits),
        Immediate::Float(_) => bits >= 32,
    }
}

fn fits(descriptor: &SFormat, shape: &InstrShape) -> bool {
    match (&shape.immediate, descriptor.imm_size) {
        (Some(v), size) if size > 0 => {
            if !immediate_fits(descriptor, *v) {
                return false;
            }
        }
        (None, 0) => {}
        _ => return false,
    }

    match (shape.jump_delta, descriptor.jump_size) {
        (Some(delta), size) if size > 0 => {
            if !signed_fits(delta, size as u32 * 8) {
                return false;
            }
        }
        (None, 0) => {}
        _ => return false,
    }

    if shape.needs_rt && !descriptor.op_avail.contains(OperandAvail::RT) {
        return false;
    }
    if shape.needs_rs && !descriptor.op_avail.contains(OperandAvail::RS) {
        return false;
    }

    true
}

fn pack(descriptor: &SFormat, opcode: Opcode, shape: &InstrShape) -> EncodedWord {
    let mut word: u64 = opcode.op1() as u64;
    word |= 1u64 << 12; // IL = 1, see lookup::bits::IL_POS

    if MARKED_FORMAT_IDS.contains(&descriptor.format_index) {
        word |= 0xFFFFu64 << 48;
    }

    let payload: u64 = if let Some(delta) = shape.jump_delta {
        (delta as i32 as u32) as u64
    } else if let Some(imm) = &shape.immediate {
        (imm.to_bits() as u32) as u64
    } else {
        0
    };
    word |= (payload & 0xFFFF) << 32;

    EncodedWord {
        words: [word as u32, (word >> 32) as u32, 0],
        len: descriptor.words,
    }
}

/// Finds the first descriptor covering `opcode` whose shape `shape`
/// satisfies, and packs it into a word. Descriptors for a given opcode are
/// tested in table order, so a narrower/cheaper encoding wins when both
/// would fit (§4.2 "Encoding").
pub fn fit_code(opcode: Opcode, shape: &InstrShape) -> Result<(SFormat, EncodedWord), FormatError> {
    for descriptor in format_list() {
        if !descriptor.covers_opcode(opcode) {
            continue;
        }
        if fits(&descriptor, shape) {
            let word = pack(&descriptor, opcode, shape);
            return Ok((descriptor, word));
        }
    }
    Err(FormatError::NoInstructionFit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::lookup;
    use crate::table::format_list;

    #[test]
    fn nop_fits_with_no_operands() {
        let (descriptor, word) = fit_code(Opcode::Nop, &InstrShape::default()).unwrap();
        assert_eq!(descriptor.format_index, 0);
        assert_eq!(lookup(word.lookup_word(), format_list().len()).unwrap(), 0);
    }

    #[test]
    fn add_without_immediate_picks_register_register_form() {
        let shape = InstrShape::default().with_rs().with_rt();
        let (descriptor, _) = fit_code(Opcode::Add, &shape).unwrap();
        assert_eq!(descriptor.format_index, 3);
    }

    #[test]
    fn add_with_immediate_picks_register_immediate_form() {
        let shape = InstrShape::default().with_rs().with_immediate(Immediate::Signed(7));
        let (descriptor, word) = fit_code(Opcode::Add, &shape).unwrap();
        assert_eq!(descriptor.format_index, 4);
        assert_eq!(lookup(word.lookup_word(), format_list().len()).unwrap(), 4);
    }

    #[test]
    fn immediate_out_of_range_fails_to_fit() {
        let shape = InstrShape::default()
            .with_rs()
            .with_immediate(Immediate::Signed(1i64 << 40));
        assert_eq!(fit_code(Opcode::Add, &shape), Err(FormatError::NoInstructionFit));
    }

    #[test]
    fn jump_without_source_register_picks_short_form() {
        let shape = InstrShape::default().with_jump_delta(100);
        let (descriptor, word) = fit_code(Opcode::Jump, &shape).unwrap();
        assert_eq!(descriptor.format_index, 18);
        assert_eq!(lookup(word.lookup_word(), format_list().len()).unwrap(), 18);
    }

    #[test]
    fn jump_with_source_register_picks_conditional_form() {
        let shape = InstrShape::default().with_rs().with_jump_delta(100);
        let (descriptor, word) = fit_code(Opcode::Jump, &shape).unwrap();
        assert_eq!(descriptor.format_index, 19);
        assert_eq!(lookup(word.lookup_word(), format_list().len()).unwrap(), 19);
    }

    #[test]
    fn every_descriptor_round_trips_through_lookup() {
        let list = format_list();
        for descriptor in &list {
            if descriptor.format_index as usize == crate::table::RESERVED {
                continue;
            }
            let shape = InstrShape {
                needs_rt: descriptor.op_avail.contains(OperandAvail::RT),
                needs_rs: descriptor.op_avail.contains(OperandAvail::RS),
                immediate: (descriptor.imm_size > 0).then_some(Immediate::Signed(1)),
                jump_delta: (descriptor.jump_size > 0).then_some(4),
                immediate_unsigned: false,
            };
            let Some(opcode) = crate::opcode::Opcode::from_op1(descriptor.op1_low) else {
                continue;
            };
            let (found, word) = fit_code(opcode, &shape).unwrap();
            assert_eq!(
                lookup(word.lookup_word(), list.len()).unwrap(),
                found.format_index as usize
            );
        }
    }
}
