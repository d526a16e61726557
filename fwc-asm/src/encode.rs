//! Turns a finished, control-flow-compiled `SCode` sequence into bytes: for
//! each record, asks the format table (C3) for a concrete encoding and
//! writes the packed words into a section buffer (§2 "Data flow": "writes
//! the encoded bytes through C2 into the section data").
//!
//! Label targets are resolved in one extra pass over the already-laid-out
//! `SCode` list rather than by iterative relaxation: every jump is first
//! encoded against a zero placeholder delta (which, for a function-sized
//! body, picks the same descriptor the eventual small delta will), then
//! patched once every label's byte offset is known. If the real delta
//! needs a wider encoding than the placeholder chose, that's reported as
//! [`AsmErrorKind::OffsetTooLarge`] rather than silently producing a
//! misaligned buffer.

use std::collections::HashMap;

use fwc_buffer::ByteBuffer;
use fwc_format::{fit_code, EncodedWord, FormatError, InstrShape};
use fwc_types::SymbolId;

use crate::error::AsmErrorKind;
use crate::scode::SCode;

fn translate_format_error(err: FormatError) -> AsmErrorKind {
    match err {
        FormatError::NoInstructionFit => AsmErrorKind::NoInstructionFit,
        FormatError::TableCorrupt { .. } => AsmErrorKind::TableCorrupt,
    }
}

fn scode_shape(code: &SCode, jump_delta: Option<i64>) -> InstrShape {
    let mut shape = InstrShape {
        needs_rs: code.reg1.is_some(),
        needs_rt: code.reg2.is_some(),
        ..InstrShape::default()
    };
    // The jump-merge optimizer's fused opcodes (§4.4) carry their operand
    // count (always 1, or the sign/zero test) in the opcode itself — the
    // table has no immediate slot for them, so `value` on a fused record
    // is metadata for the merge step, not a wire-level operand.
    let carries_immediate = !code.instruction.opcode.map(|op| op.is_fused()).unwrap_or(false);
    if carries_immediate {
        if let Some(value) = code.value {
            shape = shape.with_immediate(value);
        }
    }
    if let Some(delta) = jump_delta {
        shape = shape.with_jump_delta(delta);
    }
    shape
}

fn encode(code: &SCode, jump_delta: Option<i64>) -> Result<EncodedWord, AsmErrorKind> {
    let opcode = code.instruction.opcode.ok_or(AsmErrorKind::NoInstructionFit)?;
    let shape = scode_shape(code, jump_delta);
    fit_code(opcode, &shape).map(|(_, word)| word).map_err(translate_format_error)
}

fn write_words(buffer: &mut ByteBuffer, word: &EncodedWord) -> usize {
    let bytes: Vec<u8> = word.words[..word.len as usize]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    buffer.append(&bytes)
}

/// A jump instruction whose target wasn't known yet when it was first
/// encoded; its position and resolved descriptor are kept so the real
/// delta can be patched in once every label has a byte offset.
struct PendingJump {
    instr_offset: usize,
    target: SymbolId,
    placeholder: EncodedWord,
    record: SCode,
}

/// Encodes a compiled instruction stream into one section's worth of raw
/// bytes.
#[derive(Debug, Default)]
pub struct CodeEmitter {
    buffer: ByteBuffer,
}

impl CodeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Encodes every record in `code`, in order. Label records contribute
    /// no bytes; they only fix the byte offset their symbol resolves to.
    pub fn emit_all(&mut self, code: &[SCode]) -> Result<(), AsmErrorKind> {
        let mut offsets: HashMap<SymbolId, usize> = HashMap::new();
        let mut pending: Vec<PendingJump> = Vec::new();

        for record in code {
            if record.is_label() {
                offsets.insert(record.label, self.buffer.len());
                continue;
            }

            let has_jump_target = record.etype.contains(crate::scode::EType::HAS_JUMP_OFFSET)
                && record.etype.contains(crate::scode::EType::HAS_SYMBOL);

            if has_jump_target {
                let instr_offset = self.buffer.len();
                let placeholder = encode(record, Some(0))?;
                write_words(&mut self.buffer, &placeholder);
                pending.push(PendingJump {
                    instr_offset,
                    target: record.sym5,
                    placeholder,
                    record: *record,
                });
            } else {
                let word = encode(record, None)?;
                write_words(&mut self.buffer, &word);
            }
        }

        for job in pending {
            let target_offset = offsets
                .get(&job.target)
                .copied()
                .ok_or(AsmErrorKind::SymbolUndefined { symbol: String::new() })?;
            let next_instr = job.instr_offset + job.placeholder.len as usize * 4;
            let delta = target_offset as i64 - next_instr as i64;

            let opcode = job.record.instruction.opcode.ok_or(AsmErrorKind::NoInstructionFit)?;
            let shape = scode_shape(&job.record, Some(delta));
            let (_, resolved) = fit_code(opcode, &shape).map_err(translate_format_error)?;
            if resolved.len != job.placeholder.len {
                return Err(AsmErrorKind::OffsetTooLarge);
            }

            let bytes: Vec<u8> = resolved.words[..resolved.len as usize]
                .iter()
                .flat_map(|w| w.to_le_bytes())
                .collect();
            self.buffer
                .write_bytes(job.instr_offset, &bytes)
                .map_err(|_| AsmErrorKind::ContainerOverflow)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scode::{EType, Instruction, JumpFlags};
    use fwc_format::Opcode;
    use fwc_types::{DataType, Immediate, RegisterRef};

    fn add(dest: RegisterRef, value: i64) -> SCode {
        SCode {
            instruction: Instruction::new(Opcode::Add),
            dest: Some(dest),
            reg1: Some(dest),
            value: Some(Immediate::Signed(value)),
            dtype: Some(DataType::new(fwc_types::BaseType::Int32)),
            ..SCode::default()
        }
    }

    #[test]
    fn plain_instructions_accumulate_bytes_in_order() {
        let reg = RegisterRef::general(0);
        let mut emitter = CodeEmitter::new();
        emitter.emit_all(&[add(reg, 1), add(reg, 2)]).unwrap();
        assert!(emitter.len() > 0);
        assert_eq!(emitter.len() % 4, 0);
    }

    #[test]
    fn backward_jump_patches_a_negative_delta() {
        let reg = RegisterRef::general(0);
        let label = SCode::label_at(1, 1);
        let back_jump = SCode {
            instruction: Instruction::with_jump(Opcode::Jump, JumpFlags::CARRY),
            sym5: 1,
            section: 1,
            etype: EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET,
            ..SCode::default()
        };
        let mut emitter = CodeEmitter::new();
        emitter.emit_all(&[label, add(reg, 1), back_jump]).unwrap();
        // ADD register-immediate (format 4, 2 words) + JUMP short form (format 18, 1 word).
        assert_eq!(emitter.len(), 12);
    }

    #[test]
    fn jump_to_an_undefined_symbol_is_an_error() {
        let jump = SCode {
            instruction: Instruction::with_jump(Opcode::Jump, JumpFlags::empty()),
            sym5: 42,
            section: 1,
            etype: EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET,
            ..SCode::default()
        };
        let mut emitter = CodeEmitter::new();
        assert!(emitter.emit_all(&[jump]).is_err());
    }
}
