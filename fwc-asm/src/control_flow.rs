//! State machines for `if`/`else`, `while`, `do`/`while`, `for`,
//! `for ... in`, `break`/`continue`, and `push`/`pop` (§4.5).
//!
//! Every construct is a pair of procedures: one for the introducer line
//! (pushes a block, emits a prologue), one for the closing `}` (pops the
//! block, emits an epilogue). Pairing is purely stack-based — `}` always
//! acts on whatever `BlockKind` sits on top.

use fwc_format::Opcode;
use fwc_types::{DataType, RegisterRef, SectionId, SymbolId, NONE_SYMBOL};

use crate::block::{BlockKind, BlockStack, SBlock};
use crate::condition::invert_condition;
use crate::error::AsmErrorKind;
use crate::labels::LabelTable;
use crate::merge;
use crate::options::AssemblerOptions;
use crate::scode::{EType, Instruction, JumpFlags, SCode};

/// Result of constant-folding a `for` loop's init against its condition
/// (§4.5 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFirst {
    Unknown,
    ZeroTrips,
    AlwaysTrue,
}

/// Drives the block stack, label table, and a deferred-instruction buffer
/// for loop epilogues that must be assembled only after the body is known.
pub struct ControlFlowCompiler {
    blocks: BlockStack,
    labels: LabelTable,
    code: Vec<SCode>,
    deferred: Vec<SCode>,
    options: AssemblerOptions,
}

fn jump_to(section: SectionId, jump: JumpFlags, target: SymbolId) -> SCode {
    SCode {
        instruction: Instruction::with_jump(Opcode::Jump, jump),
        sym5: target,
        section,
        etype: EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET,
        ..SCode::default()
    }
}

impl ControlFlowCompiler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self {
            blocks: BlockStack::new(),
            labels: LabelTable::new(),
            code: Vec::new(),
            deferred: Vec::new(),
            options,
        }
    }

    pub fn code(&self) -> &[SCode] {
        &self.code
    }

    pub fn block_depth(&self) -> usize {
        self.blocks.depth()
    }

    /// Appends `scode` to the code buffer, first offering it to the
    /// jump-merge optimizer against the previous instruction (§4.4).
    fn emit(&mut self, scode: SCode) {
        tracing::trace!(opcode = ?scode.instruction.opcode, "emit scode");
        if matches!(scode.instruction.opcode, Some(Opcode::Jump) | Some(Opcode::Compare)) {
            if let Some(prev) = self.code.last().copied() {
                if let Some(fused) = merge::try_fuse(&prev, &scode, self.options.optimizations_enabled()) {
                    self.code.pop();
                    self.code.push(fused);
                    return;
                }
            }
        }
        self.code.push(scode);
    }

    fn emit_label(&mut self, section: SectionId, label: SymbolId) {
        self.emit(SCode::label_at(section, label));
    }

    // ---- if / else ----

    /// Compiles the `if (cond) {` line. `condition` is already reduced via
    /// §4.3. Returns the block's jump label, in case the caller wants to
    /// apply the empty-body shortcut instead (§4.5 step 3) by discarding
    /// this push and emitting `condition` directly at the jump's own
    /// target.
    pub fn begin_if(&mut self, mut condition: SCode, start_bracket: u32, section: SectionId) {
        invert_condition(&mut condition);
        let block_number = self.blocks.push(BlockKind::If, start_bracket).block_number;
        let label = self.labels.synthesize("if", block_number, "a");
        condition.sym5 = label;
        condition.section = section;
        condition.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
        self.emit(condition);
        if let Some(top) = self.blocks.top_mut() {
            top.jump_label = label;
        }
    }

    /// Compiles the closing `}` of an `if` body. `has_else` indicates
    /// whether an `else {` follows immediately.
    pub fn end_if(&mut self, section: SectionId, has_else: bool) -> SBlock {
        let block = self.blocks.pop().expect("end_if without matching begin_if");
        if has_else {
            let label_b = self.labels.synthesize("if", block.block_number, "b");
            self.emit(jump_to(section, JumpFlags::empty(), label_b));
            self.emit_label(section, block.jump_label);
            let mut else_block = SBlock::new(BlockKind::Else, block.block_number, block.start_bracket);
            else_block.jump_label = label_b;
            self.blocks.push_block(else_block);
        } else {
            self.emit_label(section, block.jump_label);
        }
        block
    }

    /// Compiles the closing `}` of an `else` body.
    pub fn end_else(&mut self, section: SectionId) -> SBlock {
        let block = self.blocks.pop().expect("end_else without matching begin_if/else");
        self.emit_label(section, block.jump_label);
        block
    }

    // ---- while ----

    pub fn begin_while(&mut self, condition: SCode, start_bracket: u32, section: SectionId) {
        let block_number = self.blocks.push(BlockKind::While, start_bracket).block_number;
        let label_a = self.labels.synthesize("while", block_number, "a");
        let label_b = self.labels.synthesize("while", block_number, "b");

        let mut pre_test = condition.clone();
        invert_condition(&mut pre_test);
        pre_test.sym5 = label_b;
        pre_test.section = section;
        pre_test.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
        self.emit(pre_test);

        self.emit_label(section, label_a);

        let mut back_edge = condition;
        back_edge.sym5 = label_a;
        back_edge.section = section;
        back_edge.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
        let deferred_index = self.deferred.len() as u32;
        self.deferred.push(back_edge);

        if let Some(top) = self.blocks.top_mut() {
            top.jump_label = label_a;
            top.break_label = label_b;
            top.code_buffer_index = deferred_index;
            top.code_buffer_count = 1;
        }
    }

    pub fn end_while(&mut self, section: SectionId) -> SBlock {
        let block = self.blocks.pop().expect("end_while without matching begin_while");
        self.flush_loop_epilogue(&block, section);
        block
    }

    // ---- do / while ----

    pub fn begin_do_while(&mut self, start_bracket: u32, section: SectionId) {
        let block_number = self.blocks.push(BlockKind::DoWhile, start_bracket).block_number;
        let label_a = self.labels.synthesize("do", block_number, "a");
        self.emit_label(section, label_a);
        if let Some(top) = self.blocks.top_mut() {
            top.jump_label = label_a;
        }
    }

    /// Compiles the trailing `while (cond);` at the closing `}` of a
    /// `do`-body.
    pub fn end_do_while(&mut self, mut condition: SCode, section: SectionId) -> SBlock {
        let block = self.blocks.pop().expect("end_do_while without matching begin_do_while");
        if block.continue_label != NONE_SYMBOL {
            self.emit_label(section, block.continue_label);
        }
        condition.sym5 = block.jump_label;
        condition.section = section;
        condition.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
        self.emit(condition);
        if block.break_label != NONE_SYMBOL {
            self.emit_label(section, block.break_label);
        }
        block
    }

    // ---- for ----

    /// `init` (already interpreted, possibly with its data type widened via
    /// `DataType::widen_for_loop_init`) is emitted immediately; `condition`
    /// and `increment` are deferred to the closing `}`.
    pub fn begin_for(
        &mut self,
        init: Option<SCode>,
        condition: SCode,
        increment: SCode,
        condition_first: ConditionFirst,
        start_bracket: u32,
        section: SectionId,
    ) {
        if let Some(init) = init {
            self.emit(init);
        }

        let block_number = self.blocks.push(BlockKind::For, start_bracket).block_number;
        let top_kind = if condition_first == ConditionFirst::AlwaysTrue {
            "infinite_loop"
        } else {
            "for"
        };
        let label_a = self.labels.synthesize(top_kind, block_number, "a");
        let label_b = self.labels.synthesize("for", block_number, "b");

        let break_label = match condition_first {
            ConditionFirst::Unknown => {
                let mut pre_test = condition.clone();
                invert_condition(&mut pre_test);
                pre_test.sym5 = label_b;
                pre_test.section = section;
                pre_test.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
                self.emit(pre_test);
                // `label_b` is both the pre-test's skip target and this loop's
                // break label — without a break in the body, nothing else would
                // ever emit it, leaving the pre-test jump dangling.
                label_b
            }
            ConditionFirst::ZeroTrips => {
                let zero_label = self.labels.synthesize("for", block_number, "goes_zero_times");
                self.emit(jump_to(section, JumpFlags::empty(), zero_label));
                zero_label
            }
            ConditionFirst::AlwaysTrue => NONE_SYMBOL,
        };

        self.emit_label(section, label_a);

        let mut back_condition = condition;
        back_condition.sym5 = label_a;
        back_condition.section = section;
        back_condition.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;

        let mut increment = increment;
        increment.section = section;

        let deferred_index = self.deferred.len() as u32;
        self.deferred.push(increment);
        self.deferred.push(back_condition);

        if let Some(top) = self.blocks.top_mut() {
            top.jump_label = label_a;
            top.break_label = break_label;
            top.code_buffer_index = deferred_index;
            top.code_buffer_count = 2;
        }
    }

    pub fn end_for(&mut self, section: SectionId) -> SBlock {
        let block = self.blocks.pop().expect("end_for without matching begin_for");
        self.flush_loop_epilogue(&block, section);
        block
    }

    // ---- for ... in (vector loop) ----

    /// `start_check`, when present, is the `COMPARE r_index, 0` + inverted
    /// positive-jump emitted unless the start-check elision applies (§4.5:
    /// "inspect the previous emitted instruction: if it is a MOVE of a
    /// positive integer constant into `r_index`, no runtime check is
    /// needed").
    pub fn begin_for_in(
        &mut self,
        start_check: Option<SCode>,
        index_register: RegisterRef,
        element_type: DataType,
        start_bracket: u32,
        section: SectionId,
    ) {
        let block_number = self.blocks.push(BlockKind::ForIn, start_bracket).block_number;
        let label_a = self.labels.synthesize("for_in", block_number, "a");
        let label_b = self.labels.synthesize("for_in", block_number, "b");

        if let Some(mut check) = start_check {
            check.sym5 = label_b;
            check.section = section;
            check.etype |= EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET;
            self.emit(check);
        }

        self.emit_label(section, label_a);
        self.blocks.set_vector_fields(index_register, element_type);
        if let Some(top) = self.blocks.top_mut() {
            top.jump_label = label_a;
            top.break_label = label_b;
        }
    }

    pub fn end_for_in(&mut self, section: SectionId) -> SBlock {
        let block = self.blocks.pop().expect("end_for_in without matching begin_for_in");
        if block.continue_label != NONE_SYMBOL {
            self.emit_label(section, block.continue_label);
        }
        let step = SCode {
            instruction: Instruction::with_jump(Opcode::SubMaxlen, JumpFlags::POSITIVE),
            dest: block.vector_index,
            reg1: block.vector_index,
            dtype: block.element_type,
            sym5: block.jump_label,
            section,
            etype: EType::HAS_REG1 | EType::HAS_SYMBOL | EType::HAS_JUMP_OFFSET,
            ..SCode::default()
        };
        self.emit(step);
        if block.break_label != NONE_SYMBOL {
            self.emit_label(section, block.break_label);
        }
        block
    }

    fn flush_loop_epilogue(&mut self, block: &SBlock, section: SectionId) {
        if block.continue_label != NONE_SYMBOL {
            self.emit_label(section, block.continue_label);
        }
        let start = block.code_buffer_index as usize;
        let end = start + block.code_buffer_count as usize;
        for deferred in self.deferred[start..end].to_vec() {
            self.emit(deferred);
        }
        if block.break_label != NONE_SYMBOL {
            self.emit_label(section, block.break_label);
        }
    }

    // ---- break / continue ----

    pub fn compile_break(&mut self, section: SectionId) -> Result<(), AsmErrorKind> {
        let labels = &mut self.labels;
        let label = self
            .blocks
            .resolve_break(|kind, number| labels.synthesize(&kind.to_string().to_lowercase(), number, "b"))
            .ok_or(AsmErrorKind::MisplacedBreak)?;
        self.emit(jump_to(section, JumpFlags::empty(), label));
        Ok(())
    }

    pub fn compile_continue(&mut self, section: SectionId) -> Result<(), AsmErrorKind> {
        let labels = &mut self.labels;
        let label = self
            .blocks
            .resolve_continue(|kind, number| labels.synthesize(&kind.to_string().to_lowercase(), number, "c"))
            .ok_or(AsmErrorKind::MisplacedContinue)?;
        self.emit(jump_to(section, JumpFlags::empty(), label));
        Ok(())
    }

    // ---- push / pop ----

    /// `push(reg1 [, reg2 [, imm]])` / `pop(...)`: push/pop the inclusive
    /// register range `[reg2, imm]` through the stack pointer `reg1`.
    /// `reg2`/`imm` default so the shorthand `push(r)` means
    /// `reg1 = default stack pointer, reg2 = imm = r` (§4.5).
    pub fn compile_push_pop(
        &mut self,
        is_push: bool,
        reg1: RegisterRef,
        reg2: RegisterRef,
        imm: RegisterRef,
        dtype: DataType,
        section: SectionId,
    ) -> Result<(), AsmErrorKind> {
        if !reg1.family.is_general() {
            return Err(AsmErrorKind::WrongRegisterType);
        }
        if reg2.family.is_vector() && imm.id & 0x80 != 0 {
            return Err(AsmErrorKind::WrongOperandCombination);
        }
        if imm.id < reg2.id {
            return Err(AsmErrorKind::OperandsWrongOrder);
        }
        let opcode = if is_push { Opcode::Push } else { Opcode::Pop };
        self.emit(SCode {
            instruction: Instruction::new(opcode),
            dtype: Some(dtype),
            dest: Some(reg1),
            reg1: Some(reg2),
            reg2: Some(imm),
            section,
            etype: EType::HAS_REG1 | EType::HAS_REG2,
            ..SCode::default()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwc_types::BaseType;

    fn cmp(jump: JumpFlags) -> SCode {
        SCode {
            instruction: Instruction::with_jump(Opcode::Jump, jump),
            dtype: Some(DataType::new(BaseType::Int32)),
            ..SCode::default()
        }
    }

    #[test]
    fn if_without_else_emits_inverted_condition_then_label() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.begin_if(cmp(JumpFlags::ZERO), 0, 1);
        assert_eq!(compiler.block_depth(), 1);
        compiler.end_if(1, false);
        assert_eq!(compiler.block_depth(), 0);
        assert_eq!(compiler.code().len(), 2);
        assert!(compiler.code()[0].instruction.jump.contains(JumpFlags::INVERT));
        assert!(compiler.code()[1].is_label());
    }

    #[test]
    fn if_else_emits_two_labels_and_an_unconditional_jump() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.begin_if(cmp(JumpFlags::ZERO), 0, 1);
        compiler.end_if(1, true);
        compiler.end_else(1);
        // inverted-cond, jump-to-b, label-a, label-b
        assert_eq!(compiler.code().len(), 4);
        assert!(compiler.code()[3].is_label());
    }

    #[test]
    fn while_loop_emits_pretest_top_label_and_back_edge_at_close() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.begin_while(cmp(JumpFlags::ZERO), 0, 1);
        // pre-test jump, top label
        assert_eq!(compiler.code().len(), 2);
        compiler.end_while(1);
        // + back-edge, + break label
        assert_eq!(compiler.code().len(), 4);
    }

    #[test]
    fn break_outside_a_loop_is_misplaced() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.blocks.push(BlockKind::Func, 0);
        assert_eq!(compiler.compile_break(1), Err(AsmErrorKind::MisplacedBreak));
    }

    #[test]
    fn continue_inside_while_resolves_and_is_idempotent() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.begin_while(cmp(JumpFlags::ZERO), 0, 1);
        compiler.compile_continue(1).unwrap();
        compiler.compile_continue(1).unwrap();
        let block = compiler.end_while(1);
        assert_ne!(block.continue_label, NONE_SYMBOL);
    }

    #[test]
    fn push_rejects_reversed_range() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        let r = |n| RegisterRef::general(n);
        let result = compiler.compile_push_pop(true, r(31), r(5), r(2), DataType::new(BaseType::Int64), 1);
        assert_eq!(result, Err(AsmErrorKind::OperandsWrongOrder));
    }

    #[test]
    fn push_rejects_non_general_stack_pointer() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        let result = compiler.compile_push_pop(
            true,
            RegisterRef::vector(0),
            RegisterRef::general(1),
            RegisterRef::general(1),
            DataType::new(BaseType::Int64),
            1,
        );
        assert_eq!(result, Err(AsmErrorKind::WrongRegisterType));
    }

    #[test]
    fn for_loop_with_zero_trips_condition_jumps_straight_to_break_label() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compiler.begin_for(None, cmp(JumpFlags::ZERO), cmp(JumpFlags::ZERO), ConditionFirst::ZeroTrips, 0, 1);
        // unconditional jump to goes_zero_times, top label
        assert_eq!(compiler.code().len(), 2);
        let block = compiler.end_for(1);
        assert_ne!(block.break_label, NONE_SYMBOL);
    }
}
