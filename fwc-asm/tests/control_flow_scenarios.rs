//! End-to-end scenarios combining the block stack, condition compiler, and
//! jump-merge optimizer.

use fwc_asm::{
    AssemblerOptions, BlockKind, ConditionFirst, ControlFlowCompiler, EType, Instruction, JumpFlags, SCode,
};
use fwc_format::{fit_code, Opcode};
use fwc_types::{BaseType, DataType, Immediate, NONE_SYMBOL};

fn unsigned_compare(jump: JumpFlags) -> SCode {
    let reg = fwc_types::RegisterRef::general(0);
    SCode {
        instruction: Instruction::with_jump(Opcode::Jump, jump),
        dtype: Some(DataType::new(BaseType::Int32).unsigned().plus()),
        reg1: Some(reg),
        etype: EType::HAS_REG1,
        ..SCode::default()
    }
}

/// A real compiled comparison (as opposed to the test helpers above, which
/// hand-build an already-reduced `Opcode::Jump` condition) must survive the
/// whole pipeline: `compile_condition` keeps it as `Opcode::Compare`, and
/// the format table has to have a descriptor that can actually encode the
/// compare's own operands alongside the jump it carries.
#[test]
fn real_compare_condition_compiles_and_encodes_through_the_full_pipeline() {
    let reg = fwc_types::RegisterRef::general(0);
    let other = fwc_types::RegisterRef::general(1);
    let raw_condition = SCode {
        instruction: Instruction::new(Opcode::Compare),
        dtype: Some(DataType::new(BaseType::Int32)),
        reg1: Some(reg),
        reg2: Some(other),
        optionbits: 1 << 1, // "less than" predicate
        etype: EType::HAS_REG1 | EType::HAS_REG2,
        ..SCode::default()
    };
    let (condition, err) = fwc_asm::compile_condition(raw_condition);
    assert!(err.is_none());
    assert_eq!(condition.instruction.opcode, Some(Opcode::Compare));

    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    compiler.begin_if(condition, 0, 1);
    compiler.end_if(1, false);

    let mut emitter = fwc_asm::CodeEmitter::new();
    emitter.emit_all(compiler.code()).expect("a real compare-jump must fit a descriptor");
    assert!(emitter.len() > 0);
}

/// Same as above, but with the comparison against an immediate rather than
/// a second register — exercises row 14 instead of row 13.
#[test]
fn real_compare_against_an_immediate_compiles_and_encodes() {
    let reg = fwc_types::RegisterRef::general(0);
    let raw_condition = SCode {
        instruction: Instruction::new(Opcode::Compare),
        dtype: Some(DataType::new(BaseType::Int32)),
        reg1: Some(reg),
        value: Some(Immediate::Signed(5)),
        optionbits: 1 << 1,
        etype: EType::HAS_REG1 | EType::HAS_IMMEDIATE_INT,
        ..SCode::default()
    };
    let (condition, err) = fwc_asm::compile_condition(raw_condition);
    assert!(err.is_none());

    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    compiler.begin_if(condition, 0, 1);
    compiler.end_if(1, false);

    let mut emitter = fwc_asm::CodeEmitter::new();
    emitter.emit_all(compiler.code()).expect("a real compare-jump-with-immediate must fit a descriptor");
    assert!(emitter.len() > 0);
}

/// The header lines an embedder would actually see (`if (r0 < r1) {`,
/// `break;`) drive the whole pipeline end to end: lexing, header parsing,
/// the condition compiler, the block stack, and encoding.
#[test]
fn source_level_if_and_break_headers_drive_the_full_pipeline() {
    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    fwc_asm::header::begin_while(&mut compiler, "while (r0 < r1)", 0, 1).unwrap();
    fwc_asm::header::begin_if(&mut compiler, "if (r0 == r1)", 1, 1).unwrap();
    fwc_asm::header::compile_break(&mut compiler, "break;", 1).unwrap();
    compiler.end_if(1, false);
    let block = compiler.end_while(1);
    assert_ne!(block.break_label, NONE_SYMBOL);

    let mut emitter = fwc_asm::CodeEmitter::new();
    emitter.emit_all(compiler.code()).expect("header-parsed compares must fit a descriptor");
    assert!(emitter.len() > 0);
}

#[test]
fn while_loop_with_break_materializes_the_break_label_exactly_once() {
    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    compiler.begin_while(unsigned_compare(JumpFlags::CARRY), 0, 1);
    compiler.begin_if(unsigned_compare(JumpFlags::ZERO), 1, 1);
    compiler.compile_break(1).unwrap();
    compiler.end_if(1, false);
    let while_block = compiler.end_while(1);

    assert_ne!(while_block.break_label, NONE_SYMBOL);
    let break_labels = compiler
        .code()
        .iter()
        .filter(|scode| scode.is_label() && scode.label == while_block.break_label)
        .count();
    assert_eq!(break_labels, 1);
    assert_eq!(compiler.block_depth(), 0);
}

#[test]
fn for_loop_increment_and_compare_fuse_into_increment_compare_jump() {
    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    let reg = fwc_types::RegisterRef::general(0);

    let increment = SCode {
        instruction: Instruction::new(Opcode::Add),
        dest: Some(reg),
        reg1: Some(reg),
        value: Some(fwc_types::Immediate::Signed(1)),
        dtype: Some(DataType::new(BaseType::Int32)),
        ..SCode::default()
    };
    let condition = SCode {
        instruction: Instruction::with_jump(Opcode::Jump, JumpFlags::CARRY),
        reg1: Some(reg),
        dtype: Some(DataType::new(BaseType::Int32).unsigned()),
        ..SCode::default()
    };

    compiler.begin_for(None, condition, increment, ConditionFirst::Unknown, 0, 1);
    let block = compiler.end_for(1);

    let fused = compiler
        .code()
        .iter()
        .any(|scode| scode.instruction.opcode == Some(Opcode::IncrementCompareJumpBelow));
    assert!(fused, "expected the deferred increment+compare to fuse");
    assert_ne!(block.jump_label, NONE_SYMBOL);
}

#[test]
fn for_loop_with_no_break_still_emits_its_pre_test_target_label() {
    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    let reg = fwc_types::RegisterRef::general(0);

    let increment = SCode {
        instruction: Instruction::new(Opcode::Add),
        dest: Some(reg),
        reg1: Some(reg),
        value: Some(fwc_types::Immediate::Signed(1)),
        dtype: Some(DataType::new(BaseType::Int32)),
        ..SCode::default()
    };
    let condition = SCode {
        instruction: Instruction::with_jump(Opcode::Jump, JumpFlags::CARRY),
        reg1: Some(reg),
        dtype: Some(DataType::new(BaseType::Int32).unsigned()),
        ..SCode::default()
    };

    // condition_first is Unknown, and the body below never calls compile_break —
    // the pre-test's forward jump has to get its target label from somewhere
    // other than a break statement.
    compiler.begin_for(None, condition, increment, ConditionFirst::Unknown, 0, 1);
    let block = compiler.end_for(1);

    assert_ne!(block.break_label, NONE_SYMBOL);
    let pre_test_targets = compiler
        .code()
        .iter()
        .filter(|scode| scode.is_label() && scode.label == block.break_label)
        .count();
    assert_eq!(pre_test_targets, 1, "the pre-test's forward jump target must be emitted exactly once");
}

#[test]
fn for_in_loop_emits_sub_maxlen_step_and_break_label_once() {
    let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
    let index = fwc_types::RegisterRef::vector(2);
    let element_type = DataType::new(BaseType::Int32);

    compiler.begin_for_in(None, index, element_type, 0, 1);
    compiler.begin_if(unsigned_compare(JumpFlags::ZERO), 1, 1);
    compiler.compile_break(1).unwrap();
    compiler.end_if(1, false);
    let block = compiler.end_for_in(1);

    assert_ne!(block.break_label, NONE_SYMBOL);
    let step_count = compiler
        .code()
        .iter()
        .filter(|scode| scode.instruction.opcode == Some(Opcode::SubMaxlen))
        .count();
    assert_eq!(step_count, 1);
    let break_labels = compiler
        .code()
        .iter()
        .filter(|scode| scode.is_label() && scode.label == block.break_label)
        .count();
    assert_eq!(break_labels, 1);
    assert_eq!(compiler.block_depth(), 0);
}
