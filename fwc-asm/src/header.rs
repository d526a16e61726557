//! Parses a header line's token stream into the construct §4.5 names, then
//! drives [`ControlFlowCompiler`]'s matching `begin_*`/`end_*`/`compile_*`
//! method — the token-consuming half that the block-stack state machines
//! themselves deliberately stay free of, so they stay testable against
//! directly-built `SCode` values (as their own unit tests already do).
//!
//! `for`'s init/increment legs are left out of scope here: §4.5 says they
//! are "reassembled as a synthetic single-line instruction" and handed to
//! "the line interpreter" — a general arbitrary-instruction parser this
//! crate doesn't build (the same category of out-of-scope front end as the
//! source file's own lexer). `for`'s condition leg uses the same grammar as
//! `if`/`while` and is covered by [`parse_condition`].

use fwc_types::{BaseType, DataType, RegisterRef, SectionId, DEFAULT_STACK_POINTER};

use crate::condition::compile_condition;
use crate::control_flow::ControlFlowCompiler;
use crate::error::AsmErrorKind;
use crate::lexer::{self, lex_header_line};
use crate::scode::{EType, Instruction, SCode};
use crate::token::{Token, TokenKind, TokenValue};

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect_keyword(&mut self, id: u32) -> Result<(), AsmErrorKind> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::HighLevelKeyword && t.id == id => {
                self.bump();
                Ok(())
            }
            _ => Err(AsmErrorKind::MisplacedToken { kind: "high-level keyword" }),
        }
    }

    fn expect_operator(&mut self, id: u32, err: AsmErrorKind) -> Result<(), AsmErrorKind> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Operator && t.id == id => {
                self.bump();
                Ok(())
            }
            _ => Err(err),
        }
    }

    fn take_operator(&mut self, id: u32) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Operator && t.id == id => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn take_type(&mut self) -> Option<DataType> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Type => {
                let id = t.id;
                self.bump();
                Some(decode_data_type(id))
            }
            _ => None,
        }
    }

    fn take_register(&mut self) -> Option<RegisterRef> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Register,
                value: TokenValue::Register(r),
                ..
            }) => {
                let r = *r;
                self.bump();
                Some(r)
            }
            _ => None,
        }
    }

    fn take_immediate(&mut self) -> Option<fwc_types::Immediate> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Number,
                value: TokenValue::Integer(v),
                ..
            }) => {
                let v = *v;
                self.bump();
                Some(v)
            }
            _ => None,
        }
    }
}

fn decode_data_type(id: u32) -> DataType {
    let base = match id & 0xF {
        0 => BaseType::Int8,
        1 => BaseType::Int16,
        2 => BaseType::Int32,
        3 => BaseType::Int64,
        4 => BaseType::Float16,
        5 => BaseType::Float32,
        _ => BaseType::Float64,
    };
    let dtype = DataType::new(base);
    if id & (1 << 4) != 0 {
        dtype.unsigned()
    } else {
        dtype
    }
}

/// Parses `[type] reg (< | <= | > | >= | == | !=) (reg | number)` into an
/// unreduced `COMPARE` `SCode`, ready for [`compile_condition`] (§4.3).
fn parse_condition(cursor: &mut Cursor) -> Result<SCode, AsmErrorKind> {
    let dtype = cursor.take_type().unwrap_or(DataType::new(BaseType::Int32));
    let lhs = cursor.take_register().ok_or(AsmErrorKind::ExpectLogical)?;

    let op_id = match cursor.peek() {
        Some(t) if t.kind == TokenKind::Operator => t.id,
        _ => return Err(AsmErrorKind::ExpectLogical),
    };
    let (predicate_bits, invert) = match op_id {
        lexer::OP_LT => (1u8, false),
        lexer::OP_LE => (2u8, true),
        lexer::OP_GT => (2u8, false),
        lexer::OP_GE => (1u8, true),
        lexer::OP_EQ => (0u8, false),
        lexer::OP_NE => (0u8, true),
        _ => return Err(AsmErrorKind::ExpectLogical),
    };
    cursor.bump();

    let mut code = SCode {
        instruction: Instruction::new(fwc_format::Opcode::Compare),
        dtype: Some(dtype),
        reg1: Some(lhs),
        optionbits: (predicate_bits << 1) | if invert { 1 } else { 0 },
        etype: EType::HAS_REG1,
        ..SCode::default()
    };

    if let Some(rhs) = cursor.take_register() {
        code.reg2 = Some(rhs);
        code.etype |= EType::HAS_REG2;
    } else if let Some(rhs) = cursor.take_immediate() {
        code.value = Some(rhs);
        code.etype |= EType::HAS_IMMEDIATE_INT;
    } else {
        return Err(AsmErrorKind::ExpectLogical);
    }

    Ok(code)
}

/// `if (cond)` / `while (cond)`: `expect '(', optional type, expression,
/// ')'` (§4.5).
fn parse_parenthesized_condition(cursor: &mut Cursor) -> Result<SCode, AsmErrorKind> {
    cursor.expect_operator(lexer::OP_LPAREN, AsmErrorKind::ExpectingParenthesis)?;
    let condition = parse_condition(cursor)?;
    cursor.expect_operator(lexer::OP_RPAREN, AsmErrorKind::ExpectingParenthesis)?;
    let (compiled, err) = compile_condition(condition);
    match err {
        Some(err) => Err(err),
        None => Ok(compiled),
    }
}

/// Lexes and parses an `if (...)` header line into a compiled condition,
/// ready for [`ControlFlowCompiler::begin_if`].
pub fn parse_if_header(line: &str) -> Result<SCode, AsmErrorKind> {
    let tokens = lex_header_line(line)?;
    let mut cursor = Cursor::new(&tokens);
    cursor.expect_keyword(lexer::KW_IF)?;
    parse_parenthesized_condition(&mut cursor)
}

/// Lexes and parses a `while (...)` header line, or a `do`-loop's trailing
/// `while (...);` (the two share the same grammar per §4.5).
pub fn parse_while_header(line: &str) -> Result<SCode, AsmErrorKind> {
    let tokens = lex_header_line(line)?;
    let mut cursor = Cursor::new(&tokens);
    cursor.expect_keyword(lexer::KW_WHILE)?;
    parse_parenthesized_condition(&mut cursor)
}

/// A parsed `push`/`pop` header's operands, ready for
/// [`ControlFlowCompiler::compile_push_pop`].
pub struct PushPopOperands {
    pub is_push: bool,
    pub reg1: RegisterRef,
    pub reg2: RegisterRef,
    pub imm: RegisterRef,
    pub dtype: DataType,
}

/// Parses `push(reg1 [, reg2 [, imm]])` / `pop(...)` (§4.5). The one-operand
/// shorthand `push(r)` means `reg1 = default stack pointer, reg2 = imm = r`;
/// the two-operand form `push(r1, r2)` defaults `imm = r2`.
pub fn parse_push_pop_header(line: &str) -> Result<PushPopOperands, AsmErrorKind> {
    let tokens = lex_header_line(line)?;
    let mut cursor = Cursor::new(&tokens);

    let is_push = match cursor.peek() {
        Some(t) if t.kind == TokenKind::HighLevelKeyword && t.id == lexer::KW_PUSH => true,
        Some(t) if t.kind == TokenKind::HighLevelKeyword && t.id == lexer::KW_POP => false,
        _ => return Err(AsmErrorKind::MisplacedToken { kind: "high-level keyword" }),
    };
    cursor.bump();

    let dtype = cursor.take_type().unwrap_or(DataType::new(BaseType::Int64));
    cursor.expect_operator(lexer::OP_LPAREN, AsmErrorKind::ExpectingParenthesis)?;

    let mut operands = Vec::new();
    loop {
        let reg = cursor.take_register().ok_or(AsmErrorKind::WrongOperandType)?;
        operands.push(reg);
        if operands.len() > 3 {
            return Err(AsmErrorKind::TooManyOperands);
        }
        if !cursor.take_operator(lexer::OP_COMMA) {
            break;
        }
    }
    cursor.expect_operator(lexer::OP_RPAREN, AsmErrorKind::ExpectingParenthesis)?;

    let (reg1, reg2, imm) = match operands[..] {
        [r] => (RegisterRef::general(DEFAULT_STACK_POINTER), r, r),
        [r1, r2] => (r1, r2, r2),
        [r1, r2, r3] => (r1, r2, r3),
        _ => return Err(AsmErrorKind::TooManyOperands),
    };

    Ok(PushPopOperands {
        is_push,
        reg1,
        reg2,
        imm,
        dtype,
    })
}

/// Lexes `break;` / `continue;`, checking only that the expected keyword
/// leads the line — these headers carry no operands.
fn parse_bare_keyword(line: &str, id: u32) -> Result<(), AsmErrorKind> {
    let tokens = lex_header_line(line)?;
    let mut cursor = Cursor::new(&tokens);
    cursor.expect_keyword(id)
}

/// Lexes and drives `begin_if` directly from an `if (...)` header line.
pub fn begin_if(compiler: &mut ControlFlowCompiler, line: &str, start_bracket: u32, section: SectionId) -> Result<(), AsmErrorKind> {
    let condition = parse_if_header(line)?;
    compiler.begin_if(condition, start_bracket, section);
    Ok(())
}

/// Lexes and drives `begin_while` directly from a `while (...)` header line.
pub fn begin_while(compiler: &mut ControlFlowCompiler, line: &str, start_bracket: u32, section: SectionId) -> Result<(), AsmErrorKind> {
    let condition = parse_while_header(line)?;
    compiler.begin_while(condition, start_bracket, section);
    Ok(())
}

/// Lexes and drives `end_do_while` directly from the closing `while (...);`
/// header line.
pub fn end_do_while(compiler: &mut ControlFlowCompiler, line: &str, section: SectionId) -> Result<crate::block::SBlock, AsmErrorKind> {
    let condition = parse_while_header(line)?;
    Ok(compiler.end_do_while(condition, section))
}

/// Lexes and drives `compile_push_pop` directly from a `push(...)`/`pop(...)`
/// header line.
pub fn compile_push_pop(compiler: &mut ControlFlowCompiler, line: &str, section: SectionId) -> Result<(), AsmErrorKind> {
    let operands = parse_push_pop_header(line)?;
    compiler.compile_push_pop(operands.is_push, operands.reg1, operands.reg2, operands.imm, operands.dtype, section)
}

/// Lexes and drives `compile_break` directly from a `break;` header line.
pub fn compile_break(compiler: &mut ControlFlowCompiler, line: &str, section: SectionId) -> Result<(), AsmErrorKind> {
    parse_bare_keyword(line, lexer::KW_BREAK)?;
    compiler.compile_break(section)
}

/// Lexes and drives `compile_continue` directly from a `continue;` header
/// line.
pub fn compile_continue(compiler: &mut ControlFlowCompiler, line: &str, section: SectionId) -> Result<(), AsmErrorKind> {
    parse_bare_keyword(line, lexer::KW_CONTINUE)?;
    compiler.compile_continue(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AssemblerOptions;
    use fwc_format::Opcode;

    #[test]
    fn if_header_with_two_registers_compiles_to_compare() {
        let condition = parse_if_header("if (r0 < r1)").unwrap();
        assert_eq!(condition.instruction.opcode, Some(Opcode::Compare));
        assert_eq!(condition.reg1, Some(RegisterRef::general(0)));
        assert_eq!(condition.reg2, Some(RegisterRef::general(1)));
    }

    #[test]
    fn if_header_with_an_immediate_sets_the_immediate_operand() {
        let condition = parse_if_header("if (r0 >= 5)").unwrap();
        assert_eq!(condition.reg1, Some(RegisterRef::general(0)));
        assert!(condition.etype.contains(EType::HAS_IMMEDIATE_INT));
    }

    #[test]
    fn if_header_missing_closing_paren_is_rejected() {
        assert_eq!(parse_if_header("if (r0 < r1"), Err(AsmErrorKind::ExpectingParenthesis));
    }

    #[test]
    fn if_header_without_the_if_keyword_is_rejected() {
        assert_eq!(
            parse_if_header("while (r0 < r1)"),
            Err(AsmErrorKind::MisplacedToken { kind: "high-level keyword" })
        );
    }

    #[test]
    fn push_header_shorthand_defaults_stack_pointer_and_repeats_the_register() {
        let operands = parse_push_pop_header("push(r5)").unwrap();
        assert!(operands.is_push);
        assert_eq!(operands.reg1, RegisterRef::general(DEFAULT_STACK_POINTER));
        assert_eq!(operands.reg2, RegisterRef::general(5));
        assert_eq!(operands.imm, RegisterRef::general(5));
    }

    #[test]
    fn pop_header_with_explicit_range_keeps_all_three_registers() {
        let operands = parse_push_pop_header("pop(r31, r2, r10)").unwrap();
        assert!(!operands.is_push);
        assert_eq!(operands.reg1, RegisterRef::general(31));
        assert_eq!(operands.reg2, RegisterRef::general(2));
        assert_eq!(operands.imm, RegisterRef::general(10));
    }

    #[test]
    fn a_real_if_header_line_drives_begin_if_through_the_compiler() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        begin_if(&mut compiler, "if (r0 < r1)", 0, 1).unwrap();
        assert_eq!(compiler.block_depth(), 1);
        compiler.end_if(1, false);
        assert_eq!(compiler.code().len(), 2);
    }

    #[test]
    fn a_real_push_header_line_drives_compile_push_pop_through_the_compiler() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        compile_push_pop(&mut compiler, "push(r5)", 1).unwrap();
        assert_eq!(compiler.code().len(), 1);
    }

    #[test]
    fn a_real_break_header_line_resolves_inside_a_while_loop() {
        let mut compiler = ControlFlowCompiler::new(AssemblerOptions::default());
        begin_while(&mut compiler, "while (r0 != r1)", 0, 1).unwrap();
        compile_break(&mut compiler, "break;", 1).unwrap();
        let block = compiler.end_while(1);
        assert_ne!(block.break_label, fwc_types::NONE_SYMBOL);
    }
}
