//! Lexes one header line into the [`Token`] stream [`crate::header`]
//! consumes (§3 "Token"). The source file's own lexer — comments, string
//! and char literals, directives, multi-line statements — stays
//! out-of-scope per §2's data-flow description ("parsed tokens, produced by
//! an out-of-scope lexer, feed C5"); this module only covers what a
//! high-level construct's single-line header ever needs: keywords,
//! registers, types, numbers, and the handful of operators §4.5's
//! conditions use.

use fwc_types::{Immediate, RegisterRef, MAX_REGISTER_ID};

use crate::error::AsmErrorKind;
use crate::token::{Token, TokenKind, TokenValue};

pub const KW_IF: u32 = 3;
pub const KW_ELSE: u32 = 4;
pub const KW_FOR: u32 = 6;
pub const KW_WHILE: u32 = 8;
pub const KW_DO: u32 = 9;
/// Not assigned a block-type id in the original assembler's `HL_*` table
/// (`in` is a sub-keyword of `for ... in`, not a block opener); this crate
/// picks the next free id after `HL_DO_WHILE`.
pub const KW_IN: u32 = 10;
pub const KW_BREAK: u32 = 11;
pub const KW_CONTINUE: u32 = 12;
pub const KW_PUSH: u32 = 13;
pub const KW_POP: u32 = 14;

pub const OP_LPAREN: u32 = 1;
pub const OP_RPAREN: u32 = 2;
pub const OP_LBRACKET: u32 = 3;
pub const OP_RBRACKET: u32 = 4;
pub const OP_COMMA: u32 = 5;
pub const OP_LT: u32 = 6;
pub const OP_LE: u32 = 7;
pub const OP_GT: u32 = 8;
pub const OP_GE: u32 = 9;
pub const OP_EQ: u32 = 10;
pub const OP_NE: u32 = 11;
pub const OP_SEMI: u32 = 12;

fn keyword_id(word: &str) -> Option<u32> {
    Some(match word {
        "if" => KW_IF,
        "else" => KW_ELSE,
        "for" => KW_FOR,
        "while" => KW_WHILE,
        "do" => KW_DO,
        "in" => KW_IN,
        "break" => KW_BREAK,
        "continue" => KW_CONTINUE,
        "push" => KW_PUSH,
        "pop" => KW_POP,
        _ => return None,
    })
}

/// Encodes a `Type` token's id: bits 0-3 are the [`fwc_types::BaseType`]
/// discriminant, bit 4 is the `unsigned` prefix.
fn base_type_id(word: &str) -> Option<u32> {
    let (unsigned, rest) = match word.strip_prefix('u') {
        Some(rest) if rest.starts_with("int") => (true, rest),
        _ => (false, word),
    };
    let base = match rest {
        "int8" => 0,
        "int16" => 1,
        "int32" => 2,
        "int64" => 3,
        "float16" => 4,
        "float32" => 5,
        "float64" => 6,
        _ => return None,
    };
    Some(base | if unsigned { 1 << 4 } else { 0 })
}

fn register_ref(word: &str) -> Option<RegisterRef> {
    let mut chars = word.chars();
    let family_char = chars.next()?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u32 = digits.parse().ok()?;
    if id > MAX_REGISTER_ID as u32 {
        return None;
    }
    match family_char {
        'r' => Some(RegisterRef::general(id as u8)),
        'v' => Some(RegisterRef::vector(id as u8)),
        _ => None,
    }
}

/// Lexes one header line, e.g. `if (r0 < r1)` or `push(r2, r5, r10)`.
///
/// Assumes ASCII source, matching the scope of what a header line carries
/// (keywords, register names, decimal numbers, and ASCII operators). A
/// byte that isn't whitespace, a recognized operator, or the start of a
/// word/number raises `IllegalByte`.
pub fn lex_header_line(line: &str) -> Result<Vec<Token>, AsmErrorKind> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i as u32;
        match c {
            b'(' => {
                tokens.push(Token::new(TokenKind::Operator, OP_LPAREN, start, 1, TokenValue::None));
                i += 1;
            }
            b')' => {
                tokens.push(Token::new(TokenKind::Operator, OP_RPAREN, start, 1, TokenValue::None));
                i += 1;
            }
            b'[' => {
                tokens.push(Token::new(TokenKind::Operator, OP_LBRACKET, start, 1, TokenValue::None));
                i += 1;
            }
            b']' => {
                tokens.push(Token::new(TokenKind::Operator, OP_RBRACKET, start, 1, TokenValue::None));
                i += 1;
            }
            b',' => {
                tokens.push(Token::new(TokenKind::Operator, OP_COMMA, start, 1, TokenValue::None));
                i += 1;
            }
            b';' => {
                tokens.push(Token::new(TokenKind::Operator, OP_SEMI, start, 1, TokenValue::None));
                i += 1;
            }
            b'<' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token::new(TokenKind::Operator, OP_LE, start, 2, TokenValue::None));
                i += 2;
            }
            b'<' => {
                tokens.push(Token::new(TokenKind::Operator, OP_LT, start, 1, TokenValue::None));
                i += 1;
            }
            b'>' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token::new(TokenKind::Operator, OP_GE, start, 2, TokenValue::None));
                i += 2;
            }
            b'>' => {
                tokens.push(Token::new(TokenKind::Operator, OP_GT, start, 1, TokenValue::None));
                i += 1;
            }
            b'=' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token::new(TokenKind::Operator, OP_EQ, start, 2, TokenValue::None));
                i += 2;
            }
            b'!' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token::new(TokenKind::Operator, OP_NE, start, 2, TokenValue::None));
                i += 2;
            }
            b'0'..=b'9' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                let value: i64 = line[i..j].parse().map_err(|_| AsmErrorKind::IllegalByte)?;
                tokens.push(Token::new(
                    TokenKind::Number,
                    0,
                    start,
                    (j - i) as u32,
                    TokenValue::Integer(Immediate::Signed(value)),
                ));
                i = j;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let mut j = i + 1;
                while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                    j += 1;
                }
                let word = &line[i..j];
                if let Some(id) = keyword_id(word) {
                    tokens.push(Token::new(TokenKind::HighLevelKeyword, id, start, (j - i) as u32, TokenValue::None));
                } else if let Some(id) = base_type_id(word) {
                    tokens.push(Token::new(TokenKind::Type, id, start, (j - i) as u32, TokenValue::None));
                } else if let Some(reg) = register_ref(word) {
                    tokens.push(Token::new(
                        TokenKind::Register,
                        reg.id as u32,
                        start,
                        (j - i) as u32,
                        TokenValue::Register(reg),
                    ));
                } else {
                    tokens.push(Token::new(TokenKind::Name, 0, start, (j - i) as u32, TokenValue::None));
                }
                i = j;
            }
            _ => return Err(AsmErrorKind::IllegalByte),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_header_lexes_to_keyword_paren_registers_operator_paren() {
        let tokens = lex_header_line("if (r0 < r1)").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::HighLevelKeyword,
                TokenKind::Operator,
                TokenKind::Register,
                TokenKind::Operator,
                TokenKind::Register,
                TokenKind::Operator,
            ]
        );
        assert_eq!(tokens[0].id, KW_IF);
        assert_eq!(tokens[2].value, TokenValue::Register(RegisterRef::general(0)));
    }

    #[test]
    fn two_character_operators_are_not_split() {
        let tokens = lex_header_line("if (r0 <= 5)").unwrap();
        assert_eq!(tokens[3].kind, TokenKind::Operator);
        assert_eq!(tokens[3].id, OP_LE);
        assert_eq!(tokens[3].len, 2);
    }

    #[test]
    fn type_prefix_is_recognized_before_a_register() {
        let tokens = lex_header_line("if (int32 r0 == r1)").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Type);
        assert_eq!(tokens[1].id & 0xF, 2); // Int32 discriminant
        assert_eq!(tokens[1].id & (1 << 4), 0); // not unsigned
    }

    #[test]
    fn unsigned_type_prefix_sets_the_unsigned_bit() {
        let tokens = lex_header_line("if (uint8 r0 < r1)").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Type);
        assert_eq!(tokens[1].id & 0xF, 0); // Int8 discriminant
        assert_ne!(tokens[1].id & (1 << 4), 0);
    }

    #[test]
    fn push_header_with_three_registers_lexes_as_three_register_tokens() {
        let tokens = lex_header_line("push(r31, r2, r10)").unwrap();
        let register_count = tokens.iter().filter(|t| t.kind == TokenKind::Register).count();
        assert_eq!(register_count, 3);
    }

    #[test]
    fn an_unrecognized_byte_is_rejected() {
        assert_eq!(lex_header_line("if (r0 @ r1)"), Err(AsmErrorKind::IllegalByte));
    }
}
