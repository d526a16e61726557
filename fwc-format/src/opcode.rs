/// The instruction mnemonics the format table knows how to place. Each
/// variant's discriminant is the `op1` value the encoder and the nested
/// lookup table agree on (see `format_tables.cpp`'s per-descriptor `op1 =
/// a-b` comments, which this catalog reproduces as plain constants rather
/// than a range table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    Move = 1,
    Add = 2,
    Sub = 3,
    And = 4,
    Or = 5,
    Xor = 6,
    Compare = 7,
    TestBit = 8,
    TestBitsOr = 9,
    TestBitsAnd = 10,
    Jump = 11,
    Push = 12,
    Pop = 13,
    SubMaxlen = 14,
    /// Fused `ADD 1; compare-</>=` (§4.4).
    IncrementCompareJumpBelow = 15,
    IncrementCompareJumpAbove = 16,
    /// Fused `ADD/SUB` then `COMPARE`-with-zero (§4.4).
    AddSubJumpSignZero = 17,
    /// Fused `AND/OR/XOR` then `COMPARE`-with-zero, `== / !=` only (§4.4).
    LogicJumpZero = 18,
}

impl Opcode {
    /// The raw `op1` value this mnemonic occupies.
    pub const fn op1(self) -> u8 {
        self as u8
    }

    /// `true` for the instructions produced only by the jump-merge
    /// optimizer, never directly by the condition compiler.
    pub const fn is_fused(self) -> bool {
        matches!(
            self,
            Opcode::IncrementCompareJumpBelow
                | Opcode::IncrementCompareJumpAbove
                | Opcode::AddSubJumpSignZero
                | Opcode::LogicJumpZero
        )
    }

    /// Recovers the mnemonic that owns a given `op1` value, if any.
    pub const fn from_op1(op1: u8) -> Option<Opcode> {
        Some(match op1 {
            0 => Opcode::Nop,
            1 => Opcode::Move,
            2 => Opcode::Add,
            3 => Opcode::Sub,
            4 => Opcode::And,
            5 => Opcode::Or,
            6 => Opcode::Xor,
            7 => Opcode::Compare,
            8 => Opcode::TestBit,
            9 => Opcode::TestBitsOr,
            10 => Opcode::TestBitsAnd,
            11 => Opcode::Jump,
            12 => Opcode::Push,
            13 => Opcode::Pop,
            14 => Opcode::SubMaxlen,
            15 => Opcode::IncrementCompareJumpBelow,
            16 => Opcode::IncrementCompareJumpAbove,
            17 => Opcode::AddSubJumpSignZero,
            18 => Opcode::LogicJumpZero,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op1_matches_discriminant() {
        assert_eq!(Opcode::Add.op1(), 2);
        assert_eq!(Opcode::Jump.op1(), 11);
    }

    #[test]
    fn fused_opcodes_are_tagged() {
        assert!(Opcode::IncrementCompareJumpBelow.is_fused());
        assert!(!Opcode::Add.is_fused());
    }
}
