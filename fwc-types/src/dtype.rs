use bitflags::bitflags;

/// The base operand width/kind, independent of signedness.
///
/// Named after the `TYP_*` family in the original assembler and the
/// `INT8..FLOAT64` scale spec §3 describes for `SCode::dtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum BaseType {
    /// 8-bit integer.
    Int8 = 0,
    /// 16-bit integer.
    Int16 = 1,
    /// 32-bit integer.
    Int32 = 2,
    /// 64-bit integer.
    Int64 = 3,
    /// 16-bit (half precision) float.
    Float16 = 4,
    /// 32-bit float.
    Float32 = 5,
    /// 64-bit (double precision) float.
    Float64 = 6,
}

impl BaseType {
    /// Width of the type in bits.
    pub const fn bits(self) -> u32 {
        match self {
            BaseType::Int8 => 8,
            BaseType::Int16 | BaseType::Float16 => 16,
            BaseType::Int32 | BaseType::Float32 => 32,
            BaseType::Int64 | BaseType::Float64 => 64,
        }
    }

    /// `true` for the three floating-point kinds.
    pub const fn is_float(self) -> bool {
        matches!(self, BaseType::Float16 | BaseType::Float32 | BaseType::Float64)
    }

    /// `true` for the four integer kinds.
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// The type one size class larger, or `None` at `Int64`/`Float64`.
    /// Used by the "one-step widening" rule the `PLUS` flag grants.
    pub const fn widen_one_step(self) -> Option<BaseType> {
        match self {
            BaseType::Int8 => Some(BaseType::Int16),
            BaseType::Int16 => Some(BaseType::Int32),
            BaseType::Int32 => Some(BaseType::Int64),
            BaseType::Int64 => None,
            BaseType::Float16 => Some(BaseType::Float32),
            BaseType::Float32 => Some(BaseType::Float64),
            BaseType::Float64 => None,
        }
    }
}

bitflags! {
    /// Modifier flags riding alongside a [`BaseType`].
    ///
    /// `UNSIGNED` marks integer types as unsigned; `PLUS` marks a type as
    /// "the next larger type is also acceptable here", which both the
    /// `for`-loop widening rule (§4.5) and the jump-merge optimizer's
    /// operand-type agreement rule (§4.4) consult.
    #[derive(Default)]
    pub struct TypeFlags: u8 {
        /// Operand is unsigned.
        const UNSIGNED = 0b0000_0001;
        /// The next-larger type in the same kind is also an acceptable fit.
        const PLUS = 0b0000_0010;
    }
}

/// A full operand data type: base width/kind plus modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// Base width/kind.
    pub base: BaseType,
    /// Signedness/widening modifiers.
    pub flags: TypeFlags,
}

impl DataType {
    /// Builds a signed, non-widening data type of the given base.
    pub const fn new(base: BaseType) -> Self {
        Self {
            base,
            flags: TypeFlags::empty(),
        }
    }

    /// Returns this type with the `UNSIGNED` flag set.
    pub const fn unsigned(mut self) -> Self {
        self.flags = TypeFlags::from_bits_truncate(self.flags.bits() | TypeFlags::UNSIGNED.bits());
        self
    }

    /// Returns this type with the `PLUS` flag set.
    pub const fn plus(mut self) -> Self {
        self.flags = TypeFlags::from_bits_truncate(self.flags.bits() | TypeFlags::PLUS.bits());
        self
    }

    /// `true` if the `UNSIGNED` flag is set.
    pub const fn is_unsigned(&self) -> bool {
        self.flags.contains(TypeFlags::UNSIGNED)
    }

    /// `true` if the `PLUS` flag is set.
    pub const fn is_plus(&self) -> bool {
        self.flags.contains(TypeFlags::PLUS)
    }

    /// Width in bits of the base type.
    pub const fn bits(&self) -> u32 {
        self.base.bits()
    }

    /// Applies the §4.5 `for`-loop init widening rule: a `PLUS` integer type
    /// smaller than `Int32` widens to `Int32`; unsigned types are never
    /// widened this way because the loop counter may legitimately wrap
    /// negative.
    pub fn widen_for_loop_init(self) -> Self {
        if self.is_unsigned() || !self.is_plus() || self.base.is_float() {
            return self;
        }
        if self.base.bits() < BaseType::Int32.bits() {
            DataType {
                base: BaseType::Int32,
                flags: self.flags,
            }
        } else {
            self
        }
    }

    /// `true` if `self` and `other` "agree" for the purposes of the
    /// jump-merge optimizer (§4.4): same base type, or one is `PLUS` and
    /// the other is exactly its one-step-wider type.
    pub fn agrees_with(&self, other: &DataType) -> bool {
        if self.base == other.base {
            return true;
        }
        if self.is_plus() && self.base.widen_one_step() == Some(other.base) {
            return true;
        }
        if other.is_plus() && other.base.widen_one_step() == Some(self.base) {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_widening_skips_unsigned() {
        let unsigned_i8 = DataType::new(BaseType::Int8).unsigned().plus();
        assert_eq!(unsigned_i8.widen_for_loop_init(), unsigned_i8);
    }

    #[test]
    fn plus_widening_promotes_small_signed_ints() {
        let i8plus = DataType::new(BaseType::Int8).plus();
        assert_eq!(i8plus.widen_for_loop_init().base, BaseType::Int32);
    }

    #[test]
    fn plus_widening_leaves_int32_and_up_alone() {
        let i64plus = DataType::new(BaseType::Int64).plus();
        assert_eq!(i64plus.widen_for_loop_init().base, BaseType::Int64);
    }

    #[test]
    fn agreement_allows_one_step_widen_when_plus_is_set() {
        let a = DataType::new(BaseType::Int8).plus();
        let b = DataType::new(BaseType::Int16);
        assert!(a.agrees_with(&b));
        assert!(b.agrees_with(&a));
    }

    #[test]
    fn agreement_rejects_two_step_widen() {
        let a = DataType::new(BaseType::Int8).plus();
        let c = DataType::new(BaseType::Int32);
        assert!(!a.agrees_with(&c));
    }

    #[test]
    fn agreement_rejects_unrelated_types() {
        let a = DataType::new(BaseType::Int8);
        let b = DataType::new(BaseType::Float32);
        assert!(!a.agrees_with(&b));
    }
}
