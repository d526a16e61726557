/// The three register banks a ForwardCom operand can name.
///
/// ForwardCom has three independent register files, so (unlike a
/// single-register-file machine, where one flat index suffices) the family
/// tag has to travel alongside the index everywhere a register is
/// referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RegisterFamily {
    /// General-purpose integer/pointer registers `r0..r31`.
    General,
    /// Vector registers `v0..v31`.
    Vector,
    /// Special-purpose registers (stack pointer, flags, ...).
    Special,
}

impl RegisterFamily {
    /// `true` for the general-purpose integer/pointer bank.
    pub const fn is_general(self) -> bool {
        matches!(self, Self::General)
    }

    /// `true` for the vector register bank.
    pub const fn is_vector(self) -> bool {
        matches!(self, Self::Vector)
    }
}

/// A 5-bit register index within its family.
pub type RegisterId = u8;

/// Maximum value a [`RegisterId`] may hold (registers are indexed 0..=31).
pub const MAX_REGISTER_ID: RegisterId = 31;

/// The conventional general-purpose stack pointer register, used as the
/// default `reg1` for the bare `push(reg)` / `pop(reg)` shorthand.
pub const DEFAULT_STACK_POINTER: RegisterId = 31;

/// A fully qualified register reference: which bank, which index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterRef {
    /// Register bank.
    pub family: RegisterFamily,
    /// Index within the bank, `0..=31`.
    pub id: RegisterId,
}

impl RegisterRef {
    /// Builds a register reference, clamping out-of-range ids is
    /// deliberately not done here: callers validate against
    /// [`MAX_REGISTER_ID`] and raise a semantic diagnostic instead, so a
    /// bad id is never silently corrected.
    pub const fn new(family: RegisterFamily, id: RegisterId) -> Self {
        Self { family, id }
    }

    /// Shorthand for a general-purpose register reference.
    pub const fn general(id: RegisterId) -> Self {
        Self::new(RegisterFamily::General, id)
    }

    /// Shorthand for a vector register reference.
    pub const fn vector(id: RegisterId) -> Self {
        Self::new(RegisterFamily::Vector, id)
    }

    /// `true` if `id` is within the addressable `0..=31` range.
    pub const fn is_valid_id(&self) -> bool {
        self.id <= MAX_REGISTER_ID
    }

    /// `true` if this is the conventional stack-pointer register.
    pub const fn is_stack_pointer(&self) -> bool {
        matches!(self.family, RegisterFamily::General) && self.id == DEFAULT_STACK_POINTER
    }
}
