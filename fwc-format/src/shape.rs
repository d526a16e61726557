use fwc_types::Immediate;

/// The operand shape `fit_code` tests a candidate descriptor against. Built
/// by `fwc-asm` from an `SCode` record; this crate never sees `SCode`
/// itself, only the shape extracted from it.
#[derive(Debug, Clone, Default)]
pub struct InstrShape {
    /// A third operand register (RT) is present.
    pub needs_rt: bool,
    /// A source register (RS) is present.
    pub needs_rs: bool,
    /// An immediate constant is present, and its value (for range
    /// checking against the descriptor's `imm_size`).
    pub immediate: Option<Immediate>,
    /// A jump-offset/address-offset operand is present, already resolved
    /// to a signed byte delta.
    pub jump_delta: Option<i64>,
    /// `true` if the immediate (when present) is logically unsigned.
    pub immediate_unsigned: bool,
}

impl InstrShape {
    pub fn with_immediate(mut self, value: Immediate) -> Self {
        self.immediate_unsigned = matches!(value, Immediate::Unsigned(_));
        self.immediate = Some(value);
        self
    }

    pub fn with_jump_delta(mut self, delta: i64) -> Self {
        self.jump_delta = Some(delta);
        self
    }

    pub fn with_rs(mut self) -> Self {
        self.needs_rs = true;
        self
    }

    pub fn with_rt(mut self) -> Self {
        self.needs_rt = true;
        self
    }
}
