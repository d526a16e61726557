//! The block stack (§3 "Block record (SBlock)", §4.5): tracks nested
//! high-level constructs (`{ }`, `if`/`else`, loops, `switch`) so `break`,
//! `continue`, and the label-synthesis scheme can walk it top-down.

use fwc_types::{SymbolId, NONE_SYMBOL};

/// What kind of construct opened this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum BlockKind {
    Section,
    Func,
    If,
    Else,
    Switch,
    For,
    ForIn,
    While,
    DoWhile,
}

impl BlockKind {
    /// `true` for constructs that `break`/`continue` can target.
    pub fn is_loop_or_switch(self) -> bool {
        matches!(
            self,
            BlockKind::Switch | BlockKind::For | BlockKind::ForIn | BlockKind::While | BlockKind::DoWhile
        )
    }

    /// `true` for constructs `continue` can target (a `switch` cannot be
    /// continued, only broken out of).
    pub fn is_continuable(self) -> bool {
        matches!(
            self,
            BlockKind::For | BlockKind::ForIn | BlockKind::While | BlockKind::DoWhile
        )
    }
}

/// One entry on the block stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SBlock {
    pub kind: BlockKind,
    /// Unique id for this block, used to synthesize label names
    /// (`@<kind>_<block_number>_<suffix>`).
    pub block_number: u32,
    /// Token index of the opening `{`, kept for unmatched-brace diagnostics.
    pub start_bracket: u32,
    /// Label this block's closing brace jumps to (loop exit / end of if).
    pub jump_label: SymbolId,
    /// `break` target; `NONE_SYMBOL` until a `break` inside this block
    /// forces it to materialize.
    pub break_label: SymbolId,
    /// `continue` target; `NONE_SYMBOL` until a `continue` inside this block
    /// forces it to materialize.
    pub continue_label: SymbolId,
    /// Index into the deferred-instruction buffer where this block's
    /// condition/increment code (e.g. a `for`'s update clause) starts.
    pub code_buffer_index: u32,
    /// Number of deferred instructions starting at `code_buffer_index`.
    pub code_buffer_count: u32,
    /// `for ... in` only: the index register the loop body decrements.
    pub vector_index: Option<fwc_types::RegisterRef>,
    /// `for ... in` only: element type driving `SUB_MAXLEN`'s step size.
    pub element_type: Option<fwc_types::DataType>,
}

impl SBlock {
    pub fn new(kind: BlockKind, block_number: u32, start_bracket: u32) -> Self {
        Self {
            kind,
            block_number,
            start_bracket,
            jump_label: NONE_SYMBOL,
            break_label: NONE_SYMBOL,
            continue_label: NONE_SYMBOL,
            code_buffer_index: 0,
            code_buffer_count: 0,
            vector_index: None,
            element_type: None,
        }
    }
}

/// Stack of open blocks plus the monotonic counters used for label
/// synthesis (`iIf`/`iLoop`, one counter per construct family so
/// `if`-labels and loop-labels don't fight over the same numbers).
#[derive(Debug, Default)]
pub struct BlockStack {
    blocks: Vec<SBlock>,
    next_if_number: u32,
    next_loop_number: u32,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BlockKind, start_bracket: u32) -> &SBlock {
        let number = match kind {
            BlockKind::If | BlockKind::Else => {
                let n = self.next_if_number;
                self.next_if_number += 1;
                n
            }
            BlockKind::For | BlockKind::ForIn | BlockKind::While | BlockKind::DoWhile | BlockKind::Switch => {
                let n = self.next_loop_number;
                self.next_loop_number += 1;
                n
            }
            BlockKind::Section | BlockKind::Func => 0,
        };
        tracing::debug!(?kind, number, "push block");
        self.blocks.push(SBlock::new(kind, number, start_bracket));
        self.blocks.last().expect("just pushed")
    }

    pub fn pop(&mut self) -> Option<SBlock> {
        let popped = self.blocks.pop();
        if let Some(block) = &popped {
            tracing::debug!(kind = ?block.kind, number = block.block_number, "pop block");
        }
        popped
    }

    pub fn top(&self) -> Option<&SBlock> {
        self.blocks.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut SBlock> {
        self.blocks.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Walks the block stack top-down looking for the innermost
    /// `break`-targetable block (§4.5). Materializes its `break_label` from
    /// `allocate` if it hasn't been needed yet.
    pub fn resolve_break(&mut self, allocate: impl FnOnce(BlockKind, u32) -> SymbolId) -> Option<SymbolId> {
        let block = self.blocks.iter_mut().rev().find(|b| b.kind.is_loop_or_switch())?;
        if block.break_label == NONE_SYMBOL {
            block.break_label = allocate(block.kind, block.block_number);
        }
        Some(block.break_label)
    }

    /// Walks the block stack top-down looking for the innermost
    /// `continue`-targetable block (§4.5, `switch` is skipped: it can be
    /// broken but not continued). Materializes its `continue_label` if
    /// needed.
    pub fn resolve_continue(&mut self, allocate: impl FnOnce(BlockKind, u32) -> SymbolId) -> Option<SymbolId> {
        let block = self.blocks.iter_mut().rev().find(|b| b.kind.is_continuable())?;
        if block.continue_label == NONE_SYMBOL {
            block.continue_label = allocate(block.kind, block.block_number);
        }
        Some(block.continue_label)
    }

    /// Exposes the current top block's vector-loop fields for `for ... in`
    /// (§4.5): the index register being decremented and its element type.
    pub fn set_vector_fields(&mut self, index: fwc_types::RegisterRef, element_type: fwc_types::DataType) {
        if let Some(top) = self.blocks.last_mut() {
            top.vector_index = Some(index);
            top.element_type = Some(element_type);
        }
    }

    pub fn push_block(&mut self, block: SBlock) -> &SBlock {
        self.blocks.push(block);
        self.blocks.last().expect("just pushed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_and_loop_numbers_are_independent_counters() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::If, 0);
        stack.push(BlockKind::While, 1);
        stack.push(BlockKind::If, 2);
        assert_eq!(stack.blocks[0].block_number, 0);
        assert_eq!(stack.blocks[1].block_number, 0);
        assert_eq!(stack.blocks[2].block_number, 1);
    }

    #[test]
    fn continue_skips_a_switch_and_finds_the_enclosing_loop() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::While, 0);
        stack.push(BlockKind::Switch, 1);
        let mut next = 100;
        let label = stack.resolve_continue(|_kind, _number| {
            next += 1;
            next
        });
        assert_eq!(label, Some(101));
        assert_eq!(stack.blocks[0].continue_label, 101);
        assert_eq!(stack.blocks[1].continue_label, NONE_SYMBOL);
    }

    #[test]
    fn break_targets_the_innermost_loop_or_switch() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::For, 0);
        stack.push(BlockKind::Switch, 1);
        let mut next = 0;
        let label = stack.resolve_break(|_kind, _number| {
            next += 1;
            next
        });
        assert_eq!(label, Some(1));
        assert_eq!(stack.blocks[1].break_label, 1);
        assert_eq!(stack.blocks[0].break_label, NONE_SYMBOL);
    }

    #[test]
    fn break_label_is_materialized_only_once() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::While, 0);
        let mut calls = 0;
        stack.resolve_break(|_kind, _number| {
            calls += 1;
            42
        });
        stack.resolve_break(|_kind, _number| {
            calls += 1;
            99
        });
        assert_eq!(calls, 1);
        assert_eq!(stack.top().unwrap().break_label, 42);
    }

    #[test]
    fn resolve_continue_outside_any_loop_is_none() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::Section, 0);
        assert_eq!(stack.resolve_continue(|_kind, _number| 1), None);
    }
}
