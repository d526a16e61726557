//! Primitive types shared by every layer of the ForwardCom binary toolchain
//! core: the raw machine word, register references, and the operand data
//! type tags that the instruction-format table, the object model, and the
//! assembler front end all need to agree on.
//!
//! Nothing in this crate touches parsing, encoding, or file I/O — it only
//! fixes vocabulary.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

mod dtype;
mod register;
mod word;

pub use dtype::{BaseType, DataType, TypeFlags};
pub use register::{RegisterFamily, RegisterId, RegisterRef, DEFAULT_STACK_POINTER, MAX_REGISTER_ID};
pub use word::{Immediate, SignedWord, Word, NONE_SYMBOL};

/// Index of a symbol in the global symbol table.
///
/// `0` and [`NONE_SYMBOL`] are reserved ("no symbol" / "unresolved"), per
/// the data-model invariant that symbol id zero and the all-ones sentinel
/// never name a real symbol.
pub type SymbolId = u32;

/// Index of a section in the object's section table.
pub type SectionId = u32;
