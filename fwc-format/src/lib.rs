//! The instruction format descriptor table: mapping a 64-bit instruction
//! word to a fully-specified encoding variant, and the reverse operation,
//! `fit_code`, which picks and packs a variant for an abstract instruction.
//!
//! A declarative table plus generic pack/unpack logic, so a new encoding is
//! added by extending the table, never by writing new control flow.

#![deny(unsafe_code)]

mod descriptor;
mod error;
mod fit;
mod lookup;
mod opcode;
mod shape;
mod table;

pub use descriptor::{Category, MemFlags, OperandAvail, OperandTypePolicy, SFormat, Template, VectFlags};
pub use error::FormatError;
pub use fit::{fit_code, EncodedWord};
pub use lookup::{lookup, op1_of, LookupEntry};
pub use opcode::Opcode;
pub use shape::InstrShape;
pub use table::{format_list, RESERVED};
