//! # Rop
//!
//! A register-based intermediate representation for translating stack
//! bytecode into Dalvik code: typed operations, register specs,
//! instructions, basic blocks and methods, plus the target advice that
//! later passes consult.
//!
//! ```
//!  use rop::code::register_spec::RegisterSpecTable;
//!  use rop::code::register_spec_list::RegisterSpecList;
//!  use rop::code::position::SourcePosition;
//!  use rop::code::insn::Insn;
//!  use rop::code::rops::ADD_INT;
//!  use rop::types::Type;
//!
//!  let table = RegisterSpecTable::new();
//!  let sources = RegisterSpecList::of(&[table.make(1, Type::Int), table.make(2, Type::Int)]);
//!  let add = Insn::plain(ADD_INT.clone(), SourcePosition::NO_INFO, Some(table.make(0, Type::Int)), sources).unwrap();
//!  assert_eq!(add.to_human(), "@????: add-int v0:I <- v1:I v2:I");
//! ```

pub mod code;
pub mod cst;
mod tests;
pub mod types;
