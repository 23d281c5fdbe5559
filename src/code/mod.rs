//! The register-based intermediate form: typed operations, register
//! specs, instructions, basic blocks and whole methods, plus the
//! target advice the optimizer consults.

pub mod error;

pub mod access_flags;
pub mod advice;
pub mod basic_block;
pub mod basic_block_list;
pub mod insn;
pub mod literal_upgrade;
pub mod local_variable;
pub mod position;
pub mod reg_ops;
pub mod register_spec;
pub mod register_spec_list;
pub mod register_spec_set;
pub mod rop;
pub mod rop_method;
pub mod rops;

pub use error::{RopError, RopErrorKind};
