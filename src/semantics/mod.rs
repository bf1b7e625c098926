//! Scope-structured name resolution
//!
//! - [`symtab`]: the [`SymbolTable`] arena of scopes and declared objects
//! - [`check`]: the `check_*` functions the parser calls at declaration and use sites

pub mod check;
pub mod symtab;

pub use check::*;
pub use symtab::{
    ConstantValue, Object, ObjectClass, ObjectId, ObjectKind, ParamMode, Scope, ScopeId,
    SymbolTable, Type,
};
