//! # Introduction
//!
//! kplc is the front end of a compiler for KPL, a small Pascal-like teaching
//! language. It scans, parses and scope-checks a program and reports the
//! first problem it finds, with every lexical error seen along the way.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser ⇄ Symbol table → Diagnostics
//! ```
//!
//! 1. [`parser::lexer`] turns characters into tokens, one at a time.
//! 2. [`parser::parse`] drives an LL(1) recursive descent over those tokens,
//!    keeping one token of lookahead.
//! 3. [`semantics`] records declarations in nested scopes and checks each use
//!    of a name against them.
//! 4. [`errors`] defines the [`errors::Diagnostic`] every stage reports.
//!
//! ## Supported language
//!
//! Types: `integer`, `char`, nested arrays, named types.
//! Declarations: constants, types, variables, functions, procedures, value
//! and `var` parameters.
//! Statements: assignment, `call`, `begin/end`, `if/else`, `while`, `for`.
//! Built-ins: `READC`, `READI`, `WRITEI`, `WRITEC`, `WRITELN`.
//!
//! ```
//! use kplc::{compile, CompileOptions};
//!
//! let compilation = compile("program Hello; begin call WRITELN end.", &CompileOptions::default());
//! assert!(compilation.is_success());
//! ```

pub mod compiler;
pub mod errors;
pub mod parser;
pub mod semantics;

pub use compiler::{compile, Compilation, CompileOptions};
