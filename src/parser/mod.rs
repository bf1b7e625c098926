//! KPL source code front end
//!
//! This module turns KPL source text into a checked program:
//! - [`token`]: token kinds, source locations and the trace format
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: the [`parse::Parser`] with its two token slots and `eat`
//! - [`declarations`], [`statements`], [`expressions`]: one grammar area each
//!
//! # Parser Implementation
//!
//! Hand-written predictive recursive descent over an LL(1) grammar. No AST is
//! built; declarations go straight into the symbol table and every use of a
//! name is checked against it as soon as it is read.

pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;
pub mod token;
