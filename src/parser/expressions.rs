//! Expression parsing implementation
//!
//! This module handles KPL expressions, conditions, call arguments and array
//! indexes by plain recursive descent. KPL has only two precedence levels, so
//! no precedence climbing is needed.
//!
//! # Grammar
//!
//! ```text
//! expression ::= ["+" | "-"] term (("+" | "-") term)*
//! term       ::= factor (("*" | "/") factor)*
//! factor     ::= number | charLiteral | ident indexes | ident [arguments]
//!              | "(" expression ")"
//! condition  ::= expression relOp expression
//! arguments  ::= "(" [expression ("," expression)*] ")"
//! indexes    ::= ("(." expression ".)")*
//! ```
//!
//! A leading sign applies to the first term only. A condition holds exactly
//! one comparison.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::errors::{Diagnostic, SemanticError, SyntaxError};
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;
use crate::semantics::{check_declared_function, check_declared_ident, ObjectClass};

impl Parser {
    /// FIRST = { `+`, `-`, number, char, ident, `(` }
    pub(crate) fn compile_expression(&mut self) -> Result<(), Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Plus | TokenKind::Minus => {
                let sign = self.look_ahead.kind;
                self.eat(sign)?;
            }
            TokenKind::Number | TokenKind::CharLiteral | TokenKind::Ident | TokenKind::LParen => {}
            _ => return Err(self.syntax_error(SyntaxError::InvalidExpression)),
        }

        self.compile_term()?;
        while matches!(self.look_ahead.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.look_ahead.kind;
            self.eat(op)?;
            self.compile_term()?;
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), Diagnostic> {
        self.compile_factor()?;
        while matches!(self.look_ahead.kind, TokenKind::Times | TokenKind::Slash) {
            let kind = self.look_ahead.kind;
            self.eat(kind)?;
            self.compile_factor()?;
        }
        Ok(())
    }

    fn compile_factor(&mut self) -> Result<(), Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Number => self.eat(TokenKind::Number),
            TokenKind::CharLiteral => self.eat(TokenKind::CharLiteral),
            TokenKind::Ident => self.compile_ident_factor(),
            TokenKind::LParen => {
                self.eat(TokenKind::LParen)?;
                self.compile_expression()?;
                self.eat(TokenKind::RParen)
            }
            _ => Err(self.syntax_error(SyntaxError::InvalidFactor)),
        }
    }

    /// An identifier in value position: a constant, a variable or parameter
    /// (optionally indexed), or a function call.
    fn compile_ident_factor(&mut self) -> Result<(), Diagnostic> {
        let name = self.expect_identifier()?;

        if self.check(TokenKind::LParen) {
            self.semantic(check_declared_function(&self.symtab, &name))?;
            return self.compile_arguments();
        }

        let id = self.semantic(check_declared_ident(&self.symtab, &name))?;
        match self.symtab.object(id).class() {
            ObjectClass::Constant | ObjectClass::Function => Ok(()),
            ObjectClass::Variable | ObjectClass::Parameter => self.compile_indexes(),
            ObjectClass::Type | ObjectClass::Procedure | ObjectClass::Program => {
                self.semantic(Err(SemanticError::InvalidFactor(name)))
            }
        }
    }

    /// FIRST = FIRST(expression); FOLLOW = { `then`, `do` }
    pub(crate) fn compile_condition(&mut self) -> Result<(), Diagnostic> {
        self.compile_expression()?;

        let op = self.look_ahead.kind;
        if !op.is_relational() {
            return Err(self.syntax_error(SyntaxError::InvalidComparator));
        }
        self.eat(op)?;
        self.compile_expression()
    }

    /// FIRST = { `(` }
    pub(crate) fn compile_arguments(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::LParen)?;
        if !self.check(TokenKind::RParen) {
            self.compile_expression()?;
            while self.check(TokenKind::Comma) {
                self.eat(TokenKind::Comma)?;
                self.compile_expression()?;
            }
        }
        self.eat(TokenKind::RParen)
    }

    /// Zero or more `(. expression .)` selectors.
    pub(crate) fn compile_indexes(&mut self) -> Result<(), Diagnostic> {
        while self.check(TokenKind::LSel) {
            self.eat(TokenKind::LSel)?;
            self.compile_expression()?;
            self.eat(TokenKind::RSel)?;
        }
        Ok(())
    }
}
