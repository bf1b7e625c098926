//! Statement parsing implementation
//!
//! This module handles parsing of all KPL statement types:
//!
//! - Assignment: `x := e`, `a(.i.) := e`, `f := e` inside function `f`
//! - Procedure call: `call WRITEI(x)`
//! - Compound: `begin ... end`
//! - Control flow: `if`, `while`, `for`
//! - The empty statement
//!
//! # Grammar
//!
//! ```text
//! statements ::= statement (";" statement)*
//! statement  ::= assignSt | callSt | groupSt | ifSt | whileSt | forSt | ε
//! assignSt   ::= ident indexes ":=" expression
//! callSt     ::= "call" ident [arguments]
//! groupSt    ::= "begin" statements "end"
//! ifSt       ::= "if" condition "then" statement ["else" statement]
//! whileSt    ::= "while" condition "do" statement
//! forSt      ::= "for" ident ":=" expression "to" expression "do" statement
//! ```
//!
//! The empty statement is chosen when the lookahead is in
//! FOLLOW(statement) = { `;`, `end`, `else` }. A dangling `else` binds to the
//! nearest `if`.

use crate::errors::{Diagnostic, SyntaxError};
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;
use crate::semantics::{
    check_declared_lvalue_ident, check_declared_procedure, check_declared_variable,
};

impl Parser {
    /// FIRST = FIRST(statement) ∪ { `;` }; FOLLOW = { `end` }
    pub(crate) fn compile_statements(&mut self) -> Result<(), Diagnostic> {
        self.compile_statement()?;
        while self.check(TokenKind::Semicolon) {
            self.eat(TokenKind::Semicolon)?;
            self.compile_statement()?;
        }

        if !self.check(TokenKind::End) {
            return Err(self.missing(TokenKind::Semicolon));
        }
        Ok(())
    }

    /// FIRST = { ident, `call`, `begin`, `if`, `while`, `for` };
    /// FOLLOW = { `;`, `end`, `else` }
    pub(crate) fn compile_statement(&mut self) -> Result<(), Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Ident => self.compile_assign_statement(),
            TokenKind::Call => self.compile_call_statement(),
            TokenKind::Begin => self.compile_group_statement(),
            TokenKind::If => self.compile_if_statement(),
            TokenKind::While => self.compile_while_statement(),
            TokenKind::For => self.compile_for_statement(),
            // Empty statement
            TokenKind::Semicolon | TokenKind::End | TokenKind::Else => Ok(()),
            _ => Err(self.syntax_error(SyntaxError::InvalidStatement)),
        }
    }

    /// FIRST = { ident }
    fn compile_assign_statement(&mut self) -> Result<(), Diagnostic> {
        let name = self.expect_identifier()?;
        self.semantic(check_declared_lvalue_ident(&self.symtab, &name))?;
        self.compile_indexes()?;
        self.eat(TokenKind::Assign)?;
        self.compile_expression()
    }

    /// FIRST = { `call` }
    fn compile_call_statement(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::Call)?;
        let name = self.expect_identifier()?;
        self.semantic(check_declared_procedure(&self.symtab, &name))?;
        if self.check(TokenKind::LParen) {
            self.compile_arguments()?;
        }
        Ok(())
    }

    /// FIRST = { `begin` }
    fn compile_group_statement(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::Begin)?;
        self.compile_statements()?;
        self.eat(TokenKind::End)
    }

    /// FIRST = { `if` }
    fn compile_if_statement(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::If)?;
        self.compile_condition()?;
        self.eat(TokenKind::Then)?;
        self.compile_statement()?;

        if self.check(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            self.compile_statement()?;
        }
        Ok(())
    }

    /// FIRST = { `while` }
    fn compile_while_statement(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::While)?;
        self.compile_condition()?;
        self.eat(TokenKind::Do)?;
        self.compile_statement()
    }

    /// FIRST = { `for` }
    fn compile_for_statement(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::For)?;
        let name = self.expect_identifier()?;
        self.semantic(check_declared_variable(&self.symtab, &name))?;
        self.eat(TokenKind::Assign)?;
        self.compile_expression()?;
        self.eat(TokenKind::To)?;
        self.compile_expression()?;
        self.eat(TokenKind::Do)?;
        self.compile_statement()
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{compile, CompileOptions};
    use crate::errors::{ErrorKind, SemanticError, SyntaxError};
    use crate::parser::token::{SourceLocation, TokenKind};

    fn errors(source: &str) -> Vec<ErrorKind> {
        compile(source, &CompileOptions::default())
            .diagnostics
            .into_iter()
            .map(|d| d.kind)
            .collect()
    }

    #[test]
    fn test_all_statement_forms() {
        let source = r#"
            program Stmts;
            var i : integer; s : integer; a : array(.10.) of integer;
            begin
                s := 0;
                for i := 1 to 10 do
                    a(.i.) := i * i;
                i := 1;
                while i <= 10 do
                    begin
                        if a(.i.) > 20 then s := s + a(.i.) else s := s - 1;
                        i := i + 1
                    end;
                call WRITEI(s);
                call WRITELN;
                ;
            end.
        "#;
        assert_eq!(errors(source), vec![]);
    }

    #[test]
    fn test_dangling_else() {
        let source = "program P; var x : integer; begin if 1 = 1 then if x < 1 then x := 1 else x := 2 end.";
        assert_eq!(errors(source), vec![]);
    }

    #[test]
    fn test_missing_semicolon_between_statements() {
        let source = "program P; var x : integer; begin x := 1 x := 2 end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::MissingToken {
                expected: TokenKind::Semicolon,
                found: TokenKind::Ident,
            })
        );
        assert_eq!(compilation.diagnostics[0].location, SourceLocation::new(1, 42));
    }

    #[test]
    fn test_invalid_statement() {
        assert_eq!(
            errors("program P; begin 5 end."),
            vec![ErrorKind::Syntax(SyntaxError::InvalidStatement)]
        );
    }

    #[test]
    fn test_call_requires_procedure() {
        assert_eq!(
            errors("program P; begin call READI end."),
            vec![ErrorKind::Semantic(SemanticError::InvalidProcedure(
                "READI".to_string()
            ))]
        );
        assert_eq!(
            errors("program P; begin call nothing end."),
            vec![ErrorKind::Semantic(SemanticError::UndeclaredProcedure(
                "nothing".to_string()
            ))]
        );
    }

    #[test]
    fn test_assignment_to_constant_is_invalid_lvalue() {
        assert_eq!(
            errors("program P; const N = 1; begin N := 2 end."),
            vec![ErrorKind::Semantic(SemanticError::InvalidLValue(
                "N".to_string()
            ))]
        );
    }

    #[test]
    fn test_for_requires_variable() {
        let source = r#"
            program P;
            procedure q(n : integer);
            begin for n := 1 to 2 do call WRITELN end;
            begin end.
        "#;
        assert_eq!(
            errors(source),
            vec![ErrorKind::Semantic(SemanticError::InvalidVariable(
                "n".to_string()
            ))]
        );
    }
}
