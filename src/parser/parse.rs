//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! the two token slots, `eat`, and the program entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a predictive recursive descent recognizer over an LL(1)
//! grammar. Every branch is chosen from `look_ahead.kind` alone.
//! - This module: Parser struct, helper methods, `program`
//! - `declarations`: blocks, constants, types, variables, subroutines
//! - `statements`: assignment, call, compound, `if`, `while`, `for`
//! - `expressions`: expressions, terms, factors, conditions
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks.
//! Semantic checks run as soon as the identifier they concern is consumed and
//! are located at that token.
//!
//! # Error policy
//!
//! Lexical errors are recorded as the lookahead is refilled and the bad token
//! is skipped. The first syntactic or semantic error is returned as `Err` and
//! unwinds the whole parse.

use crate::compiler::{Compilation, CompileOptions};
use crate::errors::{Diagnostic, SemanticError, SyntaxError};
use crate::parser::lexer::Lexer;
use crate::parser::token::{SourceLocation, Token, TokenKind};
use crate::semantics::SymbolTable;
use tracing::{trace, warn};

/// Recursive descent parser for KPL
pub struct Parser {
    pub(crate) lexer: Lexer,
    /// Last consumed token
    pub(crate) current: Option<Token>,
    /// Next unconsumed token, never malformed
    pub(crate) look_ahead: Token,
    pub(crate) symtab: SymbolTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) options: CompileOptions,
    pub(crate) trace: Vec<Token>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, CompileOptions::default())
    }

    pub fn with_options(source: &str, options: CompileOptions) -> Self {
        let lexer = Lexer::with_max_ident_len(source, options.max_ident_len);
        let mut parser = Self {
            lexer,
            current: None,
            look_ahead: Token::eof(SourceLocation::new(1, 1)),
            symtab: SymbolTable::new(),
            diagnostics: Vec::new(),
            options,
            trace: Vec::new(),
        };
        parser.look_ahead = parser.next_valid_token();
        parser
    }

    /// program ::= "program" ident ";" block "." EOF
    ///
    /// FIRST = { `program` }
    pub fn compile_program(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::Program)?;
        let name = self.expect_identifier()?;
        let scope = self.symtab.new_scope();
        self.symtab.declare_program(&name, scope);
        self.eat(TokenKind::Semicolon)?;

        self.symtab.enter_block(scope);
        self.compile_block()?;
        self.eat(TokenKind::Period)?;
        self.symtab.exit_block();

        self.eat(TokenKind::Eof)
    }

    /// Release both token slots and hand back what the parse produced.
    pub fn finish(mut self, result: Result<(), Diagnostic>) -> Compilation {
        if let Err(err) = result {
            self.diagnostics.push(err);
        }
        Compilation {
            diagnostics: self.diagnostics,
            symbols: self.symtab,
            trace: self.trace,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ===== Helper methods =====

    /// Pull tokens until a well-formed one (or EOF) arrives, recording errors.
    fn next_valid_token(&mut self) -> Token {
        loop {
            match self.lexer.next_token() {
                Ok(token) => return token,
                Err(err) => {
                    warn!(%err, "skipping malformed token");
                    self.diagnostics.push(err);
                }
            }
        }
    }

    /// Promote the lookahead to current and refill the lookahead.
    pub(crate) fn advance(&mut self) {
        let next = self.next_valid_token();
        let consumed = std::mem::replace(&mut self.look_ahead, next);
        self.current = Some(consumed);
    }

    /// Consume the lookahead if it has the expected kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<(), Diagnostic> {
        if self.look_ahead.kind != kind {
            return Err(self.missing(kind));
        }

        trace!(token = %self.look_ahead, "accepted");
        if self.options.trace_tokens {
            self.trace.push(self.look_ahead.clone());
        }
        self.advance();
        Ok(())
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.look_ahead.kind == kind
    }

    /// Consume an identifier and return its name.
    pub(crate) fn expect_identifier(&mut self) -> Result<String, Diagnostic> {
        self.eat(TokenKind::Ident)?;
        Ok(self
            .current
            .as_ref()
            .map(|token| token.lexeme.clone())
            .unwrap_or_default())
    }

    pub(crate) fn missing(&self, expected: TokenKind) -> Diagnostic {
        Diagnostic::new(
            SyntaxError::MissingToken {
                expected,
                found: self.look_ahead.kind,
            },
            self.look_ahead.location,
        )
    }

    /// A syntax error located at the lookahead.
    pub(crate) fn syntax_error(&self, err: SyntaxError) -> Diagnostic {
        Diagnostic::new(err, self.look_ahead.location)
    }

    /// Locate a semantic check's failure at the token just consumed.
    pub(crate) fn semantic<T>(&self, result: Result<T, SemanticError>) -> Result<T, Diagnostic> {
        result.map_err(|err| Diagnostic::new(err, self.previous_location()))
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.current
            .as_ref()
            .map(|token| token.location)
            .unwrap_or(self.look_ahead.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn run(source: &str) -> Compilation {
        let mut parser = Parser::new(source);
        let result = parser.compile_program();
        parser.finish(result)
    }

    #[test]
    fn test_parse_empty_program() {
        let compilation = run("program P; begin end.");
        assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);
        assert_eq!(compilation.symbols.current_scope(), None);
    }

    #[test]
    fn test_missing_period() {
        let compilation = run("program P; begin end");
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::MissingToken {
                expected: TokenKind::Period,
                found: TokenKind::Eof,
            })
        );
        assert_eq!(compilation.diagnostics[0].location, SourceLocation::new(1, 21));
    }

    #[test]
    fn test_eat_does_not_advance_on_mismatch() {
        let mut parser = Parser::new("program P;");
        assert!(parser.eat(TokenKind::Begin).is_err());
        assert_eq!(parser.look_ahead.kind, TokenKind::Program);
        assert!(parser.current.is_none());

        assert!(parser.eat(TokenKind::Program).is_ok());
        assert_eq!(parser.current.as_ref().map(|t| t.kind), Some(TokenKind::Program));
        assert_eq!(parser.look_ahead.kind, TokenKind::Ident);
    }

    #[test]
    fn test_lookahead_skips_malformed_tokens() {
        let mut parser = Parser::new("? program");
        assert_eq!(parser.look_ahead.kind, TokenKind::Program);
        assert_eq!(parser.diagnostics().len(), 1);
        assert!(parser.diagnostics()[0].is_lexical());
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let compilation = run("program P; begin end. x");
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::MissingToken {
                expected: TokenKind::Eof,
                found: TokenKind::Ident,
            })
        );
    }

    #[test]
    fn test_trace_records_accepted_tokens() {
        let options = CompileOptions {
            trace_tokens: true,
            ..CompileOptions::default()
        };
        let mut parser = Parser::with_options("program P; begin end.", options);
        let result = parser.compile_program();
        let compilation = parser.finish(result);

        let lines: Vec<String> = compilation.trace.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "1-1:KW_PROGRAM",
                "1-9:TK_IDENT(P)",
                "1-10:SB_SEMICOLON",
                "1-12:KW_BEGIN",
                "1-18:KW_END",
                "1-21:SB_PERIOD",
                "1-22:TK_EOF",
            ]
        );
    }
}
