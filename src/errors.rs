//! Error types for the compiler front end
//!
//! Errors are split by the stage that detects them:
//! - [`LexError`]: malformed tokens. Recorded, then scanning resumes.
//! - [`SyntaxError`]: grammar violations. The first one ends the compilation.
//! - [`SemanticError`]: identifier misuse found while resolving names. Also fatal.
//!
//! Every reported error is a [`Diagnostic`]: an [`ErrorKind`] plus the
//! [`SourceLocation`] it is reported at. Diagnostics render as `line-col: message`.

use crate::parser::token::{SourceLocation, TokenKind};
use thiserror::Error;

/// Errors raised by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("identifier too long (at most {max} characters)")]
    IdentTooLong { max: usize },

    #[error("number too large")]
    NumberTooLong,

    #[error("invalid character constant")]
    InvalidCharConstant,

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(char),
}

/// Errors raised by the parser when the token stream does not fit the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("missing {expected}, found {found}")]
    MissingToken { expected: TokenKind, found: TokenKind },

    #[error("invalid statement")]
    InvalidStatement,

    #[error("invalid expression")]
    InvalidExpression,

    #[error("invalid factor")]
    InvalidFactor,

    #[error("invalid type")]
    InvalidType,

    #[error("invalid basic type")]
    InvalidBasicType,

    #[error("invalid constant")]
    InvalidConstant,

    #[error("invalid comparator")]
    InvalidComparator,
}

/// Errors raised while resolving identifiers against the scope chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("undeclared identifier '{0}'")]
    UndeclaredIdent(String),

    #[error("undeclared constant '{0}'")]
    UndeclaredConstant(String),

    #[error("undeclared type '{0}'")]
    UndeclaredType(String),

    #[error("undeclared variable '{0}'")]
    UndeclaredVariable(String),

    #[error("undeclared function '{0}'")]
    UndeclaredFunction(String),

    #[error("undeclared procedure '{0}'")]
    UndeclaredProcedure(String),

    #[error("invalid constant '{0}'")]
    InvalidConstant(String),

    #[error("invalid type '{0}'")]
    InvalidType(String),

    #[error("invalid variable '{0}'")]
    InvalidVariable(String),

    #[error("invalid function '{0}'")]
    InvalidFunction(String),

    #[error("invalid procedure '{0}'")]
    InvalidProcedure(String),

    #[error("invalid lvalue '{0}'")]
    InvalidLValue(String),

    #[error("'{0}' cannot be used as a factor")]
    InvalidFactor(String),

    #[error("duplicate identifier '{0}'")]
    DuplicateIdent(String),
}

/// Any error the front end can report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// A located error, as printed to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {kind}")]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(kind: impl Into<ErrorKind>, location: SourceLocation) -> Self {
        Self {
            kind: kind.into(),
            location,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, ErrorKind::Lex(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_rendering() {
        let missing = Diagnostic::new(
            SyntaxError::MissingToken {
                expected: TokenKind::Period,
                found: TokenKind::Eof,
            },
            SourceLocation::new(4, 12),
        );
        assert_eq!(missing.to_string(), "4-12: missing '.', found end of file");

        let undeclared = Diagnostic::new(
            SemanticError::UndeclaredVariable("x".to_string()),
            SourceLocation::new(1, 2),
        );
        assert_eq!(undeclared.to_string(), "1-2: undeclared variable 'x'");
        assert!(!undeclared.is_lexical());
    }
}
