//! Lexer (tokenizer) for KPL source code
//!
//! Converts raw source text into [`Token`]s one at a time through
//! [`Lexer::next_token`]. The parser pulls tokens lazily so that it only ever
//! holds one token of lookahead.
//!
//! A malformed token is returned as an `Err` and the lexer has already moved
//! past it, so the caller can record the error and keep scanning. Once the
//! input is exhausted every further call yields an EOF token.

use super::token::{SourceLocation, Token, TokenKind, MAX_IDENT_LEN};
use crate::errors::{Diagnostic, LexError};
use tracing::warn;

/// Lexer for KPL source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    max_ident_len: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self::with_max_ident_len(input, MAX_IDENT_LEN)
    }

    /// Create a lexer with a custom identifier length limit.
    pub fn with_max_ident_len(input: &str, max_ident_len: usize) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            max_ident_len,
        }
    }

    /// Scan the next token from the current position.
    pub fn next_token(&mut self) -> Result<Token, Diagnostic> {
        self.skip_whitespace_and_comments()?;

        let Some(ch) = self.peek() else {
            return Ok(Token::eof(self.current_location()));
        };

        match ch {
            'a'..='z' | 'A'..='Z' => self.identifier_or_keyword(),
            '0'..='9' => self.number_literal(),
            '\'' => self.char_literal(),
            _ => self.symbol(),
        }
    }

    /// Parse a one- or two-character symbol
    fn symbol(&mut self) -> Result<Token, Diagnostic> {
        let loc = self.current_location();
        let start = self.position;
        let Some(ch) = self.advance() else {
            return Ok(Token::eof(loc));
        };

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Slash,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Eq,
            ')' => TokenKind::RParen,
            '.' => self.followed_by(')', TokenKind::RSel, TokenKind::Period),
            ':' => self.followed_by('=', TokenKind::Assign, TokenKind::Colon),
            '>' => self.followed_by('=', TokenKind::Ge, TokenKind::Gt),
            '(' => self.followed_by('.', TokenKind::LSel, TokenKind::LParen),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Neq
                } else {
                    TokenKind::Lt
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Neq
                } else {
                    return Err(Diagnostic::new(LexError::InvalidSymbol(ch), loc));
                }
            }
            _ => return Err(Diagnostic::new(LexError::InvalidSymbol(ch), loc)),
        };

        Ok(Token::new(kind, self.text_from(start), loc))
    }

    /// Consume `next` if it comes next and pick the two-character kind.
    fn followed_by(&mut self, next: char, pair: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            pair
        } else {
            single
        }
    }

    /// Parse character literal: exactly one character between quotes
    fn char_literal(&mut self) -> Result<Token, Diagnostic> {
        let loc = self.current_location();
        self.advance(); // opening quote

        let mut content = String::new();
        let mut closed = false;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '\'' {
                closed = true;
                break;
            }
            content.push(ch);
        }

        if !closed || content.chars().count() != 1 {
            return Err(Diagnostic::new(LexError::InvalidCharConstant, loc));
        }

        Ok(Token::new(TokenKind::CharLiteral, content, loc))
    }

    /// Parse numeric literal (unsigned decimal integers only)
    fn number_literal(&mut self) -> Result<Token, Diagnostic> {
        let loc = self.current_location();
        let start = self.position;

        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }

        let digits = self.text_from(start);
        if digits.parse::<i32>().is_err() {
            return Err(Diagnostic::new(LexError::NumberTooLong, loc));
        }

        Ok(Token::new(TokenKind::Number, digits, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> Result<Token, Diagnostic> {
        let loc = self.current_location();
        let start = self.position;

        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric()) {
            self.advance();
        }

        let ident = self.text_from(start);
        if let Some(kind) = TokenKind::keyword(&ident) {
            return Ok(Token::new(kind, ident, loc));
        }
        if ident.chars().count() > self.max_ident_len {
            return Err(Diagnostic::new(
                LexError::IdentTooLong {
                    max: self.max_ident_len,
                },
                loc,
            ));
        }

        Ok(Token::new(TokenKind::Ident, ident, loc))
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('(') if self.peek_ahead(1) == Some('*') => {
                    self.skip_block_comment()?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip comment (`(* ... *)`), reporting an unterminated one where it began
    fn skip_block_comment(&mut self) -> Result<(), Diagnostic> {
        let start_loc = self.current_location();
        self.advance(); // skip '('
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some(')') {
                self.advance(); // skip '*'
                self.advance(); // skip ')'
                return Ok(());
            }
            self.advance();
        }

        Err(Diagnostic::new(LexError::UnterminatedComment, start_loc))
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Scan the whole input, collecting lexical errors instead of stopping at them.
///
/// The returned token list always ends with exactly one EOF token.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                tokens.push(token);
                break;
            }
            Ok(token) => tokens.push(token),
            Err(err) => {
                warn!(%err, "lexical error");
                errors.push(err);
            }
        }
    }

    (tokens, errors)
}
