//! Token definitions shared by the lexer and the parser
//!
//! A [`Token`] pairs a [`TokenKind`] with its raw lexeme and the
//! [`SourceLocation`] of its first character. `TokenKind` is a closed enum so
//! every `match` in the parser is checked for exhaustiveness.

use std::fmt;

/// Longest identifier the lexer accepts.
pub const MAX_IDENT_LEN: usize = 15;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.line, self.column)
    }
}

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and identifiers
    Ident,
    Number,
    CharLiteral,

    // Keywords
    Program,
    Const,
    Type,
    Var,
    Integer,
    Char,
    Array,
    Of,
    Function,
    Procedure,
    Begin,
    End,
    Call,
    If,
    Then,
    Else,
    While,
    Do,
    For,
    To,

    // Symbols
    Semicolon, // ;
    Colon,     // :
    Period,    // .
    Comma,     // ,
    Assign,    // :=
    Eq,        // =
    Neq,       // <> or !=
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=
    Plus,      // +
    Minus,     // -
    Times,     // *
    Slash,     // /
    LParen,    // (
    RParen,    // )
    LSel,      // (.
    RSel,      // .)

    // End of file
    Eof,
}

/// Reserved words, matched without regard to ASCII case: `BEGIN`, `Begin`
/// and `begin` are the same keyword. Identifiers stay case-sensitive.
const KEYWORDS: [(&str, TokenKind); 20] = [
    ("program", TokenKind::Program),
    ("const", TokenKind::Const),
    ("type", TokenKind::Type),
    ("var", TokenKind::Var),
    ("integer", TokenKind::Integer),
    ("char", TokenKind::Char),
    ("array", TokenKind::Array),
    ("of", TokenKind::Of),
    ("function", TokenKind::Function),
    ("procedure", TokenKind::Procedure),
    ("begin", TokenKind::Begin),
    ("end", TokenKind::End),
    ("call", TokenKind::Call),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("for", TokenKind::For),
    ("to", TokenKind::To),
];

impl TokenKind {
    /// Classify a lexeme as a keyword, or `None` for a plain identifier.
    ///
    /// The comparison ignores ASCII case.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(word, _)| word.eq_ignore_ascii_case(text))
            .map(|&(_, kind)| kind)
    }

    /// Relational operators accepted in a condition.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
        )
    }

    /// Upper-case name used in the token trace, e.g. `KW_BEGIN`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Ident => "TK_IDENT",
            TokenKind::Number => "TK_NUMBER",
            TokenKind::CharLiteral => "TK_CHAR",
            TokenKind::Eof => "TK_EOF",
            TokenKind::Program => "KW_PROGRAM",
            TokenKind::Const => "KW_CONST",
            TokenKind::Type => "KW_TYPE",
            TokenKind::Var => "KW_VAR",
            TokenKind::Integer => "KW_INTEGER",
            TokenKind::Char => "KW_CHAR",
            TokenKind::Array => "KW_ARRAY",
            TokenKind::Of => "KW_OF",
            TokenKind::Function => "KW_FUNCTION",
            TokenKind::Procedure => "KW_PROCEDURE",
            TokenKind::Begin => "KW_BEGIN",
            TokenKind::End => "KW_END",
            TokenKind::Call => "KW_CALL",
            TokenKind::If => "KW_IF",
            TokenKind::Then => "KW_THEN",
            TokenKind::Else => "KW_ELSE",
            TokenKind::While => "KW_WHILE",
            TokenKind::Do => "KW_DO",
            TokenKind::For => "KW_FOR",
            TokenKind::To => "KW_TO",
            TokenKind::Semicolon => "SB_SEMICOLON",
            TokenKind::Colon => "SB_COLON",
            TokenKind::Period => "SB_PERIOD",
            TokenKind::Comma => "SB_COMMA",
            TokenKind::Assign => "SB_ASSIGN",
            TokenKind::Eq => "SB_EQ",
            TokenKind::Neq => "SB_NEQ",
            TokenKind::Lt => "SB_LT",
            TokenKind::Le => "SB_LE",
            TokenKind::Gt => "SB_GT",
            TokenKind::Ge => "SB_GE",
            TokenKind::Plus => "SB_PLUS",
            TokenKind::Minus => "SB_MINUS",
            TokenKind::Times => "SB_TIMES",
            TokenKind::Slash => "SB_SLASH",
            TokenKind::LParen => "SB_LPAR",
            TokenKind::RParen => "SB_RPAR",
            TokenKind::LSel => "SB_LSEL",
            TokenKind::RSel => "SB_RSEL",
        }
    }
}

/// Human-readable description used inside error messages.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::CharLiteral => write!(f, "character constant"),
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Period => write!(f, "'.'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Assign => write!(f, "':='"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Neq => write!(f, "'<>'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Times => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LSel => write!(f, "'(.'"),
            TokenKind::RSel => write!(f, "'.)'"),
            keyword => {
                let (word, _) = KEYWORDS
                    .iter()
                    .find(|(_, kind)| kind == keyword)
                    .ok_or(fmt::Error)?;
                write!(f, "'{}'", word)
            }
        }
    }
}

/// A scanned token. Owned by whichever parser slot currently holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }
}

/// Trace form: `line-col:KIND` with the lexeme appended for literals.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.location, self.kind.name())?;
        match self.kind {
            TokenKind::Ident | TokenKind::Number => write!(f, "({})", self.lexeme),
            TokenKind::CharLiteral => write!(f, "('{}')", self.lexeme),
            _ => Ok(()),
        }
    }
}
