//! One-call compilation entry point and its options

use crate::errors::Diagnostic;
use crate::parser::parse::Parser;
use crate::parser::token::{Token, MAX_IDENT_LEN};
use crate::semantics::SymbolTable;
use tracing::{debug, info};

/// Knobs for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Record every token accepted by the parser in [`Compilation::trace`].
    pub trace_tokens: bool,
    /// Longest identifier the scanner accepts.
    pub max_ident_len: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            trace_tokens: false,
            max_ident_len: MAX_IDENT_LEN,
        }
    }
}

/// Everything a compilation produced, whether or not it succeeded.
#[derive(Debug)]
pub struct Compilation {
    /// Lexical errors in detection order, followed by at most one fatal error.
    pub diagnostics: Vec<Diagnostic>,
    /// The symbol table as it stood when parsing stopped.
    pub symbols: SymbolTable,
    /// Accepted tokens, only filled when [`CompileOptions::trace_tokens`] is set.
    pub trace: Vec<Token>,
}

impl Compilation {
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Scan, parse and scope-check a whole program.
pub fn compile(source: &str, options: &CompileOptions) -> Compilation {
    debug!(?options, "compiling {} bytes", source.len());

    let mut parser = Parser::with_options(source, options.clone());
    let result = parser.compile_program();
    let compilation = parser.finish(result);

    info!(
        diagnostics = compilation.diagnostics.len(),
        "compilation {}",
        if compilation.is_success() { "succeeded" } else { "failed" }
    );
    compilation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CompileOptions::default();
        assert!(!options.trace_tokens);
        assert_eq!(options.max_ident_len, 15);
    }

    #[test]
    fn test_trace_is_empty_unless_requested() {
        let compilation = compile("program P; begin end.", &CompileOptions::default());
        assert!(compilation.is_success());
        assert!(compilation.trace.is_empty());
    }

    #[test]
    fn test_lexical_errors_do_not_stop_compilation() {
        let compilation = compile("program P; ? begin ? end.", &CompileOptions::default());
        assert_eq!(compilation.diagnostics.len(), 2);
        assert!(compilation.diagnostics.iter().all(|d| d.is_lexical()));
        assert!(!compilation.is_success());
    }

    #[test]
    fn test_shorter_identifier_limit() {
        let options = CompileOptions {
            max_ident_len: 3,
            ..CompileOptions::default()
        };
        let compilation = compile("program Long; begin end.", &options);
        assert!(compilation.diagnostics[0].is_lexical());
    }
}
