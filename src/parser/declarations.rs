//! Declaration parsing implementation
//!
//! This module handles the declaration part of a block:
//!
//! - Constants: `const N = 10; C = 'a';`
//! - Types: `type Row = array(.10.) of integer;`
//! - Variables: `var x : integer;`
//! - Subroutines: `function f(var a : integer) : char; <block>;`
//!
//! # Grammar
//!
//! ```text
//! block      ::= ["const" constDecl (";" constDecl)* [";"]]
//!                ["type" typeDecl (";" typeDecl)* [";"]]
//!                ["var" varDecl (";" varDecl)* [";"]]
//!                subDecl* "begin" statements "end"
//! constDecl  ::= ident "=" constant
//! typeDecl   ::= ident "=" type
//! varDecl    ::= ident ":" type
//! subDecl    ::= funcDecl | procDecl
//! funcDecl   ::= "function" ident [params] ":" basicType ";" block ";"
//! procDecl   ::= "procedure" ident [params] ";" block ";"
//! params     ::= "(" [param (";" param)*] ")"
//! param      ::= ["var"] ident ":" basicType
//! type       ::= "integer" | "char" | ident | "array" "(." number ".)" "of" type
//! basicType  ::= "integer" | "char" | ident
//! constant   ::= ["+" | "-"] (number | ident) | char
//! ```
//!
//! Every declared name goes through `check_fresh_ident` first and is then
//! inserted into the current scope.

use crate::errors::{Diagnostic, SyntaxError};
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;
use crate::semantics::{
    check_declared_constant, check_declared_type, check_fresh_ident, ConstantValue, ObjectId,
    ObjectKind, ParamMode, Type,
};

impl Parser {
    /// FIRST = { `const`, `type`, `var`, `function`, `procedure`, `begin` };
    /// FOLLOW = { `.`, `;` }
    pub(crate) fn compile_block(&mut self) -> Result<(), Diagnostic> {
        if self.check(TokenKind::Const) {
            self.eat(TokenKind::Const)?;
            self.compile_decl_list(Self::compile_const_decl)?;
        }

        if self.check(TokenKind::Type) {
            self.eat(TokenKind::Type)?;
            self.compile_decl_list(Self::compile_type_decl)?;
        }

        if self.check(TokenKind::Var) {
            self.eat(TokenKind::Var)?;
            self.compile_decl_list(Self::compile_var_decl)?;
        }

        self.compile_sub_decls()?;

        self.eat(TokenKind::Begin)?;
        self.compile_statements()?;
        self.eat(TokenKind::End)
    }

    /// One or more declarations separated by `;`, the last `;` optional.
    fn compile_decl_list(
        &mut self,
        decl: fn(&mut Self) -> Result<(), Diagnostic>,
    ) -> Result<(), Diagnostic> {
        decl(self)?;
        while self.check(TokenKind::Semicolon) {
            self.eat(TokenKind::Semicolon)?;
            if !self.check(TokenKind::Ident) {
                break;
            }
            decl(self)?;
        }
        Ok(())
    }

    /// FIRST = { ident }
    fn compile_const_decl(&mut self) -> Result<(), Diagnostic> {
        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;
        self.eat(TokenKind::Eq)?;
        let value = self.compile_constant()?;
        self.declare(&name, ObjectKind::Constant(value))?;
        Ok(())
    }

    /// FIRST = { ident }
    fn compile_type_decl(&mut self) -> Result<(), Diagnostic> {
        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;
        self.eat(TokenKind::Eq)?;
        let ty = self.compile_type()?;
        self.declare(&name, ObjectKind::Type(ty))?;
        Ok(())
    }

    /// FIRST = { ident }
    fn compile_var_decl(&mut self) -> Result<(), Diagnostic> {
        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;
        self.eat(TokenKind::Colon)?;
        let ty = self.compile_type()?;
        self.declare(&name, ObjectKind::Variable(ty))?;
        Ok(())
    }

    /// FIRST = { `function`, `procedure` }; FOLLOW = { `begin` }
    fn compile_sub_decls(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.look_ahead.kind {
                TokenKind::Function => self.compile_func_decl()?,
                TokenKind::Procedure => self.compile_proc_decl()?,
                _ => return Ok(()),
            }
        }
    }

    /// FIRST = { `function` }
    fn compile_func_decl(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::Function)?;
        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;

        let scope = self.symtab.new_scope();
        let function = self.declare(
            &name,
            ObjectKind::Function {
                params: Vec::new(),
                return_type: None,
                scope,
            },
        )?;

        self.symtab.enter_block(scope);
        if self.check(TokenKind::LParen) {
            self.compile_params(function)?;
        }
        self.eat(TokenKind::Colon)?;
        let return_type = self.compile_basic_type()?;
        self.symtab.set_return_type(function, return_type);
        self.eat(TokenKind::Semicolon)?;
        self.compile_block()?;
        self.eat(TokenKind::Semicolon)?;
        self.symtab.exit_block();
        Ok(())
    }

    /// FIRST = { `procedure` }
    fn compile_proc_decl(&mut self) -> Result<(), Diagnostic> {
        self.eat(TokenKind::Procedure)?;
        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;

        let scope = self.symtab.new_scope();
        let procedure = self.declare(
            &name,
            ObjectKind::Procedure {
                params: Vec::new(),
                scope,
            },
        )?;

        self.symtab.enter_block(scope);
        if self.check(TokenKind::LParen) {
            self.compile_params(procedure)?;
        }
        self.eat(TokenKind::Semicolon)?;
        self.compile_block()?;
        self.eat(TokenKind::Semicolon)?;
        self.symtab.exit_block();
        Ok(())
    }

    /// FIRST = { `(` }
    fn compile_params(&mut self, owner: ObjectId) -> Result<(), Diagnostic> {
        self.eat(TokenKind::LParen)?;
        if !self.check(TokenKind::RParen) {
            self.compile_param(owner)?;
            while self.check(TokenKind::Semicolon) {
                self.eat(TokenKind::Semicolon)?;
                self.compile_param(owner)?;
            }
        }
        self.eat(TokenKind::RParen)
    }

    /// FIRST = { `var`, ident }
    fn compile_param(&mut self, owner: ObjectId) -> Result<(), Diagnostic> {
        let mode = if self.check(TokenKind::Var) {
            self.eat(TokenKind::Var)?;
            ParamMode::Reference
        } else {
            ParamMode::Value
        };

        let name = self.expect_identifier()?;
        self.semantic(check_fresh_ident(&self.symtab, &name))?;
        self.eat(TokenKind::Colon)?;
        let ty = self.compile_basic_type()?;
        self.declare(&name, ObjectKind::Parameter { mode, ty, owner })?;
        Ok(())
    }

    /// FIRST = { `integer`, `char`, `array`, ident }
    pub(crate) fn compile_type(&mut self) -> Result<Type, Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Integer => {
                self.eat(TokenKind::Integer)?;
                Ok(Type::Int)
            }
            TokenKind::Char => {
                self.eat(TokenKind::Char)?;
                Ok(Type::Char)
            }
            TokenKind::Array => {
                self.eat(TokenKind::Array)?;
                self.eat(TokenKind::LSel)?;
                self.eat(TokenKind::Number)?;
                let size = self.current_number()?;
                self.eat(TokenKind::RSel)?;
                self.eat(TokenKind::Of)?;
                let element = self.compile_type()?;
                Ok(Type::Array {
                    size: size as usize,
                    element: Box::new(element),
                })
            }
            TokenKind::Ident => {
                let name = self.expect_identifier()?;
                let id = self.semantic(check_declared_type(&self.symtab, &name))?;
                match &self.symtab.object(id).kind {
                    ObjectKind::Type(ty) => Ok(ty.clone()),
                    _ => Err(self.syntax_error(SyntaxError::InvalidType)),
                }
            }
            _ => Err(self.syntax_error(SyntaxError::InvalidType)),
        }
    }

    /// FIRST = { `integer`, `char`, ident }
    ///
    /// A type name is accepted only when it stands for `integer` or `char`.
    pub(crate) fn compile_basic_type(&mut self) -> Result<Type, Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Integer => {
                self.eat(TokenKind::Integer)?;
                Ok(Type::Int)
            }
            TokenKind::Char => {
                self.eat(TokenKind::Char)?;
                Ok(Type::Char)
            }
            TokenKind::Ident => {
                let name = self.expect_identifier()?;
                let id = self.semantic(check_declared_type(&self.symtab, &name))?;
                match &self.symtab.object(id).kind {
                    ObjectKind::Type(ty @ (Type::Int | Type::Char)) => Ok(ty.clone()),
                    _ => Err(Diagnostic::new(
                        SyntaxError::InvalidBasicType,
                        self.previous_location(),
                    )),
                }
            }
            _ => Err(self.syntax_error(SyntaxError::InvalidBasicType)),
        }
    }

    /// FIRST = { `+`, `-`, number, char, ident }
    pub(crate) fn compile_constant(&mut self) -> Result<ConstantValue, Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Plus => {
                self.eat(TokenKind::Plus)?;
                self.compile_int_constant()
            }
            TokenKind::Minus => {
                self.eat(TokenKind::Minus)?;
                let location = self.previous_location();
                match self.compile_int_constant()? {
                    ConstantValue::Int(n) => n
                        .checked_neg()
                        .map(ConstantValue::Int)
                        .ok_or_else(|| Diagnostic::new(SyntaxError::InvalidConstant, location)),
                    ConstantValue::Char(_) => {
                        Err(Diagnostic::new(SyntaxError::InvalidConstant, location))
                    }
                }
            }
            TokenKind::CharLiteral => {
                self.eat(TokenKind::CharLiteral)?;
                let ch = self
                    .current
                    .as_ref()
                    .and_then(|token| token.lexeme.chars().next())
                    .ok_or_else(|| self.syntax_error(SyntaxError::InvalidConstant))?;
                Ok(ConstantValue::Char(ch))
            }
            _ => self.compile_unsigned_constant(),
        }
    }

    /// A constant after a sign: must be an integer.
    fn compile_int_constant(&mut self) -> Result<ConstantValue, Diagnostic> {
        let location = self.look_ahead.location;
        match self.compile_unsigned_constant()? {
            ConstantValue::Char(_) => Err(Diagnostic::new(SyntaxError::InvalidConstant, location)),
            value => Ok(value),
        }
    }

    /// FIRST = { number, ident }
    fn compile_unsigned_constant(&mut self) -> Result<ConstantValue, Diagnostic> {
        match self.look_ahead.kind {
            TokenKind::Number => {
                self.eat(TokenKind::Number)?;
                Ok(ConstantValue::Int(self.current_number()?))
            }
            TokenKind::Ident => {
                let name = self.expect_identifier()?;
                let id = self.semantic(check_declared_constant(&self.symtab, &name))?;
                match self.symtab.object(id).kind {
                    ObjectKind::Constant(value) => Ok(value),
                    _ => Err(self.syntax_error(SyntaxError::InvalidConstant)),
                }
            }
            _ => Err(self.syntax_error(SyntaxError::InvalidConstant)),
        }
    }

    /// Value of the number token just consumed.
    fn current_number(&self) -> Result<i32, Diagnostic> {
        self.current
            .as_ref()
            .and_then(|token| token.lexeme.parse::<i32>().ok())
            .ok_or_else(|| Diagnostic::new(SyntaxError::InvalidConstant, self.previous_location()))
    }

    /// Insert into the current scope, locating a clash at the name just read.
    fn declare(&mut self, name: &str, kind: ObjectKind) -> Result<ObjectId, Diagnostic> {
        let result = self.symtab.declare(name, kind);
        self.semantic(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{compile, CompileOptions};
    use crate::errors::{ErrorKind, SemanticError, SyntaxError};
    use crate::parser::token::SourceLocation;
    use crate::semantics::{ConstantValue, ObjectKind, ParamMode, Type};

    #[test]
    fn test_constants_resolve_and_negate() {
        let source = "program P; const N = 10; M = -N; C = 'x'; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);

        let symbols = &compilation.symbols;
        let program = symbols.program().unwrap();
        let scope = symbols.object(program).kind.own_scope().unwrap();
        let values: Vec<_> = symbols
            .objects_in(scope)
            .map(|o| (o.name.as_str(), o.kind.clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("N", ObjectKind::Constant(ConstantValue::Int(10))),
                ("M", ObjectKind::Constant(ConstantValue::Int(-10))),
                ("C", ObjectKind::Constant(ConstantValue::Char('x'))),
            ]
        );
    }

    #[test]
    fn test_declaration_lists_without_trailing_semicolon() {
        let source = "program P; var a : integer; b : char begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);
    }

    #[test]
    fn test_type_alias_and_array() {
        let source = r#"
            program P;
            type Row = array(.5.) of integer;
                 Grid = array(.3.) of Row;
            var g : Grid;
            begin end.
        "#;
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);
        assert!(compilation
            .symbols
            .to_string()
            .contains("var g : array(.3.) of array(.5.) of integer"));
    }

    #[test]
    fn test_signed_char_constant_is_invalid() {
        let source = "program P; const C = -'a'; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::InvalidConstant)
        );
    }

    #[test]
    fn test_function_parameters_and_return_type() {
        let source = r#"
            program P;
            function f(a : integer; var b : char) : char;
            begin f := b end;
            begin end.
        "#;
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);

        let symbols = &compilation.symbols;
        let program = symbols.program().unwrap();
        let scope = symbols.object(program).kind.own_scope().unwrap();
        let f = symbols.scope(scope).find("f").unwrap();
        match &symbols.object(f).kind {
            ObjectKind::Function {
                params,
                return_type,
                ..
            } => {
                assert_eq!(return_type, &Some(Type::Char));
                let modes: Vec<_> = params
                    .iter()
                    .map(|&id| match &symbols.object(id).kind {
                        ObjectKind::Parameter { mode, .. } => *mode,
                        other => panic!("Expected parameter, got {:?}", other),
                    })
                    .collect();
                assert_eq!(modes, vec![ParamMode::Value, ParamMode::Reference]);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_declaration() {
        let source = "program P; var x : integer; x : char; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Semantic(SemanticError::DuplicateIdent("x".to_string()))
        );
        // Located at the second `x`.
        assert_eq!(compilation.diagnostics[0].location.column, 29);
    }

    #[test]
    fn test_function_requires_basic_return_type() {
        let source = "program P; type Row = array(.3.) of integer; function f : Row; begin end; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::InvalidBasicType)
        );
        // Located at `Row` after the colon.
        assert_eq!(compilation.diagnostics[0].location, SourceLocation::new(1, 59));

        let source = "program P; function f : array(.3.) of integer; begin end; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::InvalidBasicType)
        );
    }

    #[test]
    fn test_return_type_through_alias() {
        let source = "program P; type T = integer; function f : T; begin f := 1 end; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);
        assert!(compilation
            .symbols
            .to_string()
            .contains("function f() : integer"));
    }

    #[test]
    fn test_parameter_type_through_alias() {
        let source = "program P; type T = char; procedure q(a : T; var b : T); begin end; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert!(compilation.is_success(), "{:?}", compilation.diagnostics);
        assert!(compilation
            .symbols
            .to_string()
            .contains("procedure q(a: char; var b: char)"));
    }

    #[test]
    fn test_signed_constant_identifier_holding_char() {
        let source = "program P; const C = 'a'; D = -C; begin end.";
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(
            compilation.diagnostics[0].kind,
            ErrorKind::Syntax(SyntaxError::InvalidConstant)
        );
        // Located at `C`, not at the following `;`.
        assert_eq!(compilation.diagnostics[0].location, SourceLocation::new(1, 32));
    }

    fn first_error(source: &str) -> (ErrorKind, SourceLocation) {
        let compilation = compile(source, &CompileOptions::default());
        assert_eq!(compilation.diagnostics.len(), 1, "{:?}", compilation.diagnostics);
        let diagnostic = compilation.diagnostics[0].clone();
        (diagnostic.kind, diagnostic.location)
    }

    #[test]
    fn test_undeclared_type_in_variable() {
        assert_eq!(
            first_error("program P; var x : Foo; begin end."),
            (
                ErrorKind::Semantic(SemanticError::UndeclaredType("Foo".to_string())),
                SourceLocation::new(1, 20)
            )
        );
    }

    #[test]
    fn test_constant_used_as_type() {
        assert_eq!(
            first_error("program P; const N = 1; var x : N; begin end."),
            (
                ErrorKind::Semantic(SemanticError::InvalidType("N".to_string())),
                SourceLocation::new(1, 33)
            )
        );
    }

    #[test]
    fn test_undeclared_constant_initialiser() {
        assert_eq!(
            first_error("program P; const C = Z; begin end."),
            (
                ErrorKind::Semantic(SemanticError::UndeclaredConstant("Z".to_string())),
                SourceLocation::new(1, 22)
            )
        );
    }

    #[test]
    fn test_variable_used_as_constant() {
        assert_eq!(
            first_error("program P; var v : integer; procedure q; const C = v; begin end; begin end."),
            (
                ErrorKind::Semantic(SemanticError::InvalidConstant("v".to_string())),
                SourceLocation::new(1, 52)
            )
        );
    }
}
