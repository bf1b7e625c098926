//! Identifier checks run by the parser at declaration and use sites
//!
//! Each check resolves a name through [`SymbolTable::lookup`] and either
//! returns the resolved object or a [`SemanticError`]:
//! - no object anywhere in scope: "undeclared <kind>"
//! - an object of the wrong class: "invalid <kind>"
//!
//! Checks never modify the table. Locating the error is left to the caller,
//! which knows the token it has just consumed.

use super::symtab::{ObjectClass, ObjectId, SymbolTable};
use crate::errors::SemanticError;

/// Fails if `name` is already declared in the current scope.
///
/// Outer scopes are not consulted, so shadowing is allowed.
pub fn check_fresh_ident(symtab: &SymbolTable, name: &str) -> Result<(), SemanticError> {
    match symtab.find_in_current(name) {
        Some(_) => Err(SemanticError::DuplicateIdent(name.to_string())),
        None => Ok(()),
    }
}

/// Resolve a name of any class.
pub fn check_declared_ident(symtab: &SymbolTable, name: &str) -> Result<ObjectId, SemanticError> {
    symtab
        .lookup(name)
        .ok_or_else(|| SemanticError::UndeclaredIdent(name.to_string()))
}

pub fn check_declared_constant(
    symtab: &SymbolTable,
    name: &str,
) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[ObjectClass::Constant],
        SemanticError::UndeclaredConstant,
        SemanticError::InvalidConstant,
    )
}

pub fn check_declared_type(symtab: &SymbolTable, name: &str) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[ObjectClass::Type],
        SemanticError::UndeclaredType,
        SemanticError::InvalidType,
    )
}

pub fn check_declared_variable(
    symtab: &SymbolTable,
    name: &str,
) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[ObjectClass::Variable],
        SemanticError::UndeclaredVariable,
        SemanticError::InvalidVariable,
    )
}

pub fn check_declared_function(
    symtab: &SymbolTable,
    name: &str,
) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[ObjectClass::Function],
        SemanticError::UndeclaredFunction,
        SemanticError::InvalidFunction,
    )
}

pub fn check_declared_procedure(
    symtab: &SymbolTable,
    name: &str,
) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[ObjectClass::Procedure],
        SemanticError::UndeclaredProcedure,
        SemanticError::InvalidProcedure,
    )
}

/// Resolve an assignment target.
///
/// Functions are accepted so a function body can assign its return value.
pub fn check_declared_lvalue_ident(
    symtab: &SymbolTable,
    name: &str,
) -> Result<ObjectId, SemanticError> {
    check_declared_as(
        symtab,
        name,
        &[
            ObjectClass::Variable,
            ObjectClass::Function,
            ObjectClass::Parameter,
        ],
        SemanticError::UndeclaredIdent,
        SemanticError::InvalidLValue,
    )
}

fn check_declared_as(
    symtab: &SymbolTable,
    name: &str,
    accepted: &[ObjectClass],
    undeclared: fn(String) -> SemanticError,
    invalid: fn(String) -> SemanticError,
) -> Result<ObjectId, SemanticError> {
    let id = symtab
        .lookup(name)
        .ok_or_else(|| undeclared(name.to_string()))?;

    if accepted.contains(&symtab.object(id).class()) {
        Ok(id)
    } else {
        Err(invalid(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::symtab::{ConstantValue, ObjectKind, Type};

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new();
        let scope = table.new_scope();
        table.declare_program("P", scope);
        table.enter_block(scope);
        table
            .declare("N", ObjectKind::Constant(ConstantValue::Int(3)))
            .unwrap();
        table.declare("T", ObjectKind::Type(Type::Char)).unwrap();
        table
            .declare("x", ObjectKind::Variable(Type::Int))
            .unwrap();
        table
    }

    #[test]
    fn test_fresh_ident() {
        let table = table();
        assert_eq!(check_fresh_ident(&table, "y"), Ok(()));
        assert_eq!(
            check_fresh_ident(&table, "x"),
            Err(SemanticError::DuplicateIdent("x".to_string()))
        );
        // Built-ins live outside the current scope and may be shadowed.
        assert_eq!(check_fresh_ident(&table, "WRITELN"), Ok(()));
    }

    #[test]
    fn test_wrong_class_is_invalid_not_undeclared() {
        let table = table();
        assert_eq!(
            check_declared_function(&table, "x"),
            Err(SemanticError::InvalidFunction("x".to_string()))
        );
        assert_eq!(
            check_declared_variable(&table, "T"),
            Err(SemanticError::InvalidVariable("T".to_string()))
        );
        assert_eq!(
            check_declared_type(&table, "N"),
            Err(SemanticError::InvalidType("N".to_string()))
        );
        assert_eq!(
            check_declared_constant(&table, "x"),
            Err(SemanticError::InvalidConstant("x".to_string()))
        );
        assert_eq!(
            check_declared_procedure(&table, "READI"),
            Err(SemanticError::InvalidProcedure("READI".to_string()))
        );
    }

    #[test]
    fn test_undeclared() {
        let table = table();
        assert_eq!(
            check_declared_ident(&table, "zz"),
            Err(SemanticError::UndeclaredIdent("zz".to_string()))
        );
        assert_eq!(
            check_declared_variable(&table, "zz"),
            Err(SemanticError::UndeclaredVariable("zz".to_string()))
        );
        assert_eq!(
            check_declared_procedure(&table, "zz"),
            Err(SemanticError::UndeclaredProcedure("zz".to_string()))
        );
    }

    #[test]
    fn test_lvalue_classes() {
        let table = table();
        assert!(check_declared_lvalue_ident(&table, "x").is_ok());
        assert!(check_declared_lvalue_ident(&table, "READI").is_ok());
        assert_eq!(
            check_declared_lvalue_ident(&table, "N"),
            Err(SemanticError::InvalidLValue("N".to_string()))
        );
        assert_eq!(
            check_declared_lvalue_ident(&table, "q"),
            Err(SemanticError::UndeclaredIdent("q".to_string()))
        );
    }

    #[test]
    fn test_resolves_builtins() {
        let table = table();
        let id = check_declared_procedure(&table, "WRITEI").unwrap();
        assert_eq!(table.object(id).name, "WRITEI");
        assert!(check_declared_function(&table, "READC").is_ok());
    }
}
