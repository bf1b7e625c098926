//! Symbol table: declared objects arranged in nested scopes
//!
//! Scopes and objects both live in arenas owned by [`SymbolTable`] and are
//! addressed by [`ScopeId`] / [`ObjectId`]. Each scope points at its enclosing
//! scope, forming a chain from the innermost block out to the program scope.
//! Built-in subroutines sit in a separate global list that every lookup falls
//! back to last.
//!
//! Leaving a block only moves `current` back to the outer scope; the scope
//! itself stays in the arena so the table can be inspected after compilation.

use crate::errors::SemanticError;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// Index of a scope in the symbol table arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Index of an object in the symbol table arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Types a KPL value can have
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Array { size: usize, element: Box<Type> },
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "integer"),
            Type::Char => write!(f, "char"),
            Type::Array { size, element } => write!(f, "array(.{}.) of {}", size, element),
        }
    }
}

/// Value bound to a declared constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue {
    Int(i32),
    Char(char),
}

impl ConstantValue {
    pub fn value_type(&self) -> Type {
        match self {
            ConstantValue::Int(_) => Type::Int,
            ConstantValue::Char(_) => Type::Char,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(n) => write!(f, "{}", n),
            ConstantValue::Char(c) => write!(f, "'{}'", c),
        }
    }
}

/// How an argument is passed to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Value,
    Reference,
}

/// The class of a declared object, without its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Constant,
    Type,
    Variable,
    Function,
    Procedure,
    Parameter,
    Program,
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ObjectClass::Constant => "constant",
            ObjectClass::Type => "type",
            ObjectClass::Variable => "variable",
            ObjectClass::Function => "function",
            ObjectClass::Procedure => "procedure",
            ObjectClass::Parameter => "parameter",
            ObjectClass::Program => "program",
        };
        write!(f, "{}", word)
    }
}

/// Kind-specific attributes of a declared object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Constant(ConstantValue),
    Type(Type),
    Variable(Type),
    Function {
        params: Vec<ObjectId>,
        /// Attached once the function header has been parsed.
        return_type: Option<Type>,
        scope: ScopeId,
    },
    Procedure {
        params: Vec<ObjectId>,
        scope: ScopeId,
    },
    Parameter {
        mode: ParamMode,
        ty: Type,
        owner: ObjectId,
    },
    Program {
        scope: ScopeId,
    },
}

impl ObjectKind {
    pub fn class(&self) -> ObjectClass {
        match self {
            ObjectKind::Constant(_) => ObjectClass::Constant,
            ObjectKind::Type(_) => ObjectClass::Type,
            ObjectKind::Variable(_) => ObjectClass::Variable,
            ObjectKind::Function { .. } => ObjectClass::Function,
            ObjectKind::Procedure { .. } => ObjectClass::Procedure,
            ObjectKind::Parameter { .. } => ObjectClass::Parameter,
            ObjectKind::Program { .. } => ObjectClass::Program,
        }
    }

    /// The scope a subroutine or program body opens, if any.
    pub fn own_scope(&self) -> Option<ScopeId> {
        match self {
            ObjectKind::Function { scope, .. }
            | ObjectKind::Procedure { scope, .. }
            | ObjectKind::Program { scope } => Some(*scope),
            _ => None,
        }
    }
}

/// A named, declared entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
}

impl Object {
    pub fn class(&self) -> ObjectClass {
        self.kind.class()
    }
}

/// One nested namespace
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Objects in declaration order
    objects: Vec<ObjectId>,
    index: FxHashMap<String, ObjectId>,
    outer: Option<ScopeId>,
    owner: Option<ObjectId>,
}

impl Scope {
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn outer(&self) -> Option<ScopeId> {
        self.outer
    }

    /// The program or subroutine whose body this scope is.
    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.index.get(name).copied()
    }

    fn insert(&mut self, name: &str, id: ObjectId) {
        self.index.insert(name.to_string(), id);
        self.objects.push(id);
    }
}

/// Arena-backed scope chain plus the global built-ins
#[derive(Debug, Clone)]
pub struct SymbolTable {
    objects: Vec<Object>,
    scopes: Vec<Scope>,
    current: Option<ScopeId>,
    globals: Scope,
    program: Option<ObjectId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the built-in subroutines.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            objects: Vec::new(),
            scopes: Vec::new(),
            current: None,
            globals: Scope::default(),
            program: None,
        };
        table.install_builtins();
        table
    }

    fn install_builtins(&mut self) {
        let builtins: [(&str, Option<Type>, Option<(&str, Type)>); 5] = [
            ("READC", Some(Type::Char), None),
            ("READI", Some(Type::Int), None),
            ("WRITEI", None, Some(("i", Type::Int))),
            ("WRITEC", None, Some(("ch", Type::Char))),
            ("WRITELN", None, None),
        ];

        for (name, return_type, param) in builtins {
            let scope = self.new_scope();
            let kind = match return_type {
                Some(ty) => ObjectKind::Function {
                    params: Vec::new(),
                    return_type: Some(ty),
                    scope,
                },
                None => ObjectKind::Procedure {
                    params: Vec::new(),
                    scope,
                },
            };
            let owner = self.push_object(name, kind);
            self.globals.insert(name, owner);
            self.scopes[scope.0].owner = Some(owner);

            if let Some((param_name, ty)) = param {
                let id = self.push_object(
                    param_name,
                    ObjectKind::Parameter {
                        mode: ParamMode::Value,
                        ty,
                        owner,
                    },
                );
                self.scopes[scope.0].insert(param_name, id);
                self.attach_param(owner, id);
            }
        }
    }

    /// Allocate a scope nested in the current one. It is not entered.
    pub fn new_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            outer: self.current,
            ..Scope::default()
        });
        id
    }

    /// Make `scope` the innermost scope.
    pub fn enter_block(&mut self, scope: ScopeId) {
        debug!(?scope, "entering block");
        self.current = Some(scope);
    }

    /// Return to the scope enclosing the current one.
    pub fn exit_block(&mut self) {
        debug!(scope = ?self.current, "leaving block");
        self.current = self.current.and_then(|id| self.scopes[id.0].outer);
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.current
    }

    /// Record the program object. It is not visible to lookups.
    pub fn declare_program(&mut self, name: &str, scope: ScopeId) -> ObjectId {
        let id = self.push_object(name, ObjectKind::Program { scope });
        self.scopes[scope.0].owner = Some(id);
        self.program = Some(id);
        id
    }

    pub fn program(&self) -> Option<ObjectId> {
        self.program
    }

    /// Insert an object into the current scope, or the global list when no
    /// block has been entered.
    ///
    /// Names are unique per scope; a clash is reported and nothing is
    /// inserted. Parameters are also appended to their owner's list.
    pub fn declare(&mut self, name: &str, kind: ObjectKind) -> Result<ObjectId, SemanticError> {
        if self.find_in_current(name).is_some() {
            return Err(SemanticError::DuplicateIdent(name.to_string()));
        }

        let owner = match &kind {
            ObjectKind::Parameter { owner, .. } => Some(*owner),
            _ => None,
        };
        let own_scope = kind.own_scope();

        debug!(name, class = %kind.class(), scope = ?self.current, "declaring");
        let id = self.push_object(name, kind);
        self.current_mut().insert(name, id);

        if let Some(owner) = owner {
            self.attach_param(owner, id);
        }
        if let Some(inner) = own_scope {
            self.scopes[inner.0].owner = Some(id);
        }
        Ok(id)
    }

    fn current_mut(&mut self) -> &mut Scope {
        match self.current {
            Some(id) => &mut self.scopes[id.0],
            None => &mut self.globals,
        }
    }

    fn push_object(&mut self, name: &str, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Object {
            name: name.to_string(),
            kind,
        });
        id
    }

    fn attach_param(&mut self, owner: ObjectId, param: ObjectId) {
        match &mut self.objects[owner.0].kind {
            ObjectKind::Function { params, .. } | ObjectKind::Procedure { params, .. } => {
                params.push(param);
            }
            _ => {}
        }
    }

    /// Attach a function's return type once its header is parsed.
    pub fn set_return_type(&mut self, function: ObjectId, ty: Type) {
        if let ObjectKind::Function { return_type, .. } = &mut self.objects[function.0].kind {
            *return_type = Some(ty);
        }
    }

    /// Resolve a name: current scope, each outer scope, then the built-ins.
    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        let mut scope = self.current;
        while let Some(id) = scope {
            let data = &self.scopes[id.0];
            if let Some(found) = data.find(name) {
                return Some(found);
            }
            scope = data.outer;
        }
        self.globals.find(name)
    }

    /// Find a name in the innermost scope only.
    pub fn find_in_current(&self, name: &str) -> Option<ObjectId> {
        match self.current {
            Some(id) => self.scopes[id.0].find(name),
            None => self.globals.find(name),
        }
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// Objects declared directly in `scope`, in declaration order.
    pub fn objects_in(&self, scope: ScopeId) -> impl Iterator<Item = &Object> + '_ {
        self.scopes[scope.0].objects.iter().map(|&id| self.object(id))
    }

    /// Number of scopes between the current one and the outermost.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self.current;
        while let Some(id) = scope {
            depth += 1;
            scope = self.scopes[id.0].outer;
        }
        depth
    }

    fn describe(&self, object: &Object) -> String {
        match &object.kind {
            ObjectKind::Constant(value) => format!("const {} = {}", object.name, value),
            ObjectKind::Type(ty) => format!("type {} = {}", object.name, ty),
            ObjectKind::Variable(ty) => format!("var {} : {}", object.name, ty),
            ObjectKind::Parameter { mode, ty, .. } => match mode {
                ParamMode::Value => format!("param {} : {}", object.name, ty),
                ParamMode::Reference => format!("param var {} : {}", object.name, ty),
            },
            ObjectKind::Function {
                params,
                return_type,
                ..
            } => {
                let ret = return_type
                    .as_ref()
                    .map(|ty| ty.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!("function {}({}) : {}", object.name, self.param_list(params), ret)
            }
            ObjectKind::Procedure { params, .. } => {
                format!("procedure {}({})", object.name, self.param_list(params))
            }
            ObjectKind::Program { .. } => format!("program {}", object.name),
        }
    }

    fn param_list(&self, params: &[ObjectId]) -> String {
        params
            .iter()
            .map(|&id| {
                let param = self.object(id);
                match &param.kind {
                    ObjectKind::Parameter {
                        mode: ParamMode::Reference,
                        ty,
                        ..
                    } => format!("var {}: {}", param.name, ty),
                    ObjectKind::Parameter { ty, .. } => format!("{}: {}", param.name, ty),
                    _ => param.name.clone(),
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write_scope(&self, f: &mut fmt::Formatter<'_>, scope: ScopeId, depth: usize) -> fmt::Result {
        for &id in self.scope(scope).objects() {
            let object = self.object(id);
            if matches!(object.kind, ObjectKind::Parameter { .. }) {
                continue;
            }
            writeln!(f, "{:indent$}{}", "", self.describe(object), indent = depth * 2)?;
            if let Some(inner) = object.kind.own_scope() {
                self.write_scope(f, inner, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Indented listing of the program's declarations.
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(program) = self.program else {
            return Ok(());
        };
        let object = self.object(program);
        writeln!(f, "{}", self.describe(object))?;
        if let Some(scope) = object.kind.own_scope() {
            self.write_scope(f, scope, 1)?;
        }
        Ok(())
    }
}
