//! Declaration AST nodes

use serde::{Deserialize, Serialize};
use crate::{Block, Ident, Span, TypeExpr};

/// A parsed Go source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

/// `import alias "path"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Explicit alias, `_` or `.`
    pub name: Option<Ident>,
    /// Import path without quotes
    pub path: String,
    pub span: Span,
}

impl ImportSpec {
    /// The identifier the import is referred to by inside the file
    pub fn local_name(&self) -> Option<&str> {
        match &self.name {
            Some(alias) if alias.name == "_" || alias.name == "." => None,
            Some(alias) => Some(&alias.name),
            None => self.path.rsplit('/').next(),
        }
    }
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Function(FuncDecl),
    /// `var`, `const`, `type` and late `import` blocks, kept as written
    Other { keyword: String },
}

/// A function or method declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    /// `[T any]` on generic functions
    pub type_params: Option<TypeExpr>,
    pub params: ParamList,
    pub results: Option<TypeExpr>,
    /// Absent for functions implemented outside Go
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    /// `Func` for free functions, `Receiver@Method` for methods
    pub fn key_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}@{}", recv.type_name, self.name.name),
            None => self.name.name.clone(),
        }
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.names().any(|n| n == name)
    }
}

/// Method receiver: `(s *Server)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub name: Option<Ident>,
    /// Named type without pointer or type arguments
    pub type_name: String,
    pub pointer: bool,
    pub span: Span,
}

/// A parenthesized parameter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamList {
    pub params: Vec<Param>,
    /// Covers both parentheses
    pub span: Span,
}

impl ParamList {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .flat_map(|p| p.names.iter().map(|n| n.name.as_str()))
    }

    /// Parameters declared as bare types: `func(int, string)`
    pub fn is_unnamed(&self) -> bool {
        !self.params.is_empty() && self.params.iter().all(|p| p.names.is_empty())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.params
            .first()
            .and_then(|p| p.names.first())
            .map(|n| n.name.as_str())
    }
}

/// A parameter group: `a, b int` or a bare type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub names: Vec<Ident>,
    /// Includes the `...` of a variadic parameter
    pub ty: TypeExpr,
    pub span: Span,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: impl Into<String>, span: Span) -> Self {
        Self {
            names: vec![Ident::new(name, span)],
            ty: TypeExpr::new(ty, span),
            span,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.ty.text.starts_with("...")
    }
}
