//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{BinaryOp, Expr, Ident, Span, TypeExpr};

/// A block of statements; the span covers both braces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    /// Offset just past the opening brace
    pub fn inner_start(&self) -> usize {
        self.span.start + 1
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Expression statement: `foo()`
    Expr(Expr),

    /// Channel send: `ch <- v`
    Send { channel: Expr, value: Expr },

    /// `x++` / `x--`
    IncDec { target: Expr, increment: bool },

    /// Assignment: `a, b = f()`, `x := 5`, `n += 1`
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },

    /// Variable declaration: `var x T = v` or a parenthesized group
    Var(Vec<ValueSpec>),

    /// Return statement with zero or more results
    Return(Vec<Expr>),

    If(IfStmt),

    /// Counted loop, including the infinite and condition-only forms
    For(ForStmt),

    /// Collection iteration: `for k, v := range xs { ... }`
    Range(RangeStmt),

    /// Expression or type switch
    Switch(SwitchStmt),

    Select(Vec<CommClause>),

    /// `go f(x)`; holds the launched call
    Go(Expr),

    /// `defer f(x)`; holds the deferred call
    Defer(Expr),

    Block(Block),

    Labeled {
        label: Ident,
        statement: Box<Statement>,
    },

    /// `break`, `continue`, `goto` and `fallthrough`
    Branch {
        keyword: String,
        label: Option<Ident>,
    },

    /// `const` or `type` declaration inside a function, kept as written
    Decl(Span),

    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`, `<<=`, ...
    Compound(BinaryOp),
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::Compound(op) => match op {
                BinaryOp::Add => "+=",
                BinaryOp::Sub => "-=",
                BinaryOp::Mul => "*=",
                BinaryOp::Div => "/=",
                BinaryOp::Rem => "%=",
                BinaryOp::And => "&=",
                BinaryOp::Or => "|=",
                BinaryOp::Xor => "^=",
                BinaryOp::Shl => "<<=",
                BinaryOp::Shr => ">>=",
                BinaryOp::AndNot => "&^=",
                _ => "=",
            },
        }
    }
}

/// One `name T = value` line of a `var` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub init: Option<Box<Statement>>,
    pub cond: Expr,
    pub then_block: Block,
    /// Either another `If` statement or a `Block`
    pub else_branch: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: Option<Box<Statement>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Statement>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `:=` rather than `=`
    pub define: bool,
    pub iterable: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub init: Option<Box<Statement>>,
    /// The tag; for a type switch this is the `x := y.(type)` guard
    pub tag: Option<Box<Statement>>,
    pub clauses: Vec<CaseClause>,
}

/// `case a, b:` or `default:` with its statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    /// Empty for `default`
    pub exprs: Vec<Expr>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A `select` clause; `comm` is `None` for `default`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommClause {
    pub comm: Option<Box<Statement>>,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Identifiers bound on the left-hand side of `:=`, `=` or `var`
    pub fn bound_names(&self) -> Vec<&str> {
        match &self.kind {
            StatementKind::Assign { lhs, op, .. }
                if matches!(op, AssignOp::Assign | AssignOp::Define) =>
            {
                lhs.iter().filter_map(Expr::as_ident).collect()
            }
            StatementKind::Var(specs) => specs
                .iter()
                .flat_map(|s| s.names.iter().map(|n| n.name.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Right-hand side expressions of an assignment or `var` declaration
    pub fn assigned_values(&self) -> Vec<&Expr> {
        match &self.kind {
            StatementKind::Assign { rhs, .. } => rhs.iter().collect(),
            StatementKind::Var(specs) => specs.iter().flat_map(|s| s.values.iter()).collect(),
            _ => Vec::new(),
        }
    }
}
