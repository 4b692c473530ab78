//! Expression AST nodes

use serde::{Deserialize, Serialize};
use crate::{Block, Span};

/// An identifier with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Go exports identifiers that start with an upper-case letter
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_uppercase())
    }
}

/// A type kept as the exact text it was written with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub text: String,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// The named type behind pointers and instantiation: `*Server[T]` -> `Server`
    pub fn base_name(&self) -> &str {
        let text = self.text.trim_start_matches(['(', '*', ' ']);
        let end = text
            .find(|c: char| c == '[' || c == ')' || c.is_whitespace())
            .unwrap_or(text.len());
        &text[..end]
    }

    pub fn is_pointer(&self) -> bool {
        self.text.trim_start_matches('(').starts_with('*')
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Identifier: `x`, `nil`, `ctx`
    Ident(String),

    /// Basic literal: `42`, `"hello"`, `'a'`
    Literal(Literal),

    /// Composite literal: `Config{Name: "x"}`, `[]int{1, 2}`, or an elided `{1, 2}`
    Composite {
        ty: Option<Box<Expr>>,
        elements: Vec<Element>,
    },

    /// Function literal: `func(x int) error { ... }`
    FuncLit {
        signature: TypeExpr,
        body: Block,
    },

    /// Parenthesized expression: `(x)`
    Paren(Box<Expr>),

    /// Selector: `pkg.Func`, `s.field`
    Selector {
        object: Box<Expr>,
        field: Ident,
    },

    /// Index or generic instantiation: `m[k]`, `Map[K, V]`
    Index {
        object: Box<Expr>,
        indices: Vec<Expr>,
    },

    /// Slice expression: `s[lo:hi:max]`
    Slice {
        object: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },

    /// Type assertion `x.(T)`; `ty` is `None` for the `x.(type)` switch guard
    TypeAssert {
        object: Box<Expr>,
        ty: Option<TypeExpr>,
    },

    /// Function call: `foo(a, b...)`
    Call(CallExpr),

    /// Unary operation: `!x`, `&v`, `<-ch`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation: `a + b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// A type in value position: `map[string]int` in `make(map[string]int)`
    Type(TypeExpr),
}

/// A call expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    /// Location of `(`
    pub lparen: Span,
    /// Location of `)`
    pub rparen: Span,
    /// Trailing `...` on the last argument
    pub ellipsis: bool,
}

impl CallExpr {
    /// `(qualifier, name)` when the callee has the shape `qualifier.name`
    pub fn qualified_callee(&self) -> Option<(&str, &str)> {
        match &self.callee.kind {
            ExprKind::Selector { object, field } => {
                object.as_ident().map(|q| (q, field.name.as_str()))
            }
            _ => None,
        }
    }

    /// The last selector segment or the bare identifier being called
    pub fn callee_name(&self) -> Option<&str> {
        match &self.callee.kind {
            ExprKind::Ident(name) => Some(name),
            ExprKind::Selector { field, .. } => Some(&field.name),
            ExprKind::Index { object, .. } => match &object.kind {
                ExprKind::Ident(name) => Some(name),
                ExprKind::Selector { field, .. } => Some(&field.name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Name of the first argument when it is a plain identifier
    pub fn first_arg_ident(&self) -> Option<&str> {
        self.args.first().and_then(Expr::as_ident)
    }
}

/// An element of a composite literal, optionally keyed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    /// The literal exactly as written, quotes included
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Xor,
    Deref,
    Addr,
    Recv,
    Tilde,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
            UnaryOp::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence, 5 binds tightest
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::LogOr => "||",
            BinaryOp::LogAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ExprKind::Ident(name.into()),
            span,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident() == Some(name)
    }

    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_call_mut(&mut self) -> Option<&mut CallExpr> {
        match &mut self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    /// Whether the identifier `name` occurs anywhere inside this expression
    pub fn mentions(&self, name: &str) -> bool {
        let mut found = false;
        crate::walk_expr(self, &mut |e| {
            if e.is_ident(name) {
                found = true;
            }
        });
        found
    }
}
