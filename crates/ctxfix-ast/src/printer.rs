//! Go text printer for AST nodes
//!
//! Renders nodes built by edits (inserted arguments, parameters and
//! statements) back to Go source. Output uses tab indentation the way
//! gofmt does, so an edited file needs little reformatting.

use crate::{
    Block, CallExpr, Element, Expr, ExprKind, IfStmt, Param, ParamList, Statement,
    StatementKind, TypeExpr, ValueSpec,
};

/// Trait for converting AST nodes to Go source text.
pub trait ToGo {
    /// Convert to Go source with the given indentation level.
    fn to_go(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (one tab per level).
fn indent_str(level: usize) -> String {
    "\t".repeat(level)
}

fn join<T: ToGo>(items: &[T], indent: usize, sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_go(indent))
        .collect::<Vec<_>>()
        .join(sep)
}

// ===== Expressions =====

impl ToGo for TypeExpr {
    fn to_go(&self, _indent: usize) -> String {
        self.text.clone()
    }
}

impl ToGo for Expr {
    fn to_go(&self, indent: usize) -> String {
        match &self.kind {
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Literal(lit) => lit.value.clone(),
            ExprKind::Composite { ty, elements } => {
                let ty = ty.as_ref().map(|t| t.to_go(indent)).unwrap_or_default();
                format!("{}{{{}}}", ty, join(elements, indent, ", "))
            }
            ExprKind::FuncLit { signature, body } => {
                format!("{} {}", signature.text, body.to_go(indent))
            }
            ExprKind::Paren(inner) => format!("({})", inner.to_go(indent)),
            ExprKind::Selector { object, field } => {
                format!("{}.{}", object.to_go(indent), field.name)
            }
            ExprKind::Index { object, indices } => {
                format!("{}[{}]", object.to_go(indent), join(indices, indent, ", "))
            }
            ExprKind::Slice {
                object,
                low,
                high,
                max,
            } => {
                let part = |e: &Option<Box<Expr>>| {
                    e.as_ref().map(|e| e.to_go(indent)).unwrap_or_default()
                };
                let mut out = format!("{}[{}:{}", object.to_go(indent), part(low), part(high));
                if max.is_some() {
                    out.push(':');
                    out.push_str(&part(max));
                }
                out.push(']');
                out
            }
            ExprKind::TypeAssert { object, ty } => {
                let ty = ty.as_ref().map(|t| t.text.as_str()).unwrap_or("type");
                format!("{}.({})", object.to_go(indent), ty)
            }
            ExprKind::Call(call) => call.to_go(indent),
            ExprKind::Unary { op, operand } => format!("{}{}", op.as_str(), operand.to_go(indent)),
            ExprKind::Binary { op, left, right } => format!(
                "{} {} {}",
                left.to_go(indent),
                op.as_str(),
                right.to_go(indent)
            ),
            ExprKind::Type(ty) => ty.text.clone(),
        }
    }
}

impl ToGo for CallExpr {
    fn to_go(&self, indent: usize) -> String {
        let ellipsis = if self.ellipsis { "..." } else { "" };
        format!(
            "{}({}{})",
            self.callee.to_go(indent),
            join(&self.args, indent, ", "),
            ellipsis
        )
    }
}

impl ToGo for Element {
    fn to_go(&self, indent: usize) -> String {
        match &self.key {
            Some(key) => format!("{}: {}", key.to_go(indent), self.value.to_go(indent)),
            None => self.value.to_go(indent),
        }
    }
}

// ===== Signatures =====

impl ToGo for Param {
    fn to_go(&self, _indent: usize) -> String {
        if self.names.is_empty() {
            return self.ty.text.clone();
        }
        let names = self
            .names
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}", names, self.ty.text)
    }
}

impl ToGo for ParamList {
    fn to_go(&self, indent: usize) -> String {
        format!("({})", join(&self.params, indent, ", "))
    }
}

// ===== Statements =====

impl ToGo for Block {
    fn to_go(&self, indent: usize) -> String {
        if self.statements.is_empty() {
            return "{}".to_string();
        }
        let mut out = String::from("{\n");
        for statement in &self.statements {
            out.push_str(&indent_str(indent + 1));
            out.push_str(&statement.to_go(indent + 1));
            out.push('\n');
        }
        out.push_str(&indent_str(indent));
        out.push('}');
        out
    }
}

impl ToGo for ValueSpec {
    fn to_go(&self, indent: usize) -> String {
        let mut out = self
            .names
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if let Some(ty) = &self.ty {
            out.push(' ');
            out.push_str(&ty.text);
        }
        if !self.values.is_empty() {
            out.push_str(" = ");
            out.push_str(&join(&self.values, indent, ", "));
        }
        out
    }
}

impl ToGo for Statement {
    fn to_go(&self, indent: usize) -> String {
        match &self.kind {
            StatementKind::Expr(e) => e.to_go(indent),
            StatementKind::Send { channel, value } => {
                format!("{} <- {}", channel.to_go(indent), value.to_go(indent))
            }
            StatementKind::IncDec { target, increment } => {
                format!("{}{}", target.to_go(indent), if *increment { "++" } else { "--" })
            }
            StatementKind::Assign { lhs, op, rhs } => format!(
                "{} {} {}",
                join(lhs, indent, ", "),
                op.as_str(),
                join(rhs, indent, ", ")
            ),
            StatementKind::Var(specs) if specs.len() == 1 => {
                format!("var {}", specs[0].to_go(indent))
            }
            StatementKind::Var(specs) => {
                let mut out = String::from("var (\n");
                for spec in specs {
                    out.push_str(&indent_str(indent + 1));
                    out.push_str(&spec.to_go(indent + 1));
                    out.push('\n');
                }
                out.push_str(&indent_str(indent));
                out.push(')');
                out
            }
            StatementKind::Return(results) if results.is_empty() => "return".to_string(),
            StatementKind::Return(results) => format!("return {}", join(results, indent, ", ")),
            StatementKind::If(if_stmt) => if_stmt.to_go(indent),
            StatementKind::For(for_stmt) => {
                let header = match (&for_stmt.init, &for_stmt.cond, &for_stmt.post) {
                    (None, None, None) => String::new(),
                    (None, Some(cond), None) => format!("{} ", cond.to_go(indent)),
                    (init, cond, post) => format!(
                        "{}; {}; {} ",
                        init.as_ref().map(|s| s.to_go(indent)).unwrap_or_default(),
                        cond.as_ref().map(|c| c.to_go(indent)).unwrap_or_default(),
                        post.as_ref().map(|s| s.to_go(indent)).unwrap_or_default()
                    ),
                };
                format!("for {}{}", header, for_stmt.body.to_go(indent))
            }
            StatementKind::Range(range) => {
                let vars = match (&range.key, &range.value) {
                    (Some(k), Some(v)) => format!("{}, {} ", k.to_go(indent), v.to_go(indent)),
                    (Some(k), None) => format!("{} ", k.to_go(indent)),
                    _ => String::new(),
                };
                let op = match (vars.is_empty(), range.define) {
                    (true, _) => "",
                    (false, true) => ":= ",
                    (false, false) => "= ",
                };
                format!(
                    "for {}{}range {} {}",
                    vars,
                    op,
                    range.iterable.to_go(indent),
                    range.body.to_go(indent)
                )
            }
            StatementKind::Switch(switch) => {
                let mut out = String::from("switch ");
                if let Some(init) = &switch.init {
                    out.push_str(&init.to_go(indent));
                    out.push_str("; ");
                }
                if let Some(tag) = &switch.tag {
                    out.push_str(&tag.to_go(indent));
                    out.push(' ');
                }
                out.push_str("{\n");
                for clause in &switch.clauses {
                    out.push_str(&indent_str(indent));
                    if clause.exprs.is_empty() {
                        out.push_str("default:\n");
                    } else {
                        out.push_str(&format!("case {}:\n", join(&clause.exprs, indent, ", ")));
                    }
                    for s in &clause.body {
                        out.push_str(&indent_str(indent + 1));
                        out.push_str(&s.to_go(indent + 1));
                        out.push('\n');
                    }
                }
                out.push_str(&indent_str(indent));
                out.push('}');
                out
            }
            StatementKind::Select(clauses) => {
                let mut out = String::from("select {\n");
                for clause in clauses {
                    out.push_str(&indent_str(indent));
                    match &clause.comm {
                        Some(comm) => out.push_str(&format!("case {}:\n", comm.to_go(indent))),
                        None => out.push_str("default:\n"),
                    }
                    for s in &clause.body {
                        out.push_str(&indent_str(indent + 1));
                        out.push_str(&s.to_go(indent + 1));
                        out.push('\n');
                    }
                }
                out.push_str(&indent_str(indent));
                out.push('}');
                out
            }
            StatementKind::Go(call) => format!("go {}", call.to_go(indent)),
            StatementKind::Defer(call) => format!("defer {}", call.to_go(indent)),
            StatementKind::Block(block) => block.to_go(indent),
            StatementKind::Labeled { label, statement } => {
                format!("{}:\n{}{}", label.name, indent_str(indent), statement.to_go(indent))
            }
            StatementKind::Branch { keyword, label } => match label {
                Some(label) => format!("{} {}", keyword, label.name),
                None => keyword.clone(),
            },
            // Opaque declarations carry no text of their own
            StatementKind::Decl(_) | StatementKind::Empty => String::new(),
        }
    }
}

impl ToGo for IfStmt {
    fn to_go(&self, indent: usize) -> String {
        let mut out = String::from("if ");
        if let Some(init) = &self.init {
            out.push_str(&init.to_go(indent));
            out.push_str("; ");
        }
        out.push_str(&self.cond.to_go(indent));
        out.push(' ');
        out.push_str(&self.then_block.to_go(indent));
        if let Some(else_branch) = &self.else_branch {
            out.push_str(" else ");
            out.push_str(&else_branch.to_go(indent));
        }
        out
    }
}
