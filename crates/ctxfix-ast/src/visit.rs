//! Traversal over every expression of a tree
//!
//! The source-level call graph and the key-function locator walk read-only;
//! the rewrite engine walks mutably. Both walkers are generated from the one
//! traversal below, so every statement shape reached by one is reached by the
//! other.

use crate::{Block, Expr, ExprKind, Statement, StatementKind};

macro_rules! walkers {
    ($walk_expr:ident, $walk_block:ident, $walk_statement:ident $(, $m:tt)?) => {
        /// Visit `expr` and every expression nested in it, pre-order.
        /// Bodies of function literals are included.
        pub fn $walk_expr(expr: &$($m)? Expr, f: &mut dyn FnMut(&$($m)? Expr)) {
            f(expr);
            match &$($m)? expr.kind {
                ExprKind::Ident(_) | ExprKind::Literal(_) | ExprKind::Type(_) => {}
                ExprKind::Composite { ty, elements } => {
                    if let Some(ty) = ty {
                        $walk_expr(ty, f);
                    }
                    for element in elements {
                        if let Some(key) = &$($m)? element.key {
                            $walk_expr(key, f);
                        }
                        $walk_expr(&$($m)? element.value, f);
                    }
                }
                ExprKind::FuncLit { body, .. } => $walk_block(body, f),
                ExprKind::Paren(inner) => $walk_expr(inner, f),
                ExprKind::Selector { object, .. } => $walk_expr(object, f),
                ExprKind::Index { object, indices } => {
                    $walk_expr(object, f);
                    for index in indices {
                        $walk_expr(index, f);
                    }
                }
                ExprKind::Slice {
                    object,
                    low,
                    high,
                    max,
                } => {
                    $walk_expr(object, f);
                    for part in [low, high, max].into_iter().flatten() {
                        $walk_expr(part, f);
                    }
                }
                ExprKind::TypeAssert { object, .. } => $walk_expr(object, f),
                ExprKind::Call(call) => {
                    $walk_expr(&$($m)? call.callee, f);
                    for arg in &$($m)? call.args {
                        $walk_expr(arg, f);
                    }
                }
                ExprKind::Unary { operand, .. } => $walk_expr(operand, f),
                ExprKind::Binary { left, right, .. } => {
                    $walk_expr(left, f);
                    $walk_expr(right, f);
                }
            }
        }

        /// Visit every expression inside a block
        pub fn $walk_block(block: &$($m)? Block, f: &mut dyn FnMut(&$($m)? Expr)) {
            for statement in &$($m)? block.statements {
                $walk_statement(statement, f);
            }
        }

        /// Visit every expression inside a statement, descending into nested blocks
        pub fn $walk_statement(statement: &$($m)? Statement, f: &mut dyn FnMut(&$($m)? Expr)) {
            match &$($m)? statement.kind {
                StatementKind::Expr(e) | StatementKind::Go(e) | StatementKind::Defer(e) => {
                    $walk_expr(e, f)
                }
                StatementKind::Send { channel, value } => {
                    $walk_expr(channel, f);
                    $walk_expr(value, f);
                }
                StatementKind::IncDec { target, .. } => $walk_expr(target, f),
                StatementKind::Assign { lhs, rhs, .. } => {
                    for e in lhs {
                        $walk_expr(e, f);
                    }
                    for e in rhs {
                        $walk_expr(e, f);
                    }
                }
                StatementKind::Var(specs) => {
                    for spec in specs {
                        for value in &$($m)? spec.values {
                            $walk_expr(value, f);
                        }
                    }
                }
                StatementKind::Return(results) => {
                    for e in results {
                        $walk_expr(e, f);
                    }
                }
                StatementKind::If(if_stmt) => {
                    if let Some(init) = &$($m)? if_stmt.init {
                        $walk_statement(init, f);
                    }
                    $walk_expr(&$($m)? if_stmt.cond, f);
                    $walk_block(&$($m)? if_stmt.then_block, f);
                    if let Some(else_branch) = &$($m)? if_stmt.else_branch {
                        $walk_statement(else_branch, f);
                    }
                }
                StatementKind::For(for_stmt) => {
                    if let Some(init) = &$($m)? for_stmt.init {
                        $walk_statement(init, f);
                    }
                    if let Some(cond) = &$($m)? for_stmt.cond {
                        $walk_expr(cond, f);
                    }
                    if let Some(post) = &$($m)? for_stmt.post {
                        $walk_statement(post, f);
                    }
                    $walk_block(&$($m)? for_stmt.body, f);
                }
                StatementKind::Range(range) => {
                    $walk_expr(&$($m)? range.iterable, f);
                    $walk_block(&$($m)? range.body, f);
                }
                StatementKind::Switch(switch) => {
                    if let Some(init) = &$($m)? switch.init {
                        $walk_statement(init, f);
                    }
                    if let Some(tag) = &$($m)? switch.tag {
                        $walk_statement(tag, f);
                    }
                    for clause in &$($m)? switch.clauses {
                        for e in &$($m)? clause.exprs {
                            $walk_expr(e, f);
                        }
                        for s in &$($m)? clause.body {
                            $walk_statement(s, f);
                        }
                    }
                }
                StatementKind::Select(clauses) => {
                    for clause in clauses {
                        if let Some(comm) = &$($m)? clause.comm {
                            $walk_statement(comm, f);
                        }
                        for s in &$($m)? clause.body {
                            $walk_statement(s, f);
                        }
                    }
                }
                StatementKind::Block(block) => $walk_block(block, f),
                StatementKind::Labeled { statement, .. } => $walk_statement(statement, f),
                StatementKind::Branch { .. } | StatementKind::Decl(_) | StatementKind::Empty => {}
            }
        }
    };
}

walkers!(walk_expr, walk_block, walk_statement);
walkers!(walk_expr_mut, walk_block_mut, walk_statement_mut, mut);
