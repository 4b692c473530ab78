//! ctxfix Parser - Recursive descent parser for Go
//!
//! Parses Go source into the tree defined in `ctxfix-ast`. The grammar
//! covers everything a function body can contain; types and top-level
//! `var`/`const`/`type` declarations are kept as source text.
//!
//! Parsing challenges:
//! - Semicolons are mostly implicit (inserted by the lexer)
//! - `{` after an identifier in an `if`/`for`/`switch` header opens the body,
//!   not a composite literal
//! - `a []int` vs `List[T]` in parameter lists

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use std::path::PathBuf;

use ctxfix_ast::{Expr, File, SourceFile, Statement};
use ctxfix_lexer::{tokenize, TokenKind};

/// Parse a source string into a File AST
pub fn parse(source: &str) -> Result<File, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_file()
}

/// Parse a file's text into an editable [`SourceFile`]
pub fn parse_source(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<SourceFile, ParseError> {
    let text = text.into();
    let file = parse(&text)?;
    Ok(SourceFile::new(path, text, file))
}

/// Parse a single expression such as `context.Background()`
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let expr = parser.parse_expr()?;
    expect_end(&mut parser)?;
    Ok(expr)
}

/// Parse a single statement such as `ctx := context.Background()`
pub fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let statement = parser.parse_statement()?;
    expect_end(&mut parser)?;
    Ok(statement)
}

fn expect_end(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    parser.skip_semicolons();
    if parser.is_at_end() {
        Ok(())
    } else {
        Err(parser.error_here(TokenKind::Eof.describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxfix_ast::{DeclarationKind, ExprKind, FuncDecl, StatementKind};

    fn functions(file: &File) -> Vec<&FuncDecl> {
        file.declarations
            .iter()
            .filter_map(|d| match &d.kind {
                DeclarationKind::Function(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    const SERVER: &str = r#"package server

import (
	"context"
	log "github.com/sirupsen/logrus"
	_ "embed"
)

type Server struct {
	name string
}

var defaultServer = &Server{name: "x"}

const (
	a = iota
	b
)

func (s *Server) Run(ctx context.Context, addrs ...string) (int, error) {
	for i, addr := range addrs {
		if err := s.dial(addr); err != nil {
			log.Error(err)
			continue
		}
		_ = i
	}
	switch v := interface{}(s).(type) {
	case *Server, nil:
		_ = v
	default:
	}
	select {
	case <-ctx.Done():
		return 0, ctx.Err()
	default:
	}
	go func() {
		defer s.close()
	}()
	m := map[string][]int{"a": {1, 2}}
	for k := 0; k < len(m); k++ {
	}
outer:
	for {
		break outer
	}
	return len(addrs[1:]), nil
}

func (s *Server) dial(string) error { return nil }

func (s *Server) close() {}
"#;

    #[test]
    fn test_parse_package_and_imports() {
        let file = parse(SERVER).expect("parse");
        assert_eq!(file.package.name, "server");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].path, "context");
        assert_eq!(file.imports[0].local_name(), Some("context"));
        assert_eq!(file.imports[1].local_name(), Some("log"));
        assert_eq!(file.imports[2].local_name(), None);
    }

    #[test]
    fn test_parse_declarations() {
        let file = parse(SERVER).expect("parse");
        assert_eq!(file.declarations.len(), 6);
        assert!(matches!(
            &file.declarations[0].kind,
            DeclarationKind::Other { keyword } if keyword == "type"
        ));

        let funcs = functions(&file);
        assert_eq!(funcs.len(), 3);
        assert_eq!(funcs[0].key_name(), "Server@Run");
        assert!(funcs[0].receiver.as_ref().is_some_and(|r| r.pointer));
        assert_eq!(funcs[0].params.names().collect::<Vec<_>>(), vec!["ctx", "addrs"]);
        assert!(funcs[0].params.params[1].is_variadic());
        assert_eq!(
            funcs[0].results.as_ref().map(|r| r.text.as_str()),
            Some("(int, error)")
        );
        assert!(funcs[1].params.is_unnamed());
        assert_eq!(funcs[2].key_name(), "Server@close");
    }

    #[test]
    fn test_parse_run_body_statements() {
        let file = parse(SERVER).expect("parse");
        let run = functions(&file)[0];
        let body = run.body.as_ref().expect("body");
        let kinds: Vec<&str> = body
            .statements
            .iter()
            .map(|s| match &s.kind {
                StatementKind::Range(_) => "range",
                StatementKind::Switch(_) => "switch",
                StatementKind::Select(_) => "select",
                StatementKind::Go(_) => "go",
                StatementKind::Assign { .. } => "assign",
                StatementKind::For(_) => "for",
                StatementKind::Labeled { .. } => "labeled",
                StatementKind::Return(_) => "return",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["range", "switch", "select", "go", "assign", "for", "labeled", "return"]
        );
    }

    #[test]
    fn test_parse_generics() {
        let source = r#"package list

type List[T any] struct{ items []T }

func (l *List[T]) Push(v T) { l.items = append(l.items, v) }

func Map[T, U any](xs []T, f func(T) U) []U {
	out := make([]U, 0, len(xs))
	for _, x := range xs {
		out = append(out, f(x))
	}
	return out
}
"#;
        let file = parse(source).expect("parse");
        let funcs = functions(&file);
        assert_eq!(funcs[0].key_name(), "List@Push");
        assert_eq!(
            funcs[1].type_params.as_ref().map(|t| t.text.as_str()),
            Some("[T, U any]")
        );
        assert_eq!(funcs[1].params.names().collect::<Vec<_>>(), vec!["xs", "f"]);
        assert_eq!(funcs[1].params.params[0].ty.text, "[]T");
    }

    #[test]
    fn test_generic_receiver_without_name() {
        let source = "package list\n\nfunc (List[T]) Len() int { return 0 }\n";
        let file = parse(source).expect("parse");
        let receiver = functions(&file)[0].receiver.clone().expect("receiver");
        assert!(receiver.name.is_none());
        assert_eq!(receiver.type_name, "List");
    }

    #[test]
    fn test_brace_in_if_header_opens_body() {
        let source = r#"package p

func f(x *T) bool {
	if x == nil {
		return false
	}
	if t := (T{}); t.ok {
		return true
	}
	return x.ok
}
"#;
        let file = parse(source).expect("parse");
        let body = functions(&file)[0].body.clone().expect("body");
        let StatementKind::If(first) = &body.statements[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(first.cond.kind, ExprKind::Binary { .. }));
        let StatementKind::If(second) = &body.statements[1].kind else {
            panic!("expected if");
        };
        assert!(second.init.is_some());
    }

    #[test]
    fn test_parse_error_reports_span() {
        let source = "package p\n\nfunc f( {\n}\n";
        let err = parse(source).unwrap_err();
        assert!(err.span().start >= source.find('(').unwrap_or(0));
    }

    #[test]
    fn test_missing_package_clause() {
        assert!(parse("func f() {}\n").is_err());
    }

    #[test]
    fn test_parse_expression() {
        let expr = parse_expression("context.WithCancel(nil)").expect("parse");
        let call = expr.as_call().expect("call");
        assert_eq!(call.qualified_callee(), Some(("context", "WithCancel")));
        assert_eq!(call.first_arg_ident(), Some("nil"));
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        assert!(parse_expression("a b").is_err());
    }

    #[test]
    fn test_parse_statement() {
        let statement = parse_statement("ctx := context.Background()").expect("parse");
        assert_eq!(statement.bound_names(), vec!["ctx"]);
    }

    // ===== Editing =====

    fn first_call_mut(file: &mut File) -> &mut ctxfix_ast::CallExpr {
        let DeclarationKind::Function(func) = &mut file.declarations[0].kind else {
            panic!("expected function");
        };
        let body = func.body.as_mut().expect("body");
        let StatementKind::Expr(expr) = &mut body.statements[0].kind else {
            panic!("expected expression statement");
        };
        expr.as_call_mut().expect("call")
    }

    fn first_func_mut(file: &mut File) -> &mut FuncDecl {
        let DeclarationKind::Function(func) = &mut file.declarations[0].kind else {
            panic!("expected function");
        };
        func
    }

    #[test]
    fn test_render_without_edits_is_identity() {
        let source = parse_source("a.go", SERVER).expect("parse");
        assert!(!source.is_modified());
        assert_eq!(source.render(), SERVER);
    }

    #[test]
    fn test_replace_first_argument() {
        let mut source =
            parse_source("a.go", "package p\n\nfunc f() {\n\tg(nil, 1)\n}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let call = first_call_mut(file);
        let ctx = parse_expression("ctx").expect("parse");
        assert!(editor.replace_argument(call, 0, ctx));
        assert_eq!(call.first_arg_ident(), Some("ctx"));
        assert_eq!(source.render(), "package p\n\nfunc f() {\n\tg(ctx, 1)\n}\n");
    }

    #[test]
    fn test_insert_argument() {
        let mut source =
            parse_source("a.go", "package p\n\nfunc f() {\n\th()\n\tk(1)\n}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let DeclarationKind::Function(func) = &mut file.declarations[0].kind else {
            panic!("expected function");
        };
        let body = func.body.as_mut().expect("body");
        for statement in &mut body.statements {
            let StatementKind::Expr(expr) = &mut statement.kind else {
                panic!("expected expression statement");
            };
            let call = expr.as_call_mut().expect("call");
            editor.insert_argument(call, parse_expression("ctx").expect("parse"));
        }
        assert_eq!(source.render(), "package p\n\nfunc f() {\n\th(ctx)\n\tk(ctx, 1)\n}\n");
    }

    #[test]
    fn test_insert_parameter_into_named_list() {
        let mut source = parse_source("a.go", "package p\n\nfunc f(a int) {}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let func = first_func_mut(file);
        editor.insert_parameter(
            &mut func.params,
            ctxfix_ast::Param::named("ctx", "context.Context", ctxfix_ast::Span::dummy()),
        );
        assert_eq!(func.params.first_name(), Some("ctx"));
        assert_eq!(source.render(), "package p\n\nfunc f(ctx context.Context, a int) {}\n");
    }

    #[test]
    fn test_insert_parameter_names_bare_types() {
        let mut source =
            parse_source("a.go", "package p\n\nfunc f(int, string) {}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let func = first_func_mut(file);
        editor.insert_parameter(
            &mut func.params,
            ctxfix_ast::Param::named("ctx", "context.Context", ctxfix_ast::Span::dummy()),
        );
        assert_eq!(
            source.render(),
            "package p\n\nfunc f(ctx context.Context, _ int, _ string) {}\n"
        );
        // Still valid Go
        assert!(parse(&source.render()).is_ok());
    }

    #[test]
    fn test_insert_statement() {
        let mut source =
            parse_source("a.go", "package main\n\nfunc main() {\n\tf()\n}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let func = first_func_mut(file);
        let body = func.body.as_mut().expect("body");
        editor.insert_statement(body, parse_statement("ctx := context.Background()").expect("parse"));
        assert_eq!(body.statements.len(), 2);
        assert_eq!(
            source.render(),
            "package main\n\nfunc main() {\n\tctx := context.Background()\n\tf()\n}\n"
        );
    }

    #[test]
    fn test_insert_statement_into_empty_block() {
        let mut source = parse_source("a.go", "package main\n\nfunc main() {}\n").expect("parse");
        let (file, mut editor) = source.edit();
        let func = first_func_mut(file);
        let body = func.body.as_mut().expect("body");
        editor.insert_statement(body, parse_statement("ctx := context.Background()").expect("parse"));
        assert_eq!(
            source.render(),
            "package main\n\nfunc main() {\n\tctx := context.Background()\n}\n"
        );
    }
}
