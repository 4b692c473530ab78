//! Mutable traversal over every call in a function body
//!
//! Reaches calls in expression statements, return results, assignment and
//! `var` values (through composite literal fields, `&` and nesting), `if`
//! initializers, conditions and both branches, `go`/`defer` targets and the
//! bodies of function literals, loop headers and bodies, switch and select
//! clauses, labeled statements and nested blocks. Call arguments are visited
//! too, so `f(g(x))` reports both calls.

use ctxfix_ast::{walk_block_mut, Block, CallExpr, ExprKind};

/// Call `f` on every call expression in `block`, outer calls first
pub fn visit_calls_mut(block: &mut Block, f: &mut dyn FnMut(&mut CallExpr)) {
    walk_block_mut(block, &mut |expr| {
        if let ExprKind::Call(call) = &mut expr.kind {
            f(call);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxfix_ast::{walk_block, DeclarationKind};

    fn callee_names(source: &str) -> Vec<String> {
        let mut file = ctxfix_parser::parse(source).expect("parse");
        let mut names = Vec::new();
        for decl in &mut file.declarations {
            if let DeclarationKind::Function(func) = &mut decl.kind {
                if let Some(body) = &mut func.body {
                    visit_calls_mut(body, &mut |call| {
                        if let Some(name) = call.callee_name() {
                            names.push(name.to_string());
                        }
                    });
                }
            }
        }
        names
    }

    #[test]
    fn test_reaches_every_statement_shape() {
        let names = callee_names(
            r#"package p

func f() {
	a()
	return b()
	x := &T{Field: Inner{V: c()}}
	var y = d()
	if err := e(); g() {
		h()
	} else if i() {
		j()
	} else {
		k()
	}
	go func() {
		l()
	}()
	defer m()
	for n := o(); n < 1; n++ {
		p()
	}
	for range q() {
		r()
	}
	switch s() {
	case 1:
		t()
	}
	select {
	case <-u():
		v()
	default:
		w()
	}
	{
		x()
	}
}
"#,
        );
        let expected = [
            "a", "b", "c", "d", "e", "g", "h", "i", "j", "k", "l", "m", "o", "p", "q", "r", "s",
            "t", "u", "v", "w", "x",
        ];
        for name in expected {
            assert!(names.iter().any(|n| n == name), "missing call to {}", name);
        }
    }

    #[test]
    fn test_matches_read_only_walk() {
        let source = r#"package p

func f() {
	if err := a(b()); err != nil {
		c(func() { d() })
	}
	switch v := e().(type) {
	case T:
		g(v[h()], x[i():j()])
	}
	select {
	case ch <- k():
		l(&S{F: m()}, -n(), o() + p())
	}
outer:
	for q := range r() {
		s(q)
		break outer
	}
}
"#;
        let mut file = ctxfix_parser::parse(source).expect("parse");
        let mut read_only = Vec::new();
        for decl in &file.declarations {
            if let DeclarationKind::Function(func) = &decl.kind {
                if let Some(body) = &func.body {
                    walk_block(body, &mut |expr| {
                        if let Some(call) = expr.as_call() {
                            read_only.push(call.callee_name().unwrap_or("").to_string());
                        }
                    });
                }
            }
        }

        let mut mutable = Vec::new();
        for decl in &mut file.declarations {
            if let DeclarationKind::Function(func) = &mut decl.kind {
                if let Some(body) = &mut func.body {
                    visit_calls_mut(body, &mut |call| {
                        mutable.push(call.callee_name().unwrap_or("").to_string());
                    });
                }
            }
        }

        assert_eq!(read_only.len(), 17);
        assert_eq!(read_only, mutable);
    }

    #[test]
    fn test_outer_call_before_arguments() {
        let names = callee_names("package p\n\nfunc f() {\n\touter(inner())\n}\n");
        assert_eq!(names, vec!["outer", "inner"]);
    }
}
