//! Chain rewriting
//!
//! Each function of a chain gets one [`LinkEdit`], applied from the key
//! function outward:
//!
//! - `Key`: the sentinel's placeholder argument becomes the token, and the
//!   token is added as the first parameter.
//! - `Transit`: every call to the next function of the chain gets the token as
//!   its first argument, and the token is added as the first parameter.
//! - `Source`: the same call-site edit (or the placeholder replacement when the
//!   chain is just the key function), then the token is created locally at an
//!   entry point, or provided according to [`SourceFallback`] elsewhere.
//!
//! Every edit first checks whether it was already made, so rewriting fixed
//! source changes nothing.

use ctxfix_ast::{
    AssignOp, Block, CallExpr, DeclarationKind, Editor, Expr, ExprKind, File, FuncDecl,
    ImportSpec, Param, SourceFile, Span, Statement, StatementKind,
};
use ctxfix_graph::{Chain, EntryPoints, FunctionDescriptor};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::locate::is_sentinel_call;
use crate::visit::visit_calls_mut;
use crate::{FixError, FixerConfig, Result, SourceFallback, Workspace};

/// The edit made to one function of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LinkEdit {
    Key,
    Transit {
        callee: FunctionDescriptor,
    },
    /// `callee` is `None` when the outermost function is the key function
    Source {
        callee: Option<FunctionDescriptor>,
        entry: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    Edited { edits: usize },
    AlreadyFixed,
    /// No call matching the link was found; nothing was changed
    PatternNotFound,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub function: FunctionDescriptor,
    pub edit: LinkEdit,
    pub outcome: LinkOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    Fixed,
    AlreadyFixed,
    Skipped,
    Errored,
}

impl ChainStatus {
    /// Errored beats skipped, skipped beats fixed, fixed beats already fixed
    fn from_links(links: &[LinkReport]) -> Self {
        let has = |pred: fn(&LinkOutcome) -> bool| links.iter().any(|l| pred(&l.outcome));
        if has(|o| matches!(o, LinkOutcome::Failed { .. })) {
            ChainStatus::Errored
        } else if has(|o| matches!(o, LinkOutcome::PatternNotFound)) {
            ChainStatus::Skipped
        } else if has(|o| matches!(o, LinkOutcome::Edited { .. })) {
            ChainStatus::Fixed
        } else {
            ChainStatus::AlreadyFixed
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub chain: Chain,
    pub status: ChainStatus,
    pub links: Vec<LinkReport>,
}

/// Links of `chain` in application order, key function first
pub fn plan(chain: &Chain, entry_points: &EntryPoints) -> Vec<(FunctionDescriptor, LinkEdit)> {
    let functions = chain.functions();
    let last = functions.len().saturating_sub(1);
    functions
        .iter()
        .enumerate()
        .rev()
        .map(|(i, function)| {
            let edit = if i == 0 {
                LinkEdit::Source {
                    callee: functions.get(1).cloned(),
                    entry: entry_points.matches(function),
                }
            } else if i == last {
                LinkEdit::Key
            } else {
                LinkEdit::Transit {
                    callee: functions[i + 1].clone(),
                }
            };
            (function.clone(), edit)
        })
        .collect()
}

pub struct Rewriter<'a> {
    config: &'a FixerConfig,
    init: Expr,
}

impl<'a> Rewriter<'a> {
    pub fn new(config: &'a FixerConfig) -> Result<Self> {
        let init = ctxfix_parser::parse_expression(&config.token.init).map_err(|e| {
            FixError::Config(format!("token init `{}`: {}", config.token.init, e))
        })?;
        Ok(Self { config, init })
    }

    /// Rewrite every function of `chain` inside `workspace`.
    ///
    /// Every function is resolved before anything is edited; a chain naming a
    /// function that cannot be found or parsed is left untouched.
    pub fn fix_chain(&self, workspace: &mut Workspace, chain: &Chain) -> ChainReport {
        let steps = plan(chain, &self.config.entry_points);

        for (function, edit) in &steps {
            if let Err(e) = self.resolve(workspace, function) {
                warn!("skipping chain {}: {}", chain, e);
                return ChainReport {
                    chain: chain.clone(),
                    status: ChainStatus::Errored,
                    links: vec![LinkReport {
                        function: function.clone(),
                        edit: edit.clone(),
                        outcome: LinkOutcome::Failed {
                            error: e.to_string(),
                        },
                    }],
                };
            }
        }

        let links: Vec<LinkReport> = steps
            .into_iter()
            .map(|(function, edit)| {
                let outcome = match self.apply_in(workspace, &function, &edit) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("{}: {}", function, e);
                        LinkOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                if outcome == LinkOutcome::PatternNotFound {
                    warn!("{}: no call matching {:?}", function, edit);
                }
                LinkReport {
                    function,
                    edit,
                    outcome,
                }
            })
            .collect();

        let status = ChainStatus::from_links(&links);
        info!("chain {}: {:?}", chain, status);
        ChainReport {
            chain: chain.clone(),
            status,
            links,
        }
    }

    fn resolve(&self, workspace: &mut Workspace, function: &FunctionDescriptor) -> Result<()> {
        let path = workspace.path_of(function)?;
        let source = workspace.source(&path)?;
        if find_function(source.file(), &function.name).is_none() {
            return Err(FixError::GraphInconsistency {
                function: function.qualified_name(),
                path,
            });
        }
        Ok(())
    }

    fn apply_in(
        &self,
        workspace: &mut Workspace,
        function: &FunctionDescriptor,
        edit: &LinkEdit,
    ) -> Result<LinkOutcome> {
        let path = workspace.path_of(function)?;
        let mut source = workspace.source(&path)?;
        let outcome = self.apply(&mut source, function, edit)?;
        if source.is_modified() {
            workspace.update(&path, source.render());
        }
        Ok(outcome)
    }

    /// Apply one link edit to a parsed file
    pub fn apply(
        &self,
        source: &mut SourceFile,
        function: &FunctionDescriptor,
        edit: &LinkEdit,
    ) -> Result<LinkOutcome> {
        let package = source.package().to_string();
        let imports = source.file().imports.clone();
        let path = source.path().to_path_buf();

        let (file, mut editor) = source.edit();
        let func = find_function_mut(file, &function.name).ok_or_else(|| {
            FixError::GraphInconsistency {
                function: function.qualified_name(),
                path,
            }
        })?;

        let mut edits = 0;
        let callee = match edit {
            LinkEdit::Key | LinkEdit::Source { callee: None, .. } => None,
            LinkEdit::Transit { callee } | LinkEdit::Source { callee: Some(callee), .. } => {
                Some(callee)
            }
        };
        let found = match callee {
            None => self.replace_placeholders(func, &mut editor, &mut edits),
            Some(callee) => {
                let target = CallTarget {
                    callee,
                    package: &package,
                    imports: &imports,
                };
                self.forward_token(func, &target, &mut editor, &mut edits)
            }
        };
        if !found {
            return Ok(LinkOutcome::PatternNotFound);
        }

        let local = match edit {
            LinkEdit::Source { entry: true, .. } => true,
            LinkEdit::Source { entry: false, .. } => {
                self.config.source_fallback == SourceFallback::Local
            }
            _ => false,
        };
        edits += if local {
            self.ensure_local(func, &mut editor)
        } else {
            self.ensure_parameter(func, &mut editor)
        };

        debug!("{}: {} edits", function, edits);
        Ok(if edits > 0 {
            LinkOutcome::Edited { edits }
        } else {
            LinkOutcome::AlreadyFixed
        })
    }

    fn token_expr(&self) -> Expr {
        Expr::ident(&self.config.token.name, Span::dummy())
    }

    /// Returns whether any sentinel call carries the placeholder or the token
    fn replace_placeholders(
        &self,
        func: &mut FuncDecl,
        editor: &mut Editor<'_>,
        edits: &mut usize,
    ) -> bool {
        let Some(body) = func.body.as_mut() else {
            return false;
        };
        let token = self.token_expr();
        let mut found = false;
        visit_calls_mut(body, &mut |call| {
            if !is_sentinel_call(call, &self.config.sentinel) {
                return;
            }
            match call.first_arg_ident() {
                Some(arg) if arg == self.config.placeholder => {
                    if editor.replace_argument(call, 0, token.clone()) {
                        debug!("replaced placeholder at offset {}", call.lparen.end);
                        *edits += 1;
                    }
                    found = true;
                }
                Some(arg) if arg == self.config.token.name => found = true,
                _ => {}
            }
        });
        found
    }

    /// Pass the token as first argument of every call to the target.
    /// Returns whether any such call exists.
    fn forward_token(
        &self,
        func: &mut FuncDecl,
        target: &CallTarget<'_>,
        editor: &mut Editor<'_>,
        edits: &mut usize,
    ) -> bool {
        let Some(body) = func.body.as_mut() else {
            return false;
        };
        let token = self.token_expr();
        let mut found = false;
        visit_calls_mut(body, &mut |call| {
            if !target.matches(call) {
                return;
            }
            found = true;
            match call.first_arg_ident() {
                Some(arg) if arg == self.config.token.name => {}
                Some(arg) if arg == self.config.placeholder => {
                    if editor.replace_argument(call, 0, token.clone()) {
                        *edits += 1;
                    }
                }
                _ => {
                    editor.insert_argument(call, token.clone());
                    *edits += 1;
                }
            }
            debug!("forwarded token into {}", target.callee);
        });
        found
    }

    fn ensure_parameter(&self, func: &mut FuncDecl, editor: &mut Editor<'_>) -> usize {
        let token = &self.config.token;
        if func.has_param(&token.name) {
            return 0;
        }
        // A local of the same name would be redeclared
        if func.body.as_ref().is_some_and(|body| binds_token(body, &token.name)) {
            return 0;
        }
        editor.insert_parameter(
            &mut func.params,
            Param::named(&token.name, &token.ty, Span::dummy()),
        );
        1
    }

    fn ensure_local(&self, func: &mut FuncDecl, editor: &mut Editor<'_>) -> usize {
        let name = &self.config.token.name;
        if func.has_param(name) {
            return 0;
        }
        let Some(body) = func.body.as_mut() else {
            return 0;
        };
        if binds_token(body, name) {
            return 0;
        }
        let statement = Statement::new(
            StatementKind::Assign {
                lhs: vec![self.token_expr()],
                op: AssignOp::Define,
                rhs: vec![self.init.clone()],
            },
            Span::dummy(),
        );
        editor.insert_statement(body, statement);
        1
    }
}

/// Identifies calls to one function from inside a given file
struct CallTarget<'a> {
    callee: &'a FunctionDescriptor,
    /// Package of the calling file
    package: &'a str,
    imports: &'a [ImportSpec],
}

impl CallTarget<'_> {
    /// `pkg.Func(...)` across packages, `x.Method(...)` for methods, `Func(...)`
    /// within the callee's package
    fn matches(&self, call: &CallExpr) -> bool {
        let callee = match &call.callee.unparen().kind {
            ExprKind::Index { object, .. } => object.unparen(),
            _ => call.callee.unparen(),
        };
        match &callee.kind {
            ExprKind::Ident(name) => {
                !self.callee.is_method()
                    && self.package == self.callee.package
                    && *name == self.callee.name
            }
            ExprKind::Selector { object, field } => {
                if field.name != self.callee.method_name() {
                    return false;
                }
                let package = object
                    .unparen()
                    .as_ident()
                    .and_then(|q| self.imported_package(q));
                match package {
                    Some(refers_to_callee) => !self.callee.is_method() && refers_to_callee,
                    None => self.callee.is_method(),
                }
            }
            _ => false,
        }
    }

    /// For an identifier naming an import, whether that import is the
    /// callee's package
    fn imported_package(&self, qualifier: &str) -> Option<bool> {
        let import = self
            .imports
            .iter()
            .find(|spec| spec.local_name() == Some(qualifier))?;
        Some(qualifier == self.callee.package || last_segment(&import.path) == self.callee.package)
    }
}

/// Package directory of an import path, skipping a major version suffix
fn last_segment(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

/// A top-level statement binds `name` from values that do not use it
fn binds_token(body: &Block, name: &str) -> bool {
    body.statements.iter().any(|statement| {
        statement.bound_names().contains(&name)
            && !statement
                .assigned_values()
                .iter()
                .any(|value| value.mentions(name))
    })
}

fn find_function<'f>(file: &'f File, key_name: &str) -> Option<&'f FuncDecl> {
    file.declarations.iter().find_map(|decl| match &decl.kind {
        DeclarationKind::Function(func) if func.key_name() == key_name => Some(func),
        _ => None,
    })
}

fn find_function_mut<'f>(file: &'f mut File, key_name: &str) -> Option<&'f mut FuncDecl> {
    file.declarations.iter_mut().find_map(|decl| match &mut decl.kind {
        DeclarationKind::Function(func) if func.key_name() == key_name => Some(func),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(package: &str, name: &str) -> FunctionDescriptor {
        FunctionDescriptor::new("x.go", package, name)
    }

    fn apply(source: &str, function: &str, edit: LinkEdit) -> (String, LinkOutcome) {
        apply_with(&FixerConfig::default(), source, function, edit)
    }

    fn apply_with(
        config: &FixerConfig,
        source: &str,
        function: &str,
        edit: LinkEdit,
    ) -> (String, LinkOutcome) {
        let rewriter = Rewriter::new(config).expect("rewriter");
        let mut parsed = ctxfix_parser::parse_source("x.go", source).expect("parse");
        let package = parsed.package().to_string();
        let outcome = rewriter
            .apply(&mut parsed, &descriptor(&package, function), &edit)
            .expect("apply");
        (parsed.render(), outcome)
    }

    const KEY: &str = "package p\n\nfunc K(x int) {\n\tc, cancel := context.WithCancel(nil)\n\t_ = c\n\tcancel()\n}\n";

    #[test]
    fn test_key_replaces_placeholder_and_adds_parameter() {
        let (text, outcome) = apply(KEY, "K", LinkEdit::Key);
        assert_eq!(outcome, LinkOutcome::Edited { edits: 2 });
        assert!(text.contains("func K(ctx context.Context, x int) {"));
        assert!(text.contains("context.WithCancel(ctx)"));
        assert!(!text.contains("WithCancel(nil)"));
    }

    #[test]
    fn test_key_is_idempotent() {
        let (once, _) = apply(KEY, "K", LinkEdit::Key);
        let (twice, outcome) = apply(&once, "K", LinkEdit::Key);
        assert_eq!(outcome, LinkOutcome::AlreadyFixed);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parameter_order_is_token_first() {
        let source = "package p\n\nfunc B(x, y int) {\n\tK(x)\n}\n";
        let (text, _) = apply(
            source,
            "B",
            LinkEdit::Transit {
                callee: descriptor("p", "K"),
            },
        );
        assert!(text.contains("func B(ctx context.Context, x, y int) {"));
        assert!(text.contains("\tK(ctx, x)\n"));
    }

    #[test]
    fn test_transit_keeps_signature_when_local_binds_token() {
        let source = "package p\n\nfunc B() {\n\tctx := context.Background()\n\tK(ctx)\n\tJ()\n}\n";
        let (text, outcome) = apply(
            source,
            "B",
            LinkEdit::Transit {
                callee: descriptor("p", "J"),
            },
        );
        assert_eq!(outcome, LinkOutcome::Edited { edits: 1 });
        assert!(text.contains("func B() {\n\tctx := context.Background()\n"));
        assert!(text.contains("\tJ(ctx)\n"));
    }

    #[test]
    fn test_key_keeps_signature_when_local_binds_token() {
        let source = "package p\n\nfunc K() {\n\tvar ctx = context.TODO()\n\t_, cancel := context.WithCancel(nil)\n\tcancel()\n}\n";
        let (text, outcome) = apply(source, "K", LinkEdit::Key);
        assert_eq!(outcome, LinkOutcome::Edited { edits: 1 });
        assert!(text.contains("func K() {\n"));
        assert!(text.contains("context.WithCancel(ctx)"));

        let source = "package p\n\nfunc K() {\n\tctx, cancel := context.WithCancel(nil)\n\t_ = ctx\n\tcancel()\n}\n";
        let (text, _) = apply(source, "K", LinkEdit::Key);
        assert!(text.contains("func K(ctx context.Context) {"));
        assert!(text.contains("ctx, cancel := context.WithCancel(ctx)"));
    }

    #[test]
    fn test_transit_replaces_placeholder_argument() {
        let source = "package p\n\nfunc B() {\n\tK(nil, 1)\n}\n";
        let (text, outcome) = apply(
            source,
            "B",
            LinkEdit::Transit {
                callee: descriptor("p", "K"),
            },
        );
        assert_eq!(outcome, LinkOutcome::Edited { edits: 2 });
        assert!(text.contains("K(ctx, 1)"));
    }

    #[test]
    fn test_transit_cross_package_and_method_calls() {
        let source = r#"package main

import (
	srv "example.com/app/server"
)

func run(s *srv.Server) {
	srv.Start()
	s.Serve()
	other.Start()
}
"#;
        let (text, _) = apply(
            source,
            "run",
            LinkEdit::Transit {
                callee: descriptor("server", "Start"),
            },
        );
        assert!(text.contains("srv.Start(ctx)"));
        assert!(text.contains("other.Start()"));
        assert!(text.contains("s.Serve()"));

        let (text, _) = apply(
            source,
            "run",
            LinkEdit::Transit {
                callee: descriptor("server", "Server@Serve"),
            },
        );
        assert!(text.contains("s.Serve(ctx)"));
        assert!(text.contains("srv.Start()"));
    }

    #[test]
    fn test_transit_pattern_not_found_changes_nothing() {
        let source = "package p\n\nfunc B() {\n\tother()\n}\n";
        let (text, outcome) = apply(
            source,
            "B",
            LinkEdit::Transit {
                callee: descriptor("p", "K"),
            },
        );
        assert_eq!(outcome, LinkOutcome::PatternNotFound);
        assert_eq!(text, source);
    }

    #[test]
    fn test_transit_reaches_nested_shapes() {
        let source = r#"package p

func B() error {
	defer K()
	go func() {
		K()
	}()
	s := &S{Done: K()}
	for i := range xs {
		if err := K(); err != nil {
			return K()
		}
	}
	return nil
}
"#;
        let (text, outcome) = apply(
            source,
            "B",
            LinkEdit::Transit {
                callee: descriptor("p", "K"),
            },
        );
        assert_eq!(outcome, LinkOutcome::Edited { edits: 6 });
        assert_eq!(text.matches("K(ctx)").count(), 5);
        assert!(!text.contains("K()"));
    }

    #[test]
    fn test_entry_source_synthesizes_local_once() {
        let source = "package main\n\nfunc main() {\n\tB()\n}\n";
        let edit = LinkEdit::Source {
            callee: Some(descriptor("main", "B")),
            entry: true,
        };
        let (once, outcome) = apply(source, "main", edit.clone());
        assert_eq!(outcome, LinkOutcome::Edited { edits: 2 });
        assert_eq!(
            once,
            "package main\n\nfunc main() {\n\tctx := context.Background()\n\tB(ctx)\n}\n"
        );

        let (twice, outcome) = apply(&once, "main", edit);
        assert_eq!(outcome, LinkOutcome::AlreadyFixed);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_local_binding_that_uses_token_does_not_count() {
        let source = "package main\n\nfunc main() {\n\tctx, cancel := context.WithCancel(ctx)\n\tdefer cancel()\n\tB()\n}\n";
        let (text, _) = apply(
            source,
            "main",
            LinkEdit::Source {
                callee: Some(descriptor("main", "B")),
                entry: true,
            },
        );
        assert!(text.starts_with("package main\n\nfunc main() {\n\tctx := context.Background()\n"));
    }

    #[test]
    fn test_non_entry_source_follows_fallback() {
        let source = "package p\n\nfunc Handler() {\n\tB()\n}\n";
        let edit = LinkEdit::Source {
            callee: Some(descriptor("p", "B")),
            entry: false,
        };

        let (text, _) = apply(source, "Handler", edit.clone());
        assert!(text.contains("func Handler(ctx context.Context) {"));

        let config = FixerConfig {
            source_fallback: SourceFallback::Local,
            ..FixerConfig::default()
        };
        let (text, _) = apply_with(&config, source, "Handler", edit);
        assert!(text.contains("func Handler() {\n\tctx := context.Background()\n\tB(ctx)\n}"));
    }

    #[test]
    fn test_key_that_is_its_own_entry_point() {
        let source = "package main\n\nfunc main() {\n\t_, cancel := context.WithCancel(nil)\n\tcancel()\n}\n";
        let (text, _) = apply(
            source,
            "main",
            LinkEdit::Source {
                callee: None,
                entry: true,
            },
        );
        assert!(text.contains("func main() {\n\tctx := context.Background()\n"));
        assert!(text.contains("context.WithCancel(ctx)"));
    }

    #[test]
    fn test_method_declaration_is_found_by_key_name() {
        let source = "package p\n\nfunc (s *Server) Run() {\n\tcontext.WithCancel(nil)\n}\n";
        let (text, outcome) = apply(source, "Server@Run", LinkEdit::Key);
        assert_eq!(outcome, LinkOutcome::Edited { edits: 2 });
        assert!(text.contains("func (s *Server) Run(ctx context.Context) {"));
    }

    #[test]
    fn test_missing_function_is_graph_inconsistency() {
        let config = FixerConfig::default();
        let rewriter = Rewriter::new(&config).expect("rewriter");
        let mut parsed = ctxfix_parser::parse_source("x.go", "package p\n").expect("parse");
        let result = rewriter.apply(&mut parsed, &descriptor("p", "Gone"), &LinkEdit::Key);
        assert!(matches!(result, Err(FixError::GraphInconsistency { .. })));
    }

    #[test]
    fn test_plan_orders_key_first() {
        let chain = Chain::new(vec![
            descriptor("main", "main"),
            descriptor("p", "B"),
            descriptor("p", "K"),
        ]);
        let steps = plan(&chain, &EntryPoints::default());
        assert_eq!(steps[0], (descriptor("p", "K"), LinkEdit::Key));
        assert_eq!(
            steps[1],
            (
                descriptor("p", "B"),
                LinkEdit::Transit {
                    callee: descriptor("p", "K")
                }
            )
        );
        assert_eq!(
            steps[2],
            (
                descriptor("main", "main"),
                LinkEdit::Source {
                    callee: Some(descriptor("p", "B")),
                    entry: true
                }
            )
        );

        let single = plan(&Chain::new(vec![descriptor("p", "K")]), &EntryPoints::default());
        assert_eq!(
            single,
            vec![(
                descriptor("p", "K"),
                LinkEdit::Source {
                    callee: None,
                    entry: false
                }
            )]
        );
    }

    #[test]
    fn test_chain_status_priority() {
        let link = |outcome| LinkReport {
            function: descriptor("p", "F"),
            edit: LinkEdit::Key,
            outcome,
        };
        assert_eq!(
            ChainStatus::from_links(&[link(LinkOutcome::Edited { edits: 1 }), link(LinkOutcome::AlreadyFixed)]),
            ChainStatus::Fixed
        );
        assert_eq!(
            ChainStatus::from_links(&[link(LinkOutcome::Edited { edits: 1 }), link(LinkOutcome::PatternNotFound)]),
            ChainStatus::Skipped
        );
        assert_eq!(
            ChainStatus::from_links(&[
                link(LinkOutcome::PatternNotFound),
                link(LinkOutcome::Failed { error: "x".into() })
            ]),
            ChainStatus::Errored
        );
        assert_eq!(
            ChainStatus::from_links(&[link(LinkOutcome::AlreadyFixed)]),
            ChainStatus::AlreadyFixed
        );
    }
}
