//! Source files that remember their edits
//!
//! A `SourceFile` owns the original text and its tree. Mutations go through an
//! [`Editor`], which updates the tree in place and records a text edit at an
//! offset it computes from node spans. Rendering splices the recorded edits into
//! the original text, so every byte outside an edit is preserved exactly.

use std::path::{Path, PathBuf};

use crate::{Block, CallExpr, Expr, File, Ident, Param, ParamList, Span, Statement, ToGo};

/// Replace `span` with `text`; an empty span is an insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    file: File,
    edits: Vec<TextEdit>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, file: File) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            file,
            edits: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original text, before any edit
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Package name from the `package` clause
    pub fn package(&self) -> &str {
        &self.file.package.name
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Borrow the tree for mutation together with an editor recording text edits
    pub fn edit(&mut self) -> (&mut File, Editor<'_>) {
        (
            &mut self.file,
            Editor {
                source: &self.text,
                edits: &mut self.edits,
            },
        )
    }

    /// Original text with every recorded edit applied
    pub fn render(&self) -> String {
        let mut edits: Vec<&TextEdit> = self.edits.iter().collect();
        // Stable: insertions at one offset keep the order they were made in
        edits.sort_by_key(|e| e.span.start);

        let mut out = String::with_capacity(self.text.len() + 64);
        let mut cursor = 0;
        for edit in edits {
            if edit.span.start < cursor {
                continue;
            }
            out.push_str(&self.text[cursor..edit.span.start]);
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

/// Mutating operations on a [`SourceFile`]'s tree
pub struct Editor<'a> {
    source: &'a str,
    edits: &'a mut Vec<TextEdit>,
}

impl<'a> Editor<'a> {
    fn record(&mut self, span: Span, text: String) {
        self.edits.push(TextEdit { span, text });
    }

    /// Replace argument `index` of `call` with `replacement`
    pub fn replace_argument(&mut self, call: &mut CallExpr, index: usize, replacement: Expr) -> bool {
        let Some(arg) = call.args.get_mut(index) else {
            return false;
        };
        let span = arg.span;
        self.record(span, replacement.to_go(0));
        *arg = Expr {
            span: Span::point(span.start),
            ..replacement
        };
        true
    }

    /// Insert `arg` as the new first argument of `call`
    pub fn insert_argument(&mut self, call: &mut CallExpr, arg: Expr) {
        let at = call.lparen.end;
        let text = if call.args.is_empty() {
            arg.to_go(0)
        } else {
            format!("{}, ", arg.to_go(0))
        };
        self.record(Span::point(at), text);
        call.args.insert(
            0,
            Expr {
                span: Span::point(at),
                ..arg
            },
        );
    }

    /// Insert `param` as the new first parameter, keeping existing order.
    ///
    /// Go rejects lists mixing named and unnamed parameters, so existing bare
    /// types are given the blank name `_`.
    pub fn insert_parameter(&mut self, params: &mut ParamList, param: Param) {
        let at = params.span.start + 1;
        let text = if params.params.is_empty() {
            param.to_go(0)
        } else {
            format!("{}, ", param.to_go(0))
        };
        self.record(Span::point(at), text);

        if params.is_unnamed() {
            for existing in &mut params.params {
                let ty_start = existing.ty.span.start;
                self.record(Span::point(ty_start), "_ ".to_string());
                existing.names = vec![Ident::new("_", Span::point(ty_start))];
            }
        }

        params.params.insert(
            0,
            Param {
                span: Span::point(at),
                ..param
            },
        );
    }

    /// Insert `statement` as the first statement of `block`
    pub fn insert_statement(&mut self, block: &mut Block, statement: Statement) {
        let at = block.inner_start();
        let base = self.line_indent(block.span.start);
        let level = base.chars().filter(|c| *c == '\t').count() + 1;
        let body = statement.to_go(level);

        let closes_on_same_line = !self
            .source
            .get(block.span.start..block.span.end)
            .unwrap_or("")
            .contains('\n');
        let text = if closes_on_same_line {
            format!("\n{}\t{}\n{}", base, body, base)
        } else {
            format!("\n{}\t{}", base, body)
        };
        self.record(Span::point(at), text);

        block.statements.insert(
            0,
            Statement {
                span: Span::point(at),
                ..statement
            },
        );
    }

    /// Leading whitespace of the line containing `offset`
    fn line_indent(&self, offset: usize) -> String {
        let line_start = self.source[..offset.min(self.source.len())]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        self.source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }
}
