//! Recursive descent parser implementation

use ctxfix_ast::*;
use ctxfix_lexer::{Token, TokenKind};

use crate::ParseError;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// End offset of the last token consumed, ignoring implicit semicolons
    last_end: usize,
    /// Set while parsing `if`/`for`/`switch` headers, where `{` opens the body
    no_composite: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = source.len();
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            source,
            tokens,
            pos: 0,
            last_end: 0,
            no_composite: false,
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        if !token.is_implicit() && token.kind != TokenKind::Eof {
            self.last_end = token.span.end;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, self.peek(), self.span())
    }

    /// An error at the current token
    pub fn error_here(&self, expected: &str) -> ParseError {
        self.unexpected(expected)
    }

    pub fn is_at_end(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    pub fn skip_semicolons(&mut self) {
        while self.at(TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Span from `start` to the end of the last consumed token
    fn finish(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.consume(TokenKind::Ident)?;
        Ok(Ident::new(self.text(&token), token.span))
    }

    /// A statement terminator; may be omitted before a closing `)` or `}`
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RParen
            | TokenKind::RBrace
            | TokenKind::Case
            | TokenKind::Default
            | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("';' or newline")),
        }
    }

    fn with_composites<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.no_composite;
        self.no_composite = !allowed;
        let result = f(self);
        self.no_composite = saved;
        result
    }

    /// Skip a bracketed group starting at the current opening delimiter
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: self.span() }),
                _ => {}
            }
            self.advance();
            if depth == 0 {
                return Ok(());
            }
        }
    }

    // === File ===

    pub fn parse_file(&mut self) -> Result<File, ParseError> {
        self.consume(TokenKind::Package)?;
        let package = self.ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        while self.at(TokenKind::Import) {
            imports.extend(self.parse_import_decl()?);
            self.expect_semi()?;
        }

        let mut declarations = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            declarations.push(self.parse_declaration()?);
            self.expect_semi()?;
        }

        Ok(File {
            package,
            imports,
            declarations,
            span: Span::new(0, self.source.len()),
        })
    }

    fn parse_import_decl(&mut self) -> Result<Vec<ImportSpec>, ParseError> {
        self.consume(TokenKind::Import)?;
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.parse_import_spec()?]);
        }

        self.advance();
        let mut specs = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            specs.push(self.parse_import_spec()?);
            self.expect_semi()?;
        }
        self.consume(TokenKind::RParen)?;
        Ok(specs)
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let start = self.span().start;
        let name = match self.peek() {
            TokenKind::Ident => Some(self.ident()?),
            TokenKind::Dot => {
                let token = self.advance();
                Some(Ident::new(".", token.span))
            }
            _ => None,
        };
        let path = match self.peek() {
            TokenKind::String | TokenKind::RawString => {
                let token = self.advance();
                let text = self.text(&token);
                text[1..text.len() - 1].to_string()
            }
            _ => return Err(self.unexpected("import path")),
        };
        Ok(ImportSpec {
            name,
            path,
            span: self.finish(start),
        })
    }

    // === Declarations ===

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let start = self.span().start;
        let kind = match self.peek() {
            TokenKind::Func => DeclarationKind::Function(self.parse_func_decl()?),
            TokenKind::Var | TokenKind::Const | TokenKind::Type | TokenKind::Import => {
                let keyword = self.text(self.current()).to_string();
                self.skip_declaration()?;
                DeclarationKind::Other { keyword }
            }
            _ => return Err(ParseError::ExpectedDeclaration { span: self.span() }),
        };
        Ok(Declaration {
            kind,
            span: self.finish(start),
        })
    }

    /// Skip a `var`/`const`/`type` declaration up to its terminating semicolon
    fn skip_declaration(&mut self) -> Result<(), ParseError> {
        self.advance();
        while !self.at_any(&[TokenKind::Semicolon, TokenKind::Eof]) {
            match self.peek() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    self.skip_balanced()?;
                }
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => break,
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let start = self.span().start;
        self.consume(TokenKind::Func)?;

        let receiver = if self.at(TokenKind::LParen) {
            let list = self.parse_param_list()?;
            let Some(param) = list.params.first() else {
                return Err(ParseError::unexpected("receiver", TokenKind::RParen, list.span));
            };
            Some(Receiver {
                name: param.names.first().cloned(),
                type_name: param.ty.base_name().to_string(),
                pointer: param.ty.is_pointer(),
                span: list.span,
            })
        } else {
            None
        };

        let name = self.ident()?;

        let type_params = if self.at(TokenKind::LBracket) {
            let tp_start = self.span().start;
            self.skip_balanced()?;
            let span = self.finish(tp_start);
            Some(TypeExpr::new(span.text(self.source), span))
        } else {
            None
        };

        let params = self.parse_param_list()?;
        let results = self.parse_results()?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            name,
            receiver,
            type_params,
            params,
            results,
            body,
            span: self.finish(start),
        })
    }

    fn parse_results(&mut self) -> Result<Option<TypeExpr>, ParseError> {
        if self.at(TokenKind::LParen) {
            let start = self.span().start;
            self.skip_balanced()?;
            let span = self.finish(start);
            return Ok(Some(TypeExpr::new(span.text(self.source), span)));
        }
        if self.at_type_start() {
            return Ok(Some(self.parse_type()?));
        }
        Ok(None)
    }

    /// Parse `( ... )`, resolving grouped names the way Go does: if any entry
    /// carries both a name and a type, every entry is named.
    fn parse_param_list(&mut self) -> Result<ParamList, ParseError> {
        let start = self.consume(TokenKind::LParen)?.span.start;

        let mut entries = Vec::new();
        while !self.at(TokenKind::RParen) {
            entries.push(self.parse_param_entry()?);
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;
        let span = self.finish(start);

        let named = entries.iter().any(|e| e.name.is_some() && e.ty.is_some());
        let mut params = Vec::new();

        if named {
            let mut pending: Vec<Ident> = Vec::new();
            for entry in entries {
                match (entry.name, entry.ty) {
                    (Some(name), None) => pending.push(name),
                    (Some(name), Some(ty)) => {
                        let group_start = pending.first().map(|n| n.span.start).unwrap_or(name.span.start);
                        pending.push(name);
                        params.push(Param {
                            names: std::mem::take(&mut pending),
                            span: Span::new(group_start, ty.span.end),
                            ty,
                        });
                    }
                    (None, Some(ty)) => return Err(ParseError::MixedParameters { span: ty.span }),
                    (None, None) => {}
                }
            }
            if let Some(dangling) = pending.first() {
                return Err(ParseError::MixedParameters { span: dangling.span });
            }
        } else {
            for entry in entries {
                let ty = match (entry.name, entry.ty) {
                    (_, Some(ty)) => ty,
                    (Some(name), None) => TypeExpr::new(name.name, name.span),
                    (None, None) => continue,
                };
                params.push(Param {
                    names: Vec::new(),
                    span: ty.span,
                    ty,
                });
            }
        }

        Ok(ParamList { params, span })
    }

    fn parse_param_entry(&mut self) -> Result<ParamEntry, ParseError> {
        if !self.at(TokenKind::Ident) {
            return Ok(ParamEntry {
                name: None,
                ty: Some(self.parse_type()?),
            });
        }

        match self.peek_ahead(1) {
            // Name alone, or a bare type name; resolved by the caller
            TokenKind::Comma | TokenKind::RParen => Ok(ParamEntry {
                name: Some(self.ident()?),
                ty: None,
            }),
            // Qualified type: `io.Reader`
            TokenKind::Dot => Ok(ParamEntry {
                name: None,
                ty: Some(self.parse_type()?),
            }),
            // `a []int` or the instantiated type `List[T]`
            TokenKind::LBracket => {
                let saved = (self.pos, self.last_end);
                self.advance();
                self.skip_balanced()?;
                let generic = self.at_any(&[TokenKind::Comma, TokenKind::RParen]);
                (self.pos, self.last_end) = saved;

                if generic {
                    Ok(ParamEntry {
                        name: None,
                        ty: Some(self.parse_type()?),
                    })
                } else {
                    let name = self.ident()?;
                    Ok(ParamEntry {
                        name: Some(name),
                        ty: Some(self.parse_type()?),
                    })
                }
            }
            _ => {
                let name = self.ident()?;
                Ok(ParamEntry {
                    name: Some(name),
                    ty: Some(self.parse_type()?),
                })
            }
        }
    }

    // === Types ===

    fn at_type_start(&self) -> bool {
        match self.peek() {
            TokenKind::Ident
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::LParen => true,
            TokenKind::Arrow => self.peek_ahead(1) == TokenKind::Chan,
            _ => false,
        }
    }

    /// Parse a type, keeping the text it was written with
    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.span().start;
        self.skip_type()?;
        let span = self.finish(start);
        Ok(TypeExpr::new(span.text(self.source), span))
    }

    fn skip_type(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Ident => {
                self.advance();
                if self.at(TokenKind::Dot) && self.peek_ahead(1) == TokenKind::Ident {
                    self.advance();
                    self.advance();
                }
                if self.at(TokenKind::LBracket) {
                    self.skip_balanced()?;
                }
                Ok(())
            }
            TokenKind::Star | TokenKind::Ellipsis | TokenKind::Tilde => {
                self.advance();
                self.skip_type()
            }
            TokenKind::LBracket => {
                self.skip_balanced()?;
                self.skip_type()
            }
            TokenKind::Map => {
                self.advance();
                if !self.at(TokenKind::LBracket) {
                    return Err(self.unexpected("'['"));
                }
                self.skip_balanced()?;
                self.skip_type()
            }
            TokenKind::Chan => {
                self.advance();
                if self.at(TokenKind::Arrow) {
                    self.advance();
                }
                self.skip_type()
            }
            TokenKind::Arrow => {
                self.advance();
                self.consume(TokenKind::Chan)?;
                self.skip_type()
            }
            TokenKind::Func => {
                self.advance();
                if !self.at(TokenKind::LParen) {
                    return Err(self.unexpected("'('"));
                }
                self.skip_balanced()?;
                if self.at(TokenKind::LParen) {
                    self.skip_balanced()?;
                } else if self.at_type_start() {
                    self.skip_type()?;
                }
                Ok(())
            }
            TokenKind::Struct | TokenKind::Interface => {
                self.advance();
                if !self.at(TokenKind::LBrace) {
                    return Err(self.unexpected("'{'"));
                }
                self.skip_balanced()
            }
            TokenKind::LParen => self.skip_balanced(),
            _ => Err(ParseError::InvalidType { span: self.span() }),
        }
    }

    // === Statements ===

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.consume(TokenKind::LBrace)?.span.start;
        let statements = self.with_composites(true, |p| p.parse_statement_list())?;
        self.consume(TokenKind::RBrace)?;
        Ok(Block {
            statements,
            span: self.finish(start),
        })
    }

    fn parse_statement_list(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        while !self.at_any(&[
            TokenKind::RBrace,
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::Eof,
        ]) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            statements.push(self.parse_statement()?);
            self.expect_semi()?;
        }
        Ok(statements)
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.span().start;

        let kind = match self.peek() {
            TokenKind::Var => StatementKind::Var(self.parse_var_decl()?),
            TokenKind::Const | TokenKind::Type => {
                self.skip_declaration()?;
                StatementKind::Decl(self.finish(start))
            }
            TokenKind::Return => {
                self.advance();
                if self.at_any(&[TokenKind::Semicolon, TokenKind::RBrace]) {
                    StatementKind::Return(Vec::new())
                } else {
                    StatementKind::Return(self.parse_expr_list()?)
                }
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::For => return self.parse_for(),
            TokenKind::Switch => return self.parse_switch(),
            TokenKind::Select => return self.parse_select(),
            TokenKind::Go => {
                self.advance();
                StatementKind::Go(self.parse_expr()?)
            }
            TokenKind::Defer => {
                self.advance();
                StatementKind::Defer(self.parse_expr()?)
            }
            TokenKind::LBrace => StatementKind::Block(self.parse_block()?),
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto => {
                let token = self.advance();
                let keyword = self.text(&token).to_string();
                let label = if self.at(TokenKind::Ident) {
                    Some(self.ident()?)
                } else {
                    None
                };
                StatementKind::Branch { keyword, label }
            }
            TokenKind::Fallthrough => {
                self.advance();
                StatementKind::Branch {
                    keyword: "fallthrough".to_string(),
                    label: None,
                }
            }
            TokenKind::Semicolon => StatementKind::Empty,
            TokenKind::Ident if self.peek_ahead(1) == TokenKind::Colon => {
                let label = self.ident()?;
                self.consume(TokenKind::Colon)?;
                let statement = if self.at(TokenKind::RBrace) {
                    Statement::new(StatementKind::Empty, Span::point(self.last_end))
                } else {
                    self.parse_statement()?
                };
                StatementKind::Labeled {
                    label,
                    statement: Box::new(statement),
                }
            }
            _ => return self.parse_simple_statement(),
        };

        Ok(Statement::new(kind, self.finish(start)))
    }

    fn parse_simple_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.span().start;
        let lhs = self.parse_expr_list()?;
        self.finish_simple_statement(start, lhs)
    }

    /// Complete a simple statement whose leading expression list is parsed
    fn finish_simple_statement(
        &mut self,
        start: usize,
        lhs: Vec<Expr>,
    ) -> Result<Statement, ParseError> {
        let op = match self.peek() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::ColonEq => Some(AssignOp::Define),
            other => compound_op(other).map(AssignOp::Compound),
        };

        let kind = if let Some(op) = op {
            self.advance();
            let rhs = self.parse_expr_list()?;
            StatementKind::Assign { lhs, op, rhs }
        } else {
            let span = self.span();
            let mut lhs = lhs.into_iter();
            let (Some(first), None) = (lhs.next(), lhs.next()) else {
                return Err(ParseError::unexpected("':=' or '='", self.peek(), span));
            };
            match self.peek() {
                TokenKind::Arrow => {
                    self.advance();
                    StatementKind::Send {
                        channel: first,
                        value: self.parse_expr()?,
                    }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let token = self.advance();
                    StatementKind::IncDec {
                        target: first,
                        increment: token.kind == TokenKind::PlusPlus,
                    }
                }
                _ => StatementKind::Expr(first),
            }
        };

        Ok(Statement::new(kind, self.finish(start)))
    }

    fn parse_var_decl(&mut self) -> Result<Vec<ValueSpec>, ParseError> {
        self.consume(TokenKind::Var)?;
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.parse_value_spec()?]);
        }

        self.advance();
        let mut specs = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            specs.push(self.parse_value_spec()?);
            self.expect_semi()?;
        }
        self.consume(TokenKind::RParen)?;
        Ok(specs)
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec, ParseError> {
        let start = self.span().start;
        let mut names = vec![self.ident()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            names.push(self.ident()?);
        }

        let ty = if !self.at_any(&[
            TokenKind::Eq,
            TokenKind::Semicolon,
            TokenKind::RParen,
            TokenKind::RBrace,
        ]) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let values = if self.at(TokenKind::Eq) {
            self.advance();
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        Ok(ValueSpec {
            names,
            ty,
            values,
            span: self.finish(start),
        })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.consume(TokenKind::If)?.span.start;

        let (init, cond) = self.with_composites(false, |p| {
            let first = if p.at(TokenKind::Semicolon) {
                None
            } else {
                Some(p.parse_simple_statement()?)
            };
            if p.at(TokenKind::Semicolon) {
                p.advance();
                Ok((first.map(Box::new), p.parse_expr()?))
            } else {
                match first {
                    Some(Statement {
                        kind: StatementKind::Expr(cond),
                        ..
                    }) => Ok((None, cond)),
                    _ => Err(ParseError::InvalidExpression { span: p.span() }),
                }
            }
        })?;

        let then_block = self.parse_block()?;
        let else_branch = if self.at(TokenKind::Else) {
            self.advance();
            match self.peek() {
                TokenKind::If => Some(Box::new(self.parse_if()?)),
                TokenKind::LBrace => {
                    let block = self.parse_block()?;
                    let span = block.span;
                    Some(Box::new(Statement::new(StatementKind::Block(block), span)))
                }
                _ => return Err(self.unexpected("'if' or '{'")),
            }
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If(IfStmt {
                init,
                cond,
                then_block,
                else_branch,
            }),
            self.finish(start),
        ))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.consume(TokenKind::For)?.span.start;

        // `for range ch {`
        if self.at(TokenKind::Range) {
            self.advance();
            let iterable = self.with_composites(false, |p| p.parse_expr())?;
            let body = self.parse_block()?;
            return Ok(Statement::new(
                StatementKind::Range(RangeStmt {
                    key: None,
                    value: None,
                    define: false,
                    iterable,
                    body,
                }),
                self.finish(start),
            ));
        }

        let mut init = None;
        let mut cond = None;
        let mut post = None;

        if !self.at(TokenKind::LBrace) {
            let saved = self.no_composite;
            self.no_composite = true;
            let header = self.parse_for_header(&mut init, &mut cond, &mut post);
            self.no_composite = saved;

            if let Some(range) = header? {
                let body = self.parse_block()?;
                return Ok(Statement::new(
                    StatementKind::Range(RangeStmt { body, ..range }),
                    self.finish(start),
                ));
            }
        }

        let body = self.parse_block()?;
        Ok(Statement::new(
            StatementKind::For(ForStmt {
                init,
                cond,
                post,
                body,
            }),
            self.finish(start),
        ))
    }

    /// Parse everything between `for` and the body. A range clause is
    /// returned with an empty body for the caller to fill in.
    fn parse_for_header(
        &mut self,
        init: &mut Option<Box<Statement>>,
        cond: &mut Option<Expr>,
        post: &mut Option<Box<Statement>>,
    ) -> Result<Option<RangeStmt>, ParseError> {
        if !self.at(TokenKind::Semicolon) {
            let start = self.span().start;
            let lhs = self.parse_expr_list()?;

            if self.at_any(&[TokenKind::ColonEq, TokenKind::Eq])
                && self.peek_ahead(1) == TokenKind::Range
            {
                let define = self.advance().kind == TokenKind::ColonEq;
                self.advance();
                let iterable = self.parse_expr()?;
                let mut vars = lhs.into_iter();
                return Ok(Some(RangeStmt {
                    key: vars.next(),
                    value: vars.next(),
                    define,
                    iterable,
                    body: Block {
                        statements: Vec::new(),
                        span: Span::dummy(),
                    },
                }));
            }

            let first = self.finish_simple_statement(start, lhs)?;
            if self.at(TokenKind::LBrace) {
                match first.kind {
                    StatementKind::Expr(e) => *cond = Some(e),
                    _ => return Err(ParseError::InvalidExpression { span: first.span }),
                }
                return Ok(None);
            }
            *init = Some(Box::new(first));
        }

        self.consume(TokenKind::Semicolon)?;
        if !self.at(TokenKind::Semicolon) {
            *cond = Some(self.parse_expr()?);
        }
        self.consume(TokenKind::Semicolon)?;
        if !self.at(TokenKind::LBrace) {
            *post = Some(Box::new(self.parse_simple_statement()?));
        }
        Ok(None)
    }

    fn parse_switch(&mut self) -> Result<Statement, ParseError> {
        let start = self.consume(TokenKind::Switch)?.span.start;

        let (init, tag) = self.with_composites(false, |p| {
            if p.at(TokenKind::LBrace) {
                return Ok((None, None));
            }
            let first = if p.at(TokenKind::Semicolon) {
                None
            } else {
                Some(p.parse_simple_statement()?)
            };
            if p.at(TokenKind::Semicolon) {
                p.advance();
                let tag = if p.at(TokenKind::LBrace) {
                    None
                } else {
                    Some(Box::new(p.parse_simple_statement()?))
                };
                Ok((first.map(Box::new), tag))
            } else {
                Ok((None, first.map(Box::new)))
            }
        })?;

        self.consume(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            let clause_start = self.span().start;
            let exprs = match self.peek() {
                TokenKind::Case => {
                    self.advance();
                    self.parse_expr_list()?
                }
                TokenKind::Default => {
                    self.advance();
                    Vec::new()
                }
                _ => return Err(self.unexpected("'case' or 'default'")),
            };
            self.consume(TokenKind::Colon)?;
            let body = self.parse_statement_list()?;
            clauses.push(CaseClause {
                exprs,
                body,
                span: self.finish(clause_start),
            });
        }
        self.consume(TokenKind::RBrace)?;

        Ok(Statement::new(
            StatementKind::Switch(SwitchStmt { init, tag, clauses }),
            self.finish(start),
        ))
    }

    fn parse_select(&mut self) -> Result<Statement, ParseError> {
        let start = self.consume(TokenKind::Select)?.span.start;
        self.consume(TokenKind::LBrace)?;

        let mut clauses = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            let clause_start = self.span().start;
            let comm = match self.peek() {
                TokenKind::Case => {
                    self.advance();
                    Some(Box::new(self.parse_simple_statement()?))
                }
                TokenKind::Default => {
                    self.advance();
                    None
                }
                _ => return Err(self.unexpected("'case' or 'default'")),
            };
            self.consume(TokenKind::Colon)?;
            let body = self.parse_statement_list()?;
            clauses.push(CommClause {
                comm,
                body,
                span: self.finish(clause_start),
            });
        }
        self.consume(TokenKind::RBrace)?;

        Ok(Statement::new(StatementKind::Select(clauses), self.finish(start)))
    }

    // === Expressions ===

    pub fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    /// Precedence climbing over Go's five binary levels
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.span().start;
        let mut left = self.parse_unary()?;

        while let Some(op) = binary_op(self.peek()) {
            if op.precedence() < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.finish(start),
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.span().start;

        // `<-chan T` is a type, not a receive
        if self.at(TokenKind::Arrow) && self.peek_ahead(1) == TokenKind::Chan {
            let ty = self.parse_type()?;
            return self.parse_postfix(Expr::new(ExprKind::Type(ty), self.finish(start)), start);
        }

        let op = match self.peek() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Caret => UnaryOp::Xor,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Amp => UnaryOp::Addr,
            TokenKind::Arrow => UnaryOp::Recv,
            TokenKind::Tilde => UnaryOp::Tilde,
            _ => {
                let operand = self.parse_operand()?;
                return self.parse_postfix(operand, start);
            }
        };

        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.finish(start),
        ))
    }

    fn parse_postfix(&mut self, mut expr: Expr, start: usize) -> Result<Expr, ParseError> {
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    if self.at(TokenKind::LParen) {
                        self.advance();
                        let ty = if self.at(TokenKind::Type) {
                            self.advance();
                            None
                        } else {
                            Some(self.parse_type()?)
                        };
                        self.consume(TokenKind::RParen)?;
                        expr = Expr::new(
                            ExprKind::TypeAssert {
                                object: Box::new(expr),
                                ty,
                            },
                            self.finish(start),
                        );
                    } else {
                        let field = self.ident()?;
                        expr = Expr::new(
                            ExprKind::Selector {
                                object: Box::new(expr),
                                field,
                            },
                            self.finish(start),
                        );
                    }
                }
                TokenKind::LParen => {
                    let call = self.with_composites(true, |p| p.parse_call(expr))?;
                    expr = Expr::new(ExprKind::Call(call), self.finish(start));
                }
                TokenKind::LBracket => {
                    expr = self.with_composites(true, |p| p.parse_index(expr, start))?;
                }
                TokenKind::LBrace if self.composite_allowed(&expr) => {
                    let elements = self.with_composites(true, |p| p.parse_composite_body())?;
                    expr = Expr::new(
                        ExprKind::Composite {
                            ty: Some(Box::new(expr)),
                            elements,
                        },
                        self.finish(start),
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Whether `{` after `expr` opens a composite literal
    fn composite_allowed(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Type(_) => true,
            ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::Index { .. } => {
                !self.no_composite
            }
            _ => false,
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<CallExpr, ParseError> {
        let lparen = self.consume(TokenKind::LParen)?.span;
        let mut args = Vec::new();
        let mut ellipsis = false;

        while !self.at(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if self.at(TokenKind::Ellipsis) {
                self.advance();
                ellipsis = true;
            }
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let rparen = self.consume(TokenKind::RParen)?.span;

        Ok(CallExpr {
            callee: Box::new(callee),
            args,
            lparen,
            rparen,
            ellipsis,
        })
    }

    fn parse_index(&mut self, object: Expr, start: usize) -> Result<Expr, ParseError> {
        self.consume(TokenKind::LBracket)?;

        let low = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        if !self.at(TokenKind::Colon) {
            let mut indices: Vec<Expr> = low.into_iter().map(|e| *e).collect();
            while self.at(TokenKind::Comma) {
                self.advance();
                if self.at(TokenKind::RBracket) {
                    break;
                }
                indices.push(self.parse_expr()?);
            }
            self.consume(TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::Index {
                    object: Box::new(object),
                    indices,
                },
                self.finish(start),
            ));
        }

        self.advance();
        let high = if self.at_any(&[TokenKind::Colon, TokenKind::RBracket]) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let max = if self.at(TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.consume(TokenKind::RBracket)?;

        Ok(Expr::new(
            ExprKind::Slice {
                object: Box::new(object),
                low,
                high,
                max,
            },
            self.finish(start),
        ))
    }

    fn parse_composite_body(&mut self) -> Result<Vec<Element>, ParseError> {
        self.consume(TokenKind::LBrace)?;
        let mut elements = Vec::new();

        while !self.at(TokenKind::RBrace) {
            let start = self.span().start;
            let mut key = None;
            let mut value = self.parse_element_value()?;
            if self.at(TokenKind::Colon) {
                self.advance();
                key = Some(value);
                value = self.parse_element_value()?;
            }
            elements.push(Element {
                key,
                value,
                span: self.finish(start),
            });
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.consume(TokenKind::RBrace)?;
        Ok(elements)
    }

    /// An element value, which may be a literal with its type elided
    fn parse_element_value(&mut self) -> Result<Expr, ParseError> {
        if !self.at(TokenKind::LBrace) {
            return self.parse_expr();
        }
        let start = self.span().start;
        let elements = self.parse_composite_body()?;
        Ok(Expr::new(
            ExprKind::Composite { ty: None, elements },
            self.finish(start),
        ))
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let start = self.span().start;

        match self.peek() {
            TokenKind::Ident => {
                let token = self.advance();
                Ok(Expr::ident(self.text(&token), token.span))
            }
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Imag
            | TokenKind::Rune
            | TokenKind::String
            | TokenKind::RawString => {
                let token = self.advance();
                let kind = match token.kind {
                    TokenKind::Int => LiteralKind::Int,
                    TokenKind::Float => LiteralKind::Float,
                    TokenKind::Imag => LiteralKind::Imag,
                    TokenKind::Rune => LiteralKind::Rune,
                    _ => LiteralKind::String,
                };
                Ok(Expr::new(
                    ExprKind::Literal(Literal {
                        kind,
                        value: self.text(&token).to_string(),
                    }),
                    token.span,
                ))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_composites(true, |p| p.parse_expr())?;
                self.consume(TokenKind::RParen)?;
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), self.finish(start)))
            }
            TokenKind::Func => {
                let signature = self.parse_type()?;
                if self.at(TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    Ok(Expr::new(
                        ExprKind::FuncLit { signature, body },
                        self.finish(start),
                    ))
                } else {
                    Ok(Expr::new(ExprKind::Type(signature), self.finish(start)))
                }
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => {
                let ty = self.parse_type()?;
                Ok(Expr::new(ExprKind::Type(ty), self.finish(start)))
            }
            TokenKind::Error => Err(ParseError::InvalidToken { span: self.span() }),
            TokenKind::Eof => Err(ParseError::UnexpectedEof { span: self.span() }),
            _ => Err(ParseError::InvalidExpression { span: self.span() }),
        }
    }
}

/// One comma-separated entry of a parameter list before grouping
struct ParamEntry {
    name: Option<Ident>,
    ty: Option<TypeExpr>,
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OrOr => BinaryOp::LogOr,
        TokenKind::AndAnd => BinaryOp::LogAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Pipe => BinaryOp::Or,
        TokenKind::Caret => BinaryOp::Xor,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Amp => BinaryOp::And,
        TokenKind::AmpCaret => BinaryOp::AndNot,
        _ => return None,
    })
}

fn compound_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::MinusEq => BinaryOp::Sub,
        TokenKind::StarEq => BinaryOp::Mul,
        TokenKind::SlashEq => BinaryOp::Div,
        TokenKind::PercentEq => BinaryOp::Rem,
        TokenKind::AmpEq => BinaryOp::And,
        TokenKind::PipeEq => BinaryOp::Or,
        TokenKind::CaretEq => BinaryOp::Xor,
        TokenKind::ShlEq => BinaryOp::Shl,
        TokenKind::ShrEq => BinaryOp::Shr,
        TokenKind::AmpCaretEq => BinaryOp::AndNot,
        _ => return None,
    })
}
