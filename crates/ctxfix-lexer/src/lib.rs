//! ctxfix Lexer - Go tokenization using logos
//!
//! Go terminates statements with semicolons that the programmer rarely
//! writes. The raw logos stream keeps line breaks and block comments so
//! that [`tokenize`] can insert those semicolons the way the Go scanner
//! does, after which layout tokens are dropped.

mod token;

pub use token::*;

use ctxfix_ast::Span;
use logos::Logos;

/// Tokenize a source string into a vector of tokens.
///
/// Newlines and block comments never reach the result; a line break
/// following a token that can end a statement becomes a zero-width
/// `Semicolon` at the break.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut last: Option<TokenKind> = None;

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };

        let breaks_line = match kind {
            TokenKind::Newline => true,
            TokenKind::BlockComment => lexer.slice().contains('\n'),
            _ => {
                tokens.push(Token { kind, span });
                last = Some(kind);
                continue;
            }
        };

        if breaks_line && last.is_some_and(|k| k.ends_statement()) {
            tokens.push(Token {
                kind: TokenKind::Semicolon,
                span: Span::point(span.start),
            });
            last = Some(TokenKind::Semicolon);
        }
    }

    let end = source.len();
    if last.is_some_and(|k| k.ends_statement()) {
        tokens.push(Token {
            kind: TokenKind::Semicolon,
            span: Span::point(end),
        });
    }

    // Add EOF token
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    /// A semicolon inserted at a line break rather than written
    pub fn is_implicit(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.span.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("ctx := context.Background()");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::ColonEq);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::Dot);
        assert_eq!(tokens[4].kind, TokenKind::Ident);
        assert_eq!(tokens[5].kind, TokenKind::LParen);
        assert_eq!(tokens[6].kind, TokenKind::RParen);
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        let tokens = tokenize("func go defer gopher");
        assert_eq!(tokens[0].kind, TokenKind::Func);
        assert_eq!(tokens[1].kind, TokenKind::Go);
        assert_eq!(tokens[2].kind, TokenKind::Defer);
        assert_eq!(tokens[3].kind, TokenKind::Ident);
    }

    #[test]
    fn test_semicolon_after_call() {
        assert_eq!(
            kinds("f()\ng()"),
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_open_brace_or_operator() {
        assert_eq!(
            kinds("func f() {\nx := a +\nb\n}"),
            vec![
                TokenKind::Func,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::ColonEq,
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize("x // trailing\n/* block */ y");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_multiline_block_comment_ends_statement() {
        let tokens = tokenize("return /* a\nb */ x");
        assert_eq!(tokens[0].kind, TokenKind::Return);
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_literals() {
        let source = "42 0x1F 3.14 .5 1e9 2i 'a' '\\n' \"s\\\"q\" `raw\nstring`";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Int);
        assert_eq!(tokens[2].kind, TokenKind::Float);
        assert_eq!(tokens[3].kind, TokenKind::Float);
        assert_eq!(tokens[4].kind, TokenKind::Float);
        assert_eq!(tokens[5].kind, TokenKind::Imag);
        assert_eq!(tokens[6].kind, TokenKind::Rune);
        assert_eq!(tokens[7].kind, TokenKind::Rune);
        assert_eq!(tokens[8].kind, TokenKind::String);
        assert_eq!(tokens[8].text(source), "\"s\\\"q\"");
        assert_eq!(tokens[9].kind, TokenKind::RawString);
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            kinds("a &^= b <- c ... d"),
            vec![
                TokenKind::Ident,
                TokenKind::AmpCaretEq,
                TokenKind::Ident,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Ellipsis,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = tokenize("größe := 1");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text("größe := 1"), "größe");
    }

    #[test]
    fn test_implicit_semicolon_is_zero_width() {
        let tokens = tokenize("x\n");
        assert!(tokens[1].is_implicit());
        assert_eq!(tokens[1].span, Span::point(1));
    }
}
