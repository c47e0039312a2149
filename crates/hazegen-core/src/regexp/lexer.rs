//! Lexer for reservation regexp strings.
//!
//! Produces span-based tokens; text is sliced from the source only when
//! needed. Consecutive unrecognized characters coalesce into a single
//! `Error` token so malformed input yields one diagnostic, not one per byte.

use logos::Logos;
use std::ops::Range;

/// Token kinds of the regexp grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comma,
    Pipe,
    Plus,
    Star,
    LParen,
    RParen,
    Name,
    Number,
    Error,
}

/// Zero-copy token: kind + byte span into the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: (usize, usize),
}

impl Token {
    pub fn range(&self) -> Range<usize> {
        self.span.0..self.span.1
    }
}

/// Internal Logos token enum, converted to [`TokenKind`] after lexing.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum LexToken {
    #[token(",")]
    Comma,

    #[token("|")]
    Pipe,

    #[token("+")]
    Plus,

    #[token("*")]
    Star,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r"[0-9]+")]
    Number,

    /// Unit and reservation names. The character class matches what unit
    /// declarations accept, including `.` and `-` common in CPU unit names.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.$-]*")]
    Name,
}

impl LexToken {
    fn to_kind(self) -> TokenKind {
        match self {
            LexToken::Comma => TokenKind::Comma,
            LexToken::Pipe => TokenKind::Pipe,
            LexToken::Plus => TokenKind::Plus,
            LexToken::Star => TokenKind::Star,
            LexToken::LParen => TokenKind::LParen,
            LexToken::RParen => TokenKind::RParen,
            LexToken::Number => TokenKind::Number,
            LexToken::Name => TokenKind::Name,
        }
    }
}

/// Tokenize a regexp source string.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = LexToken::lexer(source);
    // Accumulated error run; the end tracks the last error byte so skipped
    // whitespace after the run never leaks into the Error span.
    let mut error_span: Option<(usize, usize)> = None;

    loop {
        match lexer.next() {
            Some(Ok(tok)) => {
                if let Some(span) = error_span.take() {
                    tokens.push(Token {
                        kind: TokenKind::Error,
                        span,
                    });
                }
                tokens.push(Token {
                    kind: tok.to_kind(),
                    span: (lexer.span().start, lexer.span().end),
                });
            }
            Some(Err(())) => {
                let end = lexer.span().end;
                match &mut error_span {
                    Some((_, run_end)) => *run_end = end,
                    None => error_span = Some((lexer.span().start, end)),
                }
            }
            None => {
                if let Some(span) = error_span.take() {
                    tokens.push(Token {
                        kind: TokenKind::Error,
                        span,
                    });
                }
                break;
            }
        }
    }

    tokens
}

/// The text slice for a token.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[token.range()]
}
