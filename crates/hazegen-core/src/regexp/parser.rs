//! Recursive-descent parser for reservation regexp strings.

use std::ops::Range;

use super::ast::Regexp;
use super::lexer::{Token, TokenKind, lex, token_text};

/// A regexp parse failure, with a byte span into the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse a regexp source string into the raw IR (names unresolved).
pub fn parse(source: &str) -> Result<Regexp, ParseError> {
    let tokens = lex(source);
    if tokens.is_empty() {
        return Err(ParseError::new("empty reservation string", 0..source.len()));
    }

    let mut parser = Parser {
        source,
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(tok) if tok.kind == TokenKind::RParen => {
            Err(ParseError::new("unbalanced parenthesis", tok.range()))
        }
        Some(tok) => Err(ParseError::new("unexpected trailing input", tok.range())),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn end_span(&self) -> Range<usize> {
        let end = self.source.len();
        end..end
    }

    fn expr(&mut self) -> Result<Regexp, ParseError> {
        self.seq()
    }

    fn seq(&mut self) -> Result<Regexp, ParseError> {
        let mut children = vec![self.oneof()?];
        while self.eat(TokenKind::Comma) {
            children.push(self.oneof()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Regexp::Sequence(children)
        })
    }

    fn oneof(&mut self) -> Result<Regexp, ParseError> {
        let mut children = vec![self.all()?];
        while self.eat(TokenKind::Pipe) {
            children.push(self.all()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Regexp::OneOf(children)
        })
    }

    fn all(&mut self) -> Result<Regexp, ParseError> {
        let mut children = vec![self.rep()?];
        while self.eat(TokenKind::Plus) {
            children.push(self.rep()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Regexp::AllOf(children)
        })
    }

    fn rep(&mut self) -> Result<Regexp, ParseError> {
        let mut el = self.el()?;
        while self.eat(TokenKind::Star) {
            let Some(tok) = self.bump() else {
                return Err(ParseError::new(
                    "expected repetition count after `*`",
                    self.end_span(),
                ));
            };
            if tok.kind != TokenKind::Number {
                return Err(ParseError::new(
                    "expected repetition count after `*`",
                    tok.range(),
                ));
            }
            let text = token_text(self.source, tok);
            let count: u32 = text.parse().map_err(|_| {
                ParseError::new(format!("repetition count `{}` out of range", text), tok.range())
            })?;
            if count < 2 {
                return Err(ParseError::new(
                    format!("repetition count must be at least 2, got {}", count),
                    tok.range(),
                ));
            }
            el = Regexp::Repeat(Box::new(el), count);
        }
        Ok(el)
    }

    fn el(&mut self) -> Result<Regexp, ParseError> {
        let Some(tok) = self.bump() else {
            return Err(ParseError::new("expected a name or `(`", self.end_span()));
        };
        match tok.kind {
            TokenKind::Name => {
                let text = token_text(self.source, tok);
                if text == "nothing" {
                    Ok(Regexp::Nothing)
                } else {
                    Ok(Regexp::Name(text.to_string()))
                }
            }
            TokenKind::LParen => {
                let inner = self.expr()?;
                if !self.eat(TokenKind::RParen) {
                    return Err(ParseError::new("unbalanced parenthesis", tok.range()));
                }
                Ok(inner)
            }
            _ => Err(ParseError::new(
                format!("unexpected `{}`", token_text(self.source, tok)),
                tok.range(),
            )),
        }
    }
}
