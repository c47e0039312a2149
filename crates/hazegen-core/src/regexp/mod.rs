//! Reservation regexp IR: lexer, parser, and canonicalizer.
//!
//! Reservation expressions arrive as source strings using the grammar
//!
//! ```text
//! expr  := seq
//! seq   := oneof ("," oneof)*
//! oneof := all ("|" all)*
//! all   := rep ("+" rep)*
//! rep   := el ("*" NUMBER)*
//! el    := NAME | "nothing" | "(" expr ")"
//! ```
//!
//! and are canonicalized into an alternation of alternatives: the root is
//! `OneOf`, every alternative is a `Sequence`, and every sequence element is
//! a single `Unit`, `Nothing`, or an `AllOf` of units.

mod ast;
mod lexer;
mod parser;
mod transform;


pub use ast::Regexp;
pub use lexer::{Token, TokenKind, lex};
pub use parser::{ParseError, parse};
pub use transform::{canonical_alternatives, canonicalize};
