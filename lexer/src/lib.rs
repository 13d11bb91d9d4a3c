//! Raw lexing of Rust-like source text for token tree construction.
//!
//! Unlike a parser-facing lexer this keeps whitespace and comments as
//! tokens: token tree spacing depends on whether anything separates two
//! punctuation characters.

mod float;
mod kind;
mod stream;

use std::ops::Range;

use logos::Logos;

pub use crate::float::lex_float;
pub use crate::kind::SyntaxKind;
pub use crate::stream::{TokenSource, TokenStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

/// Tokenizes `source` into raw tokens covering every byte of it.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = SyntaxKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            kind: result.unwrap_or(SyntaxKind::Unknown),
            range: lexer.span(),
        });
    }

    tokens
}
