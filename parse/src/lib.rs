//! Builds token trees from a lexical token stream.
//!
//! Spacing follows the compiler's rules for procedural macro input: a
//! multi-character operator is split into one punct per character, and a
//! punct is `Joint` only when the very next raw token is more punctuation.

mod parser;

use expando_lexer::{TokenSource, TokenStream};
use expando_tree::Subtree;
use serde::{Deserialize, Serialize};

use crate::parser::SubtreeParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// When the whole input is a single bracketed group, return that group
    /// itself instead of wrapping it in a delimiter-less root.
    pub collapse_single_group: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            collapse_single_group: true,
        }
    }
}

pub fn parse_subtree<S: TokenSource>(source: &mut S) -> Subtree {
    parse_subtree_with(source, ParseOptions::default())
}

pub fn parse_subtree_with<S: TokenSource>(source: &mut S, options: ParseOptions) -> Subtree {
    SubtreeParser::new(source).parse(options)
}

pub fn parse_str(text: &str) -> Subtree {
    parse_str_with(text, ParseOptions::default())
}

pub fn parse_str_with(text: &str, options: ParseOptions) -> Subtree {
    parse_subtree_with(&mut TokenStream::new(text), options)
}
