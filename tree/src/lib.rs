//! Token trees as exchanged with a proc-macro expansion server.
//!
//! The shapes here mirror the compiler's macro bridge: a [`Subtree`] is an
//! optional [`Delimiter`] plus its children, and every delimiter and leaf
//! carries a [`TokenId`]. Serde derives use the externally tagged enum
//! representation, so a leaf travels as `{"Leaf": {"Punct": {...}}}`.

mod render;

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

pub use crate::render::{DebugDump, SourceText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u32);

impl Display for TokenId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelimiterKind {
    Parenthesis,
    Brace,
    Bracket,
}

impl DelimiterKind {
    pub fn open_text(self) -> &'static str {
        match self {
            DelimiterKind::Parenthesis => "(",
            DelimiterKind::Brace => "{",
            DelimiterKind::Bracket => "[",
        }
    }

    pub fn close_text(self) -> &'static str {
        match self {
            DelimiterKind::Parenthesis => ")",
            DelimiterKind::Brace => "}",
            DelimiterKind::Bracket => "]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiter {
    pub id: TokenId,
    pub kind: DelimiterKind,
}

/// A delimited group of token trees.
///
/// `delimiter` is `None` only for the synthetic root that holds top-level
/// tokens not enclosed in any bracket. It is always serialized, as `null`
/// when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtree {
    pub delimiter: Option<Delimiter>,
    pub token_trees: Vec<TokenTree>,
}

impl Subtree {
    pub fn new(delimiter: Option<Delimiter>, token_trees: Vec<TokenTree>) -> Self {
        Self {
            delimiter,
            token_trees,
        }
    }

    /// Ids of every delimiter and leaf, in depth-first preorder.
    pub fn token_ids(&self) -> Vec<TokenId> {
        fn collect(subtree: &Subtree, ids: &mut Vec<TokenId>) {
            if let Some(delimiter) = &subtree.delimiter {
                ids.push(delimiter.id);
            }
            for token_tree in &subtree.token_trees {
                match token_tree {
                    TokenTree::Leaf(leaf) => ids.push(leaf.id()),
                    TokenTree::Subtree(subtree) => collect(subtree, ids),
                }
            }
        }

        let mut ids = Vec::new();
        collect(self, &mut ids);
        ids
    }

    /// Indented one-line-per-node rendering, for tests and diagnostics.
    pub fn debug_dump(&self) -> String {
        DebugDump(self).to_string()
    }

    /// Source-like text for the tree.
    pub fn to_text(&self) -> String {
        SourceText(self).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenTree {
    Leaf(Leaf),
    Subtree(Subtree),
}

impl TokenTree {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TokenTree::Leaf(_))
    }

    pub fn is_subtree(&self) -> bool {
        matches!(self, TokenTree::Subtree(_))
    }
}

impl From<Leaf> for TokenTree {
    fn from(leaf: Leaf) -> Self {
        TokenTree::Leaf(leaf)
    }
}

impl From<Subtree> for TokenTree {
    fn from(subtree: Subtree) -> Self {
        TokenTree::Subtree(subtree)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leaf {
    Literal(Literal),
    Punct(Punct),
    Ident(Ident),
}

impl Leaf {
    pub fn id(&self) -> TokenId {
        match self {
            Leaf::Literal(literal) => literal.id,
            Leaf::Punct(punct) => punct.id,
            Leaf::Ident(ident) => ident.id,
        }
    }
}

impl From<Literal> for Leaf {
    fn from(literal: Literal) -> Self {
        Leaf::Literal(literal)
    }
}

impl From<Punct> for Leaf {
    fn from(punct: Punct) -> Self {
        Leaf::Punct(punct)
    }
}

impl From<Ident> for Leaf {
    fn from(ident: Ident) -> Self {
        Leaf::Ident(ident)
    }
}

/// Raw source text of a single literal, e.g. `"foo"`, `'f'` or `1.2e-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub text: String,
    pub id: TokenId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punct {
    pub char: char,
    pub spacing: Spacing,
    pub id: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub text: String,
    pub id: TokenId,
}

/// Whether a punctuation character is fused with the punctuation after it.
///
/// `Joint` lets the receiving side glue `:` `:` back into `::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spacing {
    Alone,
    Joint,
}

impl Display for Spacing {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Spacing::Alone => write!(f, "alone"),
            Spacing::Joint => write!(f, "joint"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_token_tree() -> Subtree {
        let mut subtree = Subtree::default();
        subtree.token_trees.push(
            Leaf::from(Ident {
                text: "struct".into(),
                id: TokenId(0),
            })
            .into(),
        );
        subtree.token_trees.push(
            Leaf::from(Ident {
                text: "Foo".into(),
                id: TokenId(1),
            })
            .into(),
        );
        subtree.token_trees.push(
            Subtree::new(
                Some(Delimiter {
                    id: TokenId(2),
                    kind: DelimiterKind::Brace,
                }),
                vec![
                    Leaf::from(Punct {
                        char: '#',
                        spacing: Spacing::Joint,
                        id: TokenId(3),
                    })
                    .into(),
                    Leaf::from(Literal {
                        text: "\"foo\"".into(),
                        id: TokenId(4),
                    })
                    .into(),
                ],
            )
            .into(),
        );
        subtree
    }

    #[test]
    fn token_ids_in_preorder() {
        let ids = fixture_token_tree().token_ids();
        assert_eq!(
            ids,
            vec![TokenId(0), TokenId(1), TokenId(2), TokenId(3), TokenId(4)]
        );
    }

    #[test]
    fn leaf_ids() {
        let punct = Leaf::from(Punct {
            char: '.',
            spacing: Spacing::Alone,
            id: TokenId(7),
        });
        assert_eq!(punct.id(), TokenId(7));
        assert!(TokenTree::from(punct).is_leaf());
        assert!(TokenTree::from(Subtree::default()).is_subtree());
    }

    #[test]
    fn none_delimiter_serializes_as_null() {
        let json = serde_json::to_string(&Subtree::default()).unwrap();
        assert_eq!(json, r#"{"delimiter":null,"token_trees":[]}"#);
    }

    #[test]
    fn punct_serializes_under_variant_keys() {
        let tree = TokenTree::from(Leaf::from(Punct {
            char: ':',
            spacing: Spacing::Joint,
            id: TokenId(3),
        }));
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(
            json,
            r#"{"Leaf":{"Punct":{"char":":","spacing":"Joint","id":3}}}"#
        );
    }

    #[test]
    fn delimiter_kind_serializes_as_name() {
        let delimiter = Delimiter {
            id: TokenId(0),
            kind: DelimiterKind::Bracket,
        };
        let json = serde_json::to_string(&delimiter).unwrap();
        assert_eq!(json, r#"{"id":0,"kind":"Bracket"}"#);
    }

    #[test]
    fn unknown_variant_key_is_rejected() {
        let json = r#"{"Group":{"delimiter":null,"token_trees":[]}}"#;
        assert!(serde_json::from_str::<TokenTree>(json).is_err());
    }

    #[test]
    fn multi_char_punct_is_rejected() {
        let json = r#"{"char":"::","spacing":"Alone","id":0}"#;
        assert!(serde_json::from_str::<Punct>(json).is_err());
    }

    #[test]
    fn fixture_round_trips_through_json() {
        let tree = fixture_token_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: Subtree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }
}
