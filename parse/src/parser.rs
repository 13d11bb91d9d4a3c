use expando_lexer::{SyntaxKind, TokenSource, lex_float};
use expando_tree::{
    Delimiter, DelimiterKind, Ident, Leaf, Literal, Punct, Spacing, Subtree, TokenId, TokenTree,
};

use crate::ParseOptions;

/// One tree build. Ids come from a single counter shared by every nesting
/// level, so they increase in preorder across the whole tree.
pub(crate) struct SubtreeParser<'a, S> {
    source: &'a mut S,
    next_id: u32,
}

impl<'a, S: TokenSource> SubtreeParser<'a, S> {
    pub(crate) fn new(source: &'a mut S) -> Self {
        Self { source, next_id: 0 }
    }

    pub(crate) fn parse(mut self, options: ParseOptions) -> Subtree {
        let mut token_trees = Vec::new();
        while let Some(kind) = self.source.current() {
            self.collect_token_tree(kind, &mut token_trees);
        }

        if options.collapse_single_group && matches!(token_trees.as_slice(), [TokenTree::Subtree(_)])
        {
            if let Some(TokenTree::Subtree(subtree)) = token_trees.pop() {
                return subtree;
            }
        }

        Subtree::new(None, token_trees)
    }

    fn collect_token_tree(&mut self, kind: SyntaxKind, token_trees: &mut Vec<TokenTree>) {
        if let Some(delimiter_kind) = delimiter_kind(kind) {
            let delimiter = Delimiter {
                id: self.alloc_id(),
                kind: delimiter_kind,
            };
            let close = kind.closing();
            self.source.bump();

            let mut children = Vec::new();
            while let Some(kind) = self.source.current() {
                if Some(kind) == close {
                    break;
                }
                self.collect_token_tree(kind, &mut children);
            }
            token_trees.push(Subtree::new(Some(delimiter), children).into());
        } else {
            match kind {
                SyntaxKind::IntNumber => {
                    let text = self.integer_literal_text();
                    self.push_literal(text, token_trees);
                }
                kind if kind.is_literal() => {
                    let text = self.source.current_text().to_owned();
                    self.push_literal(text, token_trees);
                }
                kind if kind.is_ident() => {
                    let text = self.source.current_text().to_owned();
                    self.push_ident(text, token_trees);
                }
                SyntaxKind::Lifetime => self.collect_lifetime(token_trees),
                _ => self.collect_puncts(token_trees),
            }
        }

        // Past the leaf, or past the close delimiter of a finished group.
        self.source.bump();
    }

    /// Text of an integer literal, extended to a float literal when the
    /// integer is immediately followed by a fraction, e.g. `1` `.` `2`.
    ///
    /// On extension the source is left on the last token of the float.
    fn integer_literal_text(&mut self) -> String {
        let integer = self.source.current_text().to_owned();
        let Some(len) = lex_float(self.source.remainder()) else {
            return integer;
        };
        if len <= integer.len() {
            return integer;
        }

        let text = self.source.remainder()[..len].to_owned();
        let end = self.source.current_offset() + len;
        while self.source.current_offset() + self.source.current_text().len() < end {
            self.source.bump();
        }
        text
    }

    fn collect_lifetime(&mut self, token_trees: &mut Vec<TokenTree>) {
        let text = self.source.current_text().to_owned();
        let name = text.strip_prefix('\'').unwrap_or(text.as_str()).to_owned();
        let punct = Punct {
            char: '\'',
            spacing: Spacing::Joint,
            id: self.alloc_id(),
        };
        token_trees.push(Leaf::from(punct).into());
        self.push_ident(name, token_trees);
    }

    fn collect_puncts(&mut self, token_trees: &mut Vec<TokenTree>) {
        let text = self.source.current_text().to_owned();
        let last_spacing = self.last_punct_spacing();

        let mut chars = text.chars().peekable();
        while let Some(char) = chars.next() {
            let spacing = if chars.peek().is_some() {
                Spacing::Joint
            } else {
                last_spacing
            };
            let punct = Punct {
                char,
                spacing,
                id: self.alloc_id(),
            };
            token_trees.push(Leaf::from(punct).into());
        }
    }

    fn last_punct_spacing(&self) -> Spacing {
        match self.source.raw_lookahead(1) {
            None => Spacing::Alone,
            Some(next) if next.is_trivia() || next.is_open_delimiter() => Spacing::Alone,
            Some(next) if !next.is_literal() && !next.is_ident() => Spacing::Joint,
            Some(_) => Spacing::Alone,
        }
    }

    fn push_literal(&mut self, text: String, token_trees: &mut Vec<TokenTree>) {
        let id = self.alloc_id();
        token_trees.push(Leaf::from(Literal { text, id }).into());
    }

    fn push_ident(&mut self, text: String, token_trees: &mut Vec<TokenTree>) {
        let id = self.alloc_id();
        token_trees.push(Leaf::from(Ident { text, id }).into());
    }

    fn alloc_id(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn delimiter_kind(kind: SyntaxKind) -> Option<DelimiterKind> {
    match kind {
        SyntaxKind::LParen => Some(DelimiterKind::Parenthesis),
        SyntaxKind::LBrace => Some(DelimiterKind::Brace),
        SyntaxKind::LBrack => Some(DelimiterKind::Bracket),
        _ => None,
    }
}
