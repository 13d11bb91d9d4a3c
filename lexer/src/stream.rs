use crate::{SyntaxKind, Token, tokenize};

/// A peekable token stream positioned on a non-trivia token.
///
/// Trivia (whitespace and comments) is skipped when moving between tokens
/// but stays visible to [`TokenSource::raw_lookahead`].
pub trait TokenSource {
    /// Kind of the current token, `None` at end of input.
    fn current(&self) -> Option<SyntaxKind>;

    /// Text of the current token, empty at end of input.
    fn current_text(&self) -> &str;

    /// Byte offset of the current token in the source.
    fn current_offset(&self) -> usize;

    /// Raw token `n` positions after the current one, trivia included.
    fn raw_lookahead(&self, n: usize) -> Option<SyntaxKind>;

    /// Source text from the current token to the end of input.
    fn remainder(&self) -> &str;

    /// Moves past the current token and any trivia after it.
    fn bump(&mut self);
}

#[derive(Debug, Clone)]
pub struct TokenStream<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'s> TokenStream<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut stream = Self {
            source,
            tokens: tokenize(source),
            position: 0,
        };
        stream.skip_trivia();
        stream
    }

    fn skip_trivia(&mut self) {
        while self
            .tokens
            .get(self.position)
            .is_some_and(|token| token.kind.is_trivia())
        {
            self.position += 1;
        }
    }
}

impl TokenSource for TokenStream<'_> {
    fn current(&self) -> Option<SyntaxKind> {
        self.tokens.get(self.position).map(|token| token.kind)
    }

    fn current_text(&self) -> &str {
        match self.tokens.get(self.position) {
            Some(token) => &self.source[token.range.clone()],
            None => "",
        }
    }

    fn current_offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(self.source.len(), |token| token.range.start)
    }

    fn raw_lookahead(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.position + n).map(|token| token.kind)
    }

    fn remainder(&self) -> &str {
        &self.source[self.current_offset()..]
    }

    fn bump(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
            self.skip_trivia();
        }
    }
}
