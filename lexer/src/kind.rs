use logos::{Lexer, Logos};

/// Raw token kinds, trivia included.
///
/// Fractional floats are not recognised here: `1.2` lexes as `IntNumber`,
/// `Punct`, `IntNumber`, the same as the field access in `x.0.1`. Use
/// [`crate::lex_float`] to re-lex a float literal starting at an integer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    #[regex(r"[ \t\r\n\f\x0B]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    #[regex(r"r#[\p{XID_Start}_]\p{XID_Continue}*")]
    Ident,

    #[regex(r"'[\p{XID_Start}_]\p{XID_Continue}*")]
    Lifetime,

    // Hex, octal and binary literals are covered by the suffix part.
    #[regex(r"[0-9][0-9_]*([a-zA-Z_][a-zA-Z0-9_]*)?")]
    IntNumber,

    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*([a-zA-Z_][a-zA-Z0-9_]*)?", priority = 4)]
    FloatNumber,

    #[regex(r"'([^'\\\n]|\\[^\n]|\\x[0-9a-fA-F][0-9a-fA-F]|\\u\{[0-9a-fA-F_]+\})'")]
    Char,

    #[regex(r"b'([^'\\\n]|\\[^\n]|\\x[0-9a-fA-F][0-9a-fA-F])'")]
    Byte,

    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    Str,

    #[regex(r#"b"([^"\\]|\\(.|\n))*""#)]
    ByteStr,

    #[regex(r#"c"([^"\\]|\\(.|\n))*""#)]
    CStr,

    #[regex(r##"r#*""##, raw_string)]
    RawStr,

    #[regex(r##"br#*""##, raw_string)]
    RawByteStr,

    #[regex(r##"cr#*""##, raw_string)]
    RawCStr,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,

    #[token(";")]
    #[token(",")]
    #[token(".")]
    #[token("..")]
    #[token("...")]
    #[token("..=")]
    #[token("@")]
    #[token("#")]
    #[token("~")]
    #[token("?")]
    #[token(":")]
    #[token("::")]
    #[token("$")]
    #[token("=")]
    #[token("==")]
    #[token("=>")]
    #[token("!")]
    #[token("!=")]
    #[token("<")]
    #[token("<=")]
    #[token("<<")]
    #[token("<<=")]
    #[token(">")]
    #[token(">=")]
    #[token(">>")]
    #[token(">>=")]
    #[token("-")]
    #[token("-=")]
    #[token("->")]
    #[token("&")]
    #[token("&&")]
    #[token("&=")]
    #[token("|")]
    #[token("||")]
    #[token("|=")]
    #[token("+")]
    #[token("+=")]
    #[token("*")]
    #[token("*=")]
    #[token("/")]
    #[token("/=")]
    #[token("^")]
    #[token("^=")]
    #[token("%")]
    #[token("%=")]
    Punct,

    /// Any single character no other rule accepts, e.g. a lone `'` or `\`.
    #[regex(r".", priority = 0)]
    Unknown,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace | SyntaxKind::LineComment | SyntaxKind::BlockComment
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntNumber
                | SyntaxKind::FloatNumber
                | SyntaxKind::Char
                | SyntaxKind::Byte
                | SyntaxKind::Str
                | SyntaxKind::ByteStr
                | SyntaxKind::CStr
                | SyntaxKind::RawStr
                | SyntaxKind::RawByteStr
                | SyntaxKind::RawCStr
        )
    }

    /// Identifiers, raw identifiers and keywords.
    pub fn is_ident(self) -> bool {
        matches!(self, SyntaxKind::Ident)
    }

    pub fn is_open_delimiter(self) -> bool {
        matches!(
            self,
            SyntaxKind::LParen | SyntaxKind::LBrace | SyntaxKind::LBrack
        )
    }

    /// The closing kind for an opening delimiter.
    pub fn closing(self) -> Option<SyntaxKind> {
        match self {
            SyntaxKind::LParen => Some(SyntaxKind::RParen),
            SyntaxKind::LBrace => Some(SyntaxKind::RBrace),
            SyntaxKind::LBrack => Some(SyntaxKind::RBrack),
            _ => None,
        }
    }
}

// Block comments nest, which a regular expression cannot express.
fn block_comment(lex: &mut Lexer<SyntaxKind>) {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut end = 0;
    while end < bytes.len() {
        match (bytes[end], bytes.get(end + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                end += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                end += 2;
                if depth == 0 {
                    break;
                }
            }
            _ => end += 1,
        }
    }
    lex.bump(end);
}

// An unterminated raw string runs to the end of input.
fn raw_string(lex: &mut Lexer<SyntaxKind>) {
    let hashes = lex.slice().bytes().filter(|&byte| byte == b'#').count();
    let terminator = format!("\"{}", "#".repeat(hashes));
    let remainder = lex.remainder();
    let end = match remainder.find(&terminator) {
        Some(index) => index + terminator.len(),
        None => remainder.len(),
    };
    lex.bump(end);
}
