use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq)]
enum FloatToken {
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?([a-zA-Z_][a-zA-Z0-9_]*)?")]
    #[regex(r"[0-9][0-9_]*\.", trailing_dot)]
    Float,
}

// `1.` is a float only when nothing after the dot continues it: `1..2` is a
// range, `1.foo()` a method call.
fn trailing_dot(lex: &mut Lexer<FloatToken>) -> bool {
    !matches!(
        lex.remainder().chars().next(),
        Some(next) if next == '.' || next == '_' || next.is_alphanumeric()
    )
}

/// Byte length of the fractional float literal at the start of `text`.
///
/// Returns `None` when `text` does not start with one, which includes plain
/// integers, suffixed integers like `1u8.2`, and the `1` in `1..2`.
pub fn lex_float(text: &str) -> Option<usize> {
    let mut lexer = FloatToken::lexer(text);
    match lexer.next() {
        Some(Ok(FloatToken::Float)) => Some(lexer.span().end),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional() {
        assert_eq!(lex_float("1.2"), Some(3));
        assert_eq!(lex_float("1.2f64"), Some(6));
        assert_eq!(lex_float("1.2e-1"), Some(6));
        assert_eq!(lex_float("1_000.000_1 + x"), Some(11));
    }

    #[test]
    fn stops_at_second_dot() {
        assert_eq!(lex_float("1.2.3"), Some(3));
    }

    #[test]
    fn trailing_dot() {
        assert_eq!(lex_float("1."), Some(2));
        assert_eq!(lex_float("1.;"), Some(2));
        assert_eq!(lex_float("1. "), Some(2));
    }

    #[test]
    fn not_a_float() {
        assert_eq!(lex_float("1"), None);
        assert_eq!(lex_float("1..2"), None);
        assert_eq!(lex_float("1.foo()"), None);
        assert_eq!(lex_float("1u8.2"), None);
        assert_eq!(lex_float("1 .2"), None);
        assert_eq!(lex_float("foo"), None);
    }
}
