use std::fmt::{self, Display, Formatter};

use crate::{Leaf, Spacing, Subtree, TokenTree};

/// Debug rendering of a subtree, one line per node:
///
/// ```text
/// SUBTREE $
///   PUNCH   . [alone] 0
///   SUBTREE () 1
///     IDENT   foo 2
/// ```
pub struct DebugDump<'a>(pub &'a Subtree);

impl Display for DebugDump<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        dump_subtree(f, self.0, 0)
    }
}

fn dump_subtree(f: &mut Formatter<'_>, subtree: &Subtree, level: usize) -> fmt::Result {
    indent(f, level)?;
    match &subtree.delimiter {
        None => write!(f, "SUBTREE $")?,
        Some(delimiter) => write!(
            f,
            "SUBTREE {}{} {}",
            delimiter.kind.open_text(),
            delimiter.kind.close_text(),
            delimiter.id
        )?,
    }
    for token_tree in &subtree.token_trees {
        writeln!(f)?;
        match token_tree {
            TokenTree::Leaf(leaf) => {
                indent(f, level + 1)?;
                dump_leaf(f, leaf)?;
            }
            TokenTree::Subtree(subtree) => dump_subtree(f, subtree, level + 1)?,
        }
    }
    Ok(())
}

fn dump_leaf(f: &mut Formatter<'_>, leaf: &Leaf) -> fmt::Result {
    match leaf {
        Leaf::Literal(literal) => write!(f, "LITERAL {} {}", literal.text, literal.id),
        Leaf::Punct(punct) => write!(f, "PUNCH   {} [{}] {}", punct.char, punct.spacing, punct.id),
        Leaf::Ident(ident) => write!(f, "IDENT   {} {}", ident.text, ident.id),
    }
}

fn indent(f: &mut Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

/// Renders a subtree back to source-like text.
///
/// Idents are always followed by a space, puncts only when `Alone`, so
/// `::` survives but the output is not byte-identical to the input.
pub struct SourceText<'a>(pub &'a Subtree);

impl Display for SourceText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_text(f, self.0)
    }
}

fn write_text(f: &mut Formatter<'_>, subtree: &Subtree) -> fmt::Result {
    if let Some(delimiter) = &subtree.delimiter {
        f.write_str(delimiter.kind.open_text())?;
    }
    for token_tree in &subtree.token_trees {
        match token_tree {
            TokenTree::Leaf(Leaf::Literal(literal)) => f.write_str(&literal.text)?,
            TokenTree::Leaf(Leaf::Ident(ident)) => write!(f, "{} ", ident.text)?,
            TokenTree::Leaf(Leaf::Punct(punct)) => {
                write!(f, "{}", punct.char)?;
                if punct.spacing == Spacing::Alone {
                    f.write_str(" ")?;
                }
            }
            TokenTree::Subtree(subtree) => write_text(f, subtree)?,
        }
    }
    if let Some(delimiter) = &subtree.delimiter {
        f.write_str(delimiter.kind.close_text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn punct(char: char, spacing: Spacing, id: u32) -> TokenTree {
        Leaf::from(Punct {
            char,
            spacing,
            id: TokenId(id),
        })
        .into()
    }

    fn ident(text: &str, id: u32) -> TokenTree {
        Leaf::from(Ident {
            text: text.into(),
            id: TokenId(id),
        })
        .into()
    }

    fn nested() -> Subtree {
        Subtree::new(
            None,
            vec![
                ident("foo", 0),
                punct(':', Spacing::Joint, 1),
                punct(':', Spacing::Alone, 2),
                Subtree::new(
                    Some(Delimiter {
                        id: TokenId(3),
                        kind: DelimiterKind::Parenthesis,
                    }),
                    vec![Leaf::from(Literal {
                        text: "1.2".into(),
                        id: TokenId(4),
                    })
                    .into()],
                )
                .into(),
            ],
        )
    }

    #[test]
    fn dump_nested() {
        let expected = "\
SUBTREE $
  IDENT   foo 0
  PUNCH   : [joint] 1
  PUNCH   : [alone] 2
  SUBTREE () 3
    LITERAL 1.2 4";
        assert_eq!(nested().debug_dump(), expected);
    }

    #[test]
    fn dump_empty_delimited() {
        let subtree = Subtree::new(
            Some(Delimiter {
                id: TokenId(0),
                kind: DelimiterKind::Brace,
            }),
            vec![],
        );
        assert_eq!(subtree.debug_dump(), "SUBTREE {} 0");
    }

    #[test]
    fn text_nested() {
        assert_eq!(nested().to_text(), "foo :: (1.2)");
    }
}
