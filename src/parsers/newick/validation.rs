use super::span::Span;
use crate::parsers::TreeParseError;

/// Checks the delimiters around a single NEWICK tree.
///
/// The (already trimmed) text must open with `(` and close with `;`. The
/// returned span is the text without the `;`.
pub(crate) fn check_outer_delimiters(
    span: Span<'_>,
) -> Result<Span<'_>, TreeParseError> {
    if span.first() != Some(b'(') {
        return Err(TreeParseError::Syntax {
            expected: "'(' at the start of the tree",
            position: span.begin(),
        });
    }

    if span.last() != Some(b';') {
        return Err(TreeParseError::Syntax {
            expected: "';' at the end of the tree",
            position: span.end(),
        });
    }

    let body = span.sub(span.begin(), span.end() - 1);
    if !body.top_level_positions(b';').is_empty() {
        return Err(TreeParseError::Syntax {
            expected: "a single tree terminated by one ';'",
            position: body.begin(),
        });
    }

    Ok(body)
}

/// Locates the parenthesis closing the outer clade and checks that nothing
/// structural follows it. The root label after it is not kept.
pub(crate) fn outer_clade(body: Span<'_>) -> Result<Span<'_>, TreeParseError> {
    let close = body.matching_close(body.begin()).ok_or(
        TreeParseError::Unbalanced { begin: body.begin(), end: body.end() },
    )?;

    let trailing = body.sub(close + 1, body.end());
    if trailing.has_parentheses() {
        return Err(TreeParseError::Unbalanced {
            begin: body.begin(),
            end: body.end(),
        });
    }

    Ok(body.sub(body.begin(), close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_delimiters() {
        for (text, expected_position) in [("A,B);", 0), ("(A,B)", 5)] {
            match check_outer_delimiters(Span::whole(text)) {
                Err(TreeParseError::Syntax { position, .. }) => {
                    assert_eq!(position, expected_position, "{text}")
                }
                other => panic!("{text}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_two_trees_in_one() {
        assert!(matches!(
            check_outer_delimiters(Span::whole("(A,B);(C,D);")),
            Err(TreeParseError::Syntax { .. })
        ));
    }

    #[test]
    fn outer_clade_drops_root_label() {
        let body = check_outer_delimiters(Span::whole("((A,B),C)root:0.0;")).unwrap();
        assert_eq!(outer_clade(body).unwrap().as_str(), "((A,B),C)");
    }

    #[test]
    fn outer_clade_rejects_extra_close() {
        let body = check_outer_delimiters(Span::whole("(A,(B,C)));")).unwrap();
        assert!(matches!(
            outer_clade(body),
            Err(TreeParseError::Unbalanced { .. })
        ));
    }
}
