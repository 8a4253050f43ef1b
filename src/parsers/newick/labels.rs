use super::span::Span;
use crate::TreeFloat;
use crate::parsers::TreeParseError;

/// Strips one pair of matching single or double quotes.
pub(crate) fn remove_quotes(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'\'' | b'"') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Splits a trailing `[...]` comment off a label.
///
/// Comments do not nest; the last `[` before the final `]` opens it.
/// Returns the label without the comment and the comment text.
pub(crate) fn split_comment(span: Span<'_>) -> (Span<'_>, Option<&str>) {
    let span = span.trim();
    if span.last() != Some(b']') {
        return (span, None);
    }

    match span.as_str().rfind('[') {
        Some(offset) => {
            let open = span.begin() + offset;
            let comment = span.sub(open + 1, span.end() - 1);
            (span.sub(span.begin(), open).trim(), Some(comment.as_str()))
        }
        None => (span, None),
    }
}

/// Parses the text after a branch's `:`; a trailing comment is split off
/// and returned with the length. Empty text means no length.
pub(crate) fn parse_branch_length(
    span: Span<'_>,
) -> Result<(Option<TreeFloat>, Option<&str>), TreeParseError> {
    let (text_span, comment) = split_comment(span);
    if text_span.is_empty() {
        return Ok((None, comment));
    }

    match text_span.as_str().parse::<TreeFloat>() {
        Ok(length) => Ok((Some(length), comment)),
        Err(_) => Err(TreeParseError::InvalidBranchLength {
            text: text_span.as_str().to_string(),
            begin: text_span.begin(),
            end: text_span.end(),
        }),
    }
}

/// Internal node labels that are plain numbers carry branch support.
pub(crate) fn support_value(name: &str) -> Option<TreeFloat> {
    name.trim().parse::<TreeFloat>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_matching_quotes_only() {
        assert_eq!(remove_quotes("'A B'"), "A B");
        assert_eq!(remove_quotes("\"A\""), "A");
        assert_eq!(remove_quotes("'A\""), "'A\"");
        assert_eq!(remove_quotes("'"), "'");
        assert_eq!(remove_quotes("plain"), "plain");
    }

    #[test]
    fn splits_trailing_comment() {
        let (label, comment) = split_comment(Span::whole("A[&&NHX:S=human]"));
        assert_eq!(label.as_str(), "A");
        assert_eq!(comment, Some("&&NHX:S=human"));

        let (label, comment) = split_comment(Span::whole("A"));
        assert_eq!(label.as_str(), "A");
        assert_eq!(comment, None);
    }

    #[test]
    fn branch_length_with_and_without_comment() {
        let (length, comment) =
            parse_branch_length(Span::whole("0.25[x]")).unwrap();
        assert_eq!(length, Some(0.25));
        assert_eq!(comment, Some("x"));

        let (length, comment) = parse_branch_length(Span::whole(" ")).unwrap();
        assert_eq!(length, None);
        assert_eq!(comment, None);

        assert!(matches!(
            parse_branch_length(Span::whole("0.1x")),
            Err(TreeParseError::InvalidBranchLength { .. })
        ));
    }

    #[test]
    fn numeric_labels_are_support() {
        assert_eq!(support_value("95"), Some(95.0));
        assert_eq!(support_value("0.87"), Some(0.87));
        assert_eq!(support_value("Homo"), None);
        assert_eq!(support_value("NaN"), None);
    }
}
