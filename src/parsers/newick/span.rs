/// A `[begin, end)` byte range over the NEWICK source.
///
/// All offsets are absolute positions in `source`, so a child span can be
/// reported in errors without translating it back to its parent. Every
/// delimiter the parser looks for is ASCII, so offsets produced by scanning
/// always fall on `char` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span<'a> {
    source: &'a str,
    begin: usize,
    end: usize,
}

/// What a structural scan reports about one byte.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Structural {
    pub position: usize,
    pub byte: u8,
    /// Parenthesis depth before this byte, relative to the span start.
    pub depth: i64,
}

impl<'a> Span<'a> {
    pub(crate) fn new(source: &'a str, begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end && end <= source.len());
        Self { source, begin, end }
    }

    pub(crate) fn whole(source: &'a str) -> Self { Self::new(source, 0, source.len()) }
    pub(crate) fn begin(&self) -> usize { self.begin }
    pub(crate) fn end(&self) -> usize { self.end }
    pub(crate) fn is_empty(&self) -> bool { self.begin == self.end }
    pub(crate) fn as_str(&self) -> &'a str { &self.source[self.begin..self.end] }
    pub(crate) fn bytes(&self) -> &'a [u8] { &self.source.as_bytes()[self.begin..self.end] }
    pub(crate) fn first(&self) -> Option<u8> { self.bytes().first().copied() }
    pub(crate) fn last(&self) -> Option<u8> { self.bytes().last().copied() }

    /// A sub-range given in absolute offsets, clamped to this span.
    pub(crate) fn sub(&self, begin: usize, end: usize) -> Span<'a> {
        let begin = begin.clamp(self.begin, self.end);
        let end = end.clamp(begin, self.end);
        Span::new(self.source, begin, end)
    }

    pub(crate) fn trim(&self) -> Span<'a> {
        let bytes = self.bytes();
        let leading = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
        let trailing = bytes[leading..]
            .iter()
            .rev()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        Span::new(self.source, self.begin + leading, self.end - trailing)
    }

    /// Drops the first and last byte.
    pub(crate) fn inner(&self) -> Span<'a> {
        if self.end - self.begin < 2 {
            return Span::new(self.source, self.begin, self.begin);
        }
        Span::new(self.source, self.begin + 1, self.end - 1)
    }

    /// Visits every byte that is outside quoted names and bracketed comments,
    /// stopping early when `visit` returns `false`.
    ///
    /// A quote only opens a quoted name where a label may start: at the span
    /// start or right after `(`, `)` or `,`. That keeps apostrophes inside
    /// plain labels from swallowing the rest of the input.
    pub(crate) fn scan(&self, mut visit: impl FnMut(Structural) -> bool) {
        let mut quote: Option<u8> = None;
        let mut bracket_depth: usize = 0;
        let mut depth: i64 = 0;
        let mut label_may_start = true;

        for (offset, &byte) in self.bytes().iter().enumerate() {
            if let Some(quote_byte) = quote {
                if byte == quote_byte {
                    quote = None;
                }
                continue;
            }

            if bracket_depth > 0 {
                match byte {
                    b'[' => bracket_depth += 1,
                    b']' => bracket_depth -= 1,
                    _ => (),
                }
                continue;
            }

            match byte {
                b'\'' | b'"' if label_may_start => {
                    quote = Some(byte);
                    label_may_start = false;
                    continue;
                }
                b'[' => {
                    bracket_depth = 1;
                    continue;
                }
                _ => (),
            }

            let structural = Structural { position: self.begin + offset, byte, depth };
            match byte {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => (),
            }

            if !byte.is_ascii_whitespace() {
                label_may_start = matches!(byte, b'(' | b')' | b',');
            }

            if !visit(structural) {
                return;
            }
        }
    }

    /// Number of commas at parenthesis depth 0.
    pub(crate) fn count_outer_commas(&self) -> usize {
        let mut count: usize = 0;
        self.scan(|s| {
            if s.byte == b',' && s.depth == 0 {
                count += 1;
            }
            true
        });
        count
    }

    /// First depth-0 comma at or after `from`; depth is counted from `from`,
    /// so `from` must itself sit at depth 0 (the span start or just past a
    /// top-level comma).
    pub(crate) fn index_next_top_level_comma(&self, from: usize) -> Option<usize> {
        let mut found: Option<usize> = None;
        self.sub(from, self.end).scan(|s| {
            if s.byte == b',' && s.depth == 0 {
                found = Some(s.position);
                return false;
            }
            true
        });
        found
    }

    /// Position of the `)` closing the `(` at `open`.
    pub(crate) fn matching_close(&self, open: usize) -> Option<usize> {
        let mut found: Option<usize> = None;
        self.sub(open, self.end).scan(|s| {
            if s.byte == b')' && s.depth == 1 {
                found = Some(s.position);
                return false;
            }
            true
        });
        found
    }

    /// Positions of structural occurrences of `byte` at depth 0.
    pub(crate) fn top_level_positions(&self, byte: u8) -> Vec<usize> {
        let mut positions: Vec<usize> = Vec::new();
        self.scan(|s| {
            if s.byte == byte && s.depth == 0 {
                positions.push(s.position);
            }
            true
        });
        positions
    }

    /// Whether `(` or `)` occurs outside quotes and comments.
    pub(crate) fn has_parentheses(&self) -> bool {
        let mut found = false;
        self.scan(|s| {
            found = matches!(s.byte, b'(' | b')');
            !found
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_outer_commas() {
        let span = Span::whole("A,(B,C),'D,E'[x,y],F");
        assert_eq!(span.count_outer_commas(), 3);
    }

    #[test]
    fn finds_next_top_level_comma_from_offset() {
        let source = "(A,B),C,D";
        let span = Span::whole(source);
        assert_eq!(span.index_next_top_level_comma(0), Some(5));
        assert_eq!(span.index_next_top_level_comma(6), Some(7));
        assert_eq!(span.index_next_top_level_comma(8), None);
    }

    #[test]
    fn matches_parentheses_across_nesting() {
        let span = Span::whole("((A,B),C)x");
        assert_eq!(span.matching_close(0), Some(8));
        assert_eq!(span.matching_close(1), Some(5));
    }

    #[test]
    fn trims_and_strips_outer_bytes() {
        let source = "  (A)  ";
        let span = Span::whole(source).trim();
        assert_eq!(span.as_str(), "(A)");
        assert_eq!(span.inner().as_str(), "A");
        assert_eq!(span.sub(0, 100).as_str(), "(A)");
    }

    #[test]
    fn apostrophe_inside_plain_label_is_not_a_quote() {
        let span = Span::whole("O'Brien,(A,B)");
        assert_eq!(span.count_outer_commas(), 1);
        assert!(span.has_parentheses());
    }
}
