pub(crate) mod labels;
pub(crate) mod span;
pub(crate) mod validation;
mod writer;

use crate::TreeParseError;

use super::super::phylo::NodeId;
use super::super::phylo::Tree;
use labels::parse_branch_length;
use labels::remove_quotes;
use labels::split_comment;
use labels::support_value;
use span::Span;
use validation::check_outer_delimiters;
use validation::outer_clade;

use std::path::Path;
use tracing::debug;

pub use writer::write_newick;

/// Parses one NEWICK tree.
///
/// **Processing pipeline:**
/// 1. **Validation**: the trimmed text must start with `(` and end with `;`
/// 2. **Outer clade**: the `(` at the start must be closed; the root label
///    between that `)` and `;` is discarded
/// 3. **Recursive descent**: each clade is split at its top-level commas and
///    every part becomes a child connected by a new edge
/// 4. **Normalization**: numeric internal labels become edge support
///
/// **Input format examples:**
/// - Simple tree: `"(A,B,C);"`
/// - With branch lengths: `"(A:0.1,B:0.2,(C:0.3,D:0.4):0.5);"`
/// - With support as labels: `"(A,(B,C)95:0.2);"`
/// - With quotes and comments: `"('Homo sapiens'[&&NHX:S=human]:0.1,B);"`
///
/// **Returns:**
/// - `Ok(Tree)` - rooted at the outer clade; node indices follow preorder
/// - `Err(TreeParseError::Syntax)` - missing `(` or `;`, or a clade that
///   does not start with `(`
/// - `Err(TreeParseError::Unbalanced)` - a `(` without its `)` or the reverse
/// - `Err(TreeParseError::InvalidBranchLength)` - text after `:` is not a number
pub fn parse_newick(text: &str) -> Result<Tree, TreeParseError> {
    let trimmed = Span::whole(text).trim();
    let body = check_outer_delimiters(trimmed)?;
    let clade = outer_clade(body)?;

    let mut tree = Tree::new();
    let root = tree.add_new_node(<Option<&str>>::None);
    tree.set_root(root);

    parse_clade(clade.inner(), root, &mut tree)?;
    move_numeric_labels_to_support(&mut tree);

    debug!(
        nodes = tree.node_count(),
        tips = tree.tip_count(),
        "parsed NEWICK tree"
    );
    Ok(tree)
}

/// Parses every `;`-terminated tree in `text`, in order.
///
/// Text after the last `;` that is only whitespace is ignored; anything
/// else is parsed as a tree and fails for lack of a `;`.
pub fn parse_newick_trees(text: &str) -> Result<Vec<Tree>, TreeParseError> {
    let whole = Span::whole(text);
    let mut trees: Vec<Tree> = Vec::new();
    let mut begin = whole.begin();

    for semicolon in whole.top_level_positions(b';') {
        let tree_span = whole.sub(begin, semicolon + 1);
        trees.push(parse_newick(tree_span.as_str())?);
        begin = semicolon + 1;
    }

    let rest = whole.sub(begin, whole.end()).trim();
    if !rest.is_empty() {
        trees.push(parse_newick(rest.as_str())?);
    }

    Ok(trees)
}

/// Reads a file holding one or more NEWICK trees.
pub fn read_newick_file(
    path: impl AsRef<Path>,
) -> Result<Vec<Tree>, TreeParseError> {
    let text = std::fs::read_to_string(path)?;
    parse_newick_trees(&text)
}

/// Splits the inside of a clade at its top-level commas and parses each
/// part as a child of `parent_id`.
///
/// `k` top-level commas give `k + 1` children; an empty clade `()` gives a
/// single unnamed child.
fn parse_clade(
    span: Span<'_>,
    parent_id: NodeId,
    tree: &mut Tree,
) -> Result<(), TreeParseError> {
    let degree = span.count_outer_commas() + 1;
    let mut begin = span.begin();
    for _ in 1..degree {
        let Some(comma) = span.index_next_top_level_comma(begin) else {
            break;
        };
        parse_child(span.sub(begin, comma), parent_id, tree)?;
        begin = comma + 1;
    }
    parse_child(span.sub(begin, span.end()), parent_id, tree)
}

/// The parts of one child as located in its span.
#[derive(Debug, Default)]
struct ChildLayout {
    open: Option<usize>,
    close: Option<usize>,
    colon: Option<usize>,
    stray_close: bool,
    final_depth: i64,
}

fn child_layout(span: Span<'_>) -> ChildLayout {
    let mut layout = ChildLayout::default();
    let mut depth: i64 = 0;
    span.scan(|s| {
        match s.byte {
            b'(' if s.depth == 0 && layout.open.is_none() => {
                layout.open = Some(s.position)
            }
            b')' if s.depth == 1 => {
                layout.close = Some(s.position);
                layout.colon = None;
            }
            b')' if s.depth <= 0 => layout.stray_close = true,
            b':' if s.depth == 0 && layout.colon.is_none() => {
                layout.colon = Some(s.position)
            }
            _ => (),
        }
        depth = match s.byte {
            b'(' => s.depth + 1,
            b')' => s.depth - 1,
            _ => s.depth,
        };
        true
    });
    layout.final_depth = depth;
    layout
}

/// Parses one child: an optional nested clade, a name, an optional comment
/// and an optional branch length.
///
/// The name is what lies between the clade's closing `)` (or the span
/// start) and the `:` (or the span end), with a trailing `[...]` comment
/// removed and one pair of matching quotes stripped. A nested clade must be
/// wrapped in exactly one matching pair of parentheses; finding only one of
/// the two is an error.
fn parse_child(
    span: Span<'_>,
    parent_id: NodeId,
    tree: &mut Tree,
) -> Result<(), TreeParseError> {
    let span = span.trim();
    let layout = child_layout(span);

    if layout.stray_close
        || layout.final_depth != 0
        || layout.open.is_some() != layout.close.is_some()
    {
        return Err(TreeParseError::Unbalanced {
            begin: span.begin(),
            end: span.end(),
        });
    }

    let (head, length, length_comment) = match layout.colon {
        Some(colon) => {
            let (length, comment) =
                parse_branch_length(span.sub(colon + 1, span.end()))?;
            (span.sub(span.begin(), colon), length, comment)
        }
        None => (span, None, None),
    };

    let clade = match (layout.open, layout.close) {
        (Some(open), Some(close)) => {
            if open != span.begin() {
                return Err(TreeParseError::Syntax {
                    expected: "'(' at the start of a clade",
                    position: span.begin(),
                });
            }
            Some(span.sub(open, close + 1))
        }
        _ => None,
    };

    let label_begin = clade.map_or(head.begin(), |clade| clade.end());
    let (label, label_comment) = split_comment(head.sub(label_begin, head.end()));
    let name = remove_quotes(label.as_str());

    let node_id = tree.add_new_node(Some(name));
    if let Some(comment) = label_comment.or(length_comment)
        && let Some(node) = tree.node_mut(node_id)
    {
        node.set_comment(comment);
    }
    let _ = tree.connect(parent_id, node_id, length, None)?;

    if let Some(clade) = clade {
        parse_clade(clade.inner(), node_id, tree)?;
    }
    Ok(())
}

/// Moves numeric names of non-root internal nodes onto the support of the
/// edge above them.
fn move_numeric_labels_to_support(tree: &mut Tree) {
    for node_id in tree.internal_nodes() {
        let Some(parent_link) = tree.parent_link(node_id) else {
            continue;
        };
        let Some(support) =
            tree.name(node_id).as_deref().and_then(support_value)
        else {
            continue;
        };
        if let Some(edge) = tree.edge_mut(parent_link.edge_id) {
            edge.set_support(Some(support));
        }
        if let Some(node) = tree.node_mut(node_id) {
            node.set_name(<Option<&str>>::None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_layout_finds_clade_and_colon() {
        let layout = child_layout(Span::whole("(A:1,B)x:0.5"));
        assert_eq!(layout.open, Some(0));
        assert_eq!(layout.close, Some(6));
        assert_eq!(layout.colon, Some(8));
        assert!(!layout.stray_close);
        assert_eq!(layout.final_depth, 0);
    }

    #[test]
    fn child_layout_ignores_colons_in_comments() {
        let layout = child_layout(Span::whole("A[&&NHX:S=x]:0.5"));
        assert_eq!(layout.colon, Some(12));
    }

    #[test]
    fn child_layout_flags_lonely_parentheses() {
        assert!(child_layout(Span::whole("A)")).stray_close);
        assert_eq!(child_layout(Span::whole("(A")).final_depth, 1);
    }
}
