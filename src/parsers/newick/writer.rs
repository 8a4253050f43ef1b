use crate::{NodeId, Tree};

/// Converts a rooted [Tree] to a NEWICK string.
///
/// Each node is written as its children in parentheses, its name or else
/// the support of the edge above it, its comment in brackets and `:`
/// followed by the length of the edge above it. Support and lengths use 5
/// decimals; missing values are left out. A named node drops its support,
/// which would otherwise run into the name. Returns an empty string for a tree without
/// a root.
pub fn write_newick(tree: &Tree) -> String {
    match tree.root() {
        Some(root_id) => {
            let mut newick = String::new();
            write_node(tree, root_id, &mut newick);
            newick.push(';');
            newick
        }
        None => String::new(),
    }
}

fn write_node(tree: &Tree, node_id: NodeId, newick: &mut String) {
    let child_ids = tree.child_ids(node_id);
    if !child_ids.is_empty() {
        newick.push('(');
        for (position, &child_id) in child_ids.iter().enumerate() {
            if position > 0 {
                newick.push(',');
            }
            write_node(tree, child_id, newick);
        }
        newick.push(')');
    }

    let Some(node) = tree.node(node_id) else {
        return;
    };

    if let Some(name) = node.name() {
        newick.push_str(&quote_if_needed(&name));
    }

    let parent_edge = tree
        .parent_link(node_id)
        .and_then(|link| tree.edge(link.edge_id));

    if !node.has_name()
        && let Some(support) = parent_edge.and_then(|edge| edge.support())
    {
        newick.push_str(&format!("{support:.5}"));
    }

    if !node.comment().is_empty() {
        newick.push_str(&format!("[{}]", node.comment()));
    }

    if let Some(length) = parent_edge.and_then(|edge| edge.length()) {
        newick.push_str(&format!(":{length:.5}"));
    }
}

/// Names with NEWICK delimiters or whitespace are wrapped in quotes.
fn quote_if_needed(name: &str) -> String {
    let needs_quotes = name
        .chars()
        .any(|c| c.is_whitespace() || "()[]{},:;'\"".contains(c));
    if !needs_quotes {
        name.to_string()
    } else if name.contains('\'') {
        format!("\"{name}\"")
    } else {
        format!("'{name}'")
    }
}
