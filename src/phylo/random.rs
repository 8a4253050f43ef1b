use super::TreeFloat;
use super::tree::{Tree, TreeError};
use rand::Rng;

/// Builds a fully resolved binary tree with tips `Tip0..Tip{nbtips - 1}`.
///
/// Starts from three tips around one internal node and grafts every further
/// tip onto an edge drawn uniformly from the edges present at that moment.
/// Branch lengths are then drawn uniformly from `[0, 1)` and the tree is
/// rooted on its first trifurcation. Two tips give a single bifurcating
/// root.
///
/// **Errors:**
/// - `TreeError::TooFewTips` when `nbtips < 2`
pub fn random_binary_tree<R: Rng + ?Sized>(
    nbtips: usize,
    rng: &mut R,
) -> Result<Tree, TreeError> {
    if nbtips < 2 {
        return Err(TreeError::TooFewTips(nbtips));
    }

    let mut tree = Tree::new();
    let center = tree.add_new_node(<Option<&str>>::None);
    tree.set_root(center);

    let first_tip_count = nbtips.min(3);
    let mut edge_ids = Vec::with_capacity(2 * nbtips);
    for tip_index in 0..first_tip_count {
        let tip = tree.add_new_node(Some(tip_name(tip_index).as_str()));
        edge_ids.push(tree.connect(center, tip, None, None)?);
    }

    for tip_index in first_tip_count..nbtips {
        let tip = tree.add_new_node(Some(tip_name(tip_index).as_str()));
        let edge_id = edge_ids[rng.gen_range(0..edge_ids.len())];
        let middle = tree.graft_tip_on_edge(tip, edge_id)?;
        if let Some(node) = tree.node(middle) {
            edge_ids.extend(node.links().iter().skip(1).map(|link| link.edge_id));
        }
    }

    for edge_id in edge_ids {
        if let Some(edge) = tree.edge_mut(edge_id) {
            edge.set_length(Some(rng.gen_range(0e0 as TreeFloat..1e0)));
        }
    }

    if nbtips == 2 {
        tree.reroot(center)?;
    } else {
        let _ = tree.reroot_first()?;
    }

    Ok(tree)
}

fn tip_name(tip_index: usize) -> String {
    format!("Tip{tip_index}")
}
