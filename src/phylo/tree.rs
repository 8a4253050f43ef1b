use super::TreeFloat;
use super::edge::{Edge, EdgeId};
use super::node::{Link, Node, NodeId};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Default, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    edges: SlotMap<EdgeId, Edge>,
    root: Option<NodeId>,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node with NodeId: {0} is not part of this tree.")]
    NodeNotInTree(NodeId),
    #[error("Edge with EdgeId: {0} is not part of this tree.")]
    EdgeNotInTree(EdgeId),
    #[error("Edge {0} is not referenced by the links of its endpoints.")]
    InconsistentEdge(EdgeId),
    #[error("No node of degree 3 to root the tree on.")]
    NoTrifurcation,
    #[error("Cannot build a random tree with {0} tips; at least 2 are needed.")]
    TooFewTips(usize),
    #[error("Tree has no root.")]
    NoRoot,
    #[error("Tree validation failed: {0}.")]
    InvalidTree(String),
}

impl Tree {
    // =========================================================================
    // Construction & Validation
    // =========================================================================

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_new_node<'a>(
        &mut self,
        name: Option<impl Into<&'a str>>,
    ) -> NodeId {
        let mut node = Node::default();
        node.set_name(name);
        self.add_node(node)
    }

    /// Inserts a detached node; its index is the current node count.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.set_index(self.nodes.len());
        self.nodes.insert_with_key(|node_id| {
            node.set_node_id(node_id);
            node
        })
    }

    /// Connects `left` (parent side) to `right` with a new edge.
    pub fn connect(
        &mut self,
        left: NodeId,
        right: NodeId,
        length: Option<TreeFloat>,
        support: Option<TreeFloat>,
    ) -> Result<EdgeId, TreeError> {
        for node_id in [left, right] {
            if !self.nodes.contains_key(node_id) {
                return Err(TreeError::NodeNotInTree(node_id));
            }
        }

        let mut edge = Edge::new(left, right);
        edge.set_length(length);
        edge.set_support(support);
        let edge_id = self.edges.insert_with_key(|edge_id| {
            edge.set_edge_id(edge_id);
            edge
        });

        self.nodes[left].add_link(Link::new(right, edge_id));
        self.nodes[right].add_link(Link::new(left, edge_id));
        Ok(edge_id)
    }

    /// Sets the root without touching edge orientation.
    pub(crate) fn set_root(&mut self, node_id: NodeId) {
        self.root = Some(node_id);
    }

    /// Checks link symmetry, connectivity, acyclicity and that every edge
    /// points away from the root.
    pub fn validate(&self) -> Result<(), TreeError> {
        for (edge_id, edge) in &self.edges {
            let left_ok = self
                .nodes
                .get(edge.left())
                .is_some_and(|n| n.has_link(Link::new(edge.right(), edge_id)));
            let right_ok = self
                .nodes
                .get(edge.right())
                .is_some_and(|n| n.has_link(Link::new(edge.left(), edge_id)));
            if !left_ok || !right_ok {
                return Err(TreeError::InconsistentEdge(edge_id));
            }
        }

        for node in self.nodes.values() {
            for link in node.links() {
                if !self.edges.contains_key(link.edge_id) {
                    return Err(TreeError::EdgeNotInTree(link.edge_id));
                }
            }
        }

        if self.nodes.is_empty() {
            return Ok(());
        }

        if self.edges.len() + 1 != self.nodes.len() {
            return Err(TreeError::InvalidTree(format!(
                "{} nodes and {} edges cannot form a tree",
                self.nodes.len(),
                self.edges.len()
            )));
        }

        let root = self.root.ok_or(TreeError::NoRoot)?;
        let order = self.preorder();
        if order.len() != self.nodes.len() {
            return Err(TreeError::InvalidTree(format!(
                "only {} of {} nodes are reachable from the root",
                order.len(),
                self.nodes.len()
            )));
        }

        if self.parent_link(root).is_some() {
            return Err(TreeError::InvalidTree(
                "root has an incoming edge".to_string(),
            ));
        }
        for node_id in order.into_iter().skip(1) {
            if self.parent_link(node_id).is_none() {
                return Err(TreeError::InvalidTree(format!(
                    "node {node_id} has no edge oriented towards it"
                )));
            }
        }

        Ok(())
    }

    // =========================================================================
    // Tree Properties
    // =========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn tip_count(&self) -> usize {
        self.nodes.keys().filter(|&node_id| self.is_tip(node_id)).count()
    }

    pub fn has_branch_lengths(&self) -> bool {
        !self.edges.is_empty() && self.edges.values().all(|e| e.length().is_some())
    }

    pub fn sum_branch_lengths(&self) -> TreeFloat {
        self.edges.values().filter_map(|e| e.length()).sum()
    }

    // =========================================================================
    // Node & Edge Access
    // =========================================================================

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn node_exists(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    pub fn edge_mut(&mut self, edge_id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(edge_id)
    }

    pub fn node_ids_all(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    pub fn edge_ids_all(&self) -> Vec<EdgeId> {
        self.edges.keys().collect()
    }

    pub fn name(&self, node_id: NodeId) -> Option<Arc<str>> {
        self.nodes.get(node_id)?.name()
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name().as_deref() == Some(name))
            .map(|(node_id, _)| node_id)
    }

    /// A node with a single neighbor. The root counts only when named, as
    /// after rooting on a leaf; an unnamed root above a single clade does
    /// not.
    pub fn is_tip(&self, node_id: NodeId) -> bool {
        self.nodes.get(node_id).is_some_and(|n| {
            n.is_tip() && (self.root != Some(node_id) || n.has_name())
        })
    }

    pub fn degree(&self, node_id: NodeId) -> usize {
        self.nodes.get(node_id).map_or(0, |n| n.degree())
    }

    /// Tips in preorder when the tree is rooted, arena order otherwise.
    pub fn tips(&self) -> Vec<NodeId> {
        self.traversal_order()
            .into_iter()
            .filter(|&node_id| self.is_tip(node_id))
            .collect()
    }

    pub fn tip_names(&self) -> Vec<Arc<str>> {
        self.tips()
            .into_iter()
            .filter_map(|node_id| self.name(node_id))
            .collect()
    }

    pub fn internal_nodes(&self) -> Vec<NodeId> {
        self.traversal_order()
            .into_iter()
            .filter(|&node_id| !self.is_tip(node_id))
            .collect()
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// The link from `node_id` to its parent, following edge orientation.
    pub fn parent_link(&self, node_id: NodeId) -> Option<Link> {
        self.nodes
            .get(node_id)?
            .links()
            .iter()
            .find(|link| {
                self.edges
                    .get(link.edge_id)
                    .is_some_and(|edge| edge.right() == node_id)
            })
            .copied()
    }

    pub fn parent_id(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent_link(node_id).map(|link| link.node_id)
    }

    pub fn child_links(&self, node_id: NodeId) -> Vec<Link> {
        match self.nodes.get(node_id) {
            Some(node) => node
                .links()
                .iter()
                .filter(|link| {
                    self.edges
                        .get(link.edge_id)
                        .is_some_and(|edge| edge.left() == node_id)
                })
                .copied()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn child_ids(&self, node_id: NodeId) -> Vec<NodeId> {
        self.child_links(node_id)
            .into_iter()
            .map(|link| link.node_id)
            .collect()
    }

    // =========================================================================
    // Traversals
    // =========================================================================

    /// Nodes reachable from the root, parents before children, children in
    /// link order.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_with(false)
    }

    /// Nodes reachable from the root, children before parents.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = self.preorder_with(true);
        order.reverse();
        order
    }

    fn preorder_with(&self, reverse_children: bool) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut stack: Vec<NodeId> = vec![root];
        while let Some(node_id) = stack.pop() {
            order.push(node_id);
            let mut children = self.child_ids(node_id);
            if !reverse_children {
                children.reverse();
            }
            stack.extend(children);
        }
        order
    }

    fn traversal_order(&self) -> Vec<NodeId> {
        if self.root.is_some() {
            self.preorder()
        } else {
            self.node_ids_all()
        }
    }

    // =========================================================================
    // Rooting Operations
    // =========================================================================

    pub fn is_rooted(&self) -> bool {
        self.root.is_some()
    }

    /// Roots the tree on `node_id` and points every edge away from it.
    pub fn reroot(&mut self, node_id: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(node_id) {
            return Err(TreeError::NodeNotInTree(node_id));
        }
        self.root = Some(node_id);
        self.reorient_edges();
        self.update_node_indices();
        Ok(())
    }

    /// Roots the tree on the first node of degree 3.
    pub fn reroot_first(&mut self) -> Result<NodeId, TreeError> {
        let node_id = self
            .traversal_order()
            .into_iter()
            .find(|&node_id| self.degree(node_id) == 3)
            .ok_or(TreeError::NoTrifurcation)?;
        self.reroot(node_id)?;
        Ok(node_id)
    }

    /// Walks the graph from the root, ignoring the current orientation, and
    /// sets every edge's `left` endpoint to the node reached first.
    fn reorient_edges(&mut self) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack: Vec<(NodeId, Option<EdgeId>)> = vec![(root, None)];
        while let Some((node_id, via)) = stack.pop() {
            let links = self.nodes[node_id].links().to_vec();
            for link in links {
                if Some(link.edge_id) == via {
                    continue;
                }
                self.edges[link.edge_id].orient(node_id);
                stack.push((link.node_id, Some(link.edge_id)));
            }
        }
    }

    /// Renumbers nodes densely: preorder first, unreachable nodes after.
    pub fn update_node_indices(&mut self) {
        let order = self.preorder();
        let mut index: usize = 0;
        for &node_id in &order {
            self.nodes[node_id].set_index(index);
            index += 1;
        }
        if order.len() != self.nodes.len() {
            let reached: FxHashSet<NodeId> = order.into_iter().collect();
            for (node_id, node) in self.nodes.iter_mut() {
                if !reached.contains(&node_id) {
                    node.set_index(index);
                    index += 1;
                }
            }
        }
    }

    // =========================================================================
    // Topology Mutation
    // =========================================================================

    /// Splits `edge_id` at its midpoint with a new internal node and hangs
    /// `new_tip` from it on an edge of length 1. Returns the new internal
    /// node.
    pub fn graft_tip_on_edge(
        &mut self,
        new_tip: NodeId,
        edge_id: EdgeId,
    ) -> Result<NodeId, TreeError> {
        if !self.nodes.contains_key(new_tip) {
            return Err(TreeError::NodeNotInTree(new_tip));
        }
        let edge = self
            .edges
            .get(edge_id)
            .ok_or(TreeError::EdgeNotInTree(edge_id))?;
        let left = edge.left();
        let right = edge.right();
        let half = edge.length().map(|length| length / 2e0);
        let support = edge.support();

        let consistent = self
            .nodes
            .get(left)
            .is_some_and(|n| n.has_link(Link::new(right, edge_id)))
            && self
                .nodes
                .get(right)
                .is_some_and(|n| n.has_link(Link::new(left, edge_id)));
        if !consistent {
            return Err(TreeError::InconsistentEdge(edge_id));
        }

        let middle = self.add_new_node(<Option<&str>>::None);

        let lower = {
            let mut lower = Edge::new(middle, right);
            lower.set_length(half);
            lower.set_support(support);
            self.edges.insert_with_key(|lower_id| {
                lower.set_edge_id(lower_id);
                lower
            })
        };

        let upper = &mut self.edges[edge_id];
        upper.set_right(middle);
        upper.set_length(half);

        let _ = self.nodes[left]
            .replace_link(Link::new(right, edge_id), Link::new(middle, edge_id));
        let _ = self.nodes[right]
            .replace_link(Link::new(left, edge_id), Link::new(middle, lower));
        self.nodes[middle].add_link(Link::new(left, edge_id));
        self.nodes[middle].add_link(Link::new(right, lower));

        let _ = self.connect(middle, new_tip, Some(1e0), None)?;
        Ok(middle)
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Fills `depth` for every node reachable from the root. A node below an
    /// edge without a length gets no depth.
    pub fn compute_depths(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        self.nodes[root].set_depth(Some(0e0));
        for node_id in self.preorder().into_iter().skip(1) {
            let depth = self.parent_link(node_id).and_then(|link| {
                let parent_depth = self.nodes[link.node_id].depth()?;
                let length = self.edges[link.edge_id].length()?;
                Some(parent_depth + length)
            });
            self.nodes[node_id].set_depth(depth);
        }
    }

    pub fn clear_comments(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_comment();
        }
    }

    pub fn newick(&self) -> String {
        crate::parsers::write_newick(self)
    }

    // =========================================================================
    // Display
    // =========================================================================

    fn print_tree(&self) -> String {
        let mut result: String = String::new();
        result.push_str(&format!(
            "Internal Nodes: {}\nTips: {}\nAll Nodes: {}\n{}\nTree length: {:7.5}\n\n",
            self.node_count() - self.tip_count(),
            self.tip_count(),
            self.node_count(),
            match self.is_rooted() {
                true => "Rooted",
                false => "Unrooted",
            },
            self.sum_branch_lengths(),
        ));

        if let Some(root) = self.root {
            result.push_str(&self.print_node(root, 0));
        }

        result
    }

    fn print_node(&self, node_id: NodeId, level: usize) -> String {
        let mut result: String = String::new();
        let node = &self.nodes[node_id];
        let length = self
            .parent_link(node_id)
            .and_then(|link| self.edges[link.edge_id].length())
            .unwrap_or(TreeFloat::NAN);
        result.push_str(&format!(
            "{}- {} | {} | {:<5.3} | {}\n",
            " ".repeat(level * 4),
            node.index(),
            match node.name() {
                Some(name) => name.to_string(),
                None => "None".to_string(),
            },
            length,
            node.comment(),
        ));

        for child_id in self.child_ids(node_id) {
            result.push_str(&self.print_node(child_id, level + 1));
        }

        result
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.print_tree())
    }
}
