use super::TreeFloat;
use super::node::NodeId;
use slotmap::new_key_type;
use std::fmt::Display;

new_key_type! { pub struct EdgeId; }

/// A branch between two nodes. `left` is the endpoint nearer the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    edge_id: Option<EdgeId>,
    left: NodeId,
    right: NodeId,
    length: Option<TreeFloat>,
    support: Option<TreeFloat>,
}

impl Edge {
    pub(crate) fn new(left: NodeId, right: NodeId) -> Self {
        Self { edge_id: None, left, right, length: None, support: None }
    }

    pub fn edge_id(&self) -> Option<&EdgeId> { self.edge_id.as_ref() }
    pub(crate) fn set_edge_id(&mut self, edge_id: EdgeId) { self.edge_id = Some(edge_id); }
    pub fn left(&self) -> NodeId { self.left }
    pub fn right(&self) -> NodeId { self.right }
    pub fn length(&self) -> Option<TreeFloat> { self.length }
    pub fn set_length(&mut self, length: Option<TreeFloat>) { self.length = length; }
    pub fn support(&self) -> Option<TreeFloat> { self.support }
    pub fn set_support(&mut self, support: Option<TreeFloat>) { self.support = support; }

    pub fn connects(&self, node_id: NodeId) -> bool { self.left == node_id || self.right == node_id }

    /// Returns the endpoint opposite to `node_id`.
    pub fn other(&self, node_id: NodeId) -> Option<NodeId> {
        if self.left == node_id {
            Some(self.right)
        } else if self.right == node_id {
            Some(self.left)
        } else {
            None
        }
    }

    pub(crate) fn set_right(&mut self, right: NodeId) { self.right = right; }

    pub(crate) fn orient(&mut self, left: NodeId) {
        if self.right == left {
            std::mem::swap(&mut self.left, &mut self.right);
        }
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}
