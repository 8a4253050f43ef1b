use super::TreeFloat;
use super::edge::EdgeId;
use slotmap::new_key_type;
use std::{fmt::Display, sync::Arc};

new_key_type! { pub struct NodeId; }

/// One adjacency of a node: the neighbor and the edge leading to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub node_id: NodeId,
    pub edge_id: EdgeId,
}

impl Link {
    pub fn new(node_id: NodeId, edge_id: EdgeId) -> Self { Self { node_id, edge_id } }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    node_id: Option<NodeId>,
    index: usize,
    name: Option<Arc<str>>,
    comment: String,
    links: Vec<Link>,
    depth: Option<TreeFloat>,
}

impl Node {
    pub fn new() -> Self { Self::default() }
    pub fn node_id(&self) -> Option<&NodeId> { self.node_id.as_ref() }
    pub(crate) fn set_node_id(&mut self, node_id: NodeId) { self.node_id = Some(node_id); }
    pub fn index(&self) -> usize { self.index }
    pub(crate) fn set_index(&mut self, index: usize) { self.index = index; }
    pub fn name(&self) -> Option<Arc<str>> { self.name.clone() }
    pub fn has_name(&self) -> bool { self.name.as_deref().is_some_and(|name| !name.is_empty()) }

    pub fn set_name<'a>(&mut self, name: Option<impl Into<&'a str>>) {
        self.name = name.map(Into::<&str>::into).filter(|name| !name.is_empty()).map(Arc::from);
    }

    pub fn comment(&self) -> &str { &self.comment }
    pub fn set_comment(&mut self, comment: impl Into<String>) { self.comment = comment.into(); }
    pub fn clear_comment(&mut self) { self.comment.clear(); }
    pub fn depth(&self) -> Option<TreeFloat> { self.depth }
    pub(crate) fn set_depth(&mut self, depth: Option<TreeFloat>) { self.depth = depth; }
    pub fn links(&self) -> &[Link] { &self.links }
    pub fn degree(&self) -> usize { self.links.len() }
    pub fn is_tip(&self) -> bool { self.links.len() == 1 }
    pub(crate) fn add_link(&mut self, link: Link) { self.links.push(link) }

    pub fn neighbor_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().map(|link| link.node_id)
    }

    pub fn link_to(&self, node_id: NodeId) -> Option<&Link> {
        self.links.iter().find(|link| link.node_id == node_id)
    }

    pub fn has_link(&self, link: Link) -> bool { self.links.contains(&link) }

    /// Swaps `old` for `new` at the same position in the link list.
    pub(crate) fn replace_link(&mut self, old: Link, new: Link) -> bool {
        match self.links.iter_mut().find(|link| **link == old) {
            Some(link) => {
                *link = new;
                true
            }
            None => false,
        }
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        let mut node = Node::default();
        node.set_name(Some(value.as_str()));
        node
    }
}

impl<'a> From<&'a str> for Node {
    fn from(value: &'a str) -> Self {
        let mut node = Node::default();
        node.set_name(Some(value));
        node
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}

impl From<NodeId> for String {
    fn from(node_id: NodeId) -> Self { format!("{node_id}") }
}
