mod edge;
mod node;
mod random;
mod tree;

pub type TreeFloat = f64;

pub use edge::{Edge, EdgeId};
pub use node::{Link, Node, NodeId};
pub use random::random_binary_tree;
pub use tree::{Tree, TreeError};
