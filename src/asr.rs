pub(crate) mod alignment;
pub(crate) mod alphabet;
pub(crate) mod parsimony;
pub(crate) mod state;

use super::phylo::TreeError;
use thiserror::Error;

/// Reasons an ancestral state reconstruction stops before touching the tree.
#[derive(Debug, Error)]
pub enum AsrError {
    #[error(
        "Unknown parsimony algorithm '{0}'; expected NONE, DOWNPASS, DELTRAN or ACCTRAN."
    )]
    UnknownAlgorithm(String),
    #[error("Tip '{name}' has no sequence in the alignment.")]
    MissingSequence { name: String },
    #[error("Tip with index {index} has no name to look its sequence up by.")]
    UnnamedTip { index: usize },
    #[error("The root has no children; there is nothing to reconstruct.")]
    RootIsTip,
    #[error(transparent)]
    TreeError(#[from] TreeError),
}
