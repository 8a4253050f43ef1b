pub(crate) mod newick;

use super::phylo::TreeError;
use thiserror::Error;

pub use newick::parse_newick;
pub use newick::parse_newick_trees;
pub use newick::read_newick_file;
pub use newick::write_newick;

/// Failure to turn NEWICK text into a [Tree](super::phylo::Tree).
///
/// Offsets are byte positions into the text handed to the parser.
#[derive(Debug, Error)]
pub enum TreeParseError {
    #[error("NEWICK syntax error at byte {position}: expected {expected}.")]
    Syntax { expected: &'static str, position: usize },
    #[error("Unbalanced parentheses in bytes {begin}..{end}.")]
    Unbalanced { begin: usize, end: usize },
    #[error("Cannot parse branch length '{text}' at bytes {begin}..{end}.")]
    InvalidBranchLength { text: String, begin: usize, end: usize },
    #[error(transparent)]
    TreeError(#[from] TreeError),
    #[error("Cannot read NEWICK input: {0}")]
    Io(#[from] std::io::Error),
}
