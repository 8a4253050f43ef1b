// -------------------------------------
// #![allow(dead_code)]
// #![allow(unused_mut)]
// #![allow(unused_imports)]
// #![allow(unused_variables)]
// #![allow(clippy::type_complexity)]
// #![allow(clippy::too_many_arguments)]
// #![allow(clippy::needless_range_loop)]
// -------------------------------------

mod asr;
mod parsers;
mod phylo;

pub type TreeFloat = f64;

pub use asr::AsrError;
pub use asr::alignment::Alignment;
pub use asr::alignment::AlignmentError;
pub use asr::alphabet::Alphabet;
pub use asr::alphabet::AlphabetKind;
pub use asr::parsimony::AsrOptions;
pub use asr::parsimony::AsrReport;
pub use asr::parsimony::NodeStates;
pub use asr::parsimony::ParsimonyAlgorithm;
pub use asr::parsimony::acctran;
pub use asr::parsimony::annotate;
pub use asr::parsimony::count_changes;
pub use asr::parsimony::deltran;
pub use asr::parsimony::downpass;
pub use asr::parsimony::parsimony_asr;
pub use asr::parsimony::parsimony_asr_with;
pub use asr::parsimony::resolve_all;
pub use asr::parsimony::uppass;
pub use asr::state::AncestralSequence;
pub use asr::state::AncestralState;
pub use parsers::TreeParseError;
pub use parsers::parse_newick;
pub use parsers::parse_newick_trees;
pub use parsers::read_newick_file;
pub use parsers::write_newick;
pub use phylo::Edge;
pub use phylo::EdgeId;
pub use phylo::Link;
pub use phylo::Node;
pub use phylo::NodeId;
pub use phylo::Tree;
pub use phylo::TreeError;
pub use phylo::random_binary_tree;
