use super::AsrError;
use super::alignment::Alignment;
use super::alphabet::Alphabet;
use super::state::{AncestralSequence, AncestralState};
use crate::phylo::{NodeId, Tree, TreeError};

use rand::Rng;
use rayon::prelude::*;
use slotmap::SecondaryMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// State sets of every node for one pass.
pub type NodeStates = SecondaryMap<NodeId, AncestralSequence>;

/// How ambiguous ancestral states are settled after the UPPASS.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ParsimonyAlgorithm {
    /// UPPASS sets only.
    None,
    #[default]
    Downpass,
    /// DOWNPASS sets narrowed towards each parent's state.
    Deltran,
    /// UPPASS sets narrowed towards each parent's state.
    Acctran,
}

impl FromStr for ParsimonyAlgorithm {
    type Err = AsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(ParsimonyAlgorithm::None),
            "DOWNPASS" => Ok(ParsimonyAlgorithm::Downpass),
            "DELTRAN" => Ok(ParsimonyAlgorithm::Deltran),
            "ACCTRAN" => Ok(ParsimonyAlgorithm::Acctran),
            _ => Err(AsrError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl Display for ParsimonyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ParsimonyAlgorithm::None => "NONE",
                ParsimonyAlgorithm::Downpass => "DOWNPASS",
                ParsimonyAlgorithm::Deltran => "DELTRAN",
                ParsimonyAlgorithm::Acctran => "ACCTRAN",
            }
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AsrOptions {
    pub algorithm: ParsimonyAlgorithm,
    /// Collapse every ambiguous set to one of its members, drawn uniformly.
    pub random_resolve: bool,
}

impl AsrOptions {
    pub fn new(algorithm: ParsimonyAlgorithm, random_resolve: bool) -> Self {
        Self { algorithm, random_resolve }
    }

    pub fn from_name(name: &str, random_resolve: bool) -> Result<Self, AsrError> {
        Ok(Self::new(name.parse()?, random_resolve))
    }
}

/// Per-site counts from one reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsrReport {
    /// Minimum number of state changes per site, from the UPPASS.
    pub steps: Vec<usize>,
    /// Edges per site whose parent and child sets share no state in the
    /// final assignment. Equals the substitutions of the assignment once
    /// every set is resolved to one state.
    pub changes: Vec<usize>,
}

impl AsrReport {
    /// The parsimony score.
    pub fn total_steps(&self) -> usize {
        self.steps.iter().sum()
    }

    pub fn total_changes(&self) -> usize {
        self.changes.iter().sum()
    }
}

/// Reconstructs ancestral states and writes them to the node comments.
///
/// **Arguments:**
/// - `tree` - rooted tree; every tip must be named after a sequence in
///   `alignment`
/// - `alignment` - observed sequences and their alphabet
/// - `algorithm` - the pass settling ambiguous sets after the UPPASS
/// - `random_resolve` - collapse remaining ambiguity using `rng`
///
/// **Returns:**
/// - `Ok(AsrReport)` - per-site step counts; every node comment now holds
///   one symbol, `{...}` or the wildcard per site
/// - `Err(AsrError)` - no root, a root without children, an unnamed tip or
///   a tip without sequence; the tree is left untouched
pub fn parsimony_asr<R: Rng + ?Sized>(
    tree: &mut Tree,
    alignment: &Alignment,
    algorithm: ParsimonyAlgorithm,
    random_resolve: bool,
    rng: &mut R,
) -> Result<AsrReport, AsrError> {
    parsimony_asr_with(
        tree,
        alignment,
        &AsrOptions::new(algorithm, random_resolve),
        rng,
    )
}

pub fn parsimony_asr_with<R: Rng + ?Sized>(
    tree: &mut Tree,
    alignment: &Alignment,
    options: &AsrOptions,
    rng: &mut R,
) -> Result<AsrReport, AsrError> {
    debug!(
        algorithm = %options.algorithm,
        random_resolve = options.random_resolve,
        sites = alignment.length(),
        "starting parsimony reconstruction"
    );

    let (up, steps) = uppass(tree, alignment)?;
    let rng = if options.random_resolve { Some(rng) } else { None };

    let states = match options.algorithm {
        ParsimonyAlgorithm::None => resolve_all(tree, up, rng),
        ParsimonyAlgorithm::Downpass => resolve_all(tree, downpass(tree, &up), rng),
        ParsimonyAlgorithm::Deltran => deltran(tree, &downpass(tree, &up), rng),
        ParsimonyAlgorithm::Acctran => acctran(tree, &up, rng),
    };

    let changes = count_changes(tree, &states, alignment.length());
    annotate(tree, &states, alignment.alphabet());

    let report = AsrReport { steps, changes };
    debug!(score = report.total_steps(), "finished parsimony reconstruction");
    Ok(report)
}

// =============================================================================
// Passes
// =============================================================================

/// Postorder pass computing each node's subtree sets and per-site steps.
///
/// Tip sets come from the observed symbols, ambiguity codes expanded. An
/// internal node keeps the states most of its children vote for; every
/// child without a vote for them costs a step, including a child with no
/// state at all. A site where no child has any state costs nothing. A root
/// that is itself a named leaf keeps its observed sets and is charged
/// against its children like one more child.
pub fn uppass(
    tree: &Tree,
    alignment: &Alignment,
) -> Result<(NodeStates, Vec<usize>), AsrError> {
    let root = tree.root().ok_or(TreeError::NoRoot)?;
    if tree.child_ids(root).is_empty() {
        return Err(AsrError::RootIsTip);
    }

    let alphabet = alignment.alphabet();
    let width = alphabet.len();
    let site_count = alignment.length();
    let order = tree.postorder();

    // Look every tip up first so a missing sequence fails before any work.
    let mut observed: SecondaryMap<NodeId, (&str, &[u8])> = SecondaryMap::new();
    let names: Vec<(NodeId, std::sync::Arc<str>)> = order
        .iter()
        .filter(|&&node_id| tree.is_tip(node_id))
        .map(|&node_id| match tree.name(node_id) {
            Some(name) => Ok((node_id, name)),
            None => Err(AsrError::UnnamedTip {
                index: tree.node(node_id).map_or(0, |n| n.index()),
            }),
        })
        .collect::<Result<_, _>>()?;
    for (node_id, name) in &names {
        let sequence = alignment.sequence_for_name(name).ok_or_else(|| {
            AsrError::MissingSequence { name: name.to_string() }
        })?;
        let _ = observed.insert(*node_id, (name.as_ref(), sequence));
    }

    let mut up: NodeStates = SecondaryMap::new();
    let mut steps: Vec<usize> = vec![0; site_count];

    for &node_id in &order {
        let observation = observed
            .get(node_id)
            .map(|&(name, sequence)| tip_sequence(name, sequence, alphabet));

        let child_ids = tree.child_ids(node_id);
        if child_ids.is_empty() {
            if let Some(sequence) = observation {
                let _ = up.insert(node_id, sequence);
            }
            continue;
        }

        let mut voters: Vec<&AncestralSequence> =
            child_ids.iter().filter_map(|&child_id| up.get(child_id)).collect();
        if let Some(sequence) = &observation {
            voters.push(sequence);
        }

        let (sequence, node_steps): (AncestralSequence, Vec<usize>) = (0
            ..site_count)
            .into_par_iter()
            .map(|site| {
                let mut sum = AncestralState::zeros(width);
                for voter in &voters {
                    sum.accumulate(&voter[site]);
                }
                let (state, max) = sum.max_rule();
                let missed = match max {
                    0 => 0,
                    max => voters.len().saturating_sub(max as usize),
                };
                (state, missed)
            })
            .unzip();

        for (total, added) in steps.iter_mut().zip(node_steps) {
            *total += added;
        }
        let _ = up.insert(node_id, observation.unwrap_or(sequence));
    }

    Ok((up, steps))
}

fn tip_sequence(name: &str, sequence: &[u8], alphabet: &Alphabet) -> AncestralSequence {
    sequence
        .par_iter()
        .enumerate()
        .map(|(site, &symbol)| {
            let mut state = AncestralState::zeros(alphabet.len());
            match alphabet.expand(symbol) {
                Some(indices) => {
                    for &index in indices {
                        state.vote(index);
                    }
                }
                None => warn!(
                    tip = name,
                    site,
                    symbol = %char::from(symbol),
                    "unknown character state, vote dropped"
                ),
            }
            state
        })
        .collect()
}

/// Preorder pass giving every internal node the states most of its
/// neighbors vote for, looking at the whole tree rather than its subtree.
///
/// The outer set of a child (what the tree outside its subtree votes for)
/// is its parent's outer set plus the subtree sets of its siblings, under
/// the same max rule. Tips keep their observed sets; a root that is a
/// named leaf stands in for the outer set of its children.
pub fn downpass(tree: &Tree, up: &NodeStates) -> NodeStates {
    let (site_count, width) = dimensions(up);
    let mut outer: NodeStates = SecondaryMap::new();
    let mut down: NodeStates = SecondaryMap::new();

    for node_id in tree.preorder() {
        let Some(own) = up.get(node_id) else {
            continue;
        };
        let child_ids = tree.child_ids(node_id);
        if child_ids.is_empty() {
            let _ = down.insert(node_id, own.clone());
            continue;
        }

        let observed = tree.is_tip(node_id);
        let above = if observed { Some(own) } else { outer.get(node_id) };
        let totals: Vec<AncestralState> = (0..site_count)
            .into_par_iter()
            .map(|site| {
                let mut total = match above {
                    Some(sequence) => sequence[site].clone(),
                    None => AncestralState::zeros(width),
                };
                for &child_id in &child_ids {
                    if let Some(sequence) = up.get(child_id) {
                        total.accumulate(&sequence[site]);
                    }
                }
                total
            })
            .collect();

        let final_sequence: AncestralSequence = if observed {
            own.clone()
        } else {
            totals.par_iter().map(|total| total.max_rule().0).collect()
        };
        let _ = down.insert(node_id, final_sequence);

        for &child_id in &child_ids {
            let Some(child) = up.get(child_id) else {
                continue;
            };
            let sequence: AncestralSequence = totals
                .par_iter()
                .zip(child.par_iter())
                .map(|(total, own)| total.without(own).max_rule().0)
                .collect();
            let _ = outer.insert(child_id, sequence);
        }
    }

    down
}

/// Delayed transformation: narrows each DOWNPASS set to what it shares
/// with the parent's result, pushing changes towards the tips.
pub fn deltran<R: Rng + ?Sized>(
    tree: &Tree,
    down: &NodeStates,
    rng: Option<&mut R>,
) -> NodeStates {
    narrow_towards_parent(tree, down, rng)
}

/// Accelerated transformation: narrows each UPPASS set to what it shares
/// with the parent's result, pushing changes towards the root.
pub fn acctran<R: Rng + ?Sized>(
    tree: &Tree,
    up: &NodeStates,
    rng: Option<&mut R>,
) -> NodeStates {
    narrow_towards_parent(tree, up, rng)
}

/// Preorder: a node's set becomes its intersection with the parent's
/// result when that is nonempty. With `rng`, each node is resolved before
/// its children see it.
fn narrow_towards_parent<R: Rng + ?Sized>(
    tree: &Tree,
    own: &NodeStates,
    mut rng: Option<&mut R>,
) -> NodeStates {
    let mut result: NodeStates = SecondaryMap::new();

    for node_id in tree.preorder() {
        let Some(own_sequence) = own.get(node_id) else {
            continue;
        };

        let mut sequence: AncestralSequence =
            match tree.parent_id(node_id).and_then(|p| result.get(p)) {
                Some(parent_sequence) => own_sequence
                    .par_iter()
                    .zip(parent_sequence.par_iter())
                    .map(|(state, parent_state)| {
                        let shared = state.intersection(parent_state);
                        if shared.is_empty() { state.clone() } else { shared }
                    })
                    .collect(),
                None => own_sequence.clone(),
            };

        if let Some(rng) = rng.as_deref_mut() {
            resolve_sequence(&mut sequence, rng);
        }
        let _ = result.insert(node_id, sequence);
    }

    result
}

/// Resolves every node in preorder when `rng` is given.
pub fn resolve_all<R: Rng + ?Sized>(
    tree: &Tree,
    mut states: NodeStates,
    rng: Option<&mut R>,
) -> NodeStates {
    if let Some(rng) = rng {
        for node_id in tree.preorder() {
            if let Some(sequence) = states.get_mut(node_id) {
                resolve_sequence(sequence, rng);
            }
        }
    }
    states
}

/// Replaces every set with more than one member by one member drawn
/// uniformly.
fn resolve_sequence<R: Rng + ?Sized>(
    sequence: &mut AncestralSequence,
    rng: &mut R,
) {
    for state in sequence.iter_mut() {
        let members = state.members();
        if members.len() > 1 {
            let pick = members[rng.gen_range(0..members.len())];
            *state = AncestralState::single(pick, state.width());
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Counts, per site, the edges whose endpoint sets are both nonempty and
/// disjoint.
pub fn count_changes(tree: &Tree, states: &NodeStates, site_count: usize) -> Vec<usize> {
    let mut changes: Vec<usize> = vec![0; site_count];
    for node_id in tree.preorder() {
        let Some(parent_id) = tree.parent_id(node_id) else {
            continue;
        };
        let (Some(child), Some(parent)) = (states.get(node_id), states.get(parent_id)) else {
            continue;
        };
        for (site, (child_state, parent_state)) in child.iter().zip(parent).enumerate() {
            if !child_state.is_empty()
                && !parent_state.is_empty()
                && child_state.intersection(parent_state).is_empty()
            {
                changes[site] += 1;
            }
        }
    }
    changes
}

/// Writes each node's sets to its comment, site after site.
pub fn annotate(tree: &mut Tree, states: &NodeStates, alphabet: &Alphabet) {
    let comments: Vec<(NodeId, String)> = states
        .iter()
        .map(|(node_id, sequence)| {
            let comment: String = sequence
                .par_iter()
                .map(|state| state.to_symbols(alphabet))
                .collect();
            (node_id, comment)
        })
        .collect();

    for (node_id, comment) in comments {
        if let Some(node) = tree.node_mut(node_id) {
            node.set_comment(comment);
        }
    }
}

/// Number of sites and state width of a pass output.
fn dimensions(states: &NodeStates) -> (usize, usize) {
    states
        .values()
        .next()
        .map(|sequence| {
            (sequence.len(), sequence.first().map_or(0, AncestralState::width))
        })
        .unwrap_or((0, 0))
}
