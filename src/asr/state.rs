use super::alphabet::Alphabet;

/// Votes per alphabet index at one site of one node.
///
/// Pass outputs hold 0/1 entries; the sums built while combining children
/// hold counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AncestralState {
    counts: Vec<u32>,
}

/// One [AncestralState] per alignment site.
pub type AncestralSequence = Vec<AncestralState>;

impl AncestralState {
    pub fn zeros(width: usize) -> Self {
        Self { counts: vec![0; width] }
    }

    /// The set holding only `index`.
    pub fn single(index: usize, width: usize) -> Self {
        let mut state = Self::zeros(width);
        state.vote(index);
        state
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn width(&self) -> usize {
        self.counts.len()
    }

    pub fn vote(&mut self, index: usize) {
        if let Some(count) = self.counts.get_mut(index) {
            *count = 1;
        }
    }

    /// Adds `other` elementwise.
    pub fn accumulate(&mut self, other: &AncestralState) {
        for (count, added) in self.counts.iter_mut().zip(&other.counts) {
            *count += added;
        }
    }

    /// Elementwise difference, floored at zero.
    pub fn without(&self, other: &AncestralState) -> AncestralState {
        Self {
            counts: self
                .counts
                .iter()
                .zip(&other.counts)
                .map(|(count, removed)| count.saturating_sub(*removed))
                .collect(),
        }
    }

    /// Keeps the indices holding the maximum count, as a 0/1 set, and
    /// returns that maximum. A sum without any vote stays empty.
    pub fn max_rule(&self) -> (AncestralState, u32) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return (Self::zeros(self.width()), 0);
        }
        let counts = self
            .counts
            .iter()
            .map(|&count| u32::from(count == max))
            .collect();
        (Self { counts }, max)
    }

    pub fn intersection(&self, other: &AncestralState) -> AncestralState {
        Self {
            counts: self
                .counts
                .iter()
                .zip(&other.counts)
                .map(|(&a, &b)| u32::from(a > 0 && b > 0))
                .collect(),
        }
    }

    /// Indices with a positive count, ascending.
    pub fn members(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn cardinality(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.counts.get(index).is_some_and(|&count| count > 0)
    }

    pub fn is_subset_of(&self, other: &AncestralState) -> bool {
        self.members().into_iter().all(|index| other.contains(index))
    }

    /// One symbol for a single member, `{...}` for several, the wildcard for
    /// none.
    pub fn to_symbols(&self, alphabet: &Alphabet) -> String {
        let members = self.members();
        let symbols: String = members
            .iter()
            .filter_map(|&index| alphabet.symbol(index))
            .map(char::from)
            .collect();
        match members.len() {
            0 => char::from(alphabet.wildcard()).to_string(),
            1 => symbols,
            _ => format!("{{{symbols}}}"),
        }
    }
}
