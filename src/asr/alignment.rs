use super::alphabet::Alphabet;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("Sequence name '{0}' occurs more than once.")]
    DuplicateName(String),
    #[error("Sequence '{name}' has {found} sites; the alignment has {expected}.")]
    LengthMismatch { name: String, expected: usize, found: usize },
    #[error("FASTA line {0} holds sequence data before any '>' header.")]
    MissingHeader(usize),
    #[error("FASTA header on line {0} has no name.")]
    EmptyName(usize),
    #[error("No sequences in the FASTA input.")]
    Empty,
}

/// Equal-length sequences keyed by name and by insertion order.
#[derive(Debug, Clone)]
pub struct Alignment {
    alphabet: Alphabet,
    names: Vec<Arc<str>>,
    sequences: Vec<Vec<u8>>,
    index_by_name: FxHashMap<Arc<str>, usize>,
}

impl Alignment {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            names: Vec::new(),
            sequences: Vec::new(),
            index_by_name: FxHashMap::default(),
        }
    }

    /// Appends a sequence; the first one fixes the alignment length.
    pub fn add_sequence(
        &mut self,
        name: &str,
        sequence: impl AsRef<[u8]>,
    ) -> Result<usize, AlignmentError> {
        let sequence = sequence.as_ref();
        if self.index_by_name.contains_key(name) {
            return Err(AlignmentError::DuplicateName(name.to_string()));
        }
        if let Some(first) = self.sequences.first()
            && first.len() != sequence.len()
        {
            return Err(AlignmentError::LengthMismatch {
                name: name.to_string(),
                expected: first.len(),
                found: sequence.len(),
            });
        }

        let id = self.sequences.len();
        let name: Arc<str> = Arc::from(name);
        self.names.push(name.clone());
        self.sequences.push(sequence.to_vec());
        let _ = self.index_by_name.insert(name, id);
        Ok(id)
    }

    /// Reads FASTA text. The header name is the first word after `>`;
    /// whitespace inside sequence lines is dropped.
    pub fn from_fasta(
        text: &str,
        alphabet: Alphabet,
    ) -> Result<Self, AlignmentError> {
        let mut alignment = Self::new(alphabet);
        let mut current: Option<(String, Vec<u8>)> = None;

        for (line_index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                if let Some((name, sequence)) = current.take() {
                    let _ = alignment.add_sequence(&name, sequence)?;
                }
                let name = header
                    .split_whitespace()
                    .next()
                    .ok_or(AlignmentError::EmptyName(line_index + 1))?;
                current = Some((name.to_string(), Vec::new()));
            } else {
                let (_, sequence) = current
                    .as_mut()
                    .ok_or(AlignmentError::MissingHeader(line_index + 1))?;
                sequence.extend(
                    line.bytes().filter(|byte| !byte.is_ascii_whitespace()),
                );
            }
        }

        if let Some((name, sequence)) = current.take() {
            let _ = alignment.add_sequence(&name, sequence)?;
        }

        if alignment.is_empty() {
            return Err(AlignmentError::Empty);
        }
        Ok(alignment)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn alphabet_characters(&self) -> &[u8] {
        self.alphabet.characters()
    }

    /// Number of sites.
    pub fn length(&self) -> usize {
        self.sequences.first().map_or(0, Vec::len)
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn sequence_for_name(&self, name: &str) -> Option<&[u8]> {
        let id = *self.index_by_name.get(name)?;
        self.sequence_for_id(id)
    }

    pub fn sequence_for_id(&self, id: usize) -> Option<&[u8]> {
        self.sequences.get(id).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_multiline_fasta() {
        let fasta = ">A first taxon\nAC\nGT\n\n>B\nAAAA\n";
        let alignment = Alignment::from_fasta(fasta, Alphabet::nucleotides()).unwrap();
        assert_eq!(alignment.len(), 2);
        assert_eq!(alignment.length(), 4);
        assert_eq!(alignment.sequence_for_name("A"), Some(&b"ACGT"[..]));
        assert_eq!(alignment.sequence_for_id(1), Some(&b"AAAA"[..]));
        assert_eq!(alignment.sequence_for_name("C"), None);
    }

    #[test]
    fn rejects_malformed_fasta() {
        let nt = Alphabet::nucleotides;
        assert!(matches!(
            Alignment::from_fasta("ACGT\n>A\nACGT", nt()),
            Err(AlignmentError::MissingHeader(1))
        ));
        assert!(matches!(
            Alignment::from_fasta(">A\nACGT\n>B\nACG", nt()),
            Err(AlignmentError::LengthMismatch { expected: 4, found: 3, .. })
        ));
        assert!(matches!(
            Alignment::from_fasta(">A\nAC\n>A\nAC", nt()),
            Err(AlignmentError::DuplicateName(_))
        ));
        assert!(matches!(
            Alignment::from_fasta("\n\n", nt()),
            Err(AlignmentError::Empty)
        ));
    }
}
