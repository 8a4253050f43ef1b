use rustc_hash::FxHashMap;
use std::fmt::Display;

const NUCLEOTIDES: &[u8] = b"ACGT";
const AMINO_ACIDS: &[u8] = b"ARNDCQEGHILKMFPSTWYV";
const GAP: u8 = b'-';

/// IUPAC nucleotide codes standing for more than one base.
const NUCLEOTIDE_AMBIGUITIES: &[(u8, &[u8])] = &[
    (b'R', b"AG"),
    (b'Y', b"CT"),
    (b'S', b"CG"),
    (b'W', b"AT"),
    (b'K', b"GT"),
    (b'M', b"AC"),
    (b'B', b"CGT"),
    (b'D', b"AGT"),
    (b'H', b"ACT"),
    (b'V', b"ACG"),
    (b'N', b"ACGT"),
    (b'?', b"ACGT"),
    (b'U', b"T"),
];

const AMINO_ACID_AMBIGUITIES: &[(u8, &[u8])] = &[
    (b'B', b"DN"),
    (b'Z', b"EQ"),
    (b'J', b"IL"),
    (b'X', AMINO_ACIDS),
    (b'?', AMINO_ACIDS),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetKind {
    Nucleotide,
    AminoAcid,
}

/// The symbols a state vector is indexed by: the residues of the data type
/// followed by the gap and the wildcard.
#[derive(Debug, Clone)]
pub struct Alphabet {
    kind: AlphabetKind,
    symbols: Vec<u8>,
    residue_count: usize,
    expansions: FxHashMap<u8, Vec<usize>>,
}

impl Alphabet {
    pub fn nucleotides() -> Self {
        Self::build(AlphabetKind::Nucleotide, NUCLEOTIDES, b'N', NUCLEOTIDE_AMBIGUITIES)
    }

    pub fn amino_acids() -> Self {
        Self::build(AlphabetKind::AminoAcid, AMINO_ACIDS, b'X', AMINO_ACID_AMBIGUITIES)
    }

    pub fn new(kind: AlphabetKind) -> Self {
        match kind {
            AlphabetKind::Nucleotide => Self::nucleotides(),
            AlphabetKind::AminoAcid => Self::amino_acids(),
        }
    }

    fn build(
        kind: AlphabetKind,
        residues: &[u8],
        wildcard: u8,
        ambiguities: &[(u8, &[u8])],
    ) -> Self {
        let mut symbols: Vec<u8> = residues.to_vec();
        symbols.push(GAP);
        symbols.push(wildcard);

        let mut expansions: FxHashMap<u8, Vec<usize>> = symbols
            .iter()
            .enumerate()
            .map(|(index, &symbol)| (symbol, vec![index]))
            .collect();

        for &(code, bases) in ambiguities {
            let mut indices: Vec<usize> = bases
                .iter()
                .filter_map(|base| residues.iter().position(|r| r == base))
                .collect();
            indices.sort_unstable();
            let _ = expansions.insert(code, indices);
        }

        Self { kind, symbols, residue_count: residues.len(), expansions }
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    /// Residue symbols only, without gap and wildcard.
    pub fn characters(&self) -> &[u8] {
        &self.symbols[..self.residue_count]
    }

    /// Every indexable symbol, gap and wildcard last.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Width of a state vector.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn gap(&self) -> u8 {
        GAP
    }

    pub fn wildcard(&self) -> u8 {
        self.symbols[self.symbols.len() - 1]
    }

    pub fn symbol(&self, index: usize) -> Option<u8> {
        self.symbols.get(index).copied()
    }

    pub fn index_of(&self, symbol: u8) -> Option<usize> {
        let symbol = symbol.to_ascii_uppercase();
        self.symbols.iter().position(|&s| s == symbol)
    }

    /// Indices compatible with an observed symbol, case-insensitive.
    /// Ambiguity codes give several indices; unknown symbols give `None`.
    pub fn expand(&self, symbol: u8) -> Option<&[usize]> {
        self.expansions
            .get(&symbol.to_ascii_uppercase())
            .map(Vec::as_slice)
    }
}

impl Display for AlphabetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AlphabetKind::Nucleotide => "nucleotide",
                AlphabetKind::AminoAcid => "amino acid",
            }
        )
    }
}
