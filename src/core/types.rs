use serde::{Serialize, Serializer};

/// Strand of one side of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    Forward,
    Reverse,
    /// No alignment, used by "no match" records
    #[default]
    Unknown,
}

impl Strand {
    /// Symbol as written in match tables (`+`, `-`, `.`)
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
            Self::Unknown => '.',
        }
    }

    /// The opposite strand; `Unknown` stays `Unknown`.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Parse the strand names used by BLAST JSON output (`Plus`/`Minus`).
    #[must_use]
    pub fn from_blast(s: &str) -> Self {
        match s {
            "Plus" => Self::Forward,
            "Minus" => Self::Reverse,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Strand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.symbol())
    }
}

/// Key of an informative position: reference name and 0-based position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub reference: String,
    pub position: usize,
}

impl PositionKey {
    pub fn new(reference: impl Into<String>, position: usize) -> Self {
        Self {
            reference: reference.into(),
            position,
        }
    }
}

/// Rendered as `reference:position` with a 1-based position.
impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.reference, self.position + 1)
    }
}

/// Placeholder reported when no haplotype could be assigned
pub const UNRESOLVED: &str = "-";
