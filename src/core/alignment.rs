use serde::{Deserialize, Serialize};

use crate::core::sequence::revcomp;

/// A pairwise alignment as reported by the aligner: database (hit) row, mid-line and
/// query row, all of the same length.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignedPair {
    /// Database (hit) row
    pub hseq: String,
    /// Alignment mid-line (`|` for identities)
    pub midline: String,
    /// Query row
    pub qseq: String,
}

impl AlignedPair {
    pub fn new(
        hseq: impl Into<String>,
        midline: impl Into<String>,
        qseq: impl Into<String>,
    ) -> Self {
        Self {
            hseq: hseq.into(),
            midline: midline.into(),
            qseq: qseq.into(),
        }
    }

    /// The alignment used for "no match" records.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of alignment columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hseq.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hseq.is_empty()
    }

    /// The same alignment viewed from the opposite strand.
    ///
    /// Both rows are reverse-complemented; the mid-line is only reversed.
    #[must_use]
    pub fn revcomp(&self) -> Self {
        Self {
            hseq: revcomp(&self.hseq),
            midline: self.midline.chars().rev().collect(),
            qseq: revcomp(&self.qseq),
        }
    }

    /// Iterate over `(hit, query)` column pairs.
    pub fn columns(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.hseq.chars().zip(self.qseq.chars())
    }

    /// Render the alignment in BLAST-style blocks of `line_length` columns.
    ///
    /// `query_start` and `database_start` are 0-based.
    #[must_use]
    pub fn wrapped(&self, query_start: usize, database_start: usize, line_length: usize) -> String {
        if line_length == 0 {
            return String::new();
        }

        let hseq: Vec<char> = self.hseq.chars().collect();
        let midline: Vec<char> = self.midline.chars().collect();
        let qseq: Vec<char> = self.qseq.chars().collect();

        let mut lines = Vec::new();
        for offset in (0..hseq.len()).step_by(line_length) {
            let end = hseq.len().min(offset + line_length);
            let slice = |row: &[char]| -> String {
                row.get(offset..end.min(row.len()))
                    .map(|chunk| chunk.iter().collect())
                    .unwrap_or_default()
            };

            lines.push(format!(
                "Sbjct {:4} {:<width$} {}",
                database_start + offset + 1,
                slice(&hseq),
                database_start + offset + line_length,
                width = line_length
            ));
            lines.push(format!(
                "      {:4} {:<width$}",
                "",
                slice(&midline),
                width = line_length
            ));
            lines.push(format!(
                "Query {:4} {:<width$} {}",
                query_start + offset + 1,
                slice(&qseq),
                query_start + offset + line_length,
                width = line_length
            ));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
