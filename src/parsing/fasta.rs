//! FASTA reading and writing for sequence collections.
//!
//! Reading goes through noodles and supports both uncompressed and gzip/bgzip
//! compressed files. Record names are the first whitespace-delimited token of the
//! definition line. Aligned FASTA (with `-` gap characters) is read as-is.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;

use crate::parsing::ParseError;

/// Line width used when writing FASTA
pub const FASTA_LINE_WIDTH: usize = 70;

/// An ordered, name-addressable collection of sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceSet {
    records: Vec<(String, String)>,
}

impl SequenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sequence, replacing any earlier sequence of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, sequence: impl Into<String>) {
        let name = name.into();
        let sequence = sequence.into();
        match self.records.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = sequence,
            None => self.records.push((name, sequence)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<N: Into<String>, S: Into<String>> FromIterator<(N, S)> for SequenceSet {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, sequence) in iter {
            set.insert(name, sequence);
        }
        set
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read all sequences of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or `ParseError::Noodles` if a
/// record cannot be parsed.
pub fn read_fasta_file(path: &Path) -> Result<SequenceSet, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        read_fasta(BufReader::new(GzDecoder::new(file)))
    } else {
        read_fasta(BufReader::new(file))
    }
}

/// Read all sequences from FASTA text.
///
/// # Errors
///
/// Returns `ParseError::Noodles` if a record cannot be parsed.
pub fn parse_fasta_text(text: &str) -> Result<SequenceSet, ParseError> {
    read_fasta(text.as_bytes())
}

fn read_fasta<R: BufRead>(reader: R) -> Result<SequenceSet, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut set = SequenceSet::new();

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
        set.insert(name, sequence);
    }

    Ok(set)
}

/// Write one FASTA record, wrapping the sequence at [`FASTA_LINE_WIDTH`] columns.
///
/// # Errors
///
/// Returns any error of the underlying writer.
pub fn write_record<W: Write>(writer: &mut W, header: &str, sequence: &str) -> std::io::Result<()> {
    writeln!(writer, ">{header}")?;
    let bytes = sequence.as_bytes();
    for chunk in bytes.chunks(FASTA_LINE_WIDTH) {
        writer.write_all(chunk)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Write a whole sequence collection.
///
/// # Errors
///
/// Returns any error of the underlying writer.
pub fn write_fasta<W: Write>(writer: &mut W, sequences: &SequenceSet) -> std::io::Result<()> {
    for (name, sequence) in sequences.iter() {
        write_record(writer, name, sequence)?;
    }
    Ok(())
}
