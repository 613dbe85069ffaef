use std::path::Path;

use crate::parsing::ParseError;

/// A tab-separated table: the first non-comment line is the header, every further
/// non-comment line a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvTable {
    pub header: Vec<String>,
    /// Records with 1-based line numbers for error reporting
    pub records: Vec<(usize, Vec<String>)>,
}

impl TsvTable {
    /// Index of the named column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Parse a TSV file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_tsv_file(path: &Path) -> Result<TsvTable, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_tsv_text(&content)
}

/// Parse TSV text. Lines starting with `#` and blank lines are skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if there is no header line or a record has
/// more fields than the header.
pub fn parse_tsv_text(text: &str) -> Result<TsvTable, ParseError> {
    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();

        if header.is_none() {
            header = Some(fields);
            continue;
        }
        let header_len = header.as_ref().map_or(0, Vec::len);

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        if fields.len() > header_len {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields but the header has {header_len}",
                fields.len(),
            )));
        }

        records.push((line_num, fields));
    }

    let header =
        header.ok_or_else(|| ParseError::InvalidFormat("No header line found".to_string()))?;

    Ok(TsvTable { header, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv_text() {
        let tsv = "# comment\nreference\tposition\tA\tB\n16S\t10\tC\tT\n50S\t3\tG\tG\n";
        let table = parse_tsv_text(tsv).unwrap();
        assert_eq!(table.header, vec!["reference", "position", "A", "B"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].0, 3);
        assert_eq!(table.records[1].1[0], "50S");
        assert_eq!(table.column("position"), Some(1));
        assert_eq!(table.column("C"), None);
    }

    #[test]
    fn test_parse_tsv_comments_between_records() {
        let tsv = "a\tb\n# ------\n1\t2\n\n# ------\n3\t4\n";
        let table = parse_tsv_text(tsv).unwrap();
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn test_parse_tsv_without_header() {
        assert!(parse_tsv_text("# only comments\n").is_err());
    }

    #[test]
    fn test_parse_tsv_too_many_fields() {
        let err = parse_tsv_text("a\tb\n1\t2\t3\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }
}
