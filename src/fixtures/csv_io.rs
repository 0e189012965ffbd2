//! CSV import and export for fixture data
//!
//! Import: one tuple per line, comma-separated integers, columns named A, B,
//! C... by position. Blank lines and trailing empty fields are skipped.
//!
//! Export: columns sorted by name, no header row, one line per tuple with
//! duplicates repeated, tuples in ascending order.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, Writer, WriterBuilder};

use super::errors::{FixtureError, FixtureResult};
use crate::tuple::Tuple;

/// Column name for a zero-based field position: A..Z, then AA, AB, ...
pub fn column_name(position: usize) -> String {
    let mut name = Vec::new();
    let mut n = position + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Fields of `record` up to its last non-empty one
fn significant_fields(record: &StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

/// Parses CSV text into tuples
///
/// Every non-blank line must have the same number of fields.
pub fn parse_csv(content: &str) -> FixtureResult<Vec<Tuple>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut tuples = Vec::new();
    let mut width = None;

    for record in reader.records() {
        let record = record.map_err(FixtureError::csv)?;
        let line_no = record.position().map_or(0, |pos| pos.line() as usize);
        let fields = significant_fields(&record);
        if fields.is_empty() {
            continue;
        }

        let mut tuple = Tuple::new();
        for (field, raw) in fields.iter().enumerate() {
            let value = raw.parse::<i32>().map_err(|source| FixtureError::Parse {
                line: line_no,
                field: field + 1,
                value: raw.to_string(),
                source,
            })?;
            tuple.put(column_name(field), value);
        }

        match width {
            None => width = Some(fields.len()),
            Some(expected) if expected != fields.len() => {
                return Err(FixtureError::RaggedRow {
                    line: line_no,
                    found: fields.len(),
                    expected,
                });
            }
            Some(_) => {}
        }
        tuples.push(tuple);
    }

    Ok(tuples)
}

/// Reads and parses a CSV file
pub fn read_csv(path: &Path) -> FixtureResult<Vec<Tuple>> {
    let content = fs::read_to_string(path).map_err(|e| FixtureError::io(path, e))?;
    parse_csv(&content)
}

/// Multiset of tuples for CSV export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleCollection {
    counts: BTreeMap<Tuple, usize>,
    columns: BTreeSet<String>,
}

impl TupleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tuple: Tuple) {
        self.columns.extend(tuple.columns().map(String::from));
        *self.counts.entry(tuple).or_insert(0) += 1;
    }

    /// Total tuples, duplicates included
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Renders one line per tuple; a column a tuple lacks is left empty
    pub fn to_csv_string(&self) -> FixtureResult<String> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| FixtureError::csv(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn write_csv(&self, path: &Path) -> FixtureResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FixtureError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| FixtureError::io(path, e))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        self.write_records(&mut writer)?;
        writer.flush().map_err(|e| FixtureError::io(path, e))
    }

    fn write_records<W: Write>(&self, writer: &mut Writer<W>) -> FixtureResult<()> {
        for (tuple, count) in &self.counts {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|column| tuple.get(column).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            for _ in 0..*count {
                writer.write_record(&record).map_err(FixtureError::csv)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<Tuple> for TupleCollection {
    fn from_iter<I: IntoIterator<Item = Tuple>>(iter: I) -> Self {
        let mut collection = TupleCollection::new();
        for tuple in iter {
            collection.add(tuple);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(2), "C");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let tuples = parse_csv("1,2,3\n\n-4, 5,6\n").unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[1].get("A"), Some(-4));
        assert_eq!(tuples[1].get("B"), Some(5));
        assert_eq!(tuples[1].get("C"), Some(6));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_csv("1,2\n\n3,x\n").unwrap_err();
        match err {
            FixtureError::Parse { line, field, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(field, 2);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_drops_trailing_empty_fields() {
        let tuples = parse_csv("1,2,3,\n4,5,6,,\n").unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].len(), 3);
        assert_eq!(tuples[1].get("C"), Some(6));
        assert_eq!(tuples[1].get("D"), None);
    }

    #[test]
    fn test_parse_rejects_inner_empty_field() {
        let err = parse_csv("1,,3\n").unwrap_err();
        assert!(matches!(err, FixtureError::Parse { line: 1, field: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = parse_csv("1,2\n3\n").unwrap_err();
        assert!(matches!(err, FixtureError::RaggedRow { line: 2, found: 1, expected: 2 }));
    }

    #[test]
    fn test_export_repeats_duplicates_in_order() {
        let mut collection = TupleCollection::new();
        collection.add(Tuple::new().with("B", 2).with("A", 9));
        collection.add(Tuple::new().with("A", 1).with("B", 5));
        collection.add(Tuple::new().with("A", 9).with("B", 2));

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.columns().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(collection.to_csv_string().unwrap(), "1,5\n9,2\n9,2\n");
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(TupleCollection::new().to_csv_string().unwrap(), "");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let collection: TupleCollection = parse_csv("3,4\n1,2\n").unwrap().into_iter().collect();

        collection.write_csv(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1,2\n3,4\n");
    }
}
