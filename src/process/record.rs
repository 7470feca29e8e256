// src/process/record.rs
use std::sync::Arc;

/// One data row. Shares its header list with the owning [`RecordSet`],
/// so `values[i]` is always the cell under `headers[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Cell value under `column`, or `None` if the header set has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|i| self.values[i].as_str())
    }

    pub fn value_at(&self, idx: usize) -> &str {
        &self.values[idx]
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Header/value pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Copy of this record with the cell at `idx` replaced.
    pub(crate) fn with_value_at(&self, idx: usize, value: &str) -> Record {
        let mut values = self.values.clone();
        values[idx] = value.to_string();
        Record {
            headers: Arc::clone(&self.headers),
            values,
        }
    }
}

/// Ordered rows plus the header order fixed by the first line of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    headers: Arc<[String]>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into(),
            records: Vec::new(),
        }
    }

    /// Build a set from literal rows. Rows are padded or truncated like parsed lines.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut set = RecordSet::new(headers.into_iter().map(Into::into).collect());
        for row in rows {
            set.push_row(row.into_iter().map(Into::into).collect());
        }
        set
    }

    /// Append a row, fitting it to the header width: missing trailing cells
    /// become empty strings, extra cells are dropped. Returns how many cells
    /// were dropped.
    pub fn push_row(&mut self, mut values: Vec<String>) -> usize {
        let width = self.headers.len();
        let dropped = values.len().saturating_sub(width);
        values.resize(width, String::new());
        self.records.push(Record {
            headers: Arc::clone(&self.headers),
            values,
        });
        dropped
    }

    pub(crate) fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Empty set sharing this set's header list.
    pub(crate) fn empty_like(&self) -> RecordSet {
        RecordSet {
            headers: Arc::clone(&self.headers),
            records: Vec::with_capacity(self.records.len()),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
