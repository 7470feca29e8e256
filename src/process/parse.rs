// src/process/parse.rs
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::record::RecordSet;
use crate::error::{PriceSyncError, Result};

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Line (1-based) where a quoted field opens and never closes, if any.
///
/// The csv reader ends such a field at EOF without an error, taking every
/// following line with it. Tracks quoting the same way the reader does: a
/// quote only opens a field at its first byte, and `""` inside is an escape.
fn unclosed_quote_line(text: &str, delimiter: u8) -> Option<usize> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut opened_on = 0;
    for &b in text.as_bytes() {
        let is_break = b == b'\n' || b == b'\r';
        state = match state {
            QuoteState::Quoted if b == b'"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if b == b'"' => QuoteState::Quoted,
            QuoteState::FieldStart if b == b'"' => {
                opened_on = line;
                QuoteState::Quoted
            }
            _ if b == delimiter || is_break => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }
    (state == QuoteState::Quoted).then_some(opened_on)
}

/// Parse delimited `text` into a [`RecordSet`].
///
/// The first non-blank line is the header row. Header names and cell values
/// are trimmed. Short rows are padded with empty cells; cells beyond the
/// header width are dropped. Lines with no characters at all never produce a
/// record. With `skip_blank_lines`, rows whose cells are all whitespace are
/// dropped too; otherwise they become rows of empty cells. A quoted field
/// left open at end of input is a parse error.
pub fn parse_records(text: &str, delimiter: u8, skip_blank_lines: bool) -> Result<RecordSet> {
    if let Some(line) = unclosed_quote_line(text, delimiter) {
        return Err(PriceSyncError::Parse(format!(
            "quoted field opened on line {} is never closed",
            line
        )));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // row widths vary in hand-edited exports
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = rdr.records();

    let header = loop {
        match rows.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Err(PriceSyncError::Parse("no header row found".into())),
        }
    };
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let mut set = RecordSet::new(headers);

    let mut dropped_cells = 0;
    let mut skipped_rows = 0;
    for (idx, record) in rows.enumerate() {
        let record = record.map_err(|e| PriceSyncError::Parse(format!("row {}: {}", idx + 2, e)))?;
        if skip_blank_lines && is_blank(&record) {
            skipped_rows += 1;
            continue;
        }
        dropped_cells += set.push_row(record.iter().map(|v| v.trim().to_string()).collect());
    }

    debug!(
        columns = set.headers().len(),
        rows = set.len(),
        skipped_rows,
        dropped_cells,
        "parsed records"
    );
    Ok(set)
}
