// src/process/serialize.rs
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::record::RecordSet;
use crate::error::{PriceSyncError, Result};

/// Render `set` as delimited text: header row, then one line per record, in
/// header order, joined by `\n` with no trailing newline.
///
/// Cells are written as-is unless they contain the delimiter, a quote or a
/// line break, in which case they are quoted. In a single-column list an
/// empty cell is an empty line.
pub fn to_delimited_text(set: &RecordSet, delimiter: u8) -> Result<String> {
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary);
    let mut wtr = builder.from_writer(Vec::new());

    wtr.write_record(set.headers())?;
    for record in set {
        match record.values() {
            // the csv writer would emit `""` to keep the record visible
            [only] if only.is_empty() => {
                let mut buf = wtr.into_inner().map_err(|e| {
                    PriceSyncError::Parse(format!("flushing serialized output: {}", e.error()))
                })?;
                buf.push(b'\n');
                wtr = builder.from_writer(buf);
            }
            values => wtr.write_record(values)?,
        }
    }

    let buf = wtr
        .into_inner()
        .map_err(|e| PriceSyncError::Parse(format!("flushing serialized output: {}", e.error())))?;
    let mut text = String::from_utf8(buf)
        .map_err(|e| PriceSyncError::Parse(format!("serialized output is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
