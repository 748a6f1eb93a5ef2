//! CSV writers: whole-table and event-driven emission.

use super::dialect::{EscapeMode, WriteOptions};
use super::dom::Table;
use super::error::{Error, ErrorKind, Result};
use crate::core::{Sink, SinkStatus};

/// Write an entire table to `sink` under `options`.
pub fn write_table(table: &Table, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
    let mut writer = EventWriter::new(options.clone());
    if let Some(header) = table.header() {
        writer.record_begin(sink)?;
        for name in header {
            writer.field(sink, name.as_bytes())?;
        }
        writer.record_end(sink)?;
    }
    for row in table.rows() {
        writer.record_begin(sink)?;
        let fields: Vec<&[u8]> = if options.trim_trailing_empty_fields {
            trim_trailing_empty(row)
        } else {
            row.iter().map(Vec::as_slice).collect()
        };
        for field in fields {
            writer.field(sink, field)?;
        }
        writer.record_end(sink)?;
    }
    writer.finish(sink)
}

fn trim_trailing_empty(row: &[Vec<u8>]) -> Vec<&[u8]> {
    let mut end = row.len();
    while end > 0 && row[end - 1].is_empty() {
        end -= 1;
    }
    row[..end].iter().map(Vec::as_slice).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    StartOfOutput,
    StartOfRecord,
    MidRecord,
}

/// An event-driven CSV writer: `record_begin` → `field`* → `record_end`,
/// repeated, then `finish`.
pub struct EventWriter {
    options: WriteOptions,
    state: WriterState,
}

impl EventWriter {
    /// Create a writer under `options`.
    pub const fn new(options: WriteOptions) -> Self {
        Self {
            options,
            state: WriterState::StartOfOutput,
        }
    }

    /// Begin a new record.
    pub fn record_begin(&mut self, sink: &mut dyn Sink) -> Result<()> {
        if self.state != WriterState::StartOfOutput {
            check(sink.write(self.options.newline.as_bytes()))?;
        }
        self.state = WriterState::StartOfRecord;
        Ok(())
    }

    /// Write a single field of the current record.
    pub fn field(&mut self, sink: &mut dyn Sink, field: &[u8]) -> Result<()> {
        if self.state == WriterState::MidRecord {
            check(sink.write(&[self.options.dialect.delimiter]))?;
        }
        self.state = WriterState::MidRecord;
        let at_start_of_field = true;
        let needs_quoting = self.needs_quoting(field, at_start_of_field);
        if needs_quoting {
            self.write_quoted(sink, field)
        } else {
            check(sink.write(field))
        }
    }

    /// End the current record.
    pub fn record_end(&mut self, _sink: &mut dyn Sink) -> Result<()> {
        Ok(())
    }

    /// Flush any trailing newline configured by [`WriteOptions::trailing_newline`].
    pub fn finish(&mut self, sink: &mut dyn Sink) -> Result<()> {
        if self.options.trailing_newline && self.state != WriterState::StartOfOutput {
            check(sink.write(self.options.newline.as_bytes()))?;
        }
        Ok(())
    }

    fn needs_quoting(&self, field: &[u8], at_bof: bool) -> bool {
        let d = &self.options.dialect;
        if self.options.quote_all_fields {
            return true;
        }
        if field.is_empty() {
            return self.options.quote_empty_fields;
        }
        if !self.options.quote_if_needed {
            return false;
        }
        let has_special = field
            .iter()
            .any(|&b| b == d.delimiter || b == d.quote || b == b'\n' || b == b'\r');
        let leading_ws = !at_bof && field.first().is_some_and(u8::is_ascii_whitespace);
        has_special || leading_ws
    }

    fn write_quoted(&self, sink: &mut dyn Sink, field: &[u8]) -> Result<()> {
        let d = &self.options.dialect;
        check(sink.write(&[d.quote]))?;
        for &b in field {
            if b == d.quote {
                match d.escape {
                    EscapeMode::DoubledQuote => check(sink.write(&[d.quote, d.quote]))?,
                    EscapeMode::Backslash => check(sink.write(&[b'\\', d.quote]))?,
                    EscapeMode::None => check(sink.write(&[d.quote]))?,
                }
            } else {
                check(sink.write(&[b]))?;
            }
        }
        check(sink.write(&[d.quote]))
    }
}

fn check(status: SinkStatus) -> Result<()> {
    match status {
        SinkStatus::Ok => Ok(()),
        SinkStatus::Write => Err(Error::new(ErrorKind::Write, "sink rejected a write")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GrowableSink;
    use crate::csv::dialect::ParseOptions;
    use crate::csv::dom::parse;

    #[test]
    fn scenario_a_write_minimal_quoting() {
        let input = b"Name,Age,City\nAlice,30,\"New, York\"\n";
        let mut opts = ParseOptions::default();
        opts.dialect.treat_first_row_as_header = true;
        let table = parse(input, &opts).unwrap();

        let mut write_opts = WriteOptions::default();
        write_opts.trailing_newline = false;
        let mut sink = GrowableSink::new();
        write_table(&table, &write_opts, &mut sink).unwrap();
        assert_eq!(
            String::from_utf8(sink.into_bytes()).unwrap(),
            "Name,Age,City\nAlice,30,\"New, York\""
        );
    }

    #[test]
    fn empty_fields_are_quoted_by_default() {
        let mut table = Table::new(true);
        table.push_row(vec![Vec::new(), b"x".to_vec()]).unwrap();
        let mut sink = GrowableSink::new();
        write_table(&table, &WriteOptions::default(), &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink.into_bytes()).unwrap(), "\"\",x");
    }

    #[test]
    fn round_trip_property_holds_for_simple_table() {
        let mut table = Table::new(false);
        table.push_row(vec![b"a".to_vec(), b"b,c".to_vec()]).unwrap();
        table.push_row(vec![b"d\"e".to_vec(), b"f".to_vec()]).unwrap();

        let mut sink = GrowableSink::new();
        write_table(&table, &WriteOptions::default(), &mut sink).unwrap();
        let bytes = sink.into_bytes();

        let parsed = parse(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.row(0).unwrap(), table.row(0).unwrap());
        assert_eq!(parsed.row(1).unwrap(), table.row(1).unwrap());
    }
}
