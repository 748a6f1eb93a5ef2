//! Streaming CSV tokenizer: turns bytes into record/field events.
//!
//! Feeds may split a record at any point (including mid-field or
//! mid-quote); partial state is carried between [`Scanner::feed`] calls.
//! [`Scanner::finish`] must be called once input is exhausted — it flushes
//! any in-progress record and emits [`Event::End`].

use super::dialect::{CsvLimits, Dialect, EscapeMode};
use super::error::{Error, ErrorKind, Result};
use crate::core::Position;

/// A single tokenizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start of a new record (0-based row index).
    RecordBegin {
        /// 0-based row index.
        row: usize,
    },
    /// A field within the current record.
    Field {
        /// 0-based row index.
        row: usize,
        /// 0-based column index.
        col: usize,
        /// The field's raw bytes.
        bytes: Vec<u8>,
    },
    /// End of the current record.
    RecordEnd {
        /// 0-based row index.
        row: usize,
    },
    /// End of the stream; no further events will be produced.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AtRecordStart,
    FieldStart,
    InField,
    InQuotedField,
    AfterQuoted,
}

/// Result of checking a byte that didn't match [`Scanner::is_newline_start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewlineProbe {
    /// Not a newline byte under the active dialect.
    NotNewline,
    /// A `\r` that might still complete into `\r\n` once more is fed.
    Pending,
    /// A lone `\r` or `\n` that can never be a valid terminator here.
    Incomplete,
}

/// The streaming CSV tokenizer.
pub struct Scanner {
    dialect: Dialect,
    limits: CsvLimits,
    validate_utf8: bool,
    buffer: Vec<u8>,
    pos: usize,
    state: State,
    current_field: Vec<u8>,
    field_is_quoted: bool,
    row: usize,
    col: usize,
    row_has_data: bool,
    record_bytes: usize,
    total_bytes: usize,
    finished: bool,
    quote_start: Position,
}

impl Scanner {
    /// Create a scanner for `dialect`, enforcing `limits`.
    pub fn new(dialect: Dialect, limits: CsvLimits, validate_utf8: bool) -> Self {
        Self {
            dialect,
            limits,
            validate_utf8,
            buffer: Vec::new(),
            pos: 0,
            state: State::AtRecordStart,
            current_field: Vec::new(),
            field_is_quoted: false,
            row: 0,
            col: 0,
            row_has_data: false,
            record_bytes: 0,
            total_bytes: 0,
            finished: false,
            quote_start: Position::start(),
        }
    }

    fn position_at(&self, offset: usize) -> Position {
        self.buffer[..offset]
            .iter()
            .fold(Position::start(), |p, &b| p.advance(b))
    }

    fn is_newline_start(&self, at: usize) -> Option<usize> {
        let d = &self.dialect;
        if d.accept_crlf && self.buffer.get(at) == Some(&b'\r') && self.buffer.get(at + 1) == Some(&b'\n')
        {
            return Some(2);
        }
        if d.accept_lf && self.buffer.get(at) == Some(&b'\n') {
            return Some(1);
        }
        if d.accept_cr && self.buffer.get(at) == Some(&b'\r') {
            return Some(1);
        }
        None
    }

    /// Called once [`Self::is_newline_start`] has failed to match at `at`,
    /// under a dialect that accepts only `\r\n` terminators. Distinguishes a
    /// lone `\r`/`\n` that can never complete into a valid terminator from a
    /// `\r` that might still pair with a `\n` arriving in a later feed.
    fn probe_incomplete_crlf(&self, at: usize, at_eof: bool) -> NewlineProbe {
        let d = &self.dialect;
        if !(d.accept_crlf && !d.accept_lf && !d.accept_cr) {
            return NewlineProbe::NotNewline;
        }
        match self.buffer.get(at) {
            Some(&b'\n') => NewlineProbe::Incomplete,
            Some(&b'\r') => match self.buffer.get(at + 1) {
                Some(&b'\n') => NewlineProbe::NotNewline,
                Some(_) => NewlineProbe::Incomplete,
                None if at_eof => NewlineProbe::Incomplete,
                None => NewlineProbe::Pending,
            },
            _ => NewlineProbe::NotNewline,
        }
    }

    /// Feed the next chunk of bytes, returning any events that could be
    /// produced without further input.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Event>> {
        self.buffer.extend_from_slice(chunk);
        self.total_bytes += chunk.len();
        if self.total_bytes > self.limits.total_bytes() {
            return Err(Error::new(ErrorKind::Limit, "max_total_bytes exceeded"));
        }
        self.run(false)
    }

    /// Signal end of input: flushes any in-progress record and emits
    /// [`Event::End`].
    pub fn finish(&mut self) -> Result<Vec<Event>> {
        let mut events = self.run(true)?;
        if !self.finished {
            if self.row_has_data || self.col > 0 || !self.current_field.is_empty() || self.field_is_quoted
            {
                if matches!(self.state, State::InQuotedField) {
                    return Err(Error::at(
                        ErrorKind::UnterminatedQuote,
                        "unexpected end of input inside quoted field",
                        self.quote_start,
                    ));
                }
                self.emit_field(&mut events);
                events.push(Event::RecordEnd { row: self.row });
                self.row += 1;
            }
            events.push(Event::End);
            self.finished = true;
        }
        Ok(events)
    }

    fn emit_field(&mut self, events: &mut Vec<Event>) {
        let mut bytes = std::mem::take(&mut self.current_field);
        if !self.field_is_quoted && self.dialect.trim_unquoted_fields {
            let trimmed = trim_ascii(&bytes);
            bytes = trimmed.to_vec();
        }
        events.push(Event::Field {
            row: self.row,
            col: self.col,
            bytes,
        });
        self.col += 1;
        self.row_has_data = true;
        self.field_is_quoted = false;
    }

    #[allow(clippy::too_many_lines)]
    fn run(&mut self, at_eof: bool) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        loop {
            match self.state {
                State::AtRecordStart => {
                    if self.pos >= self.buffer.len() {
                        if at_eof {
                            break;
                        }
                        break;
                    }
                    if self.dialect.allow_comments
                        && self.buffer[self.pos..].starts_with(self.dialect.comment_prefix.as_bytes())
                    {
                        // Need the rest of the line to skip it.
                        let Some(nl_len) = self.find_newline_from(self.pos) else {
                            if at_eof {
                                self.pos = self.buffer.len();
                                break;
                            }
                            break;
                        };
                        self.pos = nl_len;
                        continue;
                    }
                    events.push(Event::RecordBegin { row: self.row });
                    self.col = 0;
                    self.row_has_data = false;
                    self.record_bytes = 0;
                    self.state = State::FieldStart;
                }
                State::FieldStart => {
                    if self.dialect.allow_space_after_delimiter && self.col > 0 {
                        while self.buffer.get(self.pos) == Some(&b' ') {
                            self.pos += 1;
                        }
                    }
                    let Some(&b) = self.buffer.get(self.pos) else {
                        if at_eof {
                            break;
                        }
                        break;
                    };
                    if b == self.dialect.quote {
                        self.pos += 1;
                        self.quote_start = self.position_at(self.pos - 1);
                        self.field_is_quoted = true;
                        self.state = State::InQuotedField;
                    } else {
                        self.state = State::InField;
                    }
                }
                State::InField => {
                    if self.pos >= self.buffer.len() {
                        if at_eof {
                            break;
                        }
                        break;
                    }
                    if let Some(nl_len) = self.is_newline_start(self.pos) {
                        self.emit_field(&mut events);
                        self.pos += nl_len;
                        events.push(Event::RecordEnd { row: self.row });
                        self.row += 1;
                        if self.row >= self.limits.rows() {
                            return Err(Error::new(ErrorKind::Limit, "max_rows exceeded"));
                        }
                        self.state = State::AtRecordStart;
                        continue;
                    }
                    match self.probe_incomplete_crlf(self.pos, at_eof) {
                        NewlineProbe::Incomplete => {
                            return Err(Error::at(
                                ErrorKind::IncompleteCrlf,
                                "incomplete CRLF line terminator",
                                self.position_at(self.pos),
                            ));
                        }
                        NewlineProbe::Pending => break,
                        NewlineProbe::NotNewline => {}
                    }
                    let b = self.buffer[self.pos];
                    if b == self.dialect.delimiter {
                        self.pos += 1;
                        self.emit_field(&mut events);
                        if self.col > self.limits.cols() {
                            return Err(Error::new(ErrorKind::Limit, "max_cols exceeded"));
                        }
                        self.state = State::FieldStart;
                        continue;
                    }
                    if b == self.dialect.quote && !self.dialect.allow_unquoted_quotes {
                        return Err(Error::at(
                            ErrorKind::UnexpectedQuote,
                            "quote character in unquoted field",
                            self.position_at(self.pos),
                        ));
                    }
                    if b == b'\n' && !self.dialect.allow_unquoted_newlines {
                        return Err(Error::at(
                            ErrorKind::Invalid,
                            "bare newline in unquoted field",
                            self.position_at(self.pos),
                        ));
                    }
                    self.current_field.push(b);
                    self.record_bytes += 1;
                    self.pos += 1;
                    self.check_field_limits()?;
                }
                State::InQuotedField => {
                    if self.pos >= self.buffer.len() {
                        if at_eof {
                            break;
                        }
                        break;
                    }
                    let b = self.buffer[self.pos];
                    if b == self.dialect.quote {
                        if matches!(self.dialect.escape, EscapeMode::DoubledQuote)
                            && self.buffer.get(self.pos + 1) == Some(&self.dialect.quote)
                        {
                            self.current_field.push(self.dialect.quote);
                            self.pos += 2;
                            self.record_bytes += 1;
                            continue;
                        }
                        self.pos += 1;
                        self.state = State::AfterQuoted;
                        continue;
                    }
                    if b == b'\\' && matches!(self.dialect.escape, EscapeMode::Backslash) {
                        if let Some(&next) = self.buffer.get(self.pos + 1) {
                            self.current_field.push(next);
                            self.pos += 2;
                            self.record_bytes += 1;
                            continue;
                        } else if !at_eof {
                            break;
                        }
                    }
                    if b == b'\n' && !self.dialect.newline_in_quotes {
                        return Err(Error::at(
                            ErrorKind::Invalid,
                            "bare newline inside quoted field not permitted",
                            self.position_at(self.pos),
                        ));
                    }
                    self.current_field.push(b);
                    self.record_bytes += 1;
                    self.pos += 1;
                    self.check_field_limits()?;
                }
                State::AfterQuoted => {
                    let Some(&b) = self.buffer.get(self.pos) else {
                        if at_eof {
                            break;
                        }
                        break;
                    };
                    if b == self.dialect.delimiter {
                        self.pos += 1;
                        self.emit_field(&mut events);
                        if self.col > self.limits.cols() {
                            return Err(Error::new(ErrorKind::Limit, "max_cols exceeded"));
                        }
                        self.state = State::FieldStart;
                        continue;
                    }
                    if let Some(nl_len) = self.is_newline_start(self.pos) {
                        self.emit_field(&mut events);
                        self.pos += nl_len;
                        events.push(Event::RecordEnd { row: self.row });
                        self.row += 1;
                        if self.row >= self.limits.rows() {
                            return Err(Error::new(ErrorKind::Limit, "max_rows exceeded"));
                        }
                        self.state = State::AtRecordStart;
                        continue;
                    }
                    match self.probe_incomplete_crlf(self.pos, at_eof) {
                        NewlineProbe::Incomplete => {
                            return Err(Error::at(
                                ErrorKind::IncompleteCrlf,
                                "incomplete CRLF line terminator",
                                self.position_at(self.pos),
                            ));
                        }
                        NewlineProbe::Pending => break,
                        NewlineProbe::NotNewline => {}
                    }
                    return Err(Error::at(
                        ErrorKind::Invalid,
                        "unexpected data after closing quote",
                        self.position_at(self.pos),
                    ));
                }
            }
        }
        if self.validate_utf8 {
            // checked per-field at the DOM layer, where the full field is available.
        }
        Ok(events)
    }

    fn check_field_limits(&self) -> Result<()> {
        if self.current_field.len() > self.limits.field_bytes() {
            return Err(Error::new(ErrorKind::Limit, "max_field_bytes exceeded"));
        }
        if self.record_bytes > self.limits.record_bytes() {
            return Err(Error::new(ErrorKind::Limit, "max_record_bytes exceeded"));
        }
        Ok(())
    }

    fn find_newline_from(&self, from: usize) -> Option<usize> {
        let mut i = from;
        while i < self.buffer.len() {
            if let Some(len) = self.is_newline_start(i) {
                return Some(i + len);
            }
            i += 1;
        }
        None
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(input: &[u8], dialect: Dialect) -> Vec<Event> {
        let mut scanner = Scanner::new(dialect, CsvLimits::default(), true);
        let mut events = scanner.feed(input).unwrap();
        events.extend(scanner.finish().unwrap());
        events
    }

    #[test]
    fn basic_two_rows() {
        let events = scan_all(b"a,b\nc,d\n", Dialect::default());
        assert_eq!(
            events,
            vec![
                Event::RecordBegin { row: 0 },
                Event::Field { row: 0, col: 0, bytes: b"a".to_vec() },
                Event::Field { row: 0, col: 1, bytes: b"b".to_vec() },
                Event::RecordEnd { row: 0 },
                Event::RecordBegin { row: 1 },
                Event::Field { row: 1, col: 0, bytes: b"c".to_vec() },
                Event::Field { row: 1, col: 1, bytes: b"d".to_vec() },
                Event::RecordEnd { row: 1 },
                Event::End,
            ]
        );
    }

    #[test]
    fn quoted_field_with_embedded_comma_and_escaped_quote() {
        let events = scan_all(br#"a,"b,""c"""#, Dialect::default());
        let Event::Field { bytes, .. } = &events[2] else {
            panic!("expected field")
        };
        assert_eq!(bytes, br#"b,"c""#);
    }

    #[test]
    fn split_feed_mid_quote_survives() {
        let mut scanner = Scanner::new(Dialect::default(), CsvLimits::default(), true);
        let mut events = scanner.feed(b"a,\"hel").unwrap();
        events.extend(scanner.feed(b"lo\"\n").unwrap());
        events.extend(scanner.finish().unwrap());
        let Event::Field { bytes, .. } = &events[2] else {
            panic!("expected field")
        };
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn unterminated_quote_is_an_error_at_finish() {
        let mut scanner = Scanner::new(Dialect::default(), CsvLimits::default(), true);
        scanner.feed(b"a,\"unterminated").unwrap();
        let err = scanner.finish().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedQuote);
    }

    #[test]
    fn no_trailing_newline_still_yields_final_record() {
        let events = scan_all(b"a,b", Dialect::default());
        assert!(events.contains(&Event::RecordEnd { row: 0 }));
    }

    fn crlf_only_dialect() -> Dialect {
        Dialect { accept_crlf: true, accept_lf: false, accept_cr: false, ..Dialect::default() }
    }

    #[test]
    fn lone_lf_under_strict_crlf_dialect_is_incomplete_crlf() {
        let mut scanner = Scanner::new(crlf_only_dialect(), CsvLimits::default(), true);
        let err = scanner.feed(b"a,b\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompleteCrlf);
    }

    #[test]
    fn lone_cr_not_followed_by_lf_is_incomplete_crlf() {
        let mut scanner = Scanner::new(crlf_only_dialect(), CsvLimits::default(), true);
        let err = scanner.feed(b"a,b\rx").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncompleteCrlf);
    }

    #[test]
    fn cr_split_across_feed_boundary_still_resolves_as_crlf() {
        let mut scanner = Scanner::new(crlf_only_dialect(), CsvLimits::default(), true);
        let mut events = scanner.feed(b"a,b\r").unwrap();
        events.extend(scanner.feed(b"\n").unwrap());
        events.extend(scanner.finish().unwrap());
        assert!(events.contains(&Event::RecordEnd { row: 0 }));
    }

    #[test]
    fn max_cols_is_enforced_when_the_preceding_field_was_quoted() {
        let limits = CsvLimits { max_cols: 2, ..CsvLimits::default() };
        let mut scanner = Scanner::new(Dialect::default(), limits, true);
        let err = scanner.feed(b"\"a\",\"b\",\"c\"\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Limit);
    }

    #[test]
    fn max_rows_is_enforced_when_the_last_row_ended_in_a_quoted_field() {
        let limits = CsvLimits { max_rows: 1, ..CsvLimits::default() };
        let mut scanner = Scanner::new(Dialect::default(), limits, true);
        let err = scanner.feed(b"\"a\"\n\"b\"\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Limit);
    }
}
