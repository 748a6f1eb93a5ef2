//! CSV DOM: an in-memory table with optional header and irregular-row support.

use super::dialect::{HeaderDupMode, ParseOptions};
use super::error::{Error, ErrorKind, Result};
use super::scanner::{Event, Scanner};
use crate::core::{utf8, ErrorContext, Position};
use std::collections::HashMap;

/// A CSV field: raw bytes, not necessarily UTF-8 unless validated.
pub type Field = Vec<u8>;
/// A CSV record: an ordered sequence of fields.
pub type Row = Vec<Field>;

/// An ordered table of CSV rows, with optional header tracking.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Row>,
    header: Option<Vec<String>>,
    header_index: HashMap<String, Vec<usize>>,
    /// Whether rows of differing lengths are tolerated.
    pub allow_irregular_rows: bool,
}

impl Table {
    /// Create an empty table.
    pub fn new(allow_irregular_rows: bool) -> Self {
        Self {
            rows: Vec::new(),
            header: None,
            header_index: HashMap::new(),
            allow_irregular_rows,
        }
    }

    /// Number of data rows (excluding the header, if any).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow a row by index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// The header row, if `treat_first_row_as_header` was set during parse
    /// or [`Table::set_header`] was called.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Install a header explicitly (builder API path).
    pub fn set_header(&mut self, names: Vec<String>, dup_mode: HeaderDupMode) -> Result<()> {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_default().push(i);
        }
        match dup_mode {
            HeaderDupMode::Error => {
                if let Some((name, idxs)) = index.iter().find(|(_, v)| v.len() > 1) {
                    return Err(Error::new(
                        ErrorKind::DuplicateHeader,
                        format!("duplicate header column '{name}' at indices {idxs:?}"),
                    ));
                }
            }
            HeaderDupMode::FirstWins | HeaderDupMode::LastWins | HeaderDupMode::Collect => {}
        }
        self.header = Some(names);
        self.header_index = index;
        Ok(())
    }

    /// Resolve a header name to the column index selected by the dup-mode
    /// used when the header was set. Returns `None` if unknown.
    pub fn column_index(&self, name: &str, dup_mode: HeaderDupMode) -> Option<usize> {
        let idxs = self.header_index.get(name)?;
        match dup_mode {
            HeaderDupMode::Error | HeaderDupMode::FirstWins => idxs.first().copied(),
            HeaderDupMode::LastWins => idxs.last().copied(),
            HeaderDupMode::Collect => idxs.first().copied(),
        }
    }

    /// All column indices a (possibly duplicated) header name maps to.
    pub fn column_indices(&self, name: &str) -> &[usize] {
        self.header_index.get(name).map_or(&[], Vec::as_slice)
    }

    /// Append a row, enforcing regularity unless `allow_irregular_rows`.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if !self.allow_irregular_rows {
            if let Some(expected) = self.reference_len() {
                if row.len() != expected {
                    return Err(Error::new(
                        ErrorKind::IrregularRow,
                        format!("row has {} fields, expected {}", row.len(), expected),
                    ));
                }
            }
        }
        self.rows.push(row);
        Ok(())
    }

    fn reference_len(&self) -> Option<usize> {
        self.header
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.rows.first().map(Vec::len))
    }

    /// Insert a new column at `index`, padding short rows with empty fields
    /// up to the insertion point.
    pub fn insert_column(&mut self, index: usize, values: &[Field]) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            while row.len() < index {
                row.push(Vec::new());
            }
            let value = values.get(i).cloned().unwrap_or_default();
            row.insert(index.min(row.len()), value);
        }
    }

    /// Append a new column to every row.
    pub fn append_column(&mut self, values: &[Field]) {
        let width = self.max_col_count();
        self.insert_column(width, values);
    }

    /// Set a single field, growing the row with empty fields if necessary
    /// (only meaningful when `allow_irregular_rows` is set).
    pub fn set_field(&mut self, row: usize, col: usize, value: Field) -> Result<()> {
        let r = self
            .rows
            .get_mut(row)
            .ok_or_else(|| Error::new(ErrorKind::State, "row index out of bounds"))?;
        if col >= r.len() {
            if !self.allow_irregular_rows {
                return Err(Error::new(
                    ErrorKind::IrregularRow,
                    "column index out of bounds and irregular rows are disallowed",
                ));
            }
            r.resize(col + 1, Vec::new());
        }
        r[col] = value;
        Ok(())
    }

    /// Smallest row length across the table.
    pub fn min_col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Largest row length across the table.
    pub fn max_col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Validate that every row satisfies the dialect's regularity
    /// constraint; always `Ok` when `allow_irregular_rows` is set.
    pub fn validate_table(&self) -> Result<()> {
        if self.allow_irregular_rows {
            return Ok(());
        }
        let Some(expected) = self.reference_len() else {
            return Ok(());
        };
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != expected {
                return Err(Error::new(
                    ErrorKind::IrregularRow,
                    format!("row {i} has {} fields, expected {expected}", row.len()),
                ));
            }
        }
        Ok(())
    }

    /// Right-pad every row with empty fields up to [`Table::max_col_count`].
    pub fn normalize_to_max(&mut self) {
        let width = self.max_col_count();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, Vec::new());
            }
        }
    }
}

/// Parse a CSV byte buffer into a [`Table`] according to `options`.
pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Table> {
    let (_, bom_len) = utf8::detect_bom(input);
    let body = if options.keep_bom { input } else { &input[bom_len..] };

    let mut scanner = Scanner::new(
        options.dialect.clone(),
        options.limits,
        options.validate_utf8,
    );
    let mut events = scanner.feed(body).map_err(|e| attach_context(e, body, options))?;
    events.extend(scanner.finish().map_err(|e| attach_context(e, body, options))?);

    let mut table = Table::new(options.allow_irregular_rows);
    let mut current_row: Row = Vec::new();
    let mut first_record = true;

    for event in events {
        match event {
            Event::RecordBegin { .. } => current_row = Vec::new(),
            Event::Field { bytes, row, col, .. } => {
                if options.validate_utf8 {
                    if let Some(bad) = utf8::first_invalid_offset(&bytes) {
                        return Err(attach_context(
                            Error::new(
                                ErrorKind::InvalidUtf8,
                                format!("invalid UTF-8 at byte {bad} of field ({row}, {col})"),
                            ),
                            body,
                            options,
                        ));
                    }
                }
                current_row.push(bytes);
            }
            Event::RecordEnd { .. } => {
                if first_record && options.dialect.treat_first_row_as_header {
                    let names: Vec<String> = current_row
                        .iter()
                        .map(|f| String::from_utf8_lossy(f).into_owned())
                        .collect();
                    table.set_header(names, options.dialect.header_dup_mode)?;
                } else {
                    table.push_row(std::mem::take(&mut current_row))?;
                }
                first_record = false;
            }
            Event::End => {}
        }
    }
    Ok(table)
}

fn attach_context(mut err: Error, body: &[u8], options: &ParseOptions) -> Error {
    if options.enable_context_snippet && err.context.is_none() {
        let pos = if err.position == Position::start() && err.byte_offset > 0 {
            Position::at(1, err.byte_offset + 1, err.byte_offset)
        } else {
            err.position
        };
        err.context = Some(ErrorContext::from_input(body, pos, options.context_radius_bytes));
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::dialect::ParseOptions;

    #[test]
    fn scenario_a_parse_and_shape() {
        let input = b"Name,Age,City\nAlice,30,\"New, York\"\n";
        let table = parse(input, &ParseOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.row(1).unwrap(),
            &vec![b"Alice".to_vec(), b"30".to_vec(), b"New, York".to_vec()]
        );
    }

    #[test]
    fn header_row_is_separated_from_data() {
        let mut opts = ParseOptions::default();
        opts.dialect.treat_first_row_as_header = true;
        let table = parse(b"a,b\n1,2\n3,4\n", &opts).unwrap();
        assert_eq!(table.header(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_header_error_mode_fails() {
        let mut opts = ParseOptions::default();
        opts.dialect.treat_first_row_as_header = true;
        let err = parse(b"a,a\n1,2\n", &opts).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateHeader);
    }

    #[test]
    fn irregular_rows_require_opt_in() {
        let mut opts = ParseOptions::default();
        opts.dialect.allow_space_after_delimiter = false;
        let err = parse(b"a,b\nc\n", &opts).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IrregularRow);
    }

    #[test]
    fn normalize_to_max_pads_short_rows() {
        let mut table = Table::new(true);
        table.push_row(vec![b"a".to_vec(), b"b".to_vec()]).unwrap();
        table.push_row(vec![b"c".to_vec()]).unwrap();
        table.normalize_to_max();
        assert_eq!(table.row(1).unwrap().len(), 2);
    }

    #[test]
    fn insert_column_pads_short_rows() {
        let mut table = Table::new(true);
        table.push_row(vec![b"a".to_vec()]).unwrap();
        table.push_row(vec![b"b".to_vec(), b"c".to_vec()]).unwrap();
        table.insert_column(1, &[b"x".to_vec(), b"y".to_vec()]);
        assert_eq!(table.row(0).unwrap(), &vec![b"a".to_vec(), b"x".to_vec()]);
    }
}
