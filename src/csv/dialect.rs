//! CSV dialect configuration.

/// How an embedded quote character is escaped inside a quoted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// Escape quotes by doubling them (`""`) — the default, RFC 4180 style.
    DoubledQuote,
    /// Escape quotes with a preceding backslash (`\"`).
    Backslash,
    /// No escaping at all (not recommended).
    None,
}

/// How to resolve duplicate header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDupMode {
    /// Fail the parse on a duplicate column name (default).
    Error,
    /// Keep the index of the first occurrence.
    FirstWins,
    /// Keep the index of the last occurrence.
    LastWins,
    /// Record every index a duplicate name occurs at.
    Collect,
}

/// The format rules governing a CSV parse or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Byte separating fields within a record.
    pub delimiter: u8,
    /// Byte surrounding quoted fields.
    pub quote: u8,
    /// How an embedded quote is represented inside a quoted field.
    pub escape: EscapeMode,
    /// Allow bare newlines inside quoted fields.
    pub newline_in_quotes: bool,
    /// Recognize `\n` as a line terminator.
    pub accept_lf: bool,
    /// Recognize `\r\n` as a line terminator.
    pub accept_crlf: bool,
    /// Recognize a lone `\r` as a line terminator.
    pub accept_cr: bool,
    /// Trim leading/trailing whitespace from unquoted fields.
    pub trim_unquoted_fields: bool,
    /// Skip spaces immediately after a delimiter before a new field starts.
    pub allow_space_after_delimiter: bool,
    /// Allow a quote character to appear inside an unquoted field.
    pub allow_unquoted_quotes: bool,
    /// Allow a bare newline inside an unquoted field.
    pub allow_unquoted_newlines: bool,
    /// Treat lines starting with `comment_prefix` as comments.
    pub allow_comments: bool,
    /// Prefix identifying a comment line.
    pub comment_prefix: String,
    /// Treat the first record as a header row rather than data.
    pub treat_first_row_as_header: bool,
    /// How to resolve duplicate header names.
    pub header_dup_mode: HeaderDupMode,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: EscapeMode::DoubledQuote,
            newline_in_quotes: true,
            accept_lf: true,
            accept_crlf: true,
            accept_cr: false,
            trim_unquoted_fields: false,
            allow_space_after_delimiter: false,
            allow_unquoted_quotes: false,
            allow_unquoted_newlines: false,
            allow_comments: false,
            comment_prefix: "#".to_string(),
            treat_first_row_as_header: false,
            header_dup_mode: HeaderDupMode::Error,
        }
    }
}

impl Dialect {
    /// Strict RFC 4180 defaults: comma/quote/doubled-quote escaping, no
    /// extensions enabled.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Tab-separated values, otherwise RFC 4180-like.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

/// Resource limits for a parse; `0` means "use the library default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLimits {
    /// Maximum number of rows (0 = 10,000,000).
    pub max_rows: usize,
    /// Maximum number of columns per row (0 = 100,000).
    pub max_cols: usize,
    /// Maximum field size in bytes (0 = 16 MiB).
    pub max_field_bytes: usize,
    /// Maximum record size in bytes (0 = 64 MiB).
    pub max_record_bytes: usize,
    /// Maximum total input size in bytes (0 = 1 GiB).
    pub max_total_bytes: usize,
}

impl Default for CsvLimits {
    fn default() -> Self {
        Self {
            max_rows: 0,
            max_cols: 0,
            max_field_bytes: 0,
            max_record_bytes: 0,
            max_total_bytes: 0,
        }
    }
}

impl CsvLimits {
    const DEFAULT_MAX_ROWS: usize = 10_000_000;
    const DEFAULT_MAX_COLS: usize = 100_000;
    const DEFAULT_MAX_FIELD_BYTES: usize = 16 * 1024 * 1024;
    const DEFAULT_MAX_RECORD_BYTES: usize = 64 * 1024 * 1024;
    const DEFAULT_MAX_TOTAL_BYTES: usize = 1024 * 1024 * 1024;

    pub(crate) fn rows(self) -> usize {
        if self.max_rows == 0 {
            Self::DEFAULT_MAX_ROWS
        } else {
            self.max_rows
        }
    }

    pub(crate) fn cols(self) -> usize {
        if self.max_cols == 0 {
            Self::DEFAULT_MAX_COLS
        } else {
            self.max_cols
        }
    }

    pub(crate) fn field_bytes(self) -> usize {
        if self.max_field_bytes == 0 {
            Self::DEFAULT_MAX_FIELD_BYTES
        } else {
            self.max_field_bytes
        }
    }

    pub(crate) fn record_bytes(self) -> usize {
        if self.max_record_bytes == 0 {
            Self::DEFAULT_MAX_RECORD_BYTES
        } else {
            self.max_record_bytes
        }
    }

    pub(crate) fn total_bytes(self) -> usize {
        if self.max_total_bytes == 0 {
            Self::DEFAULT_MAX_TOTAL_BYTES
        } else {
            self.max_total_bytes
        }
    }
}

/// Options controlling a parse beyond the dialect itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// The dialect to parse under.
    pub dialect: Dialect,
    /// Reject input containing invalid UTF-8 field bytes.
    pub validate_utf8: bool,
    /// Allow a leading UTF-8 BOM (stripped either way).
    pub keep_bom: bool,
    /// Resource limits.
    pub limits: CsvLimits,
    /// Generate a context snippet on error.
    pub enable_context_snippet: bool,
    /// Bytes of context before/after the error offset in the snippet.
    pub context_radius_bytes: usize,
    /// Tolerate rows whose length differs from the header/first row.
    pub allow_irregular_rows: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            validate_utf8: true,
            keep_bom: false,
            limits: CsvLimits::default(),
            enable_context_snippet: true,
            context_radius_bytes: 40,
            allow_irregular_rows: false,
        }
    }
}

/// Options controlling how a table or event stream is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// The dialect to write under.
    pub dialect: Dialect,
    /// Line terminator to emit between records.
    pub newline: String,
    /// Quote every field regardless of content.
    pub quote_all_fields: bool,
    /// Quote fields that are empty.
    pub quote_empty_fields: bool,
    /// Quote fields containing the delimiter, quote, or a newline.
    pub quote_if_needed: bool,
    /// Collapse trailing empty fields per row (irregular-rows mode).
    pub trim_trailing_empty_fields: bool,
    /// Emit a terminal newline after the last record.
    pub trailing_newline: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            newline: "\n".to_string(),
            quote_all_fields: false,
            quote_empty_fields: true,
            quote_if_needed: true,
            trim_trailing_empty_fields: false,
            trailing_newline: false,
        }
    }
}
