//! Block/flow recursive-descent parser producing a flat event stream.
//!
//! The whole document is buffered before parsing (see [`crate::yaml`]
//! module docs for why): YAML's indentation and multi-line plain-scalar
//! rules need unbounded lookahead across line boundaries, which a
//! chunk-tolerant scanner would have to buffer internally anyway.

use crate::core::Position;
use crate::yaml::error::{Error, ErrorKind, Result};
use crate::yaml::scanner::{apply_block_scalar, unescape_double_quoted, unescape_single_quoted, Chomping};
use crate::yaml::tag::TagDirectives;
use crate::yaml::value::{CollectionStyle, ScalarStyle};

/// A single parser event. Mirrors libyaml's event model: `StreamStart` and
/// `StreamEnd` bracket the whole input; each document is bracketed by
/// `DocumentStart`/`DocumentEnd`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart { explicit: bool, yaml_version: Option<(u16, u16)> },
    DocumentEnd { explicit: bool },
    Alias { name: String, position: Position },
    /// A `#`-comment captured when [`ParseOptions::preserve_comments`] is
    /// set. `inline` distinguishes a same-line trailing comment from one
    /// that stood alone on its own line before the next node.
    Comment { text: String, inline: bool, position: Position },
    Scalar {
        value: String,
        style: ScalarStyle,
        anchor: Option<String>,
        tag: Option<String>,
        position: Position,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
        position: Position,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
        position: Position,
    },
    MappingEnd,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum nesting depth (0 = library default of 1000, see [`crate::yaml::Limits`]).
    pub max_depth: usize,
    /// Capture `#` comments as [`Event::Comment`] instead of discarding
    /// them. Off by default, matching the zero-overhead parse path.
    pub preserve_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 1000, preserve_comments: false }
    }
}

/// Parse every document in `text`, returning one event list per document
/// (each individually bracketed by `DocumentStart`/`DocumentEnd`, with no
/// `StreamStart`/`StreamEnd` — those are added once by the caller).
pub fn parse_documents(text: &str, options: ParseOptions) -> Result<Vec<Vec<Event>>> {
    let mut cx = Cursor::new(text, options);
    let mut docs = Vec::new();
    cx.skip_directives_and_markers(docs.is_empty())?;
    loop {
        cx.skip_blank_lines();
        if cx.at_eof() {
            break;
        }
        let explicit = cx.consume_marker("---");
        cx.skip_blanks_and_comments_on_line();
        let mut events = vec![Event::DocumentStart { explicit, yaml_version: cx.yaml_version }];
        cx.flush_pending_comments(&mut events);
        if cx.at_document_end_or_eof() {
            events.push(Event::Scalar {
                value: String::new(),
                style: ScalarStyle::Plain,
                anchor: None,
                tag: None,
                position: cx.position(),
            });
        } else {
            cx.parse_node(0, false, &mut events, 0)?;
        }
        let doc_explicit_end = cx.consume_marker("...");
        events.push(Event::DocumentEnd { explicit: doc_explicit_end });
        docs.push(events);
        cx.tag_directives = TagDirectives::new();
        cx.yaml_version = None;
        if doc_explicit_end {
            cx.skip_blanks_and_comments_on_line();
        }
        let had_directives = cx.skip_directives_and_markers(false)?;
        let _ = had_directives;
    }
    Ok(docs)
}

struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    options: ParseOptions,
    tag_directives: TagDirectives,
    yaml_version: Option<(u16, u16)>,
    /// Comments captured since the last flush, awaiting attachment to
    /// whichever node event comes next.
    pending_comments: Vec<(String, bool, Position)>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, options: ParseOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            options,
            tag_directives: TagDirectives::new(),
            yaml_version: None,
            pending_comments: Vec::new(),
        }
    }

    /// Drain every comment captured so far into `out` as [`Event::Comment`]s.
    fn flush_pending_comments(&mut self, out: &mut Vec<Event>) {
        for (text, inline, position) in self.pending_comments.drain(..) {
            out.push(Event::Comment { text, inline, position });
        }
    }

    fn position(&self) -> Position {
        Position::start().advance_bytes(&self.bytes[..self.pos])
    }

    fn err(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::at(kind, message, self.position())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn current_line(&self) -> &str {
        let rest = self.rest();
        match rest.find('\n') {
            Some(i) => &rest[..i],
            None => rest,
        }
    }

    fn advance_to_next_line(&mut self) {
        match self.rest().find('\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    fn skip_blank_lines(&mut self) {
        loop {
            let line = self.current_line();
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                if self.at_eof() {
                    return;
                }
                self.advance_to_next_line();
            } else if trimmed.starts_with('#') {
                self.record_comment(trimmed, false);
                if self.at_eof() {
                    return;
                }
                self.advance_to_next_line();
            } else {
                return;
            }
        }
    }

    fn skip_blanks_and_comments_on_line(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.bump();
            }
            if self.peek() == Some('#') {
                self.record_comment(self.current_line(), false);
                self.advance_to_next_line();
                self.skip_blank_lines();
                continue;
            }
            if self.peek() == Some('\n') {
                self.bump();
                self.skip_blank_lines();
                continue;
            }
            break;
        }
    }

    /// Record a `#`-comment, stripped of its leading marker. `line` must
    /// start with `#` once trimmed of leading blanks. No-op unless
    /// [`ParseOptions::preserve_comments`] is set.
    fn record_comment(&mut self, line: &str, inline: bool) {
        if !self.options.preserve_comments {
            return;
        }
        let text = line.trim_start_matches('#').trim_start().to_string();
        self.pending_comments.push((text, inline, self.position()));
    }

    fn consume_marker(&mut self, marker: &str) -> bool {
        let line = self.current_line();
        if line.trim_end() == marker || line.starts_with(&format!("{marker} ")) || line.starts_with(&format!("{marker}\t")) {
            self.pos += marker.len();
            true
        } else {
            false
        }
    }

    fn at_document_end_or_eof(&self) -> bool {
        self.at_eof() || self.starts_with("...") || self.starts_with("---")
    }

    /// Consume any `%YAML`/`%TAG` directives and the `---` that must follow
    /// a directive block. Returns whether anything was consumed.
    fn skip_directives_and_markers(&mut self, _first: bool) -> Result<bool> {
        let mut any = false;
        loop {
            self.skip_blank_lines();
            if self.starts_with("%") {
                let line = self.current_line().to_string();
                self.parse_directive(&line)?;
                self.advance_to_next_line();
                any = true;
                continue;
            }
            break;
        }
        Ok(any)
    }

    fn parse_directive(&mut self, line: &str) -> Result<()> {
        let body = line.trim_start_matches('%');
        let mut parts = body.split_whitespace();
        match parts.next() {
            Some("YAML") => {
                let version = parts.next().ok_or_else(|| self.err(ErrorKind::Invalid, "malformed %YAML directive"))?;
                let (major, minor) = version
                    .split_once('.')
                    .and_then(|(maj, min)| Some((maj.parse().ok()?, min.parse().ok()?)))
                    .ok_or_else(|| self.err(ErrorKind::Invalid, format!("malformed %YAML version '{version}'")))?;
                self.yaml_version = Some((major, minor));
            }
            Some("TAG") => {
                let handle = parts.next().ok_or_else(|| self.err(ErrorKind::Invalid, "malformed %TAG directive"))?;
                let prefix = parts.next().ok_or_else(|| self.err(ErrorKind::Invalid, "malformed %TAG directive"))?;
                self.tag_directives.add(handle.to_string(), prefix.to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn indent_of_current_line(&self) -> usize {
        self.current_line().chars().take_while(|&c| c == ' ').count()
    }

    /// Parse one node (scalar, sequence, or mapping), pushing its events.
    /// `min_indent` is the smallest column a nested block structure may
    /// start at; `depth` guards against runaway recursion.
    fn parse_node(&mut self, min_indent: usize, in_flow: bool, out: &mut Vec<Event>, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(self.err(ErrorKind::Limit, "maximum nesting depth exceeded"));
        }
        self.skip_blank_lines();
        self.flush_pending_comments(out);
        let position = self.position();

        // Anchor and tag may appear in either order (`&a !!str x` or
        // `!!str &a x`), so keep consuming whichever comes next.
        let mut anchor = None;
        let mut tag = None;
        loop {
            self.skip_inline_blanks();
            if anchor.is_none() && self.peek() == Some('&') {
                anchor = self.try_consume_anchor();
            } else if tag.is_none() && self.peek() == Some('!') {
                tag = self.try_consume_tag()?;
            } else {
                break;
            }
        }
        self.parse_node_with_meta(min_indent, in_flow, out, depth, anchor, tag, position)
    }

    fn parse_node_with_meta(
        &mut self,
        min_indent: usize,
        in_flow: bool,
        out: &mut Vec<Event>,
        depth: usize,
        anchor: Option<String>,
        tag: Option<String>,
        position: Position,
    ) -> Result<()> {
        self.skip_blank_lines();
        if self.peek() == Some('*') {
            let name = self.consume_alias_name()?;
            out.push(Event::Alias { name, position });
            return Ok(());
        }
        match self.peek() {
            Some('[') => return self.parse_flow_sequence(anchor, tag, out, depth),
            Some('{') => return self.parse_flow_mapping(anchor, tag, out, depth),
            Some('|') | Some('>') => {
                let (value, style) = self.parse_block_scalar()?;
                out.push(Event::Scalar { value, style, anchor, tag, position });
                return Ok(());
            }
            Some('\'') => {
                let value = self.parse_single_quoted()?;
                out.push(Event::Scalar { value, style: ScalarStyle::SingleQuoted, anchor, tag, position });
                return Ok(());
            }
            Some('"') => {
                let value = self.parse_double_quoted()?;
                out.push(Event::Scalar { value, style: ScalarStyle::DoubleQuoted, anchor, tag, position });
                return Ok(());
            }
            _ => {}
        }
        if !in_flow && self.is_block_sequence_entry() {
            return self.parse_block_sequence(min_indent, anchor, tag, out, depth);
        }
        if !in_flow && self.line_has_mapping_key() {
            return self.parse_block_mapping(min_indent, anchor, tag, out, depth);
        }
        let value = self.parse_plain_scalar(in_flow)?;
        out.push(Event::Scalar { value, style: ScalarStyle::Plain, anchor, tag, position });
        self.flush_pending_comments(out);
        Ok(())
    }

    fn skip_inline_blanks(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    fn try_consume_anchor(&mut self) -> Option<String> {
        if self.peek() != Some('&') {
            return None;
        }
        self.bump();
        let start = self.pos;
        while self.peek().is_some_and(is_anchor_char) {
            self.bump();
        }
        Some(self.text[start..self.pos].to_string())
    }

    fn consume_alias_name(&mut self) -> Result<String> {
        self.bump(); // '*'
        let start = self.pos;
        while self.peek().is_some_and(is_anchor_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.err(ErrorKind::Invalid, "empty alias name"));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn try_consume_tag(&mut self) -> Result<Option<String>> {
        if self.peek() != Some('!') {
            return Ok(None);
        }
        let start = self.pos;
        self.bump();
        if self.peek() == Some('<') {
            self.bump();
            while self.peek().is_some_and(|c| c != '>') {
                self.bump();
            }
            self.bump();
        } else {
            while self.peek().is_some_and(|c| !c.is_whitespace() && c != ',' && c != ']' && c != '}') {
                self.bump();
            }
        }
        let shorthand = &self.text[start..self.pos];
        let resolved = self.tag_directives.resolve(shorthand)?;
        Ok(Some(resolved.uri))
    }

    fn is_block_sequence_entry(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("- ") || rest == "-" || rest.starts_with("-\n") || rest.starts_with("-\t")
    }

    /// Scan the current (and, for flow-spanning keys, following) line for a
    /// top-level `:` marking a block mapping key.
    fn line_has_mapping_key(&self) -> bool {
        find_top_level_colon(self.current_line()).is_some()
    }

    fn parse_block_sequence(
        &mut self,
        _min_indent: usize,
        anchor: Option<String>,
        tag: Option<String>,
        out: &mut Vec<Event>,
        depth: usize,
    ) -> Result<()> {
        let indent = self.indent_of_current_line();
        let position = self.position();
        out.push(Event::SequenceStart { anchor, tag, style: CollectionStyle::Block, position });
        loop {
            self.skip_blank_lines();
            self.flush_pending_comments(out);
            if self.at_eof() || self.starts_with("---") || self.starts_with("...") {
                break;
            }
            if self.indent_of_current_line() != indent || !self.is_block_sequence_entry() {
                break;
            }
            self.skip_indent(indent);
            self.bump(); // '-'
            if matches!(self.peek(), Some(' ') | Some('\t')) {
                self.skip_inline_blanks();
            }
            if self.peek().is_none() || self.peek() == Some('\n') {
                self.flush_pending_comments(out);
                out.push(Event::Scalar {
                    value: String::new(),
                    style: ScalarStyle::Plain,
                    anchor: None,
                    tag: None,
                    position: self.position(),
                });
                continue;
            }
            self.parse_node(indent + 1, false, out, depth + 1)?;
        }
        out.push(Event::SequenceEnd);
        Ok(())
    }

    fn parse_block_mapping(
        &mut self,
        _min_indent: usize,
        anchor: Option<String>,
        tag: Option<String>,
        out: &mut Vec<Event>,
        depth: usize,
    ) -> Result<()> {
        let indent = self.indent_of_current_line();
        let position = self.position();
        out.push(Event::MappingStart { anchor, tag, style: CollectionStyle::Block, position });
        loop {
            self.skip_blank_lines();
            self.flush_pending_comments(out);
            if self.at_eof() || self.starts_with("---") || self.starts_with("...") {
                break;
            }
            if self.indent_of_current_line() != indent {
                break;
            }
            if !self.line_has_mapping_key() && !self.starts_with("? ") {
                break;
            }
            self.skip_indent(indent);
            let explicit_key = self.starts_with("? ");
            if explicit_key {
                self.bump();
                self.bump();
            }
            let key_position = self.position();
            let key_anchor = self.try_consume_anchor();
            self.skip_inline_blanks();
            let key_tag = self.try_consume_tag()?;
            self.skip_inline_blanks();
            let key_text = self.consume_mapping_key_text()?;
            out.push(Event::Scalar {
                value: key_text,
                style: ScalarStyle::Plain,
                anchor: key_anchor,
                tag: key_tag,
                position: key_position,
            });
            self.skip_inline_blanks();
            if self.peek() == Some(':') {
                self.bump();
            }
            self.skip_inline_blanks();
            if self.peek().is_none() || self.peek() == Some('\n') || self.peek() == Some('#') {
                self.skip_blanks_and_comments_on_line();
                let next_indent = if self.at_eof() { 0 } else { self.indent_of_current_line() };
                if next_indent > indent {
                    self.parse_node(next_indent, false, out, depth + 1)?;
                } else {
                    self.flush_pending_comments(out);
                    out.push(Event::Scalar {
                        value: String::new(),
                        style: ScalarStyle::Plain,
                        anchor: None,
                        tag: None,
                        position: self.position(),
                    });
                }
            } else {
                self.parse_node(indent + 1, false, out, depth + 1)?;
            }
        }
        out.push(Event::MappingEnd);
        Ok(())
    }

    fn consume_mapping_key_text(&mut self) -> Result<String> {
        match self.peek() {
            Some('\'') => self.parse_single_quoted(),
            Some('"') => self.parse_double_quoted(),
            _ => {
                let line = self.current_line();
                let end = find_top_level_colon(line).unwrap_or(line.len());
                let key = line[..end].trim().to_string();
                self.pos += end;
                Ok(key)
            }
        }
    }

    fn skip_indent(&mut self, n: usize) {
        for _ in 0..n {
            if self.peek() == Some(' ') {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn parse_plain_scalar(&mut self, in_flow: bool) -> Result<String> {
        let mut lines = Vec::new();
        let base_indent = self.indent_of_current_line();
        loop {
            let line = self.current_line();
            let comment_at = if in_flow {
                None
            } else {
                line.find('#').filter(|&i| i > 0 && line.as_bytes()[i - 1].is_ascii_whitespace())
            };
            let end = if in_flow { find_flow_scalar_end(line) } else { comment_at.unwrap_or(line.len()) };
            lines.push(line[..end].trim_end().to_string());
            if let Some(i) = comment_at {
                self.record_comment(&line[i..], true);
                self.pos += line.len();
                break;
            }
            self.pos += end;
            if in_flow {
                break;
            }
            // lookahead: does the next line continue this plain scalar?
            let save = self.pos;
            self.skip_inline_blanks();
            if self.peek() != Some('\n') {
                break;
            }
            self.bump();
            self.skip_blank_lines();
            if self.at_eof() || self.starts_with("---") || self.starts_with("...") {
                self.pos = save;
                break;
            }
            let next_indent = self.indent_of_current_line();
            if next_indent <= base_indent || self.is_block_sequence_entry() || self.line_has_mapping_key() {
                self.pos = save;
                break;
            }
        }
        let joined = lines.join(" ").trim().to_string();
        if joined.is_empty() {
            return Err(self.err(ErrorKind::Invalid, "expected a scalar value"));
        }
        Ok(joined)
    }

    fn parse_single_quoted(&mut self) -> Result<String> {
        self.bump(); // opening '
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.err(ErrorKind::Unterminated, "unterminated single-quoted scalar")),
                Some('\'') => {
                    self.bump();
                    if self.peek() == Some('\'') {
                        self.bump();
                        continue;
                    }
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let body = &self.text[start..self.pos - 1];
        Ok(unescape_single_quoted(&normalize_scalar_whitespace(body)))
    }

    fn parse_double_quoted(&mut self) -> Result<String> {
        let at = self.position();
        self.bump(); // opening "
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.err(ErrorKind::Unterminated, "unterminated double-quoted scalar")),
                Some('"') => {
                    let mut backslashes = 0;
                    let mut j = self.pos;
                    while j > start && self.bytes[j - 1] == b'\\' {
                        backslashes += 1;
                        j -= 1;
                    }
                    if backslashes % 2 == 0 {
                        break;
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let body = &self.text[start..self.pos];
        self.bump(); // closing "
        unescape_double_quoted(&normalize_scalar_whitespace(body), at)
    }

    fn parse_block_scalar(&mut self) -> Result<(String, ScalarStyle)> {
        let folded = self.peek() == Some('>');
        self.bump();
        let mut chomping = Chomping::Clip;
        let mut explicit_indent: Option<usize> = None;
        loop {
            match self.peek() {
                Some('-') => {
                    chomping = Chomping::Strip;
                    self.bump();
                }
                Some('+') => {
                    chomping = Chomping::Keep;
                    self.bump();
                }
                Some(d) if d.is_ascii_digit() => {
                    explicit_indent = Some(d.to_digit(10).unwrap() as usize);
                    self.bump();
                }
                _ => break,
            }
        }
        self.skip_blanks_and_comments_on_line_no_skip_blank();
        let header_indent = self.indent_of_current_line();
        let base_indent = explicit_indent.map_or(None, |n| Some(header_indent + n));
        let mut content_indent: Option<usize> = base_indent;
        let mut lines = Vec::new();
        loop {
            if self.at_eof() {
                break;
            }
            let line = self.current_line();
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                lines.push(String::new());
                self.advance_to_next_line();
                continue;
            }
            let indent = line.chars().take_while(|&c| c == ' ').count();
            if content_indent.is_none() {
                if indent <= header_indent {
                    break;
                }
                content_indent = Some(indent);
            }
            let ci = content_indent.unwrap();
            if indent < ci {
                break;
            }
            lines.push(line[ci.min(line.len())..].to_string());
            self.advance_to_next_line();
        }
        while lines.last().is_some_and(|l| l.is_empty()) && !matches!(chomping, Chomping::Keep) {
            lines.pop();
        }
        let style = if folded { ScalarStyle::Folded } else { ScalarStyle::Literal };
        Ok((apply_block_scalar(&lines, folded, chomping), style))
    }

    fn skip_blanks_and_comments_on_line_no_skip_blank(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
        if self.peek() == Some('#') {
            self.advance_to_next_line();
        } else if self.peek() == Some('\n') {
            self.bump();
        }
    }

    fn parse_flow_sequence(&mut self, anchor: Option<String>, tag: Option<String>, out: &mut Vec<Event>, depth: usize) -> Result<()> {
        let position = self.position();
        self.bump(); // '['
        out.push(Event::SequenceStart { anchor, tag, style: CollectionStyle::Flow, position });
        loop {
            self.skip_flow_whitespace();
            self.flush_pending_comments(out);
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            if self.peek().is_none() {
                return Err(self.err(ErrorKind::Unterminated, "unterminated flow sequence"));
            }
            self.parse_node(0, true, out, depth + 1)?;
            self.skip_flow_whitespace();
            if self.peek() == Some(',') {
                self.bump();
            }
        }
        out.push(Event::SequenceEnd);
        Ok(())
    }

    fn parse_flow_mapping(&mut self, anchor: Option<String>, tag: Option<String>, out: &mut Vec<Event>, depth: usize) -> Result<()> {
        let position = self.position();
        self.bump(); // '{'
        out.push(Event::MappingStart { anchor, tag, style: CollectionStyle::Flow, position });
        loop {
            self.skip_flow_whitespace();
            self.flush_pending_comments(out);
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            if self.peek().is_none() {
                return Err(self.err(ErrorKind::Unterminated, "unterminated flow mapping"));
            }
            self.parse_node(0, true, out, depth + 1)?;
            self.skip_flow_whitespace();
            if self.peek() == Some(':') {
                self.bump();
                self.skip_flow_whitespace();
                self.parse_node(0, true, out, depth + 1)?;
            } else {
                self.flush_pending_comments(out);
                out.push(Event::Scalar {
                    value: String::new(),
                    style: ScalarStyle::Plain,
                    anchor: None,
                    tag: None,
                    position: self.position(),
                });
            }
            self.skip_flow_whitespace();
            if self.peek() == Some(',') {
                self.bump();
            }
        }
        out.push(Event::MappingEnd);
        Ok(())
    }

    fn skip_flow_whitespace(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n')) {
                self.bump();
            }
            if self.peek() == Some('#') {
                self.record_comment(self.current_line(), false);
                self.advance_to_next_line();
                continue;
            }
            break;
        }
    }
}

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

fn normalize_scalar_whitespace(body: &str) -> String {
    // Fold line breaks inside a multi-line quoted scalar the same way a
    // plain scalar folds: blank line -> newline, otherwise -> single space.
    let lines: Vec<&str> = body.split('\n').map(str::trim_end).collect();
    if lines.len() == 1 {
        return lines[0].trim().to_string();
    }
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if i == 0 {
            out.push_str(trimmed);
        } else if trimmed.is_empty() {
            out.push('\n');
        } else if out.ends_with('\n') || out.is_empty() {
            out.push_str(trimmed);
        } else {
            out.push(' ');
            out.push_str(trimmed);
        }
    }
    out
}

/// Find the byte offset of a `:` that separates a block mapping key from
/// its value on `line`: not inside quotes or flow brackets, and followed by
/// whitespace or end-of-line.
fn find_top_level_colon(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut depth = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
        } else if in_double {
            if b == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
                in_double = false;
            }
        } else {
            match b {
                b'\'' => in_single = true,
                b'"' => in_double = true,
                b'[' | b'{' => depth += 1,
                b']' | b'}' => depth -= 1,
                b':' if depth == 0 => {
                    let next_ok = i + 1 == bytes.len() || bytes[i + 1] == b' ' || bytes[i + 1] == b'\t';
                    if next_ok && (i == 0 || bytes[i - 1] != b'#') {
                        return Some(i);
                    }
                }
                b'#' if depth == 0 && i > 0 && bytes[i - 1].is_ascii_whitespace() => return None,
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn find_flow_scalar_end(line: &str) -> usize {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b',' | b']' | b'}' | b':') {
            return i;
        }
        if b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return i;
        }
    }
    line.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_of(yaml: &str) -> Vec<Event> {
        let docs = parse_documents(yaml, ParseOptions::default()).unwrap();
        docs.into_iter().next().unwrap()
    }

    #[test]
    fn flat_mapping_produces_key_value_scalars() {
        let events = events_of("a: 1\nb: two\n");
        assert!(matches!(events[1], Event::MappingStart { .. }));
        assert!(matches!(&events[2], Event::Scalar { value, .. } if value == "a"));
        assert!(matches!(&events[3], Event::Scalar { value, .. } if value == "1"));
    }

    #[test]
    fn nested_block_sequence_under_key() {
        let events = events_of("items:\n  - one\n  - two\n");
        assert!(events.iter().any(|e| matches!(e, Event::SequenceStart { .. })));
    }

    #[test]
    fn flow_sequence_parses_inline() {
        let events = events_of("[1, 2, 3]\n");
        assert!(matches!(events[1], Event::SequenceStart { style: CollectionStyle::Flow, .. }));
    }

    #[test]
    fn anchor_and_alias_round_trip_through_events() {
        let events = events_of("a: &x 1\nb: *x\n");
        assert!(events.iter().any(|e| matches!(e, Event::Scalar { anchor: Some(a), .. } if a == "x")));
        assert!(events.iter().any(|e| matches!(e, Event::Alias { name, .. } if name == "x")));
    }

    #[test]
    fn literal_block_scalar_preserves_newlines() {
        let events = events_of("a: |\n  line1\n  line2\n");
        let scalar = events.iter().find_map(|e| match e {
            Event::Scalar { value, style: ScalarStyle::Literal, .. } => Some(value.clone()),
            _ => None,
        });
        assert_eq!(scalar.unwrap(), "line1\nline2\n");
    }

    #[test]
    fn multi_document_stream_has_two_document_starts() {
        let docs = parse_documents("a: 1\n---\nb: 2\n", ParseOptions::default()).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn comments_are_dropped_by_default() {
        let events = events_of("# leading\na: 1 # trailing\n");
        assert!(!events.iter().any(|e| matches!(e, Event::Comment { .. })));
    }

    #[test]
    fn preserve_comments_captures_leading_and_trailing_text() {
        let docs = parse_documents("# leading\na: 1 # trailing\n", ParseOptions { preserve_comments: true, ..ParseOptions::default() }).unwrap();
        let events = docs.into_iter().next().unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::Comment { text, inline: false, .. } if text == "leading")));
        assert!(events.iter().any(|e| matches!(e, Event::Comment { text, inline: true, .. } if text == "trailing")));
    }
}
