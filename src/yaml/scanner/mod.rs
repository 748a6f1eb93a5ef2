//! Scalar-level lexical helpers shared by the block/flow parser: escape
//! decoding for quoted scalars and chomping/indentation rules for block
//! scalars.

use crate::yaml::error::{Error, ErrorKind, Result};
use crate::core::Position;

/// How trailing line breaks are handled at the end of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomping {
    /// `-`: strip all trailing line breaks.
    Strip,
    /// (default): keep a single trailing line break.
    Clip,
    /// `+`: keep all trailing line breaks.
    Keep,
}

/// Decode a single-quoted scalar body (between the quotes). The only
/// escape in single-quoted scalars is `''` for a literal `'`.
pub fn unescape_single_quoted(body: &str) -> String {
    body.replace("''", "'")
}

/// Decode a double-quoted scalar body (between the quotes), expanding
/// backslash escapes per YAML 1.2 §5.7.
pub fn unescape_double_quoted(body: &str, at: Position) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('t') | Some('\t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('v') => out.push('\u{b}'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some('e') => out.push('\u{1b}'),
            Some(' ') => out.push(' '),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('\\') => out.push('\\'),
            Some('N') => out.push('\u{85}'),
            Some('_') => out.push('\u{a0}'),
            Some('L') => out.push('\u{2028}'),
            Some('P') => out.push('\u{2029}'),
            Some('x') => out.push(read_hex_escape(&mut chars, 2, at)?),
            Some('u') => out.push(read_hex_escape(&mut chars, 4, at)?),
            Some('U') => out.push(read_hex_escape(&mut chars, 8, at)?),
            Some('\n') => {
                // Escaped line break: removes the break (line folding).
            }
            Some(other) => {
                return Err(Error::at(ErrorKind::Invalid, format!("invalid escape '\\{other}'"), at));
            }
            None => return Err(Error::at(ErrorKind::Unterminated, "trailing backslash in quoted scalar", at)),
        }
    }
    Ok(out)
}

fn read_hex_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize, at: Position) -> Result<char> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let d = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| Error::at(ErrorKind::Invalid, "invalid hex escape", at))?;
        value = value * 16 + d;
    }
    char::from_u32(value).ok_or_else(|| Error::at(ErrorKind::Invalid, "escape is not a valid codepoint", at))
}

/// Apply chomping and the explicit/auto-detected indentation indicator to
/// the raw lines of a block scalar, producing the final string content.
pub fn apply_block_scalar(lines: &[&str], folded: bool, chomping: Chomping) -> String {
    let mut content = if folded { fold_lines(lines) } else { lines.join("\n") };
    match chomping {
        Chomping::Strip => {
            while content.ends_with('\n') {
                content.pop();
            }
        }
        Chomping::Clip => {
            while content.ends_with('\n') {
                content.pop();
            }
            if !lines.is_empty() {
                content.push('\n');
            }
        }
        Chomping::Keep => {
            if !lines.is_empty() {
                content.push('\n');
            }
        }
    }
    content
}

fn fold_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            if line.is_empty() || lines[i - 1].is_empty() {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quote_escape_is_only_doubled_quote() {
        assert_eq!(unescape_single_quoted("it''s"), "it's");
    }

    #[test]
    fn double_quote_escapes_common_sequences() {
        let s = unescape_double_quoted("a\\nb\\tc", Position::start()).unwrap();
        assert_eq!(s, "a\nb\tc");
    }

    #[test]
    fn double_quote_hex_escape_decodes_unicode() {
        let s = unescape_double_quoted("\\u00e9", Position::start()).unwrap();
        assert_eq!(s, "\u{e9}");
    }

    #[test]
    fn folded_lines_join_with_space_but_blank_lines_become_newlines() {
        let folded = fold_lines(&["a", "b", "", "c"]);
        assert_eq!(folded, "a b\nc");
    }

    #[test]
    fn clip_chomping_keeps_single_trailing_newline() {
        let s = apply_block_scalar(&["a", "b"], false, Chomping::Clip);
        assert_eq!(s, "a\nb\n");
    }

    #[test]
    fn strip_chomping_removes_trailing_newline() {
        let s = apply_block_scalar(&["a", "b"], false, Chomping::Strip);
        assert_eq!(s, "a\nb");
    }
}
