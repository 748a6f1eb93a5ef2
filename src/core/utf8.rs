//! Per-byte UTF-8 validation DFA and BOM / UTF-16/32 transcoding.

/// Validate that `bytes` is well-formed UTF-8 per RFC 3629: no overlong
/// encodings, no lone continuation bytes, no truncated sequences, no
/// surrogate code points (U+D800..=U+DFFF), and nothing above U+10FFFF.
///
/// This intentionally re-derives the check byte-by-byte rather than calling
/// `std::str::from_utf8` so the DFA states match the source's explicit
/// byte-table approach (see design notes in `SPEC_FULL.md` §9).
pub fn validate(bytes: &[u8]) -> bool {
    first_invalid_offset(bytes).is_none()
}

/// Like [`validate`] but returns the byte offset of the first defect.
pub fn first_invalid_offset(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let seq_len = if b0 < 0x80 {
            1
        } else if b0 & 0xE0 == 0xC0 {
            2
        } else if b0 & 0xF0 == 0xE0 {
            3
        } else if b0 & 0xF8 == 0xF0 {
            4
        } else {
            return Some(i);
        };

        if i + seq_len > bytes.len() {
            return Some(i);
        }

        for j in 1..seq_len {
            if bytes[i + j] & 0xC0 != 0x80 {
                return Some(i);
            }
        }

        let cp: u32 = match seq_len {
            1 => u32::from(b0),
            2 => (u32::from(b0 & 0x1F) << 6) | u32::from(bytes[i + 1] & 0x3F),
            3 => {
                (u32::from(b0 & 0x0F) << 12)
                    | (u32::from(bytes[i + 1] & 0x3F) << 6)
                    | u32::from(bytes[i + 2] & 0x3F)
            }
            4 => {
                (u32::from(b0 & 0x07) << 18)
                    | (u32::from(bytes[i + 1] & 0x3F) << 12)
                    | (u32::from(bytes[i + 2] & 0x3F) << 6)
                    | u32::from(bytes[i + 3] & 0x3F)
            }
            _ => unreachable!(),
        };

        let min_cp: u32 = match seq_len {
            1 => 0,
            2 => 0x80,
            3 => 0x800,
            4 => 0x10000,
            _ => unreachable!(),
        };

        if cp < min_cp || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
            return Some(i);
        }

        i += seq_len;
    }
    None
}

/// Detected byte-order mark / encoding family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomKind {
    /// No BOM detected; assumed UTF-8.
    None,
    /// UTF-8 BOM (EF BB BF).
    Utf8,
    /// UTF-16 little-endian BOM (FF FE).
    Utf16Le,
    /// UTF-16 big-endian BOM (FE FF).
    Utf16Be,
    /// UTF-32 little-endian BOM (FF FE 00 00).
    Utf32Le,
    /// UTF-32 big-endian BOM (00 00 FE FF).
    Utf32Be,
}

/// Detect a BOM at the start of `bytes`, returning its kind and length.
pub fn detect_bom(bytes: &[u8]) -> (BomKind, usize) {
    if bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        (BomKind::Utf32Be, 4)
    } else if bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        (BomKind::Utf32Le, 4)
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        (BomKind::Utf8, 3)
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        (BomKind::Utf16Le, 2)
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        (BomKind::Utf16Be, 2)
    } else {
        (BomKind::None, 0)
    }
}

/// Strip a detected BOM and transcode UTF-16/32 input to UTF-8.
///
/// UTF-8 input has its BOM stripped (when present); non-UTF-8 encodings are
/// transcoded to UTF-8 codepoint-by-codepoint.
pub fn normalize_to_utf8(bytes: &[u8]) -> Result<Vec<u8>, usize> {
    let (kind, bom_len) = detect_bom(bytes);
    let body = &bytes[bom_len..];
    match kind {
        BomKind::None | BomKind::Utf8 => Ok(body.to_vec()),
        BomKind::Utf16Le | BomKind::Utf16Be => decode_utf16(body, kind == BomKind::Utf16Le),
        BomKind::Utf32Le | BomKind::Utf32Be => decode_utf32(body, kind == BomKind::Utf32Le),
    }
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<Vec<u8>, usize> {
    if bytes.len() % 2 != 0 {
        return Err(bytes.len());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| {
            if little_endian {
                u16::from_le_bytes([c[0], c[1]])
            } else {
                u16::from_be_bytes([c[0], c[1]])
            }
        })
        .collect();
    let mut out = Vec::with_capacity(units.len() * 2);
    let mut offset = 0usize;
    for ch in char::decode_utf16(units.iter().copied()) {
        match ch {
            Ok(c) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                offset += 1;
            }
            Err(_) => return Err(offset * 2),
        }
    }
    Ok(out)
}

fn decode_utf32(bytes: &[u8], little_endian: bool) -> Result<Vec<u8>, usize> {
    if bytes.len() % 4 != 0 {
        return Err(bytes.len());
    }
    let mut out = Vec::with_capacity(bytes.len());
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        let scalar = if little_endian {
            u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        } else {
            u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        };
        match char::from_u32(scalar) {
            Some(c) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            None => return Err(i * 4),
        }
    }
    Ok(out)
}

/// Normalize CRLF and lone-CR line breaks to LF in place, as required before
/// any line-tracking decision is made (YAML scanner, CSV strict dialects).
pub fn normalize_line_breaks(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' {
            out.push(b'\n');
            if bytes.get(i + 1) == Some(&b'\n') {
                i += 2;
            } else {
                i += 1;
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_valid() {
        assert!(validate(b"hello world"));
    }

    #[test]
    fn valid_multibyte_sequences() {
        assert!(validate("héllo".as_bytes()));
        assert!(validate("日本語".as_bytes()));
        assert!(validate("😀".as_bytes()));
    }

    #[test]
    fn rejects_lone_continuation_byte() {
        assert!(!validate(&[0x80]));
    }

    #[test]
    fn rejects_truncated_sequence() {
        assert!(!validate(&[0xE2, 0x82]));
    }

    #[test]
    fn rejects_overlong_encoding() {
        // Overlong encoding of '/' (U+002F) as a 2-byte sequence.
        assert!(!validate(&[0xC0, 0xAF]));
    }

    #[test]
    fn rejects_surrogate_codepoints() {
        // Encoded surrogate U+D800 (invalid in UTF-8 by definition).
        assert!(!validate(&[0xED, 0xA0, 0x80]));
    }

    #[test]
    fn rejects_above_max_codepoint() {
        // 0xF4 0x90 0x80 0x80 encodes U+110000, one past U+10FFFF.
        assert!(!validate(&[0xF4, 0x90, 0x80, 0x80]));
    }

    #[test]
    fn detects_boms() {
        assert_eq!(detect_bom(&[0xEF, 0xBB, 0xBF, b'a']).0, BomKind::Utf8);
        assert_eq!(detect_bom(&[0xFF, 0xFE, b'a', 0]).0, BomKind::Utf16Le);
        assert_eq!(detect_bom(b"no bom").0, BomKind::None);
    }

    #[test]
    fn normalizes_crlf_and_cr() {
        assert_eq!(normalize_line_breaks(b"a\r\nb\rc\n"), b"a\nb\nc\n");
    }

    #[test]
    fn transcodes_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for u in "hi".encode_utf16() {
            bytes.extend_from_slice(&u.to_le_bytes());
        }
        let out = normalize_to_utf8(&bytes).unwrap();
        assert_eq!(out, b"hi");
    }
}
