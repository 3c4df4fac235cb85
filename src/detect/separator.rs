use std::io::{self, Read, Seek};

use log::debug;
use regex::bytes::RegexSet;

use crate::io::source::ByteSource;

/// Separators tried by detection, in order of preference.
pub const CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

const SEPARATOR_LINE_PREFIX: &[u8] = b"sep=";

/// One pattern per candidate, in candidate order, matching a quoted field
/// delimited by that candidate or a line boundary.
fn quoted_field_patterns(quote: u8) -> RegexSet {
    let patterns = CANDIDATES.map(|separator| {
        format!(
            r"(?-u)(?:^|\x{s:02X})\x{q:02X}[^\x{q:02X}]*\x{q:02X}(?:\x{s:02X}|$)",
            s = separator,
            q = quote
        )
    });
    RegexSet::new(patterns).expect("byte-escaped separator patterns")
}

/// Picks the separator of a line.
///
/// A candidate that encloses a quoted field is taken at once, the earliest
/// one when several do. Otherwise the candidate splitting the line into the
/// most fields wins, the earlier one on ties; `fallback` is used when no
/// candidate splits the line at all.
pub fn detect_separator_in(line: &[u8], fallback: u8, quote: u8) -> u8 {
    let line = line.strip_suffix(b"\n").unwrap_or(line);

    if let Some(index) = quoted_field_patterns(quote).matches(line).iter().next() {
        return CANDIDATES[index];
    }

    let mut separator = fallback;
    let mut columns = 1;
    for candidate in CANDIDATES {
        let count = line.split(|&b| b == candidate).count();
        if count > columns {
            separator = candidate;
            columns = count;
        }
    }
    separator
}

/// Detects the separator from the line starting at `offset`.
///
/// The source must already deliver `\n`-terminated text. Its position is
/// left unchanged.
pub fn detect_column_separator<R: Read + Seek>(
    source: &mut ByteSource<R>,
    offset: u64,
    fallback: u8,
    quote: u8,
) -> io::Result<u8> {
    let saved = source.tell();
    source.seek_to(offset)?;
    let line = source.read_line()?;
    source.seek_to(saved)?;

    let separator = match line {
        Some(line) => detect_separator_in(&line, fallback, quote),
        None => fallback,
    };
    debug!("column separator detected: {:?}", char::from(separator));
    Ok(separator)
}

/// Recognizes a spreadsheet `sep=X` declaration line.
///
/// Returns `Some(declared)` for a declaration line, where `declared` is the
/// separator byte or `None` when the line names none.
pub fn separator_declaration(line: &[u8]) -> Option<Option<u8>> {
    let rest = line.strip_prefix(SEPARATOR_LINE_PREFIX)?;
    Some(rest.first().copied().filter(|&b| b != b'\n'))
}
