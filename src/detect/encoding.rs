use std::io::{self, Read, Seek};

use log::debug;

use crate::{core::config::LineTerminator, io::charset::Charset, io::source::ByteSource};

/// Bytes inspected when looking for a wide newline or validating UTF-8.
pub const DETECTION_WINDOW: usize = 1024;

/// Byte-order marks, longest match first where prefixes overlap.
const BOMS: [(&[u8], Charset); 5] = [
    (b"\xEF\xBB\xBF", Charset::Utf8),
    (b"\xFF\xFE\x00\x00", Charset::Utf32Le),
    (b"\xFF\xFE", Charset::Utf16Le),
    (b"\xFE\xFF", Charset::Utf16Be),
    (b"\x00\x00\xFE\xFF", Charset::Utf32Be),
];

/// Identifies a byte-order mark at the start of `head`.
///
/// Returns the charset and the length of the mark.
pub fn sniff_bom(head: &[u8]) -> Option<(Charset, usize)> {
    BOMS.iter()
        .find(|(bom, _)| head.starts_with(bom))
        .map(|(bom, charset)| (*charset, bom.len()))
}

/// Recognizes UTF-16/32 text without a BOM by the shape of its first newline.
///
/// Looks for the first `\n` (or, failing that, `\r`) and checks whether the
/// zero bytes around it form a wide code unit aligned to its offset.
pub fn sniff_wide_newline(window: &[u8]) -> Option<Charset> {
    let p = window
        .iter()
        .position(|&b| b == b'\n')
        .or_else(|| window.iter().position(|&b| b == b'\r'))?;

    let at = |i: usize| window.get(i).copied();
    let utf16le = || at(p + 1) == Some(0);
    let utf16be = || p >= 1 && at(p - 1) == Some(0);

    match p % 4 {
        0 if at(p + 1) == Some(0) && at(p + 2) == Some(0) && at(p + 3) == Some(0) => {
            Some(Charset::Utf32Le)
        }
        0 | 2 => utf16le().then_some(Charset::Utf16Le),
        3 if at(p - 1) == Some(0) && at(p - 2) == Some(0) && at(p - 3) == Some(0) => {
            Some(Charset::Utf32Be)
        }
        _ => utf16be().then_some(Charset::Utf16Be),
    }
}

/// Drops a UTF-8 sequence cut off by the end of the window.
///
/// Only lead bytes are inspected: a lead byte announcing more bytes than are
/// left in the window is removed together with whatever follows it.
pub fn trim_partial_utf8(window: &[u8]) -> &[u8] {
    let n = window.len();
    let ones = |back: usize| n.checked_sub(back).map_or(0, |i| window[i].leading_ones());

    if ones(3) > 3 {
        &window[..n - 3]
    } else if ones(2) > 2 {
        &window[..n - 2]
    } else if ones(1) > 1 {
        &window[..n - 1]
    } else {
        window
    }
}

/// Detects the encoding from the first bytes of a stream.
///
/// Returns the charset and the length of its byte-order mark (0 without one),
/// or `None` when the bytes do not reveal the encoding.
pub fn detect_encoding_in(head: &[u8]) -> Option<(Charset, usize)> {
    if let Some(found) = sniff_bom(head) {
        return Some(found);
    }

    let window = &head[..head.len().min(DETECTION_WINDOW)];
    if let Some(charset) = sniff_wide_newline(window) {
        return Some((charset, 0));
    }

    std::str::from_utf8(trim_partial_utf8(window))
        .ok()
        .map(|_| (Charset::Utf8, 0))
}

/// Detects the encoding of a byte source from its start.
///
/// The position of the source is left unchanged.
pub fn detect_encoding<R: Read + Seek>(
    source: &mut ByteSource<R>,
) -> io::Result<Option<(Charset, usize)>> {
    let head = source.read_head(DETECTION_WINDOW)?;
    let detected = detect_encoding_in(&head);
    match detected {
        Some((charset, 0)) => debug!("encoding detected: {charset}"),
        Some((charset, bom)) => debug!("encoding detected: {charset} ({bom} byte BOM)"),
        None => debug!("encoding could not be detected"),
    }
    Ok(detected)
}

/// Candidate charsets for a file that failed detection, most likely first.
///
/// The line terminator hints at the platform the file was exported on.
pub fn guess_candidates(terminator: Option<LineTerminator>) -> &'static [Charset] {
    match terminator {
        Some(LineTerminator::Lf) => &[
            Charset::Utf8,
            Charset::Windows1252,
            Charset::Ibm850,
            Charset::Macintosh,
        ],
        Some(LineTerminator::CrLf) => &[Charset::Windows1252, Charset::Ibm850, Charset::Macintosh],
        Some(LineTerminator::Cr) => &[Charset::Macintosh, Charset::Windows1252, Charset::Ibm850],
        None => &[
            Charset::Utf8,
            Charset::Windows1252,
            Charset::Macintosh,
            Charset::Ibm850,
        ],
    }
}

/// Picks the first candidate charset that decodes `window` without errors.
pub fn guess_encoding_in(window: &[u8], terminator: Option<LineTerminator>) -> Option<Charset> {
    guess_candidates(terminator)
        .iter()
        .copied()
        .find(|charset| charset.decodes_strictly(window))
}

/// Guesses the encoding of a byte source from its raw head.
///
/// Must run before any transcoder is installed. The position of the source is
/// left unchanged.
pub fn guess_encoding<R: Read + Seek>(
    source: &mut ByteSource<R>,
    terminator: Option<LineTerminator>,
) -> io::Result<Option<Charset>> {
    let head = source.read_head(DETECTION_WINDOW)?;
    let guessed = guess_encoding_in(&head, terminator);
    match guessed {
        Some(charset) => debug!("encoding guessed: {charset}"),
        None => debug!("no candidate encoding decodes the input"),
    }
    Ok(guessed)
}
