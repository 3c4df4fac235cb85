use std::{fmt, str::FromStr};

use crate::{error::ReaderError, io::charset::Charset};

/// An option that is either sniffed from the input or fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detect<T> {
    #[default]
    Auto,
    Fixed(T),
}

impl<T: Copy> Detect<T> {
    /// Returns the fixed value, `None` while still on `Auto`.
    pub fn fixed(&self) -> Option<T> {
        match self {
            Detect::Auto => None,
            Detect::Fixed(value) => Some(*value),
        }
    }
}

impl<T> From<T> for Detect<T> {
    fn from(value: T) -> Self {
        Detect::Fixed(value)
    }
}

/// Source encoding setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    /// Sniff the encoding from BOMs and byte patterns.
    #[default]
    Auto,
    /// Transcode from this charset.
    Known(Charset),
    /// Skip BOM detection and guess the charset from the content.
    ///
    /// The reader never reports this once built: guessing always settles on
    /// some charset, which is then transcoded to UTF-8.
    Unknown,
}

impl SourceEncoding {
    /// Returns the charset, `None` unless it is known.
    pub fn charset(&self) -> Option<Charset> {
        match self {
            SourceEncoding::Known(charset) => Some(*charset),
            _ => None,
        }
    }
}

impl From<Charset> for SourceEncoding {
    fn from(charset: Charset) -> Self {
        SourceEncoding::Known(charset)
    }
}

impl FromStr for SourceEncoding {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(SourceEncoding::Auto)
        } else {
            s.parse().map(SourceEncoding::Known)
        }
    }
}

/// A physical line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineTerminator {
    /// The terminator as it appears in the input.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Cr => "\r",
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the literal terminators as well as `lf`, `crlf` and `cr`.
impl FromStr for LineTerminator {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\n" => return Ok(LineTerminator::Lf),
            "\r\n" => return Ok(LineTerminator::CrLf),
            "\r" => return Ok(LineTerminator::Cr),
            _ => {}
        }
        match s.to_ascii_lowercase().as_str() {
            "lf" | "unix" => Ok(LineTerminator::Lf),
            "crlf" | "dos" => Ok(LineTerminator::CrLf),
            "cr" | "mac" => Ok(LineTerminator::Cr),
            _ => Err(ReaderError::InvalidLineTerminator(s.to_string())),
        }
    }
}

/// Reader options.
///
/// Every field has a default; the reader replaces the `Auto` values with what
/// it detected, see [`CsvReader::options`](crate::reader::csv_reader::CsvReader::options).
///
/// # Defaults
///
/// - encoding: auto
/// - fallback encoding: none
/// - line terminator: auto
/// - separator: auto, falling back to `;`
/// - quote: `"`, escape: `\`
/// - a leading `sep=X` line is honored
/// - header line not required, columns inferred from it when present
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    pub encoding: SourceEncoding,
    /// Used when neither detection nor guessing identifies the encoding.
    /// Guessing ends with IBM850, which accepts any input, so this is only
    /// reached in theory.
    pub fallback_encoding: Option<Charset>,
    pub line_terminator: Detect<LineTerminator>,
    pub separator: Detect<u8>,
    /// Used when separator detection is inconclusive.
    pub fallback_separator: u8,
    pub quote: u8,
    pub escape: Option<u8>,
    /// Honor a leading `sep=X` declaration line.
    pub respect_separator_line: bool,
    pub require_header_line: bool,
    /// Look for a header line and map columns from it.
    pub infer_columns_from_header: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            encoding: SourceEncoding::Auto,
            fallback_encoding: None,
            line_terminator: Detect::Auto,
            separator: Detect::Auto,
            fallback_separator: b';',
            quote: b'"',
            escape: Some(b'\\'),
            respect_separator_line: true,
            require_header_line: false,
            infer_columns_from_header: true,
        }
    }
}
