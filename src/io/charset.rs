use std::{fmt, str::FromStr};

use encoding_rs::{Encoding, MACINTOSH, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};

use crate::error::ReaderError;

/// Windows-1252 code points that have no character assigned.
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// A character set the reader can transcode from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Ascii,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Windows1252,
    /// Mac OS Roman.
    Macintosh,
    /// DOS Latin-1 code page.
    Ibm850,
    /// Any other WHATWG encoding.
    Other(&'static Encoding),
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Ascii => "ASCII",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf32Le => "UTF-32LE",
            Charset::Utf32Be => "UTF-32BE",
            Charset::Windows1252 => "Windows-1252",
            Charset::Macintosh => "Macintosh",
            Charset::Ibm850 => "IBM850",
            Charset::Other(encoding) => encoding.name(),
        }
    }

    /// Text in this charset can be read without transcoding.
    pub fn is_utf8_compatible(&self) -> bool {
        matches!(self, Charset::Utf8 | Charset::Ascii)
    }

    pub(crate) fn whatwg(&self) -> Option<&'static Encoding> {
        match self {
            Charset::Utf8 => Some(UTF_8),
            Charset::Utf16Le => Some(UTF_16LE),
            Charset::Utf16Be => Some(UTF_16BE),
            Charset::Windows1252 => Some(WINDOWS_1252),
            Charset::Macintosh => Some(MACINTOSH),
            Charset::Other(encoding) => Some(encoding),
            Charset::Ascii | Charset::Utf32Le | Charset::Utf32Be | Charset::Ibm850 => None,
        }
    }

    /// Checks that `bytes` decode in this charset without any replacement.
    pub fn decodes_strictly(&self, bytes: &[u8]) -> bool {
        match self {
            Charset::Ascii => bytes.is_ascii(),
            // every byte is assigned
            Charset::Ibm850 => true,
            Charset::Utf32Le | Charset::Utf32Be => {
                let big_endian = *self == Charset::Utf32Be;
                bytes.len() % 4 == 0
                    && bytes
                        .chunks_exact(4)
                        .all(|unit| char::from_u32(utf32_unit(unit, big_endian)).is_some())
            }
            Charset::Windows1252 => {
                !bytes.iter().any(|b| WINDOWS_1252_UNDEFINED.contains(b))
                    && WINDOWS_1252
                        .decode_without_bom_handling_and_without_replacement(bytes)
                        .is_some()
            }
            other => other.whatwg().is_some_and(|encoding| {
                encoding
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .is_some()
            }),
        }
    }
}

pub(crate) fn utf32_unit(unit: &[u8], big_endian: bool) -> u32 {
    let bytes = [unit[0], unit[1], unit[2], unit[3]];
    if big_endian {
        u32::from_be_bytes(bytes)
    } else {
        u32::from_le_bytes(bytes)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses charset labels case-insensitively.
///
/// Besides the names above, any WHATWG label known to `encoding_rs` is
/// accepted, e.g. `latin1` or `shift_jis`.
impl FromStr for Charset {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        let charset = match label.as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            "ascii" | "us-ascii" => Charset::Ascii,
            "utf-16le" | "utf16le" => Charset::Utf16Le,
            "utf-16be" | "utf16be" => Charset::Utf16Be,
            "utf-32le" | "utf32le" => Charset::Utf32Le,
            "utf-32be" | "utf32be" => Charset::Utf32Be,
            "windows-1252" | "cp1252" => Charset::Windows1252,
            "macintosh" | "macroman" | "mac" | "x-mac-roman" => Charset::Macintosh,
            "ibm850" | "cp850" | "850" => Charset::Ibm850,
            _ => match Encoding::for_label(label.as_bytes()) {
                Some(encoding) if encoding == UTF_8 => Charset::Utf8,
                Some(encoding) if encoding == UTF_16LE => Charset::Utf16Le,
                Some(encoding) if encoding == UTF_16BE => Charset::Utf16Be,
                Some(encoding) if encoding == WINDOWS_1252 => Charset::Windows1252,
                Some(encoding) if encoding == MACINTOSH => Charset::Macintosh,
                Some(encoding) => Charset::Other(encoding),
                None => return Err(ReaderError::UnsupportedEncoding(s.to_string())),
            },
        };
        Ok(charset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("UTF-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("cp850".parse::<Charset>().unwrap(), Charset::Ibm850);
        assert_eq!("Macintosh".parse::<Charset>().unwrap(), Charset::Macintosh);
        assert_eq!("latin1".parse::<Charset>().unwrap(), Charset::Windows1252);
        assert_eq!(
            "shift_jis".parse::<Charset>().unwrap(),
            Charset::Other(encoding_rs::SHIFT_JIS)
        );
        assert!(matches!(
            "klingon".parse::<Charset>(),
            Err(ReaderError::UnsupportedEncoding(label)) if label == "klingon"
        ));
    }

    #[test]
    fn strict_decoding() {
        assert!(Charset::Utf8.decodes_strictly("Zürich".as_bytes()));
        assert!(!Charset::Utf8.decodes_strictly(b"Z\xfcrich"));
        assert!(Charset::Windows1252.decodes_strictly(b"Z\xfcrich"));
        assert!(!Charset::Windows1252.decodes_strictly(b"\x81"));
        assert!(Charset::Macintosh.decodes_strictly(b"\x81"));
        assert!(Charset::Ibm850.decodes_strictly(b"\x81"));
        assert!(Charset::Utf32Le.decodes_strictly(b"a\0\0\0"));
        assert!(!Charset::Utf32Le.decodes_strictly(b"a\0\0"));
    }

    #[test]
    fn names_round_trip() {
        for charset in [
            Charset::Utf8,
            Charset::Utf16Le,
            Charset::Utf32Be,
            Charset::Windows1252,
            Charset::Macintosh,
            Charset::Ibm850,
        ] {
            assert_eq!(charset.name().parse::<Charset>().unwrap(), charset);
        }
    }
}
