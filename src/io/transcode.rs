use encoding_rs::{CoderResult, Decoder, Encoding, UTF_16BE, UTF_16LE};
use oem_cp::code_table::DECODING_TABLE_CP850;

use super::charset::{Charset, utf32_unit};

const REPLACEMENT: char = '\u{FFFD}';

enum Kind {
    Identity,
    Whatwg(Decoder),
    Utf32 {
        big_endian: bool,
        carry: Vec<u8>,
        at_start: bool,
    },
    Cp850,
}

/// Incremental conversion of a byte stream to UTF-8.
///
/// A byte-order mark at the start of the stream is consumed, never emitted.
pub struct Transcoder {
    kind: Kind,
}

impl Transcoder {
    pub fn identity() -> Self {
        Self {
            kind: Kind::Identity,
        }
    }

    pub fn for_charset(charset: Charset) -> Self {
        let kind = match charset {
            Charset::Utf8 | Charset::Ascii => Kind::Identity,
            Charset::Utf32Le | Charset::Utf32Be => Kind::Utf32 {
                big_endian: charset == Charset::Utf32Be,
                carry: Vec::with_capacity(4),
                at_start: true,
            },
            Charset::Ibm850 => Kind::Cp850,
            other => match other.whatwg() {
                Some(encoding) => Kind::Whatwg(new_decoder(encoding)),
                None => Kind::Identity,
            },
        };
        Self { kind }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, Kind::Identity)
    }

    /// Forgets any partial input so the stream can be decoded from its start.
    pub fn reset(&mut self) {
        match &mut self.kind {
            Kind::Identity | Kind::Cp850 => {}
            Kind::Whatwg(decoder) => *decoder = new_decoder(decoder.encoding()),
            Kind::Utf32 {
                carry, at_start, ..
            } => {
                carry.clear();
                *at_start = true;
            }
        }
    }

    /// Appends the UTF-8 form of `input` to `out`. `last` flushes any
    /// incomplete trailing sequence as a replacement character.
    pub fn transcode(&mut self, input: &[u8], last: bool, out: &mut Vec<u8>) {
        match &mut self.kind {
            Kind::Identity => out.extend_from_slice(input),
            Kind::Whatwg(decoder) => decode_whatwg(decoder, input, last, out),
            Kind::Utf32 {
                big_endian,
                carry,
                at_start,
            } => decode_utf32(*big_endian, carry, at_start, input, last, out),
            Kind::Cp850 => {
                let mut text = String::with_capacity(input.len());
                text.extend(input.iter().map(|&b| {
                    if b < 0x80 {
                        b as char
                    } else {
                        DECODING_TABLE_CP850[usize::from(b - 0x80)]
                    }
                }));
                out.extend_from_slice(text.as_bytes());
            }
        }
    }
}

fn new_decoder(encoding: &'static Encoding) -> Decoder {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        encoding.new_decoder_with_bom_removal()
    } else {
        encoding.new_decoder_without_bom_handling()
    }
}

fn decode_whatwg(decoder: &mut Decoder, input: &[u8], last: bool, out: &mut Vec<u8>) {
    let capacity = decoder
        .max_utf8_buffer_length(input.len())
        .unwrap_or(input.len() * 3 + 16);
    let mut text = String::with_capacity(capacity);
    let mut consumed = 0;
    loop {
        let (result, read, _) = decoder.decode_to_string(&input[consumed..], &mut text, last);
        consumed += read;
        match result {
            CoderResult::InputEmpty => break,
            CoderResult::OutputFull => text.reserve(capacity),
        }
    }
    out.extend_from_slice(text.as_bytes());
}

fn decode_utf32(
    big_endian: bool,
    carry: &mut Vec<u8>,
    at_start: &mut bool,
    input: &[u8],
    last: bool,
    out: &mut Vec<u8>,
) {
    carry.extend_from_slice(input);
    let whole = carry.len() - carry.len() % 4;

    let mut text = String::with_capacity(whole);
    for unit in carry[..whole].chunks_exact(4) {
        let scalar = utf32_unit(unit, big_endian);
        if *at_start {
            *at_start = false;
            if scalar == 0xFEFF {
                continue;
            }
        }
        text.push(char::from_u32(scalar).unwrap_or(REPLACEMENT));
    }
    carry.drain(..whole);

    if last && !carry.is_empty() {
        carry.clear();
        text.push(REPLACEMENT);
    }
    out.extend_from_slice(text.as_bytes());
}
