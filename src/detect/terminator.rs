use std::io::{self, Read, Seek};

use log::debug;

use crate::{core::config::LineTerminator, io::source::ByteSource};

/// Bytes sampled when counting line feeds and carriage returns.
pub const TERMINATOR_WINDOW: usize = 1000;

/// Classifies a sample by its line feed and carriage return counts.
///
/// More `\n` than `\r` means Unix, more `\r` means classic Mac. A tie,
/// including a sample without any terminator, is read as `\r\n`.
pub fn classify(sample: &[u8]) -> LineTerminator {
    let (lf, cr) = sample.iter().fold((0usize, 0usize), |(lf, cr), &b| match b {
        b'\n' => (lf + 1, cr),
        b'\r' => (lf, cr + 1),
        _ => (lf, cr),
    });

    match lf.cmp(&cr) {
        std::cmp::Ordering::Greater => LineTerminator::Lf,
        std::cmp::Ordering::Less => LineTerminator::Cr,
        std::cmp::Ordering::Equal => LineTerminator::CrLf,
    }
}

/// Detects the line terminator of a byte source from its start.
///
/// A `\r\n` pair straddling the end of the window may tip the counts; the
/// sample is not extended to compensate. The position of the source is left
/// unchanged.
pub fn detect_line_terminator<R: Read + Seek>(
    source: &mut ByteSource<R>,
) -> io::Result<LineTerminator> {
    let sample = source.read_head(TERMINATOR_WINDOW)?;
    let terminator = classify(&sample);
    debug!("line terminator detected: {:?}", terminator.as_str());
    Ok(terminator)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn majority_wins() {
        assert_eq!(classify(b"a\nb\nc\n"), LineTerminator::Lf);
        assert_eq!(classify(b"a\rb\rc\r"), LineTerminator::Cr);
        assert_eq!(classify(b"a\r\nb\r\n"), LineTerminator::CrLf);
    }

    #[test]
    fn no_terminator_reads_as_crlf() {
        assert_eq!(classify(b"single line"), LineTerminator::CrLf);
        assert_eq!(classify(b""), LineTerminator::CrLf);
    }

    #[test]
    fn only_the_window_is_sampled() {
        let mut bytes = b"x\r\n".repeat(333);
        bytes.push(b'x');
        bytes.extend_from_slice(b"\n\n\n\n");
        // 1000 bytes hold 333 balanced pairs and one extra byte
        let mut source = ByteSource::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            detect_line_terminator(&mut source).unwrap(),
            LineTerminator::CrLf
        );
    }

    #[test]
    fn split_pair_at_window_edge_tips_toward_cr() {
        let mut bytes = vec![b'x'; TERMINATOR_WINDOW - 1];
        bytes.extend_from_slice(b"\r\n");
        let mut source = ByteSource::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            detect_line_terminator(&mut source).unwrap(),
            LineTerminator::Cr
        );
    }
}
