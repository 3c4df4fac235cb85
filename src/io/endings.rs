use crate::core::config::LineTerminator;

/// Rewrites one line terminator to `\n` while bytes stream through.
///
/// A `\r` at the end of a chunk is held back until the next chunk shows
/// whether it starts a `\r\n` pair.
#[derive(Debug, Clone)]
pub struct EndingsFilter {
    from: LineTerminator,
    pending_cr: bool,
}

impl EndingsFilter {
    pub fn new(from: LineTerminator) -> Self {
        Self {
            from,
            pending_cr: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.from == LineTerminator::Lf
    }

    pub fn reset(&mut self) {
        self.pending_cr = false;
    }

    pub fn filter(&mut self, input: &[u8], last: bool, out: &mut Vec<u8>) {
        match self.from {
            LineTerminator::Lf => out.extend_from_slice(input),
            LineTerminator::Cr => out.extend(input.iter().map(|&b| if b == b'\r' { b'\n' } else { b })),
            LineTerminator::CrLf => {
                out.reserve(input.len() + 1);
                for &b in input {
                    if self.pending_cr {
                        self.pending_cr = false;
                        if b == b'\n' {
                            out.push(b'\n');
                            continue;
                        }
                        out.push(b'\r');
                    }
                    if b == b'\r' {
                        self.pending_cr = true;
                    } else {
                        out.push(b);
                    }
                }
                if last && self.pending_cr {
                    self.pending_cr = false;
                    out.push(b'\r');
                }
            }
        }
    }
}

impl Default for EndingsFilter {
    fn default() -> Self {
        Self::new(LineTerminator::Lf)
    }
}
