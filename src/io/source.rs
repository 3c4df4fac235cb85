use std::io::{self, BufRead, Read, Seek, SeekFrom};

use log::trace;

use crate::core::config::LineTerminator;

use super::{endings::EndingsFilter, transcode::Transcoder};

const CHUNK_SIZE: usize = 8 * 1024;

/// A seekable byte stream with a transcoding and a line-ending transform.
///
/// Offsets (`tell`, `seek_to`, [`Seek`]) address the transformed stream and
/// are relative to the position the inner reader had when it was wrapped.
/// Seeking backwards through an active transform replays the stream from the
/// start; without transforms it seeks the inner reader directly.
pub struct ByteSource<R> {
    inner: R,
    origin: u64,
    transcoder: Transcoder,
    endings: EndingsFilter,
    raw: Vec<u8>,
    decoded: Vec<u8>,
    buf: Vec<u8>,
    buf_pos: usize,
    pos: u64,
    eof: bool,
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let origin = inner.stream_position()?;
        Ok(Self {
            inner,
            origin,
            transcoder: Transcoder::identity(),
            endings: EndingsFilter::default(),
            raw: vec![0; CHUNK_SIZE],
            decoded: Vec::with_capacity(CHUNK_SIZE),
            buf: Vec::with_capacity(CHUNK_SIZE),
            buf_pos: 0,
            pos: 0,
            eof: false,
        })
    }

    /// Moves the start of the stream `len` bytes forward, e.g. past a BOM
    /// that must not show up in the text. Rewinds to the new start.
    pub fn skip_prefix(&mut self, len: u64) -> io::Result<()> {
        self.origin += len;
        self.restart()
    }

    /// Installs a transcoder for everything read from now on. Rewinds to
    /// the start so the transcoder sees the stream from its first byte.
    pub fn set_transcoder(&mut self, transcoder: Transcoder) -> io::Result<()> {
        self.transcoder = transcoder;
        self.restart()
    }

    /// Installs line-ending normalization from `from` to `\n`. Rewinds to
    /// the start.
    pub fn set_line_ending(&mut self, from: LineTerminator) -> io::Result<()> {
        self.endings = EndingsFilter::new(from);
        self.restart()
    }

    pub fn tell(&self) -> u64 {
        self.pos
    }

    fn is_passthrough(&self) -> bool {
        self.transcoder.is_identity() && self.endings.is_identity()
    }

    fn clear_buffer(&mut self) {
        self.buf.clear();
        self.buf_pos = 0;
        self.eof = false;
    }

    fn restart(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(self.origin))?;
        self.transcoder.reset();
        self.endings.reset();
        self.clear_buffer();
        self.pos = 0;
        Ok(())
    }

    /// Positions the stream at `offset` bytes from its start.
    pub fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        if offset == self.pos {
            return Ok(self.pos);
        }

        if self.is_passthrough() {
            self.inner.seek(SeekFrom::Start(self.origin + offset))?;
            self.clear_buffer();
            self.pos = offset;
            return Ok(offset);
        }

        if offset < self.pos {
            trace!("replaying transformed stream up to offset {offset}");
            self.restart()?;
        }
        let skip = offset - self.pos;
        io::copy(&mut self.by_ref().take(skip), &mut io::sink())?;
        Ok(self.pos)
    }

    /// Reads up to `len` bytes from the start of the stream, then returns to
    /// the current position.
    pub fn read_head(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let saved = self.pos;
        self.seek_to(0)?;
        let mut head = Vec::with_capacity(len);
        self.by_ref().take(len as u64).read_to_end(&mut head)?;
        self.seek_to(saved)?;
        Ok(head)
    }

    /// Reads through the next `\n` (included). `None` at the end of the
    /// stream.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        match self.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.buf_pos = 0;
        while self.buf.is_empty() && !self.eof {
            let n = loop {
                match self.inner.read(&mut self.raw) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };
            let last = n == 0;
            self.eof = last;

            self.decoded.clear();
            self.transcoder
                .transcode(&self.raw[..n], last, &mut self.decoded);
            self.endings.filter(&self.decoded, last, &mut self.buf);
        }
        Ok(())
    }
}

impl<R: Read + Seek> BufRead for ByteSource<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buf_pos >= self.buf.len() {
            self.fill()?;
        }
        Ok(&self.buf[self.buf_pos..])
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.buf.len() - self.buf_pos);
        self.buf_pos += amt;
        self.pos += amt as u64;
    }
}

impl<R: Read + Seek> Read for ByteSource<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

/// Only absolute and relative seeks are supported; the length of a
/// transformed stream is unknown.
impl<R: Read + Seek> Seek for ByteSource<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Start(offset) => self.seek_to(offset),
            SeekFrom::Current(delta) => {
                let target = self.pos.checked_add_signed(delta).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek before start of stream")
                })?;
                self.seek_to(target)
            }
            SeekFrom::End(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "seeking from the end of a transformed stream",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::io::charset::Charset;

    use super::*;

    #[test]
    fn lines_and_positions() {
        let mut source = ByteSource::new(Cursor::new(b"a,b\nc,d\n".to_vec())).unwrap();
        assert_eq!(source.read_line().unwrap(), Some(b"a,b\n".to_vec()));
        assert_eq!(source.tell(), 4);
        assert_eq!(source.read_line().unwrap(), Some(b"c,d\n".to_vec()));
        assert_eq!(source.read_line().unwrap(), None);

        source.seek_to(4).unwrap();
        assert_eq!(source.read_line().unwrap(), Some(b"c,d\n".to_vec()));
    }

    #[test]
    fn head_restores_position() {
        let mut source = ByteSource::new(Cursor::new(b"0123456789".to_vec())).unwrap();
        source.seek_to(6).unwrap();
        assert_eq!(source.read_head(3).unwrap(), b"012");
        assert_eq!(source.tell(), 6);
        assert_eq!(source.read_line().unwrap(), Some(b"6789".to_vec()));
    }

    #[test]
    fn origin_is_where_the_inner_reader_was() {
        let mut cursor = Cursor::new(b"skip|a\nb\n".to_vec());
        cursor.set_position(5);
        let mut source = ByteSource::new(cursor).unwrap();
        assert_eq!(source.read_head(100).unwrap(), b"a\nb\n");
    }

    #[test]
    fn offsets_address_transformed_bytes() {
        let bytes = b"\xff\xfea\0\r\0\n\0b\0\r\0\n\0".to_vec();
        let mut source = ByteSource::new(Cursor::new(bytes)).unwrap();
        source
            .set_transcoder(Transcoder::for_charset(Charset::Utf16Le))
            .unwrap();
        source.set_line_ending(LineTerminator::CrLf).unwrap();

        assert_eq!(source.read_line().unwrap(), Some(b"a\n".to_vec()));
        assert_eq!(source.tell(), 2);
        assert_eq!(source.read_line().unwrap(), Some(b"b\n".to_vec()));

        source.seek_to(2).unwrap();
        assert_eq!(source.read_line().unwrap(), Some(b"b\n".to_vec()));
        source.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(source.read_line().unwrap(), Some(b"a\n".to_vec()));
    }

    #[test]
    fn skip_prefix_hides_bom() {
        let mut source = ByteSource::new(Cursor::new(b"\xef\xbb\xbfid\n".to_vec())).unwrap();
        source.skip_prefix(3).unwrap();
        assert_eq!(source.read_line().unwrap(), Some(b"id\n".to_vec()));
    }
}
