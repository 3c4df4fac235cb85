//! Mock version of a seekable byte source
use mockall::mock;

use std::{
    io::{self, Cursor, Read, Seek, SeekFrom},
    sync::{Arc, Mutex},
};

mock! {
    pub Source {}
    impl Read for Source {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    }
    impl Seek for Source {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
    }
}

/// A source serving `data` that fails every read starting at byte `fail_at`.
pub fn failing_source(data: Vec<u8>, fail_at: u64) -> MockSource {
    let cursor = Arc::new(Mutex::new(Cursor::new(data)));
    let mut source = MockSource::new();

    let reader = Arc::clone(&cursor);
    source.expect_read().returning(move |buf| {
        let mut cursor = reader.lock().unwrap();
        if cursor.position() >= fail_at {
            return Err(io::Error::other("device went away"));
        }
        cursor.read(buf)
    });
    source
        .expect_seek()
        .returning(move |pos| cursor.lock().unwrap().seek(pos));
    source
}
