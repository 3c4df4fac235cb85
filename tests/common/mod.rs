#![allow(dead_code)]

pub mod mocks;

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;

pub use mocks::{MockSource, failing_source};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn cursor(bytes: impl Into<Vec<u8>>) -> Cursor<Vec<u8>> {
    Cursor::new(bytes.into())
}

pub fn temp_csv(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

pub fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}
