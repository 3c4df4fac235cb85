use crate::error::ReaderError;

/// Result of a single [`ItemReader::read`] call.
///
/// `Ok(None)` marks the end of the input.
pub type ItemReaderResult<T> = Result<Option<T>, ReaderError>;

/// A source of items read one at a time.
pub trait ItemReader<T> {
    fn read(&mut self) -> ItemReaderResult<T>;
}
