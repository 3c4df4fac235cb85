/// Self-detecting CSV reading.
///
/// [`CsvReader`](csv_reader::CsvReader) accepts delimited text from any
/// spreadsheet export and works out the format on its own before handing out
/// typed rows.
///
/// # Construction pipeline
///
/// 1. **Encoding**: byte-order marks, then the layout of the first newline
///    (UTF-16/32 without BOM), then UTF-8 validation. When all of that fails
///    the encoding is guessed from candidates that depend on the line
///    terminator, e.g. Windows-1252 before IBM850 for `\r\n` files.
/// 2. **Line terminator**: the majority of `\n` versus `\r` in the first
///    1000 bytes. Every terminator is normalized to `\n` afterwards.
/// 3. **`sep=X` line**: a leading declaration fixes the separator and is
///    skipped.
/// 4. **Separator**: `,`, `;` or tab, whichever encloses a quoted field or
///    splits the first line into the most columns.
/// 5. **Header line**: a first record that does not start with a digit and
///    names every required column.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use autocsv::core::item::ItemReader;
/// use autocsv::reader::csv_reader::CsvReaderBuilder;
///
/// // A UTF-16LE export with tabs and DOS line endings
/// let mut bytes = vec![0xFF, 0xFE];
/// for unit in "city\tpop\r\nZürich\t421878\r\n".encode_utf16() {
///     bytes.extend_from_slice(&unit.to_le_bytes());
/// }
///
/// let mut reader = CsvReaderBuilder::new().from_reader(Cursor::new(bytes))?;
/// let row = reader.read()?.unwrap();
///
/// assert_eq!(row.get("city").and_then(|v| v.as_str()), Some("Zürich"));
/// assert_eq!(reader.options().separator.fixed(), Some(b'\t'));
/// # Ok::<(), autocsv::ReaderError>(())
/// ```
pub mod csv_reader;
