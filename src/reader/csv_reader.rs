use csv::{ByteRecord, Position, ReaderBuilder, Terminator};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Read, Seek},
    marker::PhantomData,
    path::Path,
};

use crate::{
    core::{
        column::{
            ColumnMap, ColumnSpec, ColumnType, check_column_names, check_required_first,
            columns_from_header,
        },
        config::{Detect, LineTerminator, ReaderConfig, SourceEncoding},
        header::{HeaderDecision, decide, required_count, too_few_fields},
        item::{ItemReader, ItemReaderResult},
        row::{TypedRow, Value},
    },
    detect::{
        encoding::{detect_encoding, guess_encoding, sniff_bom},
        separator::{detect_column_separator, separator_declaration},
        terminator::detect_line_terminator,
    },
    error::{ReaderError, Result},
    io::{charset::Charset, source::ByteSource, transcode::Transcoder},
};

/// Where a mapped column is found in a record and how it is typed.
#[derive(Debug, Clone)]
struct FieldPlan {
    name: String,
    index: usize,
    column_type: ColumnType,
    required: bool,
}

/// A CSV reader that works out the file format by itself.
///
/// At construction the reader sniffs, in this order, the character encoding,
/// the line terminator, an optional `sep=X` declaration line, the column
/// separator and whether the first record is a header line. Rows are then
/// read one at a time as [`TypedRow`]s whose values are coerced to the
/// declared column types.
///
/// # Column mapping
///
/// - With a header line, columns are matched to header cells by their slug
///   (lower-cased ASCII alphanumerics), so `Order ID` maps to `orderid`. Row
///   values follow the header order.
/// - Without a header line, columns are mapped left to right in declaration
///   order. Optional columns must trail the required ones.
/// - Without declared columns, they are inferred from the header line.
///
/// A cell missing from a short record is `Null` for a required column and
/// omitted for an optional one.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use autocsv::core::column::{ColumnSpec, ColumnType};
/// use autocsv::core::row::Value;
/// use autocsv::reader::csv_reader::CsvReaderBuilder;
///
/// let data = "Total;ID;Date\n12,50;1;2024-01-31\n7;2;2024-02-01\n";
///
/// let mut reader = CsvReaderBuilder::new()
///     .columns([
///         ColumnSpec::new("id").with_type(ColumnType::Int),
///         ColumnSpec::new("date"),
///         ColumnSpec::new("total").with_type(ColumnType::Float),
///     ])
///     .from_reader(Cursor::new(data))?;
///
/// let row = reader.next_row().unwrap();
/// assert_eq!(row.get("total"), Some(&Value::Float(12.5)));
/// assert_eq!(row.get("id"), Some(&Value::Int(1)));
/// assert_eq!(reader.current_row_number(), 2);
///
/// assert_eq!(reader.count(), 1);
/// # Ok::<(), autocsv::ReaderError>(())
/// ```
pub struct CsvReader<R> {
    records: csv::Reader<ByteSource<R>>,
    record: ByteRecord,
    options: ReaderConfig,
    columns: Vec<ColumnSpec>,
    column_map: ColumnMap,
    plan: Vec<FieldPlan>,
    /// Offset of the first data record in the decoded stream.
    data_start: u64,
    /// Records before `data_start` (declaration and header lines).
    row_start: usize,
    row_index: usize,
    current: Option<TypedRow>,
}

impl<R: Read + Seek> CsvReader<R> {
    /// Returns the options with every `Auto` value replaced by what was
    /// detected.
    pub fn options(&self) -> &ReaderConfig {
        &self.options
    }

    /// Returns the declared or inferred columns.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.column_map
    }

    /// Returns the zero-based field index of a column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_map
            .get(name)
            .ok_or_else(|| ReaderError::UnknownColumn(name.to_string()))
    }

    /// Returns the one-based field number of a column, as spreadsheets count.
    pub fn column_number(&self, name: &str) -> Result<usize> {
        self.column_index(name).map(|index| index + 1)
    }

    /// Reads the next row.
    ///
    /// Returns `None` at the end of the input. A read or tokenizer error also
    /// ends iteration; it is logged, use [`ItemReader::read`] to get it.
    pub fn next_row(&mut self) -> Option<TypedRow> {
        match self.read() {
            Ok(row) => row,
            Err(error) => {
                warn!(
                    "stopped reading after row {}: {error}",
                    self.current_row_number()
                );
                None
            }
        }
    }

    /// Returns the row last returned by [`next_row`](Self::next_row), `None`
    /// before the first call and after the end of the input.
    pub fn current_row(&self) -> Option<&TypedRow> {
        self.current.as_ref()
    }

    /// Returns the line number of the current row, counting declaration and
    /// header lines.
    ///
    /// After the last row has been read, the number points one past it.
    pub fn current_row_number(&self) -> usize {
        self.row_start + self.row_index
    }

    /// Goes back to the first data row.
    pub fn rewind(&mut self) -> Result<()> {
        seek_records(&mut self.records, self.data_start)?;
        self.row_index = 0;
        self.current = None;
        Ok(())
    }

    /// Returns an iterator deserializing each remaining row into `T`.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use autocsv::core::column::{ColumnSpec, ColumnType};
    /// use autocsv::reader::csv_reader::CsvReaderBuilder;
    /// use serde::Deserialize;
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Person {
    ///     name: String,
    ///     age: i64,
    /// }
    ///
    /// let mut reader = CsvReaderBuilder::new()
    ///     .columns([
    ///         ColumnSpec::new("name"),
    ///         ColumnSpec::new("age").with_type(ColumnType::Int),
    ///     ])
    ///     .from_reader(Cursor::new("name,age\nAlice,30\nBob,25\n"))?;
    ///
    /// let people: Vec<Person> = reader.deserialize().collect::<Result<_, _>>()?;
    /// assert_eq!(people.len(), 2);
    /// assert_eq!(people[1].name, "Bob");
    /// assert_eq!(people[1].age, 25);
    /// # Ok::<(), autocsv::ReaderError>(())
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&mut self) -> DeserializeRows<'_, R, T> {
        DeserializeRows {
            reader: self,
            done: false,
            _marker: PhantomData,
        }
    }

    fn build_row(&self) -> TypedRow {
        let mut row = TypedRow::new();
        for field in &self.plan {
            match self.record.get(field.index) {
                Some(raw) => row.push(
                    &field.name,
                    Value::coerce(&String::from_utf8_lossy(raw), field.column_type),
                ),
                None if field.required => row.push(&field.name, Value::Null),
                None => {}
            }
        }
        row
    }

    fn finish(&mut self) {
        if self.current.take().is_some() {
            self.row_index += 1;
        }
    }
}

impl<R: Read + Seek> ItemReader<TypedRow> for CsvReader<R> {
    /// Reads the next row, surfacing I/O and tokenizer errors.
    ///
    /// # Returns
    /// - `Ok(Some(row))` if a row was read
    /// - `Ok(None)` at the end of the input
    /// - `Err(_)` if the source or the tokenizer failed; the current row is
    ///   cleared as at the end of the input
    fn read(&mut self) -> ItemReaderResult<TypedRow> {
        match self.records.read_byte_record(&mut self.record) {
            Ok(true) => {
                let row = self.build_row();
                self.row_index += 1;
                self.current = Some(row.clone());
                Ok(Some(row))
            }
            Ok(false) => {
                self.finish();
                Ok(None)
            }
            Err(error) => {
                self.finish();
                Err(error.into())
            }
        }
    }
}

impl<R: Read + Seek> Iterator for CsvReader<R> {
    type Item = TypedRow;

    fn next(&mut self) -> Option<TypedRow> {
        self.next_row()
    }
}

/// Iterator returned by [`CsvReader::deserialize`].
///
/// Stops after the first read error.
pub struct DeserializeRows<'r, R, T> {
    reader: &'r mut CsvReader<R>,
    done: bool,
    _marker: PhantomData<T>,
}

impl<R: Read + Seek, T: DeserializeOwned> Iterator for DeserializeRows<'_, R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if self.done {
            return None;
        }
        match self.reader.read() {
            Ok(Some(row)) => Some(row.deserialize().map_err(|source| ReaderError::Deserialize {
                row: self.reader.current_row_number(),
                source,
            })),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// A builder for [`CsvReader`].
///
/// Every format option defaults to detection, see [`ReaderConfig`].
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use autocsv::core::config::LineTerminator;
/// use autocsv::io::charset::Charset;
/// use autocsv::reader::csv_reader::CsvReaderBuilder;
///
/// let reader = CsvReaderBuilder::new()
///     .columns(["name", "city"])
///     .encoding(Charset::Windows1252)
///     .line_terminator(LineTerminator::CrLf)
///     .separator(b'|')
///     .from_reader(Cursor::new(b"name|city\r\nJos\xe9|M\xfcnchen\r\n".to_vec()))?;
///
/// assert_eq!(reader.column_number("city")?, 2);
/// # Ok::<(), autocsv::ReaderError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvReaderBuilder {
    columns: Option<Vec<ColumnSpec>>,
    config: ReaderConfig,
}

impl CsvReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the expected columns, in file order for files without a
    /// header line. An empty list means no declaration.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnSpec>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces all options at once.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the source encoding.
    ///
    /// # Parameters
    /// - `encoding`: a [`Charset`] to transcode from, [`SourceEncoding::Auto`]
    ///   to sniff it, or [`SourceEncoding::Unknown`] to skip BOM detection and
    ///   guess from the content
    ///
    /// # Examples
    ///
    /// ```
    /// use autocsv::io::charset::Charset;
    /// use autocsv::reader::csv_reader::CsvReaderBuilder;
    ///
    /// let builder = CsvReaderBuilder::new().encoding(Charset::Windows1252);
    /// ```
    pub fn encoding(mut self, encoding: impl Into<SourceEncoding>) -> Self {
        self.config.encoding = encoding.into();
        self
    }

    /// Sets the charset to use when the encoding can be neither detected nor
    /// guessed.
    ///
    /// Guessing always ends with IBM850, which decodes any byte sequence, so
    /// in practice this charset is never picked.
    pub fn fallback_encoding(mut self, charset: Charset) -> Self {
        self.config.fallback_encoding = Some(charset);
        self
    }

    /// Fixes the line terminator instead of detecting it.
    pub fn line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.config.line_terminator = Detect::Fixed(terminator);
        self
    }

    /// Fixes the field separator instead of detecting it.
    ///
    /// A leading `sep=X` line still overrides it unless
    /// [`respect_separator_line`](Self::respect_separator_line) is off.
    ///
    /// # Parameters
    /// - `separator`: the byte separating fields
    ///
    /// # Examples
    ///
    /// ```
    /// use autocsv::reader::csv_reader::CsvReaderBuilder;
    ///
    /// let builder = CsvReaderBuilder::new().separator(b'|');
    /// ```
    pub fn separator(mut self, separator: u8) -> Self {
        self.config.separator = Detect::Fixed(separator);
        self
    }

    /// Sets the separator used when detection finds none, typically for a
    /// single-column file. Defaults to `;`.
    pub fn fallback_separator(mut self, separator: u8) -> Self {
        self.config.fallback_separator = separator;
        self
    }

    /// Sets the quote character enclosing fields. Defaults to `"`.
    ///
    /// The same character is used by separator detection to recognize quoted
    /// fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use autocsv::reader::csv_reader::CsvReaderBuilder;
    ///
    /// let builder = CsvReaderBuilder::new().quote(b'\'');
    /// ```
    pub fn quote(mut self, quote: u8) -> Self {
        self.config.quote = quote;
        self
    }

    /// Sets the escape character inside quoted fields, `None` to only allow
    /// doubled quotes.
    ///
    /// Outside quotes the escape character is an ordinary character: `1\,2`
    /// reads as the two fields `1\` and `2`.
    pub fn escape(mut self, escape: Option<u8>) -> Self {
        self.config.escape = escape;
        self
    }

    /// Whether a leading `sep=X` line sets the separator. The line is
    /// skipped either way.
    pub fn respect_separator_line(mut self, yes: bool) -> Self {
        self.config.respect_separator_line = yes;
        self
    }

    /// Fails construction with [`ReaderError::MissingHeader`] when the first
    /// record is not accepted as a header.
    ///
    /// Declared columns may then mix required and optional ones in any order.
    pub fn require_header_line(mut self, yes: bool) -> Self {
        self.config.require_header_line = yes;
        self
    }

    /// Whether the first record is tried as a header line. When off, every
    /// record is data and columns must be declared.
    pub fn infer_columns_from_header(mut self, yes: bool) -> Self {
        self.config.infer_columns_from_header = yes;
        self
    }

    /// Opens the file at `path` and builds a reader for it.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvReader<File>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ReaderError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => ReaderError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ReaderError::Open {
                path: path.to_path_buf(),
                source,
            },
        })?;
        debug!("opened {}", path.display());
        self.from_reader(file)
    }

    /// Builds a reader over `rdr`, starting at its current position.
    pub fn from_reader<R: Read + Seek>(self, rdr: R) -> Result<CsvReader<R>> {
        let CsvReaderBuilder {
            columns,
            config: mut options,
        } = self;

        if let Some(columns) = &columns {
            check_column_names(columns)?;
            if !options.require_header_line {
                check_required_first(columns)?;
            }
        }
        let mut columns = columns.filter(|columns| !columns.is_empty());

        let mut source = ByteSource::new(rdr)?;

        match options.encoding {
            SourceEncoding::Auto => {
                options.encoding = match detect_encoding(&mut source)? {
                    Some((charset, bom)) => {
                        install_charset(&mut source, charset, bom)?;
                        SourceEncoding::Known(charset)
                    }
                    None => SourceEncoding::Unknown,
                };
            }
            SourceEncoding::Known(charset) => {
                let bom = sniff_bom(&source.read_head(4)?)
                    .filter(|(found, _)| *found == charset)
                    .map_or(0, |(_, len)| len);
                install_charset(&mut source, charset, bom)?;
            }
            SourceEncoding::Unknown => {}
        }

        let terminator = match options.line_terminator {
            Detect::Fixed(terminator) => terminator,
            Detect::Auto => detect_line_terminator(&mut source)?,
        };
        options.line_terminator = Detect::Fixed(terminator);
        source.set_line_ending(terminator)?;

        if options.encoding == SourceEncoding::Unknown {
            let guessed = guess_encoding(&mut source, Some(terminator))?;
            if let Some(charset) = guessed.or(options.fallback_encoding) {
                install_charset(&mut source, charset, 0)?;
                options.encoding = SourceEncoding::Known(charset);
            }
        }

        let mut data_start = 0;
        let mut row_start = 0;
        source.seek_to(0)?;
        if let Some(line) = source.read_line()? {
            if let Some(declared) = separator_declaration(&line) {
                debug!("separator declaration line: {:?}", String::from_utf8_lossy(&line));
                if let Some(separator) = declared.filter(|_| options.respect_separator_line) {
                    options.separator = Detect::Fixed(separator);
                }
                data_start = line.len() as u64;
                row_start += 1;
            }
        }

        let separator = match options.separator {
            Detect::Fixed(separator) => separator,
            Detect::Auto => detect_column_separator(
                &mut source,
                data_start,
                options.fallback_separator,
                options.quote,
            )?,
        };
        options.separator = Detect::Fixed(separator);

        source.seek_to(0)?;
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(separator)
            .quote(options.quote)
            .escape(options.escape)
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(source);
        seek_records(&mut records, data_start)?;

        let mut record = ByteRecord::new();
        let first: Option<Vec<String>> = records
            .read_byte_record(&mut record)?
            .then(|| {
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect()
            });

        let required = required_count(columns.as_deref());
        let first = match first {
            Some(first) if !too_few_fields(first.len(), required) => first,
            _ => return Err(ReaderError::SeparatorMismatch(char::from(separator))),
        };

        let mut header_map = None;
        let starts_with_digit = first
            .first()
            .and_then(|cell| cell.bytes().next())
            .is_some_and(|b| b.is_ascii_digit());

        if options.infer_columns_from_header && !starts_with_digit {
            let candidates = match columns.take() {
                Some(declared) => declared,
                None => {
                    let inferred = columns_from_header(&first);
                    check_column_names(&inferred)?;
                    inferred
                }
            };

            let map = ColumnMap::from_header(&candidates, &first);
            match decide(&candidates, map) {
                HeaderDecision::Accepted(map) => {
                    debug!("header line accepted, {} columns mapped", map.len());
                    data_start = records.position().byte();
                    row_start += 1;
                    header_map = Some(map);
                }
                HeaderDecision::Rejected => debug!("first record is data"),
                HeaderDecision::Ambiguous { mapped, required } => {
                    debug!("header line maps {mapped} of {required} required columns");
                    return Err(ReaderError::UnmappedColumns);
                }
            }
            columns = Some(candidates);
        }

        if header_map.is_none() {
            if options.require_header_line {
                return Err(ReaderError::MissingHeader);
            }
            seek_records(&mut records, data_start)?;
        }

        let columns = match columns {
            Some(columns) => columns,
            None if options.infer_columns_from_header => return Err(ReaderError::NoColumns),
            None => return Err(ReaderError::NoColumnsWithoutInference),
        };
        let has_header = header_map.is_some();
        let column_map = header_map.unwrap_or_else(|| ColumnMap::positional(&columns));

        let plan = column_map
            .iter()
            .filter_map(|(name, index)| {
                columns
                    .iter()
                    .find(|column| column.name == name)
                    .map(|column| FieldPlan {
                        name: name.to_string(),
                        index,
                        column_type: column.column_type,
                        required: column.required,
                    })
            })
            .collect();

        info!(
            "reading CSV: encoding {}, line terminator {:?}, separator {:?}, {}, {} columns",
            options.encoding.charset().map_or("unknown", |charset| charset.name()),
            terminator.as_str(),
            char::from(separator),
            if has_header { "header line" } else { "no header line" },
            column_map.len()
        );

        Ok(CsvReader {
            records,
            record,
            options,
            columns,
            column_map,
            plan,
            data_start,
            row_start,
            row_index: 0,
            current: None,
        })
    }
}

/// Installs the decoding for `charset`, hiding a UTF-8 byte-order mark of
/// `bom` bytes. Other marks are consumed by their decoders.
fn install_charset<R: Read + Seek>(
    source: &mut ByteSource<R>,
    charset: Charset,
    bom: usize,
) -> io::Result<()> {
    if charset == Charset::Utf8 && bom > 0 {
        source.skip_prefix(bom as u64)
    } else if charset.is_utf8_compatible() {
        Ok(())
    } else {
        source.set_transcoder(Transcoder::for_charset(charset))
    }
}

fn seek_records<R: Read + Seek>(
    records: &mut csv::Reader<ByteSource<R>>,
    offset: u64,
) -> Result<()> {
    let mut position = Position::new();
    position.set_byte(offset);
    records.seek(position)?;
    Ok(())
}
