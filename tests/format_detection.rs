pub mod common;

use autocsv::{
    core::{
        config::{Detect, LineTerminator, SourceEncoding},
        row::Value,
    },
    io::charset::Charset,
    reader::csv_reader::CsvReaderBuilder,
};

use common::{cursor, init_logger, utf16le_with_bom};

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

#[test]
fn utf16le_tab_separated_dos_export() {
    init_logger();
    let bytes = utf16le_with_bom("Kunde\tOrt\tUmsatz\r\nMüller\tKöln\t1.234,56\r\nÖzdemir\tGraz\t99\r\n");

    let mut reader = CsvReaderBuilder::new()
        .columns(["kunde", "ort", "umsatz"])
        .from_reader(cursor(bytes))
        .unwrap();

    let options = reader.options();
    assert_eq!(options.encoding, SourceEncoding::Known(Charset::Utf16Le));
    assert_eq!(options.line_terminator, Detect::Fixed(LineTerminator::CrLf));
    assert_eq!(options.separator, Detect::Fixed(b'\t'));

    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("kunde")), Some("Müller"));
    assert_eq!(text(row.get("ort")), Some("Köln"));
    assert_eq!(text(row.get("umsatz")), Some("1.234,56"));

    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("kunde")), Some("Özdemir"));
    assert!(reader.next_row().is_none());
}

#[test]
fn utf16be_without_bom() {
    let bytes: Vec<u8> = "id,name\n1,Zoë\n"
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect();

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(bytes)).unwrap();

    assert_eq!(
        reader.options().encoding,
        SourceEncoding::Known(Charset::Utf16Be)
    );
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("name")), Some("Zoë"));
}

#[test]
fn utf32le_with_bom() {
    let mut bytes = vec![0xFF, 0xFE, 0x00, 0x00];
    for c in "a;b\nx;€\n".chars() {
        bytes.extend_from_slice(&u32::from(c).to_le_bytes());
    }

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(bytes)).unwrap();

    assert_eq!(
        reader.options().encoding,
        SourceEncoding::Known(Charset::Utf32Le)
    );
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("b")), Some("€"));
}

#[test]
fn windows_1252_dos_export() {
    init_logger();
    let bytes = b"Name;Stadt;Betrag\r\nJos\xe9;M\xfcnchen;12\x80\r\n".to_vec();

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(bytes)).unwrap();

    let options = reader.options();
    assert_eq!(options.encoding, SourceEncoding::Known(Charset::Windows1252));
    assert_eq!(options.line_terminator, Detect::Fixed(LineTerminator::CrLf));

    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("name")), Some("José"));
    assert_eq!(text(row.get("stadt")), Some("München"));
    assert_eq!(text(row.get("betrag")), Some("12€"));
}

#[test]
fn ibm850_when_windows_1252_has_undefined_bytes() {
    let bytes = b"Name;Ort\r\nM\x81ller;K\x94ln\r\n".to_vec();

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(bytes)).unwrap();

    assert_eq!(
        reader.options().encoding,
        SourceEncoding::Known(Charset::Ibm850)
    );
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("name")), Some("Müller"));
    assert_eq!(text(row.get("ort")), Some("Köln"));
}

#[test]
fn mac_roman_with_carriage_returns() {
    let bytes = b"city,country\rZ\x9frich,CH\rGen\x8fve,CH\r".to_vec();

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(bytes)).unwrap();

    let options = reader.options();
    assert_eq!(options.encoding, SourceEncoding::Known(Charset::Macintosh));
    assert_eq!(options.line_terminator, Detect::Fixed(LineTerminator::Cr));

    let cities: Vec<String> = reader
        .by_ref()
        .filter_map(|row| text(row.get("city")).map(str::to_string))
        .collect();
    assert_eq!(cities, vec!["Zürich", "Genève"]);
}

#[test]
fn utf8_character_split_by_the_detection_window() {
    let mut data = b"name;note\na;".to_vec();
    data.resize(1022, b'x');
    data.extend_from_slice("€\nb;y\n".as_bytes());
    assert_eq!(&data[1022..1025], "€".as_bytes());

    let mut reader = CsvReaderBuilder::new().from_reader(cursor(data)).unwrap();

    assert_eq!(reader.options().encoding, SourceEncoding::Known(Charset::Utf8));
    let row = reader.next_row().unwrap();
    let note = text(row.get("note")).unwrap();
    assert!(note.ends_with("x€"));
    assert_eq!(note.chars().count(), 1011);
}

#[test]
fn utf8_bom_is_not_part_of_the_first_cell() {
    let mut reader = CsvReaderBuilder::new()
        .from_reader(cursor(b"\xEF\xBB\xBFid,name\n1,Ann\n".to_vec()))
        .unwrap();

    assert_eq!(reader.column_index("id").unwrap(), 0);
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("id")), Some("1"));
}

#[test]
fn utf8_bom_before_separator_line() {
    let mut reader = CsvReaderBuilder::new()
        .from_reader(cursor(b"\xEF\xBB\xBFsep=;\nid;name\n1;Ann\n".to_vec()))
        .unwrap();

    assert_eq!(reader.options().separator, Detect::Fixed(b';'));
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("name")), Some("Ann"));
    assert_eq!(reader.current_row_number(), 3);
}

#[test]
fn explicit_encoding_skips_detection() {
    let mut reader = CsvReaderBuilder::new()
        .encoding(Charset::Macintosh)
        .from_reader(cursor(b"a,b\n\x8a,\x9a\n".to_vec()))
        .unwrap();

    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("a")), Some("ä"));
    assert_eq!(text(row.get("b")), Some("ö"));
}

#[test]
fn unknown_encoding_is_guessed_from_content() {
    let bytes = b"Name;Stadt\r\nJos\xe9;M\xfcnchen\r\n".to_vec();

    let mut reader = CsvReaderBuilder::new()
        .encoding(SourceEncoding::Unknown)
        .fallback_encoding(Charset::Macintosh)
        .from_reader(cursor(bytes))
        .unwrap();

    assert_eq!(
        reader.options().encoding,
        SourceEncoding::Known(Charset::Windows1252)
    );
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("name")), Some("José"));
    assert_eq!(text(row.get("stadt")), Some("München"));
}

#[test]
fn explicit_line_terminator() {
    let mut reader = CsvReaderBuilder::new()
        .line_terminator(LineTerminator::Cr)
        .from_reader(cursor(b"a,b\r1,2\r".to_vec()))
        .unwrap();

    assert_eq!(
        reader.options().line_terminator,
        Detect::Fixed(LineTerminator::Cr)
    );
    assert_eq!(reader.by_ref().count(), 1);
}

#[test]
fn reader_starts_at_the_current_position() {
    use std::io::{Cursor, Seek, SeekFrom};

    let mut inner = Cursor::new(b"garbage\na,b\n1,2\n".to_vec());
    inner.seek(SeekFrom::Start(8)).unwrap();

    let mut reader = CsvReaderBuilder::new().from_reader(inner).unwrap();
    let row = reader.next_row().unwrap();
    assert_eq!(text(row.get("b")), Some("2"));

    reader.rewind().unwrap();
    assert_eq!(reader.by_ref().count(), 1);
}
