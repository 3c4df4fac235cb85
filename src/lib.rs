#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 <div align="center">
   <h1>autocsv</h1>
   <h3>A CSV reader that figures out the format by itself</h3>

   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # autocsv

 Spreadsheet exports come in every flavour: UTF-16 with tabs from one vendor,
 Windows-1252 with semicolons and DOS line endings from another, a `sep=;`
 line on top from a third. **autocsv** reads them all through one entry point.
 It detects the encoding, line terminator, column separator and header line,
 maps the columns you ask for and coerces each row to typed values.

 ## Core Concepts

- **CsvReader:** Runs detection once at construction, then reads one row at a time.
- **ColumnSpec:** A column you expect: its name, whether it is required, and its type (`string`, `int`, `float` or `bool`).
- **TypedRow:** One row as an ordered column name to `Value` mapping. It can be deserialized into your own `serde` types.
- **ItemReader:** The reading contract. `read()` returns `Ok(None)` at the end of the input and surfaces I/O errors.

 ## Number parsing

 `int` and `float` columns accept the regional conventions found in the wild:
 `1.234,50`, `1'234.50`, `1 234,50` and `1,234.50` all read as `1234.5`.
 A cell that cannot be read as its column type becomes `Value::Null`.

 ## Getting Started

```rust
# use std::io::Cursor;
use autocsv::{
    core::column::{ColumnSpec, ColumnType},
    core::row::Value,
    reader::csv_reader::CsvReaderBuilder,
    ReaderError,
};

fn main() -> Result<(), ReaderError> {
    let data = "sep=;\nOrder ID;Total;Paid\n1;1.234,50;yes\n2;99;no\n";

    let reader = CsvReaderBuilder::new()
        .columns([
            ColumnSpec::new("orderid").with_type(ColumnType::Int),
            ColumnSpec::new("total").with_type(ColumnType::Float),
            ColumnSpec::new("paid").with_type(ColumnType::Bool),
        ])
        .from_reader(Cursor::new(data))?;

    let totals: Vec<Value> = reader
        .map(|row| row.get("total").cloned().unwrap_or(Value::Null))
        .collect();
    assert_eq!(totals, vec![Value::Float(1234.5), Value::Float(99.0)]);

    Ok(())
}
```

 ## Logging

 The crate logs through the `log` facade: detection results at `debug`, one
 format summary per reader at `info`, read errors that end iteration at
 `warn`. Install any logger (e.g. `env_logger`) to see them.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 */

/// Column model, reader options and the item reader contract
pub mod core;

/// Format detection (encoding, line terminator, separator)
pub mod detect;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Cell parsers for booleans and regional number formats
pub mod field;

/// Byte sources, charsets and stream transforms
pub mod io;

/// The self-detecting CSV reader
pub mod reader;
