use std::{io, path::PathBuf};

use thiserror::Error;

/// Broad classification of a [`ReaderError`].
///
/// Lets callers branch on configuration mistakes versus data problems without
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed an invalid configuration or argument.
    InvalidArgument,
    /// The input file does not exist.
    NotFound,
    /// The input file exists but cannot be read.
    PermissionDenied,
    /// Any other I/O failure of the byte source.
    Io,
    /// The input could not be interpreted (separator, header, tokenizer).
    Parse,
}

#[derive(Error, Debug)]
/// Reader error
pub enum ReaderError {
    #[error("{}: No such file", .path.display())]
    NotFound { path: PathBuf },

    #[error("{}: Permission denied", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("columns specification contains invalid column names: {}", .0.join(", "))]
    InvalidColumnNames(Vec<String>),

    #[error(
        "columns contain optional columns mixed with required columns but require-header-line is off; \
         either require a header line or make optional columns follow required columns"
    )]
    MixedRequiredColumns,

    #[error("{0} is not a valid column type")]
    InvalidColumnType(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid line terminator: {0:?}")]
    InvalidLineTerminator(String),

    #[error("failed to parse this file; please ensure the columns are separated by '{}' characters", .0.escape_default())]
    SeparatorMismatch(char),

    #[error("the given input file contains no header line")]
    MissingHeader,

    #[error("not all required columns could be mapped from header line")]
    UnmappedColumns,

    #[error("no columns given and input file is lacking a header line")]
    NoColumns,

    #[error("no columns given and header inference is disabled")]
    NoColumnsWithoutInference,

    #[error("CSV tokenizer: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row} cannot be deserialized: {source}")]
    Deserialize {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ReaderError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReaderError::InvalidColumnNames(_)
            | ReaderError::MixedRequiredColumns
            | ReaderError::InvalidColumnType(_)
            | ReaderError::UnknownColumn(_)
            | ReaderError::UnsupportedEncoding(_)
            | ReaderError::InvalidLineTerminator(_) => ErrorKind::InvalidArgument,
            ReaderError::NotFound { .. } => ErrorKind::NotFound,
            ReaderError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ReaderError::Open { .. } | ReaderError::Io(_) => ErrorKind::Io,
            ReaderError::Csv(err) if err.is_io_error() => ErrorKind::Io,
            ReaderError::SeparatorMismatch(_)
            | ReaderError::MissingHeader
            | ReaderError::UnmappedColumns
            | ReaderError::NoColumns
            | ReaderError::NoColumnsWithoutInference
            | ReaderError::Csv(_)
            | ReaderError::Deserialize { .. } => ErrorKind::Parse,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ReaderError>;
