//! Format sniffing.
//!
//! Each detector inspects a bounded window at the start of a
//! [`ByteSource`](crate::io::source::ByteSource) and leaves the source where
//! it found it.

/// Byte-order marks, wide-newline patterns and charset guessing.
pub mod encoding;

/// Column separator detection and `sep=` declaration lines.
pub mod separator;

/// Line terminator detection.
pub mod terminator;
