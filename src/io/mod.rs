/// Supported character sets.
pub mod charset;

/// Line terminator normalization.
pub mod endings;

/// Seekable byte source with stream transforms.
pub mod source;

/// Incremental transcoding to UTF-8.
pub mod transcode;
