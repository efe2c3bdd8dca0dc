use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying file handle failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Compressing or decompressing a sorter block failed
    #[error("Block compression error: {0}")]
    Compression(#[from] lz4_flex::frame::Error),

    /// A structured read asked for more bytes than remain
    #[error("Unexpected end of data: {required} more byte(s) required")]
    EndOfData { required: usize },

    /// A modified UTF-8 sequence has an invalid lead or continuation byte
    #[error("Malformed modified UTF-8 input around byte {offset}")]
    MalformedUtf { offset: usize },

    /// A string does not fit into the 16-bit length prefix
    #[error("Encoded string is too long: {length} bytes (max 65535)")]
    UtfTooLong { length: usize },

    /// Decoded UTF-16 units contain an unpaired surrogate
    #[error("Decoded string contains an unpaired surrogate")]
    InvalidSurrogate,

    /// A union discriminator read from data points outside the slot table
    #[error("Invalid union discriminator {position} (union has {slots} slot(s))")]
    InvalidDiscriminator { position: i64, slots: usize },

    /// Any other inconsistency detected in serialized data
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Two values of different concrete types were compared
    #[error("Incompatible types: expected `{expected}`, got `{actual}`")]
    IncompatibleTypes {
        expected: &'static str,
        actual: &'static str,
    },

    /// Two composite keys of different shapes were compared
    #[error("Arity mismatch: expected {expected} component(s), got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A caller asked a union to switch to a slot it does not have
    #[error("Union position {position} is out of range (union has {slots} slot(s))")]
    InvalidPosition { position: usize, slots: usize },

    /// A buffer window does not fit into its backing array
    #[error("Window {offset}+{length} exceeds buffer capacity {capacity}")]
    InvalidWindow {
        offset: usize,
        length: usize,
        capacity: usize,
    },

    /// The operation is not supported by a binary-oriented endpoint
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Returns `true` if the input ran out before a structured read completed.
    pub fn is_end_of_data(&self) -> bool {
        match self {
            Error::EndOfData { .. } => true,
            Error::Io(err) => err.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// Returns `true` for malformed encodings (bad UTF, bad discriminator, ...).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedUtf { .. }
                | Error::UtfTooLong { .. }
                | Error::InvalidSurrogate
                | Error::InvalidDiscriminator { .. }
                | Error::MalformedData(_)
        )
    }

    /// Returns `true` for errors that can only come from a caller bug.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::IncompatibleTypes { .. }
                | Error::ArityMismatch { .. }
                | Error::InvalidPosition { .. }
                | Error::InvalidWindow { .. }
                | Error::Unsupported(_)
        )
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(err) => err,
            err @ Error::EndOfData { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            err @ Error::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, err),
            err if err.is_usage_error() => io::Error::new(io::ErrorKind::InvalidInput, err),
            err => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// Crate result
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn classifies_errors() {
        assert!(Error::EndOfData { required: 4 }.is_end_of_data());
        assert!(Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")).is_end_of_data());
        assert!(!Error::MalformedUtf { offset: 0 }.is_end_of_data());

        assert!(Error::MalformedUtf { offset: 3 }.is_format_error());
        assert!(Error::InvalidDiscriminator { position: 9, slots: 2 }.is_format_error());
        assert!(!Error::Unsupported("readLine").is_format_error());

        assert!(Error::Unsupported("readLine").is_usage_error());
        assert!(Error::IncompatibleTypes {
            expected: "a",
            actual: "b"
        }
        .is_usage_error());
        assert!(Error::ArityMismatch { expected: 2, actual: 3 }.is_usage_error());
    }

    #[test]
    fn converts_to_io_error_kinds() {
        let eof: io::Error = Error::EndOfData { required: 1 }.into();
        assert_eq!(eof.kind(), io::ErrorKind::UnexpectedEof);

        let bad: io::Error = Error::MalformedUtf { offset: 0 }.into();
        assert_eq!(bad.kind(), io::ErrorKind::InvalidData);

        let unsupported: io::Error = Error::Unsupported("readLine").into();
        assert_eq!(unsupported.kind(), io::ErrorKind::Unsupported);

        let usage: io::Error = Error::InvalidPosition { position: 3, slots: 1 }.into();
        assert_eq!(usage.kind(), io::ErrorKind::InvalidInput);
    }
}
