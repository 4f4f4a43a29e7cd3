//! Error taxonomy for `edb` operations.
//!
//! Mirrors the domain/kind structure of libesedb's `liberror` codes: every
//! error belongs to one of eight domains (arguments, conversion,
//! compression, I/O, input, memory, output, runtime), and carries a
//! domain-specific numbered kind alongside a human-readable message.

use thiserror::Error;

/// Errors returned by `edb` operations.
#[derive(Error, Debug)]
pub enum EdbError {
    /// An invalid argument was supplied to a public function.
    #[error("argument error ({kind:?}): {message}")]
    Argument {
        kind: ArgumentErrorKind,
        message: String,
    },

    /// A value could not be converted between encodings (e.g. codepage
    /// decoding of a TEXT/LARGE_TEXT column).
    #[error("conversion error ({kind:?}): {message}")]
    Conversion {
        kind: ConversionErrorKind,
        message: String,
    },

    /// A column decompressor failed to expand its input.
    #[error("compression error ({kind:?}): {message}")]
    Compression {
        kind: CompressionErrorKind,
        message: String,
    },

    /// An I/O error occurred (file open, read, seek).
    #[error("I/O error ({kind:?}): {message}")]
    Io {
        kind: IoErrorKind,
        message: String,
    },

    /// The file's on-disk structure did not match what was expected.
    #[error("input error ({kind:?}): {message}")]
    Input {
        kind: InputErrorKind,
        message: String,
    },

    /// An internal allocation or copy failed.
    #[error("memory error ({kind:?}): {message}")]
    Memory {
        kind: MemoryErrorKind,
        message: String,
    },

    /// A caller-provided output buffer or sink rejected a write.
    #[error("output error ({kind:?}): {message}")]
    Output {
        kind: OutputErrorKind,
        message: String,
    },

    /// An internal invariant was violated at runtime.
    #[error("runtime error ({kind:?}): {message}")]
    Runtime {
        kind: RuntimeErrorKind,
        message: String,
    },
}

/// `LIBESEDB_ARGUMENT_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    Generic = 0,
    InvalidValue = 1,
    ValueLessThanZero = 2,
    ValueZeroOrLess = 3,
    ValueExceedsMaximum = 4,
    ValueTooSmall = 5,
    ValueTooLarge = 6,
    ValueOutOfBounds = 7,
    UnsupportedValue = 8,
    ConflictingValue = 9,
}

/// `LIBESEDB_CONVERSION_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionErrorKind {
    Generic = 0,
    InputFailed = 1,
    OutputFailed = 2,
}

/// `LIBESEDB_COMPRESSION_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionErrorKind {
    Generic = 0,
    CompressFailed = 1,
    DecompressFailed = 2,
}

/// `LIBESEDB_IO_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorKind {
    Generic = 0,
    OpenFailed = 1,
    CloseFailed = 2,
    SeekFailed = 3,
    ReadFailed = 4,
    WriteFailed = 5,
    AccessDenied = 6,
    InvalidResource = 7,
    IoctlFailed = 8,
    UnlinkFailed = 9,
}

/// `LIBESEDB_INPUT_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorKind {
    Generic = 0,
    InvalidData = 1,
    SignatureMismatch = 2,
    ChecksumMismatch = 3,
    ValueMismatch = 4,
}

/// `LIBESEDB_MEMORY_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorKind {
    Generic = 0,
    Insufficient = 1,
    CopyFailed = 2,
    SetFailed = 3,
}

/// `LIBESEDB_OUTPUT_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputErrorKind {
    Generic = 0,
    InsufficientSpace = 1,
}

/// `LIBESEDB_RUNTIME_ERROR_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Generic = 0,
    ValueMissing = 1,
    ValueAlreadySet = 2,
    InitializeFailed = 3,
    ResizeFailed = 4,
    FinalizeFailed = 5,
    GetFailed = 6,
    SetFailed = 7,
    AppendFailed = 8,
    CopyFailed = 9,
    RemoveFailed = 10,
    PrintFailed = 11,
    ValueOutOfBounds = 12,
    ValueExceedsMaximum = 13,
    UnsupportedValue = 14,
    AbortRequested = 15,
}

impl EdbError {
    pub fn io(kind: IoErrorKind, message: impl Into<String>) -> Self {
        EdbError::Io {
            kind,
            message: message.into(),
        }
    }

    pub fn input(kind: InputErrorKind, message: impl Into<String>) -> Self {
        EdbError::Input {
            kind,
            message: message.into(),
        }
    }

    pub fn argument(kind: ArgumentErrorKind, message: impl Into<String>) -> Self {
        EdbError::Argument {
            kind,
            message: message.into(),
        }
    }

    pub fn runtime(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        EdbError::Runtime {
            kind,
            message: message.into(),
        }
    }

    pub fn compression(kind: CompressionErrorKind, message: impl Into<String>) -> Self {
        EdbError::Compression {
            kind,
            message: message.into(),
        }
    }

    pub fn conversion(kind: ConversionErrorKind, message: impl Into<String>) -> Self {
        EdbError::Conversion {
            kind,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EdbError {
    fn from(e: std::io::Error) -> Self {
        EdbError::io(IoErrorKind::ReadFailed, e.to_string())
    }
}
