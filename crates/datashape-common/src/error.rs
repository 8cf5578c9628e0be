//! Error model for the datashape library.
//!
//! Every fallible operation returns [`Result`]. An [`Error`] carries the
//! failure kind, a human-readable message, and optionally the source span
//! the failure points at. A successful call simply returns `Ok`, which
//! plays the role of the `Success` state of the C API this mirrors.

use std::borrow::Cow;
use std::fmt;

use crate::span::Span;

/// The failure taxonomy.
///
/// `Memory` exists for API fidelity with the C library; the Rust
/// implementation never constructs it (allocation failure aborts).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Memory,
    Value,
    Type,
    InvalidArgument,
    Runtime,
    NotImplemented,
    Lex,
    Parse,
    Os,
}

impl ErrorKind {
    /// The canonical kind name, as it appears in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Memory => "MemoryError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Type => "TypeError",
            ErrorKind::InvalidArgument => "InvalidArgumentError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::NotImplemented => "NotImplementedError",
            ErrorKind::Lex => "LexError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Os => "OSError",
        }
    }
}

/// A datashape error: kind, message, and an optional source location.
///
/// Messages are `Cow<'static, str>` so that the fixed diagnostics the
/// library emits most often stay allocation-free while formatted ones
/// carry their own storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Cow<'static, str>,
    pub span: Option<Span>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Error {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn value(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Value, message)
    }

    pub fn type_error(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Type, message)
    }

    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::InvalidArgument, message)
    }

    pub fn runtime(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Runtime, message)
    }

    pub fn not_implemented(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::NotImplemented, message)
    }

    pub fn lex(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Lex, message)
    }

    pub fn parse(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Parse, message)
    }

    pub fn os(message: impl Into<Cow<'static, str>>) -> Self {
        Error::new(ErrorKind::Os, message)
    }

    /// Attach the source span the error points at.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::os(err.to_string())
    }
}
