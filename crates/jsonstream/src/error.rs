//! Error types raised by the assembler, the event parser and the one-shot
//! entry points.
//!
//! Every error is fatal for the instance that raised it: a parser or
//! assembler that has returned an error refuses further input.
use bstr::BString;
use thiserror::Error;

/// A grammar violation detected by [`StreamingParser`](crate::StreamingParser).
///
/// `position` is the zero-based index of the offending character in the
/// decoded character stream, counted across every chunk fed so far. `line`
/// and `column` are one-based, as is the character number in the message.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source}: char {}", .position + 1)]
pub struct ParseError {
    pub(crate) source: SyntaxError,
    /// Absolute character position of the violation.
    pub position: usize,
    /// Line of the violation, starting at 1.
    pub line: usize,
    /// Column of the violation, starting at 1.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(source: SyntaxError, position: usize, line: usize, column: usize) -> Self {
        Self {
            source,
            position,
            line,
            column,
        }
    }

    /// The grammar rule that was violated.
    #[must_use]
    pub fn kind(&self) -> &SyntaxError {
        &self.source
    }
}

/// The grammar rule behind a [`ParseError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Expected object or array start, found {0:?}")]
    ExpectedDocumentStart(char),
    #[error("Expected object key start, found {0:?}")]
    ExpectedKeyStart(char),
    #[error("Expected value, found {0:?}")]
    ExpectedValue(char),
    #[error("Expected colon key separator, found {0:?}")]
    ExpectedColon(char),
    #[error("Expected comma or object or array close, found {0:?}")]
    ExpectedCommaOrClose(char),
    #[error("Expected end of {0}")]
    MismatchedClose(&'static str),
    #[error("Control characters must be escaped, found {0:?}")]
    UnescapedControl(char),
    #[error("Expected escaped character, found {0:?}")]
    InvalidEscape(char),
    #[error("Expected unicode escape hex digit, found {0:?}")]
    ExpectedHexDigit(char),
    #[error("Expected low surrogate pair half")]
    ExpectedLowSurrogate,
    #[error("Expected high surrogate pair half")]
    ExpectedHighSurrogate,
    #[error("Expected 0-9 digit, found {0:?}")]
    ExpectedDigit(char),
    #[error("Leading zero must not be followed by digit {0:?}")]
    LeadingZero(char),
    #[error("Expected +, -, or 0-9 digit, found {0:?}")]
    ExpectedExponent(char),
    #[error("Invalid number literal {0:?}")]
    InvalidNumber(String),
    #[error("Expected {0} keyword")]
    ExpectedKeyword(&'static str),
    #[error("Unexpected data {0:?}")]
    TrailingData(char),
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Parser is unusable after an earlier error")]
    Poisoned,
}

/// A malformed byte sequence rejected by [`Utf8Assembler`](crate::Utf8Assembler).
///
/// `offset` is the zero-based index, within the whole byte stream, of the
/// first byte of the rejected sequence.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source}: byte {offset}")]
pub struct EncodingError {
    pub(crate) source: InvalidSequence,
    /// Absolute byte offset of the rejected sequence.
    pub offset: usize,
}

impl EncodingError {
    pub(crate) fn new(source: InvalidSequence, offset: usize) -> Self {
        Self { source, offset }
    }

    /// Why the sequence was rejected.
    #[must_use]
    pub fn kind(&self) -> &InvalidSequence {
        &self.source
    }
}

/// The reason behind an [`EncodingError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSequence {
    #[error("Expected start of character, found byte 0x{0:02X}")]
    ExpectedStart(u8),
    #[error("Expected continuation byte, found byte 0x{0:02X}")]
    ExpectedContinuation(u8),
    #[error("Overlong encoding {0:?}")]
    Overlong(BString),
    #[error("Surrogate codepoint U+{0:04X} encoded as UTF-8")]
    Surrogate(u32),
    #[error("Codepoint U+{0:X} is above U+10FFFF")]
    OutOfRange(u32),
    #[error("Truncated character {0:?} at end of input")]
    Truncated(BString),
    #[error("Assembler is unusable after an earlier error")]
    Poisoned,
}

/// Any failure raised while turning bytes into events or values.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Reading from the byte source failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the parse error, if this is one.
    #[must_use]
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the encoding error, if this is one.
    #[must_use]
    pub fn as_encoding_error(&self) -> Option<&EncodingError> {
        match self {
            Self::Encoding(err) => Some(err),
            _ => None,
        }
    }
}
