//! One-shot parsing of a complete document into a [`Value`].
use std::io::{ErrorKind, Read};

use crate::{
    builder::Builder,
    error::{Error, ParseError, SyntaxError},
    options::ParserOptions,
    parser::StreamingParser,
    value::Value,
};

/// Bytes requested from the reader per read call.
pub const BUF_SIZE: usize = 4096;

/// Parses a complete document held in memory.
///
/// # Examples
///
/// ```
/// use jsonstream::Value;
///
/// let value = jsonstream::parse(r#"[1,2, null, 12.1,"test"]"#).unwrap();
/// assert_eq!(
///     value,
///     Value::Array(vec![
///         Value::Integer(1),
///         Value::Integer(2),
///         Value::Null,
///         Value::Float(12.1),
///         Value::String("test".into()),
///     ])
/// );
/// ```
///
/// # Errors
///
/// Fails with the parser's error on malformed input, and with
/// [`SyntaxError::UnexpectedEndOfInput`] on empty or unfinished input.
pub fn parse(text: &str) -> Result<Value, Error> {
    parse_slice(text.as_bytes())
}

/// Parses a complete document given as bytes.
///
/// # Errors
///
/// See [`parse`]; invalid UTF-8 fails with [`Error::Encoding`].
pub fn parse_slice(bytes: &[u8]) -> Result<Value, Error> {
    parse_with(bytes, ParserOptions::default())
}

/// Parses a document read from `reader` in blocks of [`BUF_SIZE`] bytes.
///
/// # Errors
///
/// See [`parse_slice`]; read failures surface as [`Error::Io`].
pub fn parse_reader<R: Read>(reader: R) -> Result<Value, Error> {
    parse_with(reader, ParserOptions::default())
}

/// Like [`parse_reader`], with explicit parser options.
///
/// # Errors
///
/// See [`parse_slice`]; read failures surface as [`Error::Io`].
pub fn parse_with<R: Read>(mut reader: R, options: ParserOptions) -> Result<Value, Error> {
    let mut parser = StreamingParser::new(options);
    let builder = Builder::attach(&mut parser);

    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        parser.feed(&buf[..n])?;
    }
    parser.finish()?;

    let (position, line, column) = parser.location();
    drop(parser);
    let result = builder.borrow_mut().take_result();
    result.ok_or_else(|| {
        ParseError::new(SyntaxError::UnexpectedEndOfInput, position, line, column).into()
    })
}
