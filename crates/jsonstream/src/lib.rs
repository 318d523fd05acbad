//! An incremental, event-driven JSON parser.
//!
//! Bytes arrive in chunks of any size, split anywhere: inside a multi-byte
//! character, an escape, a number or a keyword. The [`StreamingParser`]
//! decodes them with a [`Utf8Assembler`] and reports structural events
//! (document, object and array boundaries, keys and scalar values) to
//! registered listeners as soon as each one is recognized. Nothing is
//! materialized unless a [`Builder`] is attached, or one of the one-shot
//! entry points such as [`parse`] is used.
//!
//! ```
//! use std::cell::Cell;
//!
//! use jsonstream::{ParserOptions, StreamingParser};
//!
//! let depth = Cell::new(0usize);
//! let deepest = Cell::new(0usize);
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser
//!     .on_start_array(|| {
//!         depth.set(depth.get() + 1);
//!         deepest.set(deepest.get().max(depth.get()));
//!     })
//!     .on_end_array(|| depth.set(depth.get() - 1));
//!
//! for chunk in ["[[1,", "[2]],", "3]"] {
//!     parser.feed(chunk.as_bytes()).unwrap();
//! }
//! parser.finish().unwrap();
//! assert_eq!(deepest.get(), 3);
//! ```
#![allow(missing_docs)]

mod builder;
mod document;
mod error;
mod escape_buffer;
mod event;
mod literal_buffer;
mod numbers;
mod options;
mod parser;
mod utf8;
mod value;

#[cfg(test)]
mod tests;

pub use builder::Builder;
pub use document::{BUF_SIZE, parse, parse_reader, parse_slice, parse_with};
pub use error::{EncodingError, Error, InvalidSequence, ParseError, SyntaxError};
pub use event::{Event, Handler, Listeners};
pub use options::ParserOptions;
pub use parser::StreamingParser;
pub use utf8::Utf8Assembler;
pub use value::{Array, Map, Scalar, Value};
