//! The event-driven streaming parser.
//!
//! [`StreamingParser`] accepts raw byte chunks split at any boundary, decodes
//! them with a [`Utf8Assembler`] and runs each character through a state
//! machine that mirrors the JSON grammar. Listeners fire synchronously, in
//! input order, before `feed` returns.
//!
//! # Examples
//!
//! ```rust
//! use jsonstream::{ParserOptions, Scalar, StreamingParser};
//!
//! let mut values = Vec::new();
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.on_value(|v| values.push(v.clone()));
//! parser.feed(br#"[1, 2"#).unwrap();
//! parser.feed(br#".5, "three"]"#).unwrap();
//! parser.finish().unwrap();
//! drop(parser);
//!
//! assert_eq!(
//!     values,
//!     [
//!         Scalar::Integer(1),
//!         Scalar::Float(2.5),
//!         Scalar::String("three".into())
//!     ]
//! );
//! ```
#![allow(clippy::enum_glob_use)]
#![allow(clippy::inline_always)]

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::{Error, ParseError, SyntaxError},
    escape_buffer::{Pairing, PairingError, SurrogateSlot, UnicodeEscapeBuffer},
    event::{Handler, Listeners},
    literal_buffer::{self, ExpectedLiteralBuffer},
    numbers::NumberLexeme,
    options::ParserOptions,
    utf8::Utf8Assembler,
    value::Scalar,
};

/// What the machine expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartDocument,
    /// Just after `{`: a key or `}`.
    StartObject,
    /// Just after `[`: a value or `]`.
    StartArray,
    /// Inside a key or a string value.
    String,
    /// After `\` inside a string.
    StringEscape,
    /// Collecting the four digits of `\uXXXX`.
    UnicodeEscape,
    /// A high surrogate is staged; `\` must follow.
    SurrogateBackslash,
    /// A high surrogate is staged; `u` must follow.
    SurrogateU,
    Sign,
    Zero,
    Integer,
    DecimalPoint,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentInteger,
    /// Matching `true`, `false` or `null`.
    Literal,
    /// After a key: `:`.
    KeySeparator,
    /// After `:`: a value.
    Value,
    /// After a value inside a container: `,` or a close token.
    EndValue,
    /// After `,`: a key in objects, a value in arrays.
    ValueSeparator,
    EndDocument,
    Error,
}

/// Tags on the container stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
    Key,
    String,
}

impl Frame {
    fn name(self) -> &'static str {
        match self {
            Frame::Object => "object",
            Frame::Array => "array",
            Frame::Key => "key",
            Frame::String => "string",
        }
    }
}

/// Outcome of feeding one character to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// The character was used; move to the next one.
    Consumed,
    /// A literal ended before this character; run it again in the new state.
    Reprocess,
}

use Flow::*;

/// An incremental JSON parser that reports structural events to listeners.
///
/// Each instance processes one document. Any error is final: later calls
/// fail with [`SyntaxError::Poisoned`].
pub struct StreamingParser<'l> {
    options: ParserOptions,
    assembler: Utf8Assembler,
    decoded: String,

    state: State,
    frames: Vec<Frame>,
    buffer: String,
    escape: UnicodeEscapeBuffer,
    surrogate: SurrogateSlot,
    literal: ExpectedLiteralBuffer,

    listeners: Listeners<'l>,

    pos: usize,
    line: usize,
    column: usize,
}

impl<'l> StreamingParser<'l> {
    /// Creates a parser with no listeners.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonstream::{ParserOptions, StreamingParser};
    ///
    /// let parser = StreamingParser::new(ParserOptions::default());
    /// assert_eq!(parser.position(), 0);
    /// ```
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self::with_listeners(options, Listeners::new())
    }

    /// Creates a parser with a pre-populated listener registry.
    #[must_use]
    pub fn with_listeners(options: ParserOptions, listeners: Listeners<'l>) -> Self {
        Self {
            options,
            assembler: Utf8Assembler::new(),
            decoded: String::new(),

            state: State::StartDocument,
            frames: Vec::new(),
            buffer: String::new(),
            escape: UnicodeEscapeBuffer::new(),
            surrogate: SurrogateSlot::default(),
            literal: ExpectedLiteralBuffer::none(),

            listeners,

            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Registers a callback for each document start.
    pub fn on_start_document(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_start_document(f);
        self
    }

    /// Registers a callback for each document end.
    pub fn on_end_document(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_end_document(f);
        self
    }

    /// Registers a callback for each `{`.
    pub fn on_start_object(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_start_object(f);
        self
    }

    /// Registers a callback for each `}`.
    pub fn on_end_object(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_end_object(f);
        self
    }

    /// Registers a callback for each `[`.
    pub fn on_start_array(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_start_array(f);
        self
    }

    /// Registers a callback for each `]`.
    pub fn on_end_array(&mut self, f: impl FnMut() + 'l) -> &mut Self {
        self.listeners.add_end_array(f);
        self
    }

    /// Registers a callback receiving each object key.
    pub fn on_key(&mut self, f: impl FnMut(&str) + 'l) -> &mut Self {
        self.listeners.add_key(f);
        self
    }

    /// Registers a callback receiving each scalar value, strings included.
    pub fn on_value(&mut self, f: impl FnMut(&Scalar) + 'l) -> &mut Self {
        self.listeners.add_value(f);
        self
    }

    /// Registers `handler` for all eight event kinds.
    pub fn subscribe<H: Handler + 'l>(&mut self, handler: Rc<RefCell<H>>) -> &mut Self {
        self.listeners.subscribe(handler);
        self
    }

    /// Number of characters consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn location(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.column)
    }

    /// Returns `true` once `end_document` has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == State::EndDocument
    }

    /// Feeds a chunk of raw bytes.
    ///
    /// The chunk may end anywhere, including inside a multi-byte character.
    ///
    /// # Errors
    ///
    /// [`Error::Encoding`] if the bytes are not valid UTF-8, in which case no
    /// event fires for this chunk. [`Error::Parse`] on a grammar violation,
    /// after the events for everything before the offending character.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.state == State::Error {
            return Err(self.fail(SyntaxError::Poisoned).into());
        }
        log::trace!("chunk of {} bytes at char {}", bytes.len(), self.pos);

        let mut decoded = std::mem::take(&mut self.decoded);
        decoded.clear();
        let result = match self.assembler.feed_into(bytes, &mut decoded) {
            Ok(()) => self.feed_str(&decoded).map_err(Error::from),
            Err(err) => {
                self.state = State::Error;
                Err(err.into())
            }
        };
        self.decoded = decoded;
        result
    }

    /// Feeds already-decoded text.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] carrying the position of the first character
    /// that violates the grammar.
    pub fn feed_str(&mut self, text: &str) -> Result<(), ParseError> {
        if self.state == State::Error {
            return Err(self.fail(SyntaxError::Poisoned));
        }

        let mut rest = text;
        while let Some(ch) = rest.chars().next() {
            if self.state == State::String {
                let run = rest
                    .find(|c: char| c == '"' || c == '\\' || c < '\u{20}')
                    .unwrap_or(rest.len());
                if run > 0 {
                    let (plain, tail) = rest.split_at(run);
                    self.buffer.push_str(plain);
                    // The run holds no newline.
                    let n = plain.chars().count();
                    self.pos += n;
                    self.column += n;
                    rest = tail;
                    continue;
                }
            }

            loop {
                match self.step(ch) {
                    Ok(Consumed) => break,
                    Ok(Reprocess) => {}
                    Err(kind) => return Err(self.fail(kind)),
                }
            }
            self.advance_char(ch);
            rest = &rest[ch.len_utf8()..];
        }
        Ok(())
    }

    /// Declares the end of input.
    ///
    /// Flushes a trailing number and checks that the document is complete.
    /// Calling it again after success does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::Encoding`] if the bytes ended inside a character, otherwise
    /// [`Error::Parse`] with [`SyntaxError::UnexpectedEndOfInput`] when the
    /// document is unfinished or empty.
    pub fn finish(&mut self) -> Result<(), Error> {
        if self.state == State::Error {
            return Err(self.fail(SyntaxError::Poisoned).into());
        }
        if let Err(err) = self.assembler.finish() {
            self.state = State::Error;
            return Err(err.into());
        }
        if matches!(
            self.state,
            State::Zero | State::Integer | State::Fraction | State::ExponentInteger
        ) {
            if let Err(kind) = self.complete_number() {
                return Err(self.fail(kind).into());
            }
        }
        if self.state != State::EndDocument {
            return Err(self.fail(SyntaxError::UnexpectedEndOfInput).into());
        }
        Ok(())
    }

    #[inline(always)]
    fn advance_char(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, ch: char) -> Result<Flow, SyntaxError> {
        use State::*;
        match self.state {
            Error => Err(SyntaxError::Poisoned),

            StartDocument => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                '{' | '[' => self.start_document(ch),
                '"' | 't' | 'f' | 'n' | '-' | '0'..='9' if self.options.allow_top_level_scalars => {
                    self.start_document(ch)
                }
                _ => Err(SyntaxError::ExpectedDocumentStart(ch)),
            },

            StartObject => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                '"' => Ok(self.start_key()),
                '}' => self.end_container(Frame::Object),
                _ => Err(SyntaxError::ExpectedKeyStart(ch)),
            },

            StartArray => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                ']' => self.end_container(Frame::Array),
                _ => self.start_value(ch),
            },

            // -------------------------- STRINGS ------------------------------
            String => match ch {
                '"' => Ok(self.end_string()),
                '\\' => {
                    self.state = StringEscape;
                    Ok(Consumed)
                }
                c if c < '\u{20}' => Err(SyntaxError::UnescapedControl(c)),
                c => {
                    self.buffer.push(c);
                    Ok(Consumed)
                }
            },

            StringEscape => {
                let unescaped = match ch {
                    '"' | '\\' | '/' => ch,
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'u' => {
                        self.escape.reset();
                        self.state = UnicodeEscape;
                        return Ok(Consumed);
                    }
                    _ => return Err(SyntaxError::InvalidEscape(ch)),
                };
                self.buffer.push(unescaped);
                self.state = String;
                Ok(Consumed)
            }

            UnicodeEscape => {
                let Some(unit) = self
                    .escape
                    .feed(ch)
                    .map_err(|()| SyntaxError::ExpectedHexDigit(ch))?
                else {
                    return Ok(Consumed);
                };
                match self.surrogate.pair(unit) {
                    Ok(Pairing::Char(c)) => {
                        self.buffer.push(c);
                        self.state = String;
                    }
                    Ok(Pairing::Staged) => self.state = SurrogateBackslash,
                    Err(PairingError::ExpectedLow) => return Err(SyntaxError::ExpectedLowSurrogate),
                    Err(PairingError::ExpectedHigh) => {
                        return Err(SyntaxError::ExpectedHighSurrogate);
                    }
                }
                Ok(Consumed)
            }

            SurrogateBackslash => match ch {
                '\\' => {
                    self.state = SurrogateU;
                    Ok(Consumed)
                }
                _ => Err(SyntaxError::ExpectedLowSurrogate),
            },

            SurrogateU => match ch {
                'u' => {
                    self.escape.reset();
                    self.state = UnicodeEscape;
                    Ok(Consumed)
                }
                _ => Err(SyntaxError::ExpectedLowSurrogate),
            },

            // -------------------------- NUMBERS ------------------------------
            Sign => match ch {
                '0' => self.push_number(ch, Zero),
                '1'..='9' => self.push_number(ch, Integer),
                _ => Err(SyntaxError::ExpectedDigit(ch)),
            },

            Zero => match ch {
                '.' => self.push_number(ch, DecimalPoint),
                'e' | 'E' => self.push_number(ch, Exponent),
                '0'..='9' => Err(SyntaxError::LeadingZero(ch)),
                _ => self.end_number(),
            },

            Integer => match ch {
                '0'..='9' => self.push_number(ch, Integer),
                '.' => self.push_number(ch, DecimalPoint),
                'e' | 'E' => self.push_number(ch, Exponent),
                _ => self.end_number(),
            },

            DecimalPoint => match ch {
                '0'..='9' => self.push_number(ch, Fraction),
                _ => Err(SyntaxError::ExpectedDigit(ch)),
            },

            Fraction => match ch {
                '0'..='9' => self.push_number(ch, Fraction),
                'e' | 'E' => self.push_number(ch, Exponent),
                _ => self.end_number(),
            },

            Exponent => match ch {
                '+' | '-' => self.push_number(ch, ExponentSign),
                '0'..='9' => self.push_number(ch, ExponentInteger),
                _ => Err(SyntaxError::ExpectedExponent(ch)),
            },

            ExponentSign => match ch {
                '0'..='9' => self.push_number(ch, ExponentInteger),
                _ => Err(SyntaxError::ExpectedDigit(ch)),
            },

            ExponentInteger => match ch {
                '0'..='9' => self.push_number(ch, ExponentInteger),
                _ => self.end_number(),
            },

            // -------------------------- LITERALS -----------------------------
            Literal => match self.literal.step(ch) {
                literal_buffer::Step::NeedMore => Ok(Consumed),
                literal_buffer::Step::Done(scalar) => {
                    self.complete_value(&scalar);
                    Ok(Consumed)
                }
                literal_buffer::Step::Reject(kind) => {
                    Err(SyntaxError::ExpectedKeyword(kind.keyword()))
                }
            },

            // -------------------------- STRUCTURE ----------------------------
            KeySeparator => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                ':' => {
                    self.state = Value;
                    Ok(Consumed)
                }
                _ => Err(SyntaxError::ExpectedColon(ch)),
            },

            Value => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                _ => self.start_value(ch),
            },

            EndValue => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                ',' => {
                    self.state = ValueSeparator;
                    Ok(Consumed)
                }
                '}' => self.end_container(Frame::Object),
                ']' => self.end_container(Frame::Array),
                _ => Err(SyntaxError::ExpectedCommaOrClose(ch)),
            },

            ValueSeparator => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                _ => match self.frames.last() {
                    Some(Frame::Object) if ch == '"' => Ok(self.start_key()),
                    Some(Frame::Object) => Err(SyntaxError::ExpectedKeyStart(ch)),
                    _ => self.start_value(ch),
                },
            },

            EndDocument => match ch {
                c if is_whitespace(c) => Ok(Consumed),
                _ => Err(SyntaxError::TrailingData(ch)),
            },
        }
    }

    fn start_document(&mut self, ch: char) -> Result<Flow, SyntaxError> {
        log::trace!("start of document at char {}", self.pos);
        self.listeners.start_document();
        self.start_value(ch)
    }

    fn start_value(&mut self, ch: char) -> Result<Flow, SyntaxError> {
        match ch {
            '{' => {
                self.frames.push(Frame::Object);
                self.listeners.start_object();
                self.state = State::StartObject;
            }
            '[' => {
                self.frames.push(Frame::Array);
                self.listeners.start_array();
                self.state = State::StartArray;
            }
            '"' => {
                self.frames.push(Frame::String);
                self.buffer.clear();
                self.state = State::String;
            }
            't' | 'f' | 'n' => {
                self.literal = ExpectedLiteralBuffer::new(ch);
                self.state = State::Literal;
            }
            '-' => {
                self.buffer.clear();
                self.buffer.push(ch);
                self.state = State::Sign;
            }
            '0' => {
                self.buffer.clear();
                self.buffer.push(ch);
                self.state = State::Zero;
            }
            '1'..='9' => {
                self.buffer.clear();
                self.buffer.push(ch);
                self.state = State::Integer;
            }
            _ => return Err(SyntaxError::ExpectedValue(ch)),
        }
        Ok(Consumed)
    }

    fn start_key(&mut self) -> Flow {
        self.frames.push(Frame::Key);
        self.buffer.clear();
        self.state = State::String;
        Consumed
    }

    fn end_string(&mut self) -> Flow {
        if self.frames.pop() == Some(Frame::Key) {
            self.listeners.key(&self.buffer);
            self.buffer.clear();
            self.state = State::KeySeparator;
        } else {
            let text = std::mem::take(&mut self.buffer);
            self.complete_value(&Scalar::String(text));
        }
        Consumed
    }

    #[inline(always)]
    fn push_number(&mut self, ch: char, next: State) -> Result<Flow, SyntaxError> {
        self.buffer.push(ch);
        self.state = next;
        Ok(Consumed)
    }

    /// The current character terminates a number; emit it, then handle the
    /// character again in the post-value state.
    fn end_number(&mut self) -> Result<Flow, SyntaxError> {
        self.complete_number()?;
        Ok(Reprocess)
    }

    fn complete_number(&mut self) -> Result<(), SyntaxError> {
        let scalar = NumberLexeme::classify(&self.buffer).into_scalar()?;
        self.buffer.clear();
        self.complete_value(&scalar);
        Ok(())
    }

    fn complete_value(&mut self, scalar: &Scalar) {
        self.listeners.value(scalar);
        self.after_value();
    }

    fn end_container(&mut self, closing: Frame) -> Result<Flow, SyntaxError> {
        match self.frames.pop() {
            Some(frame) if frame == closing => {}
            _ => return Err(SyntaxError::MismatchedClose(closing.name())),
        }
        match closing {
            Frame::Object => self.listeners.end_object(),
            _ => self.listeners.end_array(),
        }
        self.after_value();
        Ok(Consumed)
    }

    fn after_value(&mut self) {
        if self.frames.is_empty() {
            self.state = State::EndDocument;
            log::trace!("end of document at char {}", self.pos);
            self.listeners.end_document();
        } else {
            self.state = State::EndValue;
        }
    }

    fn fail(&mut self, kind: SyntaxError) -> ParseError {
        self.state = State::Error;
        let err = ParseError::new(kind, self.pos, self.line, self.column);
        log::debug!("parse error at {}:{}: {err}", self.line, self.column);

        #[cfg(any(test, feature = "fuzzing"))]
        if self.options.panic_on_error {
            panic!("{err}");
        }

        err
    }
}

impl std::fmt::Debug for StreamingParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingParser")
            .field("state", &self.state)
            .field("frames", &self.frames)
            .field("pos", &self.pos)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

/// JSON whitespace only; form feed and vertical tab are rejected.
#[inline(always)]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r')
}
