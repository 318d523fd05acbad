//! Structural events and the listener registry that receives them.
//!
//! The parser reports eight kinds of event. Callers subscribe either with
//! individual closures per kind, or with a [`Handler`] implementation that
//! receives all of them.
//!
//! # Examples
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use jsonstream::{Event, ParserOptions, Scalar, StreamingParser};
//!
//! let events = Rc::new(RefCell::new(Vec::<Event>::new()));
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.subscribe(Rc::clone(&events));
//! parser.feed(br#"{"key":12}"#).unwrap();
//!
//! assert_eq!(
//!     *events.borrow(),
//!     vec![
//!         Event::StartDocument,
//!         Event::StartObject,
//!         Event::Key("key".to_string()),
//!         Event::Value(Scalar::Integer(12)),
//!         Event::EndObject,
//!         Event::EndDocument,
//!     ]
//! );
//! ```
use std::{cell::RefCell, fmt, rc::Rc};

use crate::value::Scalar;

/// An owned copy of one structural event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(String),
    Value(Scalar),
}

/// Receives every structural event of a parse.
///
/// All methods default to doing nothing, so implementors override only the
/// events they care about.
pub trait Handler {
    fn start_document(&mut self) {}
    fn end_document(&mut self) {}
    fn start_object(&mut self) {}
    fn end_object(&mut self) {}
    fn start_array(&mut self) {}
    fn end_array(&mut self) {}
    fn key(&mut self, _key: &str) {}
    fn value(&mut self, _value: &Scalar) {}
}

/// Records events in the order they fire.
impl Handler for Vec<Event> {
    fn start_document(&mut self) {
        self.push(Event::StartDocument);
    }

    fn end_document(&mut self) {
        self.push(Event::EndDocument);
    }

    fn start_object(&mut self) {
        self.push(Event::StartObject);
    }

    fn end_object(&mut self) {
        self.push(Event::EndObject);
    }

    fn start_array(&mut self) {
        self.push(Event::StartArray);
    }

    fn end_array(&mut self) {
        self.push(Event::EndArray);
    }

    fn key(&mut self, key: &str) {
        self.push(Event::Key(key.to_string()));
    }

    fn value(&mut self, value: &Scalar) {
        self.push(Event::Value(value.clone()));
    }
}

type Callback<'l> = Box<dyn FnMut() + 'l>;
type KeyCallback<'l> = Box<dyn FnMut(&str) + 'l>;
type ValueCallback<'l> = Box<dyn FnMut(&Scalar) + 'l>;

/// Callbacks registered per event kind.
///
/// Several callbacks may be registered for the same kind; they fire in
/// registration order.
///
/// ```
/// use jsonstream::{Listeners, ParserOptions, StreamingParser};
///
/// let mut keys = Vec::new();
/// let listeners = Listeners::new().on_key(|k| keys.push(k.to_string()));
/// let mut parser = StreamingParser::with_listeners(ParserOptions::default(), listeners);
/// parser.feed(br#"{"a":1,"b":2}"#).unwrap();
/// drop(parser);
/// assert_eq!(keys, ["a", "b"]);
/// ```
#[derive(Default)]
pub struct Listeners<'l> {
    start_document: Vec<Callback<'l>>,
    end_document: Vec<Callback<'l>>,
    start_object: Vec<Callback<'l>>,
    end_object: Vec<Callback<'l>>,
    start_array: Vec<Callback<'l>>,
    end_array: Vec<Callback<'l>>,
    key: Vec<KeyCallback<'l>>,
    value: Vec<ValueCallback<'l>>,
}

macro_rules! unit_events {
    ($($event:ident => $on:ident, $add:ident;)*) => {
        impl<'l> Listeners<'l> {
            $(
                #[doc = concat!("Registers a callback for the `", stringify!($event), "` event.")]
                #[must_use]
                pub fn $on(mut self, f: impl FnMut() + 'l) -> Self {
                    self.$add(f);
                    self
                }

                pub(crate) fn $add(&mut self, f: impl FnMut() + 'l) {
                    self.$event.push(Box::new(f));
                }
            )*
        }

        impl Listeners<'_> {
            $(
                pub(crate) fn $event(&mut self) {
                    for f in &mut self.$event {
                        f();
                    }
                }
            )*
        }
    };
}

unit_events! {
    start_document => on_start_document, add_start_document;
    end_document => on_end_document, add_end_document;
    start_object => on_start_object, add_start_object;
    end_object => on_end_object, add_end_object;
    start_array => on_start_array, add_start_array;
    end_array => on_end_array, add_end_array;
}

impl<'l> Listeners<'l> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for the `key` event.
    #[must_use]
    pub fn on_key(mut self, f: impl FnMut(&str) + 'l) -> Self {
        self.add_key(f);
        self
    }

    /// Registers a callback for the `value` event.
    #[must_use]
    pub fn on_value(mut self, f: impl FnMut(&Scalar) + 'l) -> Self {
        self.add_value(f);
        self
    }

    /// Registers `handler` for all eight event kinds.
    #[must_use]
    pub fn with_handler<H: Handler + 'l>(mut self, handler: Rc<RefCell<H>>) -> Self {
        self.subscribe(handler);
        self
    }

    pub(crate) fn add_key(&mut self, f: impl FnMut(&str) + 'l) {
        self.key.push(Box::new(f));
    }

    pub(crate) fn add_value(&mut self, f: impl FnMut(&Scalar) + 'l) {
        self.value.push(Box::new(f));
    }

    pub(crate) fn subscribe<H: Handler + 'l>(&mut self, handler: Rc<RefCell<H>>) {
        let h = Rc::clone(&handler);
        self.add_start_document(move || h.borrow_mut().start_document());
        let h = Rc::clone(&handler);
        self.add_end_document(move || h.borrow_mut().end_document());
        let h = Rc::clone(&handler);
        self.add_start_object(move || h.borrow_mut().start_object());
        let h = Rc::clone(&handler);
        self.add_end_object(move || h.borrow_mut().end_object());
        let h = Rc::clone(&handler);
        self.add_start_array(move || h.borrow_mut().start_array());
        let h = Rc::clone(&handler);
        self.add_end_array(move || h.borrow_mut().end_array());
        let h = Rc::clone(&handler);
        self.add_key(move |k| h.borrow_mut().key(k));
        self.add_value(move |v| handler.borrow_mut().value(v));
    }

    pub(crate) fn key(&mut self, key: &str) {
        for f in &mut self.key {
            f(key);
        }
    }

    pub(crate) fn value(&mut self, value: &Scalar) {
        for f in &mut self.value {
            f(value);
        }
    }
}

impl fmt::Debug for Listeners<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("start_document", &self.start_document.len())
            .field("end_document", &self.end_document.len())
            .field("start_object", &self.start_object.len())
            .field("end_object", &self.end_object.len())
            .field("start_array", &self.start_array.len())
            .field("end_array", &self.end_array.len())
            .field("key", &self.key.len())
            .field("value", &self.value.len())
            .finish()
    }
}
