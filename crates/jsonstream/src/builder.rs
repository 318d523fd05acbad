//! Assembly of a [`Value`] tree from the event stream.
use std::{cell::RefCell, rc::Rc};

use crate::{
    event::Handler,
    parser::StreamingParser,
    value::{Map, Scalar, Value},
};

/// Builds an in-memory [`Value`] from parser events.
///
/// The result becomes available once `end_document` fires.
///
/// # Examples
///
/// ```
/// use jsonstream::{Builder, ParserOptions, StreamingParser, Value};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// let builder = Builder::attach(&mut parser);
/// parser.feed(br#"{"a": [1, 2.5]"#).unwrap();
/// assert!(builder.borrow().result().is_none());
///
/// parser.feed(b"}").unwrap();
/// let value = builder.borrow_mut().take_result().unwrap();
/// assert_eq!(value.get("a").and_then(Value::as_array).map(Vec::len), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    /// Open containers, each with the key it will be stored under.
    stack: Vec<(Option<String>, Value)>,
    /// Key awaiting its value.
    key: Option<String>,
    /// The outermost value, once it has closed.
    root: Option<Value>,
    complete: bool,
}

impl Builder {
    /// Creates an empty builder; see [`Builder::attach`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder and subscribes it to `parser`.
    pub fn attach(parser: &mut StreamingParser<'_>) -> Rc<RefCell<Self>> {
        let builder = Rc::new(RefCell::new(Self::new()));
        parser.subscribe(Rc::clone(&builder));
        builder
    }

    /// The completed document, or `None` before `end_document`.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        if self.complete { self.root.as_ref() } else { None }
    }

    /// Moves the completed document out of the builder.
    pub fn take_result(&mut self) -> Option<Value> {
        if self.complete { self.root.take() } else { None }
    }

    fn insert(&mut self, key: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some((_, Value::Object(map))) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Some((_, Value::Array(items))) => items.push(value),
            _ => self.root = Some(value),
        }
    }

    fn close(&mut self) {
        if let Some((key, value)) = self.stack.pop() {
            self.insert(key, value);
        }
    }
}

impl Handler for Builder {
    fn start_document(&mut self) {
        self.stack.clear();
        self.key = None;
        self.root = None;
        self.complete = false;
    }

    fn end_document(&mut self) {
        self.complete = true;
    }

    fn start_object(&mut self) {
        let key = self.key.take();
        self.stack.push((key, Value::Object(Map::new())));
    }

    fn end_object(&mut self) {
        self.close();
    }

    fn start_array(&mut self) {
        let key = self.key.take();
        self.stack.push((key, Value::Array(Vec::new())));
    }

    fn end_array(&mut self) {
        self.close();
    }

    fn key(&mut self, key: &str) {
        self.key = Some(key.to_string());
    }

    fn value(&mut self, value: &Scalar) {
        let key = self.key.take();
        self.insert(key, value.clone().into());
    }
}
