//! Event delivery through the public API.
#![allow(missing_docs)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use jsonstream::{Event, Handler, Listeners, ParserOptions, Scalar, StreamingParser};
use rstest::rstest;

#[test]
fn registers_listeners_up_front() {
    let events = RefCell::new(Vec::new());
    let listeners = Listeners::new()
        .on_start_document(|| events.borrow_mut().push(Event::StartDocument))
        .on_end_document(|| events.borrow_mut().push(Event::EndDocument))
        .on_start_object(|| events.borrow_mut().push(Event::StartObject))
        .on_end_object(|| events.borrow_mut().push(Event::EndObject))
        .on_key(|k| events.borrow_mut().push(Event::Key(k.to_string())))
        .on_value(|v| events.borrow_mut().push(Event::Value(v.clone())));
    let mut parser = StreamingParser::with_listeners(ParserOptions::default(), listeners);
    parser.feed(br#"{"key":12}"#).unwrap();
    drop(parser);

    assert_eq!(
        events.into_inner(),
        [
            Event::StartDocument,
            Event::StartObject,
            Event::Key("key".into()),
            Event::Value(Scalar::Integer(12)),
            Event::EndObject,
            Event::EndDocument,
        ]
    );
}

#[test]
fn every_listener_of_a_kind_fires_in_order() {
    let seen = RefCell::new(Vec::new());
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser
        .on_value(|v| seen.borrow_mut().push(format!("first {v:?}")))
        .on_value(|v| seen.borrow_mut().push(format!("second {v:?}")));
    parser.feed(b"[true]").unwrap();
    drop(parser);

    assert_eq!(
        seen.into_inner(),
        ["first Boolean(true)", "second Boolean(true)"]
    );
}

#[test]
fn listeners_fire_before_feed_returns() {
    let starts = Cell::new(0);
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.on_start_array(|| starts.set(starts.get() + 1));

    parser.feed(b"[").unwrap();
    assert_eq!(starts.get(), 1);
    parser.feed(b"[").unwrap();
    assert_eq!(starts.get(), 2);
    parser.feed(b"]]").unwrap();
    assert!(parser.is_complete());
}

#[test]
fn end_document_fires_exactly_once() {
    let ends = Cell::new(0);
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.on_end_document(|| ends.set(ends.get() + 1));
    parser.feed(b"{}  ").unwrap();
    parser.finish().unwrap();
    parser.finish().unwrap();
    drop(parser);
    assert_eq!(ends.get(), 1);
}

#[derive(Default)]
struct Depth {
    current: usize,
    deepest: usize,
    keys: usize,
}

impl Handler for Depth {
    fn start_object(&mut self) {
        self.current += 1;
        self.deepest = self.deepest.max(self.current);
    }

    fn end_object(&mut self) {
        self.current -= 1;
    }

    fn key(&mut self, _key: &str) {
        self.keys += 1;
    }
}

#[test]
fn custom_handlers_override_only_what_they_need() {
    let depth = Rc::new(RefCell::new(Depth::default()));
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.subscribe(Rc::clone(&depth));
    parser
        .feed(br#"{"a":{"b":{"c":[1,{"d":2}]}},"e":{}}"#)
        .unwrap();

    let depth = depth.borrow();
    assert_eq!(depth.current, 0);
    assert_eq!(depth.deepest, 4);
    assert_eq!(depth.keys, 5);
}

fn record<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Vec<Event> {
    let events = Rc::new(RefCell::new(Vec::<Event>::new()));
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.subscribe(Rc::clone(&events));
    for chunk in chunks {
        parser.feed(chunk).unwrap();
    }
    parser.finish().unwrap();
    events.take()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(7)]
#[case(64)]
fn fixed_size_chunks_match_single_feed(#[case] size: usize) {
    let json = "{\"greeting\": \"h\u{e9}llo \u{2603} \u{1F600}\", \"n\": [-1.5e3, 0, 42],\
                \"esc\": \"\\ud834\\udd1e\\n\"}";

    let whole = record([json.as_bytes()]);
    let split = record(json.as_bytes().chunks(size));
    assert_eq!(whole, split);
    assert!(whole.contains(&Event::Value(Scalar::String("\u{1D11E}\n".into()))));
}

#[test]
fn errors_carry_position_and_stop_events() {
    let events = Rc::new(RefCell::new(Vec::<Event>::new()));
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.subscribe(Rc::clone(&events));

    parser.feed(b"[1, 2").unwrap();
    let err = parser.feed(b",]").unwrap_err();
    assert_eq!(err.to_string(), "Expected value, found ']': char 7");
    assert_eq!(
        *events.borrow(),
        [
            Event::StartDocument,
            Event::StartArray,
            Event::Value(Scalar::Integer(1)),
            Event::Value(Scalar::Integer(2)),
        ]
    );
}

#[test]
fn encoding_errors_report_byte_offset() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(b"[\"ok\", \"").unwrap();
    let err = parser.feed(b"\xC0\xAF\"]").unwrap_err();
    let err = err.as_encoding_error().unwrap();
    assert_eq!(err.offset, 8);
}

#[test]
fn feed_str_accepts_decoded_text() {
    let keys = RefCell::new(Vec::new());
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.on_key(|k| keys.borrow_mut().push(k.to_string()));
    parser.feed_str("{\"\u{e9}t\u{e9}\": 1,").unwrap();
    parser.feed_str(" \"hiver\": 2}").unwrap();
    assert_eq!(parser.position(), 22);
    drop(parser);
    assert_eq!(keys.into_inner(), ["\u{e9}t\u{e9}", "hiver"]);
}
