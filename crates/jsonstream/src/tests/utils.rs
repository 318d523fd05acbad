use std::{cell::RefCell, fmt::Write as _, rc::Rc};

use crate::{Error, Event, ParserOptions, Scalar, StreamingParser, Value};

/// Events recorded for one input, followed by the error that ended it.
#[derive(Debug)]
pub(crate) struct Recorded {
    pub events: Vec<Event>,
    pub error: Option<Error>,
}

/// Feeds `chunks` one after another, then calls `finish`, recording every
/// event and stopping at the first error.
pub(crate) fn record<'a>(
    options: ParserOptions,
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> Recorded {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut parser = StreamingParser::new(options);
    parser.subscribe(Rc::clone(&events));

    let mut error = None;
    for chunk in chunks {
        if let Err(err) = parser.feed(chunk) {
            error = Some(err);
            break;
        }
    }
    if error.is_none() {
        error = parser.finish().err();
    }
    drop(parser);

    Recorded {
        events: events.take(),
        error,
    }
}

/// Worst case: one byte at a time. Successful inputs are also checked
/// against a single-chunk parse.
pub(crate) fn events(json: impl AsRef<[u8]>) -> Recorded {
    events_with(ParserOptions::default(), json)
}

pub(crate) fn events_with(options: ParserOptions, json: impl AsRef<[u8]>) -> Recorded {
    let json = json.as_ref();
    let bytewise = record(options, json.chunks(1));
    if bytewise.error.is_none() {
        let whole = record(options, [json]);
        assert!(whole.error.is_none(), "{:?}", whole.error);
        assert_eq!(bytewise.events, whole.events);
    }
    bytewise
}

#[track_caller]
pub(crate) fn assert_events(json: impl AsRef<[u8]>, expected: &[Event]) {
    let rec = events(json);
    assert!(rec.error.is_none(), "unexpected error: {:?}", rec.error);
    assert_eq!(rec.events, expected);
}

#[track_caller]
pub(crate) fn assert_error(json: impl AsRef<[u8]>, before: &[Event]) {
    let rec = events(json);
    assert!(rec.error.is_some(), "expected an error after {:?}", rec.events);
    assert_eq!(rec.events, before);
}

pub(crate) fn key(k: &str) -> Event {
    Event::Key(k.to_string())
}

pub(crate) fn int(i: i64) -> Event {
    Event::Value(Scalar::Integer(i))
}

pub(crate) fn float(f: f64) -> Event {
    Event::Value(Scalar::Float(f))
}

pub(crate) fn string(s: &str) -> Event {
    Event::Value(Scalar::String(s.to_string()))
}

pub(crate) fn boolean(b: bool) -> Event {
    Event::Value(Scalar::Boolean(b))
}

pub(crate) fn null() -> Event {
    Event::Value(Scalar::Null)
}

/// Converts a `serde_json` value into ours.
pub(crate) fn from_serde(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap()), Value::Integer),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::Array(a.iter().map(from_serde).collect()),
        serde_json::Value::Object(o) => {
            Value::Object(o.iter().map(|(k, v)| (k.clone(), from_serde(v))).collect())
        }
    }
}

/// Renders `value` as JSON. With `ascii`, every non-ASCII character is
/// written as a `\u` escape, using surrogate pairs above the BMP.
pub(crate) fn render(value: &Value, ascii: bool) -> String {
    let mut out = String::new();
    write_value(value, ascii, &mut out);
    out
}

fn write_value(value: &Value, ascii: bool, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => write!(out, "{b}").unwrap(),
        Value::Integer(i) => write!(out, "{i}").unwrap(),
        Value::Float(f) => write!(out, "{f:?}").unwrap(),
        Value::String(s) => write_string(s, ascii, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, ascii, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(k, ascii, out);
                out.push_str(" : ");
                write_value(v, ascii, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, ascii: bool, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => write!(out, "\\u{:04x}", u32::from(c)).unwrap(),
            c if ascii && !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(out, "\\u{unit:04X}").unwrap();
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Iteration count for property tests.
pub(crate) fn quickcheck_tests() -> u64 {
    if cfg!(feature = "test-fast") {
        100
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}
