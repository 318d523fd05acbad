//! One-shot parsing into `Value`.
#![allow(missing_docs)]

use std::io::Cursor;

use jsonstream::{
    BUF_SIZE, Error, Map, ParserOptions, SyntaxError, Value, parse, parse_reader, parse_slice,
    parse_with,
};
use rstest::rstest;

#[test]
fn parses_a_json_text() {
    assert_eq!(
        parse("[1,2,3]").unwrap(),
        Value::Array(vec![1.into(), 2.into(), 3.into()])
    );
}

#[test]
fn parses_value_list() {
    assert_eq!(
        parse(r#"[1,2, null, 12.1,"test"]"#).unwrap(),
        Value::Array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Null,
            Value::Float(12.1),
            Value::String("test".into()),
        ])
    );
}

#[test]
fn objects_preserve_key_order() {
    let value = parse(r#"{"z": 1, "a": {"m": [true, false]}, "k": null}"#).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["z", "a", "k"]);

    let mut inner = Map::new();
    inner.insert(
        "m".to_string(),
        Value::Array(vec![Value::Boolean(true), Value::Boolean(false)]),
    );
    assert_eq!(value.get("a"), Some(&Value::Object(inner)));
}

#[test]
fn reads_in_blocks() {
    let mut text = String::from("{\"items\": [");
    let mut n = 0;
    while text.len() < BUF_SIZE * 3 {
        if n > 0 {
            text.push(',');
        }
        text.push_str(&format!("{{\"id\": {n}, \"name\": \"caf\u{e9} {n}\"}}"));
        n += 1;
    }
    text.push_str("]}");

    let value = parse_reader(Cursor::new(text.into_bytes())).unwrap();
    let items = value.get("items").and_then(Value::as_array).unwrap();
    assert_eq!(items.len(), n);
    assert_eq!(items[n - 1].get("id"), Some(&Value::Integer(i64::try_from(n - 1).unwrap())));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn rejects_empty_input(#[case] json: &str) {
    let err = parse(json).unwrap_err();
    assert_eq!(
        err.as_parse_error().map(|e| e.kind()),
        Some(&SyntaxError::UnexpectedEndOfInput)
    );
}

#[rstest]
#[case("[1, 2")]
#[case("{\"a\": ")]
#[case("[1] [2]")]
#[case("true")]
fn rejects_incomplete_or_trailing_input(#[case] json: &str) {
    assert!(matches!(parse(json), Err(Error::Parse(_))));
}

#[test]
fn rejects_invalid_utf8() {
    let err = parse_slice(b"[\"\xFF\"]").unwrap_err();
    assert!(matches!(err, Error::Encoding(_)), "{err:?}");
}

#[test]
fn scalars_need_the_option() {
    let options = ParserOptions {
        allow_top_level_scalars: true,
        ..Default::default()
    };
    assert_eq!(parse_with(&b" 12.5 "[..], options).unwrap(), Value::Float(12.5));
    assert_eq!(parse_with(&b"-7"[..], options).unwrap(), Value::Integer(-7));
    assert_eq!(
        parse_with(&b"\"x\""[..], options).unwrap(),
        Value::String("x".into())
    );
    assert!(parse("12").is_err());
}
