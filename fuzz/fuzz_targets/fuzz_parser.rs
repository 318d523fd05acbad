#![no_main]
use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use jsonstream::{Event, ParserOptions, StreamingParser};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

// JSON whitespace, plus a few characters the grammar must reject.
static WS_TABLE: &[&[u8]] = &[
    b" ",
    b"\t",
    b"\n",
    b"\r",
    b" ",
    b"\n",
    b"\x0C",
    b"\x0B",
    "\u{00A0}".as_bytes(),
    "\u{2028}".as_bytes(),
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x03);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        let limit = max_size - prefix;
        prefix += append_whitespace(&mut data[prefix..], limit);
        let limit = max_size - prefix;
        prefix += append_value(&mut data[prefix..], size, limit);
        let limit = max_size - prefix;
        prefix += append_whitespace(&mut data[prefix..], limit);
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }

        let n = rng.random_range(0..=limit.min(4));
        let mut written = 0;
        for _ in 0..n {
            // Mostly legal whitespace.
            let w = if rng.random_ratio(1, 16) {
                WS_TABLE[rng.random_range(6..WS_TABLE.len())]
            } else {
                WS_TABLE[rng.random_range(0..6)]
            };
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..=size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");

    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);

    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(22)?;
        let value = match node_type {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::Number(u.arbitrary::<i64>()?.into()),
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=21 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Runs `chunks` through a fresh parser, returning the events and whether
/// the whole input was accepted.
fn run(options: ParserOptions, chunks: &[&[u8]]) -> (Vec<Event>, bool) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut parser = StreamingParser::new(options);
    parser.subscribe(Rc::clone(&events));

    let mut ok = chunks.iter().all(|chunk| parser.feed(chunk).is_ok());
    ok = ok && parser.finish().is_ok();
    drop(parser);

    (events.take(), ok)
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as usize;
    let data = &data[HEADER..];

    let options = ParserOptions {
        allow_top_level_scalars: flags & 1 != 0,
        panic_on_error: false,
    };

    let (whole_events, whole_ok) = run(options, &[data]);
    let chunks = split_into_chunks(data, split_seed);
    let (split_events, split_ok) = run(options, &chunks);

    assert_eq!(whole_ok, split_ok, "chunking changed the outcome");
    if whole_ok {
        assert_eq!(whole_events, split_events, "chunking changed the events");
    }

    if let Ok(oracle) = serde_json::from_slice::<Value>(data) {
        if options.allow_top_level_scalars || oracle.is_object() || oracle.is_array() {
            assert!(whole_ok, "rejected a document serde_json accepts");
        }
    }
}

fuzz_target!(|data: &[u8]| parser(data));

/// Split `bytes` into chunks derived from `split_seed`. Boundaries may land
/// inside a multi-byte character.
fn split_into_chunks(bytes: &[u8], split_seed: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut seed = split_seed;

    while start < bytes.len() {
        let remaining = bytes.len() - start;
        let size = (seed % remaining) + 1;
        chunks.push(&bytes[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ size;
    }

    chunks
}
