use crate::value::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpectedLiteralValue {
    Null,
    True,
    False,
}

impl ExpectedLiteralValue {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
        }
    }
}

/// What happened after feeding one more character into the literal matcher?
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// Character matched, but the literal is not finished yet.
    NeedMore,
    /// Character matched *and* it was the last byte of the literal.
    Done(Scalar),
    /// Character did **not** match the expected byte.
    Reject(ExpectedLiteralValue),
}

/// `None`  ➜  we are **not** in the middle of a literal
/// `Some`  ➜  `(remaining_bytes, literal_kind)` while matching
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], ExpectedLiteralValue)>);

impl ExpectedLiteralBuffer {
    /// No literal is in flight
    pub(crate) fn none() -> Self {
        ExpectedLiteralBuffer(None)
    }

    /// Start matching after the *first* character (`n`, `t`, or `f`)
    pub(crate) fn new(first: char) -> Self {
        match first {
            'n' => ExpectedLiteralBuffer(Some((b"ull", ExpectedLiteralValue::Null))),
            't' => ExpectedLiteralBuffer(Some((b"rue", ExpectedLiteralValue::True))),
            'f' => ExpectedLiteralBuffer(Some((b"alse", ExpectedLiteralValue::False))),
            _ => ExpectedLiteralBuffer::none(),
        }
    }

    /// Give the matcher the next input character and learn what to do next.
    pub(crate) fn step(&mut self, c: char) -> Step {
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject(ExpectedLiteralValue::Null);
        };

        match bytes.split_first() {
            Some((&b, rest)) if char::from(b) == c => {
                if rest.is_empty() {
                    Step::Done(match kind {
                        ExpectedLiteralValue::Null => Scalar::Null,
                        ExpectedLiteralValue::True => Scalar::Boolean(true),
                        ExpectedLiteralValue::False => Scalar::Boolean(false),
                    })
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, kind));
                Step::Reject(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(literal: &str) -> Step {
        let mut chars = literal.chars();
        let mut buf = ExpectedLiteralBuffer::new(chars.next().unwrap());
        let mut last = Step::NeedMore;
        for c in chars {
            last = buf.step(c);
            if !matches!(last, Step::NeedMore) {
                break;
            }
        }
        last
    }

    #[test]
    fn matches_keywords() {
        assert_eq!(run("true"), Step::Done(Scalar::Boolean(true)));
        assert_eq!(run("false"), Step::Done(Scalar::Boolean(false)));
        assert_eq!(run("null"), Step::Done(Scalar::Null));
    }

    #[test]
    fn rejects_mismatch_at_any_position() {
        assert_eq!(run("tru!"), Step::Reject(ExpectedLiteralValue::True));
        assert_eq!(run("fals1"), Step::Reject(ExpectedLiteralValue::False));
        assert_eq!(run("nul,"), Step::Reject(ExpectedLiteralValue::Null));
        assert_eq!(run("tx"), Step::Reject(ExpectedLiteralValue::True));
    }

    #[test]
    fn partial_keyword_needs_more() {
        assert_eq!(run("fal"), Step::NeedMore);
    }
}
