use crate::{error::SyntaxError, value::Scalar};

/// Lexical class of a complete number literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberLexeme<'a> {
    Integer(&'a str), // no '.' and no exponent
    Float(&'a str),   // has '.' or exponent
}

impl<'a> NumberLexeme<'a> {
    pub(crate) fn classify(text: &'a str) -> Self {
        if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            NumberLexeme::Float(text)
        } else {
            NumberLexeme::Integer(text)
        }
    }

    /// Converts the literal into a scalar.
    ///
    /// Integers that do not fit `i64` are widened to `f64`. Magnitudes beyond
    /// the `f64` range become infinities rather than errors.
    pub(crate) fn into_scalar(self) -> Result<Scalar, SyntaxError> {
        match self {
            NumberLexeme::Integer(text) => match text.parse::<i64>() {
                Ok(i) => Ok(Scalar::Integer(i)),
                Err(_) => parse_float(text),
            },
            NumberLexeme::Float(text) => parse_float(text),
        }
    }
}

fn parse_float(text: &str) -> Result<Scalar, SyntaxError> {
    text.parse::<f64>()
        .map(Scalar::Float)
        .map_err(|_| SyntaxError::InvalidNumber(text.to_string()))
}
