//! Accumulation of `\uXXXX` escapes and UTF-16 surrogate pairing.
//!
//! [`UnicodeEscapeBuffer`] collects the four hexadecimal digits of one escape
//! and yields the UTF-16 code unit they spell. [`SurrogateSlot`] stages a high
//! surrogate until its low half arrives and combines the two.

/// Four-digit hexadecimal accumulator for a single `\u` escape.
#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    unit: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clears any accumulated digits.
    pub(crate) fn reset(&mut self) {
        self.unit = 0;
        self.len = 0;
    }

    /// Feeds one character.
    ///
    /// - `Ok(None)`: more digits are needed.
    /// - `Ok(Some(unit))`: the fourth digit arrived and the buffer has reset.
    /// - `Err(())`: `c` is not a hexadecimal digit.
    pub(crate) fn feed(&mut self, c: char) -> Result<Option<u16>, ()> {
        let digit = c.to_digit(16).ok_or(())?;
        // `digit < 16`, so the cast is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let digit = digit as u16;
        self.unit = (self.unit << 4) | digit;
        self.len += 1;

        if self.len == 4 {
            let unit = self.unit;
            self.reset();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}

/// What a decoded code unit means once surrogate pairing is applied.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Pairing {
    /// A complete character.
    Char(char),
    /// A high surrogate is now staged; its low half must follow.
    Staged,
}

/// Why a code unit could not be paired.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PairingError {
    /// A high surrogate is staged but the unit is not a low surrogate.
    ExpectedLow,
    /// A low surrogate arrived with nothing staged.
    ExpectedHigh,
}

/// Holds at most one high surrogate awaiting its low half.
#[derive(Debug, Default)]
pub(crate) struct SurrogateSlot(Option<u16>);

impl SurrogateSlot {
    /// Applies one UTF-16 code unit decoded from a `\u` escape.
    pub(crate) fn pair(&mut self, unit: u16) -> Result<Pairing, PairingError> {
        match (self.0, unit) {
            (Some(_), 0xD800..=0xDBFF) => Err(PairingError::ExpectedLow),
            (None, 0xD800..=0xDBFF) => {
                self.0 = Some(unit);
                Ok(Pairing::Staged)
            }
            (Some(high), 0xDC00..=0xDFFF) => {
                self.0 = None;
                let code = (u32::from(high) - 0xD800) * 0x400 + (u32::from(unit) - 0xDC00) + 0x1_0000;
                char::from_u32(code)
                    .map(Pairing::Char)
                    .ok_or(PairingError::ExpectedLow)
            }
            (None, 0xDC00..=0xDFFF) => Err(PairingError::ExpectedHigh),
            (Some(_), _) => Err(PairingError::ExpectedLow),
            (None, _) => char::from_u32(u32::from(unit))
                .map(Pairing::Char)
                .ok_or(PairingError::ExpectedHigh),
        }
    }
}
