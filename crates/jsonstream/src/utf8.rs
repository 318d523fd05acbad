//! Incremental UTF-8 assembly of raw byte chunks.
//!
//! [`Utf8Assembler`] accepts bytes split at arbitrary boundaries and hands
//! back only whole characters. At most one partial multi-byte sequence is
//! carried between calls.
//!
//! Lead bytes select the sequence length:
//!
//! | lead byte     | length |
//! |---------------|--------|
//! | `0x00..=0x7F` | 1      |
//! | `0xC2..=0xDF` | 2      |
//! | `0xE0..=0xEF` | 3      |
//! | `0xF0..=0xF4` | 4      |
//!
//! `0xC0`/`0xC1` can only start overlong forms and `0xF5..=0xFF` only
//! codepoints above U+10FFFF, so both are rejected on sight. The remaining
//! overlong, surrogate and out-of-range forms are caught once the sequence
//! is complete.
use bstr::BString;

use crate::error::{EncodingError, InvalidSequence};

#[derive(Debug, Default)]
/// Streaming UTF-8 decoder that buffers a truncated trailing character.
///
/// # Examples
///
/// ```
/// use jsonstream::Utf8Assembler;
///
/// let mut utf8 = Utf8Assembler::new();
/// assert_eq!(utf8.feed(b"caf\xC3").unwrap(), "caf");
/// assert!(!utf8.is_empty());
/// assert_eq!(utf8.feed(b"\xA9").unwrap(), "é");
/// assert!(utf8.is_empty());
/// ```
pub struct Utf8Assembler {
    pending: [u8; 4],
    len: u8,
    need: u8,
    /// Stream offset of the next byte to be fed.
    offset: usize,
    poisoned: bool,
}

impl Utf8Assembler {
    /// Creates an assembler with no pending bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes`, returning every character completed by this chunk.
    ///
    /// A trailing incomplete character is kept for the next call.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] on a malformed lead or continuation byte,
    /// an overlong form, a UTF-8-encoded surrogate, or a codepoint above
    /// U+10FFFF. The assembler refuses all input after an error.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<String, EncodingError> {
        let mut out = String::with_capacity(bytes.len());
        self.feed_into(bytes, &mut out)?;
        Ok(out)
    }

    /// Same as [`feed`](Self::feed), appending into a caller-owned buffer.
    pub(crate) fn feed_into(&mut self, bytes: &[u8], out: &mut String) -> Result<(), EncodingError> {
        if self.poisoned {
            return Err(EncodingError::new(InvalidSequence::Poisoned, self.offset));
        }
        match self.decode(bytes, out) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.poisoned = true;
                log::debug!("rejected UTF-8 input: {err}");
                Err(err)
            }
        }
    }

    fn decode(&mut self, bytes: &[u8], out: &mut String) -> Result<(), EncodingError> {
        let mut rest = bytes;
        while let Some((&b, tail)) = rest.split_first() {
            if self.need == 0 {
                // Fast-path: copy a run of ASCII in one go.
                let run = rest.iter().take_while(|b| b.is_ascii()).count();
                if run > 0 {
                    let (ascii, tail) = rest.split_at(run);
                    // ASCII bytes are always valid UTF-8.
                    out.extend(ascii.iter().map(|&b| char::from(b)));
                    self.offset += run;
                    rest = tail;
                    continue;
                }
                self.need = match b {
                    0xC2..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF4 => 4,
                    _ => {
                        return Err(EncodingError::new(
                            InvalidSequence::ExpectedStart(b),
                            self.offset,
                        ));
                    }
                };
                self.pending[0] = b;
                self.len = 1;
            } else {
                if !is_continuation(b) {
                    return Err(EncodingError::new(
                        InvalidSequence::ExpectedContinuation(b),
                        self.offset,
                    ));
                }
                self.pending[self.len as usize] = b;
                self.len += 1;
                if self.len == self.need {
                    let ch = self.assemble()?;
                    out.push(ch);
                }
            }
            self.offset += 1;
            rest = tail;
        }
        Ok(())
    }

    /// Decodes the complete sequence held in `pending` and resets it.
    fn assemble(&mut self) -> Result<char, EncodingError> {
        let len = usize::from(self.len);
        let bytes = &self.pending[..len];
        let start = self.offset + 1 - len;

        let payload = bytes[1..]
            .iter()
            .fold(u32::from(bytes[0]) & lead_mask(len), |acc, b| {
                (acc << 6) | (u32::from(*b) & 0x3F)
            });

        let min = match len {
            2 => 0x80,
            3 => 0x800,
            _ => 0x1_0000,
        };
        let rejected = if payload < min {
            Some(InvalidSequence::Overlong(BString::from(bytes)))
        } else if (0xD800..=0xDFFF).contains(&payload) {
            Some(InvalidSequence::Surrogate(payload))
        } else if payload > 0x10_FFFF {
            Some(InvalidSequence::OutOfRange(payload))
        } else {
            None
        };
        if let Some(source) = rejected {
            return Err(EncodingError::new(source, start));
        }

        self.len = 0;
        self.need = 0;
        char::from_u32(payload)
            .ok_or_else(|| EncodingError::new(InvalidSequence::OutOfRange(payload), start))
    }

    /// Returns `true` when no partial character is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes of the partial character carried to the next call.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending[..usize::from(self.len)]
    }

    /// Total number of bytes accepted so far.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declares the end of the byte stream.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] when the stream ended in the middle of a
    /// multi-byte character.
    pub fn finish(&mut self) -> Result<(), EncodingError> {
        if self.poisoned {
            return Err(EncodingError::new(InvalidSequence::Poisoned, self.offset));
        }
        if self.is_empty() {
            return Ok(());
        }
        self.poisoned = true;
        let start = self.offset - usize::from(self.len);
        Err(EncodingError::new(
            InvalidSequence::Truncated(BString::from(self.pending())),
            start,
        ))
    }
}

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

#[inline]
fn lead_mask(len: usize) -> u32 {
    match len {
        2 => 0x1F,
        3 => 0x0F,
        _ => 0x07,
    }
}
