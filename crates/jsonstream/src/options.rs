/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ```rust
/// use jsonstream::{ParserOptions, StreamingParser};
///
/// let options = ParserOptions {
///     allow_top_level_scalars: true,
///     ..Default::default()
/// };
/// let mut parser = StreamingParser::new(options);
/// parser.feed(b"42").unwrap();
/// parser.finish().unwrap();
/// assert!(parser.is_complete());
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Whether a document may consist of a single scalar (`null`, `true`,
    /// `false`, a number or a string) instead of an object or array.
    ///
    /// Strings and keywords end on their last character. A number at the top
    /// level has no closing delimiter, so it completes on the first
    /// whitespace character after it or when
    /// [`finish`](crate::StreamingParser::finish) is called.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_top_level_scalars: bool,

    /// Panic with a backtrace at the point a grammar error is detected.
    ///
    /// # Default
    ///
    /// `false`
    #[cfg(any(test, feature = "fuzzing"))]
    pub panic_on_error: bool,
}
