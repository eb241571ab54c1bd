//! Character-offset spans into an expression
//!
//! Offsets count `char`s, not bytes, so they line up with the positions
//! reported in diagnostics even for non-ASCII input.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of character offsets `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span::new(2, 7);
        assert_eq!(span.to_string(), "2..7");
        assert_eq!(Span::default(), Span::new(0, 0));
    }
}
