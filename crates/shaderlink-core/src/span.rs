//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where statements, expressions and errors occur
//! in the module they were parsed from.

use std::fmt;

use crate::SourceId;

/// A span of source code, represented by its starting position.
///
/// The owning module is recorded as a [`SourceId`]; the bundle maps it back to
/// a path when rendering diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Module the span belongs to.
    pub source: SourceId,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length in the default source.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self {
            source: SourceId::default(),
            line,
            col,
            len,
        }
    }

    /// The same position attributed to another source.
    #[inline]
    pub fn in_source(self, source: SourceId) -> Self {
        Self { source, ..self }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_span_uses_default_source() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.source, SourceId::default());
        assert_eq!((span.line, span.col, span.len), (1, 5, 10));
    }

    #[test]
    fn span_display_omits_source() {
        let span = Span::new(3, 15, 5).in_source(SourceId::new(2));
        assert_eq!(format!("{}", span), "3:15");
        assert_eq!(format!("{:?}", span), "src_2:3:15");
    }
}
