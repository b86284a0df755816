//! Source ranges: the value type the whole engine keys node identity off.
//!
//! Rewrites allocate fresh parse trees (we re-parse from edited text), so
//! pointer identity of post-rewrite nodes never matches the pre-rewrite
//! tree. A [`SourceRange`] is preserved across a rewrite as long as the
//! text on either side of it doesn't move, which is true for every node
//! that isn't itself the one being removed or replaced.

use std::fmt;

/// A pair of absolute byte offsets into a source buffer, identifying a
/// syntactic region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    /// The distinguished "absent" value. Comparisons against it always use
    /// `==`/`!=`, never ordering, matching the original `SourceRange::NoLocation`.
    pub const NO_LOCATION: SourceRange = SourceRange {
        start: usize::MAX,
        end: usize::MAX,
    };

    pub fn new(start: usize, end: usize) -> Self {
        SourceRange { start, end }
    }

    pub fn is_no_location(self) -> bool {
        self == Self::NO_LOCATION
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Number of lines spanned by this range's text, counted the same way
    /// the original does (`count('\n') + 1`).
    pub fn line_count(self, source: &str) -> u32 {
        if self.is_no_location() || self.start >= self.end {
            return 0;
        }
        let text = &source[self.start..self.end];
        text.bytes().filter(|&b| b == b'\n').count() as u32 + 1
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_location() {
            write!(f, "<no-location>")
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_location_is_distinguished() {
        assert!(SourceRange::NO_LOCATION.is_no_location());
        assert_ne!(SourceRange::new(0, 1), SourceRange::NO_LOCATION);
    }

    #[test]
    fn line_count_counts_newlines_plus_one() {
        let source = "a\nbb\nccc";
        let whole = SourceRange::new(0, source.len());
        assert_eq!(whole.line_count(source), 3);

        let single_line = SourceRange::new(0, 1);
        assert_eq!(single_line.line_count(source), 1);
    }

    #[test]
    fn no_location_has_zero_lines() {
        assert_eq!(SourceRange::NO_LOCATION.line_count("whatever"), 0);
    }
}
