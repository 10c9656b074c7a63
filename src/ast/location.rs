//! Position tracking for template diagnostics
//!
//! The grammar runs over `char` input, so every span it reports is a range of
//! character offsets (not bytes). Before any node is built, [`SourceLocation`]
//! pre-computes where each line starts so an offset can be turned into a
//! line/column pair with a binary search:
//!
//! ```text
//! Source: "ab\n#{x}"
//!          012 3456
//!
//! line_starts = [0, 3]
//! position_at(4) -> line index 1, column 4 - 3 = 1
//!                -> Position { offset: 4, line: 2, column: 2 }
//! ```
//!
//! Lines and columns are 1-based; the offset is 0-based. Positions are purely
//! informational: AST equality never looks at them.

use serde::Serialize;
use std::fmt;

/// A point in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 1, 1)
    }
}

/// Converts character offsets into line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Character offsets where each line starts
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;

        for (offset, ch) in source.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
            len = offset + 1;
        }

        Self { line_starts, len }
    }

    /// Convert a character offset to a position.
    ///
    /// Offsets past the end clamp to the end of the source, which is where
    /// chumsky reports "unexpected end of input".
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        Position::new(offset, line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the source in characters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
