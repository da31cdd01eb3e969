//! Source spans.

use serde::{Deserialize, Serialize};

/// Byte span and location of a node in the original source text.
///
/// Offsets are 0-indexed byte positions; `line` is 1-indexed and `col` is
/// 0-indexed, matching the upstream parser contract. A parser that tracks no
/// positions may leave the default in place: offsets degrade to `0`, the
/// location degrades to line 1, column 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first byte of the node.
    pub start: usize,
    /// Byte offset one past the last byte of the node.
    pub end: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed).
    pub col: u32,
}

impl Default for Span {
    fn default() -> Self {
        Span {
            start: 0,
            end: 0,
            line: 1,
            col: 0,
        }
    }
}

impl Span {
    /// Create a span from byte offsets, with the default location.
    pub fn new(start: usize, end: usize) -> Self {
        Span {
            start,
            end,
            ..Span::default()
        }
    }

    /// Create a span with full position information.
    pub fn with_location(start: usize, end: usize, line: u32, col: u32) -> Self {
        Span {
            start,
            end,
            line,
            col,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
