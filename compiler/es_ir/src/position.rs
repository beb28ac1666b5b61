//! Source positions.

use std::fmt;
use std::sync::Arc;

/// A location in a source file.
///
/// `line` and `column` are zero-based; [`Display`](fmt::Display) renders them one-based
/// as `file:line:column`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Byte offset from the start of the source.
    pub index: usize,
    pub line: u32,
    pub column: u32,
    pub file: Option<Arc<str>>,
}

impl Position {
    /// Sentinel for synthetic nodes and errors raised outside any source.
    pub const UNKNOWN: Position = Position {
        index: usize::MAX,
        line: 0,
        column: 0,
        file: None,
    };

    pub fn new(index: usize, line: u32, column: u32, file: Option<Arc<str>>) -> Self {
        Position {
            index,
            line,
            column,
            file,
        }
    }

    /// Position of the first character of `file`.
    pub fn start_of(file: Option<Arc<str>>) -> Self {
        Position::new(0, 0, 0, file)
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.index == usize::MAX
    }

    /// Step over `ch`, which must be the character at this position.
    pub fn advance(&mut self, ch: char) {
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    pub fn file_name(&self) -> &str {
        self.file.as_deref().unwrap_or("<anonymous>")
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::UNKNOWN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("<unknown>");
        }
        write!(f, "{}:{}:{}", self.file_name(), self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests;
