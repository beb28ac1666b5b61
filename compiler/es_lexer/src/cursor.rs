//! Character cursor over the source with position tracking.

use std::sync::Arc;

use es_ir::Position;

pub(crate) struct Cursor<'a> {
    source: &'a str,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str, file: Option<Arc<str>>) -> Self {
        Cursor {
            source,
            position: Position::start_of(file),
        }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.source[self.position.index..]
    }

    pub(crate) fn position(&self) -> Position {
        self.position.clone()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// The next `count` characters, if that many remain.
    pub(crate) fn peek_chars(&self, count: usize) -> Option<&'a str> {
        let rest = self.rest();
        let mut ends = rest.char_indices().map(|(i, ch)| i + ch.len_utf8());
        let end = ends.nth(count.checked_sub(1)?)?;
        Some(&rest[..end])
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position.advance(ch);
        Some(ch)
    }

    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.position.index;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        &self.source[start..self.position.index]
    }

    /// Skip to the next newline (left unconsumed) or the end of input.
    pub(crate) fn skip_line(&mut self) {
        let rest = self.rest().as_bytes();
        let len = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
        self.skip_bytes(len);
    }

    /// Skip past the next `*/`, or to the end of input if there is none.
    pub(crate) fn skip_block_comment(&mut self) {
        let rest = self.rest().as_bytes();
        let len = memchr::memmem::find(rest, b"*/").map_or(rest.len(), |end| end + 2);
        self.skip_bytes(len);
    }

    /// Advance `len` bytes, which must end on a character boundary.
    fn skip_bytes(&mut self, len: usize) {
        let skipped = &self.rest()[..len];
        let newlines = memchr::memchr_iter(b'\n', skipped.as_bytes()).count();
        if newlines == 0 {
            self.position.column += skipped.chars().count() as u32;
        } else {
            let last_line = skipped.rsplit('\n').next().unwrap_or("");
            self.position.line += newlines as u32;
            self.position.column = last_line.chars().count() as u32;
        }
        self.position.index += len;
    }
}
