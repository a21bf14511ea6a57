//! The line reader: a restartable cursor over the logical lines of a
//! document.
//!
//! Lines keep their terminators; splitting is the only transformation
//! performed here. Tab expansion and indentation accounting belong to the
//! block matchers.

/// A saved cursor position, returned by [`Lines::anchor`] and consumed by
/// [`Lines::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor(usize);

/// A cursor over the lines of the input.
#[derive(Debug, Clone)]
pub struct Lines {
    lines: Vec<String>,
    pos: usize,
}

impl Lines {
    /// Wraps an already-split sequence of lines.
    pub fn new(lines: Vec<String>) -> Lines {
        Lines { lines, pos: 0 }
    }

    /// Splits `buffer` into lines, each keeping its terminator. A final
    /// fragment without a terminator is kept as-is.
    pub fn from_buffer(buffer: &str) -> Lines {
        Lines::new(buffer.split_inclusive('\n').map(str::to_owned).collect())
    }

    pub fn from_iter<I, S>(lines: I) -> Lines
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Lines::new(lines.into_iter().map(|s| s.as_ref().to_owned()).collect())
    }

    /// The current line, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.peek_at(0)
    }

    /// The line `n` positions ahead of the cursor.
    pub fn peek_at(&self, n: usize) -> Option<&str> {
        self.lines.get(self.pos + n).map(|s| s.as_str())
    }

    /// Consumes and returns the current line.
    pub fn next(&mut self) -> Option<&str> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    /// Consumes the current line, discarding it.
    pub fn advance(&mut self) {
        if self.pos < self.lines.len() {
            self.pos += 1;
        }
    }

    /// Saves the cursor for speculative matching.
    pub fn anchor(&self) -> Anchor {
        Anchor(self.pos)
    }

    /// Restores a position saved with [`Lines::anchor`].
    pub fn reset(&mut self, anchor: Anchor) {
        self.pos = anchor.0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.lines.len()
    }
}
