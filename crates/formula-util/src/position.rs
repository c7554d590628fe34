//! Source position tracking.
//!
//! A [`Position`] pinpoints a single byte offset in the formula text, along
//! with the 1-based line and column a human would use to locate it. The
//! lexer advances a `Position` one character at a time; every token and
//! diagnostic carries the position of its first character.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single point in the source text.
///
/// # Examples
///
/// ```
/// use formula_util::Position;
///
/// let start = Position::start();
/// assert_eq!((start.offset, start.line, start.column), (0, 1, 1));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Byte offset from the start of the formula text.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The position of the very first byte of a formula.
    #[inline]
    pub const fn start() -> Self {
        Self { offset: 0, line: 1, column: 1 }
    }

    /// Advance past `ch`, updating line/column according to whether it is
    /// a newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_util::Position;
    ///
    /// let mut pos = Position::start();
    /// pos.advance('a');
    /// assert_eq!((pos.offset, pos.line, pos.column), (1, 1, 2));
    ///
    /// pos.advance('\n');
    /// assert_eq!((pos.offset, pos.line, pos.column), (2, 2, 1));
    /// ```
    #[inline]
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_one_one() {
        let p = Position::start();
        assert_eq!(p.offset, 0);
        assert_eq!(p.line, 1);
        assert_eq!(p.column, 1);
    }

    #[test]
    fn advance_tracks_newlines() {
        let mut p = Position::start();
        for ch in "ab\ncd".chars() {
            p.advance(ch);
        }
        // "ab\ncd" -> after 'a','b','\n','c','d'
        assert_eq!(p.line, 2);
        assert_eq!(p.column, 3);
        assert_eq!(p.offset, 5);
    }

    #[test]
    fn display_format() {
        let p = Position { offset: 10, line: 3, column: 4 };
        assert_eq!(p.to_string(), "3:4");
    }
}
