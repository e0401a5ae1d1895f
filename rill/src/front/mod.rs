use std::fmt;
use std::io;

use bstr::{BStr, BString, ByteSlice};

pub mod ast;
pub mod token;

mod lexer;
mod parser;

pub use lexer::{Interactive, Lexer, LineSource, Stream};
pub use parser::Parser;

/// A position in the source: line and byte offset, both 0-indexed.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Pos {
    pub line: usize,
    pub byte: usize,
}

/// A half-open range of positions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Pos {
    pub fn new(line: usize, byte: usize) -> Pos {
        Pos { line, byte }
    }

    /// Print the position's line, split at the position.
    pub fn excerpt(&self, lines: &[BString], out: &mut dyn io::Write) -> io::Result<()> {
        let line = match lines.get(self.line) {
            Some(line) => line.as_bstr(),
            None => return Ok(()),
        };
        let byte = self.byte.min(line.len());
        writeln!(out, "{} !-> {}", &line[..byte].as_bstr(), &line[byte..].as_bstr())
    }
}

impl Span {
    pub fn new(line: usize, start: usize, end: usize) -> Span {
        Span { start: Pos::new(line, start), end: Pos::new(line, end) }
    }

    /// Extend this span rightward to the end of `other`.
    ///
    /// Spans are built left to right as tokens are consumed, so `other`
    /// always ends at or after `self`.
    pub fn union(self, other: Span) -> Span {
        Span { start: self.start, end: other.end }
    }

    /// Print the span's line(s), with the covered range marked.
    pub fn excerpt(&self, lines: &[BString], out: &mut dyn io::Write) -> io::Result<()> {
        let (start, end) = (self.start, self.end);
        if start.line == end.line {
            let line = match lines.get(start.line) {
                Some(line) => line.as_bstr(),
                None => return Ok(()),
            };
            let low = start.byte.min(line.len());
            let high = end.byte.min(line.len()).max(low);
            writeln!(
                out,
                "{} !-> {} <-! {}",
                &line[..low].as_bstr(),
                &line[low..high].as_bstr(),
                &line[high..].as_bstr()
            )
        } else {
            let first: &BStr = match lines.get(start.line) {
                Some(line) => line.as_bstr(),
                None => return Ok(()),
            };
            let last: &BStr = match lines.get(end.line) {
                Some(line) => line.as_bstr(),
                None => return Ok(()),
            };
            let low = start.byte.min(first.len());
            let high = end.byte.min(last.len());
            writeln!(out, "{} !-> {}", &first[..low].as_bstr(), &first[low..].as_bstr())?;
            writeln!(out, " ({})", end.line - start.line - 1)?;
            writeln!(out, "{} <-! {}", &last[..high].as_bstr(), &last[high..].as_bstr())
        }
    }
}

impl fmt::Display for Pos {
    /// Rendered 1-indexed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.byte + 1)
    }
}

impl fmt::Display for Span {
    /// Rendered 1-indexed and closed at the end, so the last byte shown is
    /// the last byte covered.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line + 1,
            self.start.byte + 1,
            self.end.line + 1,
            self.end.byte
        )
    }
}
