use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::mem;

use bstr::{BStr, BString, ByteSlice};

use crate::error::Error;
use crate::front::token::{Keyword, Token};
use crate::front::{Pos, Span};

/// One line of input at a time, from a terminal or a file.
pub trait LineSource {
    /// The next line, without its trailing newline. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<BString>>;
}

const PROMPT: &str = "> ";

/// A terminal source: prints a prompt, then blocks for a line.
pub struct Interactive<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Interactive<R, W> {
    pub fn new(input: R, output: W) -> Interactive<R, W> {
        Interactive { input, output }
    }
}

impl<R: BufRead, W: Write> LineSource for Interactive<R, W> {
    fn read_line(&mut self) -> io::Result<Option<BString>> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()?;
        read_from(&mut self.input)
    }
}

/// A non-interactive source: a file, a pipe, or an in-memory buffer.
pub struct Stream<R> {
    input: R,
}

impl<R: BufRead> Stream<R> {
    pub fn new(input: R) -> Stream<R> {
        Stream { input }
    }
}

impl<R: BufRead> LineSource for Stream<R> {
    fn read_line(&mut self) -> io::Result<Option<BString>> {
        read_from(&mut self.input)
    }
}

fn read_from(input: &mut impl BufRead) -> io::Result<Option<BString>> {
    let mut line = Vec::new();
    if input.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    Ok(Some(BString::from(line)))
}

/// Turns lines of input into a buffered stream of positioned tokens.
///
/// The lexer pulls one line at a time, so an interactive source only
/// blocks when the parser actually needs another token. Block comments
/// may span lines; the stack of their opening positions is carried from
/// line to line and reported whole if input ends inside one.
pub struct Lexer<S> {
    source: S,
    /// Every line read so far, kept for diagnostic excerpts.
    log: Vec<BString>,
    /// Opening positions of the block comments still open.
    comment: Vec<Pos>,
    tokens: VecDeque<(Token, Span)>,
    eof: bool,
}

impl<S: LineSource> Lexer<S> {
    pub fn new(source: S) -> Lexer<S> {
        Lexer {
            source,
            log: Vec::new(),
            comment: Vec::new(),
            tokens: VecDeque::new(),
            eof: false,
        }
    }

    pub fn lines(&self) -> &[BString] {
        &self.log
    }

    /// The next token without consuming it, reading more input if needed.
    /// `Ok(None)` once the source is exhausted.
    pub fn peek(&mut self) -> Result<Option<&(Token, Span)>, Error> {
        while self.tokens.is_empty() && !self.eof {
            let line_num = self.log.len();
            match self.source.read_line()? {
                Some(line) => {
                    self.log.push(line);
                    let line = &self.log[line_num];
                    scan_line(line.as_bstr(), line_num, &mut self.comment, &mut self.tokens)?;
                }
                None => {
                    self.eof = true;
                    if !self.comment.is_empty() {
                        return Err(Error::UnterminatedComment(mem::take(&mut self.comment)));
                    }
                }
            }
        }
        Ok(self.tokens.front())
    }

    /// The next token, consumed.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>, Error> {
        self.peek()?;
        Ok(self.tokens.pop_front())
    }
}

fn scan_line(
    line: &BStr,
    line_num: usize,
    comment: &mut Vec<Pos>,
    tokens: &mut VecDeque<(Token, Span)>,
) -> Result<(), Error> {
    let mut cursor = 0;
    'token: loop {
        // Skip whitespace and comment interiors. Comment delimiters only
        // count when both bytes sit on the same line.
        loop {
            if cursor >= line.len() {
                return Ok(());
            }
            if !comment.is_empty() {
                if cursor + 1 < line.len() {
                    if line[cursor] == b'*' && line[cursor + 1] == b'/' {
                        comment.pop();
                        cursor += 2;
                        continue;
                    } else if line[cursor] == b'/' && line[cursor + 1] == b'*' {
                        comment.push(Pos::new(line_num, cursor));
                        cursor += 2;
                        continue;
                    }
                }
                cursor += 1;
                continue;
            }
            if line[cursor].is_ascii_whitespace() {
                cursor += 1;
                continue;
            }
            break;
        }

        let start = cursor;
        let current = line[cursor];
        let token;
        if current.is_ascii_digit() {
            while cursor < line.len() && line[cursor].is_ascii_digit() {
                cursor += 1;
            }
            // Digit runs are UTF-8 by construction.
            token = Token::Integer(line[start..cursor].to_str().unwrap().to_owned());
        } else if is_ident_start(current) {
            cursor += 1;
            while cursor < line.len() && is_ident_continue(line[cursor]) {
                cursor += 1;
            }
            // Identifier runs are UTF-8 by construction.
            let ident = line[start..cursor].to_str().unwrap();
            token = match Keyword::from_ident(ident) {
                Some(keyword) => Token::Keyword(keyword),
                None => Token::Identifier(ident.to_owned()),
            };
        } else {
            cursor += 1;
            token = match current {
                b'+' => {
                    if eat(line, &mut cursor, b'=') { Token::PlusEqual } else { Token::Plus }
                }
                b'-' => {
                    if eat(line, &mut cursor, b'=') { Token::HyphenEqual } else { Token::Hyphen }
                }
                b'*' => {
                    if eat(line, &mut cursor, b'=') { Token::AsteriskEqual } else { Token::Asterisk }
                }
                b'/' => {
                    if eat(line, &mut cursor, b'=') {
                        Token::SlashEqual
                    } else if line.get(cursor) == Some(&b'/') {
                        // A line comment discards the rest of the line.
                        return Ok(());
                    } else if eat(line, &mut cursor, b'*') {
                        comment.push(Pos::new(line_num, start));
                        continue 'token;
                    } else {
                        Token::Slash
                    }
                }
                b'%' => {
                    if eat(line, &mut cursor, b'=') { Token::PercentEqual } else { Token::Percent }
                }
                b'&' => {
                    if eat(line, &mut cursor, b'=') {
                        Token::AmpersandEqual
                    } else if eat(line, &mut cursor, b'&') {
                        Token::DoubleAmpersand
                    } else {
                        Token::Ampersand
                    }
                }
                b'|' => {
                    if eat(line, &mut cursor, b'=') {
                        Token::BarEqual
                    } else if eat(line, &mut cursor, b'|') {
                        Token::DoubleBar
                    } else {
                        Token::Bar
                    }
                }
                b'^' => {
                    if eat(line, &mut cursor, b'=') {
                        Token::CircumflexEqual
                    } else {
                        Token::Circumflex
                    }
                }
                b'~' => Token::Tilde,
                b'=' => {
                    if eat(line, &mut cursor, b'=') { Token::DoubleEqual } else { Token::Equal }
                }
                b'!' => {
                    if eat(line, &mut cursor, b'=') {
                        Token::ExclamationEqual
                    } else {
                        Token::Exclamation
                    }
                }
                b'<' => {
                    if eat(line, &mut cursor, b'<') {
                        if eat(line, &mut cursor, b'=') {
                            Token::DoubleLessEqual
                        } else {
                            Token::DoubleLess
                        }
                    } else if eat(line, &mut cursor, b'=') {
                        Token::LessEqual
                    } else {
                        Token::Less
                    }
                }
                b'>' => {
                    if eat(line, &mut cursor, b'>') {
                        if eat(line, &mut cursor, b'=') {
                            Token::DoubleGreaterEqual
                        } else {
                            Token::DoubleGreater
                        }
                    } else if eat(line, &mut cursor, b'=') {
                        Token::GreaterEqual
                    } else {
                        Token::Greater
                    }
                }
                b'(' => Token::OpeningParenthesis,
                b')' => Token::ClosingParenthesis,
                b'{' => Token::OpeningBrace,
                b'}' => Token::ClosingBrace,
                b',' => Token::Comma,
                b';' => Token::Semicolon,
                b':' => Token::Colon,
                _ => return Err(Error::UnexpectedCharacter(Pos::new(line_num, start))),
            };
        }
        tokens.push_back((token, Span::new(line_num, start, cursor)));
    }
}

fn eat(line: &BStr, cursor: &mut usize, expected: u8) -> bool {
    if line.get(*cursor) == Some(&expected) {
        *cursor += 1;
        true
    } else {
        false
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer(source: &str) -> Lexer<Stream<&[u8]>> {
        Lexer::new(Stream::new(source.as_bytes()))
    }

    fn drain(source: &str) -> Vec<(Token, Span)> {
        let mut lexer = lexer(source);
        let mut tokens = vec![];
        while let Some(token) = lexer.next().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    fn integer(digits: &str) -> Token {
        Token::Integer(digits.to_owned())
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_owned())
    }

    #[test]
    fn spans() {
        assert_eq!(
            drain("1+2*3"),
            vec![
                (integer("1"), Span::new(0, 0, 1)),
                (Token::Plus, Span::new(0, 1, 2)),
                (integer("2"), Span::new(0, 2, 3)),
                (Token::Asterisk, Span::new(0, 3, 4)),
                (integer("3"), Span::new(0, 4, 5)),
            ]
        );
    }

    #[test]
    fn greedy_longest_match() {
        let tokens: Vec<Token> = drain("<<= << <= < >>= >> >= >").into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::DoubleLessEqual,
                Token::DoubleLess,
                Token::LessEqual,
                Token::Less,
                Token::DoubleGreaterEqual,
                Token::DoubleGreater,
                Token::GreaterEqual,
                Token::Greater,
            ]
        );
    }

    #[test]
    fn keywords() {
        let tokens: Vec<Token> = drain("if iffy else while").into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::If),
                ident("iffy"),
                Token::Keyword(Keyword::Else),
                Token::Keyword(Keyword::While),
            ]
        );
    }

    #[test]
    fn line_comment_discards_the_rest() {
        assert_eq!(drain("1 // 2 + 3"), vec![(integer("1"), Span::new(0, 0, 1))]);
    }

    #[test]
    fn nested_comment_closes_once_depth_returns_to_zero() {
        assert_eq!(drain("/* a /* b */ c */x"), vec![(ident("x"), Span::new(0, 17, 18))]);
    }

    #[test]
    fn comment_spans_lines() {
        assert_eq!(
            drain("a /* one\ntwo\n*/ b"),
            vec![(ident("a"), Span::new(0, 0, 1)), (ident("b"), Span::new(2, 3, 4))]
        );
    }

    #[test]
    fn unterminated_comment_reports_every_opening() {
        let mut lexer = lexer("/* a /* b");
        match lexer.next() {
            Err(Error::UnterminatedComment(opened)) => {
                assert_eq!(opened, vec![Pos::new(0, 0), Pos::new(0, 5)]);
            }
            other => panic!("expected an unterminated comment, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_character() {
        // The whole line is scanned in one peek, so the error surfaces
        // before the tokens lexed ahead of it.
        let mut lexer = lexer("1 @");
        match lexer.next() {
            Err(Error::UnexpectedCharacter(pos)) => assert_eq!(pos, Pos::new(0, 2)),
            other => panic!("expected an unexpected character, got {:?}", other),
        }
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = lexer("x");
        assert_eq!(lexer.next().unwrap(), Some((ident("x"), Span::new(0, 0, 1))));
        assert_eq!(lexer.next().unwrap(), None);
        assert_eq!(lexer.next().unwrap(), None);
    }

    #[test]
    fn interactive_source_prompts_per_line() {
        let mut output = Vec::new();
        {
            let source = Interactive::new("1;".as_bytes(), &mut output);
            let mut lexer = Lexer::new(source);
            assert_eq!(lexer.next().unwrap(), Some((integer("1"), Span::new(0, 0, 1))));
            assert_eq!(lexer.next().unwrap(), Some((Token::Semicolon, Span::new(0, 1, 2))));
            assert_eq!(lexer.next().unwrap(), None);
        }
        assert_eq!(output, b"> > ");
    }

    #[test]
    fn log_keeps_the_lines_read() {
        let mut lexer = lexer("1 +\n2");
        while lexer.next().unwrap().is_some() {}
        assert_eq!(lexer.lines(), &[BString::from("1 +"), BString::from("2")]);
    }
}
