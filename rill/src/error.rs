use std::io;
use std::num::ParseIntError;

use bstr::BString;
use thiserror::Error;

use crate::back::UnitError;
use crate::front::{Pos, Span};

/// Everything that can end a session, each kind carrying the positions
/// needed to point at the offending source.
///
/// Any of these aborts the current statement and the session; there is no
/// per-statement recovery.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected character at {0}")]
    UnexpectedCharacter(Pos),

    /// Carries every comment still open at end of input, outermost first.
    #[error("unterminated comment")]
    UnterminatedComment(Vec<Pos>),

    #[error("invalid integer literal ({error}) at {span}")]
    InvalidIntegerLiteral { error: ParseIntError, span: Span },

    #[error("unexpected end of input after a prefix operator at {0}")]
    UnexpectedEofAfterPrefix(Span),

    #[error("unexpected token at {token} after a prefix operator at {prefix}")]
    UnexpectedTokenAfterPrefix { token: Span, prefix: Span },

    #[error("no closing parenthesis (opened at {0})")]
    NoClosingParenthesis(Span),

    #[error("unexpected token at {token} in parenthesis (opened at {open})")]
    UnexpectedTokenInParenthesis { token: Span, open: Span },

    #[error("empty parenthesis (opened at {0})")]
    EmptyParenthesis(Span),

    #[error("an expression expected after an operator at {0}")]
    NoExpressionAfterOperator(Span),

    #[error("an argument expected before a comma at {0}")]
    EmptyArgument(Span),

    #[error("an identifier expected before a colon at {0}")]
    NoIdentifierBeforeColon(Span),

    #[error("a semicolon expected in a declaration at {0}")]
    NoSemicolonAfterDeclaration(Span),

    #[error("no semicolon after an expression at {0}")]
    NoSemicolonAfterExpression(Span),

    #[error("unexpected token at the start of a statement at {0}")]
    UnexpectedTokenAtStatement(Span),

    #[error("no closing brace (opened at {0})")]
    NoClosingBrace(Span),

    #[error("a parenthesized condition expected after the keyword at {0}")]
    NoParenthesisAfterKeyword(Span),

    #[error("empty condition at {0}")]
    EmptyCondition(Span),

    #[error("unexpected end of input in a control statement starting at {0}")]
    UnexpectedEofInControlStatement(Span),

    #[error("undefined variable `{name}` at {span}")]
    UndefinedVariable { name: String, span: Span },

    #[error("cannot lower statement: {message}")]
    Lowering { message: &'static str, span: Option<Span> },

    #[error("unit {unit} failed: {error}")]
    Unit { unit: usize, error: UnitError },

    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Write the message followed by the relevant source excerpt(s).
    ///
    /// `lines` is the lexer's log of every line read so far.
    pub fn report(&self, lines: &[BString], out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "{}", self)?;
        match *self {
            Error::UnexpectedCharacter(pos) => pos.excerpt(lines, out),

            Error::UnterminatedComment(ref opened) => {
                for pos in opened {
                    writeln!(out, "started at {}", pos)?;
                    pos.excerpt(lines, out)?;
                }
                Ok(())
            }

            Error::InvalidIntegerLiteral { span, .. }
            | Error::UnexpectedEofAfterPrefix(span)
            | Error::NoClosingParenthesis(span)
            | Error::EmptyParenthesis(span)
            | Error::NoExpressionAfterOperator(span)
            | Error::EmptyArgument(span)
            | Error::NoIdentifierBeforeColon(span)
            | Error::NoSemicolonAfterDeclaration(span)
            | Error::NoSemicolonAfterExpression(span)
            | Error::UnexpectedTokenAtStatement(span)
            | Error::NoClosingBrace(span)
            | Error::NoParenthesisAfterKeyword(span)
            | Error::EmptyCondition(span)
            | Error::UnexpectedEofInControlStatement(span) => span.excerpt(lines, out),

            Error::UnexpectedTokenAfterPrefix { token, prefix } => {
                token.excerpt(lines, out)?;
                prefix.excerpt(lines, out)
            }

            Error::UnexpectedTokenInParenthesis { token, open } => {
                token.excerpt(lines, out)?;
                open.excerpt(lines, out)
            }

            Error::UndefinedVariable { span, .. } => span.excerpt(lines, out),

            Error::Lowering { span: Some(span), .. } => span.excerpt(lines, out),
            Error::Lowering { span: None, .. } => Ok(()),

            Error::Unit { .. } | Error::Io(_) => Ok(()),
        }
    }
}
