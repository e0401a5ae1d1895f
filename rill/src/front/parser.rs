use std::num::ParseIntError;

use crate::error::Error;
use crate::front::ast::{BinaryOp, Expr, Stmt, Ty, UnaryOp};
use crate::front::token::{Keyword, Token};
use crate::front::{Lexer, LineSource, Span};

/// Binary operators parse by precedence climbing over these levels,
/// loosest first. `ASSIGN` is the only right-associative level.
const ASSIGN: usize = 0;
const LOGICAL_OR: usize = 1;
const LOGICAL_AND: usize = 2;
const COMPARISON: usize = 3;
const BIT_OR: usize = 4;
const BIT_XOR: usize = 5;
const BIT_AND: usize = 6;
const SHIFT: usize = 7;
const ADD_SUB: usize = 8;
const MUL_DIV_REM: usize = 9;
const MAX_PRECEDENCE: usize = 10;

fn precedence(op: BinaryOp) -> usize {
    use BinaryOp::*;
    match op {
        Mul | Div | Rem => MUL_DIV_REM,
        Add | Sub => ADD_SUB,
        LeftShift | RightShift => SHIFT,
        BitAnd => BIT_AND,
        BitXor => BIT_XOR,
        BitOr => BIT_OR,
        Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual => COMPARISON,
        LogicalAnd => LOGICAL_AND,
        LogicalOr => LOGICAL_OR,
        Assign | MulAssign | DivAssign | RemAssign | AddAssign | SubAssign
        | LeftShiftAssign | RightShiftAssign | BitAndAssign | BitXorAssign | BitOrAssign => ASSIGN,
    }
}

fn left_associative(level: usize) -> bool {
    level != ASSIGN
}

/// Recursive-descent parser over a lexer's token stream.
///
/// Optional constructs come back as `Ok(None)`; once a construct is
/// committed (a token only it could own has been consumed), any deviation
/// is a hard error.
pub struct Parser<S> {
    lexer: Lexer<S>,
}

impl<S: LineSource> Parser<S> {
    pub fn new(lexer: Lexer<S>) -> Parser<S> {
        Parser { lexer }
    }

    /// The underlying lexer, for its line log.
    pub fn lexer(&self) -> &Lexer<S> {
        &self.lexer
    }

    /// Parse one statement. `Ok(None)` is clean end of input.
    pub fn parse_statement(&mut self) -> Result<Option<(Stmt, Span)>, Error> {
        enum Head {
            Block(Span),
            If(Span),
            While(Span),
            Expression,
        }
        let head = match self.lexer.peek()? {
            Some(&(Token::OpeningBrace, span)) => Head::Block(span),
            Some(&(Token::Keyword(Keyword::If), span)) => Head::If(span),
            Some(&(Token::Keyword(Keyword::While), span)) => Head::While(span),
            _ => Head::Expression,
        };
        match head {
            Head::Block(open) => {
                self.lexer.next()?;
                return self.parse_block(open).map(Some);
            }
            Head::If(keyword) => {
                self.lexer.next()?;
                return self.parse_if(keyword).map(Some);
            }
            Head::While(keyword) => {
                self.lexer.next()?;
                return self.parse_while(keyword).map(Some);
            }
            Head::Expression => {}
        }

        let expression = self.parse_expression()?;

        enum Terminator {
            Eof,
            Semicolon(Span),
            Colon(Span),
            Other(Span),
        }
        let terminator = match self.lexer.peek()? {
            None => Terminator::Eof,
            Some(&(ref token, span)) => {
                if token.is_semicolon() {
                    Terminator::Semicolon(span)
                } else if token.is_colon() {
                    Terminator::Colon(span)
                } else {
                    Terminator::Other(span)
                }
            }
        };

        match terminator {
            Terminator::Eof => match expression {
                Some((_, span)) => Err(Error::NoSemicolonAfterExpression(span)),
                None => Ok(None),
            },
            Terminator::Semicolon(semicolon) => {
                self.lexer.next()?;
                let span = match expression {
                    Some((_, span)) => span.union(semicolon),
                    None => semicolon,
                };
                Ok(Some((Stmt::Expression(expression), span)))
            }
            Terminator::Colon(colon) => {
                let (name, name_span) = match expression {
                    None => return Err(Error::NoIdentifierBeforeColon(colon)),
                    Some((expr, span)) => match expr {
                        Expr::Identifier(name) => (name, span),
                        _ => return Err(Error::NoIdentifierBeforeColon(span)),
                    },
                };
                self.lexer.next()?;
                self.parse_declaration(name, name_span).map(Some)
            }
            Terminator::Other(span) => Err(Error::UnexpectedTokenAtStatement(span)),
        }
    }

    /// The rest of a declaration, after `name:` has been consumed.
    fn parse_declaration(&mut self, name: String, name_span: Span) -> Result<(Stmt, Span), Error> {
        let ty = self.parse_type()?;

        enum Next {
            Eof,
            Semicolon(Span),
            Equal(Span),
            Other(Span),
        }
        let next = match self.lexer.peek()? {
            None => Next::Eof,
            Some(&(ref token, span)) => {
                if token.is_semicolon() {
                    Next::Semicolon(span)
                } else if token.is_equal() {
                    Next::Equal(span)
                } else {
                    Next::Other(span)
                }
            }
        };

        match next {
            Next::Eof => {
                let span = match ty {
                    Some((_, ty_span)) => name_span.union(ty_span),
                    None => name_span,
                };
                Err(Error::NoSemicolonAfterDeclaration(span))
            }
            Next::Semicolon(semicolon) => {
                self.lexer.next()?;
                let span = name_span.union(semicolon);
                Ok((Stmt::Declaration(name, ty, None), span))
            }
            Next::Equal(equal) => {
                self.lexer.next()?;
                let init = match self.parse_expression()? {
                    Some(init) => init,
                    None => return Err(Error::NoSemicolonAfterDeclaration(equal)),
                };
                match self.lexer.next()? {
                    Some((token, span)) if token.is_semicolon() => {
                        let span = name_span.union(span);
                        Ok((Stmt::Declaration(name, ty, Some(Box::new(init))), span))
                    }
                    Some((_, span)) => Err(Error::NoSemicolonAfterDeclaration(span)),
                    None => Err(Error::NoSemicolonAfterDeclaration(init.1)),
                }
            }
            Next::Other(span) => Err(Error::NoSemicolonAfterDeclaration(span)),
        }
    }

    /// An optional primitive type name.
    fn parse_type(&mut self) -> Result<Option<(Ty, Span)>, Error> {
        let ty = match self.lexer.peek()? {
            Some(&(ref token, span)) => token.type_name().map(|ty| (ty, span)),
            None => None,
        };
        if ty.is_some() {
            self.lexer.next()?;
        }
        Ok(ty)
    }

    /// The rest of a block, after `{` has been consumed.
    fn parse_block(&mut self, open: Span) -> Result<(Stmt, Span), Error> {
        let mut statements = vec![];
        loop {
            let close = match self.lexer.peek()? {
                None => return Err(Error::NoClosingBrace(open)),
                Some(&(ref token, span)) => {
                    if token.is_closing_brace() {
                        Some(span)
                    } else {
                        None
                    }
                }
            };
            match close {
                Some(close) => {
                    self.lexer.next()?;
                    let span = open.union(close);
                    return Ok((Stmt::Block(statements.into_boxed_slice()), span));
                }
                None => match self.parse_statement()? {
                    Some(statement) => statements.push(statement),
                    None => return Err(Error::NoClosingBrace(open)),
                },
            }
        }
    }

    /// The rest of an `if`, after the keyword has been consumed.
    fn parse_if(&mut self, keyword: Span) -> Result<(Stmt, Span), Error> {
        let condition = self.parse_condition(keyword)?;
        let then = match self.parse_statement()? {
            Some(then) => then,
            None => return Err(Error::UnexpectedEofInControlStatement(keyword)),
        };

        let has_else = matches!(
            self.lexer.peek()?,
            Some(&(Token::Keyword(Keyword::Else), _))
        );
        let else_branch = if has_else {
            self.lexer.next()?;
            match self.parse_statement()? {
                Some(branch) => Some(branch),
                None => return Err(Error::UnexpectedEofInControlStatement(keyword)),
            }
        } else {
            None
        };

        let high = else_branch.as_ref().map(|&(_, span)| span).unwrap_or(then.1);
        let span = keyword.union(high);
        Ok((Stmt::If(Box::new(condition), Box::new(then), else_branch.map(Box::new)), span))
    }

    /// The rest of a `while`, after the keyword has been consumed.
    fn parse_while(&mut self, keyword: Span) -> Result<(Stmt, Span), Error> {
        let condition = self.parse_condition(keyword)?;
        let body = match self.parse_statement()? {
            Some(body) => body,
            None => return Err(Error::UnexpectedEofInControlStatement(keyword)),
        };
        let span = keyword.union(body.1);
        Ok((Stmt::While(Box::new(condition), Box::new(body)), span))
    }

    /// A parenthesized condition after `if` or `while`.
    fn parse_condition(&mut self, keyword: Span) -> Result<(Expr, Span), Error> {
        let open = match self.lexer.peek()? {
            None => return Err(Error::UnexpectedEofInControlStatement(keyword)),
            Some(&(ref token, span)) => {
                if token.is_opening_parenthesis() {
                    span
                } else {
                    return Err(Error::NoParenthesisAfterKeyword(keyword));
                }
            }
        };
        self.lexer.next()?;
        let condition = self.parse_expression()?;
        let close = self.expect_closing_parenthesis(open)?;
        match condition {
            Some(condition) => Ok(condition),
            None => Err(Error::EmptyCondition(open.union(close))),
        }
    }

    /// Parse one expression. `Ok(None)` when the next token cannot begin
    /// one; an absent expression is valid in several grammar positions.
    pub fn parse_expression(&mut self) -> Result<Option<(Expr, Span)>, Error> {
        self.parse_binary(ASSIGN)
    }

    fn parse_binary(&mut self, level: usize) -> Result<Option<(Expr, Span)>, Error> {
        if level == MAX_PRECEDENCE {
            return self.parse_factor();
        }
        let mut left = match self.parse_binary(level + 1)? {
            Some(left) => left,
            None => return Ok(None),
        };
        let left_to_right = left_associative(level);
        loop {
            let infix = match self.lexer.peek()? {
                Some(&(ref token, span)) => token.infix().map(|op| (op, span)),
                None => None,
            };
            let (op, op_span) = match infix {
                Some((op, span)) if precedence(op) == level => (op, span),
                _ => break,
            };
            self.lexer.next()?;

            // A left-associative level takes its right operand one level
            // tighter and keeps looping; the right-associative level
            // recurses into itself and stops.
            let right = match self.parse_binary(level + left_to_right as usize)? {
                Some(right) => right,
                None => return Err(Error::NoExpressionAfterOperator(op_span)),
            };
            let span = left.1.union(right.1);
            left = (Expr::Binary(op, Box::new(left), Box::new(right)), span);
            if !left_to_right {
                break;
            }
        }
        Ok(Some(left))
    }

    fn parse_factor(&mut self) -> Result<Option<(Expr, Span)>, Error> {
        enum Start {
            Ident(String),
            Integer(Result<i32, ParseIntError>),
            Prefix(UnaryOp),
            Group,
            None,
        }
        let (start, token_span) = match self.lexer.peek()? {
            None => return Ok(None),
            Some(&(ref token, span)) => {
                let start = if let Some(name) = token.identifier() {
                    Start::Ident(name.to_owned())
                } else if let Some(value) = token.positive_integer() {
                    Start::Integer(value)
                } else if let Some(op) = token.prefix() {
                    Start::Prefix(op)
                } else if token.is_opening_parenthesis() {
                    Start::Group
                } else {
                    Start::None
                };
                (start, span)
            }
        };

        let (mut expr, mut span) = match start {
            Start::None => return Ok(None),
            Start::Ident(name) => {
                self.lexer.next()?;
                (Expr::Identifier(name), token_span)
            }
            Start::Integer(value) => {
                let value = value
                    .map_err(|error| Error::InvalidIntegerLiteral { error, span: token_span })?;
                self.lexer.next()?;
                (Expr::Integer(value), token_span)
            }
            Start::Prefix(op) => {
                self.lexer.next()?;
                let prefix = token_span;

                // A minus directly before an integer literal folds into it;
                // parsing the digits negated is the only way to reach the
                // minimum 32-bit value.
                let folded = match self.lexer.peek()? {
                    None => return Err(Error::UnexpectedEofAfterPrefix(prefix)),
                    Some(&(ref token, span)) => {
                        if op == UnaryOp::Minus {
                            token.negative_integer().map(|value| (value, span))
                        } else {
                            None
                        }
                    }
                };
                match folded {
                    Some((value, literal)) => {
                        let span = prefix.union(literal);
                        let value =
                            value.map_err(|error| Error::InvalidIntegerLiteral { error, span })?;
                        self.lexer.next()?;
                        (Expr::Integer(value), span)
                    }
                    None => match self.parse_factor()? {
                        Some(operand) => {
                            let span = prefix.union(operand.1);
                            (Expr::Unary(op, Box::new(operand)), span)
                        }
                        None => {
                            let token = match self.lexer.peek()? {
                                Some(&(_, span)) => span,
                                None => return Err(Error::UnexpectedEofAfterPrefix(prefix)),
                            };
                            return Err(Error::UnexpectedTokenAfterPrefix { token, prefix });
                        }
                    },
                }
            }
            Start::Group => {
                self.lexer.next()?;
                let open = token_span;
                let inner = match self.parse_expression()? {
                    Some(inner) => inner,
                    None => return Err(Error::EmptyParenthesis(open)),
                };
                let close = self.expect_closing_parenthesis(open)?;
                (Expr::Group(Box::new(inner)), open.union(close))
            }
        };

        // Trailing argument lists; `f(x)(y)` is two nested calls.
        loop {
            let open = match self.lexer.peek()? {
                Some(&(ref token, span)) if token.is_opening_parenthesis() => span,
                _ => return Ok(Some((expr, span))),
            };
            self.lexer.next()?;
            let arguments = self.parse_arguments()?;
            let close = self.expect_closing_parenthesis(open)?;
            let callee = (expr, span);
            span = span.union(close);
            expr = Expr::Call(Box::new(callee), arguments);
        }
    }

    /// Comma-separated arguments, up to but not including the closing
    /// parenthesis.
    fn parse_arguments(&mut self) -> Result<Box<[(Expr, Span)]>, Error> {
        let mut arguments = vec![];
        loop {
            let argument = self.parse_expression()?;
            let comma = match self.lexer.peek()? {
                Some(&(ref token, span)) if token.is_comma() => Some(span),
                _ => None,
            };
            match comma {
                Some(comma) => {
                    self.lexer.next()?;
                    match argument {
                        Some(argument) => arguments.push(argument),
                        None => return Err(Error::EmptyArgument(comma)),
                    }
                }
                None => {
                    if let Some(argument) = argument {
                        arguments.push(argument);
                    }
                    return Ok(arguments.into_boxed_slice());
                }
            }
        }
    }

    fn expect_closing_parenthesis(&mut self, open: Span) -> Result<Span, Error> {
        match self.lexer.next()? {
            None => Err(Error::NoClosingParenthesis(open)),
            Some((token, span)) => {
                if token.is_closing_parenthesis() {
                    Ok(span)
                } else {
                    Err(Error::UnexpectedTokenInParenthesis { token: span, open })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::Stream;

    fn parser(source: &str) -> Parser<Stream<&[u8]>> {
        Parser::new(Lexer::new(Stream::new(source.as_bytes())))
    }

    fn expression(source: &str) -> (Expr, Span) {
        parser(source).parse_expression().unwrap().unwrap()
    }

    fn statement(source: &str) -> (Stmt, Span) {
        parser(source).parse_statement().unwrap().unwrap()
    }

    fn dump(expr: &Expr) -> String {
        match expr {
            Expr::Identifier(name) => name.clone(),
            Expr::Integer(value) => value.to_string(),
            Expr::Unary(op, operand) => format!("({:?} {})", op, dump(&operand.0)),
            Expr::Binary(op, left, right) => {
                format!("({:?} {} {})", op, dump(&left.0), dump(&right.0))
            }
            Expr::Group(inner) => format!("(group {})", dump(&inner.0)),
            Expr::Call(callee, arguments) => {
                let arguments: Vec<String> =
                    arguments.iter().map(|(argument, _)| dump(argument)).collect();
                format!("(call {} [{}])", dump(&callee.0), arguments.join(" "))
            }
        }
    }

    fn dump_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(None) => "(expr)".to_owned(),
            Stmt::Expression(Some((expr, _))) => format!("(expr {})", dump(expr)),
            Stmt::Declaration(name, ty, init) => {
                let ty = match ty {
                    Some((ty, _)) => format!(" {}", ty),
                    None => String::new(),
                };
                let init = match init {
                    Some(init) => format!(" = {}", dump(&init.0)),
                    None => String::new(),
                };
                format!("(declare {}{}{})", name, ty, init)
            }
            Stmt::Block(statements) => {
                let statements: Vec<String> =
                    statements.iter().map(|(statement, _)| dump_stmt(statement)).collect();
                format!("(block{}{})", if statements.is_empty() { "" } else { " " }, statements.join(" "))
            }
            Stmt::If(condition, then, None) => {
                format!("(if {} {})", dump(&condition.0), dump_stmt(&then.0))
            }
            Stmt::If(condition, then, Some(other)) => {
                format!("(if {} {} {})", dump(&condition.0), dump_stmt(&then.0), dump_stmt(&other.0))
            }
            Stmt::While(condition, body) => {
                format!("(while {} {})", dump(&condition.0), dump_stmt(&body.0))
            }
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(dump(&expression("1+2*3").0), "(Add 1 (Mul 2 3))");
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(dump(&expression("1-2-3").0), "(Sub (Sub 1 2) 3)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(dump(&expression("a=b=c").0), "(Assign a (Assign b c))");
    }

    #[test]
    fn shifts_are_looser_than_addition() {
        assert_eq!(dump(&expression("1 << 2 + 3").0), "(LeftShift 1 (Add 2 3))");
    }

    #[test]
    fn comparisons_feed_logical_operators() {
        assert_eq!(
            dump(&expression("a = 1 < 2 && 3 < 4 || b").0),
            "(Assign a (LogicalOr (LogicalAnd (Less 1 2) (Less 3 4)) b))"
        );
    }

    #[test]
    fn compound_assignment_spellings() {
        assert_eq!(dump(&expression("a <<= b |= c").0), "(LeftShiftAssign a (BitOrAssign b c))");
    }

    #[test]
    fn groups_reset_precedence() {
        assert_eq!(dump(&expression("(1+2)*3").0), "(Mul (group (Add 1 2)) 3)");
    }

    #[test]
    fn prefix_operators_nest() {
        assert_eq!(dump(&expression("!~x").0), "(LogicalNot (BitNot x))");
        assert_eq!(dump(&expression("- -5").0), "(Minus -5)");
    }

    #[test]
    fn minimum_integer_parses_behind_a_minus() {
        let (expr, span) = expression("-2147483648");
        assert_eq!(expr, Expr::Integer(i32::MIN));
        assert_eq!(span, Span::new(0, 0, 11));
    }

    #[test]
    fn positive_overflow_is_an_invalid_literal() {
        match parser("2147483648").parse_expression() {
            Err(Error::InvalidIntegerLiteral { span, .. }) => {
                assert_eq!(span, Span::new(0, 0, 10));
            }
            other => panic!("expected an invalid literal, got {:?}", other),
        }
    }

    #[test]
    fn negative_overflow_is_an_invalid_literal() {
        assert!(matches!(
            parser("-2147483649").parse_expression(),
            Err(Error::InvalidIntegerLiteral { .. })
        ));
    }

    #[test]
    fn minus_folds_into_a_literal_before_calls_bind() {
        assert_eq!(dump(&expression("-1(x)").0), "(call -1 [x])");
    }

    #[test]
    fn calls_nest_left_to_right() {
        assert_eq!(dump(&expression("f(x)(y)").0), "(call (call f [x]) [y])");
        assert_eq!(dump(&expression("f()").0), "(call f [])");
    }

    #[test]
    fn empty_argument_points_at_its_comma() {
        match parser("f(1,,2)").parse_expression() {
            Err(Error::EmptyArgument(span)) => assert_eq!(span, Span::new(0, 4, 5)),
            other => panic!("expected an empty argument, got {:?}", other),
        }
        assert!(matches!(
            parser("f(,1)").parse_expression(),
            Err(Error::EmptyArgument(_))
        ));
    }

    #[test]
    fn missing_closing_parenthesis_points_at_the_opening() {
        match parser("(1+2").parse_expression() {
            Err(Error::NoClosingParenthesis(span)) => assert_eq!(span, Span::new(0, 0, 1)),
            other => panic!("expected a missing parenthesis, got {:?}", other),
        }
    }

    #[test]
    fn empty_parenthesis() {
        assert!(matches!(
            parser("()").parse_expression(),
            Err(Error::EmptyParenthesis(span)) if span == Span::new(0, 0, 1)
        ));
    }

    #[test]
    fn operator_with_no_right_operand() {
        assert!(matches!(
            parser("1+").parse_expression(),
            Err(Error::NoExpressionAfterOperator(span)) if span == Span::new(0, 1, 2)
        ));
    }

    #[test]
    fn prefix_at_end_of_input() {
        assert!(matches!(
            parser("-").parse_expression(),
            Err(Error::UnexpectedEofAfterPrefix(_))
        ));
    }

    #[test]
    fn prefix_before_a_non_factor() {
        assert!(matches!(
            parser("+;").parse_expression(),
            Err(Error::UnexpectedTokenAfterPrefix { .. })
        ));
    }

    #[test]
    fn expression_statements() {
        assert_eq!(dump_stmt(&statement("x + 1;").0), "(expr (Add x 1))");
        assert_eq!(dump_stmt(&statement(";").0), "(expr)");
    }

    #[test]
    fn declarations() {
        assert_eq!(dump_stmt(&statement("x: = 1;").0), "(declare x = 1)");
        assert_eq!(dump_stmt(&statement("x: integer;").0), "(declare x integer)");
        assert_eq!(
            dump_stmt(&statement("x: boolean = 1 < 2;").0),
            "(declare x boolean = (Less 1 2))"
        );
    }

    #[test]
    fn declaration_span_covers_name_through_semicolon() {
        let (_, span) = statement("x: = 1;");
        assert_eq!(span, Span::new(0, 0, 7));
    }

    #[test]
    fn blocks_and_control_statements() {
        assert_eq!(dump_stmt(&statement("{ x; y; }").0), "(block (expr x) (expr y))");
        assert_eq!(dump_stmt(&statement("{}").0), "(block)");
        assert_eq!(
            dump_stmt(&statement("if (x) y; else z;").0),
            "(if x (expr y) (expr z))"
        );
        assert_eq!(
            dump_stmt(&statement("while (x < 3) { x = x + 1; }").0),
            "(while (Less x 3) (block (expr (Assign x (Add x 1)))))"
        );
        assert_eq!(
            dump_stmt(&statement("if (a) if (b) c; else d;").0),
            "(if a (if b (expr c) (expr d)))"
        );
    }

    #[test]
    fn clean_end_of_input_is_no_statement() {
        assert!(parser("").parse_statement().unwrap().is_none());
        assert!(parser("  // comment only").parse_statement().unwrap().is_none());
    }

    #[test]
    fn statements_parse_in_sequence() {
        let mut parser = parser("x: = 1;\nx + 1;");
        assert_eq!(dump_stmt(&parser.parse_statement().unwrap().unwrap().0), "(declare x = 1)");
        assert_eq!(dump_stmt(&parser.parse_statement().unwrap().unwrap().0), "(expr (Add x 1))");
        assert!(parser.parse_statement().unwrap().is_none());
    }

    #[test]
    fn expression_without_terminator() {
        assert!(matches!(
            parser("1 + 2").parse_statement(),
            Err(Error::NoSemicolonAfterExpression(_))
        ));
    }

    #[test]
    fn colon_after_a_non_identifier() {
        assert!(matches!(
            parser("1: = 2;").parse_statement(),
            Err(Error::NoIdentifierBeforeColon(span)) if span == Span::new(0, 0, 1)
        ));
        assert!(matches!(
            parser("(x): = 2;").parse_statement(),
            Err(Error::NoIdentifierBeforeColon(_))
        ));
    }

    #[test]
    fn declaration_deviations() {
        assert!(matches!(
            parser("x: = 1").parse_statement(),
            Err(Error::NoSemicolonAfterDeclaration(_))
        ));
        assert!(matches!(
            parser("x: 5;").parse_statement(),
            Err(Error::NoSemicolonAfterDeclaration(_))
        ));
        assert!(matches!(
            parser("x: integer = ;").parse_statement(),
            Err(Error::NoSemicolonAfterDeclaration(_))
        ));
    }

    #[test]
    fn unclosed_block() {
        assert!(matches!(
            parser("{ x;").parse_statement(),
            Err(Error::NoClosingBrace(span)) if span == Span::new(0, 0, 1)
        ));
    }

    #[test]
    fn control_statement_errors() {
        assert!(matches!(
            parser("if x;").parse_statement(),
            Err(Error::NoParenthesisAfterKeyword(span)) if span == Span::new(0, 0, 2)
        ));
        assert!(matches!(
            parser("if () x;").parse_statement(),
            Err(Error::EmptyCondition(_))
        ));
        assert!(matches!(
            parser("if (x)").parse_statement(),
            Err(Error::UnexpectedEofInControlStatement(_))
        ));
        assert!(matches!(
            parser("while (x)").parse_statement(),
            Err(Error::UnexpectedEofInControlStatement(_))
        ));
    }

    #[test]
    fn stray_token_at_statement_start() {
        assert!(matches!(
            parser("1 {").parse_statement(),
            Err(Error::UnexpectedTokenAtStatement(_))
        ));
        assert!(matches!(
            parser("else;").parse_statement(),
            Err(Error::UnexpectedTokenAtStatement(_))
        ));
    }
}
