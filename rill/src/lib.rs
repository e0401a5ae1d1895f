//! An expression-oriented scripting language, executed a statement at a
//! time.
//!
//! Source text flows through the front end ([`front::Lexer`],
//! [`front::Parser`]) into a span-annotated AST, and each top-level
//! statement is then lowered into its own [`back::Unit`] and run
//! immediately by a lowering target, with declared globals persisting
//! across units. The default target is the in-process interpreter in
//! [`vm`]; anything implementing [`back::Target`] can stand in for it.

use std::io;

pub mod back;
pub mod error;
pub mod front;
pub mod vm;

pub use error::Error;

use back::{Environment, Target};
use front::{Lexer, LineSource, Parser};

/// Parse and execute every statement from `source`, one unit at a time.
///
/// The first diagnostic is rendered to `errors` and ends the session.
/// Returns whether the session reached end of input cleanly.
pub fn run<S: LineSource, T: Target>(source: S, target: T, errors: &mut dyn io::Write) -> bool {
    let mut parser = Parser::new(Lexer::new(source));
    let mut environment = Environment::new(target);
    loop {
        let statement = match parser.parse_statement() {
            Ok(Some(statement)) => statement,
            Ok(None) => return true,
            Err(error) => {
                let _ = error.report(parser.lexer().lines(), errors);
                return false;
            }
        };
        if let Err(error) = environment.execute(&statement) {
            let _ = error.report(parser.lexer().lines(), errors);
            return false;
        }
    }
}
