use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use rill::back::Environment;
use rill::front::{Interactive, Lexer, LineSource, Stream};
use rill::vm::Interp;

/// Run rill programs, one statement at a time.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Script to run; reads standard input interactively when omitted.
    script: Option<PathBuf>,

    /// Print each parsed statement before executing it.
    #[arg(long)]
    emit_ast: bool,
}

fn main() {
    let args = Args::parse();
    let status = match args.script {
        Some(path) => {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    eprintln!("failed to open {}: {}", path.display(), error);
                    process::exit(1);
                }
            };
            run(Stream::new(BufReader::new(file)), false, args.emit_ast)
        }
        None => run(Interactive::new(io::stdin().lock(), io::stdout()), true, args.emit_ast),
    };
    process::exit(status);
}

fn run<S: LineSource>(source: S, echo: bool, emit_ast: bool) -> i32 {
    let mut parser = rill::front::Parser::new(Lexer::new(source));
    let mut environment = Environment::new(Interp::default());
    loop {
        let statement = match parser.parse_statement() {
            Ok(Some(statement)) => statement,
            Ok(None) => return 0,
            Err(error) => {
                let _ = error.report(parser.lexer().lines(), &mut io::stderr());
                return 1;
            }
        };
        if emit_ast {
            eprintln!("{:#?}", statement.0);
        }
        match environment.execute(&statement) {
            Ok(value) => {
                if echo {
                    if let Some(value) = value {
                        println!("{}", value);
                    }
                }
            }
            Err(error) => {
                let _ = error.report(parser.lexer().lines(), &mut io::stderr());
                return 1;
            }
        }
    }
}
