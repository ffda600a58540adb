use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing::debug;

use kiwi_interpreter::{Environment, Evaluator};
use kiwi_parser::{lexer::Lexer, parser::ParseError, parser::Parser};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn repl() -> Result<(), ReadlineError> {
    println!("kiwi language v{}", VERSION);

    // One environment for the whole session so bindings survive between lines
    let env = Rc::new(RefCell::new(Environment::new()));

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                if line.trim() == "exit" || line.trim() == "quit" {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                let l = Lexer::new(&line);
                let mut p = Parser::new(l);

                match p.parse_program() {
                    Ok(prog) => {
                        let mut e = Evaluator::new_with_env(Rc::clone(&env));
                        println!("{}", e.eval(&prog));
                    }
                    Err(errors) => {
                        println!("{}", format_parse_errors(&errors));
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    debug!("session ended");
    Ok(())
}

/// Outcome of running a whole script at once.
#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// The printed result of evaluation
    Value(String),
    /// The printed runtime error
    RuntimeError(String),
    /// Every parse error, already formatted; nothing was evaluated
    ParseErrors(String),
}

/// Parse `source` and, when it parses cleanly, evaluate it in a fresh environment.
pub fn run(source: &str) -> RunOutcome {
    let mut parser = Parser::new(Lexer::new(source));

    let prog = match parser.parse_program() {
        Ok(prog) => prog,
        Err(errors) => return RunOutcome::ParseErrors(format_parse_errors(&errors)),
    };

    let result = Evaluator::new().eval(&prog);
    if result.is_error() {
        RunOutcome::RuntimeError(result.to_string())
    } else {
        RunOutcome::Value(result.to_string())
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    let mut out = String::from("Parser errors:");
    for error in errors {
        out.push_str("\n\t");
        out.push_str(&error.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::repl::{run, RunOutcome};

    #[test]
    fn run_scripts() {
        let tests = vec![
            (
                "let fact = fn(n) { if n < 2 { 1 } else { n * fact(n - 1) } }; fact(5)",
                RunOutcome::Value("120".to_owned()),
            ),
            ("let x = 1;", RunOutcome::Value("nil".to_owned())),
            (
                "1 / 0",
                RunOutcome::RuntimeError("error: division by zero".to_owned()),
            ),
            (
                "let = 1; let y 2;",
                RunOutcome::ParseErrors(
                    "Parser errors:\n\texpected token identifier, found = (at 1:5)\n\texpected token =, found 2 (at 1:16)"
                        .to_owned(),
                ),
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "input: {}", input);
        }
    }
}
