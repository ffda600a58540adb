use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;

mod repl;

use repl::RunOutcome;

/// kiwi is a small expression language with first-class functions and closures.
/// Without arguments an interactive session is started.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run instead of starting the interactive session
    file: Option<PathBuf>,

    /// Evaluate the given source instead of reading a file
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,
}

/// Install a tracing subscriber only if RUST_LOG is set, so normal output stays clean.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let source = match (args.eval, args.file) {
        (Some(source), _) => source,
        (None, Some(path)) => match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Failed to read the input file '{}': {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        (None, None) => {
            return match repl::repl() {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            };
        }
    };

    match repl::run(&source) {
        RunOutcome::Value(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        RunOutcome::RuntimeError(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
        RunOutcome::ParseErrors(errors) => {
            eprintln!("{errors}");
            ExitCode::FAILURE
        }
    }
}
