use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use toy_lexer::{Lexeme, Lexer, Payload, ReaderSource, SourceError};

mod logging;

#[derive(Parser)]
#[command(name = "toy")]
#[command(about = "Toy language lexer")]
#[command(version)]
struct Cli {
    /// Log filter used when TOY_LOG is unset (e.g. `debug`, `toy::lexer=trace`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every token of a .toy file with its location
    Tokens {
        /// Input .toy file, or `-` for standard input
        path: String,
    },

    /// Lex a .toy file to the end without printing tokens
    Check {
        /// Input .toy file, or `-` for standard input
        path: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("error opening {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("error reading {path}: {source}")]
    Read { path: String, source: SourceError },

    #[error("error writing output: {0}")]
    Write(#[from] io::Error),
}

type Input = ReaderSource<Box<dyn BufRead>>;

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let result = match cli.command {
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Check { path } => cmd_check(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn source_name(path: &str) -> &str {
    if path == "-" {
        "<stdin>"
    } else {
        path
    }
}

fn open_input(path: &str) -> Result<Input, CliError> {
    if path == "-" {
        return Ok(ReaderSource::new(Box::new(io::stdin().lock())));
    }

    let p = Path::new(path);
    if !p.exists() {
        return Err(CliError::NotFound(path.to_string()));
    }
    let file = File::open(p).map_err(|source| CliError::Open {
        path: path.to_string(),
        source,
    })?;
    Ok(ReaderSource::new(Box::new(BufReader::new(file))))
}

/// Surface a read failure that cut the token stream short.
fn finish(path: &str, input: &mut Input) -> Result<(), CliError> {
    match input.take_error() {
        Some(source) => Err(CliError::Read {
            path: path.to_string(),
            source,
        }),
        None => Ok(()),
    }
}

fn cmd_tokens(path: &str) -> Result<(), CliError> {
    let mut input = open_input(path)?;
    let mut out = BufWriter::new(io::stdout().lock());

    for lexeme in Lexer::new(source_name(path), &mut input) {
        writeln!(out, "{}", format_lexeme(&lexeme))?;
    }
    out.flush()?;

    finish(path, &mut input)
}

fn cmd_check(path: &str) -> Result<(), CliError> {
    let mut input = open_input(path)?;
    let count = Lexer::new(source_name(path), &mut input).count();
    finish(path, &mut input)?;

    tracing::debug!(target: "toy::cli", path, lines = input.lines_read(), "Lexed input");
    eprintln!("OK: {path} ({count} tokens)");
    Ok(())
}

/// One output line: location, token, then the payload if there is one.
fn format_lexeme(lexeme: &Lexeme) -> String {
    match &lexeme.payload {
        Payload::None => format!("{}\t{}", lexeme.location, lexeme.token),
        Payload::Identifier(text) => format!("{}\t{}\t{text}", lexeme.location, lexeme.token),
        Payload::Number(value) => format!("{}\t{}\t{value}", lexeme.location, lexeme.token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(source: &str) -> Vec<String> {
        Lexer::tokenize("t.toy", source)
            .iter()
            .map(format_lexeme)
            .collect()
    }

    #[test]
    fn test_format_lexemes() {
        assert_eq!(
            formatted("var x = 2.5;"),
            vec![
                "t.toy:0:0\tvar",
                "t.toy:0:4\tidentifier\tx",
                "t.toy:0:6\t'='",
                "t.toy:0:8\tnumber\t2.5",
                "t.toy:0:11\t';'",
                "t.toy:0:12\teof",
            ]
        );
    }

    #[test]
    fn test_stdin_name() {
        assert_eq!(source_name("-"), "<stdin>");
        assert_eq!(source_name("a.toy"), "a.toy");
    }

    #[test]
    fn test_missing_file() {
        let Err(err) = open_input("definitely/not/here.toy") else {
            panic!("missing file opened");
        };
        assert!(matches!(err, CliError::NotFound(_)));
        assert_eq!(err.to_string(), "file not found: definitely/not/here.toy");
    }

    struct Failing;

    impl io::Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_read_failure_is_reported() {
        let reader: Box<dyn BufRead> = Box::new(BufReader::new(Failing));
        let mut input = ReaderSource::new(reader);
        let count = Lexer::new("broken.toy", &mut input).count();
        assert_eq!(count, 1); // Just EOF

        let Err(err) = finish("broken.toy", &mut input) else {
            panic!("read failure was swallowed");
        };
        assert!(matches!(err, CliError::Read { .. }));
        assert_eq!(
            err.to_string(),
            "error reading broken.toy: failed to read input line 0: disk on fire"
        );
    }

    #[test]
    fn test_clean_input_finishes() {
        let reader: Box<dyn BufRead> = Box::new(io::Cursor::new("def f;\n"));
        let mut input = ReaderSource::new(reader);
        assert_eq!(Lexer::new("ok.toy", &mut input).count(), 4);
        assert!(finish("ok.toy", &mut input).is_ok());
    }

    #[test]
    fn test_cli_parses_global_log_level() {
        let cli = Cli::try_parse_from(["toy", "check", "a.toy", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Command::Check { ref path } if path == "a.toy"));
    }
}
