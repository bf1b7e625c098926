// kplc: scanner, parser and scope checker for KPL

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use kplc::parser::lexer::tokenize;
use kplc::{compile, CompileOptions};

#[derive(Debug, Parser)]
#[command(name = "kplc", version, about)]
struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print every token of a source file
    Scan(ScanArgs),
    /// Parse and scope-check a source file
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Path to a KPL source file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Path to a KPL source file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,
    /// Print each token as the parser accepts it
    #[arg(long)]
    trace: bool,
    /// Print the program's symbol table
    #[arg(long)]
    symbols: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .init();

    let failed = match cli.command {
        Commands::Scan(args) => scan(&read_source(&args.input))?,
        Commands::Check(args) => check(&read_source(&args.input), &args)?,
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            info!(path = %path.display(), %err, "read failed");
            eprintln!("Can't read input file!");
            std::process::exit(1);
        }
    }
}

/// Returns true if any lexical error was found.
fn scan(source: &str) -> io::Result<bool> {
    let (tokens, errors) = tokenize(source);
    let mut out = io::stdout().lock();
    for token in &tokens {
        writeln!(out, "{}", token)?;
    }
    for err in &errors {
        eprintln!("{}", err);
    }
    Ok(!errors.is_empty())
}

/// Returns true if the program failed to compile.
fn check(source: &str, args: &CheckArgs) -> io::Result<bool> {
    let options = CompileOptions {
        trace_tokens: args.trace,
        ..CompileOptions::default()
    };
    let compilation = compile(source, &options);

    let mut out = io::stdout().lock();
    for token in &compilation.trace {
        writeln!(out, "{}", token)?;
    }
    if args.symbols {
        write!(out, "{}", compilation.symbols)?;
    }
    out.flush()?;
    for diagnostic in &compilation.diagnostics {
        eprintln!("{}", diagnostic);
    }

    Ok(!compilation.is_success())
}
