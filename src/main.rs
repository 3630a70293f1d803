//! cxxparse CLI
//!
//! A thin wrapper over the library: read a header, run the parser, print
//! the result.
//!
//! ```text
//! cxxparse <COMMAND>
//!
//! Commands:
//!   lex    Tokenize a header and display the token stream
//!   parse  Parse a header and print the declaration tree
//! ```

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use cxxparse::diagnostics::DiagnosticEmitter;
use cxxparse::options::{MethodBody, ParserOptions};
use cxxparse::{Lexer, SourceText, TokenKind};

/// Parse preprocessed C++ headers into a declaration tree.
#[derive(Parser)]
#[command(name = "cxxparse")]
#[command(version)]
#[command(about = "Parse preprocessed C++ headers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a header and display the token stream
    Lex(InputArgs),
    /// Parse a header and print the declaration tree
    Parse(ParseArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Path to the header (use `-` for stdin)
    file: String,
}

#[derive(Args)]
struct ParseArgs {
    /// Path to the header (use `-` for stdin)
    file: String,

    /// Print the tree as JSON instead of the debug form
    #[arg(long)]
    json: bool,

    /// Retain function bodies as token runs
    #[arg(long)]
    bodies: bool,

    /// Type names to treat as known (repeatable)
    #[arg(long = "type", value_name = "NAME")]
    types: Vec<String>,
}

fn read_input(file: &str) -> std::io::Result<String> {
    if file == "-" {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(file)
    }
}

fn cmd_lex(args: &InputArgs) -> ExitCode {
    let content = match read_input(&args.file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: {}: {err}", args.file);
            return ExitCode::FAILURE;
        }
    };

    let source = SourceText::new(&args.file, &content);
    for token in Lexer::new(&source, true) {
        if token.kind == TokenKind::Eof {
            break;
        }
        let text = &source.text()[token.span.start..token.span.end];
        println!(
            "{:>5}:{:<3} {:?} {:?}",
            token.location.line, token.location.column, token.kind, text
        );
    }
    ExitCode::SUCCESS
}

fn cmd_parse(args: &ParseArgs) -> ExitCode {
    let content = match read_input(&args.file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: {}: {err}", args.file);
            return ExitCode::FAILURE;
        }
    };

    let mut options = ParserOptions::default();
    if args.bodies {
        options.method_body = MethodBody::RetainTokens;
    }
    options
        .known_type_names
        .extend(args.types.iter().cloned());

    match cxxparse::parse_string(&content, Some(&args.file), Some(options)) {
        Ok(parsed) => {
            let emitter = DiagnosticEmitter::new(&args.file, &content);
            for diagnostic in &parsed.diagnostics {
                emitter.emit_diagnostic(diagnostic);
            }
            if args.json {
                match serde_json::to_string_pretty(&parsed.unit) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("error: serialization failed: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{:#?}", parsed.unit);
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            let emitter = DiagnosticEmitter::new(&args.file, &content);
            for diagnostic in &failure.diagnostics {
                emitter.emit_diagnostic(diagnostic);
            }
            emitter.emit(&failure.error);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Lex(args) => cmd_lex(args),
        Commands::Parse(args) => cmd_parse(args),
    }
}
