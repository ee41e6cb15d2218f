//! The Kacket Command-Line Interface.
//!
//! A thin driver over the library: it reads a file (or stdin), runs the
//! lexer or parser over it, and renders any error as a `miette` report with
//! the source attached.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use clap::Parser as _;
use miette::{IntoDiagnostic, Report};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, KacketArgs};
use crate::cli::output::{print_summary, OutputSink, StdoutSink};
use crate::extensions::ExtensionRegistry;
use crate::syntax::{Lexer, Parser};
use crate::KacketError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = KacketArgs::parse();
    init_tracing(&args.log_level);

    let result = match args.command {
        Command::Parse { file, json, no_std } => read_source(&file)
            .and_then(|(name, text)| handle_parse(&name, &text, json, registry(no_std), &mut StdoutSink)),
        Command::Tokens { file } => {
            read_source(&file).and_then(|(name, text)| handle_tokens(&name, &text, &mut StdoutSink))
        }
        Command::Check { file, no_std } => read_source(&file).and_then(|(name, text)| {
            let forms = parse_all(&name, &text, registry(no_std))?;
            print_summary(&name, forms.len());
            Ok(())
        }),
    };

    if let Err(report) = result {
        eprintln!("{:?}", report);
        process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn registry(no_std: bool) -> ExtensionRegistry {
    if no_std {
        ExtensionRegistry::new()
    } else {
        ExtensionRegistry::with_std()
    }
}

/// Reads `path`, or stdin when `path` is `-`. Returns the display name and text.
fn read_source(path: &Path) -> miette::Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).into_diagnostic()?;
        return Ok(("<stdin>".to_string(), text));
    }
    let text = fs::read_to_string(path).into_diagnostic()?;
    Ok((path.display().to_string(), text))
}

fn report(error: KacketError, name: &str, text: &str) -> Report {
    Report::new(error.with_source(name, text))
}

/// Parses every form in `text`, attaching the source to any error.
pub fn parse_all(
    name: &str,
    text: &str,
    registry: ExtensionRegistry,
) -> miette::Result<Vec<crate::ast::Expr>> {
    let forms = Parser::from_source_with_registry(text, registry)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| report(e, name, text))?;
    info!(source = name, forms = forms.len(), "parsed source");
    Ok(forms)
}

/// Handles the `parse` subcommand.
pub fn handle_parse(
    name: &str,
    text: &str,
    json: bool,
    registry: ExtensionRegistry,
    sink: &mut dyn OutputSink,
) -> miette::Result<()> {
    let forms = parse_all(name, text, registry)?;
    if json {
        let rendered = serde_json::to_string_pretty(&forms).into_diagnostic()?;
        sink.emit(&rendered);
    } else {
        for form in &forms {
            sink.emit(&form.to_string());
        }
    }
    Ok(())
}

/// Handles the `tokens` subcommand.
pub fn handle_tokens(name: &str, text: &str, sink: &mut dyn OutputSink) -> miette::Result<()> {
    for token in Lexer::from_source(text) {
        let token = token.map_err(|e| report(e, name, text))?;
        sink.emit(&format!("{}\t{}", token.span, token.token));
    }
    Ok(())
}
