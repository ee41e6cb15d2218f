//! Defines the command-line arguments and subcommands for the Kacket CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "kacket",
    version,
    about = "Read Scheme-family source and print its desugared core forms."
)]
pub struct KacketArgs {
    /// Log filter used when RUST_LOG is not set (e.g. `debug`, `kacket=trace`).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print each top-level form in its canonical desugared shape.
    Parse {
        /// The source file to read, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the trees as a JSON array instead of source text.
        #[arg(long)]
        json: bool,
        /// Disable the built-in `define-datatype` and `cases` extensions.
        #[arg(long)]
        no_std: bool,
    },
    /// Print the token stream, one token per line.
    Tokens {
        /// The source file to read, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse everything and report how many forms were read.
    Check {
        /// The source file to read, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
        /// Disable the built-in `define-datatype` and `cases` extensions.
        #[arg(long)]
        no_std: bool,
    },
}
