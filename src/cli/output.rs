//! Handles all user-facing output for the CLI.
//!
//! Command handlers write through an [`OutputSink`] so tests can capture what
//! a command prints; colour is only applied to the terminal summary line.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Destination for command output.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// OutputBuffer: collects output into a String for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// StdoutSink: writes output to stdout for CLI use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Prints the `check` summary line in green.
pub fn print_summary(name: &str, forms: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    print!("ok");
    let _ = stdout.reset();
    let noun = if forms == 1 { "form" } else { "forms" };
    println!(": {} ({} {})", name, forms, noun);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_joins_lines() {
        let mut buffer = OutputBuffer::new();
        buffer.emit("(define x 10)");
        buffer.emit("x");
        assert_eq!(buffer.as_str(), "(define x 10)\nx");
        assert_eq!(buffer.lines(), vec!["(define x 10)", "x"]);
    }
}
