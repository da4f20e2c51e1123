//! Where the executor writes help, version lines and error messages.

use colored::Colorize;
use console::Term;

pub trait OutputSink {
    fn write(&mut self, text: &str);

    fn error(&mut self, text: &str);

    /// Whether styled help should carry ANSI codes when color is left on auto.
    fn supports_color(&self) -> bool {
        false
    }
}

/// Writes to stdout, errors in red.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn write(&mut self, text: &str) {
        println!("{}", text.trim_end_matches('\n'));
    }

    fn error(&mut self, text: &str) {
        println!("{}", text.red());
    }

    fn supports_color(&self) -> bool {
        Term::stdout().features().colors_supported()
    }
}

/// Collects output in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferOutput {
    pub lines: Vec<String>,
    pub errors: Vec<String>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written, errors included, in order of arrival.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputSink for BufferOutput {
    fn write(&mut self, text: &str) {
        self.lines.push(text.trim_end_matches('\n').to_string());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_string());
        self.lines.push(text.to_string());
    }
}
