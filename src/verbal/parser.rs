//! # Command Tokenizer
//!
//! Turns a raw command string into a lazy sequence of [`CommandPart`]s.
//!
//! The grammar is the usual shell-ish one:
//!
//! ```text
//! command      := (whitespace* part)* whitespace*
//! part         := long_form | short_form | positional
//! long_form    := "--" key ("=" value)?
//! short_form   := "-" shortkeys (whitespace value)?
//! positional   := quoted | bareword
//! value        := quoted | bareword
//! quoted       := ('"' ... '"') | ("'" ... "'")
//! ```
//!
//! The parser never copies text. Every part refers back into the original string
//! through [`StringReference`]s, and the cursor only ever moves forward. Inside a
//! quoted scan a quote preceded by `\` does not terminate the scan; the backslash
//! is kept in the referenced text (see [`unescape`]).
//!
//! A short-form cluster such as `-abc` is expanded into one part per character.
//! Only a single-character short form may carry a value: `-abc value` is rejected
//! with [`ParseError::ClusteredShortValue`].

use crate::error::ParseError;
use crate::reference::StringReference;
use std::collections::VecDeque;
use tracing::trace;

const ESCAPE: u8 = b'\\';

/// One lexical unit of a command string.
///
/// Positional tokens keep their text in `key` and never carry a `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandPart {
    pub is_argument: bool,
    pub is_short_form: bool,
    pub key: StringReference,
    pub value: Option<StringReference>,
}

impl CommandPart {
    pub fn is_long_form(&self) -> bool {
        self.is_argument && !self.is_short_form
    }
}

/// Single-pass tokenizer over a command string.
///
/// Restarting means constructing a new parser over the same string.
pub struct CommandParser<'a> {
    command: &'a str,
    position: usize,
    pending: VecDeque<CommandPart>,
    failed: bool,
}

impl<'a> CommandParser<'a> {
    pub fn new(command: &'a str) -> Self {
        Self {
            command,
            position: 0,
            pending: VecDeque::new(),
            failed: false,
        }
    }

    pub fn command(&self) -> &'a str {
        self.command
    }

    /// Returns the text a reference points at.
    pub fn get_string(&self, reference: StringReference) -> &'a str {
        reference.resolve(self.command)
    }

    fn peek(&self) -> Option<u8> {
        self.command.as_bytes().get(self.position).copied()
    }

    fn consume(&mut self) {
        self.position = (self.position + 1).min(self.command.len());
    }

    fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.consume();
        }
    }

    /// Consumes characters up to (not including) the first one matching `stop`.
    fn scan_to(&mut self, stop: impl Fn(u8) -> bool) -> StringReference {
        let start = self.position;
        while self.peek().is_some_and(|c| !stop(c)) {
            self.consume();
        }
        StringReference::span(start, self.position)
    }

    /// Scans a quoted run whose opening quote was already consumed, and consumes
    /// the closing quote. An unterminated quote runs to the end of input.
    fn scan_quoted(&mut self, quote: u8) -> StringReference {
        let start = self.position;
        let mut prev = 0u8;
        while let Some(c) = self.peek() {
            if c == quote && prev != ESCAPE {
                let reference = StringReference::span(start, self.position);
                self.consume();
                return reference;
            }
            prev = c;
            self.consume();
        }
        StringReference::span(start, self.position)
    }

    fn read_value(&mut self) -> StringReference {
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.consume();
                self.scan_quoted(q)
            }
            _ => self.scan_to(|c| c.is_ascii_whitespace()),
        }
    }

    fn long_form(&mut self) -> CommandPart {
        let key = self.scan_to(|c| c == b'=' || c.is_ascii_whitespace());
        let value = if self.consume_if(b'=') {
            Some(self.read_value())
        } else {
            None
        };

        CommandPart {
            is_argument: true,
            is_short_form: false,
            key,
            value,
        }
    }

    fn short_form(&mut self) -> Result<CommandPart, ParseError> {
        let key = self.scan_to(|c| c.is_ascii_whitespace());

        let mut value = None;
        if !key.is_empty() {
            self.consume_whitespace();
            if self.peek().is_some_and(|c| c != b'-') {
                value = Some(self.read_value());
            }
        }

        let cluster = self.get_string(key);
        if value.is_some() && cluster.chars().count() > 1 {
            return Err(ParseError::ClusteredShortValue {
                cluster: cluster.to_string(),
            });
        }

        Ok(CommandPart {
            is_argument: true,
            is_short_form: true,
            key,
            value,
        })
    }

    fn positional(&mut self) -> CommandPart {
        let key = self.read_value();
        CommandPart {
            is_argument: false,
            is_short_form: false,
            key,
            value: None,
        }
    }

    fn try_command_part(&mut self) -> Option<Result<CommandPart, ParseError>> {
        self.consume_whitespace();

        if self.peek()? == b'-' {
            self.consume();
            if self.consume_if(b'-') {
                return Some(Ok(self.long_form()));
            }
            return Some(self.short_form());
        }

        Some(Ok(self.positional()))
    }

    /// Splits a short-form cluster into one part per character.
    fn expand_cluster(&mut self, part: CommandPart) {
        let text = self.get_string(part.key);
        for (offset, ch) in text.char_indices() {
            self.pending.push_back(CommandPart {
                is_argument: true,
                is_short_form: true,
                key: StringReference::new(part.key.start + offset, ch.len_utf8()),
                value: None,
            });
        }
    }
}

impl Iterator for CommandParser<'_> {
    type Item = Result<CommandPart, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(part) = self.pending.pop_front() {
            return Some(Ok(part));
        }
        if self.failed {
            return None;
        }

        match self.try_command_part()? {
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
            Ok(part) if part.is_short_form && self.get_string(part.key).chars().count() > 1 => {
                self.expand_cluster(part);
                self.pending.pop_front().map(Ok)
            }
            Ok(part) => {
                trace!(
                    token = self.get_string(part.key),
                    argument = part.is_argument,
                    "token"
                );
                Some(Ok(part))
            }
        }
    }
}

/// Tokenizes a command string.
pub fn parse(command: &str) -> CommandParser<'_> {
    CommandParser::new(command)
}

/// Strips the escape character from escaped quotes in quoted text.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('"') | Some('\'')) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Rebuilds a command string from already-split process arguments.
///
/// Tokenizing the result and unescaping each token gives back the original
/// arguments. Arguments that need quoting are wrapped in double quotes with
/// every quote character escaped. A quoted argument ending in `\` cannot be
/// closed and is rejected.
pub fn command_line_from_args<I, S>(args: I) -> Result<String, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted = args
        .into_iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(" "))
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn quote_arg(arg: &str) -> Result<String, ParseError> {
    let needs_quotes = arg.is_empty()
        || arg.chars().any(char::is_whitespace)
        || arg.starts_with(is_quote)
        || arg.contains("\\\"")
        || arg.contains("\\'");

    if !needs_quotes {
        return Ok(arg.to_string());
    }

    // Long-form values are only read after `=`, so quote just the value part.
    if let Some(rest) = arg.strip_prefix("--") {
        if let Some((key, value)) = rest.split_once('=') {
            if !key.chars().any(char::is_whitespace) {
                return Ok(format!("--{}={}", key, quote_arg(value)?));
            }
        }
    }

    if arg.ends_with('\\') {
        return Err(ParseError::UnrepresentableArgument {
            argument: arg.to_string(),
        });
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if is_quote(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}
