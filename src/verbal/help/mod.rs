//! # Help Rendering
//!
//! Usage help for verbs and commands, shown for the help flag and after every
//! rejected command line.
//!
//! Layout is computed here with Unicode-aware widths: name columns, padding and
//! word wrapping all happen before the data reaches a template. The templates
//! in `templates/` then lay the rows out and apply styles from [`styles`].
//!
//! Verb help lists child verbs and commands together, grouped by category
//! (`Commands` when none is declared) and sorted by name. The root verb also
//! shows the usage line with `[OPTIONS]` and the global options table when
//! global options exist.

pub mod styles;
pub mod templates;
pub mod theme;

use crate::config::ExecutorOptions;
use crate::globals::GlobalOptions;
use crate::model::{fold_name, Command, Parameter, ValueType, Verb};
use serde::Serialize;
use styles::{names, HELP_THEME};
use templates::{COMMAND_TEMPLATE, TABLE_TEMPLATE, VERB_TEMPLATE};
use theme::Renderer;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap width for help text in verb and command listings.
pub const HELP_WIDTH: usize = 55;
/// Wrap width for global option help.
pub const GLOBAL_HELP_WIDTH: usize = 46;

const DEFAULT_CATEGORY: &str = "Commands";
const LISTING_LEAD: usize = 2;
const LISTING_MIN_COLUMN: usize = 14;
const VALUE_LEAD: usize = 4;
const VALUE_COLUMN: usize = VALUE_LEAD + 20;
const OPTION_LEAD: usize = 4;
const OPTION_COLUMN: usize = OPTION_LEAD + 30;
const GLOBAL_LEAD: usize = 2;
const GLOBAL_COLUMN: usize = 33;

#[derive(Debug, Clone, Serialize, PartialEq)]
struct Row {
    lead: String,
    name: String,
    style: &'static str,
    pad: String,
    first: String,
    rest: Vec<String>,
    hang: String,
}

impl Row {
    /// A name followed by help text starting at `column`.
    ///
    /// A name that reaches the column pushes its help onto the next line.
    fn new(lead: usize, name: String, style: &'static str, column: usize, lines: Vec<String>) -> Self {
        let used = lead + name.width();
        let mut lines = lines.into_iter();
        let (pad, first) = match lines.next() {
            None => (String::new(), String::new()),
            Some(first) if used >= column => (format!("\n{}", " ".repeat(column)), first),
            Some(first) => (" ".repeat(column - used), first),
        };
        Self {
            lead: " ".repeat(lead),
            name,
            style,
            pad,
            first,
            rest: lines.collect(),
            hang: " ".repeat(column),
        }
    }
}

#[derive(Debug, Serialize)]
struct Group {
    title: String,
    rows: Vec<Row>,
}

#[derive(Debug, Serialize)]
struct VerbHelp {
    usage: String,
    help: Vec<String>,
    options: Vec<Row>,
    groups: Vec<Group>,
    footer: String,
}

#[derive(Debug, Serialize)]
struct CommandHelp {
    usage: String,
    help: Vec<String>,
    values: Vec<Row>,
    options: Vec<Row>,
}

/// Greedy word wrap to `width` display columns.
///
/// Explicit line breaks are kept; a word wider than `width` gets a line of its own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;
        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Cuts `text` to at most `width` display columns.
fn truncate(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// The label shown after a global option's forms.
pub fn type_label(value_type: &ValueType) -> Option<&'static str> {
    match value_type {
        ValueType::Bool => None,
        ValueType::I8
        | ValueType::I16
        | ValueType::I32
        | ValueType::I64
        | ValueType::U8
        | ValueType::U16
        | ValueType::U32
        | ValueType::U64 => Some("int"),
        ValueType::F32 | ValueType::F64 => Some("float"),
        ValueType::String | ValueType::Enum(_) => Some("string"),
        ValueType::Array(_) => Some("list"),
    }
}

/// `-a --all`, `   --filter=<value>`; booleans take no `=<value>`.
fn command_option_forms(parameter: &Parameter) -> String {
    let Some(forms) = parameter.forms() else {
        return parameter.name.clone();
    };
    let mut name = match forms.short {
        Some(c) => format!("-{}", c),
        None => "  ".to_string(),
    };
    match &forms.long {
        Some(long) => {
            name.push_str(" --");
            name.push_str(long);
            if !parameter.value_type.is_flag() {
                name.push_str("=<value>");
            }
        }
        None if !parameter.value_type.is_flag() => name.push_str(" <value>"),
        None => {}
    }
    name
}

/// `-c, --context string`, `    --config string`.
fn global_option_forms(parameter: &Parameter) -> String {
    let Some(forms) = parameter.forms() else {
        return parameter.name.clone();
    };
    let mut name = match (forms.short, &forms.long) {
        (Some(c), Some(long)) => format!("-{}, --{}", c, long),
        (Some(c), None) => format!("-{}", c),
        (None, Some(long)) => format!("    --{}", long),
        (None, None) => parameter.name.clone(),
    };
    if let Some(label) = type_label(&parameter.value_type) {
        name.push(' ');
        name.push_str(label);
    }
    name
}

/// Renders verb and command help with the executor's settings.
pub struct HelpRenderer<'a> {
    options: &'a ExecutorOptions,
    globals: Option<&'a GlobalOptions>,
    renderer: Renderer,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(
        options: &'a ExecutorOptions,
        globals: Option<&'a GlobalOptions>,
        use_color: bool,
    ) -> crate::error::Result<Self> {
        let mut renderer = Renderer::with_color(&HELP_THEME, use_color);
        renderer.add_template("table", TABLE_TEMPLATE)?;
        renderer.add_template("verb", VERB_TEMPLATE)?;
        renderer.add_template("command", COMMAND_TEMPLATE)?;
        Ok(Self {
            options,
            globals,
            renderer,
        })
    }

    pub fn verb_help(&self, verb: &Verb) -> crate::error::Result<String> {
        Ok(self.renderer.render("verb", &self.verb_data(verb))?)
    }

    pub fn command_help(&self, command: &Command) -> crate::error::Result<String> {
        Ok(self.renderer.render("command", &self.command_data(command))?)
    }

    fn globals(&self) -> Option<&'a GlobalOptions> {
        self.globals.filter(|g| !g.is_empty())
    }

    fn verb_data(&self, verb: &Verb) -> VerbHelp {
        let program = self.options.program_name();
        let usage = if verb.is_root {
            if self.globals().is_some() {
                format!("{} [OPTIONS] COMMAND", program)
            } else {
                format!("{} COMMAND", program)
            }
        } else {
            format!("{} {} COMMAND", program, verb.path.join(" "))
        };

        let options = match self.globals() {
            Some(globals) if verb.is_root => globals
                .iter()
                .map(|p| {
                    Row::new(
                        GLOBAL_LEAD,
                        global_option_forms(p),
                        names::OPTION,
                        GLOBAL_COLUMN,
                        p.help().map(|h| wrap(h, GLOBAL_HELP_WIDTH)).unwrap_or_default(),
                    )
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut entries: Vec<(&str, Option<&str>, Option<&str>)> = verb
            .verbs
            .values()
            .map(|v| (v.name.as_str(), v.category.as_deref(), v.help.as_deref()))
            .chain(
                verb.commands
                    .values()
                    .map(|c| (c.name.as_str(), c.category.as_deref(), c.help.as_deref())),
            )
            .collect();
        entries.sort_by_key(|(name, _, _)| fold_name(name));

        let column = entries
            .iter()
            .map(|(name, _, _)| LISTING_LEAD + name.width() + 2)
            .max()
            .unwrap_or(0)
            .max(LISTING_MIN_COLUMN);

        let mut groups: Vec<Group> = Vec::new();
        for (name, category, help) in entries {
            let title = format!("{}:", category.unwrap_or(DEFAULT_CATEGORY));
            let first_line = help.and_then(|h| h.lines().next()).unwrap_or("");
            let row = Row::new(
                LISTING_LEAD,
                name.to_string(),
                names::NAME,
                column,
                wrap(first_line, HELP_WIDTH),
            );
            match groups.iter_mut().find(|g| g.title == title) {
                Some(group) => group.rows.push(row),
                None => groups.push(Group {
                    title,
                    rows: vec![row],
                }),
            }
        }

        VerbHelp {
            usage,
            help: verb
                .help
                .as_deref()
                .map(|h| wrap(h, HELP_WIDTH))
                .unwrap_or_default(),
            options,
            groups,
            footer: format!(
                "For help with command syntax, type `COMMAND --{}` or `COMMAND -{}`",
                self.options.help_long_form, self.options.help_short_form
            ),
        }
    }

    fn command_data(&self, command: &Command) -> CommandHelp {
        let mut usage = vec![self.options.program_name()];
        usage.extend(command.path.iter().cloned());
        let values: Vec<String> = command.values().map(|p| format!("{{{}}}", p.name)).collect();
        if self.options.values_first {
            usage.extend(values);
            if command.has_options() {
                usage.push("[Options]".to_string());
            }
        } else {
            if command.has_options() {
                usage.push("[Options]".to_string());
            }
            usage.extend(values);
        }

        let value_rows = command
            .values()
            .map(|p| {
                Row::new(
                    VALUE_LEAD,
                    truncate(&p.name, VALUE_COLUMN - VALUE_LEAD - 1),
                    names::VALUE,
                    VALUE_COLUMN,
                    p.help().map(|h| wrap(h, HELP_WIDTH)).unwrap_or_default(),
                )
            })
            .collect();

        let option_rows = command
            .options()
            .map(|p| {
                let help = p.help().unwrap_or("");
                let help = if p.is_array() {
                    format!("(Array) {}", help)
                } else {
                    help.to_string()
                };
                Row::new(
                    OPTION_LEAD,
                    command_option_forms(p),
                    names::OPTION,
                    OPTION_COLUMN,
                    wrap(&help, HELP_WIDTH),
                )
            })
            .collect();

        CommandHelp {
            usage: usage.join(" "),
            help: command
                .help
                .as_deref()
                .map(|h| wrap(h, HELP_WIDTH))
                .unwrap_or_default(),
            values: value_rows,
            options: option_rows,
        }
    }
}
