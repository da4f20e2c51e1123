use super::theme::{rgb_to_ansi256, Theme};
use console::Style;
use once_cell::sync::Lazy;

pub mod names {
    pub const HEADING: &str = "heading";
    pub const NAME: &str = "name";
    pub const OPTION: &str = "option";
    pub const VALUE: &str = "value";
    pub const HINT: &str = "hint";
}

pub static HELP_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add(names::HEADING, Style::new().bold())
        .add(names::NAME, Style::new().cyan())
        .add(names::OPTION, Style::new().green())
        .add(names::VALUE, Style::new().yellow())
        .add(
            names::HINT,
            Style::new()
                .color256(rgb_to_ansi256((154, 154, 154)))
                .italic(),
        )
});
