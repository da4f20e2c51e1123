//! Styled help rendering.
//!
//! Help templates carry no ANSI codes. They tag text with the `style` filter
//! (`{{ name | style("name") }}`) and the [`Theme`] maps each tag to a
//! `console::Style`. With color off the filter returns the text unchanged.

use console::Style;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use std::collections::HashMap;

/// Marks text tagged with a style the theme does not define.
const UNKNOWN_STYLE: &str = "(!?)";

#[derive(Clone, Default)]
pub struct Styles {
    styles: HashMap<String, Style>,
}

impl Styles {
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    /// Styles `text` regardless of terminal detection; callers decide on color.
    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.styles.get(name) {
            Some(style) => style.clone().force_styling(true).apply_to(text).to_string(),
            None => format!("{} {}", UNKNOWN_STYLE, text),
        }
    }

    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.styles.contains_key(name) {
            text.to_string()
        } else {
            format!("{} {}", UNKNOWN_STYLE, text)
        }
    }
}

/// The style set help templates are rendered with.
#[derive(Clone, Default)]
pub struct Theme {
    styles: Styles,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles = self.styles.add(name, style);
        self
    }
}

/// Help templates registered in one environment, so they can include each other.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Block tags swallow their trailing newline, so a line holding only a
    /// tag produces no output.
    pub fn with_color(theme: &Theme, use_color: bool) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        let styles = theme.styles.clone();
        env.add_filter("style", move |value: Value, name: String| -> String {
            let text = value.to_string();
            if use_color {
                styles.apply(&name, &text)
            } else {
                styles.apply_plain(&name, &text)
            }
        });
        Self { env }
    }

    /// Syntax errors surface here rather than at render time.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, Error> {
        self.env.get_template(name)?.render(data)
    }
}

/// Nearest ANSI 256-color palette index for an RGB triplet.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        match r {
            0..=7 => 16,
            249..=255 => 231,
            _ => 232 + ((r as u16 - 8) * 24 / 247) as u8,
        }
    } else {
        let level = |c: u8| (c as u16 * 5 / 255) as u8;
        16 + 36 * level(r) + 6 * level(g) + level(b)
    }
}
