//! Help output templates.
//!
//! Templates live as standalone `.tmp` files next to this module and are
//! embedded at compile time. The renderer enables block trimming, so a line
//! holding only a `{% %}` tag emits nothing and every other line ends exactly
//! where it appears to.
//!
//! Layout math (padding, wrapping, the hanging indent of continuation lines)
//! happens in Rust; templates only arrange the pieces and pick styles.

pub const TABLE_TEMPLATE: &str = include_str!("templates/table.tmp");
pub const VERB_TEMPLATE: &str = include_str!("templates/verb.tmp");
pub const COMMAND_TEMPLATE: &str = include_str!("templates/command.tmp");
