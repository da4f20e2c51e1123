//! Entry points for hosts that just want to run a command line.

use crate::config::ExecutorOptions;
use crate::declare::VerbDecl;
use crate::error::Result;
use crate::executor::{Executor, Outcome};
use crate::globals::GlobalOptions;
use crate::output::ConsoleOutput;
use crate::parser::command_line_from_args;

/// The current process arguments, minus the program, as one command string.
pub fn command_line() -> Result<String> {
    Ok(command_line_from_args(std::env::args().skip(1))?)
}

/// Runs `command` against `root` with console output.
///
/// Without a command string the process arguments are used.
pub async fn run(
    root: &VerbDecl,
    command: Option<&str>,
    options: ExecutorOptions,
    globals: Option<GlobalOptions>,
) -> Result<Outcome> {
    let command = match command {
        Some(command) => command.to_string(),
        None => command_line()?,
    };
    let mut executor = Executor::new(ConsoleOutput).with_options(options);
    if let Some(globals) = globals {
        executor = executor.with_global_options(globals);
    }
    executor.execute(&command, root).await
}
