//! # Demo CLI
//!
//! `setup` owns the host flags (parsed with clap) and logging; `sample` declares
//! the command tree. The flags only configure the executor: help, version and
//! all command syntax belong to verbal itself.

mod sample;
pub mod setup;

use clap::Parser;
use directories::ProjectDirs;
use setup::Cli;
use std::path::PathBuf;
use tracing::debug;
use verbal::config::{ColorChoice, ExecutorOptions};
use verbal::error::Result;
use verbal::executor::{Executor, Outcome};
use verbal::output::ConsoleOutput;
use verbal::parser::command_line_from_args;

/// Exit code for a rejected command line.
pub const REJECTED: i32 = 2;

fn config_dir(cli: &Cli) -> Option<PathBuf> {
    cli.config_dir.clone().or_else(|| {
        ProjectDirs::from("com", "verbal", "verbal-demo").map(|dirs| dirs.config_dir().to_path_buf())
    })
}

pub async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup::init_logging(&cli.log_level);

    let mut options = match config_dir(&cli) {
        Some(dir) => {
            debug!(dir = %dir.display(), "Loading options");
            ExecutorOptions::load(dir)?
        }
        None => ExecutorOptions::default(),
    };
    if options.program_name.is_none() {
        options.program_name = Some("verbal-demo".to_string());
    }
    if cli.no_color {
        options.color = ColorChoice::Never;
        colored::control::set_override(false);
    }

    let command = command_line_from_args(&cli.command)?;
    let mut executor = Executor::new(ConsoleOutput)
        .with_options(options)
        .with_global_options(sample::global_options());

    let outcome = executor.execute(&command, &sample::tree()).await?;
    Ok(match outcome {
        Outcome::Rejected { .. } => REJECTED,
        _ => 0,
    })
}
