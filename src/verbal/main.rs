//! # Verbal Demo
//!
//! A small host for the verbal library: a docker-like command tree whose handlers
//! print what they were bound with. Everything after the host flags is joined
//! back into one command string and handed to the executor.
//!
//! ```text
//! verbal-demo [--log-level LEVEL] [--config-dir DIR] [--no-color] COMMAND...
//! ```
//!
//! The exit code is 0 when a handler ran or help/version was shown, 2 when the
//! command line was rejected, and 1 on any other error.

mod cli;

#[tokio::main]
async fn main() {
    match cli::run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
