//! # Verbal Architecture
//!
//! Verbal is a **command-line execution engine**. A host declares a tree of verbs
//! and commands once; verbal takes a raw command string (or the process arguments),
//! resolves it to a command, binds typed arguments, runs the handler, and shows
//! usage help when the line does not make sense.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (declare.rs)                                          │
//! │  - VerbDecl / CommandDecl / ParamDecl builders              │
//! │  - Handlers: sync closures or futures                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model (decorator.rs → model.rs)                            │
//! │  - Read-only Verb / Command / Parameter tree                │
//! │  - Case-insensitive names, option keys, value order         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Executor (executor.rs)                                     │
//! │  - Pulls tokens from the parser (parser.rs)                 │
//! │  - Resolves verbs, binds options/values/globals             │
//! │  - Converts raw text (convert.rs), fills defaults           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Output (output.rs, help/, version.rs)                      │
//! │  - Help rendered from the same model through templates      │
//! │  - OutputSink: console or in-memory buffer                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Zero-Copy Tokens
//!
//! The parser never copies text. Each [`parser::CommandPart`] holds
//! [`reference::StringReference`]s into the command string, and text is only
//! materialized when a value is converted. Tokens keep their escape
//! characters; the executor runs [`parser::unescape`] on text before converting it.
//!
//! ## Failures
//!
//! A command line that does not fit the tree is not an error. The executor writes
//! a one-line message to the sink's error channel, renders help for the verb or
//! command the problem was found in, and returns [`executor::Outcome::Rejected`].
//! [`error::VerbalError`] is reserved for handler, rendering, I/O and config
//! failures.
//!
//! ## Logging
//!
//! The library only emits `tracing` events (token-level at `trace`, resolution and
//! binding at `debug`). Installing a subscriber is left to the host.
//!
//! ## Testing Strategy
//!
//! 1. **Parser, converter, decorator, help**: unit tests beside each module.
//! 2. **Executor**: resolution and binding tests against an in-memory sink.
//! 3. **End to end**: `tests/scenarios.rs` drives whole command lines through a
//!    docker-like tree; `tests/demo_cli.rs` runs the demo binary.
//!
//! ## Module Overview
//!
//! - [`parser`]: Tokenizer and process-argument reassembly
//! - [`declare`]: Builders the host declares its tree with
//! - [`model`]: The resolved tree, types and values
//! - [`executor`]: Resolution, binding and invocation
//! - [`help`]: Usage help rendering
//! - [`config`]: Executor options and their JSON file
//! - [`api`]: One-call entry points

pub mod api;
pub mod arguments;
pub mod config;
pub mod convert;
pub mod declare;
pub mod decorator;
pub mod error;
pub mod executor;
pub mod globals;
pub mod help;
pub mod model;
pub mod output;
pub mod parser;
pub mod reference;
pub mod version;
