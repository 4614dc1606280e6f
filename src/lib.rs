//! chatdesk is a terminal chat client for a single-endpoint chat backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, attachment, model selection, and send
//!   orchestration, plus configuration.
//! - [`api`] defines the wire types and the HTTP transport.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`commands`] implements the slash commands typed into the chat input.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
