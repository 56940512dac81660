//! Chat application module for talking to the coach from a terminal.
//!
//! This module provides the pieces behind the `levelup-chat` binary: CLI
//! argument parsing and resolution against the environment, and slash
//! command parsing for session control.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_DB_PATH};
