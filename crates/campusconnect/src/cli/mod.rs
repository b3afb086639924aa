//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the campusconnect binary.

mod commands;
mod media;

pub use commands::{Cli, Commands, MediaCommands};
pub use media::handle_media_command;
