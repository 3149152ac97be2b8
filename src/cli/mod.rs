//! CLI module for toolsync - command-line interface.

pub mod commands;

pub use commands::Cli;
