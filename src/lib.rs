//! Toolsync - keep third-party tools in sync with their upstream releases
//!
//! Each configured tool is resolved against its upstream (a release API, a
//! direct URL, or a vendor download page), compared with what is installed
//! locally, and then checked, downloaded into a package cache, or updated
//! by running its install steps. Tools are processed concurrently and
//! independently.

pub mod action;
pub mod command;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod local;
pub mod remote;
pub mod repo;
pub mod template;
pub mod version;

pub use error::{Result, SyncError};
