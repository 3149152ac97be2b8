//! Domain types for a single run over the configured tools.

pub mod package;
pub mod resolved;

pub use package::PackageFormat;
pub use resolved::{RemoteRelease, ResolvedTool, ToolDirs, ToolSnapshot};
