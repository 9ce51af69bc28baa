//! # lamus-storage
//!
//! Filesystem side of the workspace importer: where workspace files go
//! ([`PathResolver`]) and how they are written and enumerated
//! ([`WorkspaceFileHandler`]).

pub mod files;
pub mod path;

pub use files::{LocalWorkspaceFiles, WorkspaceFileHandler};
pub use path::PathResolver;
