//! Background jobs.

pub mod import;

pub use import::{ImportReport, WorkspaceImportRunner};
