//! Background workspace import processing for LAMUS.
//!
//! This crate provides:
//! - A task executor bounding how many imports run at once
//! - The workspace import runner driving one import from start to final status
//! - The workspace manager admitting new workspaces under the pre-lock

pub mod executor;
pub mod jobs;
pub mod manager;

pub use executor::TaskExecutor;
pub use jobs::{ImportReport, WorkspaceImportRunner};
pub use manager::{CreatedWorkspace, WorkspaceManager};
