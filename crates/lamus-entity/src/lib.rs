//! # lamus-entity
//!
//! Domain entity models for the LAMUS workspace importer. Every struct in
//! this crate represents a database table row or a domain value object.
//! Database entities derive `sqlx::FromRow`.

pub mod link;
pub mod node;
pub mod problem;
pub mod workspace;

pub use link::WorkspaceNodeLink;
pub use node::{WorkspaceNode, WorkspaceNodeStatus, WorkspaceNodeType};
pub use problem::ImportProblem;
pub use workspace::{Workspace, WorkspaceStatus};
