//! Workspace node domain entities.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::WorkspaceNodeType;
pub use model::WorkspaceNode;
pub use status::WorkspaceNodeStatus;
