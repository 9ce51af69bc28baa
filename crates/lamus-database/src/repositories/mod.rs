//! PostgreSQL repositories, one per table group.

pub mod link;
pub mod node;
pub mod workspace;

pub use link::LinkRepository;
pub use node::NodeRepository;
pub use workspace::WorkspaceRepository;
