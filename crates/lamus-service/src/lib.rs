//! # lamus-service
//!
//! The workspace import pipeline. Components talk to the archive, the
//! metadata API, the type checker and the handle server only through the
//! traits in `lamus_core::traits`, and to persistence only through
//! [`lamus_database::WorkspaceDao`].
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references, bundled in [`ImportServices`].

pub mod archive;
pub mod context;
pub mod importer;
pub mod linker;
pub mod lock;
pub mod orphan;

pub use archive::ArchiveTreeBridge;
pub use context::ImportServices;
pub use importer::{MetadataNodeImporter, NodeImporter, ResourceNodeImporter};
pub use linker::NodeLinker;
pub use lock::PreLockGuard;
pub use orphan::OrphanNodesImportHandler;
