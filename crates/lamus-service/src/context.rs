//! Dependencies shared by every import step.

use std::sync::Arc;

use lamus_core::traits::{ArchiveGraphProvider, HandleService, MetadataApi, TypeChecker};
use lamus_database::WorkspaceDao;
use lamus_storage::{PathResolver, WorkspaceFileHandler};

use crate::archive::ArchiveTreeBridge;
use crate::linker::NodeLinker;

/// Collaborators of the import pipeline.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Debug, Clone)]
pub struct ImportServices {
    /// Workspace persistence.
    pub dao: Arc<dyn WorkspaceDao>,
    /// The archive's node graph.
    pub archive: Arc<dyn ArchiveGraphProvider>,
    /// Metadata document parsing and serialization.
    pub metadata: Arc<dyn MetadataApi>,
    /// File type checker.
    pub typechecker: Arc<dyn TypeChecker>,
    /// Handle server.
    pub handles: Arc<dyn HandleService>,
    /// Workspace file writer.
    pub files: Arc<dyn WorkspaceFileHandler>,
    /// Workspace layout and naming rules.
    pub paths: Arc<PathResolver>,
}

impl ImportServices {
    /// Bundle the collaborators.
    pub fn new(
        dao: Arc<dyn WorkspaceDao>,
        archive: Arc<dyn ArchiveGraphProvider>,
        metadata: Arc<dyn MetadataApi>,
        typechecker: Arc<dyn TypeChecker>,
        handles: Arc<dyn HandleService>,
        files: Arc<dyn WorkspaceFileHandler>,
        paths: Arc<PathResolver>,
    ) -> Self {
        Self {
            dao,
            archive,
            metadata,
            typechecker,
            handles,
            files,
            paths,
        }
    }

    /// Tree queries over the archive graph.
    pub fn tree(&self) -> ArchiveTreeBridge {
        ArchiveTreeBridge::new(Arc::clone(&self.archive), Arc::clone(&self.paths))
    }

    /// Link management between workspace nodes.
    pub fn linker(&self) -> NodeLinker {
        NodeLinker::new(
            Arc::clone(&self.dao),
            Arc::clone(&self.metadata),
            Arc::clone(&self.files),
        )
    }
}
