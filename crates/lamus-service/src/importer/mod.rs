//! Importers turning archive nodes into workspace nodes.
//!
//! A metadata node is imported by [`MetadataNodeImporter`], which recurses
//! into the references of its document; resources are leaves handled by
//! [`ResourceNodeImporter`]. [`NodeImporter`] picks the right one for a
//! reference.

pub mod metadata;
pub mod resource;

use futures::future::BoxFuture;
use tracing::warn;

use lamus_core::result::AppResult;
use lamus_core::traits::{DocumentReference, MetadataDocument, ReferenceKind};
use lamus_core::types::id::WorkspaceId;
use lamus_entity::{Workspace, WorkspaceNode};

use crate::context::ImportServices;

pub use metadata::MetadataNodeImporter;
pub use resource::ResourceNodeImporter;

/// Importer for one kind of node.
#[derive(Debug, Clone)]
pub enum NodeImporter {
    /// Metadata documents, imported recursively.
    Metadata(MetadataNodeImporter),
    /// Resource files.
    Resource(ResourceNodeImporter),
}

impl NodeImporter {
    /// The importer for the node `reference` points at.
    pub fn for_reference(services: &ImportServices, reference: &DocumentReference) -> Self {
        match reference.kind {
            ReferenceKind::Metadata => Self::Metadata(MetadataNodeImporter::new(services.clone())),
            ReferenceKind::Resource => Self::Resource(ResourceNodeImporter::new(services.clone())),
        }
    }

    /// Import the node `reference` points at below `parent`.
    ///
    /// Without a parent the node becomes the workspace's top node.
    pub fn import_node<'a>(
        &'a self,
        workspace: Option<&'a Workspace>,
        parent: Option<&'a WorkspaceNode>,
        parent_document: Option<&'a MetadataDocument>,
        reference: Option<&'a DocumentReference>,
    ) -> BoxFuture<'a, AppResult<WorkspaceNode>> {
        match self {
            Self::Metadata(importer) => Box::pin(importer.import_node(
                workspace,
                parent,
                parent_document,
                reference,
            )),
            Self::Resource(importer) => Box::pin(importer.import_node(
                workspace,
                parent,
                parent_document,
                reference,
            )),
        }
    }
}

/// The persistent identifier to record for a node, if `candidate` is a
/// handle the handle server does not reject.
///
/// An unreachable handle server keeps the handle.
pub(crate) async fn resolve_pid(
    services: &ImportServices,
    workspace_id: WorkspaceId,
    node_uri: &str,
    candidate: Option<&str>,
) -> Option<String> {
    let handle = candidate.filter(|h| services.handles.is_handle(h))?;
    match services.handles.validate(handle).await {
        Ok(true) => Some(handle.to_string()),
        Ok(false) => {
            warn!(workspace_id = %workspace_id, node_uri, handle, "Handle is not registered; dropping it");
            None
        }
        Err(e) => {
            warn!(
                workspace_id = %workspace_id,
                node_uri,
                handle,
                error = %e,
                "Could not validate handle; keeping it"
            );
            Some(handle.to_string())
        }
    }
}
