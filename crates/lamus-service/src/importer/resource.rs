//! Importer for resource nodes.

use tracing::{debug, warn};

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::traits::{ArchiveNodeKind, DocumentReference, MetadataDocument};
use lamus_entity::{Workspace, WorkspaceNode, WorkspaceNodeStatus, WorkspaceNodeType};
use lamus_storage::PathResolver;

use super::resolve_pid;
use crate::context::ImportServices;

/// Importer name recorded in errors.
pub(crate) const IMPORTER: &str = "resource";

/// Imports a resource referenced by a metadata document.
///
/// Resources stay in the archive; only the node and its link are recorded.
#[derive(Debug, Clone)]
pub struct ResourceNodeImporter {
    services: ImportServices,
}

impl ResourceNodeImporter {
    /// Create an importer.
    pub fn new(services: ImportServices) -> Self {
        Self { services }
    }

    /// Import the resource `reference` points at below `parent`.
    pub async fn import_node(
        &self,
        workspace: Option<&Workspace>,
        parent: Option<&WorkspaceNode>,
        parent_document: Option<&MetadataDocument>,
        reference: Option<&DocumentReference>,
    ) -> AppResult<WorkspaceNode> {
        let workspace = workspace
            .ok_or_else(|| AppError::precondition("Workspace not set for resource import"))?;
        let reference = reference
            .ok_or_else(|| AppError::precondition("Reference not set for resource import"))?;
        let target_uri = reference.uri.as_str();
        let fail = |message: &str, cause: AppError| {
            AppError::node_import(workspace.id, IMPORTER, message, cause).with_node(target_uri)
        };

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Fetching resource node");
        let archive_node = self
            .services
            .archive
            .node(target_uri)
            .await
            .map_err(|e| fail("Failed to look up archive node", e))?
            .ok_or_else(|| {
                fail(
                    "Archive node not found",
                    AppError::not_found(format!("{target_uri} is not in the archive")),
                )
            })?;
        let archive_url = self
            .services
            .archive
            .resolve_url(&archive_node.uri)
            .await
            .map_err(|e| fail("Failed to resolve archive URL", e))?
            .ok_or_else(|| {
                AppError::validation(format!("Resource {target_uri} has no URL"))
                    .with_node(target_uri)
            })?;

        let declared = reference
            .mimetype
            .clone()
            .or_else(|| {
                parent_document
                    .and_then(|doc| doc.find_reference(target_uri))
                    .and_then(|r| r.mimetype.clone())
            })
            .or_else(|| archive_node.format.clone());
        let local = PathResolver::is_url_local(&archive_url);

        let mut mimetype = declared.clone();
        if let Some(path) = self.typecheck_target(&archive_url).await {
            debug!(workspace_id = %workspace.id, node_uri = %target_uri, path = %path.display(), "Typechecking resource");
            let verdict = self
                .services
                .typechecker
                .check(&path, declared.as_deref())
                .await
                .map_err(|e| fail("Failed to typecheck resource", e))?;

            if declared.as_deref() != Some(verdict.mimetype.as_str()) {
                warn!(
                    workspace_id = %workspace.id,
                    node_uri = %target_uri,
                    declared = ?declared,
                    detected = %verdict.mimetype,
                    "Detected mimetype differs from the declared one"
                );
            }
            if !verdict.archivable {
                warn!(
                    workspace_id = %workspace.id,
                    node_uri = %target_uri,
                    message = %verdict.message,
                    "Archived resource is not archivable"
                );
            }
            mimetype = Some(verdict.mimetype);
        }

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Recording resource node");
        let status = if local {
            WorkspaceNodeStatus::ArchiveCopy
        } else {
            WorkspaceNodeStatus::External
        };
        let mut node = WorkspaceNode::new(
            workspace.id,
            archive_node.name.clone(),
            WorkspaceNodeType::from_archive(ArchiveNodeKind::Resource, mimetype.as_deref()),
            status,
        );
        node.archive_uri = Some(archive_node.preferred_uri().to_string());
        node.archive_url = Some(archive_url);
        node.format = mimetype;
        node.pid = resolve_pid(
            &self.services,
            workspace.id,
            target_uri,
            archive_node.handle.as_deref(),
        )
        .await;
        self.services
            .dao
            .add_node(&node)
            .await
            .map_err(|e| fail("Failed to store workspace node", e))?;

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Linking resource node");
        self.services
            .linker()
            .link(workspace, parent, &node, target_uri)
            .await
            .map_err(|e| fail("Failed to link workspace node", e))?;

        Ok(node)
    }

    /// The local file to typecheck, if the resource needs checking at all.
    ///
    /// Remote resources are trusted. Local ones are checked when they sit
    /// in an orphans directory or exceed the recheck size limit.
    async fn typecheck_target(&self, archive_url: &str) -> Option<std::path::PathBuf> {
        let path = PathResolver::url_to_path(archive_url)?;
        let paths = &self.services.paths;
        if paths.is_file_in_orphans_directory(&path)
            || paths.is_file_size_above_recheck_limit(&path).await
        {
            Some(path)
        } else {
            None
        }
    }
}
