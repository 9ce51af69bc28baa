//! Importer for metadata nodes.

use tracing::debug;

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::traits::{DocumentReference, MetadataDocument};
use lamus_entity::node::kind::METADATA_MIMETYPES;
use lamus_entity::{Workspace, WorkspaceNode, WorkspaceNodeStatus, WorkspaceNodeType};
use lamus_storage::PathResolver;

use super::{NodeImporter, resolve_pid};
use crate::context::ImportServices;

/// Importer name recorded in errors.
pub(crate) const IMPORTER: &str = "metadata";

/// Imports a metadata document and, depth first, everything it references.
#[derive(Debug, Clone)]
pub struct MetadataNodeImporter {
    services: ImportServices,
}

impl MetadataNodeImporter {
    /// Create an importer.
    pub fn new(services: ImportServices) -> Self {
        Self { services }
    }

    /// Import the referenced metadata node, or the workspace's top node when
    /// there is no reference.
    pub async fn import_node(
        &self,
        workspace: Option<&Workspace>,
        parent: Option<&WorkspaceNode>,
        _parent_document: Option<&MetadataDocument>,
        reference: Option<&DocumentReference>,
    ) -> AppResult<WorkspaceNode> {
        let workspace = workspace
            .ok_or_else(|| AppError::precondition("Workspace not set for metadata import"))?;
        let target_uri = match reference {
            Some(reference) => reference.uri.clone(),
            None => workspace.top_node_archive_uri.clone().ok_or_else(|| {
                AppError::precondition(format!(
                    "Workspace {} has no top node to import",
                    workspace.id
                ))
            })?,
        };
        let fail = |message: &str, cause: AppError| {
            AppError::node_import(workspace.id, IMPORTER, message, cause)
                .with_node(target_uri.clone())
        };

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Fetching metadata node");
        let archive_node = self
            .services
            .archive
            .node(&target_uri)
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
                fail(
                    "Archive node has no URL",
                    AppError::not_found(format!("No URL for {target_uri}")),
                )
            })?;
        let document = self
            .services
            .metadata
            .fetch_document(&archive_url)
            .await
            .map_err(|e| fail("Failed to fetch metadata document", e))?;

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Recording metadata node");
        let mut node = WorkspaceNode::new(
            workspace.id,
            document.name.clone(),
            WorkspaceNodeType::Metadata,
            WorkspaceNodeStatus::ArchiveCopy,
        );
        node.archive_uri = Some(archive_node.preferred_uri().to_string());
        node.archive_url = Some(archive_url.clone());
        node.format = Some(
            archive_node
                .format
                .clone()
                .unwrap_or_else(|| METADATA_MIMETYPES[0].to_string()),
        );
        node.profile_schema_uri = document.schema_location.clone();
        node.pid = resolve_pid(
            &self.services,
            workspace.id,
            &target_uri,
            document.handle.as_deref().or(archive_node.handle.as_deref()),
        )
        .await;
        self.services
            .dao
            .add_node(&node)
            .await
            .map_err(|e| fail("Failed to store workspace node", e))?;

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Linking metadata node");
        self.services
            .linker()
            .link(workspace, parent, &node, &target_uri)
            .await
            .map_err(|e| fail("Failed to link workspace node", e))?;

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, "Materializing metadata node");
        let workspace_url = self
            .materialize(workspace, parent, &document, &archive_url)
            .await
            .map_err(|e| fail("Failed to copy metadata document into the workspace", e))?;
        self.services
            .dao
            .update_node_workspace_url(node.id, &workspace_url)
            .await
            .map_err(|e| fail("Failed to store workspace URL", e))?;
        node.workspace_url = Some(workspace_url);

        if document.referencing {
            debug!(
                workspace_id = %workspace.id,
                node_uri = %target_uri,
                references = document.references.len(),
                "Exploring metadata references"
            );
            for child_reference in &document.references {
                let importer = NodeImporter::for_reference(&self.services, child_reference);
                importer
                    .import_node(
                        Some(workspace),
                        Some(&node),
                        Some(&document),
                        Some(child_reference),
                    )
                    .await?;
            }
        }

        debug!(workspace_id = %workspace.id, node_uri = %target_uri, node_id = %node.id, "Imported metadata node");
        Ok(node)
    }

    /// Write the document into the workspace and return its `file:` URL.
    async fn materialize(
        &self,
        workspace: &Workspace,
        parent: Option<&WorkspaceNode>,
        document: &MetadataDocument,
        archive_url: &str,
    ) -> AppResult<String> {
        let paths = &self.services.paths;
        let directory = match parent {
            None => paths.workspace_directory(workspace.id),
            Some(parent) => {
                let parent_file = parent
                    .workspace_url
                    .as_deref()
                    .and_then(PathResolver::url_to_path)
                    .ok_or_else(|| {
                        AppError::precondition(format!(
                            "Parent node {} has no local workspace copy",
                            parent.id
                        ))
                    })?;
                paths.directory_for_type(&parent_file, WorkspaceNodeType::Metadata)
            }
        };

        let file_name =
            paths.correct_path_element(PathResolver::basename(archive_url), "metadata import");
        let target = paths.final_file(&directory, &file_name).ok_or_else(|| {
            AppError::storage(format!(
                "No free file name for {file_name} in {}",
                directory.display()
            ))
        })?;

        self.services.files.write_document(document, &target).await?;
        Ok(PathResolver::path_to_url(&target))
    }
}
