//! PostgreSQL-backed [`WorkspaceDao`].

use async_trait::async_trait;
use sqlx::PgPool;

use lamus_core::result::AppResult;
use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};
use lamus_entity::{
    Workspace, WorkspaceNode, WorkspaceNodeLink, WorkspaceNodeStatus, WorkspaceStatus,
};

use crate::dao::WorkspaceDao;
use crate::repositories::{LinkRepository, NodeRepository, WorkspaceRepository};

/// [`WorkspaceDao`] composed of the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgWorkspaceDao {
    workspaces: WorkspaceRepository,
    nodes: NodeRepository,
    links: LinkRepository,
}

impl PgWorkspaceDao {
    /// Create a DAO sharing one connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            workspaces: WorkspaceRepository::new(pool.clone()),
            nodes: NodeRepository::new(pool.clone()),
            links: LinkRepository::new(pool),
        }
    }
}

#[async_trait]
impl WorkspaceDao for PgWorkspaceDao {
    async fn create_workspace(
        &self,
        workspace: &Workspace,
        lock_uris: &[String],
    ) -> AppResult<Workspace> {
        self.workspaces.create_locked(workspace, lock_uris).await
    }

    async fn find_workspace(&self, id: WorkspaceId) -> AppResult<Option<Workspace>> {
        self.workspaces.find_by_id(id).await
    }

    async fn update_workspace_top_node(&self, workspace: &Workspace) -> AppResult<()> {
        self.workspaces.update_top_node(workspace).await
    }

    async fn update_workspace_status(
        &self,
        id: WorkspaceId,
        status: WorkspaceStatus,
        message: &str,
    ) -> AppResult<()> {
        self.workspaces.update_status(id, status, message).await
    }

    async fn is_any_locked(&self, uris: &[String]) -> AppResult<bool> {
        self.workspaces.is_any_locked(uris).await
    }

    async fn add_node(&self, node: &WorkspaceNode) -> AppResult<()> {
        self.nodes.create(node).await
    }

    async fn find_node(&self, id: WorkspaceNodeId) -> AppResult<Option<WorkspaceNode>> {
        self.nodes.find_by_id(id).await
    }

    async fn update_node_workspace_url(&self, id: WorkspaceNodeId, url: &str) -> AppResult<()> {
        self.nodes.update_workspace_url(id, url).await
    }

    async fn update_node_status(
        &self,
        id: WorkspaceNodeId,
        status: WorkspaceNodeStatus,
    ) -> AppResult<()> {
        self.nodes.update_status(id, status).await
    }

    async fn list_nodes(&self, workspace_id: WorkspaceId) -> AppResult<Vec<WorkspaceNode>> {
        self.nodes.find_by_workspace(workspace_id).await
    }

    async fn find_node_by_url(
        &self,
        workspace_id: WorkspaceId,
        url: &str,
    ) -> AppResult<Option<WorkspaceNode>> {
        self.nodes.find_by_url(workspace_id, url).await
    }

    async fn add_link(&self, link: &WorkspaceNodeLink) -> AppResult<()> {
        self.links.create(link).await
    }

    async fn delete_link(
        &self,
        parent_node_id: WorkspaceNodeId,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<bool> {
        self.links.delete(parent_node_id, child_node_id).await
    }

    async fn list_child_links(
        &self,
        parent_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        self.links.find_children(parent_node_id).await
    }

    async fn list_parent_links(
        &self,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        self.links.find_parents(child_node_id).await
    }
}
