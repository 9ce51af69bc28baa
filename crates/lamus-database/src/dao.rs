//! Data-access trait used by the import pipeline.

use async_trait::async_trait;

use lamus_core::result::AppResult;
use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};
use lamus_entity::{
    Workspace, WorkspaceNode, WorkspaceNodeLink, WorkspaceNodeStatus, WorkspaceStatus,
};

/// Persistence of workspaces, their nodes, and the links between nodes.
///
/// Implementations must make [`WorkspaceDao::create_workspace`] atomic with
/// respect to concurrent callers: the overlap check and the registration of
/// the new workspace's top node happen in one critical section.
#[async_trait]
pub trait WorkspaceDao: Send + Sync + std::fmt::Debug + 'static {
    /// Persist `workspace` and lock its top node.
    ///
    /// `lock_uris` is the set of archive nodes the new workspace overlaps
    /// (its top node, ancestors and descendants). Fails with `PreLocked` if
    /// any of them is locked by a workspace that still holds its lock.
    async fn create_workspace(
        &self,
        workspace: &Workspace,
        lock_uris: &[String],
    ) -> AppResult<Workspace>;

    /// Find a workspace by ID.
    async fn find_workspace(&self, id: WorkspaceId) -> AppResult<Option<Workspace>>;

    /// Persist the workspace's top node fields.
    async fn update_workspace_top_node(&self, workspace: &Workspace) -> AppResult<()>;

    /// Persist a status change together with its message.
    async fn update_workspace_status(
        &self,
        id: WorkspaceId,
        status: WorkspaceStatus,
        message: &str,
    ) -> AppResult<()>;

    /// Whether any of the URIs is locked by a live workspace.
    async fn is_any_locked(&self, uris: &[String]) -> AppResult<bool>;

    /// Insert a workspace node.
    async fn add_node(&self, node: &WorkspaceNode) -> AppResult<()>;

    /// Find a workspace node by ID.
    async fn find_node(&self, id: WorkspaceNodeId) -> AppResult<Option<WorkspaceNode>>;

    /// Record where the node's copy lives inside the workspace.
    async fn update_node_workspace_url(&self, id: WorkspaceNodeId, url: &str) -> AppResult<()>;

    /// Change a node's lifecycle status.
    async fn update_node_status(
        &self,
        id: WorkspaceNodeId,
        status: WorkspaceNodeStatus,
    ) -> AppResult<()>;

    /// All nodes of a workspace, in insertion order.
    async fn list_nodes(&self, workspace_id: WorkspaceId) -> AppResult<Vec<WorkspaceNode>>;

    /// The node whose archive URL or workspace URL equals `url`.
    async fn find_node_by_url(
        &self,
        workspace_id: WorkspaceId,
        url: &str,
    ) -> AppResult<Option<WorkspaceNode>>;

    /// Insert a link. Fails with `Conflict` if the pair is already linked.
    async fn add_link(&self, link: &WorkspaceNodeLink) -> AppResult<()>;

    /// Delete the link between two nodes. Returns false if there was none.
    async fn delete_link(
        &self,
        parent_node_id: WorkspaceNodeId,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<bool>;

    /// Links whose parent is `parent_node_id`, in insertion order.
    async fn list_child_links(
        &self,
        parent_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>>;

    /// Links whose child is `child_node_id`.
    async fn list_parent_links(
        &self,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>>;
}
