//! In-process [`WorkspaceDao`] using a Tokio mutex, for embedding and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};
use lamus_entity::{
    Workspace, WorkspaceNode, WorkspaceNodeLink, WorkspaceNodeStatus, WorkspaceStatus,
};

use crate::dao::WorkspaceDao;

/// Tables of the in-process store.
#[derive(Debug, Default)]
struct InnerState {
    workspaces: HashMap<WorkspaceId, Workspace>,
    /// Insertion ordered.
    nodes: Vec<WorkspaceNode>,
    /// Insertion ordered.
    links: Vec<WorkspaceNodeLink>,
    /// Archive URI to the workspace locking it.
    locked_nodes: HashMap<String, WorkspaceId>,
}

impl InnerState {
    fn locked_by_live_workspace(&self, uri: &str) -> bool {
        self.locked_nodes
            .get(uri)
            .and_then(|id| self.workspaces.get(id))
            .is_some_and(|ws| ws.status.holds_lock())
    }

    fn node_mut(&mut self, id: WorkspaceNodeId) -> AppResult<&mut WorkspaceNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::not_found(format!("Workspace node {id} not found")))
    }

    fn workspace_mut(&mut self, id: WorkspaceId) -> AppResult<&mut Workspace> {
        self.workspaces
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Workspace {id} not found")))
    }
}

/// [`WorkspaceDao`] keeping everything in memory.
///
/// Suitable for single-process deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspaceDao {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryWorkspaceDao {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkspaceDao for MemoryWorkspaceDao {
    async fn create_workspace(
        &self,
        workspace: &Workspace,
        lock_uris: &[String],
    ) -> AppResult<Workspace> {
        let mut state = self.state.lock().await;

        if let Some(uri) = lock_uris
            .iter()
            .find(|uri| state.locked_by_live_workspace(uri))
        {
            return Err(AppError::pre_locked(uri.clone()));
        }
        if state.workspaces.contains_key(&workspace.id) {
            return Err(AppError::conflict(format!(
                "Workspace {} already exists",
                workspace.id
            )));
        }

        if let Some(uri) = &workspace.top_node_archive_uri {
            if let Some(previous) = state.locked_nodes.insert(uri.clone(), workspace.id) {
                debug!(archive_uri = %uri, previous = %previous, "Lock taken over from finished workspace");
            }
        }
        state.workspaces.insert(workspace.id, workspace.clone());

        Ok(workspace.clone())
    }

    async fn find_workspace(&self, id: WorkspaceId) -> AppResult<Option<Workspace>> {
        Ok(self.state.lock().await.workspaces.get(&id).cloned())
    }

    async fn update_workspace_top_node(&self, workspace: &Workspace) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let stored = state.workspace_mut(workspace.id)?;
        stored.top_node_id = workspace.top_node_id;
        stored.top_node_archive_uri = workspace.top_node_archive_uri.clone();
        stored.top_node_archive_url = workspace.top_node_archive_url.clone();
        Ok(())
    }

    async fn update_workspace_status(
        &self,
        id: WorkspaceId,
        status: WorkspaceStatus,
        message: &str,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let stored = state.workspace_mut(id)?;
        stored.status = status;
        stored.message = message.to_string();
        if status.is_terminated() && stored.end_date.is_none() {
            stored.end_date = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn is_any_locked(&self, uris: &[String]) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(uris.iter().any(|uri| state.locked_by_live_workspace(uri)))
    }

    async fn add_node(&self, node: &WorkspaceNode) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.nodes.iter().any(|n| n.id == node.id) {
            return Err(AppError::conflict(format!(
                "Workspace node {} already exists",
                node.id
            )));
        }
        state.nodes.push(node.clone());
        Ok(())
    }

    async fn find_node(&self, id: WorkspaceNodeId) -> AppResult<Option<WorkspaceNode>> {
        let state = self.state.lock().await;
        Ok(state.nodes.iter().find(|n| n.id == id).cloned())
    }

    async fn update_node_workspace_url(&self, id: WorkspaceNodeId, url: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.node_mut(id)?.workspace_url = Some(url.to_string());
        Ok(())
    }

    async fn update_node_status(
        &self,
        id: WorkspaceNodeId,
        status: WorkspaceNodeStatus,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.node_mut(id)?.status = status;
        Ok(())
    }

    async fn list_nodes(&self, workspace_id: WorkspaceId) -> AppResult<Vec<WorkspaceNode>> {
        let state = self.state.lock().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn find_node_by_url(
        &self,
        workspace_id: WorkspaceId,
        url: &str,
    ) -> AppResult<Option<WorkspaceNode>> {
        let state = self.state.lock().await;
        Ok(state
            .nodes
            .iter()
            .find(|n| {
                n.workspace_id == workspace_id
                    && (n.archive_url.as_deref() == Some(url)
                        || n.workspace_url.as_deref() == Some(url))
            })
            .cloned())
    }

    async fn add_link(&self, link: &WorkspaceNodeLink) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.links.iter().any(|l| {
            l.parent_node_id == link.parent_node_id && l.child_node_id == link.child_node_id
        }) {
            return Err(AppError::conflict(format!(
                "Node {} is already linked to {}",
                link.child_node_id, link.parent_node_id
            )));
        }
        state.links.push(link.clone());
        Ok(())
    }

    async fn delete_link(
        &self,
        parent_node_id: WorkspaceNodeId,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.links.len();
        state
            .links
            .retain(|l| !(l.parent_node_id == parent_node_id && l.child_node_id == child_node_id));
        Ok(state.links.len() != before)
    }

    async fn list_child_links(
        &self,
        parent_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .filter(|l| l.parent_node_id == parent_node_id)
            .cloned()
            .collect())
    }

    async fn list_parent_links(
        &self,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .filter(|l| l.child_node_id == child_node_id)
            .cloned()
            .collect())
    }
}
