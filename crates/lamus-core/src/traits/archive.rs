//! Archive graph provider trait (corpus structure service).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Whether an archive node is a metadata container or a resource leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveNodeKind {
    /// A metadata document that may reference children.
    Metadata,
    /// A resource file.
    Resource,
}

/// A node as known by the archive graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveNode {
    /// Canonical archive URI of the node.
    pub uri: String,
    /// Persistent identifier, when one was minted.
    pub handle: Option<String>,
    /// Display name.
    pub name: String,
    /// Metadata or resource.
    pub kind: ArchiveNodeKind,
    /// Mimetype declared in the archive.
    pub format: Option<String>,
}

impl ArchiveNode {
    /// The identifier workspaces record for this node: its handle when one
    /// was minted, else its archive URI.
    pub fn preferred_uri(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.uri)
    }
}

/// Read access to the archive's node graph.
#[async_trait]
pub trait ArchiveGraphProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Look a node up by archive URI or by handle.
    async fn node(&self, uri: &str) -> AppResult<Option<ArchiveNode>>;

    /// The canonical parent of a node, or `None` for the archive root.
    async fn canonical_parent(&self, uri: &str) -> AppResult<Option<String>>;

    /// All transitive descendants of a node.
    async fn descendants(&self, uri: &str) -> AppResult<Vec<String>>;

    /// The URL where the node's content can be read (`file:` for local nodes).
    async fn resolve_url(&self, uri: &str) -> AppResult<Option<String>>;
}
