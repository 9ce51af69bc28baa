//! Ancestor and descendant queries over the archive graph.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use lamus_core::result::AppResult;
use lamus_core::traits::ArchiveGraphProvider;
use lamus_storage::PathResolver;

/// Answers tree questions about archive nodes.
///
/// Nodes are reported by their preferred identifier (handle when minted,
/// archive URI otherwise), which is also what workspaces lock.
#[derive(Debug, Clone)]
pub struct ArchiveTreeBridge {
    archive: Arc<dyn ArchiveGraphProvider>,
    paths: Arc<PathResolver>,
}

impl ArchiveTreeBridge {
    /// Create a bridge over the given archive.
    pub fn new(archive: Arc<dyn ArchiveGraphProvider>, paths: Arc<PathResolver>) -> Self {
        Self { archive, paths }
    }

    /// The identifier workspaces record for `uri`.
    ///
    /// Unknown nodes keep the URI they were asked for.
    pub async fn preferred_uri(&self, uri: &str) -> AppResult<String> {
        Ok(self
            .archive
            .node(uri)
            .await?
            .map(|node| node.preferred_uri().to_string())
            .unwrap_or_else(|| uri.to_string()))
    }

    /// The archive URI of a node given by URI or handle.
    pub async fn canonical_uri(&self, uri: &str) -> AppResult<String> {
        Ok(self
            .archive
            .node(uri)
            .await?
            .map(|node| node.uri)
            .unwrap_or_else(|| uri.to_string()))
    }

    /// Ancestors of `uri`, nearest first.
    pub async fn ancestors_of(&self, uri: &str) -> AppResult<Vec<String>> {
        let mut ancestors = Vec::new();
        let mut current = self.canonical_uri(uri).await?;
        let mut seen = HashSet::from([current.clone()]);

        while let Some(parent) = self.archive.canonical_parent(&current).await? {
            if !seen.insert(parent.clone()) {
                warn!(node_uri = %uri, repeated = %parent, "Cycle in archive parent chain");
                break;
            }
            ancestors.push(self.preferred_uri(&parent).await?);
            current = parent;
        }

        Ok(ancestors)
    }

    /// All transitive descendants of `uri`.
    pub async fn descendants_of(&self, uri: &str) -> AppResult<Vec<String>> {
        let raw = self.archive.descendants(&self.canonical_uri(uri).await?).await?;
        let mut descendants = Vec::with_capacity(raw.len());
        for descendant in raw {
            descendants.push(self.preferred_uri(&descendant).await?);
        }
        Ok(descendants)
    }

    /// Ancestors followed by descendants of `uri`.
    pub async fn ancestors_and_descendants(&self, uri: &str) -> AppResult<Vec<String>> {
        let mut closure = self.ancestors_of(uri).await?;
        closure.extend(self.descendants_of(uri).await?);
        debug!(node_uri = %uri, size = closure.len(), "Computed archive closure");
        Ok(closure)
    }

    /// Relative path from the corpus root down to `uri`.
    ///
    /// Walks up from the node itself, collecting each node's corrected file
    /// stem, until a node whose file sits directly in the corpus root.
    /// Returns `None` if a node on the way has no local file.
    pub async fn closest_top_node_path(&self, uri: &str) -> AppResult<Option<String>> {
        let mut segments = VecDeque::new();
        let mut seen = HashSet::new();
        let mut current = Some(self.canonical_uri(uri).await?);

        while let Some(node_uri) = current.take() {
            if !seen.insert(node_uri.clone()) {
                break;
            }

            let Some(url) = self.archive.resolve_url(&node_uri).await? else {
                return Ok(None);
            };
            let Some(path) = PathResolver::url_to_path(&url) else {
                return Ok(None);
            };

            let stem = PathResolver::basename_without_extension(&path.to_string_lossy()).to_string();
            segments.push_front(self.paths.correct_path_element(&stem, "top node path"));

            if self.paths.is_in_corpus_root(&path) {
                break;
            }
            current = self.archive.canonical_parent(&node_uri).await?;
        }

        Ok(Some(Vec::from(segments).join("/")))
    }
}
