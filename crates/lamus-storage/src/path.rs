//! Workspace directory layout and file naming rules.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::debug;

use lamus_core::config::archive::ArchiveConfig;
use lamus_core::config::workspace::WorkspaceConfig;
use lamus_core::types::id::WorkspaceId;
use lamus_entity::WorkspaceNodeType;

/// Characters escaped when a filesystem path becomes a `file:` URL.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Marker inserted where an over-long path element was cut.
const ELLIPSIS: &str = "...";

/// Resolves where workspace files live and how they are named.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: WorkspaceConfig,
    corpus_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver from the workspace and archive configuration.
    pub fn new(config: WorkspaceConfig, archive: &ArchiveConfig) -> Self {
        Self {
            config,
            corpus_root: PathBuf::from(&archive.corpus_root),
        }
    }

    /// The workspace configuration this resolver was built from.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Root directory of the archive's corpus tree.
    pub fn corpus_root(&self) -> &Path {
        &self.corpus_root
    }

    /// Last `/`-separated segment of a path or URL.
    pub fn basename(path: &str) -> &str {
        let trimmed = path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// [`PathResolver::basename`] without its last extension.
    ///
    /// A leading dot does not start an extension (`.hidden` stays as is).
    pub fn basename_without_extension(path: &str) -> &str {
        let base = Self::basename(path);
        match base.rfind('.') {
            Some(dot) if dot > 0 => &base[..dot],
            _ => base,
        }
    }

    /// Make a name safe to use as a single path element.
    ///
    /// Every character outside `[A-Za-z0-9._-]` becomes `_`. A name longer
    /// than the configured maximum keeps its head and extension, joined by
    /// `...`, so that the result has exactly the maximum length.
    pub fn correct_path_element(&self, name: &str, context: &str) -> String {
        let max = self.config.max_path_element_length;

        let mut corrected: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if corrected.len() > max {
            let extension = match corrected.rfind('.') {
                Some(dot) if dot > 0 => corrected[dot..].to_string(),
                _ => String::new(),
            };
            let tail = format!("{ELLIPSIS}{extension}");
            corrected = if tail.len() < max {
                format!("{}{tail}", &corrected[..max - tail.len()])
            } else {
                corrected[..max].to_string()
            };
        }

        if corrected != name {
            debug!(context, original = %name, corrected = %corrected, "Corrected path element");
        }
        corrected
    }

    /// Directory holding the children of type `node_type` of the node stored at `parent_file`.
    ///
    /// Children go to a `Metadata` or `Resources` sibling directory of the
    /// parent file. A parent that itself sits in such a directory shares it.
    pub fn directory_for_type(&self, parent_file: &Path, node_type: WorkspaceNodeType) -> PathBuf {
        let parent_dir = parent_file.parent().unwrap_or_else(|| Path::new(""));
        let subdirectory = if node_type.is_metadata() {
            &self.config.metadata_directory_name
        } else {
            &self.config.resources_directory_name
        };

        let already_there = parent_dir
            .file_name()
            .is_some_and(|name| name == subdirectory.as_str());
        if already_there {
            parent_dir.to_path_buf()
        } else {
            parent_dir.join(subdirectory)
        }
    }

    /// First free file name for `desired_name` in `base_dir`.
    ///
    /// The undecorated name counts as the first candidate, then `name_2.ext`,
    /// `name_3.ext` and so on up to the configured maximum suffix. Returns
    /// `None` when every candidate is taken.
    pub fn final_file(&self, base_dir: &Path, desired_name: &str) -> Option<PathBuf> {
        let candidate = base_dir.join(desired_name);
        if !candidate.exists() {
            return Some(candidate);
        }

        let stem = Self::basename_without_extension(desired_name);
        let extension = &desired_name[stem.len()..];
        (2..=self.config.max_duplicate_suffix)
            .map(|suffix| base_dir.join(format!("{stem}_{suffix}{extension}")))
            .find(|candidate| !candidate.exists())
    }

    /// Whether the URL points at the local filesystem.
    pub fn is_url_local(url: &str) -> bool {
        url.starts_with('/')
            || url
                .get(..5)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"))
    }

    /// Filesystem path of a local URL, or `None` for remote URLs.
    pub fn url_to_path(url: &str) -> Option<PathBuf> {
        if url.starts_with('/') {
            return Some(PathBuf::from(url));
        }
        if !Self::is_url_local(url) {
            return None;
        }

        let rest = &url[5..];
        let encoded = match rest.strip_prefix("//") {
            Some(authority_and_path) => {
                let slash = authority_and_path.find('/')?;
                let host = &authority_and_path[..slash];
                if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                    return None;
                }
                &authority_and_path[slash..]
            }
            None if rest.starts_with('/') => rest,
            None => return None,
        };

        percent_decode_str(encoded)
            .decode_utf8()
            .ok()
            .map(|decoded| PathBuf::from(decoded.as_ref()))
    }

    /// `file:` URL of a filesystem path. Relative paths are made absolute first.
    pub fn path_to_url(path: &Path) -> String {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        format!(
            "file://{}",
            utf8_percent_encode(&absolute.to_string_lossy(), PATH_SEGMENT)
        )
    }

    /// `file:///` form of a local URL; remote URLs are returned unchanged.
    ///
    /// Two URLs naming the same local file have the same canonical form.
    pub fn canonical_url(url: &str) -> String {
        match Self::url_to_path(url) {
            Some(path) => Self::path_to_url(&path),
            None => url.to_string(),
        }
    }

    /// Whether any segment of `path` is the orphans directory.
    pub fn is_file_in_orphans_directory(&self, path: &Path) -> bool {
        path.components()
            .any(|segment| segment.as_os_str() == self.config.orphans_directory_name.as_str())
    }

    /// Whether the file is larger than the type recheck limit. Missing files are not.
    pub async fn is_file_size_above_recheck_limit(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.len() > self.config.type_recheck_size_limit_bytes)
            .unwrap_or(false)
    }

    /// Whether `path` sits directly in the corpus root.
    pub fn is_in_corpus_root(&self, path: &Path) -> bool {
        path.parent().is_some_and(|parent| parent == self.corpus_root.as_path())
    }

    /// Directory of one workspace.
    pub fn workspace_directory(&self, workspace_id: WorkspaceId) -> PathBuf {
        PathBuf::from(&self.config.base_directory).join(workspace_id.to_string())
    }

    /// Orphans directory under the workspace's top node path, or under the corpus root.
    pub fn orphans_directory(&self, top_node_path: Option<&str>) -> PathBuf {
        match top_node_path.filter(|p| !p.is_empty()) {
            Some(path) => self
                .corpus_root
                .join(path)
                .join(&self.config.orphans_directory_name),
            None => self.corpus_root.join(&self.config.orphans_directory_name),
        }
    }
}
