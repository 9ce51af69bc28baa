//! Workspace layout and import limits.

use serde::{Deserialize, Serialize};

/// Configuration of the workspace directory tree and import policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory under which every workspace gets its own folder.
    #[serde(default = "default_base_directory")]
    pub base_directory: String,
    /// Name of the directory holding files not linked from any metadata.
    #[serde(default = "default_orphans_directory_name")]
    pub orphans_directory_name: String,
    /// Subdirectory for metadata children of a node.
    #[serde(default = "default_metadata_directory_name")]
    pub metadata_directory_name: String,
    /// Subdirectory for resource children of a node.
    #[serde(default = "default_resources_directory_name")]
    pub resources_directory_name: String,
    /// Maximum length of a single corrected path element.
    #[serde(default = "default_max_path_element_length")]
    pub max_path_element_length: usize,
    /// Highest numeric suffix tried when a file name is already taken.
    #[serde(default = "default_max_duplicate_suffix")]
    pub max_duplicate_suffix: u32,
    /// Local archive resources larger than this are typechecked again on import.
    #[serde(default = "default_type_recheck_size_limit")]
    pub type_recheck_size_limit_bytes: u64,
    /// Storage quota given to new workspaces (default 10 GB).
    #[serde(default = "default_max_storage_space")]
    pub max_storage_space_bytes: i64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            orphans_directory_name: default_orphans_directory_name(),
            metadata_directory_name: default_metadata_directory_name(),
            resources_directory_name: default_resources_directory_name(),
            max_path_element_length: default_max_path_element_length(),
            max_duplicate_suffix: default_max_duplicate_suffix(),
            type_recheck_size_limit_bytes: default_type_recheck_size_limit(),
            max_storage_space_bytes: default_max_storage_space(),
        }
    }
}

fn default_base_directory() -> String {
    "./data/workspaces".to_string()
}

fn default_orphans_directory_name() -> String {
    "sessions".to_string()
}

fn default_metadata_directory_name() -> String {
    "Metadata".to_string()
}

fn default_resources_directory_name() -> String {
    "Resources".to_string()
}

fn default_max_path_element_length() -> usize {
    100
}

fn default_max_duplicate_suffix() -> u32 {
    10_000
}

fn default_type_recheck_size_limit() -> u64 {
    8_388_608 // 8 MB
}

fn default_max_storage_space() -> i64 {
    10_737_418_240 // 10 GB
}
