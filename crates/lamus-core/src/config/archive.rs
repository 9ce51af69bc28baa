//! Archive location configuration.

use serde::{Deserialize, Serialize};

/// Where the archive lives on the local filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Root directory of the corpus; top-level corpus files sit directly in it.
    #[serde(default = "default_corpus_root")]
    pub corpus_root: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            corpus_root: default_corpus_root(),
        }
    }
}

fn default_corpus_root() -> String {
    "./data/archive/corpora".to_string()
}
